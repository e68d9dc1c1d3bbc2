//! [§ 13.2.4.4 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
//!
//! "The list of active formatting elements... is used to handle mis-nested
//! formatting element tags."

use super::stack::{Element, NodeId};

/// An entry in the list of active formatting elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormattingEntry {
    /// A formatting element, with the attributes its opener carried so the
    /// Noah's Ark clause can compare entries.
    Element {
        element: Element,
        attributes: Vec<(String, String)>,
    },
    /// "A marker is an entry in the list of active formatting elements that
    /// is distinct from any element."
    ///
    /// Pushed when entering applet, object, marquee, template, td, th and
    /// caption.
    Marker,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveFormattingElements {
    entries: Vec<FormattingEntry>,
}

impl ActiveFormattingElements {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&FormattingEntry> {
        self.entries.get(index)
    }

    pub(crate) fn insert_marker(&mut self) {
        self.entries.push(FormattingEntry::Marker);
    }

    /// [§ 13.2.4.4 Push onto the list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// STEP 1: "If there are already three elements in the list of active
    ///          formatting elements after the last marker, if any, or
    ///          anywhere in the list if there are no markers, that have the
    ///          same tag name, namespace, and attributes as element, then
    ///          remove the earliest such element from the list of active
    ///          formatting elements."
    /// STEP 2: "Add element to the list of active formatting elements."
    pub(crate) fn push(&mut self, element: Element, mut attributes: Vec<(String, String)>) {
        attributes.sort();

        let mut count = 0;
        let mut earliest = None;
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => break,
                FormattingEntry::Element {
                    element: existing,
                    attributes: existing_attributes,
                } => {
                    if existing.name == element.name
                        && existing.namespace == element.namespace
                        && *existing_attributes == attributes
                    {
                        count += 1;
                        earliest = Some(index);
                    }
                }
            }
        }
        if count >= 3
            && let Some(index) = earliest
        {
            let _ = self.entries.remove(index);
        }

        self.entries.push(FormattingEntry::Element {
            element,
            attributes,
        });
    }

    /// [§ 13.2.4.4 Clear the list of active formatting elements up to the last marker](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    pub(crate) fn clear_to_last_marker(&mut self) {
        while let Some(entry) = self.entries.pop() {
            if entry == FormattingEntry::Marker {
                break;
            }
        }
    }

    /// The last element named `name` after the last marker, with its index.
    pub(crate) fn last_named(&self, name: &str) -> Option<(usize, &Element)> {
        for (index, entry) in self.entries.iter().enumerate().rev() {
            match entry {
                FormattingEntry::Marker => return None,
                FormattingEntry::Element { element, .. } if element.is(name) => {
                    return Some((index, element));
                }
                FormattingEntry::Element { .. } => {}
            }
        }
        None
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, FormattingEntry::Element { element, .. } if element.id == id)
        })
    }

    pub(crate) fn remove(&mut self, id: NodeId) {
        self.entries.retain(|entry| {
            !matches!(entry, FormattingEntry::Element { element, .. } if element.id == id)
        });
    }

    /// Point the entry at `index` to a recreated element.
    pub(crate) fn replace(&mut self, index: usize, replacement: Element) {
        if let Some(FormattingEntry::Element { element, .. }) = self.entries.get_mut(index) {
            *element = replacement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Namespace;

    fn element(id: usize, name: &str) -> Element {
        Element {
            id: NodeId(id),
            name: name.to_string(),
            namespace: Namespace::Html,
            html_annotation: false,
        }
    }

    #[test]
    fn test_noahs_ark_keeps_three_copies() {
        let mut list = ActiveFormattingElements::new();
        for id in 0..4 {
            let attributes = vec![("class".into(), "x".into())];
            list.push(element(id, "B"), attributes);
        }
        assert_eq!(list.len(), 3);
        assert!(!list.contains(NodeId(0)));
        assert!(list.contains(NodeId(3)));

        // Different attributes are a different element.
        list.push(element(4, "B"), Vec::new());
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_markers_scope_lookups() {
        let mut list = ActiveFormattingElements::new();
        list.push(element(0, "A"), Vec::new());
        list.insert_marker();
        list.push(element(1, "B"), Vec::new());

        assert!(list.last_named("A").is_none());
        assert_eq!(list.last_named("B").map(|(index, _)| index), Some(2));

        list.clear_to_last_marker();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.last_named("A").map(|(_, found)| found.id),
            Some(NodeId(0))
        );
    }
}
