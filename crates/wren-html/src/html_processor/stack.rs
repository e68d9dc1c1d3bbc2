//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)

use crate::elements::{self, Namespace};

/// Identity of an element the processor has opened. Ids are never reused
/// within one pass over the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// An element on the stack of open elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) id: NodeId,
    /// Uppercase tag name.
    pub(crate) name: String,
    pub(crate) namespace: Namespace,
    /// Set on `MathML` `annotation-xml` elements whose `encoding` makes them
    /// an HTML integration point.
    pub(crate) html_annotation: bool,
}

impl Element {
    /// Whether this is the HTML element `name` (uppercase).
    pub(crate) fn is(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.name == name
    }

    /// Whether this is an HTML element named any of `names`.
    pub(crate) fn is_one_of(&self, names: &[&str]) -> bool {
        self.namespace == Namespace::Html && names.contains(&self.name.as_str())
    }

    /// [§ 13.2.4.2 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(crate) fn is_special(&self) -> bool {
        match self.namespace {
            Namespace::Html => elements::is_special(&self.name),
            Namespace::MathMl => matches!(
                self.name.as_str(),
                "MI" | "MO" | "MN" | "MS" | "MTEXT" | "ANNOTATION-XML"
            ),
            Namespace::Svg => matches!(self.name.as_str(), "FOREIGNOBJECT" | "DESC" | "TITLE"),
        }
    }

    /// [§ 13.2.6.5 MathML text integration point](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
    ///
    /// "A node is a `MathML` text integration point if it is one of the
    /// following elements: A `MathML` mi element, A `MathML` mo element, A
    /// `MathML` mn element, A `MathML` ms element, A `MathML` mtext element"
    pub(crate) fn is_mathml_text_integration_point(&self) -> bool {
        self.namespace == Namespace::MathMl
            && matches!(self.name.as_str(), "MI" | "MO" | "MN" | "MS" | "MTEXT")
    }

    /// [§ 13.2.6.5 HTML integration point](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    ///
    /// "A `MathML` annotation-xml element whose start tag token had an
    /// attribute with the name "encoding" whose value was an ASCII
    /// case-insensitive match for the string "text/html" [or]
    /// "application/xhtml+xml"; An SVG foreignObject element; An SVG desc
    /// element; An SVG title element"
    pub(crate) fn is_html_integration_point(&self) -> bool {
        match self.namespace {
            Namespace::Html => false,
            Namespace::MathMl => self.html_annotation,
            Namespace::Svg => matches!(self.name.as_str(), "FOREIGNOBJECT" | "DESC" | "TITLE"),
        }
    }
}

/// Default scope boundaries in the HTML namespace.
///
/// "applet, caption, html, table, td, th, marquee, object, template, `MathML`
/// mi, `MathML` mo, `MathML` mn, `MathML` ms, `MathML` mtext, `MathML`
/// annotation-xml, SVG foreignObject, SVG desc, SVG title"
const DEFAULT_SCOPE: &[&str] = &[
    "APPLET", "CAPTION", "HTML", "TABLE", "TD", "TH", "MARQUEE", "OBJECT", "TEMPLATE",
];

/// Which elements end a scope search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// [has an element in scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
    Default,
    /// Default scope plus `ol` and `ul`.
    ListItem,
    /// Default scope plus `button`.
    Button,
    /// Only `html`, `table` and `template`.
    Table,
}

impl Scope {
    fn is_boundary(self, element: &Element) -> bool {
        match self {
            Self::Default => is_default_boundary(element),
            Self::ListItem => is_default_boundary(element) || element.is_one_of(&["OL", "UL"]),
            Self::Button => is_default_boundary(element) || element.is("BUTTON"),
            Self::Table => element.is_one_of(&["HTML", "TABLE", "TEMPLATE"]),
        }
    }
}

fn is_default_boundary(element: &Element) -> bool {
    match element.namespace {
        Namespace::Html => DEFAULT_SCOPE.contains(&element.name.as_str()),
        Namespace::MathMl | Namespace::Svg => element.is_special(),
    }
}

/// The stack of open elements.
///
/// Entries below the floor belong to the fragment context (or the root
/// `HTML` element) and are never popped or found by scope searches.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenElements {
    elements: Vec<Element>,
    floor: usize,
}

impl OpenElements {
    pub(crate) const fn new() -> Self {
        Self {
            elements: Vec::new(),
            floor: 0,
        }
    }

    /// Protect every element currently on the stack.
    pub(crate) fn protect_all(&mut self) {
        self.floor = self.elements.len();
    }

    pub(crate) fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Pop the current node unless it is protected.
    pub(crate) fn pop(&mut self) -> Option<Element> {
        if self.elements.len() > self.floor {
            self.elements.pop()
        } else {
            None
        }
    }

    /// The bottommost node of the stack.
    pub(crate) fn current(&self) -> Option<&Element> {
        self.elements.last()
    }

    pub(crate) fn current_is(&self, name: &str) -> bool {
        self.current().is_some_and(|element| element.is(name))
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn floor(&self) -> usize {
        self.floor
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.elements.iter()
    }

    /// The unprotected elements, from the root outwards.
    pub(crate) fn unprotected(&self) -> &[Element] {
        &self.elements[self.floor.min(self.elements.len())..]
    }

    pub(crate) fn position(&self, id: NodeId) -> Option<usize> {
        self.elements.iter().rposition(|element| element.id == id)
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }

    /// Whether an HTML element named `name` is on the stack, protected
    /// entries excluded.
    pub(crate) fn contains_named(&self, name: &str) -> bool {
        self.unprotected().iter().any(|element| element.is(name))
    }

    /// [§ 13.2.4.3 has an element in a specific scope](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    pub(crate) fn has_in_scope(&self, name: &str, scope: Scope) -> bool {
        self.has_any_in_scope(&[name], scope)
    }

    /// Like [`OpenElements::has_in_scope`] with several target names.
    pub(crate) fn has_any_in_scope(&self, names: &[&str], scope: Scope) -> bool {
        for element in self.unprotected().iter().rev() {
            if element.is_one_of(names) {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Whether the element `id` itself is in `scope`.
    pub(crate) fn has_node_in_scope(&self, id: NodeId, scope: Scope) -> bool {
        for element in self.unprotected().iter().rev() {
            if element.id == id {
                return true;
            }
            if scope.is_boundary(element) {
                return false;
            }
        }
        false
    }

    /// Pop until the HTML element `name` has been popped. Returns it.
    pub(crate) fn pop_until(&mut self, name: &str) -> Option<Element> {
        self.pop_until_one_of(&[name])
    }

    /// Pop until an HTML element named any of `names` has been popped.
    pub(crate) fn pop_until_one_of(&mut self, names: &[&str]) -> Option<Element> {
        while let Some(element) = self.pop() {
            if element.is_one_of(names) {
                return Some(element);
            }
        }
        None
    }

    /// Pop every element above and including `index`, returning the one at
    /// `index`.
    pub(crate) fn pop_through(&mut self, index: usize) -> Option<Element> {
        if index < self.floor || index >= self.elements.len() {
            return None;
        }
        let element = self.elements.get(index).cloned();
        self.elements.truncate(index);
        element
    }

    /// Remove the element `id` wherever it is.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Element> {
        let index = self.position(id)?;
        (index >= self.floor).then(|| self.elements.remove(index))
    }

    /// Pop while the current node is not one of `names` (HTML namespace).
    /// Protected elements stop the clearing too.
    pub(crate) fn clear_back_to(&mut self, names: &[&str]) {
        while let Some(current) = self.current() {
            if current.is_one_of(names) {
                break;
            }
            if self.pop().is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(id: usize, name: &str) -> Element {
        Element {
            id: NodeId(id),
            name: name.to_string(),
            namespace: Namespace::Html,
            html_annotation: false,
        }
    }

    fn stack(names: &[&str]) -> OpenElements {
        let mut stack = OpenElements::new();
        for (id, name) in names.iter().enumerate() {
            stack.push(html(id, name));
        }
        stack
    }

    #[test]
    fn test_scope_stops_at_boundaries() {
        let stack = stack(&["HTML", "BODY", "P", "TABLE", "TR", "TD", "SPAN"]);
        assert!(stack.has_in_scope("SPAN", Scope::Default));
        assert!(stack.has_in_scope("TD", Scope::Default));
        assert!(!stack.has_in_scope("P", Scope::Default));
        assert!(stack.has_in_scope("TR", Scope::Table));
        assert!(!stack.has_in_scope("BODY", Scope::Table));
    }

    #[test]
    fn test_button_and_list_item_scopes() {
        let stack = stack(&["HTML", "BODY", "P", "BUTTON", "SPAN"]);
        assert!(stack.has_in_scope("P", Scope::Default));
        assert!(!stack.has_in_scope("P", Scope::Button));

        let stack = self::stack(&["HTML", "BODY", "LI", "UL", "SPAN"]);
        assert!(stack.has_in_scope("LI", Scope::Default));
        assert!(!stack.has_in_scope("LI", Scope::ListItem));
    }

    #[test]
    fn test_foreign_boundaries_are_namespaced() {
        let mut stack = stack(&["HTML", "BODY", "P"]);
        stack.push(Element {
            namespace: Namespace::Svg,
            ..html(3, "SVG")
        });
        stack.push(Element {
            namespace: Namespace::Svg,
            ..html(4, "TITLE")
        });
        assert!(!stack.has_in_scope("P", Scope::Default));
        assert!(!stack.has_in_scope("TITLE", Scope::Default));
    }

    #[test]
    fn test_protected_entries_survive_popping() {
        let mut stack = stack(&["HTML", "DIV"]);
        stack.protect_all();
        stack.push(html(2, "P"));
        stack.push(html(3, "DIV"));

        assert!(!stack.has_in_scope("HTML", Scope::Default));
        assert_eq!(
            stack.pop_until("DIV").map(|element| element.id),
            Some(NodeId(3))
        );
        assert_eq!(stack.pop_until("DIV"), None);
        assert_eq!(stack.len(), 2);
        assert!(stack.current_is("DIV"));
    }

    #[test]
    fn test_clear_back_to_table_context() {
        let mut stack = stack(&["HTML", "BODY", "TABLE", "TBODY", "TR"]);
        stack.clear_back_to(&["TABLE", "TEMPLATE", "HTML"]);
        assert!(stack.current_is("TABLE"));
        assert_eq!(stack.len(), 3);
    }
}
