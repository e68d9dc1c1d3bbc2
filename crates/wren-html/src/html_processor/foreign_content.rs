//! SVG and `MathML`.
//!
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

use super::{HtmlProcessor, Step, TreeToken};
use crate::elements::Namespace;
use crate::error::Result;

/// [§ 13.2.6.5 SVG tag name adjustments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "If the adjusted current node is an element in the SVG namespace, and
/// the token's tag name is one of the ones in the first column of the
/// following table, change the tag name to the name given in the
/// corresponding cell in the second column."
const SVG_TAG_NAME_ADJUSTMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("fedropshadow", "feDropShadow"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

/// [§ 13.2.6.3 Adjust SVG attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes)
///
/// HTML lowercases attribute names during tokenization, but SVG attribute
/// names are case-sensitive.
const SVG_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1",
/// "h2", "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing",
/// "menu", "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span",
/// "strong", "strike", "sub", "sup", "table", "tt", "u", "ul", "var""
const BREAKOUT_TAGS: &[&str] = &[
    "B", "BIG", "BLOCKQUOTE", "BODY", "BR", "CENTER", "CODE", "DD", "DIV", "DL", "DT", "EM",
    "EMBED", "H1", "H2", "H3", "H4", "H5", "H6", "HEAD", "HR", "I", "IMG", "LI", "LISTING",
    "MENU", "META", "NOBR", "OL", "P", "PRE", "RUBY", "S", "SMALL", "SPAN", "STRONG",
    "STRIKE", "SUB", "SUP", "TABLE", "TT", "U", "UL", "VAR",
];

/// The mixed-case SVG name for a lowercase tag name, if it has one.
pub(crate) fn adjusted_svg_tag_name(lowercase: &str) -> Option<&'static str> {
    SVG_TAG_NAME_ADJUSTMENTS
        .iter()
        .find(|(from, _)| *from == lowercase)
        .map(|&(_, to)| to)
}

/// The DOM name of a lowercase attribute name on an element in `namespace`.
pub(crate) fn adjusted_attribute_name(namespace: Namespace, lowercase: &str) -> String {
    let adjusted = match namespace {
        Namespace::Html => None,
        Namespace::Svg => SVG_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(from, _)| *from == lowercase)
            .map(|&(_, to)| to),
        // "If the attribute's name is "definitionurl", set the attribute's
        // name to "definitionURL"."
        Namespace::MathMl => (lowercase == "definitionurl").then_some("definitionURL"),
    };
    // Namespaced attributes (`xlink:href`, `xml:lang`) keep their prefixed
    // form.
    adjusted.unwrap_or(lowercase).to_string()
}

impl HtmlProcessor {
    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "If the stack of open elements is empty; If the adjusted current node
    /// is an element in the HTML namespace; If the adjusted current node is a
    /// `MathML` text integration point and the token is a start tag whose tag
    /// name is neither "mglyph" nor "malignmark"; If the adjusted current
    /// node is a `MathML` text integration point and the token is a character
    /// token; If the adjusted current node is a `MathML` annotation-xml element
    /// and the token is a start tag whose tag name is "svg"; If the adjusted
    /// current node is an HTML integration point and the token is a start
    /// tag; If the adjusted current node is an HTML integration point and the
    /// token is a character token"
    ///
    /// "Process the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    ///
    /// "Otherwise: Process the token according to the rules given in the
    /// section for parsing tokens in foreign content."
    pub(crate) fn uses_foreign_rules(&self, token: &TreeToken) -> bool {
        let Some(node) = self.stack.current() else {
            return false;
        };
        if node.namespace == Namespace::Html {
            return false;
        }

        let start_name = match token {
            TreeToken::StartTag { name, .. } => Some(name.as_str()),
            _ => None,
        };
        let is_text = *token == TreeToken::Text;

        if node.is_mathml_text_integration_point()
            && (is_text || start_name.is_some_and(|name| !matches!(name, "MGLYPH" | "MALIGNMARK")))
        {
            return false;
        }
        if node.namespace == Namespace::MathMl
            && node.name == "ANNOTATION-XML"
            && start_name == Some("SVG")
        {
            return false;
        }
        if node.is_html_integration_point() && (is_text || start_name.is_some()) {
            return false;
        }
        true
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(crate) fn step_in_foreign_content(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A character token"
            // "Insert the token's character."
            //
            // "A comment token"
            // "Insert a comment."
            TreeToken::Text | TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype | TreeToken::Nothing => Ok(Step::Ignore),

            TreeToken::StartTag { name, self_closing } => {
                if self.breaks_out_of_foreign_content(name) {
                    return self.break_out_of_foreign_content(token);
                }

                // "Any other start tag"
                // "If the adjusted current node is an element in the MathML
                // namespace, adjust MathML attributes for the token."
                // "Insert a foreign element for the token, with adjusted
                // current node's namespace and false."
                let namespace = self
                    .stack
                    .current()
                    .map_or(Namespace::Html, |node| node.namespace);
                self.insert_foreign_element(name, namespace, *self_closing);
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "br", "p""
            // "Parse error."
            // "While the current node is not a MathML text integration point,
            // an HTML integration point, or an element in the HTML namespace,
            // pop elements from the stack of open elements."
            // "Reprocess the token according to the rules given in the
            // section corresponding to the current insertion mode in HTML
            // content."
            TreeToken::EndTag { name } if name == "BR" || name == "P" => {
                self.pop_to_html_content();
                self.step_in(self.mode, token)
            }

            TreeToken::EndTag { name } => self.foreign_end_tag(name, token),
        }
    }

    /// Whether a start tag in foreign content ends it. `FONT` only does
    /// with a `color`, `face` or `size` attribute.
    fn breaks_out_of_foreign_content(&self, name: &str) -> bool {
        if BREAKOUT_TAGS.contains(&name) {
            return true;
        }
        name == "FONT"
            && ["color", "face", "size"]
                .iter()
                .any(|attribute| matches!(self.tags.get_attribute(attribute), Ok(Some(_))))
    }

    /// "Parse error."
    /// "While the current node is not a `MathML` text integration point, an
    /// HTML integration point, or an element in the HTML namespace, pop
    /// elements from the stack of open elements."
    /// "Reprocess the token according to the rules given in the section
    /// corresponding to the current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &TreeToken) -> Result<Step> {
        self.pop_to_html_content();
        self.step_in(self.mode, token)
    }

    fn pop_to_html_content(&mut self) {
        while let Some(node) = self.stack.current() {
            if node.namespace == Namespace::Html
                || node.is_mathml_text_integration_point()
                || node.is_html_integration_point()
            {
                break;
            }
            if self.stack.pop().is_none() {
                break;
            }
        }
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, name: &str, token: &TreeToken) -> Result<Step> {
        let floor = self.stack.floor();
        let mut index = self.stack.len();

        // STEP 1: "Initialize node to be the current node (the bottommost
        //          node of the stack)."
        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not
        //          the same as the tag name of the token, then this is a
        //          parse error."
        while index > floor {
            index -= 1;
            let Some(node) = self.stack.get(index) else {
                break;
            };

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is
            //          the same as the tag name of the token, pop elements
            //          from the stack of open elements until node has been
            //          popped from the stack, and then return."
            if node.name == name && node.namespace != Namespace::Html {
                self.tail = self.stack.pop_through(index);
                return Ok(Step::Yield);
            }

            // STEP 6: "If node is not an element in the HTML namespace,
            //          return to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules
            //          given in the section corresponding to the current
            //          insertion mode in HTML content."
            if node.namespace == Namespace::Html {
                return self.step_in(self.mode, token);
            }
        }
        Ok(Step::Ignore)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_tag_names_regain_case() {
        assert_eq!(
            adjusted_svg_tag_name("foreignobject"),
            Some("foreignObject")
        );
        assert_eq!(
            adjusted_svg_tag_name("lineargradient"),
            Some("linearGradient")
        );
        assert_eq!(adjusted_svg_tag_name("circle"), None);
    }

    #[test]
    fn test_attribute_names_per_namespace() {
        assert_eq!(
            adjusted_attribute_name(Namespace::Svg, "viewbox"),
            "viewBox"
        );
        assert_eq!(
            adjusted_attribute_name(Namespace::Html, "viewbox"),
            "viewbox"
        );
        assert_eq!(
            adjusted_attribute_name(Namespace::MathMl, "definitionurl"),
            "definitionURL"
        );
        assert_eq!(
            adjusted_attribute_name(Namespace::Svg, "xlink:href"),
            "xlink:href"
        );
    }
}
