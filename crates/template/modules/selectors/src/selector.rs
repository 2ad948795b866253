//! Selector data model.
//!
//! A [`CssSelector`] describes one compound selector as it appears in a
//! directive declaration or as it is synthesized for a template element:
//! an optional element name, class names, attribute/value pairs and
//! single-level negations.

use core::fmt;

/// Value stored for an attribute that only has to be present.
pub(crate) const EMPTY_ATTR_VALUE: &str = "";

/// Wildcard element name.
pub const WILDCARD_ELEMENT: &str = "*";

/// A compound selector: element, classes, attributes and `:not(...)` clauses.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CssSelector {
    /// Case-sensitive element name, `*`, or unset.
    element: Option<String>,
    /// Lower-cased class names in declaration order.
    class_names: Vec<String>,
    /// Attribute name and lower-cased value, in declaration order.
    attrs: Vec<(String, String)>,
    /// One entry per `:not(...)` clause.
    not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    /// Create an empty selector.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Element name, if any.
    #[inline]
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Class names in declaration order.
    #[inline]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Attribute `(name, value)` pairs in declaration order.
    #[inline]
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Attributes as a flat, alternating name/value sequence.
    pub fn attr_tokens(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .iter()
            .flat_map(|(name, value)| [name.as_str(), value.as_str()])
    }

    /// Negated sub-selectors, one per `:not(...)` clause.
    #[inline]
    pub fn not_selectors(&self) -> &[Self] {
        &self.not_selectors
    }

    /// True if at least one `:not(...)` clause is present.
    #[inline]
    pub fn has_negations(&self) -> bool {
        !self.not_selectors.is_empty()
    }

    /// Set (or clear) the element name.
    pub fn set_element(&mut self, element: Option<&str>) {
        self.element = element.map(str::to_owned);
    }

    /// Append a class name; it is stored lower-cased.
    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    /// Append an attribute. A missing value means "present with any value".
    pub fn add_attribute(&mut self, name: &str, value: Option<&str>) {
        let value = value.map_or_else(|| EMPTY_ATTR_VALUE.to_owned(), str::to_lowercase);
        self.attrs.push((name.to_owned(), value));
    }

    /// Append a negated sub-selector.
    pub fn add_not_selector(&mut self, selector: Self) {
        self.not_selectors.push(selector);
    }

    /// True iff only an element name is set.
    pub fn is_element_selector(&self) -> bool {
        self.element.is_some()
            && self.class_names.is_empty()
            && self.attrs.is_empty()
            && self.not_selectors.is_empty()
    }

    /// True if the selector has no element, class or attribute to index by.
    pub(crate) fn has_no_discriminators(&self) -> bool {
        self.element.is_none() && self.class_names.is_empty() && self.attrs.is_empty()
    }

    /// Forget a `*` element that narrows nothing: next to a class or an
    /// attribute, or anywhere inside a `:not(...)` clause.
    pub(crate) fn drop_redundant_wildcard(&mut self, negated: bool) {
        let redundant = negated || !self.class_names.is_empty() || !self.attrs.is_empty();
        if redundant && self.element.as_deref() == Some(WILDCARD_ELEMENT) {
            self.element = None;
        }
    }

    /// A selector made only of negations matches any element.
    pub(crate) fn normalize_wildcard(&mut self) {
        if self.has_negations() && self.has_no_discriminators() {
            self.element = Some(WILDCARD_ELEMENT.to_owned());
        }
    }

    /// Minimal markup for an element that this selector matches.
    ///
    /// `div.a.b[x][y=z]` becomes `<div class="a b" x y="z"></div>`.
    pub fn matching_element_template(&self) -> String {
        let tag_name = self.element.as_deref().unwrap_or("div");
        let mut out = format!("<{tag_name}");
        if !self.class_names.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&self.class_names.join(" "));
            out.push('"');
        }
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
        }
        out.push_str("></");
        out.push_str(tag_name);
        out.push('>');
        out
    }
}

impl fmt::Display for CssSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(element) = &self.element {
            formatter.write_str(element)?;
        }
        for class_name in &self.class_names {
            write!(formatter, ".{class_name}")?;
        }
        for (name, value) in &self.attrs {
            if value.is_empty() {
                write!(formatter, "[{name}]")?;
            } else {
                write!(formatter, "[{name}={value}]")?;
            }
        }
        for not_selector in &self.not_selectors {
            write!(formatter, ":not({not_selector})")?;
        }
        Ok(())
    }
}
