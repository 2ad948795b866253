//! Directive selectors for the template compiler.
//!
//! Directives and components declare the elements they apply to with a small
//! CSS-like selector language: an element name, classes, attributes and
//! single-level `:not(...)` clauses. This crate parses those declarations and
//! indexes them so that the compiler can ask, for each template element,
//! which declarations apply.
//!
//! ```
//! use template_selectors::{CssSelector, SelectorMatcher};
//!
//! let mut matcher = SelectorMatcher::new();
//! matcher.add_selectables(CssSelector::parse("button[primary]:not(.disabled)")?, "PrimaryButton");
//!
//! let mut element = CssSelector::new();
//! element.set_element(Some("button"));
//! element.add_attribute("primary", Some("true"));
//!
//! let found: Vec<_> = matcher.collect_matches(&element).into_iter().map(|(_, name)| *name).collect();
//! assert_eq!(found, ["PrimaryButton"]);
//! # Ok::<(), template_selectors::ParseError>(())
//! ```

#![forbid(unsafe_code)]

mod context;
mod matcher;
mod parser;
mod selector;

// Re-export public API
pub use context::SelectorListContext;
pub use matcher::SelectorMatcher;
pub use parser::ParseError;
pub use selector::{CssSelector, WILDCARD_ELEMENT};
