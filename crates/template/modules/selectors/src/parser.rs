//! Selector string parsing.
//!
//! Grammar, one token at a time:
//! - `:not(` opens a negation, `)` closes it
//! - `name` or `*` sets the element
//! - `.name` adds a class
//! - `[name]` / `[name=value]` adds an attribute
//! - `,` (with optional surrounding whitespace) starts the next selector
//!
//! Anything else is skipped.

use crate::selector::{CssSelector, WILDCARD_ELEMENT};
use core::fmt;
use core::mem::take;
use std::error::Error;

/// Errors raised while parsing a selector string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// `:not(` appeared inside an open `:not(...)`.
    NestedNot,
    /// A top-level `,` appeared inside an open `:not(...)`.
    MultipleNotSelectors,
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestedNot => formatter.write_str("Nesting :not is not allowed in a selector"),
            Self::MultipleNotSelectors => {
                formatter.write_str("Multiple selectors in :not are not supported")
            }
        }
    }
}

impl Error for ParseError {}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
enum Tok {
    /// `:not(`
    NotOpen,
    /// Element name or `*`.
    Element(String),
    /// Class name, as written.
    Class(String),
    /// Attribute name and optional value, as written.
    Attr { name: String, value: Option<String> },
    /// `)`
    NotClose,
    /// Top-level `,`.
    Separator,
}

/// Tokenizer over a selector string.
struct SelectorTokenizer<'input> {
    /// Selector text.
    input: &'input str,
    /// Current cursor index into `input`, always on an ASCII boundary.
    index: usize,
}

/// Characters allowed in element and class names.
#[inline]
const fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-'
}

/// Characters allowed in attribute names.
#[inline]
const fn is_attr_name_byte(byte: u8) -> bool {
    is_word_byte(byte) || byte == b'*'
}

impl<'input> SelectorTokenizer<'input> {
    /// Construct a tokenizer from input.
    #[inline]
    const fn new(input: &'input str) -> Self {
        Self { input, index: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.index).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input
            .as_bytes()
            .get(self.index.saturating_add(offset))
            .copied()
    }

    #[inline]
    fn advance(&mut self, count: usize) {
        self.index = self.index.saturating_add(count);
    }

    /// Text between two cursor positions that sit on ASCII bytes.
    #[inline]
    fn slice(&self, start: usize, end: usize) -> String {
        self.input.get(start..end).unwrap_or_default().to_owned()
    }

    /// Return the next selector token, if any.
    fn next_token(&mut self) -> Option<Tok> {
        while let Some(current) = self.peek() {
            let token = match current {
                b':' if self
                    .input
                    .get(self.index..)
                    .is_some_and(|rest| rest.starts_with(":not(")) =>
                {
                    self.advance(":not(".len());
                    Some(Tok::NotOpen)
                }
                b'*' => {
                    self.advance(1);
                    Some(Tok::Element(WILDCARD_ELEMENT.to_owned()))
                }
                b'.' if self.peek_at(1).is_some_and(is_word_byte) => {
                    self.advance(1);
                    Some(Tok::Class(self.consume_word()))
                }
                b'[' => self.consume_attr(),
                b')' => {
                    self.advance(1);
                    Some(Tok::NotClose)
                }
                b',' => {
                    self.advance(1);
                    self.skip_whitespace();
                    Some(Tok::Separator)
                }
                byte if byte.is_ascii_whitespace() => self.consume_spaced_separator(),
                byte if is_word_byte(byte) => Some(Tok::Element(self.consume_word())),
                _ => None,
            };
            if token.is_some() {
                return token;
            }
            // Nothing matched here; move on by one byte.
            self.advance(1);
        }
        None
    }

    /// Consume a run of word characters.
    #[inline]
    fn consume_word(&mut self) -> String {
        let start = self.index;
        while self.peek().is_some_and(is_word_byte) {
            self.advance(1);
        }
        self.slice(start, self.index)
    }

    /// Whitespace only forms a token when a comma follows it.
    fn consume_spaced_separator(&mut self) -> Option<Tok> {
        let start = self.index;
        self.skip_whitespace();
        if self.peek() == Some(b',') {
            self.advance(1);
            self.skip_whitespace();
            return Some(Tok::Separator);
        }
        self.index = start;
        None
    }

    /// Parse `[name]` or `[name=value]`. Leaves the cursor untouched when the
    /// bracket does not form a complete attribute.
    fn consume_attr(&mut self) -> Option<Tok> {
        let start = self.index;
        self.advance(1);
        let name_start = self.index;
        while self.peek().is_some_and(is_attr_name_byte) {
            self.advance(1);
        }
        let name_end = self.index;
        if name_end == name_start {
            self.index = start;
            return None;
        }
        let name = self.slice(name_start, name_end);
        match self.peek() {
            Some(b']') => {
                self.advance(1);
                Some(Tok::Attr { name, value: None })
            }
            Some(b'=') => {
                let value_start = name_end.saturating_add(1);
                let Some(len) = self.input.get(value_start..).and_then(|rest| rest.find(']'))
                else {
                    self.index = start;
                    return None;
                };
                let value_end = value_start.saturating_add(len);
                let value = self.slice(value_start, value_end);
                self.index = value_end.saturating_add(1);
                Some(Tok::Attr {
                    name,
                    value: Some(value),
                })
            }
            _ => {
                self.index = start;
                None
            }
        }
    }

    /// Skip ASCII whitespace.
    #[inline]
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.advance(1);
        }
    }
}

/// Attach a finished `:not(...)` clause to its selector.
fn close_negation(selector: &mut CssSelector, mut not_selector: CssSelector) {
    not_selector.drop_redundant_wildcard(true);
    selector.add_not_selector(not_selector);
}

/// Close out one top-level selector.
fn finish_selector(
    results: &mut Vec<CssSelector>,
    mut selector: CssSelector,
    negation: Option<CssSelector>,
) {
    if let Some(not_selector) = negation {
        close_negation(&mut selector, not_selector);
    }
    selector.drop_redundant_wildcard(false);
    selector.normalize_wildcard();
    results.push(selector);
}

impl CssSelector {
    /// Parse a selector string into one selector per top-level `,` clause.
    ///
    /// # Errors
    /// Returns [`ParseError::NestedNot`] for `:not(` inside `:not(...)` and
    /// [`ParseError::MultipleNotSelectors`] for a `,` inside `:not(...)`.
    pub fn parse(selector: &str) -> Result<Vec<Self>, ParseError> {
        let mut results = Vec::new();
        let mut tokens = SelectorTokenizer::new(selector);
        let mut current = Self::default();
        // The open `:not(...)` clause, if any. Tokens go here while it is open.
        let mut negation: Option<Self> = None;

        while let Some(token) = tokens.next_token() {
            match token {
                Tok::NotOpen => {
                    if negation.is_some() {
                        return Err(ParseError::NestedNot);
                    }
                    negation = Some(Self::default());
                }
                Tok::Element(name) => {
                    negation
                        .as_mut()
                        .unwrap_or(&mut current)
                        .set_element(Some(&name));
                }
                Tok::Class(name) => {
                    negation
                        .as_mut()
                        .unwrap_or(&mut current)
                        .add_class_name(&name);
                }
                Tok::Attr { name, value } => {
                    negation
                        .as_mut()
                        .unwrap_or(&mut current)
                        .add_attribute(&name, value.as_deref());
                }
                Tok::NotClose => {
                    if let Some(not_selector) = negation.take() {
                        close_negation(&mut current, not_selector);
                    }
                }
                Tok::Separator => {
                    if negation.is_some() {
                        return Err(ParseError::MultipleNotSelectors);
                    }
                    finish_selector(&mut results, take(&mut current), None);
                }
            }
        }
        finish_selector(&mut results, current, negation);

        log::trace!(
            "parsed selector {selector:?} into {} selector(s): {}",
            results.len(),
            results
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(results)
    }
}
