//! Directive selector index.
//!
//! Registered selectors are stored in a trie keyed by their discriminating
//! tokens, in the fixed order element, classes, attributes. The last token of
//! a selector is *terminal* and holds its payload; every earlier token is
//! *partial* and routes into a nested matcher.
//!
//! Matching looks up each token of the candidate in the terminal and
//! partial tables. Nested matchers are searched with the whole candidate again,
//! so the trie keys alone narrow what can be reached.

use crate::context::{GroupMatchState, ListContextId, SelectorContext, SelectorListContext};
use crate::selector::{CssSelector, EMPTY_ATTR_VALUE, WILDCARD_ELEMENT};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Token → payloads of the selectors that end at that token.
type TerminalMap<P> = FxHashMap<String, Vec<SelectorContext<P>>>;
/// Token → matcher for the remaining tokens.
type PartialMap<P> = FxHashMap<String, SelectorMatcher<P>>;

/// One step of a selector's path through the index.
#[derive(Debug)]
enum IndexKey {
    Element(String),
    Class(String),
    Attr { name: String, value: String },
}

impl IndexKey {
    /// Discriminating tokens of `selector` in index order.
    fn path_of(selector: &CssSelector) -> Vec<Self> {
        let has_more = !selector.class_names().is_empty() || !selector.attrs().is_empty();
        // `*` only needs a key of its own when nothing else narrows the match.
        let element = selector
            .element()
            .filter(|name| !(has_more && *name == WILDCARD_ELEMENT))
            .map(|name| Self::Element(name.to_owned()));
        let classes = selector
            .class_names()
            .iter()
            .map(|name| Self::Class(name.clone()));
        let attrs = selector.attrs().iter().map(|(name, value)| Self::Attr {
            name: name.clone(),
            value: value.clone(),
        });
        element.into_iter().chain(classes).chain(attrs).collect()
    }
}

/// Index of selectors that answers "which of them does this element satisfy".
///
/// `P` is the payload handed back for every reported selector, typically the
/// identity of the directive that declared it.
#[derive(Debug)]
pub struct SelectorMatcher<P> {
    element_map: TerminalMap<P>,
    element_partial_map: PartialMap<P>,
    class_map: TerminalMap<P>,
    class_partial_map: PartialMap<P>,
    attr_value_map: FxHashMap<String, TerminalMap<P>>,
    attr_value_partial_map: FxHashMap<String, PartialMap<P>>,
    /// OR-groups registered on this matcher.
    list_contexts: Vec<SelectorListContext>,
}

impl<P> Default for SelectorMatcher<P> {
    fn default() -> Self {
        Self {
            element_map: FxHashMap::default(),
            element_partial_map: FxHashMap::default(),
            class_map: FxHashMap::default(),
            class_partial_map: FxHashMap::default(),
            attr_value_map: FxHashMap::default(),
            attr_value_partial_map: FxHashMap::default(),
            list_contexts: Vec::new(),
        }
    }
}

impl SelectorMatcher<()> {
    /// Build the matcher used to test a selector's `:not(...)` clauses.
    ///
    /// A candidate is disqualified if anything in it matches.
    pub fn create_not_matcher(not_selectors: &[CssSelector]) -> Self {
        let mut not_matcher = Self::new();
        not_matcher.add_selectables(not_selectors.to_vec(), ());
        not_matcher
    }
}

impl<P> SelectorMatcher<P> {
    /// Create an empty matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.element_map.is_empty()
            && self.element_partial_map.is_empty()
            && self.class_map.is_empty()
            && self.class_partial_map.is_empty()
            && self.attr_value_map.is_empty()
            && self.attr_value_partial_map.is_empty()
    }

    /// OR-groups registered so far, in registration order.
    pub fn list_contexts(&self) -> &[SelectorListContext] {
        &self.list_contexts
    }

    /// Register `selectors` under one payload.
    ///
    /// More than one selector forms an OR-group: a single match call reports
    /// at most one of them.
    pub fn add_selectables(&mut self, selectors: Vec<CssSelector>, payload: P) {
        let payload = Arc::new(payload);
        let list_context = (selectors.len() > 1).then(|| {
            let id = self.list_contexts.len();
            self.list_contexts
                .push(SelectorListContext::new(selectors.clone()));
            log::trace!("registered OR-group #{id} with {} selectors", selectors.len());
            id
        });
        for selector in selectors {
            self.add_selectable_with(selector, Arc::clone(&payload), list_context);
        }
    }

    /// Register a single selector.
    pub fn add_selectable(&mut self, selector: CssSelector, payload: P) {
        self.add_selectable_with(selector, Arc::new(payload), None);
    }

    fn add_selectable_with(
        &mut self,
        selector: CssSelector,
        payload: Arc<P>,
        list_context: Option<ListContextId>,
    ) {
        let mut path = IndexKey::path_of(&selector);
        let Some(terminal) = path.pop() else {
            log::debug!("selector `{selector}` has no element, class or attribute; not indexed");
            return;
        };
        let mut matcher = self;
        for key in path {
            matcher = matcher.partial_entry(key);
        }
        matcher
            .terminal_entry(terminal)
            .push(SelectorContext::new(selector, payload, list_context));
    }

    /// Nested matcher for `key`, created on first use.
    fn partial_entry(&mut self, key: IndexKey) -> &mut Self {
        match key {
            IndexKey::Element(name) => self.element_partial_map.entry(name).or_default(),
            IndexKey::Class(name) => self.class_partial_map.entry(name).or_default(),
            IndexKey::Attr { name, value } => self
                .attr_value_partial_map
                .entry(name)
                .or_default()
                .entry(value)
                .or_default(),
        }
    }

    /// Terminal list for `key`, created on first use.
    fn terminal_entry(&mut self, key: IndexKey) -> &mut Vec<SelectorContext<P>> {
        match key {
            IndexKey::Element(name) => self.element_map.entry(name).or_default(),
            IndexKey::Class(name) => self.class_map.entry(name).or_default(),
            IndexKey::Attr { name, value } => self
                .attr_value_map
                .entry(name)
                .or_default()
                .entry(value)
                .or_default(),
        }
    }

    /// Report every registered selector that `candidate` satisfies.
    ///
    /// `callback` receives the registered selector and its payload. Returns
    /// true if any selector matched.
    pub fn match_selector<'index, F>(&'index self, candidate: &CssSelector, callback: F) -> bool
    where
        F: FnMut(&'index CssSelector, &'index P),
    {
        let mut state = GroupMatchState::new(self.list_contexts.len());
        let matched = self.match_in(candidate, &mut state, &mut Some(callback));
        log::trace!("matched `{candidate}`: {matched}");
        matched
    }

    /// True if any registered selector matches `candidate`.
    pub fn matches(&self, candidate: &CssSelector) -> bool {
        let mut state = GroupMatchState::new(self.list_contexts.len());
        self.match_in(candidate, &mut state, &mut None::<fn(&CssSelector, &P)>)
    }

    /// Every `(selector, payload)` reported for `candidate`, in report order.
    pub fn collect_matches<'index>(
        &'index self,
        candidate: &CssSelector,
    ) -> Vec<(&'index CssSelector, &'index P)> {
        let mut found = Vec::new();
        self.match_selector(candidate, |selector, payload| found.push((selector, payload)));
        found
    }

    fn match_in<'index, F>(
        &'index self,
        candidate: &CssSelector,
        state: &mut GroupMatchState,
        callback: &mut Option<F>,
    ) -> bool
    where
        F: FnMut(&'index CssSelector, &'index P),
    {
        let mut result = false;

        if let Some(element) = candidate.element() {
            result |= Self::match_terminal(&self.element_map, element, candidate, state, callback);
            result |=
                Self::match_partial(&self.element_partial_map, element, candidate, state, callback);
        }

        for class_name in candidate.class_names() {
            result |= Self::match_terminal(&self.class_map, class_name, candidate, state, callback);
            result |=
                Self::match_partial(&self.class_partial_map, class_name, candidate, state, callback);
        }

        for (name, value) in candidate.attrs() {
            // `[name]` matches whatever value the candidate carries.
            let check_presence = !value.is_empty();
            if let Some(terminal_values) = self.attr_value_map.get(name) {
                if check_presence {
                    result |= Self::match_terminal(
                        terminal_values,
                        EMPTY_ATTR_VALUE,
                        candidate,
                        state,
                        callback,
                    );
                }
                result |= Self::match_terminal(terminal_values, value, candidate, state, callback);
            }
            if let Some(partial_values) = self.attr_value_partial_map.get(name) {
                if check_presence {
                    result |= Self::match_partial(
                        partial_values,
                        EMPTY_ATTR_VALUE,
                        candidate,
                        state,
                        callback,
                    );
                }
                result |= Self::match_partial(partial_values, value, candidate, state, callback);
            }
        }

        result
    }

    /// Finalize the selectors stored under `name` and under `*`.
    fn match_terminal<'index, F>(
        map: &'index TerminalMap<P>,
        name: &str,
        candidate: &CssSelector,
        state: &mut GroupMatchState,
        callback: &mut Option<F>,
    ) -> bool
    where
        F: FnMut(&'index CssSelector, &'index P),
    {
        let named = map.get(name).into_iter().flatten();
        let wildcard = if name == WILDCARD_ELEMENT {
            None
        } else {
            map.get(WILDCARD_ELEMENT)
        };
        let mut result = false;
        for selectable in named.chain(wildcard.into_iter().flatten()) {
            result |= selectable.finalize(candidate, state, callback);
        }
        result
    }

    /// Continue matching in the nested matcher stored under `name`.
    fn match_partial<'index, F>(
        map: &'index PartialMap<P>,
        name: &str,
        candidate: &CssSelector,
        state: &mut GroupMatchState,
        callback: &mut Option<F>,
    ) -> bool
    where
        F: FnMut(&'index CssSelector, &'index P),
    {
        map.get(name)
            .is_some_and(|nested| nested.match_in(candidate, state, callback))
    }
}
