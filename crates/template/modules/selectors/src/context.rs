//! Bookkeeping attached to registered selectors.

use crate::matcher::SelectorMatcher;
use crate::selector::CssSelector;
use std::sync::Arc;

/// Index of a [`SelectorListContext`] within the matcher it was registered on.
pub(crate) type ListContextId = usize;

/// Selectors registered together as alternatives for one payload.
///
/// At most one of them is reported per match call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorListContext {
    /// The alternatives, in registration order.
    selectors: Vec<CssSelector>,
}

impl SelectorListContext {
    pub(crate) const fn new(selectors: Vec<CssSelector>) -> Self {
        Self { selectors }
    }

    /// The alternatives of this group.
    #[inline]
    pub fn selectors(&self) -> &[CssSelector] {
        &self.selectors
    }
}

/// Which OR-groups already reported a match during one match call.
#[derive(Debug)]
pub(crate) struct GroupMatchState {
    /// One flag per [`ListContextId`].
    already_matched: Vec<bool>,
}

impl GroupMatchState {
    /// All groups start out unmatched.
    pub(crate) fn new(group_count: usize) -> Self {
        Self {
            already_matched: vec![false; group_count],
        }
    }

    #[inline]
    pub(crate) fn is_matched(&self, group: ListContextId) -> bool {
        self.already_matched.get(group).copied().unwrap_or(false)
    }

    #[inline]
    pub(crate) fn mark_matched(&mut self, group: ListContextId) {
        if let Some(flag) = self.already_matched.get_mut(group) {
            *flag = true;
        }
    }
}

/// A registered selector together with its payload.
#[derive(Debug)]
pub(crate) struct SelectorContext<P> {
    /// The selector as registered, handed to the callback.
    selector: CssSelector,
    /// Shared with the other alternatives of the same registration.
    payload: Arc<P>,
    /// OR-group this selector belongs to, if registered as part of a list.
    list_context: Option<ListContextId>,
    /// Built from the selector's negations; `None` when there are none.
    not_matcher: Option<Box<SelectorMatcher<()>>>,
}

impl<P> SelectorContext<P> {
    pub(crate) fn new(
        selector: CssSelector,
        payload: Arc<P>,
        list_context: Option<ListContextId>,
    ) -> Self {
        let not_matcher = selector.has_negations().then(|| {
            Box::new(SelectorMatcher::<()>::create_not_matcher(
                selector.not_selectors(),
            ))
        });
        Self {
            selector,
            payload,
            list_context,
            not_matcher,
        }
    }

    /// Report this selector for `candidate` unless a negation rules it out.
    ///
    /// Returns false only when a negation matched. A context whose group
    /// already reported during this call returns true without calling back.
    pub(crate) fn finalize<'index, F>(
        &'index self,
        candidate: &CssSelector,
        state: &mut GroupMatchState,
        callback: &mut Option<F>,
    ) -> bool
    where
        F: FnMut(&'index CssSelector, &'index P),
    {
        let group_open = self.list_context.is_none_or(|group| !state.is_matched(group));
        if !group_open {
            return true;
        }
        if let Some(not_matcher) = &self.not_matcher
            && not_matcher.matches(candidate)
        {
            return false;
        }
        if let Some(report) = callback.as_mut() {
            if let Some(group) = self.list_context {
                state.mark_matched(group);
            }
            report(&self.selector, &*self.payload);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> CssSelector {
        CssSelector::parse(text)
            .ok()
            .and_then(|mut list| list.pop())
            .unwrap_or_default()
    }

    #[test]
    fn group_state_tracks_each_group() {
        let mut state = GroupMatchState::new(2);
        assert!(!state.is_matched(0));
        state.mark_matched(1);
        assert!(!state.is_matched(0));
        assert!(state.is_matched(1));
        // Unknown groups are never matched.
        state.mark_matched(7);
        assert!(!state.is_matched(7));
    }

    #[test]
    fn negation_disqualifies() {
        let context = SelectorContext::new(parse_one("div:not(.hidden)"), Arc::new(1u8), None);
        let mut hits = Vec::new();
        let mut callback = Some(|selector: &CssSelector, payload: &u8| {
            hits.push((selector.to_string(), *payload));
        });
        let mut state = GroupMatchState::new(0);

        assert!(context.finalize(&parse_one("div"), &mut state, &mut callback));
        assert!(!context.finalize(&parse_one("div.hidden"), &mut state, &mut callback));
        assert_eq!(hits, vec![("div:not(.hidden)".to_owned(), 1)]);
    }

    #[test]
    fn matched_group_is_skipped_but_succeeds() {
        let context = SelectorContext::new(parse_one("a"), Arc::new(()), Some(0));
        let mut count = 0usize;
        let mut callback = Some(|_: &CssSelector, _: &()| count += 1);
        let mut state = GroupMatchState::new(1);
        let candidate = parse_one("a");

        assert!(context.finalize(&candidate, &mut state, &mut callback));
        assert!(context.finalize(&candidate, &mut state, &mut callback));
        assert_eq!(count, 1);
    }
}
