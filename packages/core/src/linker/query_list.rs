//! Query List
//!
//! A live, ordered list of query results. The list is owned by the query
//! registry, which resets it on every recomputation; consumers read it and
//! subscribe to its change stream.

use std::fmt;

use crate::render3::interfaces::handle::{DirectiveInstance, DirectiveType};

use super::refs::QueryValue;

/// Event delivered to query list subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryListEvent<'a> {
    /// The results were recomputed; carries the current results.
    Changed(&'a [QueryValue]),
    /// The list was destroyed. No further events follow.
    Completed,
}

/// Handle returned by [`QueryList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(usize);

type Observer = Box<dyn FnMut(QueryListEvent<'_>)>;

/// Whether two result sequences differ element-wise.
pub fn results_differ(previous: &[QueryValue], next: &[QueryValue]) -> bool {
    previous.len() != next.len() || previous.iter().zip(next).any(|(a, b)| a != b)
}

pub struct QueryList {
    results: Vec<QueryValue>,
    dirty: bool,
    version: u64,
    changes_detected: bool,
    emit_distinct_changes_only: bool,
    observers: Vec<Option<Observer>>,
    destroyed: bool,
}

impl QueryList {
    /// Creates an empty, dirty list. The first `reset` always counts as a
    /// change since there is no previous snapshot to compare with.
    pub fn new(emit_distinct_changes_only: bool) -> Self {
        QueryList {
            results: Vec::new(),
            dirty: true,
            version: 0,
            changes_detected: false,
            emit_distinct_changes_only,
            observers: Vec::new(),
            destroyed: false,
        }
    }

    /// Replaces the contents with `items`, returning whether they changed.
    /// Clears the dirty flag.
    pub fn reset(&mut self, items: Vec<QueryValue>) -> bool {
        if self.destroyed {
            return false;
        }
        let changed = self.version == 0 || results_differ(&self.results, &items);
        if changed {
            self.results = items;
            self.version += 1;
        }
        self.changes_detected = changed;
        self.dirty = false;
        changed
    }

    /// Delivers the current results to subscribers if the last `reset`
    /// changed them, or unconditionally when distinct-only emission is off.
    pub fn notify_on_changes(&mut self) {
        if self.destroyed || !(self.changes_detected || !self.emit_distinct_changes_only) {
            return;
        }
        for observer in self.observers.iter_mut().flatten() {
            observer(QueryListEvent::Changed(&self.results));
        }
    }

    pub fn set_dirty(&mut self) {
        if !self.destroyed {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of content-changing resets so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn first(&self) -> Option<&QueryValue> {
        self.results.first()
    }

    pub fn last(&self) -> Option<&QueryValue> {
        self.results.last()
    }

    pub fn get(&self, index: usize) -> Option<&QueryValue> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryValue> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[QueryValue] {
        &self.results
    }

    pub fn to_vec(&self) -> Vec<QueryValue> {
        self.results.clone()
    }

    /// Directive instances of the given type among the results.
    pub fn instances_of(&self, directive: DirectiveType) -> Vec<DirectiveInstance> {
        self.results
            .iter()
            .filter_map(QueryValue::as_instance)
            .filter(|d| d.directive == directive)
            .collect()
    }

    /// Registers an observer for the change stream. Subscribing to a destroyed
    /// list completes the observer immediately.
    pub fn subscribe<F>(&mut self, observer: F) -> Subscription
    where
        F: FnMut(QueryListEvent<'_>) + 'static,
    {
        let mut observer: Observer = Box::new(observer);
        let subscription = Subscription(self.observers.len());
        if self.destroyed {
            observer(QueryListEvent::Completed);
            self.observers.push(None);
        } else {
            self.observers.push(Some(observer));
        }
        subscription
    }

    /// Removes an observer. Returns whether it was still subscribed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers
            .get_mut(subscription.0)
            .and_then(Option::take)
            .is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.iter().flatten().count()
    }

    /// Completes the change stream and drops every observer and result.
    /// Terminal.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.dirty = false;
        self.results = Vec::new();
        for mut observer in self.observers.iter_mut().filter_map(Option::take) {
            observer(QueryListEvent::Completed);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Default for QueryList {
    fn default() -> Self {
        QueryList::new(true)
    }
}

impl fmt::Debug for QueryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryList")
            .field("results", &self.results)
            .field("dirty", &self.dirty)
            .field("version", &self.version)
            .field("subscribers", &self.subscriber_count())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<'a> IntoIterator for &'a QueryList {
    type Item = &'a QueryValue;
    type IntoIter = std::slice::Iter<'a, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
