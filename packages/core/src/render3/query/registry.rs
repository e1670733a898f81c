//! Query Registry
//!
//! Binds query definitions to their scope and owner, and drives
//! recomputation. Each registered query is a small state machine:
//!
//! ```text
//!            set_dirty                refresh
//!   Clean ─────────────► Dirty ──────────────► Clean
//!     │                    │
//!     └──── destroy ───────┴────► Destroyed (terminal)
//! ```
//!
//! Queries start `Dirty`. Refreshing a `Clean` query does nothing.
//! Destroyed entries stay addressable by slot but leave the live set, so
//! mutation bookkeeping only scans queries that can still change.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::error::{QueryError, Result};
use crate::linker::query_list::QueryList;
use crate::linker::refs::QueryValue;
use crate::render3::interfaces::handle::{DirectiveInstance, NodeId, ViewId};
use crate::render3::interfaces::query::QueryDefinition;
use crate::render3::tree::ViewTree;

use super::matcher::collect_matches;
use super::walker::WalkContext;

/// The subtree a query ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// The top-level nodes of a view (view queries).
    View(ViewId),
    /// The children of a host node (content queries).
    Content(NodeId),
}

/// Who declared a query; the query is destroyed together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOwner {
    View(ViewId),
    Directive(DirectiveInstance),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Dirty,
    Clean,
    Destroyed,
}

/// Opaque handle to a registered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuerySlot(usize);

impl QuerySlot {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QuerySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query#{}", self.0)
    }
}

#[derive(Debug)]
struct QueryEntry {
    definition: QueryDefinition,
    scope: QueryScope,
    owner: QueryOwner,
    state: QueryState,
    list: QueryList,
}

#[derive(Debug, Default)]
pub struct QueryRegistry {
    entries: Vec<QueryEntry>,
    live: BTreeSet<QuerySlot>,
    trace_traversal: bool,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracing(trace_traversal: bool) -> Self {
        QueryRegistry {
            entries: Vec::new(),
            live: BTreeSet::new(),
            trace_traversal,
        }
    }

    fn entry(&self, slot: QuerySlot) -> Result<&QueryEntry> {
        self.entries
            .get(slot.0)
            .ok_or(QueryError::UnknownQuery(slot))
    }

    fn entry_mut(&mut self, slot: QuerySlot) -> Result<&mut QueryEntry> {
        self.entries
            .get_mut(slot.0)
            .ok_or(QueryError::UnknownQuery(slot))
    }

    pub fn define(
        &mut self,
        scope: QueryScope,
        owner: QueryOwner,
        definition: QueryDefinition,
    ) -> QuerySlot {
        let slot = QuerySlot(self.entries.len());
        debug!(%slot, ?scope, ?owner, flags = ?definition.flags(), "defined query");
        let list = QueryList::new(definition.emit_distinct_changes_only);
        self.entries.push(QueryEntry {
            definition,
            scope,
            owner,
            state: QueryState::Dirty,
            list,
        });
        self.live.insert(slot);
        slot
    }

    pub fn definition(&self, slot: QuerySlot) -> Result<&QueryDefinition> {
        Ok(&self.entry(slot)?.definition)
    }

    pub fn scope(&self, slot: QuerySlot) -> Result<QueryScope> {
        Ok(self.entry(slot)?.scope)
    }

    pub fn owner(&self, slot: QuerySlot) -> Result<QueryOwner> {
        Ok(self.entry(slot)?.owner)
    }

    pub fn state(&self, slot: QuerySlot) -> Result<QueryState> {
        Ok(self.entry(slot)?.state)
    }

    pub fn list(&self, slot: QuerySlot) -> Result<&QueryList> {
        Ok(&self.entry(slot)?.list)
    }

    pub fn list_mut(&mut self, slot: QuerySlot) -> Result<&mut QueryList> {
        Ok(&mut self.entry_mut(slot)?.list)
    }

    /// Runs the walker and matcher for a definition over a scope.
    pub fn collect(
        &self,
        tree: &ViewTree,
        scope: QueryScope,
        definition: &QueryDefinition,
    ) -> Result<Vec<QueryValue>> {
        let mut results = Vec::new();
        WalkContext::new(tree, scope, definition.descendants).walk(|id, node| {
            let before = results.len();
            collect_matches(id, node, definition, &mut results);
            if self.trace_traversal {
                trace!(node = %id, kind = %node.kind(), matched = results.len() - before, "query candidate");
            }
        })?;
        Ok(results)
    }

    /// Recomputes a dirty query and returns whether its results changed.
    /// Clean queries are left alone and report no change.
    pub fn refresh(&mut self, tree: &ViewTree, slot: QuerySlot) -> Result<bool> {
        let entry = self.entry(slot)?;
        match entry.state {
            QueryState::Destroyed => return Err(QueryError::QueryDestroyed(slot)),
            QueryState::Clean => return Ok(false),
            QueryState::Dirty => {}
        }

        let results = self.collect(tree, entry.scope, &entry.definition)?;
        let entry = self.entry_mut(slot)?;
        let changed = entry.list.reset(results);
        entry.state = QueryState::Clean;
        debug!(%slot, changed, len = entry.list.len(), "refreshed query");
        entry.list.notify_on_changes();
        Ok(changed)
    }

    /// Marks a query for recomputation. Static queries, once resolved, stay
    /// clean.
    pub fn set_dirty(&mut self, slot: QuerySlot) -> Result<()> {
        let entry = self.entry_mut(slot)?;
        match entry.state {
            QueryState::Destroyed => Err(QueryError::QueryDestroyed(slot)),
            QueryState::Clean if entry.definition.is_static => {
                warn!(%slot, "ignoring set_dirty on a resolved static query");
                Ok(())
            }
            _ => {
                entry.state = QueryState::Dirty;
                entry.list.set_dirty();
                Ok(())
            }
        }
    }

    /// Marks dirty every live query whose scope satisfies `affected`.
    pub fn mark_dirty_where<F>(&mut self, mut affected: F) -> usize
    where
        F: FnMut(QueryScope) -> bool,
    {
        let mut marked = 0;
        for slot in &self.live {
            let entry = &mut self.entries[slot.0];
            if entry.state != QueryState::Clean || entry.definition.is_static {
                continue;
            }
            if affected(entry.scope) {
                entry.state = QueryState::Dirty;
                entry.list.set_dirty();
                marked += 1;
            }
        }
        marked
    }

    /// Destroys a query, completing its change stream. Destroying twice is a
    /// no-op.
    pub fn destroy(&mut self, slot: QuerySlot) -> Result<()> {
        let entry = self.entry_mut(slot)?;
        if entry.state != QueryState::Destroyed {
            entry.state = QueryState::Destroyed;
            entry.list.destroy();
            self.live.remove(&slot);
            debug!(%slot, "destroyed query");
        }
        Ok(())
    }

    /// Destroys every live query whose owner satisfies `owned`, in
    /// registration order. Returns the destroyed slots.
    pub fn destroy_owned<F>(&mut self, mut owned: F) -> Vec<QuerySlot>
    where
        F: FnMut(QueryOwner) -> bool,
    {
        let destroyed: Vec<QuerySlot> = self
            .live
            .iter()
            .copied()
            .filter(|slot| owned(self.entries[slot.0].owner))
            .collect();
        for slot in &destroyed {
            let entry = &mut self.entries[slot.0];
            entry.state = QueryState::Destroyed;
            entry.list.destroy();
            self.live.remove(slot);
        }
        destroyed
    }

    /// Live queries declared by `owner`, in registration order.
    pub fn owned_by(&self, owner: QueryOwner) -> Vec<QuerySlot> {
        self.live
            .iter()
            .copied()
            .filter(|slot| self.entries[slot.0].owner == owner)
            .collect()
    }

    /// Number of queries not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
