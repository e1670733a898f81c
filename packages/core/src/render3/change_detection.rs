//! Change Detection Driver
//!
//! A check pass over one view refreshes queries bottom-up: for each node, its
//! children and container views are checked first, then the content queries of
//! the node's directives. After all nodes of a view, the component views
//! hosted in it are checked, then the view's own queries are refreshed.

use tracing::trace;

use crate::error::Result;

use super::engine::QueryEngine;
use super::interfaces::handle::{DirectiveInstance, NodeId, ViewId};
use super::query::registry::{QueryOwner, QuerySlot};

/// Callbacks fired during a check pass. `changed` lists the queries whose
/// results were recomputed and reported a change.
pub trait LifecycleHooks {
    fn after_content_checked(
        &mut self,
        _directive: DirectiveInstance,
        _changed: &[QuerySlot],
        _engine: &QueryEngine,
    ) {
    }

    fn after_view_checked(&mut self, _view: ViewId, _changed: &[QuerySlot], _engine: &QueryEngine) {}
}

impl LifecycleHooks for () {}

impl QueryEngine {
    /// Runs one check pass over `view` and everything below it. Returns every
    /// query that reported a change, in refresh order.
    pub fn check_view(&mut self, view: ViewId, hooks: &mut dyn LifecycleHooks) -> Result<Vec<QuerySlot>> {
        let mut changed = Vec::new();
        self.check_view_inner(view, hooks, &mut changed)?;
        Ok(changed)
    }

    fn check_view_inner(
        &mut self,
        view: ViewId,
        hooks: &mut dyn LifecycleHooks,
        changed: &mut Vec<QuerySlot>,
    ) -> Result<()> {
        trace!(%view, "checking view");
        let data = self.tree().view_data(view)?;
        let roots = data.roots().to_vec();
        let component_views: Vec<ViewId> = data
            .nodes()
            .iter()
            .filter_map(|&n| self.tree().node(n).and_then(|node| node.component_view()))
            .collect();

        self.check_nodes(&roots, hooks, changed)?;
        for component_view in component_views {
            if self.tree().is_live_view(component_view) {
                self.check_view_inner(component_view, hooks, changed)?;
            }
        }

        let view_changed = self.refresh_owned(QueryOwner::View(view))?;
        hooks.after_view_checked(view, &view_changed, self);
        changed.extend(view_changed);
        Ok(())
    }

    fn check_nodes(
        &mut self,
        nodes: &[NodeId],
        hooks: &mut dyn LifecycleHooks,
        changed: &mut Vec<QuerySlot>,
    ) -> Result<()> {
        for &id in nodes {
            let Some(node) = self.tree().node(id) else {
                continue;
            };
            let children = node.children().to_vec();
            let container = node.container().to_vec();
            let directives = node.directives().to_vec();

            self.check_nodes(&children, hooks, changed)?;
            for view in container {
                self.check_view_inner(view, hooks, changed)?;
            }
            for directive in directives {
                let content_changed = self.refresh_owned(QueryOwner::Directive(directive))?;
                hooks.after_content_checked(directive, &content_changed, self);
                changed.extend(content_changed);
            }
        }
        Ok(())
    }

    fn refresh_owned(&mut self, owner: QueryOwner) -> Result<Vec<QuerySlot>> {
        let mut changed = Vec::new();
        for slot in self.queries().owned_by(owner) {
            if self.refresh(slot)? {
                changed.push(slot);
            }
        }
        Ok(changed)
    }
}
