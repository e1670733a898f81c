//! Query Tree Walker
//!
//! Enumerates the candidate nodes of a query scope in document order.
//! Embedded views attached to a container are visited, in index order, right
//! after the template placeholder anchoring the container. Component views
//! are never entered: a query only sees the nodes declared in its own scope.

use crate::error::Result;
use crate::render3::interfaces::handle::NodeId;
use crate::render3::interfaces::node::NodeData;
use crate::render3::tree::ViewTree;

use super::registry::QueryScope;

/// Explicit traversal context threaded through the walk.
#[derive(Clone, Copy)]
pub struct WalkContext<'t> {
    pub tree: &'t ViewTree,
    pub scope: QueryScope,
    pub descendants: bool,
}

impl<'t> WalkContext<'t> {
    pub fn new(tree: &'t ViewTree, scope: QueryScope, descendants: bool) -> Self {
        WalkContext {
            tree,
            scope,
            descendants,
        }
    }

    /// Calls `visit` for every candidate node of the scope.
    ///
    /// Shallow walks only visit the scope root's direct children: nothing
    /// below them, including the contents of a child template placeholder.
    /// Deep walks visit the whole subtree, including every attached embedded
    /// view.
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(NodeId, &'t NodeData),
    {
        match self.scope {
            QueryScope::View(view) => {
                let roots = self.tree.view_data(view)?.roots();
                self.walk_nodes(roots, &mut visit);
            }
            QueryScope::Content(host) => {
                let host = self.tree.node_data(host)?;
                self.walk_nodes(host.children(), &mut visit);
                if self.descendants {
                    self.walk_container(host, &mut visit);
                }
            }
        }
        Ok(())
    }

    fn walk_nodes<F>(&self, nodes: &'t [NodeId], visit: &mut F)
    where
        F: FnMut(NodeId, &'t NodeData),
    {
        for &id in nodes {
            let Some(node) = self.tree.node(id) else {
                continue;
            };
            visit(id, node);
            if self.descendants {
                self.walk_nodes(node.children(), visit);
                self.walk_container(node, visit);
            }
        }
    }

    fn walk_container<F>(&self, node: &'t NodeData, visit: &mut F)
    where
        F: FnMut(NodeId, &'t NodeData),
    {
        for view in node.container() {
            if let Some(view) = self.tree.view(*view) {
                self.walk_nodes(view.roots(), visit);
            }
        }
    }

    /// Candidate node handles in document order.
    pub fn candidates(&self) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        self.walk(|id, _| out.push(id))?;
        Ok(out)
    }
}
