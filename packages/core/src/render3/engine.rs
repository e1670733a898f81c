//! Query Engine
//!
//! Owns the view tree and the query registry. Every structural mutation goes
//! through the engine so the queries whose scope it touches are marked dirty;
//! destroying a view destroys the queries it owns before its nodes are
//! released.

use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{QueryError, Result};
use crate::linker::query_list::QueryList;

use super::interfaces::definition::DirectiveDef;
use super::interfaces::handle::{
    DirectiveInstance, DirectiveType, NodeId, TemplateId, ViewId,
};
use super::interfaces::node::NodeKind;
use super::interfaces::query::QueryDefinition;
use super::query::registry::{QueryOwner, QueryRegistry, QueryScope, QuerySlot, QueryState};
use super::tree::{TemplateBody, ViewTree};

#[derive(Debug, Default)]
pub struct QueryEngine {
    tree: ViewTree,
    queries: QueryRegistry,
    config: EngineConfig,
}

impl QueryEngine {
    pub fn new(config: EngineConfig) -> Self {
        QueryEngine {
            tree: ViewTree::new(),
            queries: QueryRegistry::with_tracing(config.trace_traversal),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn queries(&self) -> &QueryRegistry {
        &self.queries
    }

    /// Marks dirty the queries whose scope contains a change at `node`, or at
    /// the top level of `view`.
    fn mark_dirty_at(&mut self, view: ViewId, node: Option<NodeId>) {
        let tree = &self.tree;
        let marked = self
            .queries
            .mark_dirty_where(|scope| tree.scope_contains(scope, view, node));
        if marked > 0 {
            debug!(%view, marked, "marked queries dirty");
        }
    }

    fn mark_dirty_around(&mut self, node: NodeId) -> Result<()> {
        let data = self.tree.node_data(node)?;
        let (view, parent) = (data.view(), data.parent());
        self.mark_dirty_at(view, parent);
        Ok(())
    }

    // --- Directive metadata ---

    pub fn register_directive(&mut self, def: DirectiveDef) -> Result<DirectiveType> {
        self.tree.register_directive(def)
    }

    // --- Views ---

    pub fn create_root_view(&mut self) -> ViewId {
        self.tree.create_root_view()
    }

    pub fn create_component_view(&mut self, host: NodeId) -> Result<ViewId> {
        self.tree.create_component_view(host)
    }

    pub fn create_embedded_view(&mut self, template: TemplateId, context: Value) -> Result<ViewId> {
        self.tree.create_embedded_view(template, context)
    }

    pub fn set_view_context(&mut self, view: ViewId, context: Value) -> Result<()> {
        self.tree.set_view_context(view, context)
    }

    // --- Nodes ---

    pub fn add_node(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        kind: NodeKind,
        tag: Option<&str>,
    ) -> Result<NodeId> {
        let node = self.tree.add_node(view, parent, kind, tag)?;
        self.mark_dirty_at(view, parent);
        Ok(node)
    }

    pub fn element(&mut self, view: ViewId, parent: Option<NodeId>, tag: &str) -> Result<NodeId> {
        self.add_node(view, parent, NodeKind::Element, Some(tag))
    }

    pub fn element_container(&mut self, view: ViewId, parent: Option<NodeId>) -> Result<NodeId> {
        self.add_node(view, parent, NodeKind::ElementContainer, None)
    }

    pub fn template(&mut self, view: ViewId, parent: Option<NodeId>) -> Result<NodeId> {
        self.add_node(view, parent, NodeKind::Template, None)
    }

    pub fn template_with_body(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        body: TemplateBody,
    ) -> Result<NodeId> {
        let node = self.tree.template_with_body(view, parent, body)?;
        self.mark_dirty_at(view, parent);
        Ok(node)
    }

    pub fn text(&mut self, view: ViewId, parent: Option<NodeId>, value: &str) -> Result<NodeId> {
        self.add_node(view, parent, NodeKind::Text, Some(value))
    }

    pub fn attach_directive(
        &mut self,
        node: NodeId,
        directive: DirectiveType,
    ) -> Result<DirectiveInstance> {
        let instance = self.tree.attach_directive(node, directive)?;
        self.mark_dirty_around(node)?;
        Ok(instance)
    }

    pub fn declare_local_ref(&mut self, node: NodeId, name: &str, export: Option<&str>) -> Result<()> {
        self.tree.declare_local_ref(node, name, export)?;
        self.mark_dirty_around(node)
    }

    /// Template declared by a template placeholder.
    pub fn template_of(&self, anchor: NodeId) -> Result<TemplateId> {
        self.tree
            .node_data(anchor)?
            .template()
            .ok_or(QueryError::NotAContainer(anchor))
    }

    // --- Containers ---

    pub fn container(&self, anchor: NodeId) -> Result<&[ViewId]> {
        self.tree.container(anchor)
    }

    pub fn insert_view(&mut self, anchor: NodeId, view: ViewId, index: usize) -> Result<()> {
        self.tree.insert_view(anchor, view, index)?;
        let anchor_view = self.tree.node_data(anchor)?.view();
        self.mark_dirty_at(anchor_view, Some(anchor));
        Ok(())
    }

    /// Creates an embedded view from the container's own template and inserts
    /// it at `index`.
    pub fn create_and_insert(&mut self, anchor: NodeId, index: usize, context: Value) -> Result<ViewId> {
        let template = self.template_of(anchor)?;
        let view = self.create_embedded_view(template, context)?;
        self.insert_view(anchor, view, index)?;
        Ok(view)
    }

    pub fn detach_view(&mut self, anchor: NodeId, index: usize) -> Result<ViewId> {
        let view = self.tree.detach_view(anchor, index)?;
        let anchor_view = self.tree.node_data(anchor)?.view();
        self.mark_dirty_at(anchor_view, Some(anchor));
        Ok(view)
    }

    pub fn move_view(&mut self, anchor: NodeId, from: usize, to: usize) -> Result<ViewId> {
        let view = self.tree.move_view(anchor, from, to)?;
        if from != to {
            let anchor_view = self.tree.node_data(anchor)?.view();
            self.mark_dirty_at(anchor_view, Some(anchor));
        }
        Ok(view)
    }

    /// Removes and destroys the view at `index`.
    pub fn remove_view(&mut self, anchor: NodeId, index: usize) -> Result<ViewId> {
        let container = self.tree.container(anchor)?;
        let view = *container.get(index).ok_or(QueryError::IndexOutOfBounds {
            index,
            len: container.len(),
        })?;
        self.destroy_view(view)?;
        Ok(view)
    }

    /// Destroys a view and everything below it. Queries owned by the
    /// destroyed views and by directives in them are destroyed first, parents
    /// before children, completing their change streams.
    pub fn destroy_view(&mut self, view: ViewId) -> Result<()> {
        let views = self.tree.subtree_views(view)?;
        for current in &views {
            let instances = self.tree.view_instances(*current)?;
            let owner = QueryOwner::View(*current);
            self.queries.destroy_owned(|o| {
                o == owner || matches!(o, QueryOwner::Directive(d) if instances.contains(&d))
            });
        }

        if let Some(anchor) = self.tree.view_data(view)?.attached_to() {
            let anchor_view = self.tree.node_data(anchor)?.view();
            self.mark_dirty_at(anchor_view, Some(anchor));
        }
        self.tree.destroy_view(view)?;
        Ok(())
    }

    // --- Queries ---

    fn prepare(&self, mut definition: QueryDefinition) -> QueryDefinition {
        if !self.config.emit_distinct_changes_only {
            definition.emit_distinct_changes_only = false;
        }
        definition
    }

    /// Registers a query over `scope`. The query is owned by the scope's view
    /// (the host's view for content scopes).
    pub fn define_query(&mut self, scope: QueryScope, definition: QueryDefinition) -> Result<QuerySlot> {
        let owner = match scope {
            QueryScope::View(view) => {
                self.tree.view_data(view)?;
                QueryOwner::View(view)
            }
            QueryScope::Content(host) => QueryOwner::View(self.tree.node_data(host)?.view()),
        };
        let definition = self.prepare(definition);
        Ok(self.queries.define(scope, owner, definition))
    }

    /// Registers a view query of the component (or root) owning `view`.
    pub fn define_view_query(&mut self, view: ViewId, definition: QueryDefinition) -> Result<QuerySlot> {
        self.define_query(QueryScope::View(view), definition)
    }

    /// Registers a content query for one directive instance, ranging over the
    /// children of the instance's host node.
    pub fn define_content_query(
        &mut self,
        owner: DirectiveInstance,
        definition: QueryDefinition,
    ) -> Result<QuerySlot> {
        let host = self.tree.instance_host(owner)?;
        let definition = self.prepare(definition);
        Ok(self
            .queries
            .define(QueryScope::Content(host), QueryOwner::Directive(owner), definition))
    }

    pub fn refresh(&mut self, slot: QuerySlot) -> Result<bool> {
        self.queries.refresh(&self.tree, slot)
    }

    pub fn set_dirty(&mut self, slot: QuerySlot) -> Result<()> {
        self.queries.set_dirty(slot)
    }

    pub fn query_state(&self, slot: QuerySlot) -> Result<QueryState> {
        self.queries.state(slot)
    }

    pub fn query_list(&self, slot: QuerySlot) -> Result<&QueryList> {
        self.queries.list(slot)
    }

    pub fn query_list_mut(&mut self, slot: QuerySlot) -> Result<&mut QueryList> {
        self.queries.list_mut(slot)
    }

    pub fn destroy_query(&mut self, slot: QuerySlot) -> Result<()> {
        self.queries.destroy(slot)
    }

    pub fn view_queries(&self, view: ViewId) -> Vec<QuerySlot> {
        self.queries.owned_by(QueryOwner::View(view))
    }

    pub fn content_queries(&self, owner: DirectiveInstance) -> Vec<QuerySlot> {
        self.queries.owned_by(QueryOwner::Directive(owner))
    }
}
