//! View Tree
//!
//! Arena of views and nodes addressed by stable handles. Containers hold
//! ordered lists of embedded view handles rather than owning the views, so
//! moving a view between containers is a list splice and destroying one is an
//! arena-slot invalidation.
//!
//! The tree only records structure. Deciding which queries a mutation affects
//! is the job of [`QueryEngine`](super::engine::QueryEngine), which wraps
//! every mutating call.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::{QueryError, Result};

use super::interfaces::definition::{DirectiveDef, DirectiveRegistry};
use super::interfaces::handle::{
    DirectiveInstance, DirectiveType, InstanceId, NodeId, TemplateId, ViewId,
};
use super::interfaces::node::{LocalRef, NodeData, NodeKind, RefTarget};
use super::interfaces::view::{ViewData, ViewKind};
use super::query::registry::QueryScope;

/// Creation function of a template body, run against every embedded view
/// instantiated from the template.
pub type TemplateBody = Rc<dyn Fn(&mut ViewBuilder<'_>) -> Result<()>>;

/// Creation-only access to the embedded view a template body is building.
///
/// Nodes can be added, decorated and referenced, but only inside that view.
/// Containers and every other view are out of reach, so a body can never
/// change structure that a query may already have resolved.
pub struct ViewBuilder<'t> {
    tree: &'t mut ViewTree,
    view: ViewId,
}

impl<'t> ViewBuilder<'t> {
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn context(&self) -> &Value {
        self.tree.view_context(self.view).unwrap_or(&Value::Null)
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        self.tree.directives()
    }

    pub fn element(&mut self, parent: Option<NodeId>, tag: &str) -> Result<NodeId> {
        self.tree.element(self.view, parent, tag)
    }

    pub fn element_container(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        self.tree.element_container(self.view, parent)
    }

    pub fn template(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        self.tree.template(self.view, parent)
    }

    pub fn template_with_body(&mut self, parent: Option<NodeId>, body: TemplateBody) -> Result<NodeId> {
        self.tree.template_with_body(self.view, parent, body)
    }

    pub fn text(&mut self, parent: Option<NodeId>, value: &str) -> Result<NodeId> {
        self.tree.text(self.view, parent, value)
    }

    pub fn attach_directive(
        &mut self,
        node: NodeId,
        directive: DirectiveType,
    ) -> Result<DirectiveInstance> {
        self.own_node(node)?;
        self.tree.attach_directive(node, directive)
    }

    pub fn declare_local_ref(&mut self, node: NodeId, name: &str, export: Option<&str>) -> Result<()> {
        self.own_node(node)?;
        self.tree.declare_local_ref(node, name, export)
    }

    fn own_node(&self, node: NodeId) -> Result<()> {
        if self.tree.node_data(node)?.view != self.view {
            return Err(QueryError::NodeInDifferentView {
                node,
                view: self.view,
            });
        }
        Ok(())
    }
}

struct TemplateData {
    anchor: NodeId,
    body: Option<TemplateBody>,
}

#[derive(Debug, Clone, Copy)]
struct InstanceData {
    directive: DirectiveType,
    host: NodeId,
}

#[derive(Default)]
pub struct ViewTree {
    directives: DirectiveRegistry,
    views: Vec<Option<ViewData>>,
    nodes: Vec<Option<NodeData>>,
    templates: Vec<TemplateData>,
    instances: Vec<Option<InstanceData>>,
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("directives", &self.directives.len())
            .field("live_views", &self.views.iter().flatten().count())
            .field("live_nodes", &self.nodes.iter().flatten().count())
            .finish()
    }
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Directive metadata ---

    pub fn register_directive(&mut self, def: DirectiveDef) -> Result<DirectiveType> {
        self.directives.register(def)
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    pub fn directive_def(&self, directive: DirectiveType) -> Result<&DirectiveDef> {
        self.directives
            .get(directive)
            .ok_or(QueryError::UnknownDirective(directive))
    }

    // --- Lookup ---

    pub fn view(&self, view: ViewId) -> Option<&ViewData> {
        self.views.get(view.as_usize()).and_then(Option::as_ref)
    }

    pub fn node(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.as_usize()).and_then(Option::as_ref)
    }

    pub(crate) fn view_data(&self, view: ViewId) -> Result<&ViewData> {
        self.view(view).ok_or(QueryError::UnknownView(view))
    }

    pub(crate) fn node_data(&self, node: NodeId) -> Result<&NodeData> {
        self.node(node).ok_or(QueryError::UnknownNode(node))
    }

    fn view_data_mut(&mut self, view: ViewId) -> Result<&mut ViewData> {
        self.views
            .get_mut(view.as_usize())
            .and_then(Option::as_mut)
            .ok_or(QueryError::UnknownView(view))
    }

    fn node_data_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(node.as_usize())
            .and_then(Option::as_mut)
            .ok_or(QueryError::UnknownNode(node))
    }

    pub fn is_live_view(&self, view: ViewId) -> bool {
        self.view(view).is_some()
    }

    pub fn is_live_node(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    /// Host node of a directive instance.
    pub fn instance_host(&self, instance: DirectiveInstance) -> Result<NodeId> {
        self.instances
            .get(instance.instance.as_usize())
            .and_then(|data| *data)
            .filter(|data| data.directive == instance.directive)
            .map(|data| data.host)
            .filter(|host| self.is_live_node(*host))
            .ok_or(QueryError::UnknownInstance(instance))
    }

    /// Template placeholder that declared a template.
    pub fn template_anchor(&self, template: TemplateId) -> Result<NodeId> {
        self.templates
            .get(template.as_usize())
            .map(|data| data.anchor)
            .filter(|anchor| self.is_live_node(*anchor))
            .ok_or(QueryError::UnknownTemplate(template))
    }

    /// Embedded views attached to the container at `anchor`, in index order.
    pub fn container(&self, anchor: NodeId) -> Result<&[ViewId]> {
        let node = self.node_data(anchor)?;
        if node.kind != NodeKind::Template {
            return Err(QueryError::NotAContainer(anchor));
        }
        Ok(&node.container)
    }

    /// Component instance hosted by a node, if any.
    pub fn component_of(&self, node: NodeId) -> Option<DirectiveInstance> {
        let data = self.node(node)?;
        data.directives.iter().copied().find(|d| {
            self.directives
                .get(d.directive)
                .is_some_and(|def| def.is_component)
        })
    }

    /// The component instance owning a component view.
    pub fn view_owner(&self, view: ViewId) -> Option<DirectiveInstance> {
        match self.view(view)?.kind {
            ViewKind::Component { host } => self.component_of(host),
            _ => None,
        }
    }

    pub fn view_context(&self, view: ViewId) -> Option<&Value> {
        self.view(view).map(|v| &v.context)
    }

    pub fn set_view_context(&mut self, view: ViewId, context: Value) -> Result<()> {
        self.view_data_mut(view)?.context = context;
        Ok(())
    }

    // --- View creation ---

    fn allocate_view(&mut self, kind: ViewKind, context: Value) -> ViewId {
        let id = ViewId::new(self.views.len());
        self.views.push(Some(ViewData::new(kind, context)));
        id
    }

    pub fn create_root_view(&mut self) -> ViewId {
        let view = self.allocate_view(ViewKind::Root, Value::Null);
        debug!(%view, "created root view");
        view
    }

    /// Creates the own view of the component hosted at `host`.
    pub fn create_component_view(&mut self, host: NodeId) -> Result<ViewId> {
        if self.component_of(host).is_none() {
            self.node_data(host)?;
            return Err(QueryError::NotAComponentHost(host));
        }
        if self.node_data(host)?.component_view.is_some() {
            return Err(QueryError::ComponentViewExists(host));
        }
        let view = self.allocate_view(ViewKind::Component { host }, Value::Null);
        self.node_data_mut(host)?.component_view = Some(view);
        debug!(%view, %host, "created component view");
        Ok(view)
    }

    /// Instantiates a template into a new, detached embedded view and runs the
    /// template body against it. A failing body leaves nothing behind.
    pub fn create_embedded_view(&mut self, template: TemplateId, context: Value) -> Result<ViewId> {
        self.template_anchor(template)?;
        let view = self.allocate_view(ViewKind::Embedded { template }, context);
        let body = self.templates[template.as_usize()].body.clone();
        if let Some(body) = body {
            if let Err(error) = body(&mut ViewBuilder { tree: &mut *self, view }) {
                self.destroy_view(view)?;
                debug!(%view, %template, %error, "template body failed");
                return Err(error);
            }
        }
        debug!(%view, %template, "created embedded view");
        Ok(view)
    }

    // --- Node creation ---

    /// Appends a node to `view`, under `parent` or at the view's top level.
    pub fn add_node(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        kind: NodeKind,
        tag: Option<&str>,
    ) -> Result<NodeId> {
        self.view_data(view)?;
        if let Some(parent) = parent {
            let parent_data = self.node_data(parent)?;
            if parent_data.view != view {
                return Err(QueryError::NodeInDifferentView { node: parent, view });
            }
            if !parent_data.kind.is_parent() {
                return Err(QueryError::LeafNode {
                    node: parent,
                    kind: parent_data.kind,
                });
            }
        }

        let id = NodeId::new(self.nodes.len());
        let mut data = NodeData::new(kind, view, parent, tag.map(str::to_string));
        if kind == NodeKind::Template {
            let template = TemplateId::new(self.templates.len());
            self.templates.push(TemplateData {
                anchor: id,
                body: None,
            });
            data.template = Some(template);
        }
        self.nodes.push(Some(data));

        match parent {
            Some(parent) => self.node_data_mut(parent)?.children.push(id),
            None => self.view_data_mut(view)?.roots.push(id),
        }
        self.view_data_mut(view)?.nodes.push(id);
        Ok(id)
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

    /// Declares a template placeholder whose embedded views are built by `body`.
    pub fn template_with_body(
        &mut self,
        view: ViewId,
        parent: Option<NodeId>,
        body: TemplateBody,
    ) -> Result<NodeId> {
        let anchor = self.template(view, parent)?;
        if let Some(template) = self.node_data(anchor)?.template {
            self.templates[template.as_usize()].body = Some(body);
        }
        Ok(anchor)
    }

    pub fn text(&mut self, view: ViewId, parent: Option<NodeId>, value: &str) -> Result<NodeId> {
        self.add_node(view, parent, NodeKind::Text, Some(value))
    }

    /// Attaches a new instance of `directive` to `node`.
    pub fn attach_directive(
        &mut self,
        node: NodeId,
        directive: DirectiveType,
    ) -> Result<DirectiveInstance> {
        let is_component = self.directive_def(directive)?.is_component;
        let data = self.node_data(node)?;
        if !data.kind.is_host() {
            return Err(QueryError::InvalidHost {
                node,
                kind: data.kind,
            });
        }
        if is_component {
            if data.kind != NodeKind::Element {
                return Err(QueryError::InvalidHost {
                    node,
                    kind: data.kind,
                });
            }
            if self.component_of(node).is_some() {
                return Err(QueryError::MultipleComponents(node));
            }
        }

        let instance = DirectiveInstance::new(directive, InstanceId::new(self.instances.len()));
        self.instances.push(Some(InstanceData {
            directive,
            host: node,
        }));
        let data = self.node_data_mut(node)?;
        if is_component {
            data.directives.insert(0, instance);
        } else {
            data.directives.push(instance);
        }
        Ok(instance)
    }

    /// Declares a local reference on `node`. Without an export name the
    /// reference resolves to the hosted component, or to the node itself.
    pub fn declare_local_ref(
        &mut self,
        node: NodeId,
        name: &str,
        export: Option<&str>,
    ) -> Result<()> {
        let data = self.node_data(node)?;
        if !data.kind.is_host() {
            return Err(QueryError::InvalidHost {
                node,
                kind: data.kind,
            });
        }
        if data.local_ref(name).is_some() {
            return Err(QueryError::DuplicateLocalRef {
                name: name.to_string(),
                node,
            });
        }

        let target = match export {
            Some(export_name) => data
                .directives
                .iter()
                .copied()
                .find(|d| {
                    self.directives
                        .get(d.directive)
                        .is_some_and(|def| def.is_exported_as(export_name))
                })
                .map(RefTarget::Instance)
                .ok_or_else(|| QueryError::ExportNotFound {
                    name: export_name.to_string(),
                    node,
                })?,
            None => self
                .component_of(node)
                .map(RefTarget::Instance)
                .unwrap_or(RefTarget::Node),
        };

        self.node_data_mut(node)?.local_refs.push(LocalRef {
            name: name.to_string(),
            export: export.map(str::to_string),
            target,
        });
        Ok(())
    }

    // --- Containers ---

    fn container_mut(&mut self, anchor: NodeId) -> Result<&mut Vec<ViewId>> {
        let node = self.node_data_mut(anchor)?;
        if node.kind != NodeKind::Template {
            return Err(QueryError::NotAContainer(anchor));
        }
        Ok(&mut node.container)
    }

    /// Whether `view` is `anchor`'s own view or one of its ancestors.
    fn encloses(&self, view: ViewId, anchor: NodeId) -> bool {
        let mut current = self.node(anchor).map(|n| n.view);
        while let Some(v) = current {
            if v == view {
                return true;
            }
            current = self.view(v).and_then(|data| match data.kind {
                ViewKind::Component { host } => self.node(host).map(|n| n.view),
                _ => data
                    .attached_to
                    .and_then(|anchor| self.node(anchor))
                    .map(|n| n.view),
            });
        }
        false
    }

    /// Attaches a detached embedded view to the container at `anchor`.
    pub fn insert_view(&mut self, anchor: NodeId, view: ViewId, index: usize) -> Result<()> {
        let len = self.container(anchor)?.len();
        let data = self.view_data(view)?;
        if !data.is_embedded() {
            return Err(QueryError::NotAnEmbeddedView(view));
        }
        if data.attached_to.is_some() {
            return Err(QueryError::ViewAlreadyAttached(view));
        }
        if index > len {
            return Err(QueryError::IndexOutOfBounds { index, len });
        }
        if self.encloses(view, anchor) {
            return Err(QueryError::CyclicInsertion { view, anchor });
        }

        self.container_mut(anchor)?.insert(index, view);
        self.view_data_mut(view)?.attached_to = Some(anchor);
        debug!(%view, %anchor, index, "inserted embedded view");
        Ok(())
    }

    /// Detaches the view at `index` without destroying it.
    pub fn detach_view(&mut self, anchor: NodeId, index: usize) -> Result<ViewId> {
        let container = self.container_mut(anchor)?;
        let len = container.len();
        if index >= len {
            return Err(QueryError::IndexOutOfBounds { index, len });
        }
        let view = container.remove(index);
        self.view_data_mut(view)?.attached_to = None;
        debug!(%view, %anchor, index, "detached embedded view");
        Ok(view)
    }

    /// Moves the view at `from` to position `to` within the same container.
    pub fn move_view(&mut self, anchor: NodeId, from: usize, to: usize) -> Result<ViewId> {
        let container = self.container_mut(anchor)?;
        let len = container.len();
        if from >= len {
            return Err(QueryError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(QueryError::IndexOutOfBounds { index: to, len });
        }
        let view = container.remove(from);
        container.insert(to, view);
        Ok(view)
    }

    /// Views that go away with `view`: the view itself, then every embedded
    /// view attached below it and every component view hosted in it,
    /// parents before children.
    pub fn subtree_views(&self, view: ViewId) -> Result<Vec<ViewId>> {
        self.view_data(view)?;
        let mut result = Vec::new();
        let mut stack = vec![view];
        while let Some(current) = stack.pop() {
            result.push(current);
            let Some(data) = self.view(current) else {
                continue;
            };
            let mut nested = Vec::new();
            for node in data.nodes.iter().filter_map(|n| self.node(*n)) {
                nested.extend(node.container.iter().copied());
                nested.extend(node.component_view);
            }
            stack.extend(nested.into_iter().rev());
        }
        Ok(result)
    }

    /// Directive instances hosted by nodes of `view` (not of nested views).
    pub fn view_instances(&self, view: ViewId) -> Result<Vec<DirectiveInstance>> {
        let data = self.view_data(view)?;
        Ok(data
            .nodes
            .iter()
            .filter_map(|n| self.node(*n))
            .flat_map(|node| node.directives.iter().copied())
            .collect())
    }

    /// Destroys `view` and everything below it, detaching it first if it is
    /// attached to a container. Returns the destroyed views.
    pub fn destroy_view(&mut self, view: ViewId) -> Result<Vec<ViewId>> {
        let destroyed = self.subtree_views(view)?;

        if let Some(anchor) = self.view_data(view)?.attached_to {
            if let Ok(container) = self.container_mut(anchor) {
                container.retain(|v| *v != view);
            }
        }
        if let ViewKind::Component { host } = self.view_data(view)?.kind {
            if let Ok(host) = self.node_data_mut(host) {
                host.component_view = None;
            }
        }

        for id in &destroyed {
            let Some(data) = self.views[id.as_usize()].take() else {
                continue;
            };
            for node in data.nodes {
                if let Some(node) = self.nodes[node.as_usize()].take() {
                    for directive in node.directives {
                        self.instances[directive.instance.as_usize()] = None;
                    }
                }
            }
        }
        debug!(%view, count = destroyed.len(), "destroyed view");
        Ok(destroyed)
    }

    // --- Scope containment ---

    /// Whether a change at `node` (or at the top level of `view` when `node`
    /// is `None`) falls inside `scope`. Climbs through parents and container
    /// attachments; never crosses a component view boundary.
    pub(crate) fn scope_contains(&self, scope: QueryScope, view: ViewId, node: Option<NodeId>) -> bool {
        let mut current_view = view;
        let mut current_node = node;
        loop {
            while let Some(id) = current_node {
                if scope == QueryScope::Content(id) {
                    return true;
                }
                current_node = self.node(id).and_then(|n| n.parent);
            }
            if scope == QueryScope::View(current_view) {
                return true;
            }
            let Some(anchor) = self.view(current_view).and_then(|v| v.attached_to) else {
                return false;
            };
            let Some(anchor_view) = self.node(anchor).map(|n| n.view) else {
                return false;
            };
            current_view = anchor_view;
            current_node = Some(anchor);
        }
    }
}
