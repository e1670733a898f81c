//! Query Matching
//!
//! Decides whether a node matches a query predicate and which value it
//! contributes. Token resolution is a match over node kind and requested
//! token; a token that cannot be located yields `None` and the candidate is
//! dropped.

use crate::linker::refs::{ElementRef, QueryValue, TemplateRef, ViewContainerRef};
use crate::render3::interfaces::handle::NodeId;
use crate::render3::interfaces::node::{LocalRef, NodeData, NodeKind, RefTarget};
use crate::render3::interfaces::query::{QueryDefinition, QueryPredicate, QueryToken};

/// Locates `token` on a node.
pub fn resolve_token(id: NodeId, node: &NodeData, token: QueryToken) -> Option<QueryValue> {
    match (node.kind(), token) {
        (_, QueryToken::Directive(directive)) => node
            .directives()
            .iter()
            .find(|d| d.directive == directive)
            .copied()
            .map(QueryValue::Instance),
        (
            NodeKind::Element | NodeKind::ElementContainer | NodeKind::Template,
            QueryToken::ElementRef,
        ) => Some(QueryValue::Element(ElementRef { node: id })),
        (NodeKind::Template, QueryToken::TemplateRef) => node.template().map(|template| {
            QueryValue::Template(TemplateRef {
                template,
                anchor: id,
            })
        }),
        (NodeKind::Template, QueryToken::ViewContainerRef) => {
            Some(QueryValue::ViewContainer(ViewContainerRef { anchor: id }))
        }
        _ => None,
    }
}

/// Whether a type predicate matches a node. Element handles are only a
/// predicate match on element and grouping nodes; template placeholders
/// expose one solely as a read value.
fn matches_type(node: &NodeData, token: QueryToken) -> bool {
    match (node.kind(), token) {
        (_, QueryToken::Directive(directive)) => {
            node.directives().iter().any(|d| d.directive == directive)
        }
        (NodeKind::Element | NodeKind::ElementContainer, QueryToken::ElementRef) => true,
        (NodeKind::Template, QueryToken::TemplateRef | QueryToken::ViewContainerRef) => true,
        _ => false,
    }
}

/// Default value of a local reference: the instance it names, else the
/// node's template handle or element handle.
pub fn resolve_local_ref(id: NodeId, node: &NodeData, local_ref: &LocalRef) -> Option<QueryValue> {
    match local_ref.target {
        RefTarget::Instance(instance) => Some(QueryValue::Instance(instance)),
        RefTarget::Node => match node.kind() {
            NodeKind::Template => resolve_token(id, node, QueryToken::TemplateRef),
            _ => resolve_token(id, node, QueryToken::ElementRef),
        },
    }
}

/// Appends the values `node` contributes to a query. A node matching several
/// requested names contributes one value per name, in predicate order.
pub fn collect_matches(
    id: NodeId,
    node: &NodeData,
    definition: &QueryDefinition,
    out: &mut Vec<QueryValue>,
) {
    match &definition.predicate {
        QueryPredicate::Type(token) => {
            if !matches_type(node, *token) {
                return;
            }
            let value = match definition.read {
                Some(read) => resolve_token(id, node, read),
                None => resolve_token(id, node, *token),
            };
            out.extend(value);
        }
        QueryPredicate::Names(names) => {
            for name in names {
                let Some(local_ref) = node.local_ref(name) else {
                    continue;
                };
                let value = match definition.read {
                    Some(read) => resolve_token(id, node, read),
                    None => resolve_local_ref(id, node, local_ref),
                };
                out.extend(value);
            }
        }
    }
}
