//! Query Traversal Tests
//!
//! Document order, shallow/deep scopes and view boundaries.

#[path = "util/fixture.rs"]
mod fixture;
use fixture::{named_element_body, result_tags, values};

use angular_core::{
    DirectiveDef, NodeKind, QueryDefinition, QueryEngine, QueryScope, QueryToken, QueryValue,
};
use serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_order_results_by_document_position() {
        // root: [a[b, tpl{ [c[d]], [e] }, f], g]
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let a = engine.element(root, None, "a").unwrap();
        let b = engine.element(root, Some(a), "b").unwrap();
        let tpl = engine.template(root, Some(a)).unwrap();
        let f = engine.element(root, Some(a), "f").unwrap();
        let g = engine.element(root, None, "g").unwrap();

        let second = engine.create_and_insert(tpl, 0, Value::Null).unwrap();
        let e = engine.element(second, None, "e").unwrap();
        let first = engine.create_and_insert(tpl, 0, Value::Null).unwrap();
        let c = engine.element(first, None, "c").unwrap();
        let d = engine.element(first, Some(c), "d").unwrap();
        for node in [a, b, c, d, e, f, g] {
            engine.declare_local_ref(node, "x", None).unwrap();
        }

        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]).descendants(true))
            .unwrap();
        engine.refresh(slot).unwrap();
        assert_eq!(
            result_tags(&engine, slot),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
    }

    #[test]
    fn should_diverge_on_grouping_wrapper() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let group = engine.element_container(root, None).unwrap();
        let inner = engine.element(root, Some(group), "span").unwrap();
        engine.declare_local_ref(inner, "target", None).unwrap();

        let shallow = engine
            .define_view_query(root, QueryDefinition::by_names(["target"]))
            .unwrap();
        let deep = engine
            .define_view_query(root, QueryDefinition::by_names(["target"]).descendants(true))
            .unwrap();
        engine.refresh(shallow).unwrap();
        engine.refresh(deep).unwrap();
        assert_eq!(engine.query_list(shallow).unwrap().len(), 0);
        assert_eq!(engine.query_list(deep).unwrap().len(), 1);
    }

    #[test]
    fn should_match_grouping_node_itself() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let group = engine.element_container(root, None).unwrap();
        engine.declare_local_ref(group, "group", None).unwrap();

        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["group"]))
            .unwrap();
        engine.refresh(slot).unwrap();
        assert_eq!(
            engine.tree().node(group).unwrap().kind(),
            NodeKind::ElementContainer
        );
        assert_eq!(values(&engine, slot).len(), 1);
    }

    #[test]
    fn should_not_enter_direct_child_template_when_shallow() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let tpl = engine
            .template_with_body(root, None, named_element_body("li", "item"))
            .unwrap();
        engine.declare_local_ref(tpl, "item", None).unwrap();
        engine.create_and_insert(tpl, 0, Value::Null).unwrap();

        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["item"]))
            .unwrap();
        engine.refresh(slot).unwrap();
        // only the placeholder itself, read as its template handle
        let results = values(&engine, slot);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], QueryValue::Template(t) if t.anchor == tpl));
    }

    #[test]
    fn should_see_through_nested_query_bearing_directive() {
        let mut engine = QueryEngine::default();
        let outer_type = engine.register_directive(DirectiveDef::directive("Outer")).unwrap();
        let inner_type = engine.register_directive(DirectiveDef::directive("Inner")).unwrap();
        let root = engine.create_root_view();
        let outer_host = engine.element(root, None, "outer").unwrap();
        let outer = engine.attach_directive(outer_host, outer_type).unwrap();
        let inner_host = engine.element(root, Some(outer_host), "inner").unwrap();
        let inner = engine.attach_directive(inner_host, inner_type).unwrap();
        let wrapper = engine.element(root, Some(inner_host), "div").unwrap();
        let leaf = engine.element(root, Some(wrapper), "leaf").unwrap();
        engine.declare_local_ref(leaf, "leaf", None).unwrap();

        let inner_slot = engine
            .define_content_query(inner, QueryDefinition::by_names(["leaf"]))
            .unwrap();
        let outer_slot = engine
            .define_content_query(outer, QueryDefinition::by_names(["leaf"]).descendants(true))
            .unwrap();
        engine.refresh(inner_slot).unwrap();
        engine.refresh(outer_slot).unwrap();
        assert!(engine.query_list(inner_slot).unwrap().is_empty());
        assert_eq!(result_tags(&engine, outer_slot), vec!["leaf"]);
    }

    #[test]
    fn should_stop_at_component_view_boundary() {
        let mut engine = QueryEngine::default();
        let cmp_type = engine.register_directive(DirectiveDef::component("Child")).unwrap();
        let root = engine.create_root_view();
        let host = engine.element(root, None, "child").unwrap();
        engine.attach_directive(host, cmp_type).unwrap();
        let child_view = engine.create_component_view(host).unwrap();
        let hidden = engine.element(child_view, None, "span").unwrap();
        engine.declare_local_ref(hidden, "x", None).unwrap();

        let outer = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]).descendants(true))
            .unwrap();
        let own = engine
            .define_view_query(child_view, QueryDefinition::by_names(["x"]).descendants(true))
            .unwrap();
        engine.refresh(outer).unwrap();
        engine.refresh(own).unwrap();
        assert!(engine.query_list(outer).unwrap().is_empty());
        assert_eq!(result_tags(&engine, own), vec!["span"]);
    }

    #[test]
    fn should_visit_views_of_same_template_in_separate_containers() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let declaration = engine
            .template_with_body(root, None, named_element_body("li", "item"))
            .unwrap();
        let template = engine.template_of(declaration).unwrap();
        let left = engine.template(root, None).unwrap();
        let right = engine.template(root, None).unwrap();

        let first = engine.create_embedded_view(template, Value::Null).unwrap();
        let second = engine.create_embedded_view(template, Value::Null).unwrap();
        engine.insert_view(right, second, 0).unwrap();
        engine.insert_view(left, first, 0).unwrap();
        assert_ne!(first, second);

        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["item"]).descendants(true))
            .unwrap();
        engine.refresh(slot).unwrap();
        let nodes: Vec<_> = values(&engine, slot).iter().filter_map(|v| v.node()).collect();
        assert_eq!(nodes.len(), 2);
        assert_eq!(engine.tree().node(nodes[0]).unwrap().view(), first);
        assert_eq!(engine.tree().node(nodes[1]).unwrap().view(), second);
    }

    #[test]
    fn should_see_container_views_of_content_host_only_when_deep() {
        let mut engine = QueryEngine::default();
        let dir_type = engine.register_directive(DirectiveDef::directive("Host")).unwrap();
        let root = engine.create_root_view();
        let tpl = engine
            .template_with_body(root, None, named_element_body("li", "item"))
            .unwrap();
        let instance = engine.attach_directive(tpl, dir_type).unwrap();
        engine.create_and_insert(tpl, 0, Value::Null).unwrap();

        let shallow = engine
            .define_query(QueryScope::Content(tpl), QueryDefinition::by_names(["item"]))
            .unwrap();
        let deep = engine
            .define_content_query(instance, QueryDefinition::by_names(["item"]).descendants(true))
            .unwrap();
        engine.refresh(shallow).unwrap();
        engine.refresh(deep).unwrap();
        assert!(engine.query_list(shallow).unwrap().is_empty());
        assert_eq!(result_tags(&engine, deep), vec!["li"]);
    }

    #[test]
    fn should_match_capability_tokens_by_node_kind() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        engine.element(root, None, "div").unwrap();
        engine.element_container(root, None).unwrap();
        let tpl = engine.template(root, None).unwrap();
        engine.text(root, None, "hello").unwrap();

        let elements = engine
            .define_view_query(root, QueryDefinition::by_type(QueryToken::ElementRef))
            .unwrap();
        let templates = engine
            .define_view_query(root, QueryDefinition::by_type(QueryToken::TemplateRef))
            .unwrap();
        engine.refresh(elements).unwrap();
        engine.refresh(templates).unwrap();
        assert_eq!(engine.query_list(elements).unwrap().len(), 2);
        let found = values(&engine, templates);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].node(), Some(tpl));
    }
}
