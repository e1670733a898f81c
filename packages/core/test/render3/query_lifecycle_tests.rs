//! Query Lifecycle Tests
//!
//! Dirty tracking, change notification, static queries, destruction and the
//! check pass driver.

#[path = "util/fixture.rs"]
mod fixture;
use fixture::{named_element_body, result_tags};

use std::cell::RefCell;
use std::rc::Rc;

use angular_core::{
    DirectiveDef, DirectiveInstance, EngineConfig, LifecycleHooks, NgIf, QueryDefinition,
    QueryEngine, QueryError, QueryListEvent, QuerySlot, QueryState, ViewId,
};
use serde_json::Value;

type Log = Rc<RefCell<Vec<String>>>;

fn record(engine: &mut QueryEngine, slot: QuerySlot, label: &'static str, log: &Log) {
    let log = log.clone();
    engine
        .query_list_mut(slot)
        .unwrap()
        .subscribe(move |event| match event {
            QueryListEvent::Changed(items) => {
                log.borrow_mut().push(format!("{label} changed {}", items.len()))
            }
            QueryListEvent::Completed => log.borrow_mut().push(format!("{label} completed")),
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_change_at_most_once_without_mutation() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let div = engine.element(root, None, "div").unwrap();
        engine.declare_local_ref(div, "x", None).unwrap();
        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]))
            .unwrap();

        assert!(engine.refresh(slot).unwrap());
        assert!(!engine.refresh(slot).unwrap());
        engine.set_dirty(slot).unwrap();
        assert!(!engine.refresh(slot).unwrap());
        assert_eq!(engine.query_list(slot).unwrap().version(), 1);
    }

    #[test]
    fn should_emit_only_on_distinct_changes() {
        let log: Log = Rc::default();
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let anchor = engine
            .template_with_body(root, None, named_element_body("li", "item"))
            .unwrap();
        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["item"]).descendants(true))
            .unwrap();
        record(&mut engine, slot, "q", &log);

        engine.refresh(slot).unwrap();
        let view = engine.create_and_insert(anchor, 0, Value::Null).unwrap();
        engine.refresh(slot).unwrap();
        engine.set_dirty(slot).unwrap();
        engine.refresh(slot).unwrap();
        engine.destroy_view(view).unwrap();
        engine.refresh(slot).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["q changed 0", "q changed 1", "q changed 0"]
        );
    }

    #[test]
    fn should_emit_on_every_refresh_when_not_distinct() {
        let log: Log = Rc::default();
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let slot = engine
            .define_view_query(
                root,
                QueryDefinition::by_names(["x"]).emit_distinct_changes_only(false),
            )
            .unwrap();
        record(&mut engine, slot, "q", &log);

        engine.refresh(slot).unwrap();
        engine.set_dirty(slot).unwrap();
        assert!(!engine.refresh(slot).unwrap());
        assert_eq!(*log.borrow(), vec!["q changed 0", "q changed 0"]);
    }

    #[test]
    fn should_stop_notifying_after_unsubscribe() {
        let log: Log = Rc::default();
        let mut engine = QueryEngine::new(EngineConfig {
            emit_distinct_changes_only: false,
            ..EngineConfig::default()
        });
        let root = engine.create_root_view();
        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]))
            .unwrap();
        let sink = log.clone();
        let subscription = engine
            .query_list_mut(slot)
            .unwrap()
            .subscribe(move |_| sink.borrow_mut().push("event".to_string()));

        engine.refresh(slot).unwrap();
        assert!(engine.query_list_mut(slot).unwrap().unsubscribe(subscription));
        engine.set_dirty(slot).unwrap();
        engine.refresh(slot).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(engine.query_list(slot).unwrap().subscriber_count(), 0);
    }

    #[test]
    fn should_mark_dirty_on_detach_and_move() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let anchor = engine.template(root, None).unwrap();
        let first = engine.create_and_insert(anchor, 0, Value::Null).unwrap();
        let a = engine.element(first, None, "a").unwrap();
        engine.declare_local_ref(a, "x", None).unwrap();
        let second = engine.create_and_insert(anchor, 1, Value::Null).unwrap();
        let b = engine.element(second, None, "b").unwrap();
        engine.declare_local_ref(b, "x", None).unwrap();

        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]).descendants(true))
            .unwrap();
        engine.refresh(slot).unwrap();
        assert_eq!(result_tags(&engine, slot), vec!["a", "b"]);

        engine.move_view(anchor, 1, 0).unwrap();
        assert_eq!(engine.query_state(slot).unwrap(), QueryState::Dirty);
        assert!(engine.refresh(slot).unwrap());
        assert_eq!(result_tags(&engine, slot), vec!["b", "a"]);

        let detached = engine.detach_view(anchor, 0).unwrap();
        assert_eq!(detached, second);
        assert!(engine.refresh(slot).unwrap());
        assert_eq!(result_tags(&engine, slot), vec!["a"]);

        // a detached view survives and can be attached again
        engine.insert_view(anchor, detached, 1).unwrap();
        assert!(engine.refresh(slot).unwrap());
        assert_eq!(result_tags(&engine, slot), vec!["a", "b"]);
    }

    #[test]
    fn should_resolve_static_query_once() {
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let anchor = engine
            .template_with_body(root, None, named_element_body("li", "item"))
            .unwrap();
        let slot = engine
            .define_view_query(
                root,
                QueryDefinition::by_names(["item"]).descendants(true).static_(true),
            )
            .unwrap();
        assert!(engine.refresh(slot).unwrap());

        engine.create_and_insert(anchor, 0, Value::Null).unwrap();
        assert_eq!(engine.query_state(slot).unwrap(), QueryState::Clean);
        engine.set_dirty(slot).unwrap();
        assert!(!engine.refresh(slot).unwrap());
        assert!(engine.query_list(slot).unwrap().is_empty());
    }

    #[test]
    fn should_complete_streams_top_down_on_view_destruction() {
        let log: Log = Rc::default();
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let outer_anchor = engine.template(root, None).unwrap();
        let outer = engine.create_and_insert(outer_anchor, 0, Value::Null).unwrap();
        let inner_anchor = engine.template(outer, None).unwrap();
        let inner = engine.create_and_insert(inner_anchor, 0, Value::Null).unwrap();

        let inner_slot = engine
            .define_view_query(inner, QueryDefinition::by_names(["x"]))
            .unwrap();
        let outer_slot = engine
            .define_view_query(outer, QueryDefinition::by_names(["x"]))
            .unwrap();
        record(&mut engine, inner_slot, "inner", &log);
        record(&mut engine, outer_slot, "outer", &log);

        engine.remove_view(outer_anchor, 0).unwrap();
        assert_eq!(*log.borrow(), vec!["outer completed", "inner completed"]);
        assert!(!engine.tree().is_live_view(inner));
        assert_eq!(
            engine.refresh(outer_slot),
            Err(QueryError::QueryDestroyed(outer_slot))
        );
        assert_eq!(
            engine.set_dirty(inner_slot),
            Err(QueryError::QueryDestroyed(inner_slot))
        );
    }

    #[test]
    fn should_complete_late_subscriber_of_destroyed_query() {
        let log: Log = Rc::default();
        let mut engine = QueryEngine::default();
        let root = engine.create_root_view();
        let slot = engine
            .define_view_query(root, QueryDefinition::by_names(["x"]))
            .unwrap();
        engine.destroy_query(slot).unwrap();
        record(&mut engine, slot, "late", &log);
        assert_eq!(*log.borrow(), vec!["late completed"]);
    }

    #[derive(Default)]
    struct ContentSnapshot {
        lengths: Vec<(DirectiveInstance, usize)>,
        views: Vec<ViewId>,
    }

    impl LifecycleHooks for ContentSnapshot {
        fn after_content_checked(
            &mut self,
            directive: DirectiveInstance,
            _changed: &[QuerySlot],
            engine: &QueryEngine,
        ) {
            for slot in engine.content_queries(directive) {
                let len = engine.query_list(slot).unwrap().len();
                self.lengths.push((directive, len));
            }
        }

        fn after_view_checked(&mut self, view: ViewId, _changed: &[QuerySlot], _engine: &QueryEngine) {
            self.views.push(view);
        }
    }

    #[test]
    fn should_resolve_content_before_content_hook() {
        let mut engine = QueryEngine::default();
        let tabs_type = engine.register_directive(DirectiveDef::directive("Tabs")).unwrap();
        let root = engine.create_root_view();
        let host = engine.element(root, None, "tabs").unwrap();
        let tabs = engine.attach_directive(host, tabs_type).unwrap();
        let anchor = engine
            .template_with_body(root, Some(host), named_element_body("tab", "tab"))
            .unwrap();
        engine
            .define_content_query(tabs, QueryDefinition::by_names(["tab"]).descendants(true))
            .unwrap();
        let mut ng_if = NgIf::new(&mut engine, anchor, true).unwrap();

        let mut hooks = ContentSnapshot::default();
        engine.check_view(root, &mut hooks).unwrap();
        ng_if.set_condition(&mut engine, false).unwrap();
        engine.check_view(root, &mut hooks).unwrap();

        assert_eq!(hooks.lengths, vec![(tabs, 1), (tabs, 0)]);
        let embedded = hooks.views[0];
        assert_ne!(embedded, root);
        assert_eq!(hooks.views[1..], [root, root]);
    }

    #[test]
    fn should_check_component_view_before_host_view_queries() {
        let mut engine = QueryEngine::default();
        let card_type = engine.register_directive(DirectiveDef::component("Card")).unwrap();
        let root = engine.create_root_view();
        let host = engine.element(root, None, "card").unwrap();
        engine.attach_directive(host, card_type).unwrap();
        let card_view = engine.create_component_view(host).unwrap();
        engine.element(card_view, None, "h1").unwrap();

        let mut hooks = ContentSnapshot::default();
        engine.check_view(root, &mut hooks).unwrap();
        assert_eq!(hooks.views, vec![card_view, root]);
    }
}
