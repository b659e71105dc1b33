//! Modifier store and class synchronisation tests for blok-runtime

use std::cell::RefCell;
use std::rc::Rc;

use blok_runtime::{
    Declaration, Document, ModValue, NodeDescriptor, NodeId, Registry, Runtime, RuntimeConfig,
};

type ChangeLog = Rc<RefCell<Vec<(String, ModValue, Option<ModValue>)>>>;

fn tabs_runtime(log: &ChangeLog) -> (Runtime, Rc<RefCell<Document>>, Vec<NodeId>) {
    let (active, state) = (log.clone(), log.clone());
    let mut registry = Registry::new();
    registry
        .register(
            Declaration::new("Tabs__tab")
                .tag("button")
                .default_mod("Active", false)
                .on_mod("Active", move |_, new, prev| {
                    active
                        .borrow_mut()
                        .push(("active".into(), new.clone(), prev.cloned()));
                    Ok(())
                })
                .on_mod("state", move |_, new, prev| {
                    state
                        .borrow_mut()
                        .push(("state".into(), new.clone(), prev.cloned()));
                    Ok(())
                }),
        )
        .unwrap();
    let (mut rt, doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let body = doc.borrow().body();
    let tabs = rt
        .mount(
            &NodeDescriptor::new("Tabs")
                .child(NodeDescriptor::new("tab").attr("Active", true))
                .child(NodeDescriptor::new("tab")),
            body,
        )
        .unwrap();
    let tabs_children = rt.children(tabs);
    (rt, doc, tabs_children)
}

fn host_class(rt: &Runtime, doc: &Rc<RefCell<Document>>, node: NodeId) -> String {
    doc.borrow().class_of(rt.host_of(node).unwrap())
}

// ============================================================================
// CLASS CONTRACT
// ============================================================================

#[test]
fn test_initial_classes() {
    let log = ChangeLog::default();
    let (rt, doc, tabs) = tabs_runtime(&log);
    assert_eq!(host_class(&rt, &doc, tabs[0]), "tabs__tab tabs__tab_active");
    assert_eq!(host_class(&rt, &doc, tabs[1]), "tabs__tab");
    // descriptor values are not changes
    assert!(log.borrow().is_empty());
}

#[test]
fn test_class_follows_modifier_changes() {
    let log = ChangeLog::default();
    let (mut rt, doc, tabs) = tabs_runtime(&log);
    let tab = tabs[1];

    rt.set_mod(tab, "Active", true).unwrap();
    assert_eq!(host_class(&rt, &doc, tab), "tabs__tab tabs__tab_active");

    rt.set_mod(tab, "State", "release").unwrap();
    assert_eq!(
        host_class(&rt, &doc, tab),
        "tabs__tab tabs__tab_active tabs__tab_state_release"
    );

    rt.set_mod(tab, "active", false).unwrap();
    assert_eq!(host_class(&rt, &doc, tab), "tabs__tab tabs__tab_state_release");

    rt.set_mod(tab, "state", "").unwrap();
    assert_eq!(host_class(&rt, &doc, tab), "tabs__tab");
    assert_eq!(rt.class_string(tab), "tabs__tab");
}

#[test]
fn test_extra_classes_follow_modifier_classes() {
    let mut registry = Registry::new();
    registry
        .register(Declaration::new("Button").class("focusable").default_mod("Size", "m"))
        .unwrap();
    let (mut rt, doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let body = doc.borrow().body();
    let button = rt.mount(&NodeDescriptor::new("Button"), body).unwrap();
    assert_eq!(host_class(&rt, &doc, button), "button button_size_m focusable");
}

// ============================================================================
// CHANGE HANDLERS
// ============================================================================

#[test]
fn test_no_op_law() {
    let log = ChangeLog::default();
    let (mut rt, doc, tabs) = tabs_runtime(&log);
    let before = host_class(&rt, &doc, tabs[0]);

    rt.set_mod(tabs[0], "Active", true).unwrap();
    rt.set_mod(tabs[1], "Active", false).unwrap();

    assert!(log.borrow().is_empty());
    assert_eq!(host_class(&rt, &doc, tabs[0]), before);
    assert_eq!(host_class(&rt, &doc, tabs[1]), "tabs__tab");
}

#[test]
fn test_handlers_receive_new_and_previous() {
    let log = ChangeLog::default();
    let (mut rt, _doc, tabs) = tabs_runtime(&log);

    rt.set_mod(tabs[0], "Active", false).unwrap();
    rt.set_mod(tabs[1], "State", "release").unwrap();
    rt.toggle_mod(tabs[1], "Active", true, false).unwrap();
    rt.toggle_mod(tabs[1], "Active", true, false).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("active".to_string(), ModValue::Bool(false), Some(ModValue::Bool(true))),
            ("state".to_string(), ModValue::from("release"), None),
            ("active".to_string(), ModValue::Bool(true), Some(ModValue::Bool(false))),
            ("active".to_string(), ModValue::Bool(false), Some(ModValue::Bool(true))),
        ]
    );
}

#[test]
fn test_handler_sees_stored_value() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let mut registry = Registry::new();
    registry
        .register(Declaration::new("Toggle").on_mod("on", move |cx, _, _| {
            s.borrow_mut().push(cx.get_mod("on"));
            Ok(())
        }))
        .unwrap();
    let (mut rt, _doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let toggle = rt.build(&NodeDescriptor::new("Toggle")).unwrap();

    // handlers fire for live nodes that are not attached yet
    rt.set_mod(toggle, "On", true).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(ModValue::Bool(true))]);
}

#[test]
fn test_cascading_modifier_handlers() {
    let mut registry = Registry::new();
    registry
        .register(
            Declaration::new("Tabs__tab").on_mod("active", |cx, new, _| {
                if new.is_set() {
                    let me = cx.node();
                    let parent = cx.runtime().parent(me);
                    let siblings = parent.map(|p| cx.runtime().get(p, "tab")).unwrap_or_default();
                    for sibling in siblings.into_iter().filter(|s| *s != me) {
                        cx.runtime_mut().set_mod(sibling, "active", false)?;
                    }
                }
                Ok(())
            }),
        )
        .unwrap();
    let (mut rt, doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let body = doc.borrow().body();
    let tabs = rt
        .mount(
            &NodeDescriptor::new("Tabs")
                .child(NodeDescriptor::new("tab").attr("Active", true))
                .child(NodeDescriptor::new("tab"))
                .child(NodeDescriptor::new("tab")),
            body,
        )
        .unwrap();
    let tabs_children = rt.children(tabs);

    rt.set_mod(tabs_children[2], "Active", true).unwrap();

    let active: Vec<bool> = tabs_children
        .iter()
        .map(|t| rt.get_mod(*t, "active").is_some_and(|m| m.is_set()))
        .collect();
    assert_eq!(active, vec![false, false, true]);
    assert_eq!(
        doc.borrow().body_html(),
        "<div class=\"tabs\"><div class=\"tabs__tab\"></div><div class=\"tabs__tab\"></div>\
         <div class=\"tabs__tab tabs__tab_active\"></div></div>"
    );
}

// ============================================================================
// PARAMETERS
// ============================================================================

#[test]
fn test_params_and_defaults() {
    let mut registry = Registry::new();
    registry
        .register(Declaration::new("Base").default_param("size", 10))
        .unwrap();
    registry
        .register(
            Declaration::new("Input")
                .inherits(["Base"])
                .default_param("placeholder", "Search"),
        )
        .unwrap();
    let (mut rt, _doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let input = rt
        .build(&NodeDescriptor::new("Input").attr("placeholder", "Find").attr("name", "q"))
        .unwrap();

    assert_eq!(rt.param(input, "placeholder"), Some("Find".into()));
    assert_eq!(rt.param(input, "size"), Some(10.into()));
    assert_eq!(rt.param(input, "name"), Some("q".into()));
    assert_eq!(rt.param(input, "missing"), None);
    assert_eq!(rt.params(input).len(), 3);
    assert!(rt.node(input).unwrap().explicit_mods().is_empty());
}
