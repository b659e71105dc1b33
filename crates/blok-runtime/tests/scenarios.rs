//! End-to-end scenarios for blok-runtime
//!
//! Builds small component libraries, mounts them into an in-memory
//! document and checks the projected markup and lookups.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use blok_runtime::{
    Declaration, Document, Event, HostTarget, Lifecycle, NodeDescriptor, Registry, Runtime,
    RuntimeConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn runtime(decls: Vec<Declaration>) -> (Runtime, Rc<RefCell<Document>>) {
    init_tracing();
    let mut registry = Registry::new();
    for decl in decls {
        registry.register(decl).unwrap();
    }
    Runtime::with_document(registry, RuntimeConfig::default())
}

fn class_set(doc: &Rc<RefCell<Document>>, rt: &Runtime, node: blok_runtime::NodeId) -> BTreeSet<String> {
    let host = rt.host_of(node).expect("node is attached");
    doc.borrow()
        .class_of(host)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// TAB
// ============================================================================

#[test]
fn test_tab_end_to_end() {
    let (mut rt, doc) = runtime(vec![
        Declaration::new("Tab")
            .default_mod("State", "inactive")
            .expand(|cx| cx.append(NodeDescriptor::new("close")).map(|_| ())),
    ]);
    let body = doc.borrow().body();

    let tab = rt
        .mount(&NodeDescriptor::new("Tab").attr("State", "active").text("Home"), body)
        .unwrap();

    let children = rt.children(tab);
    assert_eq!(children.len(), 2);
    assert_eq!(rt.node(children[0]).unwrap().text(), Some("Home"));
    assert_eq!(rt.selector(children[1]).as_str(), "tab__close");

    let expected: BTreeSet<String> = ["tab", "tab_state_active"].map(String::from).into();
    assert_eq!(class_set(&doc, &rt, tab), expected);
    assert_eq!(
        doc.borrow().body_html(),
        "<div class=\"tab tab_state_active\">Home<div class=\"tab__close\"></div></div>"
    );
    assert_eq!(rt.state(tab), Some(Lifecycle::Ready));
}

#[test]
fn test_tab_default_modifier_class() {
    let (mut rt, doc) = runtime(vec![Declaration::new("Tab").default_mod("State", "inactive")]);
    let body = doc.borrow().body();
    let tab = rt.mount(&NodeDescriptor::new("Tab"), body).unwrap();
    assert_eq!(rt.class_string(tab), "tab tab_state_inactive");
}

// ============================================================================
// DESCRIPTORS AND CONFIGURATION
// ============================================================================

#[test]
fn test_mount_json_descriptor() {
    let (mut rt, doc) = runtime(vec![
        Declaration::new("Menu").tag("ul"),
        Declaration::new("Menu__item").tag("li"),
    ]);
    let body = doc.borrow().body();
    let desc = NodeDescriptor::from_json(
        r#"{
            "name": "Menu",
            "attributes": { "Theme": "dark", "id": "main-menu" },
            "children": [
                { "name": "item", "attributes": { "Selected": true }, "children": ["One"] },
                { "name": "item", "children": ["Two"] }
            ]
        }"#,
    )
    .unwrap();
    let menu = rt.mount(&desc, body).unwrap();

    assert_eq!(
        doc.borrow().body_html(),
        "<ul class=\"menu menu_theme_dark\" id=\"main-menu\">\
         <li class=\"menu__item menu__item_selected\">One</li>\
         <li class=\"menu__item\">Two</li></ul>"
    );
    assert_eq!(rt.find_by_id("main-menu"), Some(menu));
    assert_eq!(doc.borrow().get_element_by_id("main-menu"), rt.host_of(menu));
}

#[test]
fn test_config_from_json() {
    let config = RuntimeConfig::from_json(r#"{ "default_tag": "section" }"#).unwrap();
    let (mut rt, doc) = Runtime::with_document(Registry::new(), config);
    let body = doc.borrow().body();
    rt.mount(&NodeDescriptor::new("Page"), body).unwrap();
    assert_eq!(doc.borrow().body_html(), "<section class=\"page\"></section>");
}

#[test]
fn test_name_normalisation() {
    let (mut rt, doc) = runtime(vec![Declaration::new("tab-bar").class("bar")]);
    let body = doc.borrow().body();
    let bar = rt
        .mount(&NodeDescriptor::new("TabBar").child(NodeDescriptor::new("scrollArea")), body)
        .unwrap();
    assert_eq!(rt.class_string(bar), "tab-bar bar");
    let area = rt.children(bar)[0];
    assert_eq!(rt.selector(area).as_str(), "tab-bar__scroll-area");
}

// ============================================================================
// LOOKUPS
// ============================================================================

fn tabs_descriptor() -> NodeDescriptor {
    NodeDescriptor::new("Tabs")
        .child(
            NodeDescriptor::new("tab")
                .attr("id", "first")
                .child(NodeDescriptor::new("title").text("One")),
        )
        .child(NodeDescriptor::new("tab").child(NodeDescriptor::new("title").text("Two")))
        .child(NodeDescriptor::new("Button"))
}

#[test]
fn test_find_and_get() {
    let (mut rt, doc) = runtime(vec![]);
    let body = doc.borrow().body();
    let tabs = rt.mount(&tabs_descriptor(), body).unwrap();
    let children = rt.children(tabs);

    assert_eq!(rt.find("tabs__tab"), vec![children[0], children[1]]);
    assert_eq!(rt.find("Tabs__title").len(), 2);
    assert_eq!(rt.find_by_id("first"), Some(children[0]));
    assert_eq!(rt.find_by_id("second"), None);

    assert_eq!(rt.get(tabs, "tab"), vec![children[0], children[1]]);
    assert_eq!(rt.get(tabs, "tab/title").len(), 2);
    assert_eq!(rt.get(tabs, "Button"), vec![children[2]]);
    assert_eq!(rt.get(tabs, "tabs__tab"), vec![children[0], children[1]]);
    assert!(rt.get(tabs, "missing").is_empty());
    assert!(rt.get(tabs, "tab/missing").is_empty());
    assert!(rt.get(tabs, "").is_empty());
}

#[test]
fn test_lookups_span_all_roots_and_skip_removed() {
    let (mut rt, doc) = runtime(vec![]);
    let body = doc.borrow().body();
    let first = rt.mount(&tabs_descriptor(), body).unwrap();
    let second = rt.mount(&tabs_descriptor(), body).unwrap();

    assert_eq!(rt.roots(), &[first, second]);
    assert_eq!(rt.find("tabs").len(), 2);
    assert_eq!(rt.find("tabs__tab").len(), 4);

    rt.remove(first).unwrap();
    assert_eq!(rt.roots(), &[second]);
    assert_eq!(rt.find("tabs__tab").len(), 2);
    assert_eq!(rt.find_by_id("first"), rt.get(second, "tab").first().copied());
}

// ============================================================================
// IMPLEMENT
// ============================================================================

#[test]
fn test_implement_keeps_handlers_and_position() {
    let clicks = Rc::new(RefCell::new(0));
    let button_expansions = Rc::new(RefCell::new(0));
    let (c, b) = (clicks.clone(), button_expansions.clone());

    let (mut rt, doc) = runtime(vec![
        Declaration::new("Tabs__close")
            .default_mod("Hidden", false)
            .on("click", move |_, _| {
                *c.borrow_mut() += 1;
                Ok(())
            })
            .expand(|cx| {
                cx.implement_with(&NodeDescriptor::new("Button").attr("Size", "s"))
                    .map(|_| ())
            }),
        Declaration::new("Button").tag("button").expand(move |cx| {
            *b.borrow_mut() += 1;
            cx.append("×").map(|_| ())
        }),
    ]);
    let body = doc.borrow().body();
    let tabs = rt
        .mount(
            &NodeDescriptor::new("Tabs")
                .child(NodeDescriptor::new("tab"))
                .child(NodeDescriptor::new("close"))
                .child(NodeDescriptor::new("tab")),
            body,
        )
        .unwrap();

    let button = rt.children(tabs)[1];
    assert_eq!(rt.selector(button).as_str(), "button");
    assert_eq!(rt.find("tabs__close"), vec![button]);
    assert_eq!(rt.find("button"), vec![button]);
    assert_eq!(*button_expansions.borrow(), 1);

    // own class derivation, original's modifier defaults
    assert_eq!(rt.class_string(button), "button button_size_s");
    assert_eq!(rt.get_mod(button, "hidden"), Some(false.into()));

    let host = rt.host_of(button).unwrap();
    assert_eq!(doc.borrow().tag_of(host), Some("button"));
    assert_eq!(
        doc.borrow().to_html(host),
        "<button class=\"button button_size_s\">×</button>"
    );

    rt.trigger(button, &mut Event::new("click")).unwrap();
    rt.dispatch_event(HostTarget::Node(host), &mut Event::new("click"))
        .unwrap();
    assert_eq!(*clicks.borrow(), 2);

    // re-expanding never reaches the button hook again
    rt.expand(tabs).unwrap();
    rt.expand(button).unwrap();
    assert_eq!(*button_expansions.borrow(), 1);
}

#[test]
fn test_implement_carries_explicit_modifiers() {
    let (mut rt, doc) = runtime(vec![
        Declaration::new("Tabs__tab").expand(|cx| {
            cx.implement_with(&NodeDescriptor::new("Link").attr("Size", "m"))
                .map(|_| ())
        }),
        Declaration::new("Link").tag("a"),
    ]);
    let body = doc.borrow().body();
    let tabs = rt
        .mount(
            &NodeDescriptor::new("Tabs")
                .child(NodeDescriptor::new("tab").attr("Active", true).attr("Size", "l")),
            body,
        )
        .unwrap();
    let link = rt.children(tabs)[0];
    assert_eq!(rt.class_string(link), "link link_active link_size_m");
}

#[test]
fn test_replace_attached_node_in_place() {
    let (mut rt, doc) = runtime(vec![]);
    let body = doc.borrow().body();
    let page = rt
        .mount(
            &NodeDescriptor::new("Page")
                .child(NodeDescriptor::new("Spinner"))
                .child(NodeDescriptor::new("footer")),
            body,
        )
        .unwrap();
    let spinner = rt.children(page)[0];

    let content = rt
        .replace_with(spinner, &NodeDescriptor::new("Content").text("Loaded"))
        .unwrap();

    assert_eq!(rt.children(page)[0], content);
    assert_eq!(rt.state(spinner), Some(Lifecycle::Removed));
    assert_eq!(rt.current(spinner), content);
    assert_eq!(rt.state(content), Some(Lifecycle::Ready));
    assert_eq!(
        doc.borrow().body_html(),
        "<div class=\"page\"><div class=\"content\">Loaded</div>\
         <div class=\"page__footer\"></div></div>"
    );
}

#[test]
fn test_wrap_existing_content() {
    let (mut rt, doc) = runtime(vec![Declaration::new("Wrapper").expand(|cx| {
        let content = cx.empty()?;
        let inner = cx.append(NodeDescriptor::new("inner"))?;
        cx.runtime_mut().append_nodes(inner, &content)
    })]);
    let body = doc.borrow().body();
    rt.mount(
        &NodeDescriptor::new("Wrapper")
            .text("a")
            .child(NodeDescriptor::new("Icon")),
        body,
    )
    .unwrap();
    assert_eq!(
        doc.borrow().body_html(),
        "<div class=\"wrapper\"><div class=\"wrapper__inner\">a<div class=\"icon\"></div></div></div>"
    );
}

#[test]
fn test_dom_attributes() {
    let (mut rt, doc) = runtime(vec![Declaration::new("Link").tag("a").dom_attr("role", "link")]);
    let body = doc.borrow().body();
    let link = rt
        .mount(&NodeDescriptor::new("Link").attr("id", "home"), body)
        .unwrap();
    let host = rt.host_of(link).unwrap();

    assert_eq!(doc.borrow().attribute(host, "role").as_deref(), Some("link"));
    assert_eq!(doc.borrow().attribute(host, "id").as_deref(), Some("home"));

    rt.set_dom_attr(link, "href", "/").unwrap();
    assert_eq!(doc.borrow().attribute(host, "href").as_deref(), Some("/"));
    assert_eq!(rt.dom_attr(link, "href").as_deref(), Some("/"));
    assert_eq!(rt.dom_attr(link, "role").as_deref(), Some("link"));
}
