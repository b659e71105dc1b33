//! Example: a tab strip built from declarations

use blok_runtime::{
    Declaration, Event, HostTarget, NodeDescriptor, Registry, Result, Runtime, RuntimeConfig,
};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut registry = Registry::new();
    registry.register(
        Declaration::new("Tabs__tab")
            .tag("button")
            .default_mod("Active", false)
            .on("click", |cx, _| {
                let me = cx.node();
                let tabs = cx
                    .runtime()
                    .parent(me)
                    .map(|p| cx.runtime().get(p, "tab"))
                    .unwrap_or_default();
                for tab in tabs {
                    cx.runtime_mut().set_mod(tab, "Active", tab == me)?;
                }
                Ok(())
            }),
    )?;

    let (mut runtime, doc) = Runtime::with_document(registry, RuntimeConfig::default());
    let body = doc.borrow().body();
    let tabs = runtime.mount(
        &NodeDescriptor::new("Tabs")
            .child(NodeDescriptor::new("tab").attr("Active", true).text("Home"))
            .child(NodeDescriptor::new("tab").text("Settings")),
        body,
    )?;

    println!("blok runtime v{}", blok_runtime::VERSION);
    println!("{}", doc.borrow().body_html());

    let second = runtime.children(tabs)[1];
    if let Some(host) = runtime.host_of(second) {
        runtime.dispatch_event(HostTarget::Node(host), &mut Event::new("click"))?;
    }
    println!("{}", doc.borrow().body_html());
    Ok(())
}
