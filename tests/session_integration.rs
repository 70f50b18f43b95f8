use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fancy_editor::document::markup;
use fancy_editor::prelude::*;
use fancy_editor::session::{ButtonVariant, UpdatePayload};

const GUIDE: &str = include_str!("fixtures/guide.html");

fn snapshot(markup: &str) -> Rc<ContentSnapshot> {
    Rc::new(ContentSnapshot::from(markup))
}

#[test]
fn test_hello_editor_reaches_plain_text() {
    let mut provider = SessionProvider::new();
    let mut surface = ContentSurface::new().with_content(snapshot("<h1>Hello, Editor!</h1>"));
    provider.render(&mut [&mut surface]);

    let text = provider.session().unwrap().get_text();
    assert!(text.contains("Hello, Editor!"));
}

#[test]
fn test_seeded_tree_matches_independent_parse() {
    let mut provider = SessionProvider::new().with_content(GUIDE);
    provider.render(&mut []);
    let live = provider.session().unwrap().get_json();
    assert_eq!(live, markup::parse(GUIDE).unwrap());

    // A tree snapshot seeds the same document as its markup.
    let mut from_tree = SessionProvider::new().with_content(ContentSnapshot::Tree(live.clone()));
    from_tree.render(&mut []);
    assert_eq!(from_tree.session().unwrap().get_json(), live);
}

#[test]
fn test_every_toggle_twice_restores_state() {
    for toggle in Toggle::ALL {
        let mut provider = SessionProvider::new().with_content(GUIDE);
        provider.with_scope(|scope| {
            let session = scope.session().unwrap().session();
            session.chain().set_selection(70, 120).run();
        });
        let before_json = provider.session().unwrap().get_json();

        let mut button = ToggleButton::new(toggle);
        let before = provider.render(&mut [&mut button]).buttons()[0].variant;

        provider.with_scope(|scope| button.click(scope));
        let during = provider.render(&mut [&mut button]).buttons()[0].variant;
        assert_ne!(before, during, "{toggle:?} did not change state");

        provider.with_scope(|scope| button.click(scope));
        let after = provider.render(&mut [&mut button]).buttons()[0].variant;
        assert_eq!(before, after, "{toggle:?} did not restore state");
        if matches!(toggle, Toggle::BulletList | Toggle::OrderedList) {
            assert_eq!(provider.session().unwrap().get_json(), before_json);
        }
    }
}

#[test]
fn test_page_composition() {
    let edits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&edits);
    let snapshots: Rc<RefCell<Vec<ContentSnapshot>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&snapshots);

    let mut provider = SessionProvider::new().on_update(move |_| counter.set(counter.get() + 1));
    let mut surface = ContentSurface::new()
        .with_content(snapshot("<p>Hello, Editor!</p>"))
        .with_payload(UpdatePayload::Snapshot)
        .with_drag_handle(true)
        .on_content_update(move |update| sink.borrow_mut().push(update.to_snapshot()));
    let mut mirror = ReadOnlyMirror::new();
    let mut bold = ToggleButton::new(Toggle::Bold);
    let mut italic = ToggleButton::new(Toggle::Italic);

    let out = provider.render(&mut [&mut surface, &mut mirror, &mut bold, &mut italic]);
    let surfaces = out.surfaces();
    assert_eq!(surfaces.len(), 2);
    assert!(surfaces[0].editable && surfaces[0].drag_handle);
    assert!(!surfaces[1].editable);
    assert_eq!(surfaces[1].html, "<p>Hello, Editor!</p>");

    provider.with_scope(|scope| {
        scope.session().unwrap().session().chain().select_all().run();
        bold.click(scope)
    });
    assert_eq!(edits.get(), 1);
    assert_eq!(snapshots.borrow().len(), 1);

    let out = provider.render(&mut [&mut surface, &mut mirror, &mut bold, &mut italic]);
    let buttons = out.buttons();
    assert_eq!(buttons[0].variant, ButtonVariant::Default);
    assert_eq!(buttons[1].variant, ButtonVariant::Outline);
    assert_eq!(out.surfaces()[1].html, "<p><strong>Hello, Editor!</strong></p>");
    assert_eq!(
        snapshots.borrow()[0].to_markup().unwrap(),
        "<p><strong>Hello, Editor!</strong></p>"
    );
}

#[test]
fn test_identity_replacement_rebuilds_exactly_once() {
    let mut provider = SessionProvider::new();
    let mut surface = ContentSurface::new().with_content(snapshot("<p>same text</p>"));
    provider.render(&mut [&mut surface]);
    let generation = provider.generation();
    let old = provider.session().unwrap().watch();
    assert_eq!(provider.session().unwrap().subscriber_count(), 2);

    // Same text, new identity.
    surface.set_content(Some(snapshot("<p>same text</p>")));
    provider.render(&mut [&mut surface]);
    provider.render(&mut [&mut surface]);

    assert_eq!(provider.generation(), generation + 1);
    assert!(!old.is_alive(), "old session should be torn down");
    let session = provider.session().unwrap();
    assert_eq!(session.subscriber_count(), 2);
    assert_eq!(session.get_text(), "same text");
}

#[test]
fn test_dropping_provider_frees_session() {
    let mut provider = SessionProvider::new();
    let mut surface = ContentSurface::new();
    provider.render(&mut [&mut surface]);
    let editor = provider.session().unwrap().watch();

    drop(provider);
    assert!(!editor.is_alive());
    assert!(!surface.is_subscribed());
}

#[test]
fn test_invalid_initial_content_renders_empty_region() {
    let bad = ContentSnapshot::Tree(Node::paragraph(Vec::new()));
    let mut provider = SessionProvider::new().with_content(bad);
    let mut surface = ContentSurface::new();
    assert_eq!(provider.render(&mut [&mut surface]), Rendered::Empty);
    assert!(!surface.is_subscribed());
}

#[test]
#[should_panic(expected = "Editor.Box should be in Editor.Root")]
fn test_surface_outside_provider_panics() {
    ContentSurface::new().render(&Scope::root());
}

#[test]
#[should_panic(expected = "Editor.ReadOnly should be in Editor.Root")]
fn test_mirror_outside_provider_panics() {
    ReadOnlyMirror::new().render(&Scope::root());
}

#[test]
#[should_panic(expected = "Editor.ToggleItalicBtn should be in Editor.Root")]
fn test_button_outside_provider_panics() {
    ToggleButton::new(Toggle::Italic).render(&Scope::root());
}
