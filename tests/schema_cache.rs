mod common;

use cslp_visual_editor::{Dom, FocusOutcome, PhaseKind, Rect, presentation::classes};
use futures::{executor::block_on, join, pin_mut, poll};
use serde_json::json;

use common::{ScriptedHost, editor, host_with_page, page, page_schema, tagged};

fn row(top: f64) -> Rect {
    Rect::new(top, 40.0, 320.0, 32.0)
}

#[test]
fn concurrent_clicks_share_one_schema_request() {
    let mut dom = page();
    let body = dom.body();
    let title = tagged(&mut dom, body, "h1", "page.blt01.en-us.title", "Hello", row(100.0));
    let summary = tagged(&mut dom, body, "p", "page.blt01.en-us.summary", "Intro", row(200.0));
    let host = host_with_page();
    host.with_data("title", json!("Hello"));
    host.with_data("summary", json!("Intro"));
    host.defer(true);
    let editor = editor(dom, &host);

    let first = editor.handle_click(title);
    let second = editor.handle_click(summary);
    pin_mut!(first, second);

    block_on(async {
        assert!(poll!(first.as_mut()).is_pending());
        assert!(poll!(second.as_mut()).is_pending());
        assert_eq!(host.request_count("GET_FIELD_SCHEMA"), 1);
        assert_eq!(host.request_count("GET_FIELD_DATA"), 2);
        assert!(editor.schemas().is_pending("page"));

        host.release();
        let (first, second) = join!(first, second);
        assert_eq!(first, FocusOutcome::Stale);
        assert_eq!(second, FocusOutcome::Settled(PhaseKind::InlineEditable));
    });

    assert_eq!(editor.focused_element(), Some(summary));
    assert!(!editor.schemas().is_pending("page"));
    assert!(editor.schemas().cached("page").is_some());
    assert!(!editor.dom().has_class(title, classes::EDIT_MODE));
}

#[test]
fn schemas_are_fetched_once_per_content_type() {
    let mut dom = page();
    let body = dom.body();
    let title = tagged(&mut dom, body, "h1", "page.blt01.en-us.title", "Hello", row(100.0));
    let price = tagged(&mut dom, body, "span", "page.blt01.en-us.price", "42", row(200.0));
    let host = host_with_page();
    host.with_data("title", json!("Hello"));
    host.with_data("price", json!(42));
    let editor = editor(dom, &host);

    block_on(editor.handle_click(title));
    block_on(editor.handle_click(price));
    editor.defocus();
    block_on(editor.handle_click(title));

    assert_eq!(host.request_count("GET_FIELD_SCHEMA"), 1);
    assert_eq!(host.request_count("GET_FIELD_DATA"), 3);
}

#[test]
fn failed_schema_requests_are_retried_on_the_next_click() {
    let mut dom = page();
    let body = dom.body();
    let headline = tagged(&mut dom, body, "h1", "article.blt02.en-us.headline", "News", row(100.0));
    let host = ScriptedHost::new();
    host.with_data("headline", json!("News"));
    let editor = editor(dom, &host);

    let outcome = block_on(editor.handle_click(headline));
    assert_eq!(outcome, FocusOutcome::Settled(PhaseKind::Disabled));
    assert!(editor.schemas().cached("article").is_none());

    host.with_schema(
        "article",
        json!({"headline": {"uid": "headline", "data_type": "text", "display_name": "Headline"}}),
    );
    editor.defocus();
    let outcome = block_on(editor.handle_click(headline));
    assert_eq!(outcome, FocusOutcome::Settled(PhaseKind::InlineEditable));
    assert_eq!(host.request_count("GET_FIELD_SCHEMA"), 2);
}

#[test]
fn reset_forgets_cached_schemas() {
    let mut dom = page();
    let body = dom.body();
    let title = tagged(&mut dom, body, "h1", "page.blt01.en-us.title", "Hello", row(100.0));
    let host = ScriptedHost::new();
    host.with_schema("page", page_schema());
    host.with_data("title", json!("Hello"));
    let editor = editor(dom, &host);

    block_on(editor.handle_click(title));
    editor.reset();
    assert_eq!(editor.phase(), PhaseKind::Unfocused);
    assert!(editor.schemas().cached("page").is_none());
    assert_eq!(host.notifications_named("UPDATE_FIELD").len(), 1);

    block_on(editor.handle_click(title));
    assert_eq!(host.request_count("GET_FIELD_SCHEMA"), 2);
}
