mod common;

use std::time::Duration;

use common::{Call, FakeDriver, FakeElement, FakePage};
use pretty_assertions::assert_eq;
use scrape_tree::nodes::{Attribute, Constant, Node, Table};
use scrape_tree::{Context, Locator};
use serde_json::json;

fn page() -> FakePage {
    FakePage::new()
        .with("title", FakeElement::text("Dieren").attr("aria-label", "Dieren  in de zorg"))
        .with("party", FakeElement::text("VVD"))
        .with("party", FakeElement::text("D66"))
        .with("party", FakeElement::text("GL-PvdA"))
}

#[test]
fn single_attribute_reads_first_match() {
    let mut driver = FakeDriver::single(page());
    let node = Attribute::new("title", Locator::class_name("title"), "aria-label");
    let out = node.evaluate(&mut driver, &Context::new()).unwrap();
    assert_eq!(out, json!({"title": "Dieren  in de zorg"}));
}

#[test]
fn text_reads_inner_text() {
    let mut driver = FakeDriver::single(page());
    let out = Attribute::text("party", Locator::css("party"))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!({"party": "VVD"}));
}

#[test]
fn multiple_mode_keeps_document_order() {
    let mut driver = FakeDriver::single(page());
    let out = Attribute::text("party", Locator::css("party"))
        .multiple()
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!([{"party": "VVD"}, {"party": "D66"}, {"party": "GL-PvdA"}]));
}

#[test]
fn missing_attribute_is_null() {
    let mut driver = FakeDriver::single(page());
    let out = Attribute::new("href", Locator::css("title"), "href")
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!({"href": null}));
}

#[test]
fn single_mode_timeout_yields_default() {
    let mut driver = FakeDriver::single(page());
    let out = Attribute::text("info", Locator::css("info"))
        .default_value(json!({"info": "n/a"}))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!({"info": "n/a"}));

    let out = Attribute::text("info", Locator::css("info"))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert!(out.is_null());
}

#[test]
fn multiple_mode_timeout_yields_empty_sequence_not_default() {
    let mut driver = FakeDriver::single(page());
    let out = Attribute::text("party", Locator::css("nothing"))
        .multiple()
        .default_value(json!("scalar default"))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!([]));
}

#[test]
fn element_gone_after_wait_yields_default() {
    let page = FakePage::new().with("info", FakeElement::text("stale").vanishes_after_wait());
    let mut driver = FakeDriver::single(page);
    let out = Attribute::text("info", Locator::css("info"))
        .default_value(json!({"info": "n/a"}))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(out, json!({"info": "n/a"}));
    assert_eq!(driver.waits(), 1);
    assert_eq!(driver.count(|c| matches!(c, Call::FindOne(_))), 1);
}

#[test]
fn extractor_waits_with_configured_timeout() {
    let mut driver = FakeDriver::single(page());
    Attribute::text("party", Locator::css("party"))
        .with_timeout(Duration::from_secs(7))
        .evaluate(&mut driver, &Context::new())
        .unwrap();
    assert_eq!(driver.calls[0], Call::Wait("party".into(), Duration::from_secs(7)));
}

#[test]
fn locator_path_uses_context() {
    let mut driver = FakeDriver::single(FakePage::new().with("row-2", FakeElement::text("two")));
    let out = Attribute::text("v", Locator::css("row-{i}"))
        .evaluate(&mut driver, &Context::new().with("i", 2))
        .unwrap();
    assert_eq!(out, json!({"v": "two"}));
}

#[test]
fn table_is_parsed_into_records() {
    let html = "<table><tr><th>Party</th><th>Seats</th></tr>\
                <tr><td>VVD</td><td>24</td></tr><tr><td>D66</td><td>9</td></tr></table>";
    let mut driver = FakeDriver::single(FakePage::new().with("seats", FakeElement::new().html(html)));
    let out = Table::new(Locator::id("seats")).evaluate(&mut driver, &Context::new()).unwrap();
    assert_eq!(out, json!([{"Party": "VVD", "Seats": 24}, {"Party": "D66", "Seats": 9}]));
}

#[test]
fn table_timeout_yields_empty_sequence() {
    let mut driver = FakeDriver::single(page());
    let out = Table::new(Locator::id("seats")).evaluate(&mut driver, &Context::new()).unwrap();
    assert_eq!(out, json!([]));
}

#[test]
fn table_gone_after_wait_yields_empty_sequence() {
    let html = "<table><tr><th>Party</th></tr><tr><td>VVD</td></tr></table>";
    let page = FakePage::new().with("seats", FakeElement::new().html(html).vanishes_after_wait());
    let mut driver = FakeDriver::single(page);
    let out = Table::new(Locator::id("seats")).evaluate(&mut driver, &Context::new()).unwrap();
    assert_eq!(out, json!([]));
    assert_eq!(driver.waits(), 1);
}

#[test]
fn constant_renders_strings_and_mapping_keys() {
    let mut driver = FakeDriver::default();
    let ctx = Context::new().with("i", 3).with("party", "SP");

    let out = Constant::new(json!("page {i}")).evaluate(&mut driver, &ctx).unwrap();
    assert_eq!(out, json!("page 3"));

    let out = Constant::new(json!({"col_{i}": "{party}", "n": 1}))
        .evaluate(&mut driver, &ctx)
        .unwrap();
    assert_eq!(out, json!({"col_3": "SP", "n": 1}));

    let out = Constant::empty().evaluate(&mut driver, &ctx).unwrap();
    assert_eq!(out, json!([]));
    assert!(driver.calls.is_empty());
}
