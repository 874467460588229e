//! Re-open scenarios: deep copy fidelity and isolation from the frozen
//! document.

use cardex_catalog::prelude::*;
use cardex_test_utils::{factory, finish_ok, small_valid_catalog};
use pretty_assertions::assert_eq;

#[test]
fn reopen_restores_the_pre_finish_builder() {
    let mut builder = small_valid_catalog();
    let snapshot = builder.clone();

    let document = finish_ok(&mut builder);
    let reopened = factory().reopen(&document).unwrap();

    assert_eq!(reopened, snapshot);
    assert!(!reopened.is_finished());
}

#[test]
fn mutating_the_reopened_builder_never_touches_the_document() {
    let mut builder = small_valid_catalog();
    let document = finish_ok(&mut builder);

    let mut reopened = factory().reopen(&document).unwrap();
    reopened
        .set_field(FieldName::Name, FieldValue::Text("renamed".into()))
        .unwrap();
    let removed = reopened.remove_child(0).unwrap();
    assert_eq!(removed.kind(), NodeKind::Service);

    // The frozen original is unaffected.
    assert_eq!(document.name(), "top");
    assert_eq!(document.children().len(), 2);
    assert!(document.find_service("odap").is_some());
}

#[test]
fn reopened_builder_finishes_to_an_equal_document() {
    let mut builder = small_valid_catalog();
    let document = finish_ok(&mut builder);

    let mut reopened = factory().reopen(&document).unwrap();
    let refinished = finish_ok(&mut reopened);

    // Fields, children, and rebuilt indices all match.
    assert_eq!(refinished, document);
}

#[test]
fn reopen_then_edit_then_finish() {
    let mut builder = small_valid_catalog();
    let document = finish_ok(&mut builder);

    let mut reopened = factory().reopen(&document).unwrap();
    reopened
        .add_child(factory().service("wms", ServiceKind::Wms, Locator::new("/wms/")).unwrap())
        .unwrap();

    let edited = finish_ok(&mut reopened);
    assert!(edited.find_service("wms").is_some());
    assert!(document.find_service("wms").is_none());
}

#[test]
fn reopen_copies_nested_subtrees() {
    let mut inner = factory()
        .catalog("inner", Locator::new("https://example.org/inner.xml"), None, None, None)
        .unwrap();
    inner
        .add_child(factory().dataset("temps").unwrap())
        .unwrap();

    let mut outer = factory()
        .catalog("outer", Locator::new("https://example.org/outer.xml"), None, None, None)
        .unwrap();
    outer.add_child(inner).unwrap();

    let document = finish_ok(&mut outer);
    let mut reopened = factory().reopen(&document).unwrap();

    // Reach into the nested catalog and rename its dataset.
    let inner_builder = reopened.child_mut(0).unwrap();
    let dataset = inner_builder.child_mut(0).unwrap();
    dataset
        .set_field(FieldName::Name, FieldValue::Text("pressure".into()))
        .unwrap();

    let edited = finish_ok(&mut reopened);
    let edited_name = edited.children()[0].children()[0].name().to_string();
    assert_eq!(edited_name, "pressure");

    // Original document still names the dataset "temps".
    assert_eq!(document.children()[0].children()[0].name(), "temps");
}
