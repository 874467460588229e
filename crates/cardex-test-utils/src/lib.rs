//! Testing utilities for the Cardex workspace
//!
//! Shared fixtures and helpers. Fixture builders unwrap freely; they are
//! only ever driven with inputs known to be valid.

#![allow(missing_docs)]

use cardex_catalog::{DocumentNode, FieldName, FieldValue, NodeBuilder, NodeFactory};
use cardex_model::{DateStamp, Locator, ServiceKind};
use chrono::{TimeZone, Utc};

pub fn factory() -> NodeFactory {
    NodeFactory::new()
}

pub fn catalog_builder(name: &str) -> NodeBuilder {
    factory()
        .catalog(
            name,
            Locator::new(format!("https://example.org/{name}.xml")),
            None,
            None,
            None,
        )
        .unwrap()
}

pub fn service_builder(name: &str, kind: ServiceKind) -> NodeBuilder {
    factory()
        .service(name, kind, Locator::new(format!("/{name}/")))
        .unwrap()
}

pub fn dataset_builder(name: &str) -> NodeBuilder {
    factory().dataset(name).unwrap()
}

/// Dataset offered through the named service
pub fn dataset_with_service(name: &str, service: &str) -> NodeBuilder {
    let mut dataset = dataset_builder(name);
    dataset
        .set_field(FieldName::ServiceRef, FieldValue::Text(service.to_string()))
        .unwrap();
    dataset
}

/// Fixed instant for reproducible timestamp fields
pub fn stamp() -> DateStamp {
    DateStamp::new(Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap())
}

/// Catalog with one OPeNDAP service and one dataset offered through it;
/// finishes cleanly
pub fn small_valid_catalog() -> NodeBuilder {
    let mut catalog = catalog_builder("top");
    catalog
        .add_child(service_builder("odap", ServiceKind::OpenDap))
        .unwrap();
    catalog
        .add_child(dataset_with_service("temps", "odap"))
        .unwrap();
    catalog
}

/// Finish a builder expected to be valid
pub fn finish_ok(builder: &mut NodeBuilder) -> DocumentNode {
    match builder.finish() {
        Ok(document) => document,
        Err(error) => panic!("fixture failed to finish: {error}"),
    }
}
