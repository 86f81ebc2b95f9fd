//! Tests for the service catalog

use service_poller::config::{ServiceCatalog, ServiceDescriptor};
use service_poller::core::ConfigError;

const CATALOG: &str = r#"[
    {"name": "alpha", "url": "http://alpha.example.com/status"},
    {"name": "beta", "url": "https://beta.example.com/v1/health"},
    {"name": "gamma", "url": "http://10.0.0.7:8080/metrics.json"}
]"#;

fn names(services: &[ServiceDescriptor]) -> Vec<&str> {
    services.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn test_catalog_preserves_order() {
    let catalog = ServiceCatalog::from_json_str(CATALOG).unwrap();
    assert_eq!(catalog.len(), 3);
    assert!(!catalog.is_empty());
    assert_eq!(names(catalog.services()), vec!["alpha", "beta", "gamma"]);
    assert_eq!(
        catalog.get("gamma").map(|s| s.url.as_str()),
        Some("http://10.0.0.7:8080/metrics.json")
    );
    assert!(catalog.get("delta").is_none());
}

#[test]
fn test_select_everything_when_no_names_given() {
    let catalog = ServiceCatalog::from_json_str(CATALOG).unwrap();
    let selected = catalog.select::<&str>(&[]).unwrap();
    assert_eq!(names(&selected), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_select_keeps_catalog_order_and_drops_unknown() {
    let catalog = ServiceCatalog::from_json_str(CATALOG).unwrap();
    let selected = catalog.select(&["gamma", "nope", "alpha"]).unwrap();
    assert_eq!(names(&selected), vec!["alpha", "gamma"]);
}

#[test]
fn test_select_only_unknown_names_fails() {
    let catalog = ServiceCatalog::from_json_str(CATALOG).unwrap();
    let err = catalog.select(&["nope", "missing"]).unwrap_err();
    assert!(matches!(err, ConfigError::NoServicesSelected));
}

#[test]
fn test_empty_catalog_rejected() {
    let err = ServiceCatalog::from_json_str("[]").unwrap_err();
    assert!(matches!(err, ConfigError::EmptyCatalog));
}

#[test]
fn test_malformed_catalog_rejected() {
    let err = ServiceCatalog::from_json_str(r#"{"name": "alpha"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogMalformed(_)));

    let err = ServiceCatalog::from_json_str(r#"[{"name": "alpha"}]"#).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogMalformed(_)));
}

#[test]
fn test_duplicate_and_empty_names_rejected() {
    let err = ServiceCatalog::new(vec![
        ServiceDescriptor::new("a", "http://a.example.com"),
        ServiceDescriptor::new("a", "http://b.example.com"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateService(ref n) if n == "a"));

    let err = ServiceCatalog::new(vec![
        ServiceDescriptor::new("a", "http://a.example.com"),
        ServiceDescriptor::new(" ", "http://b.example.com"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyServiceName(1)));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ServiceCatalog::load(&dir.path().join("services.json")).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogUnreadable { .. }));
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("services.json");
    std::fs::write(&path, CATALOG).unwrap();
    let catalog = ServiceCatalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 3);
}
