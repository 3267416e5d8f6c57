//! Qualified-name and schema-path behavior.

use std::sync::Arc;

use espalier_foundation::{QName, SchemaPath};

// =============================================================================
// QName
// =============================================================================

#[test]
fn qname_identity_is_module_plus_name() {
    let a = QName::new("acme-base", "device");
    let b = QName::new("acme-base", "device");
    let c = QName::new("acme-site", "device");

    assert_eq!(a, b);
    assert_ne!(a, c, "same local name, different module");
    assert_eq!(format!("{a}"), "acme-base:device");
}

#[test]
fn rebind_changes_module_only() {
    let original = QName::new("acme-lib", "port");
    let module: Arc<str> = Arc::from("acme-site");
    let rebound = original.rebind(&module);

    assert_eq!(rebound.module().as_ref(), "acme-site");
    assert_eq!(rebound.name(), original.name());
    assert_eq!(original.module().as_ref(), "acme-lib", "original untouched");
}

// =============================================================================
// SchemaPath
// =============================================================================

#[test]
fn schema_path_extends_persistently() {
    let root = SchemaPath::root();
    let device = root.child(QName::new("m", "device"));
    let port = device.child(QName::new("m", "port"));

    assert!(root.is_empty());
    assert_eq!(device.len(), 1);
    assert_eq!(port.len(), 2);
    assert_eq!(port.last(), Some(&QName::new("m", "port")));
    // Extending a path never mutates the parent.
    assert_eq!(device.len(), 1);
}

#[test]
fn schema_path_displays_slash_separated() {
    let path = SchemaPath::of([QName::new("m", "device"), QName::new("m", "port")]);
    assert_eq!(format!("{path}"), "/m:device/m:port");
    assert_eq!(format!("{}", SchemaPath::root()), "/");
}
