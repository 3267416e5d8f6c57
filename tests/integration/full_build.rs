//! A full multi-module build, and the declared/effective split.

use espalier_reactor::Reactor;
use espalier_source::StatementEvent;
use espalier_vocab::Keyword;

use crate::util::{leaf, module, qn, src};

fn library() -> StatementEvent {
    module("acme-library", "lib")
        .with(
            StatementEvent::new("grouping", "endpoint")
                .with(leaf("address", "string"))
                .with(
                    StatementEvent::new("leaf", "port").with(
                        StatementEvent::new("type", "uint16")
                            .with(StatementEvent::new("range", "1..65535")),
                    ),
                ),
        )
        .with(
            StatementEvent::new("typedef", "percent").with(
                StatementEvent::new("type", "uint8")
                    .with(StatementEvent::new("range", "0..100")),
            ),
        )
}

fn device() -> StatementEvent {
    module("acme-device", "dev")
        .with(
            StatementEvent::new("import", "acme-library")
                .with(StatementEvent::new("prefix", "lib")),
        )
        .with(StatementEvent::new("include", "acme-device-state"))
        .with(
            StatementEvent::new("container", "system")
                .with(StatementEvent::new("uses", "lib:endpoint"))
                .with(leaf("load", "lib:percent")),
        )
}

fn device_state() -> StatementEvent {
    StatementEvent::new("submodule", "acme-device-state")
        .with(
            StatementEvent::new("belongs-to", "acme-device")
                .with(StatementEvent::new("prefix", "dev")),
        )
        .with(StatementEvent::new("container", "state").with(leaf("uptime", "uint32")))
}

fn addons() -> StatementEvent {
    module("acme-addons", "add")
        .with(
            StatementEvent::new("import", "acme-device")
                .with(StatementEvent::new("prefix", "d")),
        )
        .with(
            StatementEvent::new("augment", "/d:system").with(leaf("description", "string")),
        )
        .with(
            StatementEvent::new("deviation", "/d:system/d:load")
                .with(StatementEvent::new("deviate", "not-supported")),
        )
}

// =============================================================================
// Effective build
// =============================================================================

#[test]
fn four_sources_combine_into_one_effective_model() {
    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(library()))
        .add_source(src(device()))
        .add_source(src(device_state()))
        .add_source(src(addons()))
        .build_effective()
        .unwrap();

    let device = model.module("acme-device").unwrap();
    let system = device.data_child(&qn("acme-device", "system")).unwrap();

    // Grouping content lands under the use site with its module.
    let port = system.data_child(&qn("acme-device", "port")).unwrap();
    assert_eq!(port.leaf_type().unwrap().effective_ranges(), vec![(1, 65535)]);

    // Augmented content keeps the augmenting module.
    assert!(system.data_child(&qn("acme-addons", "description")).is_some());

    // The withdrawn leaf never materializes.
    assert!(system.data_child(&qn("acme-device", "load")).is_none());

    // Submodule content joins the module root.
    let state = device.data_child(&qn("acme-device", "state")).unwrap();
    assert!(state.data_child(&qn("acme-device", "uptime")).is_some());

    // Submodules are not modules of their own.
    assert!(model.module("acme-device-state").is_none());
}

#[test]
fn effective_paths_descend_through_data_nodes() {
    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(library()))
        .add_source(src(device()))
        .add_source(src(device_state()))
        .build_effective()
        .unwrap();

    let address = model
        .module("acme-device")
        .unwrap()
        .descendant(&[qn("acme-device", "system"), qn("acme-device", "address")])
        .unwrap();
    assert_eq!(format!("{}", address.path()), "/acme-device:system/acme-device:address");
}

#[test]
fn rebuilding_the_same_sources_yields_an_equal_model() {
    let build = || {
        Reactor::vanilla()
            .new_build()
            .add_source(src(library()))
            .add_source(src(device()))
            .add_source(src(device_state()))
            .add_source(src(addons()))
            .build_effective()
            .unwrap()
    };
    assert_eq!(build(), build());
}

// =============================================================================
// Declared build
// =============================================================================

#[test]
fn declared_model_keeps_raw_text_and_skips_expansion() {
    let declared = Reactor::vanilla()
        .new_build()
        .add_source(src(library()))
        .add_source(src(device()))
        .add_source(src(device_state()))
        .build_declared()
        .unwrap();

    let device = declared.root("acme-device").unwrap();
    let system = device
        .children()
        .iter()
        .find(|c| *c.keyword() == Keyword::Container)
        .unwrap();

    // The uses marker survives with its raw prefixed argument, and no
    // grouping copies sit next to it.
    let uses = system.child(&Keyword::Uses).unwrap();
    assert_eq!(uses.argument().map(AsRef::as_ref), Some("lib:endpoint"));
    assert!(
        !system
            .children()
            .iter()
            .any(|c| *c.keyword() == Keyword::Leaf && c.argument().map(AsRef::as_ref) == Some("port")),
        "declared view never shows expanded copies"
    );

    // Submodule content stays under its own root in the declared view.
    assert!(declared.root("acme-device-state").is_some());
    assert!(
        !device
            .children()
            .iter()
            .any(|c| c.argument().map(AsRef::as_ref) == Some("state")),
        "declared view never merges submodules"
    );
}
