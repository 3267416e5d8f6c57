//! Augment insertion and deviation edits.

use espalier_foundation::ErrorKind;
use espalier_reactor::Reactor;
use espalier_source::StatementEvent;
use espalier_vocab::Keyword;

use crate::util::{leaf, module, qn, src};

fn base_module() -> StatementEvent {
    module("acme-base", "ab").with(
        StatementEvent::new("container", "device").with(leaf("name", "string")),
    )
}

fn import_base(event: StatementEvent) -> StatementEvent {
    event.with(StatementEvent::new("import", "acme-base").with(StatementEvent::new("prefix", "b")))
}

// =============================================================================
// Augments
// =============================================================================

#[test]
fn augment_inserts_under_the_target_with_its_own_namespace() {
    let ext = import_base(module("acme-ext", "ae")).with(
        StatementEvent::new("augment", "/b:device").with(leaf("location", "string")),
    );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .build_effective()
        .unwrap();

    let device = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap();
    // The inserted leaf keeps the augmenting module's identity.
    let location = device.data_child(&qn("acme-ext", "location")).unwrap();
    assert_eq!(location.path().last(), Some(&qn("acme-ext", "location")));
    assert!(device.data_child(&qn("acme-base", "location")).is_none());
}

#[test]
fn when_guard_lands_on_every_inserted_child() {
    let ext = import_base(module("acme-ext", "ae")).with(
        StatementEvent::new("augment", "/b:device")
            .with(StatementEvent::new("when", "../name = 'gateway'"))
            .with(leaf("uplink", "string"))
            .with(leaf("downlink", "string")),
    );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .build_effective()
        .unwrap();

    let device = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap();
    for name in ["uplink", "downlink"] {
        let inserted = device.data_child(&qn("acme-ext", name)).unwrap();
        assert!(
            inserted.child_by_keyword(&Keyword::When).is_some(),
            "guard missing on {name}"
        );
    }
}

#[test]
fn augments_chain_into_other_augments_content() {
    // Second augment targets a container the first one inserts.
    let ext = import_base(module("acme-ext", "ae"))
        .with(
            StatementEvent::new("augment", "/b:device")
                .with(StatementEvent::new("container", "slot")),
        )
        .with(
            StatementEvent::new("augment", "/b:device/slot").with(leaf("index", "uint8")),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .build_effective()
        .unwrap();

    let slot = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap()
        .data_child(&qn("acme-ext", "slot"))
        .unwrap();
    assert!(slot.data_child(&qn("acme-ext", "index")).is_some());
}

#[test]
fn colliding_augment_insertions_are_duplicates() {
    let ext = import_base(module("acme-ext", "ae"))
        .with(
            StatementEvent::new("augment", "/b:device").with(leaf("serial", "string")),
        )
        .with(
            StatementEvent::new("augment", "/b:device").with(leaf("serial", "string")),
        );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Duplicate(_))));
}

#[test]
fn augment_target_that_never_exists_reports_cross_reference() {
    let ext = import_base(module("acme-ext", "ae")).with(
        StatementEvent::new("augment", "/b:phantom").with(leaf("x", "string")),
    );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}

// =============================================================================
// Deviations
// =============================================================================

#[test]
fn deviate_replace_then_delete_applies_in_declared_order() {
    let base = module("acme-base", "ab").with(
        StatementEvent::new("container", "device").with(
            StatementEvent::new("leaf", "speed")
                .with(StatementEvent::new("type", "uint32"))
                .with(StatementEvent::new("default", "100")),
        ),
    );
    let dev = import_base(module("acme-dev", "ad")).with(
        StatementEvent::new("deviation", "/b:device/b:speed")
            .with(
                StatementEvent::new("deviate", "replace").with(
                    StatementEvent::new("type", "uint8"),
                ),
            )
            .with(
                StatementEvent::new("deviate", "delete")
                    .with(StatementEvent::new("default", "100")),
            ),
    );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base))
        .add_source(src(dev))
        .build_effective()
        .unwrap();

    let speed = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap()
        .data_child(&qn("acme-base", "speed"))
        .unwrap();
    assert_eq!(
        speed.leaf_type().unwrap().effective_ranges(),
        vec![(0, 255)],
        "replaced type is in effect"
    );
    assert!(speed.child_by_keyword(&Keyword::Default).is_none());
}

#[test]
fn deviate_delete_of_an_absent_value_is_a_constraint_violation() {
    let base = module("acme-base", "ab").with(
        StatementEvent::new("container", "device").with(leaf("speed", "uint32")),
    );
    let dev = import_base(module("acme-dev", "ad")).with(
        StatementEvent::new("deviation", "/b:device/b:speed").with(
            StatementEvent::new("deviate", "delete")
                .with(StatementEvent::new("default", "100")),
        ),
    );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(base))
        .add_source(src(dev))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Constraint(_))));
}

#[test]
fn deviate_not_supported_withdraws_the_subtree() {
    let base = module("acme-base", "ab").with(
        StatementEvent::new("container", "device")
            .with(leaf("name", "string"))
            .with(
                StatementEvent::new("container", "diagnostics")
                    .with(leaf("dump", "string")),
            ),
    );
    let dev = import_base(module("acme-dev", "ad")).with(
        StatementEvent::new("deviation", "/b:device/b:diagnostics")
            .with(StatementEvent::new("deviate", "not-supported")),
    );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base))
        .add_source(src(dev))
        .build_effective()
        .unwrap();

    let device = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap();
    assert!(device.data_child(&qn("acme-base", "name")).is_some());
    assert!(
        device.data_child(&qn("acme-base", "diagnostics")).is_none(),
        "withdrawn subtree never materializes"
    );
}

#[test]
fn editing_a_withdrawn_node_is_a_constraint_violation() {
    let base = module("acme-base", "ab").with(
        StatementEvent::new("container", "device").with(leaf("speed", "uint32")),
    );
    // Both deviations target the same node; withdrawal applies first by
    // declaration order, so the later edit hits a withdrawn node.
    let dev = import_base(module("acme-dev", "ad"))
        .with(
            StatementEvent::new("deviation", "/b:device/b:speed")
                .with(StatementEvent::new("deviate", "not-supported")),
        )
        .with(
            StatementEvent::new("deviation", "/b:device/b:speed").with(
                StatementEvent::new("deviate", "add")
                    .with(StatementEvent::new("default", "10")),
            ),
        );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(base))
        .add_source(src(dev))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Constraint(_))));
}

#[test]
fn deviations_wait_for_every_augment_to_settle() {
    // The deviation targets a leaf that only an augment inserts; it must
    // still find it.
    let ext = import_base(module("acme-ext", "ae")).with(
        StatementEvent::new("augment", "/b:device").with(
            StatementEvent::new("leaf", "mtu")
                .with(StatementEvent::new("type", "uint16"))
                .with(StatementEvent::new("default", "1500")),
        ),
    );
    let dev = import_base(
        module("acme-dev", "ad").with(
            StatementEvent::new("import", "acme-ext")
                .with(StatementEvent::new("prefix", "e")),
        ),
    )
    .with(
        StatementEvent::new("deviation", "/b:device/e:mtu").with(
            StatementEvent::new("deviate", "delete")
                .with(StatementEvent::new("default", "1500")),
        ),
    );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(base_module()))
        .add_source(src(ext))
        .add_source(src(dev))
        .build_effective()
        .unwrap();

    let mtu = model
        .module("acme-base")
        .unwrap()
        .data_child(&qn("acme-base", "device"))
        .unwrap()
        .data_child(&qn("acme-ext", "mtu"))
        .unwrap();
    assert!(mtu.child_by_keyword(&Keyword::Default).is_none());
}
