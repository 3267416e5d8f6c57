//! Type composition and identity resolution through the reactor.

use espalier_foundation::ErrorKind;
use espalier_reactor::Reactor;
use espalier_source::StatementEvent;

use crate::util::{leaf, module, qn, src};

// =============================================================================
// Typedef chains
// =============================================================================

#[test]
fn typedefs_resolve_regardless_of_declaration_order() {
    // "narrow" derives from "wide", which is declared after it.
    let source = module("acme-types", "at")
        .with(
            StatementEvent::new("typedef", "narrow")
                .with(StatementEvent::new("type", "wide").with(
                    StatementEvent::new("range", "10..20"),
                )),
        )
        .with(
            StatementEvent::new("typedef", "wide")
                .with(StatementEvent::new("type", "int32").with(
                    StatementEvent::new("range", "0..100"),
                )),
        )
        .with(leaf("value", "narrow"));

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap();

    let value = model
        .module("acme-types")
        .unwrap()
        .data_child(&qn("acme-types", "value"))
        .unwrap();
    let derived = value.leaf_type().unwrap();
    assert_eq!(derived.effective_ranges(), vec![(10, 20)]);
    assert_eq!(derived.chain_depth(), 2);
}

#[test]
fn bare_typedef_references_share_one_composed_type() {
    let source = module("acme-types", "at")
        .with(
            StatementEvent::new("typedef", "percent").with(
                StatementEvent::new("type", "uint8")
                    .with(StatementEvent::new("range", "0..100")),
            ),
        )
        .with(leaf("cpu", "percent"))
        .with(leaf("memory", "percent"));

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap();

    let root = model.module("acme-types").unwrap();
    let cpu = root.data_child(&qn("acme-types", "cpu")).unwrap();
    let memory = root.data_child(&qn("acme-types", "memory")).unwrap();
    // Both leaves reference the typedef's chain, they do not copy it.
    assert!(std::sync::Arc::ptr_eq(
        cpu.leaf_type().unwrap(),
        memory.leaf_type().unwrap()
    ));
    assert_eq!(cpu.leaf_type().unwrap().chain_depth(), 1);
}

#[test]
fn use_site_restriction_composes_on_top_of_the_typedef() {
    let source = module("acme-types", "at")
        .with(
            StatementEvent::new("typedef", "percent")
                .with(StatementEvent::new("type", "uint8").with(
                    StatementEvent::new("range", "0..100"),
                )),
        )
        .with(
            StatementEvent::new("leaf", "load").with(
                StatementEvent::new("type", "percent")
                    .with(StatementEvent::new("range", "50..max")),
            ),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap();

    let load = model
        .module("acme-types")
        .unwrap()
        .data_child(&qn("acme-types", "load"))
        .unwrap();
    assert_eq!(
        load.leaf_type().unwrap().effective_ranges(),
        vec![(50, 100)]
    );
}

#[test]
fn widening_through_a_typedef_is_a_constraint_violation() {
    let source = module("acme-types", "at")
        .with(
            StatementEvent::new("typedef", "percent")
                .with(StatementEvent::new("type", "uint8").with(
                    StatementEvent::new("range", "0..100"),
                )),
        )
        .with(
            StatementEvent::new("leaf", "load").with(
                StatementEvent::new("type", "percent")
                    .with(StatementEvent::new("range", "90..200")),
            ),
        );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Constraint(_))));
}

#[test]
fn circular_typedefs_report_circular() {
    let source = module("acme-loop", "lp")
        .with(StatementEvent::new("typedef", "a").with(StatementEvent::new("type", "b")))
        .with(StatementEvent::new("typedef", "b").with(StatementEvent::new("type", "a")));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Circular(_))));
}

#[test]
fn unknown_typedef_reports_cross_reference() {
    let source = module("acme-types", "at").with(leaf("x", "mystery"));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}

// =============================================================================
// Identities
// =============================================================================

#[test]
fn identityref_records_its_base_identity() {
    let lib = module("acme-crypto", "ac").with(StatementEvent::new("identity", "algorithm"));
    let site = module("acme-site", "as")
        .with(
            StatementEvent::new("import", "acme-crypto")
                .with(StatementEvent::new("prefix", "cr")),
        )
        .with(
            StatementEvent::new("identity", "aes")
                .with(StatementEvent::new("base", "cr:algorithm")),
        )
        .with(
            StatementEvent::new("leaf", "cipher").with(
                StatementEvent::new("type", "identityref")
                    .with(StatementEvent::new("base", "cr:algorithm")),
            ),
        );

    let model = Reactor::vanilla()
        .new_build()
        .add_source(src(lib))
        .add_source(src(site))
        .build_effective()
        .unwrap();

    let cipher = model
        .module("acme-site")
        .unwrap()
        .data_child(&qn("acme-site", "cipher"))
        .unwrap();
    assert_eq!(
        cipher.leaf_type().unwrap().base_identity(),
        Some(qn("acme-crypto", "algorithm"))
    );
}

#[test]
fn identity_cycle_reports_circular() {
    let source = module("acme-loop", "lp")
        .with(StatementEvent::new("identity", "a").with(StatementEvent::new("base", "b")))
        .with(StatementEvent::new("identity", "b").with(StatementEvent::new("base", "a")));

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::Circular(_))));
}

#[test]
fn identityref_to_missing_identity_reports_cross_reference() {
    let source = module("acme-site", "as").with(
        StatementEvent::new("leaf", "cipher").with(
            StatementEvent::new("type", "identityref")
                .with(StatementEvent::new("base", "ghost")),
        ),
    );

    let failure = Reactor::vanilla()
        .new_build()
        .add_source(src(source))
        .build_effective()
        .unwrap_err();
    assert!(failure.any(|k| matches!(k, ErrorKind::CrossReference(_))));
}
