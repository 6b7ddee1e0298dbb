//! Fixture pair integration tests
//!
//! Every registered strategy is built in both variants and checked for the
//! properties a checker test-suite relies on: the pair differs only at the
//! targeted nodes, output is byte-for-byte reproducible, nothing allocated is
//! orphaned, and the written file reads back into the same graph.

use pretty_assertions::assert_eq;
use ua_fixtures::fonts::StaticFontSource;
use ua_fixtures::rules::{all_rules, FixtureContext, RuleFixture, Variant};
use ua_fixtures::writer::{to_bytes, WriterConfig};
use ua_fixtures::{diff_graphs, parse, DifferenceKind, ObjectGraph};

fn context() -> FixtureContext {
    FixtureContext::new(StaticFontSource::synthetic())
}

fn build(rule: &dyn RuleFixture, variant: Variant) -> ObjectGraph {
    rule.build(variant, &context())
        .unwrap_or_else(|e| panic!("{} {variant} failed: {e}", rule.output_dir()))
}

/// Paths under which fail and pass may differ, per output directory.
fn targeted_paths(output_dir: &str) -> &'static [&'static str] {
    match output_dir {
        "ocproperties_ua1_7_10_1_default" => &["/Root/OCProperties"],
        "printermark_ua1_7_18_8_1" => &[
            "/Root/Pages/Kids[0]/Annots[0]/StructParent",
            "/Root/StructTreeRoot/K[0]/K",
            "/Root/StructTreeRoot/ParentTree/Nums",
        ],
        "printermark_ua1_7_18_8_2" => &["/Root/Pages/Kids[0]/Annots[0]/AP/N"],
        "structure_ua1_7_1_3" => &["/Root/StructTreeRoot/RoleMap"],
        "fonts_ua1_7_21_3_1" | "font_ua1_7_21_3_1" | "structure_ua1_7_21_3" => {
            &["/Root/Pages/Kids[0]/Resources/Font/F1/CIDSystemInfo/Registry"]
        }
        "notes_ua1_7_9_2" => &["/Root/StructTreeRoot/K[0]/ID"],
        "structure_ua1_7_9_2" => &["/Root/StructTreeRoot/K[1]/ID"],
        other => panic!("no targeted paths registered for {other}"),
    }
}

#[test]
fn test_pairs_differ_only_at_targeted_nodes() {
    for rule in all_rules() {
        let fail = build(rule.as_ref(), Variant::Fail);
        let pass = build(rule.as_ref(), Variant::Pass);
        let allowed = targeted_paths(rule.output_dir());

        let differences = diff_graphs(&fail, &pass);
        assert!(
            !differences.is_empty(),
            "{}: fail and pass are identical",
            rule.output_dir()
        );
        for difference in &differences {
            assert!(
                allowed.iter().any(|prefix| difference.is_under(prefix)),
                "{}: unexpected difference {difference}",
                rule.output_dir()
            );
        }
    }
}

#[test]
fn test_output_is_deterministic() {
    for rule in all_rules() {
        for variant in Variant::ALL {
            let first = to_bytes(&build(rule.as_ref(), variant), WriterConfig::default()).unwrap();
            let second = to_bytes(&build(rule.as_ref(), variant), WriterConfig::default()).unwrap();
            assert!(
                first == second,
                "{} {variant}: output differs between runs",
                rule.output_dir()
            );
        }
    }
}

#[test]
fn test_no_unreachable_objects() {
    for rule in all_rules() {
        for variant in Variant::ALL {
            let graph = build(rule.as_ref(), variant);
            let orphans = graph.unreachable();
            assert!(
                orphans.is_empty(),
                "{} {variant}: unreachable {orphans:?}",
                rule.output_dir()
            );
        }
    }
}

#[test]
fn test_fixtures_round_trip_through_reader() {
    for rule in all_rules() {
        for variant in Variant::ALL {
            let graph = build(rule.as_ref(), variant);
            let bytes = to_bytes(&graph, WriterConfig::default()).unwrap();
            let parsed = parse(&bytes).unwrap();

            assert_eq!(parsed.graph.root(), graph.root());
            assert_eq!(parsed.graph.len(), graph.len());
            for (id, object) in graph.iter() {
                assert_eq!(
                    parsed.graph.resolve(id).unwrap(),
                    object,
                    "{} {variant}: object {id}",
                    rule.output_dir()
                );
            }
            assert!(diff_graphs(&graph, &parsed.graph).is_empty());

            // Re-serializing the parsed graph reproduces the file exactly.
            assert!(to_bytes(&parsed.graph, WriterConfig::default()).unwrap() == bytes);
        }
    }
}

#[test]
fn test_oc_config_name_is_the_only_change() {
    let rule = all_rules()
        .into_iter()
        .find(|r| r.output_dir() == "ocproperties_ua1_7_10_1_default")
        .unwrap();
    let differences = diff_graphs(
        &build(rule.as_ref(), Variant::Fail),
        &build(rule.as_ref(), Variant::Pass),
    );

    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].kind, DifferenceKind::OnlyInRight);
    assert!(differences[0].path.ends_with("/Name"));
    assert_eq!(differences[0].right.as_deref(), Some("(OCConfig-1)"));
}

#[test]
fn test_registry_mismatch_is_the_only_change() {
    for dir in ["fonts_ua1_7_21_3_1", "structure_ua1_7_21_3"] {
        let rule = all_rules()
            .into_iter()
            .find(|r| r.output_dir() == dir)
            .unwrap();
        let differences = diff_graphs(
            &build(rule.as_ref(), Variant::Fail),
            &build(rule.as_ref(), Variant::Pass),
        );

        assert_eq!(differences.len(), 1, "{dir}");
        assert_eq!(differences[0].kind, DifferenceKind::ValueMismatch);
        assert_eq!(differences[0].left.as_deref(), Some("(RegistryA)"));
        assert_eq!(differences[0].right.as_deref(), Some("(RegistryB)"));
    }
}
