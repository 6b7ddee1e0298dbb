use super::{pdfua_document, FixtureContext, RuleFixture, Variant};
use crate::document::{CidFontSpec, CidSystemInfo, StructElemSpec, StructTreeSpec};
use crate::error::Result;
use crate::graph::ObjectGraph;

const TAGGED_CONTENT: &[u8] = b"/P << /MCID 0 >> BDC\nBT\n/F1 12 Tf\n72 720 Td\n<41> Tj\nET\nEMC\n";

fn registry_spec(outer_registry: &str, flags: i64) -> CidFontSpec {
    CidFontSpec {
        base_font: "TestFont".to_string(),
        flags,
        outer: CidSystemInfo::new(outer_registry, "TestOrdering", 0),
        descendant: CidSystemInfo::new("RegistryB", "TestOrdering", 0),
        cmap: None,
        to_unicode: false,
        resource_name: "F1".to_string(),
    }
}

/// The outer registry under test: `RegistryA` disagrees with the
/// descendant's `RegistryB`.
fn outer_registry(variant: Variant) -> &'static str {
    if variant.is_fail() {
        "RegistryA"
    } else {
        "RegistryB"
    }
}

/// 7.21.3-1: a Type0 font's CIDSystemInfo must agree with its descendant.
///
/// Fail gives the Type0 font `RegistryA` over a `RegistryB` descendant;
/// pass uses `RegistryB` on both. Ordering and Supplement always agree.
pub struct RegistryMismatch;

impl RuleFixture for RegistryMismatch {
    fn rule_id(&self) -> &'static str {
        "7.21.3-1"
    }

    fn description(&self) -> &'static str {
        "CIDSystemInfo_Registry_mismatch"
    }

    fn output_dir(&self) -> &'static str {
        "fonts_ua1_7_21_3_1"
    }

    fn build(&self, variant: Variant, ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;
        builder.attach_cid_font(&registry_spec(outer_registry(variant), 4), ctx.fonts())?;
        builder.set_page_content(Vec::new())?;
        builder.finish()
    }
}

/// 7.21.3-1 with a non-Identity encoding CMap that declares its own
/// CIDSystemInfo.
///
/// The CMap and the descendant both say `Test/Custom`; fail gives the Type0
/// font `Adobe/Custom`, pass `Test/Custom`.
pub struct CmapRegistryMismatch;

impl RuleFixture for CmapRegistryMismatch {
    fn rule_id(&self) -> &'static str {
        "7.21.3-1"
    }

    fn description(&self) -> &'static str {
        "CIDSystemInfo_CMap_Registry_mismatch"
    }

    fn output_dir(&self) -> &'static str {
        "font_ua1_7_21_3_1"
    }

    fn build(&self, variant: Variant, ctx: &FixtureContext) -> Result<ObjectGraph> {
        let custom = CidSystemInfo::new("Test", "Custom", 0);
        let outer = if variant.is_fail() {
            CidSystemInfo::new("Adobe", "Custom", 0)
        } else {
            custom.clone()
        };
        let spec = CidFontSpec {
            base_font: "DejaVuSans".to_string(),
            flags: 4,
            outer,
            descendant: custom.clone(),
            cmap: Some(custom),
            to_unicode: false,
            resource_name: "F1".to_string(),
        };

        let mut builder = pdfua_document()?;
        builder.attach_cid_font(&spec, ctx.fonts())?;
        builder.set_page_content(Vec::new())?;
        builder.finish()
    }
}

/// 7.21.3-1 inside a fully tagged document that actually shows a glyph of
/// the font, so checkers that only inspect used fonts still see it.
pub struct TaggedRegistryMismatch;

impl RuleFixture for TaggedRegistryMismatch {
    fn rule_id(&self) -> &'static str {
        "7.21.3-1"
    }

    fn description(&self) -> &'static str {
        "CIDSystemInfo_tagged_Registry_mismatch"
    }

    fn output_dir(&self) -> &'static str {
        "structure_ua1_7_21_3"
    }

    fn build(&self, variant: Variant, ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut spec = registry_spec(outer_registry(variant), 32);
        spec.to_unicode = true;

        let mut builder = pdfua_document()?;
        builder.attach_cid_font(&spec, ctx.fonts())?;
        builder.set_page_content(TAGGED_CONTENT)?;
        builder.attach_structure_tree(
            &StructTreeSpec::new()
                .element(StructElemSpec::new("P").with_mcid(0))
                .with_parent_tree(),
        )?;
        builder.mark_tagged("en-US")?;
        builder.set_display_doc_title(true)?;
        builder.finish()
    }
}
