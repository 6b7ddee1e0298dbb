use super::{pdfua_document, FixtureContext, RuleFixture, Variant};
use crate::document::{OcConfigSpec, OptionalContentSpec};
use crate::error::Result;
use crate::graph::ObjectGraph;

/// 7.10-1: every optional-content configuration needs a `/Name`, the
/// default one included.
///
/// Fail leaves the default configuration unnamed while its sibling carries a
/// name; pass names the default `OCConfig-1`.
pub struct OcConfigNameMissing;

impl RuleFixture for OcConfigNameMissing {
    fn rule_id(&self) -> &'static str {
        "7.10-1"
    }

    fn description(&self) -> &'static str {
        "OCProperties_Config_Name_missing_default"
    }

    fn output_dir(&self) -> &'static str {
        "ocproperties_ua1_7_10_1_default"
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;
        builder.set_page_content(Vec::new())?;

        let default = if variant.is_fail() {
            OcConfigSpec::unnamed()
        } else {
            OcConfigSpec::named("OCConfig-1")
        };
        builder.attach_optional_content(&OptionalContentSpec {
            groups: vec!["Layer 1".to_string()],
            configs: vec![default, OcConfigSpec::named("OCConfig-2")],
            default_config: 0,
        })?;

        builder.finish()
    }
}
