use super::{pdfua_document, FixtureContext, RuleFixture, Variant};
use crate::document::StructTreeSpec;
use crate::error::Result;
use crate::graph::ObjectGraph;

/// 7.1-3: the role map must not contain circular mappings.
///
/// Fail maps `H1 → Div` and `Div → H1`; pass keeps only `H1 → Div`.
pub struct CircularRoleMapping;

impl RuleFixture for CircularRoleMapping {
    fn rule_id(&self) -> &'static str {
        "7.1-3"
    }

    fn description(&self) -> &'static str {
        "A_circular_mapping_exists"
    }

    fn output_dir(&self) -> &'static str {
        "structure_ua1_7_1_3"
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;
        builder.set_page_content(Vec::new())?;

        let mut tree = StructTreeSpec::new().role("H1", "Div");
        if variant.is_fail() {
            tree = tree.role("Div", "H1");
        }
        builder.attach_structure_tree(&tree)?;

        builder.finish()
    }
}
