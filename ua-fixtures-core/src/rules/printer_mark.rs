use super::{pdfua_document, FixtureContext, RuleFixture, Variant};
use crate::document::{AnnotationSpec, StructElemSpec, StructTreeSpec};
use crate::error::Result;
use crate::graph::ObjectGraph;

/// 7.18.8-1: PrinterMark annotations must stay out of the structure tree.
///
/// Both variants are tagged and carry a `P` element and a parent tree. In
/// the fail variant the element owns the annotation through an `/OBJR` and
/// the annotation gets `/StructParent 0`; in the pass variant the element is
/// empty and so is the parent tree.
pub struct PrinterMarkInStructure;

impl RuleFixture for PrinterMarkInStructure {
    fn rule_id(&self) -> &'static str {
        "7.18.8-1"
    }

    fn description(&self) -> &'static str {
        "PrinterMark_in_structure"
    }

    fn output_dir(&self) -> &'static str {
        "printermark_ua1_7_18_8_1"
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;
        let annotation = builder.attach_annotation(&AnnotationSpec::printer_mark(false))?;

        let mut paragraph = StructElemSpec::new("P");
        if variant.is_fail() {
            paragraph = paragraph.with_annotation(annotation);
        }
        builder.attach_structure_tree(
            &StructTreeSpec::new().element(paragraph).with_parent_tree(),
        )?;
        builder.mark_tagged("en-US")?;

        builder.finish()
    }
}

/// 7.18.8-2: a PrinterMark appearance must be marked as an artifact.
///
/// Fail draws the appearance bare; pass wraps it in `/Artifact BMC ... EMC`.
pub struct PrinterMarkNotArtifact;

impl RuleFixture for PrinterMarkNotArtifact {
    fn rule_id(&self) -> &'static str {
        "7.18.8-2"
    }

    fn description(&self) -> &'static str {
        "PrinterMark_AP_not_Artifact"
    }

    fn output_dir(&self) -> &'static str {
        "printermark_ua1_7_18_8_2"
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;
        builder.attach_annotation(&AnnotationSpec::printer_mark(!variant.is_fail()))?;
        builder.finish()
    }
}
