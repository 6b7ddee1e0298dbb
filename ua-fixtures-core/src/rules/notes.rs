use super::{pdfua_document, FixtureContext, RuleFixture, Variant};
use crate::document::{StructElemSpec, StructTreeSpec};
use crate::error::Result;
use crate::graph::ObjectGraph;
use crate::objects::Object;
use crate::pdf_dict;

const TWO_NOTES_CONTENT: &[u8] = b"/Note << /MCID 0 >> BDC\n\
BT\n\
/F1 12 Tf\n\
72 720 Td\n\
(Note one) Tj\n\
ET\n\
EMC\n\
/Note << /MCID 1 >> BDC\n\
BT\n\
/F1 12 Tf\n\
72 700 Td\n\
(Note two) Tj\n\
ET\n\
EMC\n";

/// 7.9-2: every Note structure element needs an `/ID`.
///
/// Fail has one Note without `/ID`; pass gives it `note-1`.
pub struct NoteIdMissing;

impl RuleFixture for NoteIdMissing {
    fn rule_id(&self) -> &'static str {
        "7.9-2"
    }

    fn description(&self) -> &'static str {
        "Note_ID_missing"
    }

    fn output_dir(&self) -> &'static str {
        "notes_ua1_7_9_2"
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;

        let mut note = StructElemSpec::new("Note");
        if !variant.is_fail() {
            note = note.with_id("note-1");
        }
        builder.attach_structure_tree(&StructTreeSpec::new().element(note))?;

        builder.finish()
    }
}

/// 7.9-2: Note `/ID` values must be unique.
///
/// Two Notes each own one line of text. Fail gives both `note-1`; pass gives
/// the second `note-2`.
pub struct NoteIdDuplicate;

impl RuleFixture for NoteIdDuplicate {
    fn rule_id(&self) -> &'static str {
        "7.9-2"
    }

    fn description(&self) -> &'static str {
        "Note_ID_duplicate"
    }

    fn output_dir(&self) -> &'static str {
        "structure_ua1_7_9_2"
    }

    fn file_description(&self, variant: Variant) -> &'static str {
        match variant {
            Variant::Fail => "Note_ID_duplicate",
            Variant::Pass => "Note_ID_unique",
        }
    }

    fn build(&self, variant: Variant, _ctx: &FixtureContext) -> Result<ObjectGraph> {
        let mut builder = pdfua_document()?;

        let helvetica = builder.allocate(pdf_dict! {
            "Type" => Object::name("Font"),
            "Subtype" => Object::name("Type1"),
            "BaseFont" => Object::name("Helvetica"),
        })?;
        builder.add_font_resource("F1", helvetica)?;
        builder.set_page_content(TWO_NOTES_CONTENT)?;

        let second_id = if variant.is_fail() { "note-1" } else { "note-2" };
        builder.attach_structure_tree(
            &StructTreeSpec::new()
                .element(StructElemSpec::new("Note").with_id("note-1").with_mcid(0))
                .element(StructElemSpec::new("Note").with_id(second_id).with_mcid(1))
                .with_parent_tree(),
        )?;
        builder.mark_tagged("en-US")?;

        builder.finish()
    }
}
