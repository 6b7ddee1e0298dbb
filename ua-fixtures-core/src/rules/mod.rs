//! Fixture strategies, one per PDF/UA-1 clause.
//!
//! Every strategy builds its fail and pass documents through the same code
//! path, with the variant toggling only the nodes the clause is about.
//! Everything else (object order, page geometry, metadata) is shared, so a
//! checker that rejects the fail file and accepts the pass file can only be
//! reacting to the targeted defect.

mod cid_font;
mod notes;
mod optional_content;
mod printer_mark;
mod role_map;

pub use cid_font::{CmapRegistryMismatch, RegistryMismatch, TaggedRegistryMismatch};
pub use notes::{NoteIdDuplicate, NoteIdMissing};
pub use optional_content::OcConfigNameMissing;
pub use printer_mark::{PrinterMarkInStructure, PrinterMarkNotArtifact};
pub use role_map::CircularRoleMapping;

use crate::document::{DocumentBuilder, PDFUA1_XMP};
use crate::error::Result;
use crate::fonts::{FontSource, SystemFontSource};
use crate::graph::ObjectGraph;
use serde::Serialize;
use std::fmt;

/// Which half of a fixture pair to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Carries the defect; a conformant checker must reject it.
    Fail,
    /// Carries the minimal fix; a conformant checker must accept it.
    Pass,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Fail, Variant::Pass];

    pub fn is_fail(self) -> bool {
        self == Variant::Fail
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Fail => write!(f, "fail"),
            Variant::Pass => write!(f, "pass"),
        }
    }
}

/// Inputs shared by every strategy invocation.
pub struct FixtureContext {
    fonts: Box<dyn FontSource + Send + Sync>,
}

impl FixtureContext {
    pub fn new(fonts: impl FontSource + Send + Sync + 'static) -> Self {
        Self {
            fonts: Box::new(fonts),
        }
    }

    pub fn fonts(&self) -> &dyn FontSource {
        self.fonts.as_ref()
    }
}

impl Default for FixtureContext {
    fn default() -> Self {
        Self::new(SystemFontSource::new())
    }
}

pub trait RuleFixture {
    /// The PDF/UA-1 clause, e.g. `7.21.3-1`.
    fn rule_id(&self) -> &'static str;

    /// Summary of the defect, as used in file names.
    fn description(&self) -> &'static str;

    /// Directory, relative to the output root, holding the pair.
    fn output_dir(&self) -> &'static str;

    /// Description used for a given variant's file name. Most pairs share one.
    fn file_description(&self, _variant: Variant) -> &'static str {
        self.description()
    }

    fn file_name(&self, variant: Variant) -> String {
        format!(
            "mh_ua1-{}_{}__{}.pdf",
            self.rule_id(),
            variant,
            self.file_description(variant)
        )
    }

    /// Whether `selector` names this fixture, by clause or directory.
    fn matches(&self, selector: &str) -> bool {
        selector == self.rule_id() || selector == self.output_dir()
    }

    fn build(&self, variant: Variant, ctx: &FixtureContext) -> Result<ObjectGraph>;
}

/// Every registered strategy, in a stable order.
pub fn all_rules() -> Vec<Box<dyn RuleFixture>> {
    vec![
        Box::new(OcConfigNameMissing),
        Box::new(PrinterMarkInStructure),
        Box::new(PrinterMarkNotArtifact),
        Box::new(CircularRoleMapping),
        Box::new(RegistryMismatch),
        Box::new(CmapRegistryMismatch),
        Box::new(TaggedRegistryMismatch),
        Box::new(NoteIdMissing),
        Box::new(NoteIdDuplicate),
    ]
}

/// Strategies named by any of `selectors`; all of them when empty.
pub fn select_rules(selectors: &[String]) -> Vec<Box<dyn RuleFixture>> {
    all_rules()
        .into_iter()
        .filter(|rule| selectors.is_empty() || selectors.iter().any(|s| rule.matches(s)))
        .collect()
}

/// A blank page plus the XMP packet declaring PDF/UA-1, which every fixture
/// needs for checkers to apply the PDF/UA rule set at all.
fn pdfua_document() -> Result<DocumentBuilder> {
    let mut builder = DocumentBuilder::new()?;
    builder.attach_metadata(PDFUA1_XMP)?;
    Ok(builder)
}
