//! # ua-fixtures
//!
//! Builds paired PDF documents, a **fail** variant and a **pass** variant, that
//! each exercise exactly one clause of PDF/UA-1. A conformance checker under
//! test must reject the fail file and accept the pass file; the two differ only
//! in the nodes the clause is about.
//!
//! ## Features
//!
//! - **Object graph**: an arena of indirect objects with stable numbering, in
//!   which cycles (structure element ↔ parent) are plain references
//! - **Document assembly**: catalog, page tree, metadata, structure tree,
//!   optional content, annotations and embedded composite fonts
//! - **Deterministic output**: identical graphs serialize to identical bytes,
//!   `/ID` included
//! - **Round-trip reading**: files the writer produces parse back into an
//!   equal graph
//! - **Structural diff**: lock-step comparison of two graphs by key path
//!
//! ## Quick Start
//!
//! ```rust
//! use ua_fixtures::rules::{CircularRoleMapping, FixtureContext, RuleFixture, Variant};
//! use ua_fixtures::writer::{to_bytes, WriterConfig};
//!
//! # fn main() -> ua_fixtures::Result<()> {
//! let ctx = FixtureContext::default();
//! let graph = CircularRoleMapping.build(Variant::Fail, &ctx)?;
//!
//! let bytes = to_bytes(&graph, WriterConfig::default())?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! # Ok(())
//! # }
//! ```

pub mod diff;
pub mod document;
pub mod error;
pub mod fixtures;
pub mod fonts;
pub mod graph;
pub mod objects;
pub mod persist;
pub mod reader;
pub mod rules;
pub mod writer;

pub use diff::{diff_graphs, DifferenceKind, GraphDifference};
pub use document::DocumentBuilder;
pub use error::{PdfError, Result};
pub use fixtures::{generate_all, generate_pair, GenerationReport};
pub use graph::ObjectGraph;
pub use objects::{Dictionary, Object, ObjectId, PdfString, Stream, StringFormat};
pub use reader::{parse, ParsedDocument};
pub use rules::{all_rules, FixtureContext, RuleFixture, Variant};
pub use writer::{IdPolicy, PdfWriter, WriterConfig};

/// Current version of ua-fixtures
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
