//! Minimal tagged-PDF document shell.
//!
//! [`DocumentBuilder::new`] allocates the catalog, a one-entry page tree and a
//! single US-Letter page. Rule strategies then attach the subsystems they
//! need (metadata, structure tree, optional content, annotation, composite
//! font) and call [`DocumentBuilder::finish`] to obtain the finished graph.

mod annotation;
mod font;
mod optional_content;
mod structure;

pub use annotation::AnnotationSpec;
pub use font::{CidFontSpec, CidSystemInfo, CompositeFont};
pub use optional_content::{OcConfigSpec, OptionalContent, OptionalContentSpec};
pub use structure::{StructContent, StructElemSpec, StructTreeSpec, StructureTree};

use crate::error::{PdfError, Result};
use crate::graph::ObjectGraph;
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::pdf_dict;
use tracing::debug;

/// US Letter, in points.
pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;

/// XMP packet declaring PDF/UA part 1. Checkers select the PDF/UA rule set
/// from this declaration, so it is embedded byte-for-byte.
pub const PDFUA1_XMP: &[u8] = b"<?xpacket begin=\" \" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n\
<x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n \
<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n  \
<rdf:Description rdf:about=\"\"\n    \
xmlns:pdfuaid=\"http://www.aiim.org/pdfua/ns/id/\">\n   \
<pdfuaid:part>1</pdfuaid:part>\n  \
</rdf:Description>\n \
</rdf:RDF>\n\
</x:xmpmeta>\n\
<?xpacket end=\"w\"?>\n";

/// Subsystems that may be attached at most once per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subsystem {
    PageContent,
    Metadata,
    StructureTree,
    OptionalContent,
    Annotation,
    CidFont,
}

pub struct DocumentBuilder {
    graph: ObjectGraph,
    catalog: ObjectId,
    pages: ObjectId,
    page: ObjectId,
    attached: Vec<Subsystem>,
}

impl DocumentBuilder {
    /// Starts a document with a catalog, a page tree and one blank page.
    pub fn new() -> Result<Self> {
        let mut graph = ObjectGraph::new();

        let catalog = graph.allocate(pdf_dict! { "Type" => Object::name("Catalog") })?;
        let pages = graph.allocate(pdf_dict! { "Type" => Object::name("Pages") })?;
        let page = graph.allocate(pdf_dict! {
            "Type" => Object::name("Page"),
            "Parent" => pages,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
            "Resources" => Dictionary::new(),
        })?;

        let pages_dict = graph.dictionary_mut(pages)?;
        pages_dict.set("Kids", vec![Object::Reference(page)]);
        pages_dict.set("Count", 1);
        graph.dictionary_mut(catalog)?.set("Pages", pages);
        graph.set_root(catalog);

        Ok(Self {
            graph,
            catalog,
            pages,
            page,
            attached: Vec::new(),
        })
    }

    pub fn catalog(&self) -> ObjectId {
        self.catalog
    }

    pub fn pages(&self) -> ObjectId {
        self.pages
    }

    pub fn page(&self) -> ObjectId {
        self.page
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    fn claim(&mut self, subsystem: Subsystem) -> Result<()> {
        if self.attached.contains(&subsystem) {
            return Err(PdfError::InvalidStructure(format!(
                "{subsystem:?} attached twice"
            )));
        }
        self.attached.push(subsystem);
        Ok(())
    }

    fn catalog_mut(&mut self) -> Result<&mut Dictionary> {
        self.graph.dictionary_mut(self.catalog)
    }

    fn page_mut(&mut self) -> Result<&mut Dictionary> {
        self.graph.dictionary_mut(self.page)
    }

    /// Gives the page a content stream.
    pub fn set_page_content(&mut self, content: impl Into<Vec<u8>>) -> Result<ObjectId> {
        self.claim(Subsystem::PageContent)?;
        let contents = self.graph.allocate(Stream::new(content.into()))?;
        self.page_mut()?.set("Contents", contents);
        Ok(contents)
    }

    /// Sets a page-level entry such as `/Tabs` or `/StructParents`.
    pub fn set_page_entry(&mut self, key: &str, value: impl Into<Object>) -> Result<()> {
        self.page_mut()?.set(key, value);
        Ok(())
    }

    /// Registers `font` under `/Resources /Font /<name>` on the page.
    pub fn add_font_resource(&mut self, name: &str, font: ObjectId) -> Result<()> {
        let font = self.graph.reference(font)?;
        let page = self.page;
        let resources = self
            .page_mut()?
            .get_dict_mut("Resources")
            .ok_or(PdfError::NotADictionary(page))?;
        if resources.get_dict("Font").is_none() {
            resources.set("Font", Dictionary::new());
        }
        if let Some(fonts) = resources.get_dict_mut("Font") {
            fonts.set(name, font);
        }
        Ok(())
    }

    /// Attaches an XMP metadata stream as the catalog's `/Metadata`.
    pub fn attach_metadata(&mut self, payload: &[u8]) -> Result<ObjectId> {
        self.claim(Subsystem::Metadata)?;
        let stream = Stream::with_dictionary(
            pdf_dict! {
                "Type" => Object::name("Metadata"),
                "Subtype" => Object::name("XML"),
            },
            payload.to_vec(),
        );
        let metadata = self.graph.allocate(stream)?;
        self.catalog_mut()?.set("Metadata", metadata);
        debug!(object = %metadata, bytes = payload.len(), "attached metadata");
        Ok(metadata)
    }

    /// Declares the document tagged and sets its natural language.
    pub fn mark_tagged(&mut self, lang: &str) -> Result<()> {
        let catalog = self.catalog_mut()?;
        catalog.set("MarkInfo", pdf_dict! { "Marked" => true });
        catalog.set("Lang", lang);
        Ok(())
    }

    pub fn set_display_doc_title(&mut self, display: bool) -> Result<()> {
        self.catalog_mut()?.set(
            "ViewerPreferences",
            pdf_dict! { "DisplayDocTitle" => display },
        );
        Ok(())
    }

    /// Allocates an extra object for strategies that need one outside the
    /// attached subsystems. The caller must link it into the document.
    pub fn allocate(&mut self, object: impl Into<Object>) -> Result<ObjectId> {
        self.graph.allocate(object)
    }

    /// Lets the finished document reference `id` without an object behind
    /// it, for fixtures whose defect is the dangling reference itself.
    pub fn permit_dangling(&mut self, id: ObjectId) {
        self.graph.permit_dangling(id);
    }

    /// Validates references and hands over the graph.
    pub fn finish(self) -> Result<ObjectGraph> {
        self.graph.check_integrity()?;
        debug!(objects = self.graph.len(), "document assembled");
        Ok(self.graph)
    }
}
