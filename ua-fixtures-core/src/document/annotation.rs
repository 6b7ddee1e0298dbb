use super::{DocumentBuilder, Subsystem};
use crate::error::Result;
use crate::objects::{Dictionary, Object, ObjectId, Stream};
use crate::pdf_dict;
use tracing::debug;

/// An annotation with a Form XObject normal appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpec {
    pub subtype: String,
    pub rect: [i64; 4],
    /// Appearance stream content, before any artifact wrapping.
    pub appearance: Vec<u8>,
    /// Wrap the appearance in `/Artifact BMC ... EMC`.
    pub artifact: bool,
    pub bbox: [i64; 4],
}

impl AnnotationSpec {
    /// A PrinterMark annotation drawing one filled blue rectangle.
    pub fn printer_mark(artifact: bool) -> Self {
        Self {
            subtype: "PrinterMark".to_string(),
            rect: [50, 50, 150, 120],
            appearance: b"0 0 1 rg\n10 10 60 40 re\nf\n".to_vec(),
            artifact,
            bbox: [0, 0, 100, 100],
        }
    }

    /// The appearance stream bytes as written.
    pub fn appearance_content(&self) -> Vec<u8> {
        if !self.artifact {
            return self.appearance.clone();
        }
        let mut content = b"/Artifact BMC\n".to_vec();
        content.extend_from_slice(&self.appearance);
        content.extend_from_slice(b"EMC\n");
        content
    }
}

fn rectangle(values: [i64; 4]) -> Object {
    Object::Array(values.iter().copied().map(Object::Integer).collect())
}

impl DocumentBuilder {
    /// Allocates the appearance XObject and the annotation, appends the
    /// annotation to the page's `/Annots` and sets `/Tabs /S`.
    pub fn attach_annotation(&mut self, spec: &AnnotationSpec) -> Result<ObjectId> {
        self.claim(Subsystem::Annotation)?;

        let appearance = Stream::with_dictionary(
            pdf_dict! {
                "Type" => Object::name("XObject"),
                "Subtype" => Object::name("Form"),
                "BBox" => rectangle(spec.bbox),
                "Resources" => Dictionary::new(),
            },
            spec.appearance_content(),
        );
        let appearance = self.graph.allocate(appearance)?;

        let annotation = self.graph.allocate(pdf_dict! {
            "Type" => Object::name("Annot"),
            "Subtype" => Object::name(spec.subtype.as_str()),
            "Rect" => rectangle(spec.rect),
            "AP" => pdf_dict! { "N" => appearance },
        })?;

        let page = self.page_mut()?;
        if !page.push_to_array("Annots", annotation) {
            page.set("Annots", vec![Object::Reference(annotation)]);
        }
        page.set("Tabs", Object::name("S"));
        debug!(
            annotation = %annotation,
            subtype = %spec.subtype,
            artifact = spec.artifact,
            "attached annotation"
        );
        Ok(annotation)
    }
}
