use super::{DocumentBuilder, Subsystem};
use crate::error::Result;
use crate::fonts::FontSource;
use crate::objects::{Dictionary, Object, ObjectId, PdfString, Stream};
use crate::writer::encode_string;
use crate::pdf_dict;
use tracing::debug;

const TO_UNICODE_PROGRAM: &[u8] = b"/CIDInit /ProcSet findresource begin\n\
12 dict begin\n\
begincmap\n\
/CMapName /ToUnicode def\n\
/CMapType 2 def\n\
1 begincodespacerange\n\
<00> <FF>\n\
endcodespacerange\n\
1 beginbfchar\n\
<41> <0041>\n\
endbfchar\n\
endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end\n\
end\n";

/// A CIDSystemInfo triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidSystemInfo {
    pub registry: String,
    pub ordering: String,
    pub supplement: i64,
}

impl CidSystemInfo {
    pub fn new(registry: impl Into<String>, ordering: impl Into<String>, supplement: i64) -> Self {
        Self {
            registry: registry.into(),
            ordering: ordering.into(),
            supplement,
        }
    }

    fn to_dictionary(&self) -> Dictionary {
        pdf_dict! {
            "Registry" => self.registry.as_str(),
            "Ordering" => self.ordering.as_str(),
            "Supplement" => self.supplement,
        }
    }

    /// The CMap program's `/CIDSystemInfo` entry. Registry and ordering use
    /// the same string escaping as the object syntax.
    fn to_cmap_line(&self) -> Vec<u8> {
        let mut line = b"/CIDSystemInfo << /Registry ".to_vec();
        line.extend(encode_string(&PdfString::literal(self.registry.as_str())));
        line.extend_from_slice(b" /Ordering ");
        line.extend(encode_string(&PdfString::literal(self.ordering.as_str())));
        line.extend(format!(" /Supplement {} >> def\n", self.supplement).into_bytes());
        line
    }
}

/// A Type0 font over a CIDFontType2 descendant with an embedded TrueType
/// program.
///
/// The three CIDSystemInfo locations are set independently so that a
/// fixture can make them disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct CidFontSpec {
    pub base_font: String,
    /// Font descriptor `/Flags`.
    pub flags: i64,
    /// CIDSystemInfo on the Type0 font.
    pub outer: CidSystemInfo,
    /// CIDSystemInfo on the CIDFontType2 descendant.
    pub descendant: CidSystemInfo,
    /// CIDSystemInfo on the encoding CMap, in both its dictionary and its
    /// program text. `None` leaves the CMap without one.
    pub cmap: Option<CidSystemInfo>,
    pub to_unicode: bool,
    /// Key under the page's `/Resources /Font`.
    pub resource_name: String,
}

/// Handles of the objects [`DocumentBuilder::attach_cid_font`] created.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFont {
    pub type0: ObjectId,
    pub descendant: ObjectId,
    pub descriptor: ObjectId,
    pub font_file: ObjectId,
    pub encoding: ObjectId,
    pub to_unicode: Option<ObjectId>,
}

fn encoding_program(cmap: Option<&CidSystemInfo>) -> Vec<u8> {
    let mut program = b"/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n".to_vec();
    if let Some(info) = cmap {
        program.extend(info.to_cmap_line());
    }
    program.extend_from_slice(
        b"/CMapName /TestCMap def\n\
/CMapType 1 def\n\
/WMode 0 def\n\
1 begincodespacerange\n\
<00> <FF>\n\
endcodespacerange\n\
1 beginbfchar\n\
<41> <0041>\n\
endbfchar\n\
endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end\n\
end\n",
    );
    program
}

impl DocumentBuilder {
    /// Embeds a composite font and registers it in the page resources.
    ///
    /// The font program is read before anything is allocated, so a missing
    /// font leaves the builder untouched.
    pub fn attach_cid_font(
        &mut self,
        spec: &CidFontSpec,
        fonts: &dyn FontSource,
    ) -> Result<CompositeFont> {
        let program = fonts.font_bytes()?;
        self.claim(Subsystem::CidFont)?;

        let mut cmap_dict = pdf_dict! {
            "Type" => Object::name("CMap"),
            "CMapName" => Object::name("TestCMap"),
        };
        if let Some(info) = &spec.cmap {
            cmap_dict.set("CIDSystemInfo", info.to_dictionary());
        }
        cmap_dict.set("WMode", 0);
        let encoding = self.graph.allocate(Stream::with_dictionary(
            cmap_dict,
            encoding_program(spec.cmap.as_ref()),
        ))?;

        let to_unicode = if spec.to_unicode {
            Some(self.graph.allocate(Stream::new(TO_UNICODE_PROGRAM.to_vec()))?)
        } else {
            None
        };

        let program_len = program.len();
        let font_file = self.graph.allocate(Stream::with_dictionary(
            pdf_dict! { "Length1" => program_len },
            program.bytes,
        ))?;

        let descriptor = self.graph.allocate(pdf_dict! {
            "Type" => Object::name("FontDescriptor"),
            "FontName" => Object::name(spec.base_font.as_str()),
            "Flags" => spec.flags,
            "FontBBox" => vec![
                Object::Integer(-500),
                Object::Integer(-200),
                Object::Integer(1500),
                Object::Integer(1000),
            ],
            "ItalicAngle" => 0,
            "Ascent" => 1000,
            "Descent" => -200,
            "CapHeight" => 700,
            "StemV" => 80,
            "FontFile2" => font_file,
        })?;

        let descendant = self.graph.allocate(pdf_dict! {
            "Type" => Object::name("Font"),
            "Subtype" => Object::name("CIDFontType2"),
            "BaseFont" => Object::name(spec.base_font.as_str()),
            "CIDSystemInfo" => spec.descendant.to_dictionary(),
            "FontDescriptor" => descriptor,
            "DW" => 1000,
            "CIDToGIDMap" => Object::name("Identity"),
        })?;

        let mut type0_dict = pdf_dict! {
            "Type" => Object::name("Font"),
            "Subtype" => Object::name("Type0"),
            "BaseFont" => Object::name(spec.base_font.as_str()),
            "Encoding" => encoding,
            "DescendantFonts" => vec![Object::Reference(descendant)],
        };
        if let Some(to_unicode) = to_unicode {
            type0_dict.set("ToUnicode", to_unicode);
        }
        type0_dict.set("CIDSystemInfo", spec.outer.to_dictionary());
        let type0 = self.graph.allocate(type0_dict)?;

        self.add_font_resource(&spec.resource_name, type0)?;
        debug!(
            font = %type0,
            base_font = %spec.base_font,
            program_bytes = program_len,
            outer_registry = %spec.outer.registry,
            descendant_registry = %spec.descendant.registry,
            "attached composite font"
        );

        Ok(CompositeFont {
            type0,
            descendant,
            descriptor,
            font_file,
            encoding,
            to_unicode,
        })
    }
}
