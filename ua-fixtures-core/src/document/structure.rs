use super::{DocumentBuilder, Subsystem};
use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId};
use crate::pdf_dict;
use std::collections::BTreeMap;
use tracing::debug;

/// Largest MCID accepted. The parent tree holds one slot per MCID up to the
/// highest in use, so this also caps that array.
pub const MAX_MCID: i64 = u16::MAX as i64;

/// Something a structure element owns besides child elements.
#[derive(Debug, Clone, PartialEq)]
pub enum StructContent {
    /// A marked-content sequence on the page, by MCID.
    MarkedContent(i64),
    /// An annotation, referenced through an `/OBJR` dictionary.
    Annotation(ObjectId),
}

/// One structure element.
#[derive(Debug, Clone, PartialEq)]
pub struct StructElemSpec {
    pub tag: String,
    pub id: Option<String>,
    /// Index of the parent element in [`StructTreeSpec::elements`]; `None`
    /// hangs the element directly under the StructTreeRoot. A parent must
    /// come before its children.
    pub parent: Option<usize>,
    pub content: Vec<StructContent>,
}

impl StructElemSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            parent: None,
            content: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn child_of(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_mcid(mut self, mcid: i64) -> Self {
        self.content.push(StructContent::MarkedContent(mcid));
        self
    }

    pub fn with_annotation(mut self, annotation: ObjectId) -> Self {
        self.content.push(StructContent::Annotation(annotation));
        self
    }
}

/// Shape of the structure tree to attach.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructTreeSpec {
    pub elements: Vec<StructElemSpec>,
    /// `/RoleMap` entries in order. Nothing stops a mapping from pointing
    /// back at itself; that is a defect some fixtures need.
    pub role_map: Vec<(String, String)>,
    /// Emit a `/ParentTree`, even when it ends up empty.
    pub parent_tree: bool,
}

impl StructTreeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, element: StructElemSpec) -> Self {
        self.elements.push(element);
        self
    }

    pub fn role(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.role_map.push((from.into(), to.into()));
        self
    }

    pub fn with_parent_tree(mut self) -> Self {
        self.parent_tree = true;
        self
    }
}

/// Handles of the objects [`DocumentBuilder::attach_structure_tree`] created.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureTree {
    pub root: ObjectId,
    pub elements: Vec<ObjectId>,
    pub parent_tree: Option<ObjectId>,
}

impl DocumentBuilder {
    /// Allocates the StructTreeRoot and every element, wiring `/P` back
    /// references, `/K` kids and, if requested, the parent tree.
    ///
    /// Kids of an element are its content items (in order) followed by its
    /// child elements (in order). A lone MCID kid is written as a bare
    /// integer, several kids as an array, no kids as no `/K` at all.
    ///
    /// Parent tree keys: the page's marked content takes key 0 (when there is
    /// any) and each referenced annotation takes the next free key, recorded
    /// as its `/StructParent`.
    pub fn attach_structure_tree(&mut self, spec: &StructTreeSpec) -> Result<StructureTree> {
        validate(spec, self)?;
        self.claim(Subsystem::StructureTree)?;

        let mut root_dict = pdf_dict! { "Type" => Object::name("StructTreeRoot") };
        if !spec.role_map.is_empty() {
            let role_map: Dictionary = spec
                .role_map
                .iter()
                .map(|(from, to)| (from.clone(), Object::name(to.as_str())))
                .collect();
            root_dict.set("RoleMap", role_map);
        }
        let root = self.graph.allocate(root_dict)?;

        let mut elements = Vec::with_capacity(spec.elements.len());
        for element in &spec.elements {
            let parent = match element.parent {
                Some(index) => elements[index],
                None => root,
            };
            let mut dict = pdf_dict! {
                "Type" => Object::name("StructElem"),
                "S" => Object::name(element.tag.as_str()),
                "P" => parent,
                "Pg" => self.page,
            };
            if let Some(id) = &element.id {
                dict.set("ID", id.as_str());
            }
            elements.push(self.graph.allocate(dict)?);
        }

        let mut mcid_owners: BTreeMap<i64, ObjectId> = BTreeMap::new();
        let mut annotation_owners: Vec<(ObjectId, ObjectId)> = Vec::new();

        for (index, element) in spec.elements.iter().enumerate() {
            let owner = elements[index];
            let mut kids = Vec::new();
            for item in &element.content {
                match item {
                    StructContent::MarkedContent(mcid) => {
                        mcid_owners.insert(*mcid, owner);
                        kids.push(Object::Integer(*mcid));
                    }
                    StructContent::Annotation(annotation) => {
                        let objr = self.graph.allocate(pdf_dict! {
                            "Type" => Object::name("OBJR"),
                            "Obj" => *annotation,
                            "Pg" => self.page,
                        })?;
                        annotation_owners.push((*annotation, owner));
                        kids.push(Object::Reference(objr));
                    }
                }
            }
            kids.extend(
                spec.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, child)| child.parent == Some(index))
                    .map(|(child_index, _)| Object::Reference(elements[child_index])),
            );
            if let Some(k) = kids_value(kids) {
                self.graph.dictionary_mut(owner)?.set("K", k);
            }
        }

        let top_level: Vec<Object> = spec
            .elements
            .iter()
            .zip(&elements)
            .filter(|(element, _)| element.parent.is_none())
            .map(|(_, id)| Object::Reference(*id))
            .collect();
        if !top_level.is_empty() {
            self.graph.dictionary_mut(root)?.set("K", top_level);
        }

        let parent_tree = if spec.parent_tree {
            Some(self.attach_parent_tree(root, &mcid_owners, &annotation_owners)?)
        } else {
            None
        };

        self.catalog_mut()?.set("StructTreeRoot", root);
        debug!(
            root = %root,
            elements = elements.len(),
            role_map = spec.role_map.len(),
            "attached structure tree"
        );

        Ok(StructureTree {
            root,
            elements,
            parent_tree,
        })
    }

    fn attach_parent_tree(
        &mut self,
        root: ObjectId,
        mcid_owners: &BTreeMap<i64, ObjectId>,
        annotation_owners: &[(ObjectId, ObjectId)],
    ) -> Result<ObjectId> {
        let mut nums = Vec::new();
        let mut next_key: i64 = 0;

        if let Some(max_mcid) = mcid_owners.keys().next_back().copied() {
            let by_mcid: Vec<Object> = (0..=max_mcid)
                .map(|mcid| {
                    mcid_owners
                        .get(&mcid)
                        .map_or(Object::Null, |owner| Object::Reference(*owner))
                })
                .collect();
            nums.push(Object::Integer(next_key));
            nums.push(Object::Array(by_mcid));
            self.set_page_entry("StructParents", next_key)?;
            next_key += 1;
        }

        for (annotation, owner) in annotation_owners {
            nums.push(Object::Integer(next_key));
            nums.push(Object::Reference(*owner));
            self.graph
                .dictionary_mut(*annotation)?
                .set("StructParent", next_key);
            next_key += 1;
        }

        let parent_tree = self.graph.allocate(pdf_dict! { "Nums" => nums })?;
        self.graph
            .dictionary_mut(root)?
            .set("ParentTree", parent_tree);
        Ok(parent_tree)
    }
}

fn kids_value(mut kids: Vec<Object>) -> Option<Object> {
    match kids.len() {
        0 => None,
        1 if matches!(kids[0], Object::Integer(_)) => kids.pop(),
        _ => Some(Object::Array(kids)),
    }
}

fn validate(spec: &StructTreeSpec, builder: &DocumentBuilder) -> Result<()> {
    let mut seen_mcids = Vec::new();
    for (index, element) in spec.elements.iter().enumerate() {
        if let Some(parent) = element.parent {
            if parent >= index {
                return Err(PdfError::InvalidStructure(format!(
                    "structure element {index} names parent {parent}, which does not precede it"
                )));
            }
        }
        for item in &element.content {
            match item {
                StructContent::MarkedContent(mcid) => {
                    if *mcid < 0 || seen_mcids.contains(mcid) {
                        return Err(PdfError::InvalidStructure(format!(
                            "MCID {mcid} is negative or claimed twice"
                        )));
                    }
                    if *mcid > MAX_MCID {
                        return Err(PdfError::InvalidStructure(format!(
                            "MCID {mcid} exceeds {MAX_MCID}"
                        )));
                    }
                    seen_mcids.push(*mcid);
                }
                StructContent::Annotation(annotation) => {
                    builder.graph.dictionary(*annotation)?;
                }
            }
        }
    }
    Ok(())
}
