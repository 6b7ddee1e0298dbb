//! Object arena for one document.
//!
//! The graph owns every indirect object. Edges between objects are plain
//! [`Object::Reference`] values looked up by number, so cycles such as
//! structure element ↔ parent need no shared ownership: allocate the parent,
//! allocate the child pointing at it, then patch the parent's `/K`.

use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct ObjectGraph {
    objects: BTreeMap<u32, Object>,
    next_number: u32,
    root: Option<ObjectId>,
    permitted_dangling: BTreeSet<ObjectId>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_number: 1,
            root: None,
            permitted_dangling: BTreeSet::new(),
        }
    }

    /// Registers `object` and returns its freshly assigned handle.
    pub fn allocate(&mut self, object: impl Into<Object>) -> Result<ObjectId> {
        let number = self.next_number;
        self.next_number = number
            .checked_add(1)
            .ok_or(PdfError::HandleSpaceExhausted)?;

        let object = object.into();
        trace!(number, kind = object.type_name(), "allocated object");
        self.objects.insert(number, object);
        Ok(ObjectId::new(number, 0))
    }

    /// Places an object under a known number. Used when rebuilding a graph
    /// from a parsed file; later allocations continue after the highest
    /// number seen.
    pub(crate) fn insert(&mut self, id: ObjectId, object: Object) -> Result<()> {
        if self.objects.contains_key(&id.number()) {
            return Err(PdfError::InvalidStructure(format!(
                "object {id} defined twice"
            )));
        }
        self.objects.insert(id.number(), object);
        if id.number() >= self.next_number {
            self.next_number = id
                .number()
                .checked_add(1)
                .ok_or(PdfError::HandleSpaceExhausted)?;
        }
        Ok(())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        id.generation() == 0 && self.objects.contains_key(&id.number())
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        if id.generation() != 0 {
            return None;
        }
        self.objects.get(&id.number())
    }

    /// Returns the live object behind `id`.
    pub fn resolve(&self, id: ObjectId) -> Result<&Object> {
        self.get(id).ok_or(PdfError::UnknownObject(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        if id.generation() != 0 {
            return Err(PdfError::UnknownObject(id));
        }
        self.objects
            .get_mut(&id.number())
            .ok_or(PdfError::UnknownObject(id))
    }

    /// Mutable access to a dictionary object (or a stream's dictionary).
    pub fn dictionary_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        self.get_mut(id)?
            .as_dict_mut()
            .ok_or(PdfError::NotADictionary(id))
    }

    pub fn dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        self.resolve(id)?
            .as_dict()
            .ok_or(PdfError::NotADictionary(id))
    }

    /// A reference to an object that must already exist.
    pub fn reference(&self, id: ObjectId) -> Result<Object> {
        if self.contains(id) {
            Ok(Object::Reference(id))
        } else {
            Err(PdfError::UnknownObject(id))
        }
    }

    /// Marks `id` as an intentionally unresolved reference target.
    ///
    /// Only references registered here survive [`ObjectGraph::check_integrity`]
    /// without resolving.
    pub fn permit_dangling(&mut self, id: ObjectId) {
        self.permitted_dangling.insert(id);
    }

    pub fn set_root(&mut self, id: ObjectId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .map(|(number, object)| (ObjectId::new(*number, 0), object))
    }

    /// Every object reachable from the root, the root included.
    pub fn reachable(&self) -> BTreeSet<ObjectId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        if let Some(root) = self.root.filter(|root| self.contains(*root)) {
            seen.insert(root);
            queue.push_back(root);
        }

        while let Some(current) = queue.pop_front() {
            let Some(object) = self.get(current) else {
                continue;
            };
            let mut refs = Vec::new();
            collect_references(object, &mut refs);
            for id in refs {
                if self.contains(id) && seen.insert(id) {
                    queue.push_back(id);
                }
            }
        }
        seen
    }

    /// Allocated objects that nothing reachable from the root points at.
    pub fn unreachable(&self) -> Vec<ObjectId> {
        let reachable = self.reachable();
        self.iter()
            .map(|(id, _)| id)
            .filter(|id| !reachable.contains(id))
            .collect()
    }

    /// Checks that the root exists and every reference resolves, apart from
    /// those registered with [`ObjectGraph::permit_dangling`].
    pub fn check_integrity(&self) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| PdfError::InvalidStructure("document has no root".to_string()))?;
        if !self.contains(root) {
            return Err(PdfError::DanglingReference(root));
        }

        for (_, object) in self.iter() {
            let mut refs = Vec::new();
            collect_references(object, &mut refs);
            if let Some(missing) = refs
                .into_iter()
                .find(|id| !self.contains(*id) && !self.permitted_dangling.contains(id))
            {
                return Err(PdfError::DanglingReference(missing));
            }
        }
        Ok(())
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the references held directly inside `object`, without following
/// them. Direct objects form a tree, so this always terminates.
pub fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        Object::Dictionary(dict) => {
            for value in dict.values() {
                collect_references(value, out);
            }
        }
        Object::Stream(stream) => {
            for value in stream.dictionary().values() {
                collect_references(value, out);
            }
        }
        _ => {}
    }
}
