//! Structural comparison of two object graphs.
//!
//! Both graphs are walked from their roots in lock-step. References are
//! followed on both sides at once, so object numbering does not matter, and
//! each pair of objects is visited once, so cycles terminate. Traversal is
//! breadth-first: every difference is reported under the shortest path that
//! reaches it.

use crate::graph::ObjectGraph;
use crate::objects::{Dictionary, Object, ObjectId};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    OnlyInLeft,
    OnlyInRight,
    ValueMismatch,
    LengthMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDifference {
    /// Key path from the trailer, such as `/Root/OCProperties/D/Name`.
    /// Array elements appear as `[i]`, stream payloads as `/(data)`.
    pub path: String,
    pub kind: DifferenceKind,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl GraphDifference {
    /// Whether the difference lies at or below `prefix`.
    pub fn is_under(&self, prefix: &str) -> bool {
        self.path == prefix
            || self
                .path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('['))
    }
}

impl fmt::Display for GraphDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = self.left.as_deref().unwrap_or("-");
        let right = self.right.as_deref().unwrap_or("-");
        match self.kind {
            DifferenceKind::OnlyInLeft => write!(f, "{}: only in left ({left})", self.path),
            DifferenceKind::OnlyInRight => write!(f, "{}: only in right ({right})", self.path),
            DifferenceKind::ValueMismatch => write!(f, "{}: {left} != {right}", self.path),
            DifferenceKind::LengthMismatch => {
                write!(f, "{}: length {left} != {right}", self.path)
            }
        }
    }
}

/// Short human-readable rendering of a value for diff output.
pub fn describe(object: &Object) -> String {
    match object {
        Object::Null => "null".to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::String(s) => s.to_string(),
        Object::Name(n) => format!("/{n}"),
        Object::Array(items) => format!("array[{}]", items.len()),
        Object::Dictionary(dict) => format!("dictionary[{}]", dict.len()),
        Object::Stream(stream) => format!("stream({} bytes)", stream.data().len()),
        Object::Reference(id) => id.to_string(),
    }
}

/// Lists every place where `left` and `right` differ.
pub fn diff_graphs(left: &ObjectGraph, right: &ObjectGraph) -> Vec<GraphDifference> {
    let mut differ = Differ {
        left,
        right,
        queue: VecDeque::new(),
        seen: HashSet::new(),
        out: Vec::new(),
    };

    match (left.root(), right.root()) {
        (Some(l), Some(r)) => differ.compare_references("/Root", l, r),
        (None, None) => {}
        (l, r) => differ.out.push(GraphDifference {
            path: "/Root".to_string(),
            kind: if l.is_some() {
                DifferenceKind::OnlyInLeft
            } else {
                DifferenceKind::OnlyInRight
            },
            left: l.map(|id| id.to_string()),
            right: r.map(|id| id.to_string()),
        }),
    }

    while let Some((path, l, r)) = differ.queue.pop_front() {
        if let (Some(lo), Some(ro)) = (left.get(l), right.get(r)) {
            differ.compare(&path, lo, ro);
        }
    }

    differ.out
}

struct Differ<'g> {
    left: &'g ObjectGraph,
    right: &'g ObjectGraph,
    queue: VecDeque<(String, ObjectId, ObjectId)>,
    seen: HashSet<(ObjectId, ObjectId)>,
    out: Vec<GraphDifference>,
}

impl Differ<'_> {
    fn push(&mut self, path: String, kind: DifferenceKind, left: Option<&Object>, right: Option<&Object>) {
        self.out.push(GraphDifference {
            path,
            kind,
            left: left.map(describe),
            right: right.map(describe),
        });
    }

    fn compare_references(&mut self, path: &str, l: ObjectId, r: ObjectId) {
        match (self.left.contains(l), self.right.contains(r)) {
            (true, true) => {
                if self.seen.insert((l, r)) {
                    self.queue.push_back((path.to_string(), l, r));
                }
            }
            // Permitted dangling references on both sides compare by number
            (false, false) if l == r => {}
            _ => self.push(
                path.to_string(),
                DifferenceKind::ValueMismatch,
                Some(&Object::Reference(l)),
                Some(&Object::Reference(r)),
            ),
        }
    }

    fn compare(&mut self, path: &str, l: &Object, r: &Object) {
        match (l, r) {
            (Object::Reference(a), Object::Reference(b)) => self.compare_references(path, *a, *b),
            (Object::Dictionary(a), Object::Dictionary(b)) => self.compare_dictionaries(path, a, b),
            (Object::Stream(a), Object::Stream(b)) => {
                self.compare_dictionaries(path, a.dictionary(), b.dictionary());
                if a.data() != b.data() {
                    self.push(format!("{path}/(data)"), DifferenceKind::ValueMismatch, Some(l), Some(r));
                }
            }
            (Object::Array(a), Object::Array(b)) => {
                if a.len() != b.len() {
                    self.out.push(GraphDifference {
                        path: path.to_string(),
                        kind: DifferenceKind::LengthMismatch,
                        left: Some(a.len().to_string()),
                        right: Some(b.len().to_string()),
                    });
                }
                for (index, (x, y)) in a.iter().zip(b).enumerate() {
                    self.compare(&format!("{path}[{index}]"), x, y);
                }
            }
            _ => {
                if l != r {
                    self.push(path.to_string(), DifferenceKind::ValueMismatch, Some(l), Some(r));
                }
            }
        }
    }

    fn compare_dictionaries(&mut self, path: &str, a: &Dictionary, b: &Dictionary) {
        for (key, value) in a.iter() {
            let child = format!("{path}/{key}");
            match b.get(key) {
                Some(other) => self.compare(&child, value, other),
                None => self.push(child, DifferenceKind::OnlyInLeft, Some(value), None),
            }
        }
        for (key, value) in b.iter() {
            if !a.contains_key(key) {
                self.push(format!("{path}/{key}"), DifferenceKind::OnlyInRight, None, Some(value));
            }
        }
    }
}
