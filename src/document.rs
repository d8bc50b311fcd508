//! The in-memory scene document: an arena of nodes addressed by integer
//! index, plus document-level metadata and the persistent-store lifecycle
//! (open, create, save).

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::DocumentFile;
use crate::path::{InvalidPath, ScenePath};
use crate::value::Value;

/// The type given to nodes that are created without an explicit one, such as
/// ancestors materialized on demand.
pub const DEFAULT_NODE_TYPE: &str = "Transform";

/// Handle to a node inside one document's arena. Only meaningful for the
/// document that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether an attribute's value may change over time or is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variability {
    Varying,
    Uniform,
}

impl Default for Variability {
    fn default() -> Self {
        Variability::Varying
    }
}

/// A typed value slot on a node, like `size` or `displayColor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeData {
    pub type_name: String,

    #[serde(default)]
    pub variability: Variability,

    #[serde(default)]
    pub custom: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A named, ordered, de-duplicated list of target paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipData {
    pub targets: Vec<ScenePath>,
}

impl RelationshipData {
    /// Builds a relationship from a target list, dropping repeated targets
    /// while preserving first-occurrence order.
    pub fn new(targets: Vec<ScenePath>) -> Self {
        let mut deduped: Vec<ScenePath> = Vec::with_capacity(targets.len());

        for target in targets {
            if !deduped.contains(&target) {
                deduped.push(target);
            }
        }

        RelationshipData { targets: deduped }
    }
}

/// Content authored inside one variant of a variant set: child subtrees plus
/// opinion overlays on the owning node.
#[derive(Debug, Clone, Default)]
pub struct VariantContent {
    pub children: Vec<NodeId>,
    pub metadata: BTreeMap<String, Value>,
    pub attributes: BTreeMap<String, AttributeData>,
    pub relationships: BTreeMap<String, RelationshipData>,
}

/// One named variant and whatever has been authored under it. A variant may
/// stay empty until an editing scope for it is entered.
#[derive(Debug, Clone)]
pub struct VariantData {
    pub name: String,
    pub content: VariantContent,
}

/// A named group of mutually exclusive variants on one node. Variant names
/// keep their declaration order and are unique within the set.
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    pub variants: Vec<VariantData>,

    /// The active variant, if any. Selection is global to the set: changing
    /// it changes which content is visible everywhere the document is read.
    pub selection: Option<String>,
}

impl VariantSet {
    pub fn variant(&self, name: &str) -> Option<&VariantData> {
        self.variants.iter().find(|v| v.name == name)
    }

    pub fn variant_mut(&mut self, name: &str) -> Option<&mut VariantData> {
        self.variants.iter_mut().find(|v| v.name == name)
    }

    pub fn has_variant(&self, name: &str) -> bool {
        self.variant(name).is_some()
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.name.as_str())
    }
}

/// One node in the arena. A node's path is always its parent's path extended
/// with its own name; paths are unique within a document.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub path: ScenePath,
    pub type_name: String,

    pub metadata: BTreeMap<String, Value>,

    /// The schema-free side channel, distinct from typed metadata. Keys that
    /// no schema claims are stored here.
    pub custom_data: BTreeMap<String, Value>,

    pub attributes: BTreeMap<String, AttributeData>,
    pub relationships: BTreeMap<String, RelationshipData>,
    pub variant_sets: BTreeMap<String, VariantSet>,

    /// Children authored outside any variant scope, in authoring order.
    pub children: Vec<NodeId>,
}

impl NodeData {
    pub fn new(path: ScenePath, type_name: &str) -> NodeData {
        let type_name = if type_name.is_empty() {
            DEFAULT_NODE_TYPE
        } else {
            type_name
        };

        NodeData {
            name: path.name().to_owned(),
            path,
            type_name: type_name.to_owned(),
            metadata: BTreeMap::new(),
            custom_data: BTreeMap::new(),
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            variant_sets: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

/// Document-level metadata carried alongside the node forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_code: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_code: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meters_per_unit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_root: Option<ScenePath>,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not open scene document at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse scene document at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scene document at {path} contains an invalid node tree")]
    Invalid {
        path: PathBuf,
        #[source]
        source: InvalidPath,
    },

    #[error("could not save scene document to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An ordered forest of root nodes plus document metadata.
///
/// Nodes live in an append-only arena. Because nodes are only ever created
/// through `SceneTree::define_node` (ancestors first) or by loading a file
/// (parents first), a node's arena index is always greater than its parent's;
/// serialization relies on that ordering.
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    pub metadata: DocumentMetadata,
}

impl SceneDocument {
    /// Creates a new, empty document.
    pub fn new() -> SceneDocument {
        SceneDocument::default()
    }

    /// Reads a document from persistent storage.
    pub fn open(path: &Path) -> Result<SceneDocument, DocumentError> {
        log::trace!("opening scene document at {}", path.display());

        let file = fs_err::File::open(path).map_err(|source| DocumentError::Open {
            path: path.to_owned(),
            source: source.into(),
        })?;

        let parsed: DocumentFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                DocumentError::Parse {
                    path: path.to_owned(),
                    source,
                }
            })?;

        parsed.into_document().map_err(|source| DocumentError::Invalid {
            path: path.to_owned(),
            source,
        })
    }

    /// Flushes the document to persistent storage, overwriting any existing
    /// file at `path`.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        log::trace!("saving scene document to {}", path.display());

        let save_error = |source: std::io::Error| DocumentError::Save {
            path: path.to_owned(),
            source,
        };

        let file = fs_err::File::create(path).map_err(|e| save_error(e.into()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &DocumentFile::from_document(self))
            .map_err(|source| save_error(source.into()))?;

        writer.write_all(b"\n").map_err(save_error)?;
        writer.flush().map_err(save_error)?;

        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push_node(&mut self, node: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node handles in arena order (parents before children).
    pub fn node_ids(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::Write as _;

    use crate::format::DocumentFile;
    use crate::tree::SceneTree;

    #[test]
    fn save_and_open_round_trip() {
        let mut doc = SceneDocument::new();
        doc.metadata.meters_per_unit = Some(0.01);
        {
            let mut tree = SceneTree::new(&mut doc);
            let box_id = tree.define_node(&ScenePath::parse("/World/Box").unwrap(), "Cube");
            tree.set_metadata(box_id, "comment", Value::String("hello".to_owned()));
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        doc.save(&path).unwrap();
        let reopened = SceneDocument::open(&path).unwrap();

        assert_eq!(reopened.metadata.meters_per_unit, Some(0.01));
        assert_eq!(
            DocumentFile::from_document(&reopened),
            DocumentFile::from_document(&doc)
        );
    }

    #[test]
    fn opening_a_missing_file_fails_with_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        match SceneDocument::open(&path) {
            Err(DocumentError::Open { .. }) => {}
            other => panic!("expected an open error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn opening_garbage_fails_with_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        fs_err::File::create(&path)
            .unwrap()
            .write_all(b"not json at all")
            .unwrap();

        match SceneDocument::open(&path) {
            Err(DocumentError::Parse { .. }) => {}
            other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn opening_a_bad_node_name_fails_with_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs_err::File::create(&path)
            .unwrap()
            .write_all(br#"{ "roots": [{ "name": "not a name" }] }"#)
            .unwrap();

        match SceneDocument::open(&path) {
            Err(DocumentError::Invalid { .. }) => {}
            other => panic!("expected an invalid-tree error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn save_overwrites_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let mut first = SceneDocument::new();
        SceneTree::new(&mut first).define_node(&ScenePath::parse("/Old").unwrap(), "Transform");
        first.save(&path).unwrap();

        let mut second = SceneDocument::new();
        SceneTree::new(&mut second).define_node(&ScenePath::parse("/New").unwrap(), "Transform");
        second.save(&path).unwrap();

        let reopened = SceneDocument::open(&path).unwrap();
        assert_eq!(reopened.roots().len(), 1);
        assert_eq!(reopened.node(reopened.roots()[0]).name, "New");
    }
}

