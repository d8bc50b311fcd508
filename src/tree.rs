//! The read/write capability interface over a scene document.
//!
//! All mutation goes through `SceneTree`. The accessor tracks a stack of
//! variant editing scopes: while a scope is active, content authored on the
//! scope's owner lands inside the entered variant instead of the node's
//! always-visible default content. Reads compose the default content with
//! every variant set's currently-selected variant.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::document::{
    AttributeData, NodeData, NodeId, RelationshipData, SceneDocument, Variability, VariantContent,
    VariantData, VariantSet,
};
use crate::path::ScenePath;
use crate::value::Value;

/// Metadata key that mirrors a node's type, the way the underlying store
/// reports it alongside authored metadata.
pub const META_TYPE_NAME: &str = "typeName";

/// Metadata key under which the whole custom-data channel surfaces when
/// metadata is enumerated.
pub const META_CUSTOM_DATA: &str = "customData";

#[derive(Debug, Error)]
#[error("unknown variant '{variant}' in set '{set}' at {path}")]
pub struct UnknownVariant {
    pub path: ScenePath,
    pub set: String,
    pub variant: String,
}

/// Proof that a variant editing scope is open. Scopes must be closed in LIFO
/// order; the token is consumed by `exit_variant_scope`.
#[derive(Debug)]
#[must_use = "an unclosed scope keeps routing edits into its variant"]
pub struct ScopeToken {
    depth: usize,
}

struct ScopeFrame {
    owner: NodeId,
    set: String,
    variant: String,
}

pub struct SceneTree<'a> {
    doc: &'a mut SceneDocument,
    scopes: Vec<ScopeFrame>,
}

impl<'a> SceneTree<'a> {
    pub fn new(doc: &'a mut SceneDocument) -> SceneTree<'a> {
        SceneTree {
            doc,
            scopes: Vec::new(),
        }
    }

    pub fn document(&self) -> &SceneDocument {
        self.doc
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        self.doc.node(id)
    }

    pub fn root_children(&self) -> Vec<NodeId> {
        self.doc.roots().to_vec()
    }

    /// The children currently visible on a node: its default children plus,
    /// for every variant set with an active selection, the children authored
    /// under the selected variant.
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.doc.node(id);
        let mut children = node.children.clone();

        for set in node.variant_sets.values() {
            if let Some(selection) = &set.selection {
                if let Some(variant) = set.variant(selection) {
                    children.extend_from_slice(&variant.content.children);
                }
            }
        }

        children
    }

    /// Looks up a node by path, walking visible children from the roots.
    pub fn get_node(&self, path: &ScenePath) -> Option<NodeId> {
        let mut current: Option<NodeId> = None;

        for name in path.segments() {
            let candidates = match current {
                None => self.root_children(),
                Some(parent) => self.visible_children(parent),
            };

            current = Some(
                candidates
                    .into_iter()
                    .find(|&child| self.doc.node(child).name == name)?,
            );
        }

        current
    }

    /// Resolves the node at `path`, creating it and any missing ancestors.
    /// Missing ancestors get the generic default type; the final node gets
    /// `type_name` (or the default when empty). Idempotent: a node already
    /// visible at the path is returned untouched.
    ///
    /// Inside a variant scope, nodes created directly under the scope's
    /// owner are recorded as that variant's children.
    pub fn define_node(&mut self, path: &ScenePath, type_name: &str) -> NodeId {
        let mut current: Option<NodeId> = None;

        for depth in 1..=path.len() {
            let name = path
                .segments()
                .nth(depth - 1)
                .expect("depth is bounded by the segment count");

            let candidates = match current {
                None => self.root_children(),
                Some(parent) => self.visible_children(parent),
            };

            let existing = candidates
                .into_iter()
                .find(|&child| self.doc.node(child).name == name);

            current = Some(match existing {
                Some(id) => id,
                None => {
                    let node_path = subpath(path, depth);
                    let ty = if depth == path.len() { type_name } else { "" };

                    log::trace!("defining node {}", node_path);
                    let id = self.doc.push_node(NodeData::new(node_path, ty));
                    self.attach_child(current, id);
                    id
                }
            });
        }

        current.expect("scene paths always have at least one segment")
    }

    fn attach_child(&mut self, parent: Option<NodeId>, id: NodeId) {
        let parent = match parent {
            None => {
                self.doc.push_root(id);
                return;
            }
            Some(parent) => parent,
        };

        if let Some(frame) = self.scopes.last() {
            if frame.owner == parent {
                let set = frame.set.clone();
                let variant = frame.variant.clone();
                self.variant_content_mut(parent, &set, &variant)
                    .children
                    .push(id);
                return;
            }
        }

        self.doc.node_mut(parent).children.push(id);
    }

    /// The metadata currently visible on a node, as an ordered mapping. The
    /// view composes authored metadata, selected-variant overlays, the
    /// intrinsic `typeName` entry, and the `customData` channel.
    pub fn metadata_of(&self, id: NodeId) -> BTreeMap<String, Value> {
        let node = self.doc.node(id);
        let mut metadata = node.metadata.clone();

        for set in node.variant_sets.values() {
            if let Some(selection) = &set.selection {
                if let Some(variant) = set.variant(selection) {
                    for (key, value) in &variant.content.metadata {
                        metadata.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        metadata.insert(
            META_TYPE_NAME.to_owned(),
            Value::String(node.type_name.clone()),
        );

        if !node.custom_data.is_empty() {
            metadata.insert(
                META_CUSTOM_DATA.to_owned(),
                Value::Map(node.custom_data.clone()),
            );
        }

        metadata
    }

    /// Writes one metadata entry. The intrinsic `typeName` and `customData`
    /// keys write through to their backing fields; other keys land in the
    /// innermost scope's overlay when the target is the scope owner.
    pub fn set_metadata(&mut self, id: NodeId, key: &str, value: Value) {
        let value = value.unwrap_unregistered();

        match key {
            META_TYPE_NAME => {
                if let Value::String(type_name) = value {
                    self.doc.node_mut(id).type_name = type_name;
                } else {
                    log::warn!("ignoring non-string type name on {}", self.doc.node(id).path);
                }
            }
            META_CUSTOM_DATA => {
                if let Value::Map(entries) = value {
                    self.doc.node_mut(id).custom_data = entries;
                } else {
                    log::warn!("ignoring non-map custom data on {}", self.doc.node(id).path);
                }
            }
            _ => match self.scoped_for(id) {
                Some((set, variant)) => {
                    self.variant_content_mut(id, &set, &variant)
                        .metadata
                        .insert(key.to_owned(), value);
                }
                None => {
                    self.doc.node_mut(id).metadata.insert(key.to_owned(), value);
                }
            },
        }
    }

    /// Writes one entry into the schema-free custom-data channel.
    pub fn set_custom_data(&mut self, id: NodeId, key: &str, value: Value) {
        let value = value.unwrap_unregistered();
        self.doc
            .node_mut(id)
            .custom_data
            .insert(key.to_owned(), value);
    }

    pub fn custom_data_of(&self, id: NodeId) -> &BTreeMap<String, Value> {
        &self.doc.node(id).custom_data
    }

    /// The attributes currently visible on a node, with selected-variant
    /// overlays applied.
    pub fn attributes_of(&self, id: NodeId) -> BTreeMap<String, AttributeData> {
        let node = self.doc.node(id);
        let mut attributes = node.attributes.clone();

        for set in node.variant_sets.values() {
            if let Some(selection) = &set.selection {
                if let Some(variant) = set.variant(selection) {
                    for (name, attribute) in &variant.content.attributes {
                        attributes.insert(name.clone(), attribute.clone());
                    }
                }
            }
        }

        attributes
    }

    /// Ensures an attribute with the given shape exists. An existing
    /// attribute of the same name keeps its current value.
    pub fn create_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        type_name: &str,
        variability: Variability,
        custom: bool,
    ) {
        let slot = match self.scoped_for(id) {
            Some((set, variant)) => &mut self.variant_content_mut(id, &set, &variant).attributes,
            None => &mut self.doc.node_mut(id).attributes,
        };

        slot.entry(name.to_owned()).or_insert(AttributeData {
            type_name: type_name.to_owned(),
            variability,
            custom,
            value: None,
        });
    }

    /// Sets an attribute's current value, creating a custom attribute with an
    /// inferred type if none was declared first.
    pub fn set_attribute_value(&mut self, id: NodeId, name: &str, value: Value) {
        let value = value.unwrap_unregistered();
        let inferred = infer_type_name(&value).to_owned();

        let slot = match self.scoped_for(id) {
            Some((set, variant)) => &mut self.variant_content_mut(id, &set, &variant).attributes,
            None => &mut self.doc.node_mut(id).attributes,
        };

        slot.entry(name.to_owned())
            .or_insert(AttributeData {
                type_name: inferred,
                variability: Variability::Varying,
                custom: true,
                value: None,
            })
            .value = Some(value);
    }

    /// The relationships currently visible on a node, with selected-variant
    /// overlays applied.
    pub fn relationships_of(&self, id: NodeId) -> BTreeMap<String, RelationshipData> {
        let node = self.doc.node(id);
        let mut relationships = node.relationships.clone();

        for set in node.variant_sets.values() {
            if let Some(selection) = &set.selection {
                if let Some(variant) = set.variant(selection) {
                    for (name, relationship) in &variant.content.relationships {
                        relationships.insert(name.clone(), relationship.clone());
                    }
                }
            }
        }

        relationships
    }

    /// Creates a relationship, replacing any existing relationship of the
    /// same name. Targets are de-duplicated in order.
    pub fn create_relationship(&mut self, id: NodeId, name: &str, targets: Vec<ScenePath>) {
        let relationship = RelationshipData::new(targets);

        match self.scoped_for(id) {
            Some((set, variant)) => {
                self.variant_content_mut(id, &set, &variant)
                    .relationships
                    .insert(name.to_owned(), relationship);
            }
            None => {
                self.doc
                    .node_mut(id)
                    .relationships
                    .insert(name.to_owned(), relationship);
            }
        }
    }

    pub fn variant_sets_of(&self, id: NodeId) -> &BTreeMap<String, VariantSet> {
        &self.doc.node(id).variant_sets
    }

    /// Ensures a variant set with the given name exists on the node.
    pub fn add_variant_set(&mut self, id: NodeId, set: &str) {
        self.doc
            .node_mut(id)
            .variant_sets
            .entry(set.to_owned())
            .or_default();
    }

    /// Adds a variant name to a set, creating the set if needed. Adding an
    /// already-declared name is a no-op.
    pub fn add_variant(&mut self, id: NodeId, set: &str, variant: &str) {
        let set = self
            .doc
            .node_mut(id)
            .variant_sets
            .entry(set.to_owned())
            .or_default();

        if !set.has_variant(variant) {
            set.variants.push(VariantData {
                name: variant.to_owned(),
                content: Default::default(),
            });
        }
    }

    pub fn variant_selection(&self, id: NodeId, set: &str) -> Option<String> {
        self.doc
            .node(id)
            .variant_sets
            .get(set)
            .and_then(|s| s.selection.clone())
    }

    /// Sets (or clears) a set's active selection. Selection is global to the
    /// set: this changes what every reader of the document sees.
    pub fn set_variant_selection(&mut self, id: NodeId, set: &str, selection: Option<&str>) {
        self.doc
            .node_mut(id)
            .variant_sets
            .entry(set.to_owned())
            .or_default()
            .selection = selection.map(str::to_owned);
    }

    /// Opens a variant editing scope on a node. Until the matching exit,
    /// mutations that target the node (or create children directly under it)
    /// are recorded as authored within `variant`.
    pub fn enter_variant_scope(
        &mut self,
        id: NodeId,
        set: &str,
        variant: &str,
    ) -> Result<ScopeToken, UnknownVariant> {
        let node = self.doc.node(id);
        let declared = node
            .variant_sets
            .get(set)
            .map_or(false, |s| s.has_variant(variant));

        if !declared {
            return Err(UnknownVariant {
                path: node.path.clone(),
                set: set.to_owned(),
                variant: variant.to_owned(),
            });
        }

        self.scopes.push(ScopeFrame {
            owner: id,
            set: set.to_owned(),
            variant: variant.to_owned(),
        });

        Ok(ScopeToken {
            depth: self.scopes.len(),
        })
    }

    /// Closes the scope opened by the given token, restoring the previous
    /// editing context. Scopes close in LIFO order.
    pub fn exit_variant_scope(&mut self, token: ScopeToken) {
        debug_assert_eq!(
            token.depth,
            self.scopes.len(),
            "variant scopes must be exited in LIFO order"
        );
        self.scopes.truncate(token.depth.saturating_sub(1));
    }

    /// Runs `body` with a variant editing scope entered, guaranteeing the
    /// scope is released afterwards.
    pub fn with_variant_scope<R>(
        &mut self,
        id: NodeId,
        set: &str,
        variant: &str,
        body: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, UnknownVariant> {
        let token = self.enter_variant_scope(id, set, variant)?;
        let result = body(self);
        self.exit_variant_scope(token);
        Ok(result)
    }

    fn scoped_for(&self, id: NodeId) -> Option<(String, String)> {
        self.scopes
            .last()
            .filter(|frame| frame.owner == id)
            .map(|frame| (frame.set.clone(), frame.variant.clone()))
    }

    fn variant_content_mut(
        &mut self,
        owner: NodeId,
        set: &str,
        variant: &str,
    ) -> &mut VariantContent {
        &mut self
            .doc
            .node_mut(owner)
            .variant_sets
            .get_mut(set)
            .expect("scope entry verified the variant set exists")
            .variant_mut(variant)
            .expect("scope entry verified the variant exists")
            .content
    }
}

fn subpath(path: &ScenePath, depth: usize) -> ScenePath {
    let mut current: Option<ScenePath> = None;

    for name in path.segments().take(depth) {
        current = Some(match current {
            None => ScenePath::root(name).expect("segments of a valid path are valid names"),
            Some(prefix) => prefix
                .child(name)
                .expect("segments of a valid path are valid names"),
        });
    }

    current.expect("scene paths always have at least one segment")
}

fn infer_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "double",
        Value::Bool(_) => "bool",
        Value::Vector(v) if v.len() == 3 => "double3",
        Value::Vector(_) => "doubleArray",
        Value::List(_) => "valueArray",
        Value::Map(_) => "dictionary",
        Value::Unregistered(inner) => infer_type_name(inner),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::document::DEFAULT_NODE_TYPE;

    fn path(source: &str) -> ScenePath {
        ScenePath::parse(source).unwrap()
    }

    #[test]
    fn define_node_creates_missing_ancestors() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");

        assert_eq!(tree.node(box_id).type_name, "Cube");
        let world = tree.get_node(&path("/World")).unwrap();
        assert_eq!(tree.node(world).type_name, DEFAULT_NODE_TYPE);
        assert_eq!(tree.visible_children(world), vec![box_id]);
    }

    #[test]
    fn define_node_is_idempotent() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let first = tree.define_node(&path("/World/Box"), "Cube");
        let second = tree.define_node(&path("/World/Box"), "Cube");

        assert_eq!(first, second);
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn scoped_children_are_only_visible_under_their_variant() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
        tree.add_variant(mesh, "materialVariant", "Metal");
        tree.add_variant(mesh, "materialVariant", "Plastic");
        tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));

        tree.with_variant_scope(mesh, "materialVariant", "Metal", |tree| {
            tree.define_node(&path("/World/Mesh/MetalShade"), "Material");
        })
        .unwrap();

        assert!(tree.get_node(&path("/World/Mesh/MetalShade")).is_some());

        tree.set_variant_selection(mesh, "materialVariant", Some("Plastic"));
        assert!(tree.get_node(&path("/World/Mesh/MetalShade")).is_none());

        tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));
        assert!(tree.get_node(&path("/World/Mesh/MetalShade")).is_some());
    }

    #[test]
    fn scoped_relationships_overlay_the_owner() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
        tree.add_variant(mesh, "materialVariant", "Metal");
        tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));

        tree.with_variant_scope(mesh, "materialVariant", "Metal", |tree| {
            tree.create_relationship(mesh, "boundMaterial", vec![path("/World/Metal")]);
        })
        .unwrap();

        assert!(tree.relationships_of(mesh).contains_key("boundMaterial"));
        assert!(tree.node(mesh).relationships.is_empty());

        tree.set_variant_selection(mesh, "materialVariant", None);
        assert!(!tree.relationships_of(mesh).contains_key("boundMaterial"));
    }

    #[test]
    fn entering_an_undeclared_variant_fails() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
        tree.add_variant(mesh, "materialVariant", "Metal");

        let err = tree
            .enter_variant_scope(mesh, "materialVariant", "Chrome")
            .unwrap_err();
        assert_eq!(err.variant, "Chrome");

        assert!(tree
            .enter_variant_scope(mesh, "lodVariant", "High")
            .is_err());
    }

    #[test]
    fn metadata_view_includes_intrinsic_entries() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");
        tree.set_metadata(box_id, "comment", Value::String("hi".to_owned()));
        tree.set_custom_data(box_id, "flavor", Value::String("sweet".to_owned()));

        let metadata = tree.metadata_of(box_id);
        assert_eq!(
            metadata.get(META_TYPE_NAME),
            Some(&Value::String("Cube".to_owned()))
        );
        assert_eq!(metadata.get("comment"), Some(&Value::String("hi".to_owned())));
        match metadata.get(META_CUSTOM_DATA) {
            Some(Value::Map(entries)) => {
                assert_eq!(entries.get("flavor"), Some(&Value::String("sweet".to_owned())));
            }
            other => panic!("expected a custom data map, got {:?}", other),
        }
    }

    #[test]
    fn set_metadata_writes_through_intrinsic_keys() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");
        tree.set_metadata(box_id, META_TYPE_NAME, Value::String("Sphere".to_owned()));
        assert_eq!(tree.node(box_id).type_name, "Sphere");
    }

    #[test]
    fn unregistered_values_are_unwrapped_on_write() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");
        tree.set_custom_data(
            box_id,
            "flavor",
            Value::Unregistered(Box::new(Value::Number(3.0))),
        );

        assert_eq!(
            tree.custom_data_of(box_id).get("flavor"),
            Some(&Value::Number(3.0))
        );
    }

    #[test]
    fn set_attribute_value_infers_a_custom_attribute() {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");
        tree.set_attribute_value(box_id, "weight", Value::Number(9.5));

        let attributes = tree.attributes_of(box_id);
        let weight = attributes.get("weight").unwrap();
        assert_eq!(weight.type_name, "double");
        assert!(weight.custom);
        assert_eq!(weight.value, Some(Value::Number(9.5)));
    }
}
