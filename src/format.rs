//! The persisted scene-description format: a JSON document of typed nodes in
//! a path hierarchy, with per-node metadata, attributes, relationships, and
//! variant sets.
//!
//! These types mirror the file layout; conversion to and from the arena-based
//! `SceneDocument` is iterative so that deep scenes don't exhaust the stack.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::document::{
    AttributeData, DocumentMetadata, NodeData, NodeId, RelationshipData, SceneDocument,
    VariantContent, VariantData, VariantSet,
};
use crate::path::{InvalidPath, ScenePath};
use crate::value::Value;

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    #[serde(flatten)]
    pub metadata: DocumentMetadata,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<NodeFile>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFile {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_data: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeData>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipData>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variant_sets: BTreeMap<String, VariantSetFile>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeFile>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSetFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantFile>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFile {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeData>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipData>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeFile>,
}

/// Where a pending node should be attached once it has an arena id.
enum Attach {
    Root,
    Child(NodeId),
    Variant {
        owner: NodeId,
        set: String,
        variant: String,
    },
}

struct Pending {
    file: NodeFile,
    parent_path: Option<ScenePath>,
    attach: Attach,
}

impl DocumentFile {
    /// Flattens the nested file representation into an arena-backed document.
    /// Parents are always pushed before their children.
    pub fn into_document(self) -> Result<SceneDocument, InvalidPath> {
        let mut document = SceneDocument::new();
        document.metadata = self.metadata;

        let mut stack: Vec<Pending> = Vec::new();
        for file in self.roots.into_iter().rev() {
            stack.push(Pending {
                file,
                parent_path: None,
                attach: Attach::Root,
            });
        }

        while let Some(pending) = stack.pop() {
            let Pending {
                file,
                parent_path,
                attach,
            } = pending;

            let path = match &parent_path {
                None => ScenePath::root(&file.name)?,
                Some(parent) => parent.child(&file.name)?,
            };

            let mut node = NodeData::new(path.clone(), &file.type_name);
            node.metadata = file.metadata;
            node.custom_data = file.custom_data;
            node.attributes = file.attributes;
            node.relationships = file
                .relationships
                .into_iter()
                .map(|(name, rel)| (name, RelationshipData::new(rel.targets)))
                .collect();

            let mut variant_files = Vec::new();
            for (set_name, set_file) in file.variant_sets {
                let mut set = VariantSet {
                    variants: Vec::new(),
                    selection: set_file.selection,
                };

                for variant_file in set_file.variants {
                    if set.has_variant(&variant_file.name) {
                        continue;
                    }

                    set.variants.push(VariantData {
                        name: variant_file.name.clone(),
                        content: VariantContent {
                            children: Vec::new(),
                            metadata: variant_file.metadata,
                            attributes: variant_file.attributes,
                            relationships: variant_file.relationships,
                        },
                    });

                    variant_files.push((set_name.clone(), variant_file.name, variant_file.children));
                }

                node.variant_sets.insert(set_name, set);
            }

            let children = file.children;
            let id = document.push_node(node);

            match attach {
                Attach::Root => document.push_root(id),
                Attach::Child(parent) => document.node_mut(parent).children.push(id),
                Attach::Variant {
                    owner,
                    set,
                    variant,
                } => {
                    let set = document
                        .node_mut(owner)
                        .variant_sets
                        .get_mut(&set)
                        .expect("variant set was created before its children were scheduled");
                    set.variant_mut(&variant)
                        .expect("variant was created before its children were scheduled")
                        .content
                        .children
                        .push(id);
                }
            }

            // Scheduled in reverse so pops preserve authoring order.
            for (set, variant, variant_children) in variant_files.into_iter().rev() {
                for file in variant_children.into_iter().rev() {
                    stack.push(Pending {
                        file,
                        parent_path: Some(path.clone()),
                        attach: Attach::Variant {
                            owner: id,
                            set: set.clone(),
                            variant: variant.clone(),
                        },
                    });
                }
            }

            for file in children.into_iter().rev() {
                stack.push(Pending {
                    file,
                    parent_path: Some(path.clone()),
                    attach: Attach::Child(id),
                });
            }
        }

        Ok(document)
    }

    /// Rebuilds the nested file representation from the arena. Walks ids in
    /// reverse so every node's children are already built when it is visited
    /// (children always have larger ids than their parents).
    pub fn from_document(document: &SceneDocument) -> DocumentFile {
        let mut built: HashMap<NodeId, NodeFile> = HashMap::new();

        for id in document.node_ids().rev() {
            let node = document.node(id);

            let children = node
                .children
                .iter()
                .map(|child| {
                    built
                        .remove(child)
                        .expect("children are built before their parents")
                })
                .collect();

            let variant_sets = node
                .variant_sets
                .iter()
                .map(|(set_name, set)| {
                    let variants = set
                        .variants
                        .iter()
                        .map(|variant| VariantFile {
                            name: variant.name.clone(),
                            metadata: variant.content.metadata.clone(),
                            attributes: variant.content.attributes.clone(),
                            relationships: variant.content.relationships.clone(),
                            children: variant
                                .content
                                .children
                                .iter()
                                .map(|child| {
                                    built
                                        .remove(child)
                                        .expect("variant children are built before their owners")
                                })
                                .collect(),
                        })
                        .collect();

                    (
                        set_name.clone(),
                        VariantSetFile {
                            selection: set.selection.clone(),
                            variants,
                        },
                    )
                })
                .collect();

            built.insert(
                id,
                NodeFile {
                    name: node.name.clone(),
                    type_name: node.type_name.clone(),
                    metadata: node.metadata.clone(),
                    custom_data: node.custom_data.clone(),
                    attributes: node.attributes.clone(),
                    relationships: node.relationships.clone(),
                    variant_sets,
                    children,
                },
            );
        }

        DocumentFile {
            metadata: document.metadata.clone(),
            roots: document
                .roots()
                .iter()
                .map(|root| {
                    built
                        .remove(root)
                        .expect("roots are built before the forest is assembled")
                })
                .collect(),
        }
    }
}
