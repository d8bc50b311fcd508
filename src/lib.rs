//! Core library behind the `scenestitch` binary: a scene-document model, a
//! merge engine that composes two documents into one, and a validator that
//! diffs the composition against its sources.

pub mod cli;

mod document;
mod format;
mod generate;
mod merge;
mod path;
mod tree;
mod validate;
mod value;

pub use crate::document::{
    AttributeData, DocumentError, DocumentMetadata, NodeData, NodeId, RelationshipData,
    SceneDocument, Variability, VariantContent, VariantData, VariantSet, DEFAULT_NODE_TYPE,
};
pub use crate::format::DocumentFile;
pub use crate::generate::generate_scene;
pub use crate::merge::{merge, MergeError};
pub use crate::path::{InvalidPath, ScenePath};
pub use crate::tree::{SceneTree, ScopeToken, UnknownVariant, META_CUSTOM_DATA, META_TYPE_NAME};
pub use crate::validate::{validate, Diagnostic};
pub use crate::value::{value_eq, Value};
