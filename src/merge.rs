//! The merge engine: recursively copies two source documents into one
//! destination document, preserving node identity by path and applying a
//! separate conflict policy per data category.
//!
//! Traversal runs over an explicit work list instead of the call stack, so
//! scene depth is bounded only by memory. Variant editing scopes are opened
//! and closed by dedicated work-list steps; the steps are scheduled so that
//! scopes always close in LIFO order.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::document::{NodeId, SceneDocument};
use crate::tree::{SceneTree, UnknownVariant, META_CUSTOM_DATA};
use crate::value::Value;

/// Metadata keys that bypass the ordinary merge policy and always travel
/// through the custom-data channel.
const RESERVED_SIDE_CHANNEL_KEYS: &[&str] = &["comment", "documentation"];

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to enter a variant editing scope")]
    Scope(#[from] UnknownVariant),
}

/// One unit of work for the merge traversal.
enum Step {
    /// Copy one source node (and schedule its subtree).
    Visit { src: NodeId },

    /// Open the same variant editing scope on both trees.
    EnterScope {
        src_owner: NodeId,
        dst_owner: NodeId,
        set: String,
        variant: String,
    },

    /// Close the most recently opened scope pair.
    ExitScope,
}

/// Copies every root-level node of `source_a`, then of `source_b`, into
/// `dest` at the same paths.
///
/// Sources are not read-only: mirroring a variant set's selection onto the
/// destination re-asserts it on the source as well, and selection is global
/// to the set. Callers must not assume source selection state is unchanged.
///
/// On error the destination may be partially written; there is no rollback.
pub fn merge(
    dest: &mut SceneDocument,
    source_a: &mut SceneDocument,
    source_b: &mut SceneDocument,
) -> Result<(), MergeError> {
    merge_document(dest, source_a)?;
    merge_document(dest, source_b)
}

fn merge_document(dest: &mut SceneDocument, source: &mut SceneDocument) -> Result<(), MergeError> {
    let mut dst = SceneTree::new(dest);
    let mut src = SceneTree::new(source);

    log::debug!(
        "merging {} root node(s) into destination",
        src.root_children().len()
    );

    let mut stack: Vec<Step> = Vec::new();
    let mut open_scopes = Vec::new();

    for &root in src.root_children().iter().rev() {
        stack.push(Step::Visit { src: root });
    }

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit { src: src_id } => {
                copy_node(&mut dst, &mut src, src_id, &mut stack);
            }
            Step::EnterScope {
                src_owner,
                dst_owner,
                set,
                variant,
            } => {
                let src_token = src.enter_variant_scope(src_owner, &set, &variant)?;
                let dst_token = dst.enter_variant_scope(dst_owner, &set, &variant)?;
                open_scopes.push((src_token, dst_token));
            }
            Step::ExitScope => {
                if let Some((src_token, dst_token)) = open_scopes.pop() {
                    dst.exit_variant_scope(dst_token);
                    src.exit_variant_scope(src_token);
                }
            }
        }
    }

    Ok(())
}

/// Copies one node's own data and schedules its children, both per selected
/// variant (inside paired editing scopes) and in the default scope.
fn copy_node(dst: &mut SceneTree, src: &mut SceneTree, src_id: NodeId, stack: &mut Vec<Step>) {
    let (path, type_name) = {
        let node = src.node(src_id);
        (node.path.clone(), node.type_name.clone())
    };

    log::trace!("copying node {}", path);
    let dst_id = dst.define_node(&path, &type_name);

    copy_metadata(dst, src, src_id, dst_id);
    copy_attributes(dst, src, src_id, dst_id);
    copy_relationships(dst, src, src_id, dst_id);

    // Declare every variant set and variant name on the destination, then
    // mirror the source's active selections onto both documents before any
    // children are enumerated: visibility depends on selection.
    let sets: Vec<(String, Vec<String>, Option<String>)> = src
        .variant_sets_of(src_id)
        .iter()
        .map(|(name, set)| {
            (
                name.clone(),
                set.variant_names().map(str::to_owned).collect(),
                set.selection.clone(),
            )
        })
        .collect();

    for (set, variants, selection) in &sets {
        dst.add_variant_set(dst_id, set);
        for variant in variants {
            dst.add_variant(dst_id, set, variant);
        }

        if let Some(selection) = selection {
            src.set_variant_selection(src_id, set, Some(selection.as_str()));
            dst.set_variant_selection(dst_id, set, Some(selection.as_str()));
        }
    }

    let children = src.visible_children(src_id);

    // Work-list scheduling is LIFO, so the phase that runs last is pushed
    // first: the default-scope pass over the children...
    for &child in children.iter().rev() {
        stack.push(Step::Visit { src: child });
    }

    // ...preceded by one scoped pass per selected variant set, in set order.
    // A child can appear in both phases; `define_node`'s already-authored
    // check keeps the second visit from duplicating it.
    for (set, _, selection) in sets.iter().rev() {
        let selection = match selection {
            Some(selection) => selection,
            None => continue,
        };

        stack.push(Step::ExitScope);
        for &child in children.iter().rev() {
            stack.push(Step::Visit { src: child });
        }
        stack.push(Step::EnterScope {
            src_owner: src_id,
            dst_owner: dst_id,
            set: set.clone(),
            variant: selection.clone(),
        });
    }
}

/// Applies the metadata policy: keys already present in the destination's
/// typed metadata are overwritten in place (so the last source wins), while
/// previously-unknown keys travel through the custom-data channel and keep
/// the first source's value.
fn copy_metadata(dst: &mut SceneTree, src: &SceneTree, src_id: NodeId, dst_id: NodeId) {
    let attribute_names: BTreeSet<String> = src.attributes_of(src_id).into_keys().collect();

    // Snapshot the destination's keys up front: writes made while iterating
    // must not promote later keys of the same pass to "already present".
    let dst_keys: BTreeSet<String> = dst.metadata_of(dst_id).into_keys().collect();

    for (key, value) in src.metadata_of(src_id) {
        let value = value.unwrap_unregistered();

        // Attribute data sometimes surfaces miscategorized as metadata; the
        // attribute pass copies it with its full type information instead.
        if attribute_names.contains(&key) {
            continue;
        }

        if RESERVED_SIDE_CHANNEL_KEYS.contains(&key.as_str()) {
            dst.set_custom_data(dst_id, &key, value);
            continue;
        }

        if key == META_CUSTOM_DATA {
            if let Value::Map(entries) = value {
                for (entry_key, entry_value) in entries {
                    if !dst.custom_data_of(dst_id).contains_key(&entry_key) {
                        dst.set_custom_data(dst_id, &entry_key, entry_value);
                    }
                }
            }
            continue;
        }

        if dst_keys.contains(&key) {
            dst.set_metadata(dst_id, &key, value);
        } else if !dst.custom_data_of(dst_id).contains_key(&key) {
            dst.set_custom_data(dst_id, &key, value);
        }
    }
}

/// Copies every source attribute that currently holds a truthy value,
/// overwriting the destination unconditionally. Attributes with empty or
/// falsy values are skipped.
fn copy_attributes(dst: &mut SceneTree, src: &SceneTree, src_id: NodeId, dst_id: NodeId) {
    for (name, attribute) in src.attributes_of(src_id) {
        let value = match attribute.value {
            Some(value) => value.unwrap_unregistered(),
            None => continue,
        };

        if !value.is_truthy() {
            continue;
        }

        dst.create_attribute(
            dst_id,
            &name,
            &attribute.type_name,
            attribute.variability,
            attribute.custom,
        );
        dst.set_attribute_value(dst_id, &name, value);
    }
}

/// Recreates every source relationship on the destination with exactly the
/// source's target list, replacing same-named relationships.
fn copy_relationships(dst: &mut SceneTree, src: &SceneTree, src_id: NodeId, dst_id: NodeId) {
    for (name, relationship) in src.relationships_of(src_id) {
        dst.create_relationship(dst_id, &name, relationship.targets);
    }
}
