//! The validator engine: structurally diffs a composed document against the
//! two source documents it was merged from, producing a flat ordered list of
//! diagnostics.
//!
//! The traversal mirrors the merge engine's shape (work list, per-variant
//! selection switching) but compares instead of copying. Walking a variant
//! set switches its selection on both documents; the authored selections are
//! put back once the set's variants have been compared, so one source pass
//! cannot skew the next.

use std::collections::BTreeSet;
use std::fmt;

use crate::document::{NodeId, SceneDocument};
use crate::path::ScenePath;
use crate::tree::{SceneTree, META_CUSTOM_DATA};
use crate::value::{value_eq, Value};

/// One finding from a validation run. Diagnostics are data, not errors: a
/// run always walks every node and accumulates everything it finds.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MissingNode {
        path: ScenePath,
    },
    TypeMismatch {
        path: ScenePath,
        source: String,
        composed: String,
    },
    MetadataMismatch {
        path: ScenePath,
        key: String,
        source: Value,
        composed: Option<Value>,
    },
    MissingRelationship {
        path: ScenePath,
        name: String,
    },
    RelationshipTargetsDiffer {
        path: ScenePath,
        name: String,
        source: Vec<ScenePath>,
        composed: Vec<ScenePath>,
    },
    ExtraRelationship {
        path: ScenePath,
        name: String,
    },
    MissingVariantSet {
        path: ScenePath,
        set: String,
    },
    ExtraVariantSet {
        path: ScenePath,
        set: String,
    },
    MissingVariant {
        path: ScenePath,
        set: String,
        variant: String,
    },
    ExtraVariant {
        path: ScenePath,
        set: String,
        variant: String,
    },
    SelectionMismatch {
        path: ScenePath,
        set: String,
        source: Option<String>,
        composed: Option<String>,
    },
    MissingVariantChild {
        path: ScenePath,
        set: String,
        variant: String,
        child: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Diagnostic::MissingNode { path } => write!(formatter, "Missing node {}", path),
            Diagnostic::TypeMismatch {
                path,
                source,
                composed,
            } => write!(
                formatter,
                "Type mismatch at {}: source={} vs composed={}",
                path, source, composed
            ),
            Diagnostic::MetadataMismatch {
                path,
                key,
                source,
                composed,
            } => write!(
                formatter,
                "Metadata mismatch at {}: '{}' source={:?} vs composed={:?}",
                path, key, source, composed
            ),
            Diagnostic::MissingRelationship { path, name } => {
                write!(formatter, "Missing relationship '{}' at {}", name, path)
            }
            Diagnostic::RelationshipTargetsDiffer {
                path,
                name,
                source,
                composed,
            } => write!(
                formatter,
                "Relationship targets differ at {}: {} source={:?} vs composed={:?}",
                path,
                name,
                source.iter().map(ScenePath::to_string).collect::<Vec<_>>(),
                composed.iter().map(ScenePath::to_string).collect::<Vec<_>>(),
            ),
            Diagnostic::ExtraRelationship { path, name } => {
                write!(formatter, "Extra relationship '{}' at {} in composed", name, path)
            }
            Diagnostic::MissingVariantSet { path, set } => {
                write!(formatter, "Missing variant set '{}' at {}", set, path)
            }
            Diagnostic::ExtraVariantSet { path, set } => {
                write!(formatter, "Extra variant set '{}' at {}", set, path)
            }
            Diagnostic::MissingVariant { path, set, variant } => {
                write!(formatter, "Missing variant '{}' in set '{}' at {}", variant, set, path)
            }
            Diagnostic::ExtraVariant { path, set, variant } => {
                write!(formatter, "Extra variant '{}' in set '{}' at {}", variant, set, path)
            }
            Diagnostic::SelectionMismatch {
                path,
                set,
                source,
                composed,
            } => write!(
                formatter,
                "Variant selection mismatch in '{}' at {}: source='{}' vs composed='{}'",
                set,
                path,
                source.as_deref().unwrap_or(""),
                composed.as_deref().unwrap_or(""),
            ),
            Diagnostic::MissingVariantChild {
                path,
                set,
                variant,
                child,
            } => write!(
                formatter,
                "Missing child '{}' under variant '{}' of set '{}' at {}",
                child, variant, set, path
            ),
        }
    }
}

/// One unit of work for the validation traversal.
enum Step {
    /// Compare one source node against the destination node at its path.
    Visit { src: NodeId },

    /// Select a common variant on both documents, then compare the source's
    /// now-visible children against the destination's.
    SelectVariant {
        owner: NodeId,
        set: String,
        variant: String,
    },

    /// Put a set's selections back the way they were before its variants
    /// were walked, so later passes compare against the authored state
    /// instead of whichever variant happened to be walked last.
    RestoreSelection {
        owner: NodeId,
        set: String,
        source: Option<String>,
        composed: Option<String>,
    },

    /// Recurse into a node's ordinary children. Runs after the node's
    /// variant passes so the enumeration sees their selection changes.
    VisitChildren { src: NodeId },
}

/// Compares `dest` against each source document in turn and returns every
/// finding. The run signals failure iff the returned list is non-empty.
///
/// Walking variants re-selects them on both the source and the destination
/// mid-run; selections are restored set by set, but callers must not read
/// the documents concurrently with a validation run.
pub fn validate(
    dest: &mut SceneDocument,
    source_a: &mut SceneDocument,
    source_b: &mut SceneDocument,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    {
        let mut dst = SceneTree::new(dest);
        let mut a = SceneTree::new(source_a);
        let mut b = SceneTree::new(source_b);

        validate_source(&mut dst, &mut a, &b, &mut diagnostics);
        validate_source(&mut dst, &mut b, &a, &mut diagnostics);
    }

    log::debug!("validation produced {} diagnostic(s)", diagnostics.len());
    dedupe_extras(diagnostics)
}

fn validate_source(
    dst: &mut SceneTree,
    src: &mut SceneTree,
    other: &SceneTree,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut stack: Vec<Step> = Vec::new();

    for &root in src.root_children().iter().rev() {
        stack.push(Step::Visit { src: root });
    }

    while let Some(step) = stack.pop() {
        match step {
            Step::Visit { src: src_id } => {
                visit_node(dst, src, other, src_id, &mut stack, diagnostics);
            }
            Step::SelectVariant {
                owner,
                set,
                variant,
            } => {
                select_and_compare_children(dst, src, owner, &set, &variant, &mut stack, diagnostics);
            }
            Step::RestoreSelection {
                owner,
                set,
                source,
                composed,
            } => {
                let path = src.node(owner).path.clone();
                src.set_variant_selection(owner, &set, source.as_deref());
                if let Some(dst_id) = dst.get_node(&path) {
                    dst.set_variant_selection(dst_id, &set, composed.as_deref());
                }
            }
            Step::VisitChildren { src: src_id } => {
                for &child in src.visible_children(src_id).iter().rev() {
                    stack.push(Step::Visit { src: child });
                }
            }
        }
    }
}

fn visit_node(
    dst: &mut SceneTree,
    src: &SceneTree,
    other: &SceneTree,
    src_id: NodeId,
    stack: &mut Vec<Step>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let path = src.node(src_id).path.clone();

    let dst_id = match dst.get_node(&path) {
        Some(id) => id,
        None => {
            diagnostics.push(Diagnostic::MissingNode { path });
            return;
        }
    };

    let src_type = &src.node(src_id).type_name;
    let dst_type = &dst.node(dst_id).type_name;
    if src_type != dst_type {
        diagnostics.push(Diagnostic::TypeMismatch {
            path: path.clone(),
            source: src_type.clone(),
            composed: dst_type.clone(),
        });
    }

    validate_metadata(dst, src, src_id, dst_id, &path, diagnostics);
    validate_relationships(dst, src, other, src_id, dst_id, &path, diagnostics);
    let variant_work = validate_variant_sets(dst, src, other, src_id, dst_id, &path, diagnostics);

    // Ordinary children are enumerated only after every variant pass has
    // run and selections have been restored.
    stack.push(Step::VisitChildren { src: src_id });

    for work in variant_work.into_iter().rev() {
        stack.push(Step::RestoreSelection {
            owner: src_id,
            set: work.set.clone(),
            source: work.source_selection,
            composed: work.composed_selection,
        });

        for variant in work.common_variants.into_iter().rev() {
            stack.push(Step::SelectVariant {
                owner: src_id,
                set: work.set.clone(),
                variant,
            });
        }
    }
}

/// The portion of one variant set that both sides declare, plus the
/// selections to put back once its variants have been walked.
struct VariantWork {
    set: String,
    common_variants: Vec<String>,
    source_selection: Option<String>,
    composed_selection: Option<String>,
}

/// Compares every source metadata entry against the destination's effective
/// value for that key. Keys the merge legally routed into the custom-data
/// channel resolve through it, so a faithful merge compares clean.
fn validate_metadata(
    dst: &SceneTree,
    src: &SceneTree,
    src_id: NodeId,
    dst_id: NodeId,
    path: &ScenePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let dst_metadata = dst.metadata_of(dst_id);
    let dst_custom = dst.custom_data_of(dst_id);

    for (key, value) in src.metadata_of(src_id) {
        let value = value.unwrap_unregistered();

        if key == META_CUSTOM_DATA {
            // The destination channel may carry entries contributed by the
            // other source; compare entry-wise rather than whole-map.
            if let Value::Map(entries) = value {
                for (entry_key, entry_value) in entries {
                    let composed = dst_custom.get(&entry_key);
                    if !composed.map_or(false, |c| value_eq(&entry_value, c)) {
                        diagnostics.push(Diagnostic::MetadataMismatch {
                            path: path.clone(),
                            key: format!("{}:{}", META_CUSTOM_DATA, entry_key),
                            source: entry_value,
                            composed: composed.cloned(),
                        });
                    }
                }
            }
            continue;
        }

        let composed = dst_metadata
            .get(&key)
            .or_else(|| dst_custom.get(&key))
            .cloned();

        if !composed.as_ref().map_or(false, |c| value_eq(&value, c)) {
            diagnostics.push(Diagnostic::MetadataMismatch {
                path: path.clone(),
                key,
                source: value,
                composed,
            });
        }
    }
}

fn validate_relationships(
    dst: &SceneTree,
    src: &SceneTree,
    other: &SceneTree,
    src_id: NodeId,
    dst_id: NodeId,
    path: &ScenePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let src_rels = src.relationships_of(src_id);
    let dst_rels = dst.relationships_of(dst_id);

    for (name, relationship) in &src_rels {
        match dst_rels.get(name) {
            None => diagnostics.push(Diagnostic::MissingRelationship {
                path: path.clone(),
                name: name.clone(),
            }),
            Some(composed) => {
                let src_targets: BTreeSet<&ScenePath> = relationship.targets.iter().collect();
                let dst_targets: BTreeSet<&ScenePath> = composed.targets.iter().collect();

                if src_targets != dst_targets {
                    diagnostics.push(Diagnostic::RelationshipTargetsDiffer {
                        path: path.clone(),
                        name: name.clone(),
                        source: relationship.targets.clone(),
                        composed: composed.targets.clone(),
                    });
                }
            }
        }
    }

    // A name that only the other source contributed is not extra; without
    // this check every cross-source relationship would be flagged.
    let other_names: BTreeSet<String> = other
        .get_node(path)
        .map(|id| other.relationships_of(id).into_keys().collect())
        .unwrap_or_default();

    for name in dst_rels.keys() {
        if !src_rels.contains_key(name) && !other_names.contains(name) {
            diagnostics.push(Diagnostic::ExtraRelationship {
                path: path.clone(),
                name: name.clone(),
            });
        }
    }
}

/// Diffs variant-set structure and selections, returning the per-set list of
/// common variants whose contents still need walking.
fn validate_variant_sets(
    dst: &SceneTree,
    src: &SceneTree,
    other: &SceneTree,
    src_id: NodeId,
    dst_id: NodeId,
    path: &ScenePath,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<VariantWork> {
    let src_sets = src.variant_sets_of(src_id);
    let dst_sets = dst.variant_sets_of(dst_id);
    let other_sets = other.get_node(path).map(|id| other.variant_sets_of(id));

    for set in src_sets.keys() {
        if !dst_sets.contains_key(set) {
            diagnostics.push(Diagnostic::MissingVariantSet {
                path: path.clone(),
                set: set.clone(),
            });
        }
    }

    for set in dst_sets.keys() {
        let contributed = other_sets.map_or(false, |sets| sets.contains_key(set));
        if !src_sets.contains_key(set) && !contributed {
            diagnostics.push(Diagnostic::ExtraVariantSet {
                path: path.clone(),
                set: set.clone(),
            });
        }
    }

    let mut variant_work = Vec::new();

    for (set_name, src_set) in src_sets {
        let dst_set = match dst_sets.get(set_name) {
            Some(dst_set) => dst_set,
            None => continue,
        };

        for variant in src_set.variant_names() {
            if !dst_set.has_variant(variant) {
                diagnostics.push(Diagnostic::MissingVariant {
                    path: path.clone(),
                    set: set_name.clone(),
                    variant: variant.to_owned(),
                });
            }
        }

        for variant in dst_set.variant_names() {
            let contributed = other_sets
                .and_then(|sets| sets.get(set_name))
                .map_or(false, |set| set.has_variant(variant));

            if !src_set.has_variant(variant) && !contributed {
                diagnostics.push(Diagnostic::ExtraVariant {
                    path: path.clone(),
                    set: set_name.clone(),
                    variant: variant.to_owned(),
                });
            }
        }

        if src_set.selection != dst_set.selection {
            diagnostics.push(Diagnostic::SelectionMismatch {
                path: path.clone(),
                set: set_name.clone(),
                source: src_set.selection.clone(),
                composed: dst_set.selection.clone(),
            });
        }

        let common: Vec<String> = src_set
            .variant_names()
            .filter(|variant| dst_set.has_variant(variant))
            .map(str::to_owned)
            .collect();

        if !common.is_empty() {
            variant_work.push(VariantWork {
                set: set_name.clone(),
                common_variants: common,
                source_selection: src_set.selection.clone(),
                composed_selection: dst_set.selection.clone(),
            });
        }
    }

    variant_work
}

fn select_and_compare_children(
    dst: &mut SceneTree,
    src: &mut SceneTree,
    owner: NodeId,
    set: &str,
    variant: &str,
    stack: &mut Vec<Step>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let path = src.node(owner).path.clone();

    src.set_variant_selection(owner, set, Some(variant));
    let dst_id = match dst.get_node(&path) {
        Some(id) => id,
        None => return,
    };
    dst.set_variant_selection(dst_id, set, Some(variant));

    let mut to_visit = Vec::new();

    for child in src.visible_children(owner) {
        let child_path = &src.node(child).path;

        if dst.get_node(child_path).is_some() {
            to_visit.push(child);
        } else {
            diagnostics.push(Diagnostic::MissingVariantChild {
                path: path.clone(),
                set: set.to_owned(),
                variant: variant.to_owned(),
                child: src.node(child).name.clone(),
            });
        }
    }

    for &child in to_visit.iter().rev() {
        stack.push(Step::Visit { src: child });
    }
}

fn is_extra(diagnostic: &Diagnostic) -> bool {
    matches!(
        diagnostic,
        Diagnostic::ExtraRelationship { .. }
            | Diagnostic::ExtraVariantSet { .. }
            | Diagnostic::ExtraVariant { .. }
    )
}

/// The extra-content checks run once per source pass, so a finding that
/// neither source can explain shows up twice; collapse it to one.
fn dedupe_extras(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut kept: Vec<Diagnostic> = Vec::with_capacity(diagnostics.len());

    for diagnostic in diagnostics {
        if is_extra(&diagnostic) && kept.contains(&diagnostic) {
            continue;
        }
        kept.push(diagnostic);
    }

    kept
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::document::Variability;
    use crate::merge::merge;

    fn path(source: &str) -> ScenePath {
        ScenePath::parse(source).unwrap()
    }

    fn single_box_source() -> SceneDocument {
        let mut doc = SceneDocument::new();
        let mut tree = SceneTree::new(&mut doc);

        let box_id = tree.define_node(&path("/World/Box"), "Cube");
        tree.set_metadata(box_id, "comment", Value::String("hello".to_owned()));
        tree.create_relationship(box_id, "boundMaterial", vec![path("/World/Mat1")]);
        tree.create_attribute(box_id, "size", "double", Variability::Varying, false);
        tree.set_attribute_value(box_id, "size", Value::Number(2.0));

        doc
    }

    #[test]
    fn a_faithful_merge_validates_clean() {
        let mut a = single_box_source();
        let mut b = single_box_source();
        let mut dest = SceneDocument::new();

        merge(&mut dest, &mut a, &mut b).unwrap();
        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    }

    #[test]
    fn merging_a_document_with_itself_is_idempotent() {
        let mut a = single_box_source();
        {
            let mut tree = SceneTree::new(&mut a);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.add_variant(mesh, "materialVariant", "Plastic");
            tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));
            tree.with_variant_scope(mesh, "materialVariant", "Metal", |tree| {
                tree.define_node(&path("/World/Mesh/MetalShade"), "Material");
            })
            .unwrap();
        }
        let mut b = a.clone();
        let mut dest = SceneDocument::new();

        merge(&mut dest, &mut a, &mut b).unwrap();
        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);

        // The double visit must not have duplicated any child either.
        let tree = SceneTree::new(&mut dest);
        let world = tree.get_node(&path("/World")).unwrap();
        let names: Vec<String> = tree
            .visible_children(world)
            .into_iter()
            .map(|child| tree.node(child).name.clone())
            .collect();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
    }

    #[test]
    fn a_missing_relationship_is_reported_exactly_once() {
        let mut a = single_box_source();
        let mut b = SceneDocument::new();
        let mut dest = SceneDocument::new();

        merge(&mut dest, &mut a, &mut b).unwrap();

        let box_id = SceneTree::new(&mut dest)
            .get_node(&path("/World/Box"))
            .unwrap();
        dest.node_mut(box_id).relationships.remove("boundMaterial");

        let diagnostics = validate(&mut dest, &mut a, &mut b);
        let expected = vec![Diagnostic::MissingRelationship {
            path: path("/World/Box"),
            name: "boundMaterial".to_owned(),
        }];
        assert_eq!(diagnostics, expected);
    }

    #[test]
    fn an_unexplained_extra_relationship_is_reported_exactly_once() {
        let mut a = single_box_source();
        let mut b = single_box_source();
        let mut dest = SceneDocument::new();

        merge(&mut dest, &mut a, &mut b).unwrap();
        {
            let mut tree = SceneTree::new(&mut dest);
            let box_id = tree.get_node(&path("/World/Box")).unwrap();
            tree.create_relationship(box_id, "proxyTarget", vec![path("/World/Proxy")]);
        }

        let diagnostics = validate(&mut dest, &mut a, &mut b);
        let expected = vec![Diagnostic::ExtraRelationship {
            path: path("/World/Box"),
            name: "proxyTarget".to_owned(),
        }];
        assert_eq!(diagnostics, expected);
    }

    #[test]
    fn relationships_contributed_by_the_other_source_are_not_extra() {
        let mut a = single_box_source();

        // B shares the path but adds its own relationship.
        let mut b = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut b);
            let box_id = tree.define_node(&path("/World/Box"), "Cube");
            tree.create_relationship(box_id, "proxyTarget", vec![path("/World/Proxy")]);
        }

        let mut dest = SceneDocument::new();
        merge(&mut dest, &mut a, &mut b).unwrap();
        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    }

    #[test]
    fn a_missing_subtree_is_reported_once_at_its_root() {
        let mut a = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut a);
            tree.define_node(&path("/World/Box/Lid"), "Cube");
        }
        let mut b = SceneDocument::new();

        // Destination only has /World.
        let mut dest = SceneDocument::new();
        SceneTree::new(&mut dest).define_node(&path("/World"), "Transform");

        let diagnostics = validate(&mut dest, &mut a, &mut b);
        let expected = vec![Diagnostic::MissingNode {
            path: path("/World/Box"),
        }];
        assert_eq!(diagnostics, expected);
    }

    #[test]
    fn type_and_selection_mismatches_are_reported() {
        let mut a = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut a);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));
        }
        let mut b = SceneDocument::new();

        let mut dest = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut dest);
            let mesh = tree.define_node(&path("/World/Mesh"), "PointInstancer");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.set_variant_selection(mesh, "materialVariant", None);
        }

        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.contains(&Diagnostic::TypeMismatch {
            path: path("/World/Mesh"),
            source: "Mesh".to_owned(),
            composed: "PointInstancer".to_owned(),
        }));
        assert!(diagnostics.contains(&Diagnostic::SelectionMismatch {
            path: path("/World/Mesh"),
            set: "materialVariant".to_owned(),
            source: Some("Metal".to_owned()),
            composed: None,
        }));
    }

    #[test]
    fn missing_variant_children_are_reported() {
        let mut a = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut a);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));
            tree.with_variant_scope(mesh, "materialVariant", "Metal", |tree| {
                tree.define_node(&path("/World/Mesh/MetalShade"), "Material");
            })
            .unwrap();
        }
        let mut b = SceneDocument::new();

        let mut dest = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut dest);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.set_variant_selection(mesh, "materialVariant", Some("Metal"));
        }

        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.contains(&Diagnostic::MissingVariantChild {
            path: path("/World/Mesh"),
            set: "materialVariant".to_owned(),
            variant: "Metal".to_owned(),
            child: "MetalShade".to_owned(),
        }));
    }

    #[test]
    fn missing_and_extra_variants_are_reported() {
        let mut a = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut a);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.add_variant(mesh, "materialVariant", "Plastic");
        }
        let mut b = SceneDocument::new();

        let mut dest = SceneDocument::new();
        {
            let mut tree = SceneTree::new(&mut dest);
            let mesh = tree.define_node(&path("/World/Mesh"), "Mesh");
            tree.add_variant(mesh, "materialVariant", "Metal");
            tree.add_variant(mesh, "materialVariant", "Glass");
        }

        let diagnostics = validate(&mut dest, &mut a, &mut b);

        assert!(diagnostics.contains(&Diagnostic::MissingVariant {
            path: path("/World/Mesh"),
            set: "materialVariant".to_owned(),
            variant: "Plastic".to_owned(),
        }));
        assert!(diagnostics.contains(&Diagnostic::ExtraVariant {
            path: path("/World/Mesh"),
            set: "materialVariant".to_owned(),
            variant: "Glass".to_owned(),
        }));
    }
}
