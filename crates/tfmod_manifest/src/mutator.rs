//! Path-keyed insertion into the schema tree.
//!
//! Paths are dot-separated. A literal segment names a fixed property; the
//! `*` wildcard turns the node at that level into a dynamic object keyed by
//! the default key pattern. The wildcard can never be the terminal segment.

use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::schema::{DynamicObject, FixedObject, SchemaNode};

/// Insert `leaf` at `dot_path` inside the spec tree rooted at `spec`,
/// creating intermediate object nodes as needed.
///
/// When `mark_required` is set, the terminal segment's name is added to the
/// `required` set of the enclosing fixed object (never the dynamic wrapper).
/// Inserting at an existing name overwrites the previous entry.
pub fn insert_at_path(
    spec: &mut SchemaNode,
    dot_path: &str,
    leaf: SchemaNode,
    mark_required: bool,
) -> ManifestResult<()> {
    let segments: Vec<&str> = dot_path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ManifestError::InvalidPath(dot_path.to_string()));
    }
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| ManifestError::InvalidPath(dot_path.to_string()))?;
    if *last == "*" {
        return Err(ManifestError::WildcardTerminal);
    }

    debug!("Inserting '{}' into spec", dot_path);

    let mut node = spec;
    let mut trail = String::from("spec");

    for segment in parents {
        if *segment == "*" {
            let dynamic = ensure_dynamic(node, &trail)?;
            node = dynamic.value.as_mut();
            trail.push_str(".*");
        } else {
            let fixed = ensure_fixed(node, &trail)?;
            node = fixed
                .properties
                .entry(segment.to_string())
                .or_insert_with(SchemaNode::empty_object);
            trail.push('.');
            trail.push_str(segment);
        }
    }

    let parent = ensure_fixed(node, &trail)?;
    parent.properties.insert(last.to_string(), leaf);
    if mark_required {
        parent.required.insert(last.to_string());
    }
    Ok(())
}

/// Make `node` a fixed object, converting an empty object leaf in place.
///
/// A dynamic object here is a shape conflict; a scalar leaf in the way of a
/// deeper path is a hard error rather than a silent overwrite.
fn ensure_fixed<'a>(
    node: &'a mut SchemaNode,
    path: &str,
) -> ManifestResult<&'a mut FixedObject> {
    match node {
        SchemaNode::FixedObject(_) => {}
        SchemaNode::DynamicObject(_) => {
            return Err(ManifestError::ShapeConflict {
                path: path.to_string(),
                existing: "patternProperties",
                requested: "properties",
            });
        }
        SchemaNode::Leaf(leaf) => {
            if leaf_blocks_descent(leaf) {
                return Err(ManifestError::PathCollision {
                    path: path.to_string(),
                    found: leaf_shape_name(leaf).to_string(),
                });
            }
            let title = leaf.title.take();
            let description = leaf.description.take();
            *node = SchemaNode::FixedObject(FixedObject {
                title,
                description,
                ..FixedObject::default()
            });
        }
    }
    match node {
        SchemaNode::FixedObject(fixed) => Ok(fixed),
        _ => unreachable!("node was just made a fixed object"),
    }
}

/// Make `node` a dynamic object wrapping a fixed-object value.
///
/// A fixed object that already has properties (or required names) conflicts;
/// an empty one converts in place, since intermediate segments materialize
/// empty objects before the wildcard is seen.
fn ensure_dynamic<'a>(
    node: &'a mut SchemaNode,
    path: &str,
) -> ManifestResult<&'a mut DynamicObject> {
    match node {
        SchemaNode::DynamicObject(_) => {}
        SchemaNode::FixedObject(fixed) => {
            if !fixed.properties.is_empty() || !fixed.required.is_empty() {
                return Err(ManifestError::ShapeConflict {
                    path: path.to_string(),
                    existing: "properties",
                    requested: "patternProperties",
                });
            }
            let title = fixed.title.take();
            let description = fixed.description.take();
            let mut dynamic = DynamicObject::new(SchemaNode::empty_object());
            dynamic.title = title;
            dynamic.description = description;
            *node = SchemaNode::DynamicObject(dynamic);
        }
        SchemaNode::Leaf(leaf) => {
            if leaf_blocks_descent(leaf) {
                return Err(ManifestError::PathCollision {
                    path: path.to_string(),
                    found: leaf_shape_name(leaf).to_string(),
                });
            }
            let title = leaf.title.take();
            let description = leaf.description.take();
            let mut dynamic = DynamicObject::new(SchemaNode::empty_object());
            dynamic.title = title;
            dynamic.description = description;
            *node = SchemaNode::DynamicObject(dynamic);
        }
    }
    match node {
        SchemaNode::DynamicObject(dynamic) => Ok(dynamic),
        _ => unreachable!("node was just made a dynamic object"),
    }
}

/// A leaf blocks descent unless it is a bare object placeholder.
fn leaf_blocks_descent(leaf: &crate::schema::Leaf) -> bool {
    !matches!(
        leaf.base_type,
        None | Some(crate::schema::BaseType::Object)
    ) || leaf.enum_values.is_some()
        || leaf.default.is_some()
}

fn leaf_shape_name(leaf: &crate::schema::Leaf) -> &'static str {
    leaf.base_type.map(|t| t.as_str()).unwrap_or("untyped")
}
