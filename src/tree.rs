//! Recursive conversion of nested plain JSON into trees of typed models.
//!
//! The builder is a pure transform: it consumes the input, asks the factory
//! for one typed instance per node (children first, depth-first, in order)
//! and never touches storage.

use serde_json::Value;

use crate::models::{json_type_name, ModelError, ModelFactory};

/// Field holding sub-categories in category documents
pub const CHILDREN_FIELD: &str = "children";

/// Build a typed tree from `node`, recursing through `child_field`.
///
/// A missing, `null` or empty child field is the base case: the node is
/// wrapped as-is. The first failing node aborts the whole build.
pub fn build<F>(factory: &F, node: Value, child_field: &str) -> Result<F::Model, ModelError>
where
    F: ModelFactory + ?Sized,
{
    build_node(factory, node, child_field, "$")
}

/// Build every element of a child array, keeping input order.
///
/// Used when the parent itself is not a plain node (e.g. a pending record)
/// but its child field still needs expanding.
pub fn build_children<F>(
    factory: &F,
    items: Value,
    child_field: &str,
) -> Result<Vec<F::Model>, ModelError>
where
    F: ModelFactory + ?Sized,
{
    build_sequence(factory, items, child_field, "$")
}

fn build_node<F>(
    factory: &F,
    node: Value,
    child_field: &str,
    path: &str,
) -> Result<F::Model, ModelError>
where
    F: ModelFactory + ?Sized,
{
    let mut attributes = match node {
        Value::Object(map) => map,
        other => {
            return Err(ModelError::invalid(format!(
                "expected an object, found {}",
                json_type_name(&other)
            ))
            .at(path))
        }
    };

    let children = match attributes.remove(child_field) {
        Some(items) => build_sequence(factory, items, child_field, path)?,
        None => Vec::new(),
    };

    factory
        .construct(attributes, children)
        .map_err(|e| e.at(path))
}

fn build_sequence<F>(
    factory: &F,
    items: Value,
    child_field: &str,
    parent_path: &str,
) -> Result<Vec<F::Model>, ModelError>
where
    F: ModelFactory + ?Sized,
{
    match items {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let path = format!("{}.{}[{}]", parent_path, child_field, index);
                build_node(factory, item, child_field, &path)
            })
            .collect(),
        other => Err(ModelError::Structure {
            path: parent_path.to_string(),
            field: child_field.to_string(),
            found: json_type_name(&other),
        }),
    }
}
