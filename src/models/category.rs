use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{json_type_name, ModelError, ModelFactory};

/// A hierarchical category with an ordered list of sub-categories.
///
/// Anything besides `id`, `name` and `children` is kept verbatim in
/// `attributes` and flattened back out on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Category>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            children: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Number of categories in this tree, root included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Category::node_count).sum::<usize>()
    }

    /// Depth of this tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Category::depth).max().unwrap_or(0)
    }

    /// Give every node without an id a fresh one
    pub fn assign_missing_ids(&mut self) {
        if self.id.is_none() {
            self.id = Some(Uuid::new_v4());
        }
        for child in &mut self.children {
            child.assign_missing_ids();
        }
    }
}

/// Builds `Category` instances from plain JSON objects
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryFactory;

impl CategoryFactory {
    pub fn new() -> Self {
        Self
    }

    fn parse_name(value: Option<Value>) -> Result<String, ModelError> {
        match value {
            Some(Value::String(name)) if !name.trim().is_empty() => Ok(name),
            Some(Value::String(_)) => Err(ModelError::invalid("name must not be empty")),
            Some(Value::Null) | None => Err(ModelError::invalid("name is required")),
            Some(other) => Err(ModelError::invalid(format!(
                "name must be a string, found {}",
                json_type_name(&other)
            ))),
        }
    }

    fn parse_id(value: Option<Value>) -> Result<Option<Uuid>, ModelError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Uuid::parse_str(&raw)
                .map(Some)
                .map_err(|_| ModelError::invalid(format!("id '{}' is not a valid UUID", raw))),
            Some(other) => Err(ModelError::invalid(format!(
                "id must be a UUID string, found {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl ModelFactory for CategoryFactory {
    type Model = Category;

    fn construct(
        &self,
        mut attributes: Map<String, Value>,
        children: Vec<Category>,
    ) -> Result<Category, ModelError> {
        let name = Self::parse_name(attributes.remove("name"))?;
        let id = Self::parse_id(attributes.remove("id"))?;

        Ok(Category {
            id,
            name,
            children,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn construct_keeps_passthrough_attributes() {
        let category = CategoryFactory
            .construct(object(json!({ "name": "Books", "slug": "books", "rank": 3 })), vec![])
            .unwrap();

        assert_eq!(category.name, "Books");
        assert_eq!(category.id, None);
        assert_eq!(category.attributes.get("slug"), Some(&json!("books")));
        assert_eq!(category.attributes.get("rank"), Some(&json!(3)));
    }

    #[test]
    fn construct_rejects_bad_names() {
        let missing = CategoryFactory.construct(object(json!({ "slug": "x" })), vec![]);
        assert_eq!(missing.unwrap_err(), ModelError::invalid("name is required"));

        let blank = CategoryFactory.construct(object(json!({ "name": "  " })), vec![]);
        assert_eq!(blank.unwrap_err(), ModelError::invalid("name must not be empty"));

        let number = CategoryFactory.construct(object(json!({ "name": 42 })), vec![]);
        assert_eq!(
            number.unwrap_err(),
            ModelError::invalid("name must be a string, found number")
        );
    }

    #[test]
    fn construct_parses_supplied_id() {
        let id = Uuid::new_v4();
        let category = CategoryFactory
            .construct(object(json!({ "name": "A", "id": id.to_string() })), vec![])
            .unwrap();
        assert_eq!(category.id, Some(id));

        let bad = CategoryFactory.construct(object(json!({ "name": "A", "id": "nope" })), vec![]);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_flat_with_children() {
        let mut root = Category::new("root");
        root.attributes.insert("color".into(), json!("red"));
        root.children.push(Category::new("leaf"));

        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "root",
                "color": "red",
                "children": [{ "name": "leaf", "children": [] }]
            })
        );

        let back: Category = serde_json::from_value(value).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn assign_missing_ids_keeps_existing() {
        let keep = Uuid::new_v4();
        let mut root = Category::new("root");
        root.id = Some(keep);
        root.children.push(Category::new("a"));
        root.children[0].children.push(Category::new("b"));

        root.assign_missing_ids();

        assert_eq!(root.id, Some(keep));
        assert!(root.children[0].id.is_some());
        assert!(root.children[0].children[0].id.is_some());
        assert_eq!(root.node_count(), 3);
        assert_eq!(root.depth(), 3);
    }
}
