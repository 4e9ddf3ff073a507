use serde_json::{json, Value};
use std::path::PathBuf;

use crate::cli::utils::{load_trees, output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::record::Record;
use crate::error::ApiError;
use crate::models::CategoryFactory;
use crate::tree::{self, CHILDREN_FIELD};

/// Build every tree in the file without touching storage
pub fn handle(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let trees = load_trees(&file)?;
    let total = trees.len();

    let summaries = match check_trees(trees) {
        Ok(summaries) => summaries,
        Err(error) => {
            output_error(output_format, error.message(), Some(error.error_code()))?;
            anyhow::bail!("{} failed validation", file.display());
        }
    };

    if let OutputFormat::Text = output_format {
        for summary in &summaries {
            println!(
                "[{}] {}: {} node(s), depth {}",
                summary["index"],
                summary["name"].as_str().unwrap_or_default(),
                summary["nodes"],
                summary["depth"]
            );
        }
    }

    output_success(
        output_format,
        &format!("{} category tree(s) in {} are valid", total, file.display()),
        Some(json!({ "trees": summaries })),
    )
}

/// Apply the input rules `seed` applies, then build each tree.
///
/// Returns one summary per tree, or the first failure.
pub fn check_trees(trees: Vec<Value>) -> Result<Vec<Value>, ApiError> {
    let total = trees.len();
    Record::from_json_array(Value::Array(trees.clone()))?;

    let mut summaries = Vec::with_capacity(total);
    for (index, node) in trees.into_iter().enumerate() {
        let category = tree::build(&CategoryFactory, node, CHILDREN_FIELD).map_err(|error| {
            if total > 1 {
                error.rebase(&format!("$[{}]", index))
            } else {
                error
            }
        })?;

        summaries.push(json!({
            "index": index,
            "name": category.name,
            "nodes": category.node_count(),
            "depth": category.depth()
        }));
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_valid_trees() {
        let summaries = check_trees(vec![
            json!({ "name": "root", "children": [{ "name": "a", "children": [{ "name": "b" }] }] }),
            json!({ "name": "leaf" }),
        ])
        .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0]["nodes"], json!(3));
        assert_eq!(summaries[1]["name"], json!("leaf"));
    }

    #[test]
    fn top_level_system_field_fails_like_seed() {
        let err = check_trees(vec![json!({
            "name": "root",
            "created_at": "2020-01-01",
            "children": [{ "name": "a" }]
        })])
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert!(err.message().contains("created_at"));
    }

    #[test]
    fn failing_descendant_reports_indexed_path() {
        let err = check_trees(vec![
            json!({ "name": "ok" }),
            json!({ "name": "root", "children": [{ "name": "" }] }),
        ])
        .unwrap_err();

        assert_eq!(err.status_code(), 422);
        assert!(err.to_json()["field_errors"]["$[1].children[0]"].is_string());
    }
}
