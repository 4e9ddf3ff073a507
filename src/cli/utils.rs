use anyhow::Context;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::cli::OutputFormat;

/// Read category trees from a `.json`, `.yaml` or `.yml` file.
///
/// A single top-level object is treated as a one-element array.
pub fn load_trees(path: &Path) -> anyhow::Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
    };

    match value {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![value]),
        other => anyhow::bail!(
            "{} must hold an object or an array of objects, found {}",
            path.display(),
            crate::models::json_type_name(&other)
        ),
    }
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_yaml_and_wraps_single_object() {
        let path = temp_file(
            "tree.yaml",
            "name: root\nchildren:\n  - name: a\n  - name: b\n",
        );

        let trees = load_trees(&path).unwrap();

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0]["children"][1]["name"], json!("b"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_scalar_documents() {
        let path = temp_file("bad.json", "42");
        assert!(load_trees(&path).is_err());
        fs::remove_file(path).ok();
    }
}
