use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::cli::utils::{load_trees, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::manager::DatabaseManager;
use crate::database::store::Document;
use crate::services::CategoryService;

/// Bulk-create the file's trees through the same pipeline the API uses
pub async fn handle(
    file: PathBuf,
    collection: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let config = config();
    let mut database = config.database.clone();
    if let Some(collection) = collection {
        database.collection = collection;
    }

    let store = DatabaseManager::connect(&database).await?;
    let service = CategoryService::new(store, database.collection.clone(), Some(config.observer_timeout()));
    let documents = seed_into(&service, &file).await?;

    let ids: Vec<String> = documents.iter().map(|doc| doc.id.to_string()).collect();
    output_success(
        output_format,
        &format!(
            "Seeded {} categor{} into '{}' ({:?} storage)",
            documents.len(),
            if documents.len() == 1 { "y" } else { "ies" },
            database.collection,
            database.backend
        ),
        Some(json!({ "collection": database.collection, "ids": ids })),
    )
}

/// Create every tree in `file`, or none of them
pub async fn seed_into(service: &CategoryService, file: &Path) -> anyhow::Result<Vec<Document>> {
    let trees = load_trees(file)?;
    service
        .bulk_create(Value::Array(trees))
        .await
        .map_err(|e| anyhow::anyhow!("Seeding {} failed: {}", file.display(), e))
}
