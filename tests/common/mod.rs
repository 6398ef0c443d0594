//! Shared fixtures for integration tests.
//!
//! Every test gets its own temporary docs directory and its own [`DocState`],
//! so tests never share an index.

use apidocs_mcp::DocState;
use apidocs_mcp::sources::SourceConfig;
use rstest::fixture;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const STORAGE_BLUEPRINT: &str = r#"FORMAT: 1A
HOST: https://connection.keboola.com

# Storage API

# Group Buckets

## Buckets Collection [/v2/storage/buckets]

### List Buckets [GET]
Lists all buckets in the project.

+ Response 200 (application/json)

        [{"id": "in.c-main"}]

### Create Bucket [POST]

+ Parameters
    + name (string, required) - Bucket name
    + stage (string, optional) - Bucket stage, `in` or `out`

+ Response 201

# Group Tables

## Tables [/v2/storage/buckets/{bucket_id}/tables]

### Create Table [POST]
Creates a table from CSV data.

+ Parameters
    + bucket_id (string, required) - Bucket identifier
    + name (string, required) - Table name

## Table [/v2/storage/tables/{table_id}]

### Table Detail [GET]

### Drop Table [DELETE]
"#;

pub const QUEUE_OPENAPI: &str = r#"openapi: 3.0.1
info:
  title: Queue API
  version: "1.0"
servers:
  - url: https://queue.keboola.com
paths:
  /jobs:
    get:
      tags: [Jobs]
      summary: List jobs
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            default: 100
    post:
      tags: [Jobs]
      summary: Create job
      requestBody:
        content:
          application/json:
            example:
              component: keboola.ex-db-snowflake
  /jobs/{jobId}:
    get:
      tags: [Jobs]
      summary: Job detail
      parameters:
        - name: jobId
          in: path
          required: true
      responses:
        "200":
          description: OK
          content:
            application/json:
              example:
                id: "123"
                status: success
"#;

pub const BROKEN_OPENAPI: &str = r#"{"paths": {"/broken": "#;

/// A temporary docs directory removed on drop.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempDocs {
    temp: TempDir,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempDocs {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Writes a file, creating parent directories.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    pub fn config(&self) -> SourceConfig {
        SourceConfig::new(self.path())
    }
}

impl Default for TempDocs {
    fn default() -> Self {
        Self::new()
    }
}

/// Docs directory with the Storage (Blueprint) and Queue (OpenAPI) sources.
#[fixture]
pub fn sample_docs() -> TempDocs {
    let docs = TempDocs::new();
    docs.create_file("storage-api.apib", STORAGE_BLUEPRINT);
    docs.create_file("openapi/queue.yaml", QUEUE_OPENAPI);
    docs
}

/// A loaded [`DocState`] plus the directory it was loaded from.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct LoadedDocs {
    pub docs: TempDocs,
    pub state: Arc<DocState>,
}

impl LoadedDocs {
    pub async fn load(docs: TempDocs) -> Self {
        let (state, _) = DocState::load(docs.config())
            .await
            .expect("Failed to load sample docs");
        Self {
            docs,
            state: Arc::new(state),
        }
    }
}
