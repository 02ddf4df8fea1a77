//! # Document Loading
//!
//! Reads schema documents from disk and maps reference URIs to local files.
//!
//! ## Resolution Rules
//!
//! - `file://` URIs are read directly.
//! - `http://` and `https://` URIs are never fetched. The final path segment
//!   is looked up in the local schema directory, so a schema published under
//!   `https://example.org/schemas/defs.json` resolves to `<dir>/defs.json`.
//! - Anything else is unresolvable.
//!
//! Documents ending in `.yaml`/`.yml` are parsed as YAML, everything else as
//! JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use url::Url;

use dccv_core::SchemaError;

/// Hosts serving the JSON Schema metaschemas.
const METASCHEMA_HOST: &str = "json-schema.org";

/// Read and parse one schema document, choosing the parser by extension.
pub fn read_document(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => {
            serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))
        }
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}

/// Absolute `file://` URI for a path, relative paths anchored at the CWD.
pub fn file_uri(path: &Path) -> Result<Url, SchemaError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| SchemaError::load(path.display().to_string(), e.to_string()))?
            .join(path)
    };
    Url::from_file_path(&absolute).map_err(|()| {
        SchemaError::load(
            path.display().to_string(),
            "path cannot be expressed as a file URI",
        )
    })
}

/// Map a document URI to the local file that holds it.
pub fn locate(uri: &Url, local_dir: &Path) -> Result<PathBuf, String> {
    match uri.scheme() {
        "file" => uri
            .to_file_path()
            .map_err(|()| format!("'{uri}' is not a local file path")),
        "http" | "https" => {
            let filename = uri
                .path_segments()
                .and_then(|segments| segments.last())
                .filter(|name| !name.is_empty())
                .ok_or_else(|| format!("'{uri}' does not name a document"))?;
            Ok(local_dir.join(filename))
        }
        other => Err(format!("unsupported URI scheme '{other}' in '{uri}'")),
    }
}

/// Loads referenced documents once per URI and keeps them for the run.
#[derive(Debug)]
pub struct DocumentLoader {
    local_dir: PathBuf,
    cache: HashMap<Url, Value>,
}

impl DocumentLoader {
    /// Create a loader that resolves remote URIs against `local_dir`.
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Returns the directory remote URIs are resolved against.
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Seed the cache with an already-parsed document.
    pub fn insert(&mut self, uri: Url, document: Value) {
        self.cache.insert(uri, document);
    }

    /// Load the document at `uri` (fragment ignored).
    pub fn load(&mut self, uri: &Url) -> Result<&Value, String> {
        let mut key = uri.clone();
        key.set_fragment(None);

        if !self.cache.contains_key(&key) {
            let path = locate(&key, &self.local_dir)?;
            if !path.is_file() {
                return Err(format!("document {} does not exist", path.display()));
            }
            let document = read_document(&path)?;
            tracing::debug!(uri = %key, path = %path.display(), "loaded referenced document");
            self.cache.insert(key.clone(), document);
        }

        self.cache
            .get(&key)
            .ok_or_else(|| format!("document {key} vanished from cache"))
    }
}

/// Retriever handed to the validator so that nested `$ref`s resolve from
/// local files without network access.
#[derive(Debug, Clone)]
pub struct LocalRetriever {
    local_dir: PathBuf,
}

impl LocalRetriever {
    /// Create a retriever that resolves remote URIs against `local_dir`.
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
        }
    }
}

impl jsonschema::Retrieve for LocalRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let parsed = Url::parse(uri.as_str())?;

        // Draft metaschemas are never fetched; accept anything.
        if parsed.host_str() == Some(METASCHEMA_HOST) {
            return Ok(serde_json::json!({}));
        }

        let path = locate(&parsed, &self.local_dir)?;
        Ok(read_document(&path)?)
    }
}
