//! # Dereferencing
//!
//! Replaces every top-level property whose definition is a `$ref` with the
//! body it points to, and records where each body came from.
//!
//! ## Scope
//!
//! Exactly one level of indirection is resolved per property. A resolved
//! body that is itself a `$ref`, or that contains nested `$ref`s, is
//! substituted verbatim; the compiled validator follows those on its own.
//!
//! Supported reference forms:
//!
//! - `#/definitions/Name`: same document, JSON Pointer fragment.
//! - `defs.json#/definitions/Name`: document relative to the schema file.
//! - `https://host/path/defs.json#/...`: mapped to a local file by name
//!   (see [`crate::loader`]).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

use dccv_core::{PropertyNode, SchemaError, SchemaNode};

use crate::loader::{self, DocumentLoader};

/// A schema whose top-level properties have been dereferenced.
///
/// Holds both the raw document (handed to the validator) and the typed
/// property view (consumed by the flattener and the coercion engine).
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct DereferencedSchema {
    source: Url,
    document: Value,
    properties: IndexMap<String, PropertyNode>,
    required: Vec<String>,
    references: IndexMap<String, Url>,
}

impl DereferencedSchema {
    /// Dereference an in-memory document. Only same-document references
    /// resolve; the document is treated as living at `file:///schema.json`.
    pub fn from_value(document: Value) -> Result<Self, SchemaError> {
        let source = Url::parse("file:///schema.json")
            .map_err(|e| SchemaError::load("schema.json", e.to_string()))?;
        Dereferencer::new(DocumentLoader::new("/")).dereference(document, source)
    }

    /// URI of the schema document.
    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Directory that sibling schema documents are resolved from.
    pub fn base_dir(&self) -> PathBuf {
        self.source
            .to_file_path()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The dereferenced schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Typed property definitions, in document order.
    pub fn properties(&self) -> &IndexMap<String, PropertyNode> {
        &self.properties
    }

    /// Look up one property definition.
    pub fn property(&self, name: &str) -> Option<&PropertyNode> {
        self.properties.get(name)
    }

    /// The top-level `required` list.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether `name` appears in the top-level `required` list.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// The Resolved Reference Map: property name to the fragment-stripped
    /// URI of the document its definition was taken from.
    pub fn references(&self) -> &IndexMap<String, Url> {
        &self.references
    }

    /// Module label for a dereferenced property: the file stem of the
    /// document it was resolved from (`defs.json#/...` gives `defs`).
    pub fn module_label(&self, name: &str) -> Option<String> {
        self.references.get(name).and_then(module_of)
    }
}

fn module_of(uri: &Url) -> Option<String> {
    let last = uri.path_segments()?.last()?;
    Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Load a schema file and dereference its top-level properties.
///
/// # Errors
///
/// Returns [`SchemaError::SchemaLoad`] if the file cannot be read or has no
/// `properties` object, [`SchemaError::ReferenceResolution`] if a `$ref`
/// target cannot be located, and [`SchemaError::AmbiguousValueList`] if a
/// property declares both value-list keywords.
pub fn load_and_dereference(path: impl AsRef<Path>) -> Result<DereferencedSchema, SchemaError> {
    let path = path.as_ref();
    let source = loader::file_uri(path)?;
    let document = loader::read_document(path)
        .map_err(|reason| SchemaError::load(path.display().to_string(), reason))?;

    let local_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Dereferencer::new(DocumentLoader::new(local_dir)).dereference(document, source)
}

/// Resolves `$ref` property definitions against a [`DocumentLoader`].
#[derive(Debug)]
pub struct Dereferencer {
    loader: DocumentLoader,
}

impl Dereferencer {
    /// Create a dereferencer that loads external documents through `loader`.
    pub fn new(loader: DocumentLoader) -> Self {
        Self { loader }
    }

    /// Dereference `document`, which lives at `source`.
    pub fn dereference(
        &mut self,
        mut document: Value,
        source: Url,
    ) -> Result<DereferencedSchema, SchemaError> {
        let mut source = source;
        source.set_fragment(None);
        self.loader.insert(source.clone(), document.clone());

        let required = required_list(&document);

        let definitions = document
            .get_mut("properties")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| SchemaError::load(source.as_str(), "schema has no `properties` object"))?;

        let mut properties = IndexMap::with_capacity(definitions.len());
        let mut references = IndexMap::new();

        for (name, definition) in definitions.iter_mut() {
            let node = match SchemaNode::parse(name, definition)? {
                SchemaNode::Property(node) => node,
                SchemaNode::Reference(reference) => {
                    let (location, target) = self.resolve(name, &reference, &source)?;
                    tracing::debug!(property = %name, reference = %reference, document = %location, "resolved $ref");
                    *definition = target;
                    references.insert(name.clone(), location);
                    self.parse_resolved(name, definition)?
                }
            };
            properties.insert(name.clone(), node);
        }

        tracing::info!(
            properties = properties.len(),
            references = references.len(),
            schema = %source,
            "dereferenced schema"
        );

        Ok(DereferencedSchema {
            source,
            document,
            properties,
            required,
            references,
        })
    }

    fn parse_resolved(&self, name: &str, body: &Value) -> Result<PropertyNode, SchemaError> {
        match SchemaNode::parse(name, body)? {
            SchemaNode::Property(node) => Ok(node),
            SchemaNode::Reference(next) => {
                tracing::warn!(property = %name, reference = %next, "not following chained $ref");
                Ok(PropertyNode::default())
            }
        }
    }

    /// Resolve one reference, returning the fragment-stripped document URI
    /// and a copy of the target body.
    fn resolve(
        &mut self,
        property: &str,
        reference: &str,
        source: &Url,
    ) -> Result<(Url, Value), SchemaError> {
        let failure = |reason: String| SchemaError::ReferenceResolution {
            property: property.to_string(),
            reference: reference.to_string(),
            reason,
        };

        let (document_part, fragment) = reference.split_once('#').unwrap_or((reference, ""));

        let mut location = if document_part.is_empty() {
            source.clone()
        } else {
            source
                .join(document_part)
                .map_err(|e| failure(format!("invalid reference URI: {e}")))?
        };
        location.set_fragment(None);

        let document = self.loader.load(&location).map_err(&failure)?;
        let target = resolve_fragment(document, fragment).ok_or_else(|| {
            failure(format!("fragment '#{fragment}' not found in {location}"))
        })?;

        Ok((location, target.clone()))
    }
}

/// Resolve a JSON Pointer fragment. An empty fragment selects the document.
fn resolve_fragment<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    if fragment.is_empty() {
        Some(document)
    } else if fragment.starts_with('/') {
        document.pointer(fragment)
    } else {
        None
    }
}

fn required_list(document: &Value) -> Vec<String> {
    document
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
