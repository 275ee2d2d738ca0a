// crates/policy-wrapper-core/src/document.rs
// ============================================================================
// Module: Document Tree
// Description: Structured manifest documents and their mutation primitives.
// Purpose: Provide lookup-or-create, set, append, and annotation helpers.
// Dependencies: serde, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! A [`Document`] is one Kubernetes-style resource descriptor held as a YAML
//! mapping. The engine only needs a handful of tree primitives: read the
//! identifying metadata, look up or create nested fields, set a field, append
//! to a list, and clear annotations. Every mutation that walks a path fails
//! with a [`DocumentError`] naming the offending field instead of silently
//! replacing foreign data.
//!
//! Invariants:
//! - The document root is always a mapping.
//! - Missing or `null` path segments are created on demand; present segments
//!   of the wrong shape are never overwritten.
//!
//! Security posture: documents come from an untrusted pipeline stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Mapping;
use serde_yaml::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Top-level metadata field.
const METADATA_FIELD: &str = "metadata";
/// Annotation map field under metadata.
const ANNOTATIONS_FIELD: &str = "annotations";
/// Name field under metadata.
const NAME_FIELD: &str = "name";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Document tree parsing and mutation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A field path with no segments was supplied.
    #[error("field path must not be empty")]
    EmptyPath,
    /// A node along the path exists but is not a mapping.
    #[error("field `{path}` is not a mapping")]
    NotAMapping {
        /// Dotted path of the offending node.
        path: String,
    },
    /// The leaf node exists but is not a sequence.
    #[error("field `{path}` is not a sequence")]
    NotASequence {
        /// Dotted path of the offending node.
        path: String,
    },
    /// The document root is not a mapping.
    #[error("document root must be a mapping, found {found}")]
    NotAnObject {
        /// Short description of the node found at the root.
        found: &'static str,
    },
    /// YAML decoding failed.
    #[error("document parse error: {0}")]
    Parse(String),
    /// YAML encoding failed.
    #[error("document serialize error: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// Shape of a node created by lookup-or-create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Key/value mapping node.
    Mapping,
    /// Ordered sequence node.
    Sequence,
}

impl FieldKind {
    /// Returns an empty node of this kind.
    #[must_use]
    pub fn empty(self) -> Value {
        match self {
            Self::Mapping => Value::Mapping(Mapping::new()),
            Self::Sequence => Value::Sequence(Vec::new()),
        }
    }
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// A structured resource document.
///
/// # Invariants
/// - The root node is a YAML mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    /// Root mapping of the resource.
    root: Mapping,
}

impl Document {
    /// Creates a document carrying only `apiVersion` and `kind`.
    #[must_use]
    pub fn new(api_version: &str, kind: &str) -> Self {
        let mut root = Mapping::new();
        root.insert(string_value("apiVersion"), string_value(api_version));
        root.insert(string_value("kind"), string_value(kind));
        Self {
            root,
        }
    }

    /// Wraps an existing mapping as a document.
    #[must_use]
    pub const fn from_mapping(root: Mapping) -> Self {
        Self {
            root,
        }
    }

    /// Parses a single YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] on malformed YAML and
    /// [`DocumentError::NotAnObject`] when the root is not a mapping.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|err| DocumentError::Parse(err.to_string()))?;
        Self::try_from(value)
    }

    /// Parses a `---` separated stream of YAML documents.
    ///
    /// Empty documents in the stream are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when any document is malformed or not a
    /// mapping.
    pub fn parse_stream(text: &str) -> Result<Vec<Self>, DocumentError> {
        let mut documents = Vec::new();
        for section in serde_yaml::Deserializer::from_str(text) {
            let value =
                Value::deserialize(section).map_err(|err| DocumentError::Parse(err.to_string()))?;
            if value.is_null() {
                continue;
            }
            documents.push(Self::try_from(value)?);
        }
        Ok(documents)
    }

    /// Serializes the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] when encoding fails.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&self.root).map_err(|err| DocumentError::Serialize(err.to_string()))
    }

    /// Returns the root mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Consumes the document and returns it as a YAML value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Mapping(self.root)
    }

    // ------------------------------------------------------------------------
    // Metadata accessors
    // ------------------------------------------------------------------------

    /// Returns `apiVersion`, or an empty string when absent.
    #[must_use]
    pub fn api_version(&self) -> &str {
        self.root.get("apiVersion").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the API group portion of `apiVersion`.
    ///
    /// For core group versions without a `/` the whole version is returned.
    #[must_use]
    pub fn api_group(&self) -> &str {
        let version = self.api_version();
        version.split_once('/').map_or(version, |(group, _)| group)
    }

    /// Returns `kind`, or an empty string when absent.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.root.get("kind").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns `metadata.name`, or an empty string when absent.
    #[must_use]
    pub fn name(&self) -> &str {
        self.get(&[METADATA_FIELD, NAME_FIELD]).and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns string-valued annotations; non-string values are skipped.
    #[must_use]
    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.annotation_mapping()
            .map(|mapping| {
                mapping
                    .iter()
                    .filter_map(|(key, value)| {
                        Some((key.as_str()?.to_string(), value.as_str()?.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every annotation key regardless of value type.
    #[must_use]
    pub fn annotation_keys(&self) -> Vec<String> {
        self.annotation_mapping()
            .map(|mapping| {
                mapping.keys().filter_map(Value::as_str).map(str::to_string).collect()
            })
            .unwrap_or_default()
    }

    /// Reads the node at `path`, if present.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = current.as_mapping()?.get(*segment)?;
        }
        Some(current)
    }

    // ------------------------------------------------------------------------
    // Mutation primitives
    // ------------------------------------------------------------------------

    /// Sets `metadata.name`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAMapping`] when `metadata` is not a mapping.
    pub fn set_name(&mut self, name: &str) -> Result<(), DocumentError> {
        self.set_field(&[METADATA_FIELD, NAME_FIELD], string_value(name))
    }

    /// Replaces `metadata.annotations` with the supplied map.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAMapping`] when `metadata` is not a mapping.
    pub fn set_annotations(
        &mut self,
        annotations: &BTreeMap<String, String>,
    ) -> Result<(), DocumentError> {
        let mapping = annotations
            .iter()
            .map(|(key, value)| (string_value(key), string_value(value)))
            .collect::<Mapping>();
        self.set_field(&[METADATA_FIELD, ANNOTATIONS_FIELD], Value::Mapping(mapping))
    }

    /// Removes one annotation.
    ///
    /// An annotation map left empty by the removal is dropped as well. A
    /// missing key is not an error. Returns whether a key was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAMapping`] when `metadata` or
    /// `metadata.annotations` exists with a non-mapping shape.
    pub fn clear_annotation(&mut self, key: &str) -> Result<bool, DocumentError> {
        let metadata = match self.root.get_mut(METADATA_FIELD) {
            None | Some(Value::Null) => return Ok(false),
            Some(Value::Mapping(metadata)) => metadata,
            Some(_) => return Err(not_a_mapping(&[METADATA_FIELD])),
        };
        let annotations = match metadata.get_mut(ANNOTATIONS_FIELD) {
            None | Some(Value::Null) => return Ok(false),
            Some(Value::Mapping(annotations)) => annotations,
            Some(_) => return Err(not_a_mapping(&[METADATA_FIELD, ANNOTATIONS_FIELD])),
        };
        let removed = annotations.remove(key).is_some();
        if annotations.is_empty() {
            metadata.remove(ANNOTATIONS_FIELD);
        }
        Ok(removed)
    }

    /// Looks up the mapping at `path`, creating missing segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::EmptyPath`] for an empty path and
    /// [`DocumentError::NotAMapping`] when a segment has another shape.
    pub fn lookup_create_mapping(&mut self, path: &[&str]) -> Result<&mut Mapping, DocumentError> {
        if path.is_empty() {
            return Err(DocumentError::EmptyPath);
        }
        let mut current = &mut self.root;
        for depth in 0 .. path.len() {
            current = child_mapping(current, &path[..= depth])?;
        }
        Ok(current)
    }

    /// Looks up the sequence at `path`, creating it and its parents when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::EmptyPath`] for an empty path,
    /// [`DocumentError::NotAMapping`] when a parent has another shape, and
    /// [`DocumentError::NotASequence`] when the leaf is not a sequence.
    pub fn lookup_create_sequence(
        &mut self,
        path: &[&str],
    ) -> Result<&mut Vec<Value>, DocumentError> {
        let Some((leaf, parents)) = path.split_last() else {
            return Err(DocumentError::EmptyPath);
        };
        let parent =
            if parents.is_empty() { &mut self.root } else { self.lookup_create_mapping(parents)? };
        ensure_child(parent, leaf, FieldKind::Sequence);
        match parent.get_mut(*leaf) {
            Some(Value::Sequence(sequence)) => Ok(sequence),
            _ => Err(DocumentError::NotASequence {
                path: path.join("."),
            }),
        }
    }

    /// Looks up or creates the node at `path` with the requested shape.
    ///
    /// # Errors
    ///
    /// See [`Document::lookup_create_mapping`] and
    /// [`Document::lookup_create_sequence`].
    pub fn lookup_create(&mut self, kind: FieldKind, path: &[&str]) -> Result<(), DocumentError> {
        match kind {
            FieldKind::Mapping => self.lookup_create_mapping(path).map(|_| ()),
            FieldKind::Sequence => self.lookup_create_sequence(path).map(|_| ()),
        }
    }

    /// Sets the field at `path`, creating parent mappings as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::EmptyPath`] for an empty path and
    /// [`DocumentError::NotAMapping`] when a parent has another shape.
    pub fn set_field(&mut self, path: &[&str], value: Value) -> Result<(), DocumentError> {
        let Some((leaf, parents)) = path.split_last() else {
            return Err(DocumentError::EmptyPath);
        };
        let parent =
            if parents.is_empty() { &mut self.root } else { self.lookup_create_mapping(parents)? };
        parent.insert(string_value(leaf), value);
        Ok(())
    }

    /// Appends `value` to the sequence at `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// See [`Document::lookup_create_sequence`].
    pub fn append(&mut self, path: &[&str], value: Value) -> Result<(), DocumentError> {
        self.lookup_create_sequence(path)?.push(value);
        Ok(())
    }

    /// Returns the annotation mapping, if present and well-formed.
    fn annotation_mapping(&self) -> Option<&Mapping> {
        self.get(&[METADATA_FIELD, ANNOTATIONS_FIELD]).and_then(Value::as_mapping)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Mapping(root) => Ok(Self {
                root,
            }),
            other => Err(DocumentError::NotAnObject {
                found: value_shape(&other),
            }),
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a YAML string scalar.
#[must_use]
pub fn string_value(value: &str) -> Value {
    Value::String(value.to_string())
}

/// Builds a YAML sequence of string scalars.
#[must_use]
pub fn string_list_value(values: &[String]) -> Value {
    Value::Sequence(values.iter().map(|value| string_value(value)).collect())
}

/// Builds a YAML mapping of string scalars.
#[must_use]
pub fn string_map_value(values: &BTreeMap<String, String>) -> Value {
    Value::Mapping(
        values.iter().map(|(key, value)| (string_value(key), string_value(value))).collect(),
    )
}

/// Inserts an empty node for `key` when it is missing or `null`.
fn ensure_child(parent: &mut Mapping, key: &str, kind: FieldKind) {
    if parent.get(key).is_none_or(Value::is_null) {
        parent.insert(string_value(key), kind.empty());
    }
}

/// Descends into (creating if needed) the mapping named by the last segment.
fn child_mapping<'a>(
    parent: &'a mut Mapping,
    path: &[&str],
) -> Result<&'a mut Mapping, DocumentError> {
    let Some(key) = path.last() else {
        return Err(DocumentError::EmptyPath);
    };
    ensure_child(parent, key, FieldKind::Mapping);
    match parent.get_mut(*key) {
        Some(Value::Mapping(mapping)) => Ok(mapping),
        _ => Err(not_a_mapping(path)),
    }
}

/// Builds a [`DocumentError::NotAMapping`] for the path.
fn not_a_mapping(path: &[&str]) -> DocumentError {
    DocumentError::NotAMapping {
        path: path.join("."),
    }
}

/// Describes the shape of a YAML node for error messages.
const fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
