use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The store-specific prefix the platform attaches to entity IDs.
///
/// The same logical ID may appear prefixed or bare depending on which API
/// surface produced it; comparisons against view scopes must use the bare
/// form.
pub const ID_PREFIX: &str = "wrk";

/// Strip the store prefix from an ID string, if present.
pub fn strip_id_prefix(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
}

/// Identifier of a remote entity (`"wrk123"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ID without the store prefix, for scope-set comparisons.
    pub fn bare(&self) -> &str {
        strip_id_prefix(&self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The kind of a remote entity.
///
/// The platform reports these as opaque concrete-type strings; this closed
/// enum is the full set the provisioner works with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Folder,
    TableSchema,
    EntityView,
    WikiPage,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Folder => "folder",
            Self::TableSchema => "table_schema",
            Self::EntityView => "entity_view",
            Self::WikiPage => "wiki_page",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "project" => Some(Self::Project),
            "folder" => Some(Self::Folder),
            "table_schema" => Some(Self::TableSchema),
            "entity_view" => Some(Self::EntityView),
            "wiki_page" => Some(Self::WikiPage),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-form annotation value.
///
/// Annotations are the platform's informal metadata channel; the provisioner
/// uses them as the de facto index for workspace identity (rally number,
/// sprint label, cross-references).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AnnotationValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AnnotationValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for AnnotationValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Key-value metadata attached to an entity.
pub type Annotations = BTreeMap<String, AnnotationValue>;

/// A remote object in the platform's entity store.
///
/// Within one parent, at most one non-deleted entity may hold a given
/// (name, type) pair. The store does not enforce this; the resolver does,
/// cooperatively, by always creating with overwrite disabled and falling
/// back to a child lookup on conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub parent_id: Option<EntityId>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub annotations: Annotations,
    /// Container IDs (bare form) this view aggregates. Views only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_ids: Vec<String>,
    /// Column model references. Table schemas and views only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_ids: Vec<EntityId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Input for creating a new entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDraft {
    pub name: String,
    pub parent_id: Option<EntityId>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_ids: Vec<EntityId>,
}

impl EntityDraft {
    pub fn new(name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            entity_type,
            annotations: Annotations::new(),
            scope_ids: Vec::new(),
            column_ids: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: EntityId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}
