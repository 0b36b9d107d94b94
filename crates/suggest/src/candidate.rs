//! Candidate records as the search services return them.
//!
//! Decoding is lenient: missing or `null` collections become empty, reference
//! fields accept either a bare id or an `{ "id": .. }` object, and anything the
//! engine does not model is kept in `extra` so a `Selected` event hands back
//! the full record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Display text of a record that has no usable name.
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "type",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub types: Vec<NamedRef>,
    #[serde(
        default,
        rename = "domain",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub domains: Vec<NamedRef>,
    #[serde(
        default,
        rename = "alias",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub properties: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ResourceRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// `text` wins over `name`; services disagree on which one they fill.
    pub fn display_name(&self) -> &str {
        display_name(self.text.as_deref(), self.name.as_deref())
    }

    /// Id of the article whose blurb describes this candidate.
    pub fn article_id(&self) -> Option<&str> {
        self.article.as_ref().and_then(ResourceRef::id)
    }

    /// Id of the image used for the flyout thumbnail.
    pub fn image_id(&self) -> Option<&str> {
        self.image.as_ref().and_then(ResourceRef::id)
    }
}

/// A `{id, name}` or `{id, text}` pair, as used for types and domains.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl NamedRef {
    pub fn display_name(&self) -> &str {
        display_name(self.text.as_deref(), self.name.as_deref())
    }
}

/// Reference to a secondary resource, either a bare id or `{ "id": .. }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceRef {
    Id(String),
    Object {
        #[serde(default)]
        id: Option<String>,
    },
}

impl ResourceRef {
    /// The referenced id; empty ids count as absent.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            ResourceRef::Id(id) => Some(id.as_str()),
            ResourceRef::Object { id } => id.as_deref(),
        };
        id.filter(|s| !s.is_empty())
    }
}

fn display_name<'a>(text: Option<&'a str>, name: Option<&'a str>) -> &'a str {
    text.or(name).unwrap_or(UNKNOWN_NAME)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
