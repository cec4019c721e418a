use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Field payload of an entry or asset, keyed by field name in CMS order.
pub type Fields = IndexMap<String, FieldValue>;

/// A pointer to another entry or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub link_type: String,
    pub id: String,
}

impl Link {
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            link_type: "Entry".to_string(),
            id: id.into(),
        }
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self {
            link_type: "Asset".to_string(),
            id: id.into(),
        }
    }

    fn to_json(&self) -> Value {
        serde_json::json!({
            "sys": { "type": "Link", "linkType": self.link_type, "id": self.id }
        })
    }

    fn from_json(object: &Map<String, Value>) -> Option<Self> {
        if object.len() != 1 {
            return None;
        }
        let sys = object.get("sys")?.as_object()?;
        if sys.get("type")?.as_str()? != "Link" {
            return None;
        }
        // Bare links only; other sys keys keep the object a mapping.
        if sys
            .keys()
            .any(|key| !matches!(key.as_str(), "type" | "linkType" | "id"))
        {
            return None;
        }
        Some(Self {
            link_type: sys.get("linkType")?.as_str()?.to_string(),
            id: sys.get("id")?.as_str()?.to_string(),
        })
    }
}

/// Schema-free field value returned by the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`.
    Unsigned(u64),
    Number(f64),
    Text(String),
    Reference(Link),
    List(Vec<FieldValue>),
    Mapping(Fields),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Plain text, or the text of a single-locale mapping (`{"en-US": "..."}`).
    pub fn as_localized_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Mapping(locales) if locales.len() == 1 => {
                locales.values().next().and_then(FieldValue::as_text)
            }
            _ => None,
        }
    }

    fn collect_links<'a>(&'a self, links: &mut Vec<&'a Link>) {
        match self {
            FieldValue::Reference(link) => links.push(link),
            FieldValue::List(items) => items.iter().for_each(|item| item.collect_links(links)),
            FieldValue::Mapping(fields) => fields.values().for_each(|v| v.collect_links(links)),
            FieldValue::Null
            | FieldValue::Bool(_)
            | FieldValue::Integer(_)
            | FieldValue::Unsigned(_)
            | FieldValue::Number(_)
            | FieldValue::Text(_) => {}
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => FieldValue::Integer(i),
                (None, Some(u)) => FieldValue::Unsigned(u),
                (None, None) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(object) => match Link::from_json(&object) {
                Some(link) => FieldValue::Reference(link),
                None => FieldValue::Mapping(
                    object
                        .into_iter()
                        .map(|(k, v)| (k, FieldValue::from(v)))
                        .collect(),
                ),
            },
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Integer(i) => Value::from(i),
            FieldValue::Unsigned(u) => Value::from(u),
            FieldValue::Number(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Reference(link) => link.to_json(),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            FieldValue::Mapping(fields) => Value::Object(
                fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LinkEnvelope {
    sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkSys {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    id: String,
    #[serde(default)]
    link_type: Option<String>,
}

/// CMS-maintained metadata attached to every resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemProperties {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Latest edited version. Only the management API reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "content_type_link"
    )]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `contentType` is sent as `{"sys": {"type": "Link", "linkType": "ContentType", "id": ...}}`.
mod content_type_link {
    use super::{LinkEnvelope, LinkSys};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|id| LinkEnvelope {
                sys: LinkSys {
                    kind: Some("Link".to_string()),
                    id: id.clone(),
                    link_type: Some("ContentType".to_string()),
                },
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let link = Option::<LinkEnvelope>::deserialize(deserializer)?;
        Ok(link.map(|l| l.sys.id))
    }
}

/// A single content unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: SystemProperties,
    #[serde(default)]
    pub fields: Fields,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Latest edited version, zero when the boundary did not report one.
    pub fn latest_version(&self) -> u32 {
        self.sys.version.unwrap_or_default()
    }

    pub fn published_version(&self) -> Option<u32> {
        self.sys.published_version
    }

    pub fn content_type(&self) -> Option<&str> {
        self.sys.content_type.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Every entry or asset this entry links to, in field order.
    pub fn references(&self) -> Vec<&Link> {
        let mut links = Vec::new();
        for value in self.fields.values() {
            value.collect_links(&mut links);
        }
        links
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub sys: SystemProperties,
    #[serde(default)]
    pub fields: Fields,
}

impl Asset {
    pub fn id(&self) -> &str {
        &self.sys.id
    }
}

/// Historical copy of an entry, created by the CMS on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sys: SystemProperties,
    pub snapshot: Entry,
}

impl Snapshot {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.sys.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub sys: SystemProperties,
    pub name: String,
}

/// Result of a delivery-side search: matches plus the resources they include.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryCollection {
    pub items: Vec<Entry>,
    pub included_entries: Vec<Entry>,
    pub included_assets: Vec<Asset>,
}

/// A content root plus its transitively included references.
///
/// Only [`Project::resolve`] builds one, so the included collections always
/// come from the same search that produced the root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub sys: SystemProperties,
    pub slug: String,
    pub fields: Fields,
    included_entries: Vec<Entry>,
    included_assets: Vec<Asset>,
}

impl Project {
    pub fn resolve(root: Entry, included_entries: Vec<Entry>, included_assets: Vec<Asset>) -> Self {
        let slug = root
            .field("slug")
            .and_then(FieldValue::as_localized_text)
            .unwrap_or_default()
            .to_string();

        let mut seen = HashSet::new();
        let included_entries = included_entries
            .into_iter()
            .filter(|e| seen.insert(e.sys.id.clone()))
            .collect();

        let mut seen = HashSet::new();
        let included_assets = included_assets
            .into_iter()
            .filter(|a| seen.insert(a.sys.id.clone()))
            .collect();

        Self {
            sys: root.sys,
            slug,
            fields: root.fields,
            included_entries,
            included_assets,
        }
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn included_entries(&self) -> &[Entry] {
        &self.included_entries
    }

    pub fn included_assets(&self) -> &[Asset] {
        &self.included_assets
    }
}
