//! Canonical index descriptors
//!
//! Live indexes (native `listIndexes` documents) and configured indexes (the
//! JSON/YAML config artifact) both map into [`IndexDescriptor`], so values
//! coming from either side compare structurally.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use bson::{Bson, Document, doc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Name of the identity index every collection carries. Never snapshotted,
/// created or dropped.
pub const IDENTITY_INDEX: &str = "_id_";

/// Collation locale the server treats as "no collation".
const SIMPLE_LOCALE: &str = "simple";

/// Errors mapping between the native index format and the canonical model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("index document has no string {0} field")]
    MissingField(&'static str),

    #[error("field {field} of index {index} must be {expected}")]
    WrongType {
        index: String,
        field: String,
        expected: &'static str,
    },

    #[error("partial filter of index {index} is not a valid document: {message}")]
    InvalidFilter { index: String, message: String },
}

impl ModelError {
    fn wrong_type(index: &str, field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            index: index.to_string(),
            field: field.into(),
            expected,
        }
    }
}

/// Direction or type of one indexed field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyKind {
    /// Sort order: `1` ascending, `-1` descending
    Order(i64),
    /// Special index type such as `text`, `hashed` or `2dsphere`
    Type(String),
}

/// Shape accepted from config files before integral floats are folded into
/// [`KeyKind::Order`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeyKind {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawKeyKind> for KeyKind {
    type Error = String;

    fn try_from(raw: RawKeyKind) -> Result<Self, Self::Error> {
        match raw {
            RawKeyKind::Int(order) => Ok(KeyKind::Order(order)),
            RawKeyKind::Float(value) => integral_f64(value)
                .map(KeyKind::Order)
                .ok_or_else(|| format!("index key value {value} is not an integer")),
            RawKeyKind::Text(kind) => Ok(KeyKind::Type(kind)),
        }
    }
}

impl<'de> Deserialize<'de> for KeyKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawKeyKind::deserialize(deserializer)?;
        KeyKind::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl KeyKind {
    /// Map a native key value. Int32, Int64 and integral doubles all fold
    /// into the same [`KeyKind::Order`].
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::String(kind) => Some(KeyKind::Type(kind.clone())),
            other => integral(other).map(KeyKind::Order),
        }
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            KeyKind::Order(order) => integer_bson(*order),
            KeyKind::Type(kind) => Bson::String(kind.clone()),
        }
    }
}

impl From<i32> for KeyKind {
    fn from(order: i32) -> Self {
        KeyKind::Order(i64::from(order))
    }
}

impl From<i64> for KeyKind {
    fn from(order: i64) -> Self {
        KeyKind::Order(order)
    }
}

impl From<&str> for KeyKind {
    fn from(kind: &str) -> Self {
        KeyKind::Type(kind.to_string())
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Order(order) => write!(f, "{order}"),
            KeyKind::Type(kind) => write!(f, "\"{kind}\""),
        }
    }
}

/// One indexed field. Position within [`IndexDescriptor::key`] is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    #[serde(alias = "Key")]
    pub key: String,
    #[serde(alias = "Value")]
    pub value: KeyKind,
}

impl IndexKey {
    pub fn new(key: impl Into<String>, value: impl Into<KeyKind>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Collation subset tracked by the tool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollationOptions {
    #[serde(default, alias = "Locale")]
    pub locale: String,
    #[serde(default, alias = "NumericOrdering")]
    pub numeric_ordering: bool,
}

impl CollationOptions {
    pub fn new(locale: impl Into<String>, numeric_ordering: bool) -> Self {
        Self {
            locale: locale.into(),
            numeric_ordering,
        }
    }
}

/// Canonical definition of one index
///
/// Equality and hashing are structural over every field; partial filters
/// hash independently of key order. The diff engine only matches
/// descriptors by [`name`](Self::name); see [`crate::diff`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    #[serde(alias = "Name")]
    pub name: String,

    #[serde(default, alias = "Key", deserialize_with = "null_as_empty")]
    pub key: Vec<IndexKey>,

    #[serde(default, alias = "Unique", skip_serializing_if = "is_false")]
    pub unique: bool,

    #[serde(
        default,
        alias = "PartialFilterExpression",
        skip_serializing_if = "Option::is_none"
    )]
    pub partial_filter_expression: Option<Map<String, Value>>,

    #[serde(default, alias = "Weights", skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, i64>>,

    #[serde(
        default,
        alias = "CollationOptions",
        alias = "Collation",
        alias = "collation",
        skip_serializing_if = "Option::is_none"
    )]
    pub collation_options: Option<CollationOptions>,
}

impl IndexDescriptor {
    /// Create a plain index with no modifiers.
    pub fn new(name: impl Into<String>, key: Vec<IndexKey>) -> Self {
        Self {
            name: name.into(),
            key,
            unique: false,
            partial_filter_expression: None,
            weights: None,
            collation_options: None,
        }
    }

    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_partial_filter(mut self, filter: Map<String, Value>) -> Self {
        self.partial_filter_expression = Some(filter);
        self
    }

    pub fn with_weights(mut self, weights: BTreeMap<String, i64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_collation(mut self, collation: CollationOptions) -> Self {
        self.collation_options = Some(collation);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.name == IDENTITY_INDEX
    }

    /// Fold representations that mean "no modifier" into `None`.
    ///
    /// Empty or `simple` collation locales, empty weight maps and empty
    /// partial filters are all equivalent to the modifier being absent.
    pub fn normalized(mut self) -> Self {
        if self
            .collation_options
            .as_ref()
            .is_some_and(|c| c.locale.is_empty() || c.locale == SIMPLE_LOCALE)
        {
            self.collation_options = None;
        }
        if self.weights.as_ref().is_some_and(BTreeMap::is_empty) {
            self.weights = None;
        }
        if self.partial_filter_expression.as_ref().is_some_and(Map::is_empty) {
            self.partial_filter_expression = None;
        }
        self
    }

    /// Decode one document as returned by `listIndexes`.
    ///
    /// Fields the model does not track (`v`, `ns`, `background`, most of
    /// `collation`) are ignored.
    pub fn from_document(doc: &Document) -> Result<Self, ModelError> {
        let name = doc
            .get_str("name")
            .map_err(|_| ModelError::MissingField("name"))?
            .to_string();

        let key = doc
            .get_document("key")
            .map_err(|_| ModelError::wrong_type(&name, "key", "a document"))?
            .iter()
            .map(|(field, value)| {
                KeyKind::from_bson(value)
                    .map(|kind| IndexKey::new(field.clone(), kind))
                    .ok_or_else(|| {
                        ModelError::wrong_type(
                            &name,
                            format!("key.{field}"),
                            "an integer sort order or a type string",
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let unique = match doc.get("unique") {
            None | Some(Bson::Null) => false,
            Some(Bson::Boolean(flag)) => *flag,
            Some(other) => integral(other)
                .map(|flag| flag != 0)
                .ok_or_else(|| ModelError::wrong_type(&name, "unique", "a boolean"))?,
        };

        let partial_filter_expression = match doc.get("partialFilterExpression") {
            None | Some(Bson::Null) => None,
            Some(Bson::Document(filter)) => Some(document_to_json(filter)),
            Some(_) => {
                return Err(ModelError::wrong_type(
                    &name,
                    "partialFilterExpression",
                    "a document",
                ));
            }
        };

        let weights = match doc.get("weights") {
            None | Some(Bson::Null) => None,
            Some(Bson::Document(weights)) => Some(
                weights
                    .iter()
                    .map(|(field, weight)| {
                        integral(weight).map(|w| (field.clone(), w)).ok_or_else(|| {
                            ModelError::wrong_type(&name, format!("weights.{field}"), "an integer")
                        })
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()?,
            ),
            Some(_) => return Err(ModelError::wrong_type(&name, "weights", "a document")),
        };

        let collation_options = match doc.get("collation") {
            None | Some(Bson::Null) => None,
            Some(Bson::Document(collation)) => Some(CollationOptions {
                locale: collation.get_str("locale").unwrap_or_default().to_string(),
                numeric_ordering: collation.get_bool("numericOrdering").unwrap_or(false),
            }),
            Some(_) => return Err(ModelError::wrong_type(&name, "collation", "a document")),
        };

        Ok(Self {
            name,
            key,
            unique,
            partial_filter_expression,
            weights,
            collation_options,
        }
        .normalized())
    }

    /// Render the index specification used by the `createIndexes` command.
    ///
    /// Key order is preserved.
    pub fn to_create_document(&self) -> Result<Document, ModelError> {
        let key: Document = self
            .key
            .iter()
            .map(|k| (k.key.clone(), k.value.to_bson()))
            .collect();

        let mut spec = doc! {
            "key": key,
            "name": self.name.clone(),
        };

        if self.unique {
            spec.insert("unique", true);
        }

        if let Some(filter) = &self.partial_filter_expression {
            let filter = Bson::try_from(Value::Object(filter.clone())).map_err(|e| {
                ModelError::InvalidFilter {
                    index: self.name.clone(),
                    message: e.to_string(),
                }
            })?;
            spec.insert("partialFilterExpression", filter);
        }

        if let Some(weights) = &self.weights {
            let weights: Document = weights
                .iter()
                .map(|(field, weight)| (field.clone(), integer_bson(*weight)))
                .collect();
            spec.insert("weights", weights);
        }

        if let Some(collation) = &self.collation_options {
            spec.insert(
                "collation",
                doc! {
                    "locale": collation.locale.clone(),
                    "numericOrdering": collation.numeric_ordering,
                },
            );
        }

        Ok(spec)
    }

    /// Key rendered as `{"email": 1, "bio": "text"}`
    pub fn key_summary(&self) -> String {
        let fields: Vec<String> = self
            .key
            .iter()
            .map(|k| format!("\"{}\": {}", k.key, k.value))
            .collect();
        format!("{{{}}}", fields.join(", "))
    }

    /// Modifiers rendered as short labels, e.g. `["unique", "collation en numeric"]`
    pub fn option_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if self.unique {
            labels.push("unique".to_string());
        }
        if let Some(filter) = &self.partial_filter_expression {
            labels.push(format!("partial {}", Value::Object(filter.clone())));
        }
        if let Some(weights) = &self.weights {
            let weights: Vec<String> = weights
                .iter()
                .map(|(field, weight)| format!("\"{field}\": {weight}"))
                .collect();
            labels.push(format!("weights {{{}}}", weights.join(", ")));
        }
        if let Some(collation) = &self.collation_options {
            if collation.numeric_ordering {
                labels.push(format!("collation {} numeric", collation.locale));
            } else {
                labels.push(format!("collation {}", collation.locale));
            }
        }
        labels
    }
}

impl Hash for IndexDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.key.hash(state);
        self.unique.hash(state);
        match &self.partial_filter_expression {
            Some(filter) => {
                1u8.hash(state);
                hash_json_object(filter, state);
            }
            None => 0u8.hash(state),
        }
        self.weights.hash(state);
        self.collation_options.hash(state);
    }
}

/// Desired state of one collection as stored in the config artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(alias = "Collection")]
    pub collection: String,

    #[serde(default, alias = "Indexes", deserialize_with = "null_as_empty")]
    pub indexes: Vec<IndexDescriptor>,
}

impl CollectionConfig {
    pub fn new(collection: impl Into<String>, indexes: Vec<IndexDescriptor>) -> Self {
        Self {
            collection: collection.into(),
            indexes,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Older tooling writes `null` for empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn integral_f64(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn integral(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        Bson::Double(n) => integral_f64(*n),
        _ => None,
    }
}

fn integer_bson(value: i64) -> Bson {
    i32::try_from(value).map_or(Bson::Int64(value), Bson::Int32)
}

fn hash_json_object<H: Hasher>(map: &Map<String, Value>, state: &mut H) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.len().hash(state);
    for (field, value) in entries {
        field.hash(state);
        hash_json(value, state);
    }
}

fn hash_json<H: Hasher>(value: &Value, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(flag) => flag.hash(state),
        Value::Number(number) => number.to_string().hash(state),
        Value::String(text) => text.hash(state),
        Value::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_json(item, state);
            }
        }
        Value::Object(map) => hash_json_object(map, state),
    }
}

fn document_to_json(doc: &Document) -> Map<String, Value> {
    doc.iter()
        .map(|(field, value)| (field.clone(), value.clone().into_relaxed_extjson()))
        .collect()
}
