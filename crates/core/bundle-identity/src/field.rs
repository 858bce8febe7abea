//! Name fields, flat field mappings, and the query tri-state.

use std::collections::BTreeMap;

/// Separator between the parts of a generated name.
pub const NAME_PART_SEP: char = '-';

/// Marker for an unconstrained query field.
pub const ANY: &str = "<any>";

/// Marker for a query field that must be absent.
pub const NONE: &str = "<none>";

/// A flat, string-keyed field mapping, as consumed by `from_fields`/`from_dict` and produced by
/// `dict`.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// The key of a name field, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Source,
    Dataset,
    Subset,
    Type,
    Part,
    Bspace,
    Btime,
    Variation,
    Table,
    Time,
    Space,
    Grain,
    Format,
    Segment,
    Version,
    // Generated names, only ever constrained by queries
    Name,
    Vname,
    Fqname,
}

impl FieldKey {
    /// Bundle fields, in name order, excluding the version.
    pub const BUNDLE: [FieldKey; 8] = [
        FieldKey::Source,
        FieldKey::Dataset,
        FieldKey::Subset,
        FieldKey::Type,
        FieldKey::Part,
        FieldKey::Bspace,
        FieldKey::Btime,
        FieldKey::Variation,
    ];

    /// Partition fields, in name order. They follow the bundle fields and precede the version.
    pub const PARTITION: [FieldKey; 6] = [
        FieldKey::Table,
        FieldKey::Time,
        FieldKey::Space,
        FieldKey::Grain,
        FieldKey::Format,
        FieldKey::Segment,
    ];

    /// Names derived from the other fields.
    pub const GENERATED: [FieldKey; 3] = [FieldKey::Name, FieldKey::Vname, FieldKey::Fqname];

    /// Fields every complete name must carry.
    pub const REQUIRED: [FieldKey; 2] = [FieldKey::Source, FieldKey::Dataset];

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldKey::Source => "source",
            FieldKey::Dataset => "dataset",
            FieldKey::Subset => "subset",
            FieldKey::Type => "type",
            FieldKey::Part => "part",
            FieldKey::Bspace => "bspace",
            FieldKey::Btime => "btime",
            FieldKey::Variation => "variation",
            FieldKey::Table => "table",
            FieldKey::Time => "time",
            FieldKey::Space => "space",
            FieldKey::Grain => "grain",
            FieldKey::Format => "format",
            FieldKey::Segment => "segment",
            FieldKey::Version => "version",
            FieldKey::Name => "name",
            FieldKey::Vname => "vname",
            FieldKey::Fqname => "fqname",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::BUNDLE
            .into_iter()
            .chain(Self::PARTITION)
            .chain([FieldKey::Version])
            .chain(Self::GENERATED)
            .find(|field| field.as_str() == key)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value in a [`FieldMap`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Int(i64),
    Str(String),
}

impl FieldValue {
    /// The value as text; `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::Str(s) => Some(s.clone()),
        }
    }

    /// The value as an integer, accepting numeric strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Str(s) => s.trim().parse().ok(),
            FieldValue::Null => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(FieldValue::Int)
            .unwrap_or_else(|_| FieldValue::Str(value.to_string()))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Build a [`FieldMap`] from key/value pairs.
pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Read a text field from a mapping; empty strings and nulls are absent.
pub(crate) fn text(map: &FieldMap, key: FieldKey) -> Option<String> {
    map.get(key.as_str())
        .and_then(FieldValue::as_text)
        .filter(|v| !v.is_empty())
}

/// Whether `value` is one of the `<any>`/`<none>` query markers.
pub fn is_marker(value: &str) -> bool {
    value == ANY || value == NONE
}

/// Sanitize a field value: every character outside `[A-Za-z0-9.<>=]` becomes `_`, and the
/// result is lower-cased.
///
/// `<`, `>` and `=` survive so the `<any>`/`<none>` markers and version ranges pass through
/// unchanged. Cleaning is idempotent.
pub fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '<' | '>' | '=') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// A query field: unconstrained, required to be absent, or required to equal a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum QueryField {
    /// Matches anything
    #[default]
    Any,
    /// Matches only records where the field is not set
    Absent,
    /// Matches only records where the field equals the value
    Present(String),
}

impl QueryField {
    /// Interpret an optional mapping value.
    ///
    /// A missing key is [`QueryField::Any`]. Null, the empty string and [`NONE`] are
    /// [`QueryField::Absent`]. [`ANY`] is [`QueryField::Any`].
    pub fn from_value(value: Option<&FieldValue>) -> Self {
        let Some(value) = value else {
            return QueryField::Any;
        };
        match value.as_text() {
            None => QueryField::Absent,
            Some(s) if s.is_empty() || s == NONE => QueryField::Absent,
            Some(s) if s == ANY => QueryField::Any,
            Some(s) => QueryField::Present(s),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, QueryField::Any)
    }

    /// `None` when unconstrained; otherwise the required value, where `Some(None)` means absent.
    pub fn constraint(&self) -> Option<Option<&str>> {
        match self {
            QueryField::Any => None,
            QueryField::Absent => Some(None),
            QueryField::Present(v) => Some(Some(v)),
        }
    }
}

impl std::fmt::Display for QueryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryField::Any => f.write_str(ANY),
            QueryField::Absent => f.write_str(NONE),
            QueryField::Present(v) => f.write_str(v),
        }
    }
}
