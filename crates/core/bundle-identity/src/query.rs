//! Query forms of names.
//!
//! Every field of a query is a [`QueryField`]: unconstrained ([`QueryField::Any`], the default),
//! required absent ([`QueryField::Absent`]), or required equal to a value. Queries never
//! validate required fields and cannot produce paths or cache keys. Values are kept verbatim
//! so generated names (`name`, `vname`, `fqname`) can be matched exactly.

use std::collections::BTreeMap;

use crate::{
    field::{FieldKey, FieldMap, FieldValue, QueryField},
    name::NameError,
    version::NameVersion,
};

static UNCONSTRAINED: QueryField = QueryField::Any;

/// The requested operation has no meaning on a query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{operation}' is not supported on a query")]
pub struct UnsupportedOperationError {
    pub operation: &'static str,
}

/// A query after [`with_none`](NameQuery::with_none): only constrained fields remain, and each
/// maps to the required value, `None` meaning "must be absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedQuery {
    constraints: BTreeMap<FieldKey, Option<String>>,
}

impl ResolvedQuery {
    /// `None` if the field is unconstrained, `Some(None)` if it must be absent.
    pub fn get(&self, key: FieldKey) -> Option<Option<&str>> {
        self.constraints.get(&key).map(Option::as_deref)
    }

    pub fn is_constrained(&self, key: FieldKey) -> bool {
        self.constraints.contains_key(&key)
    }

    /// Whether the query matches everything.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, Option<&str>)> {
        self.constraints.iter().map(|(k, v)| (*k, v.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct QueryFields {
    fields: BTreeMap<FieldKey, QueryField>,
}

impl QueryFields {
    fn from_fields(map: &FieldMap, keys: &[FieldKey]) -> Result<Self, NameError> {
        let mut fields = BTreeMap::new();
        for &key in keys {
            let value = normalize(key, QueryField::from_value(map.get(key.as_str())))?;
            if !value.is_any() {
                fields.insert(key, value);
            }
        }
        Ok(Self { fields })
    }

    fn exact(parts: &BTreeMap<FieldKey, String>, version: &NameVersion, keys: &[FieldKey]) -> Self {
        let fields = keys
            .iter()
            .filter(|key| !FieldKey::GENERATED.contains(key))
            .map(|&key| {
                let value = match key {
                    FieldKey::Version => QueryField::Present(version.to_string()),
                    _ => parts
                        .get(&key)
                        .map_or(QueryField::Absent, |v| QueryField::Present(v.clone())),
                };
                (key, value)
            })
            .collect();
        Self { fields }
    }

    fn get(&self, key: FieldKey) -> &QueryField {
        self.fields.get(&key).unwrap_or(&UNCONSTRAINED)
    }

    fn with(&self, key: FieldKey, value: QueryField, keys: &[FieldKey]) -> Result<Self, NameError> {
        if !keys.contains(&key) {
            return Err(NameError::NotAField(key));
        }
        let mut fields = self.fields.clone();
        match normalize(key, value)? {
            QueryField::Any => fields.remove(&key),
            value => fields.insert(key, value),
        };
        Ok(Self { fields })
    }

    fn with_none(&self) -> ResolvedQuery {
        let constraints = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                value
                    .constraint()
                    .map(|c| (*key, c.map(ToString::to_string)))
            })
            .collect();
        ResolvedQuery { constraints }
    }

    fn dict(&self, keys: &[FieldKey]) -> FieldMap {
        keys.iter()
            .map(|key| {
                (
                    key.as_str().to_string(),
                    FieldValue::from(self.get(*key).to_string()),
                )
            })
            .collect()
    }
}

/// A constrained version must still be a version or a range; it is stored in canonical form.
fn normalize(key: FieldKey, value: QueryField) -> Result<QueryField, NameError> {
    match (key, value) {
        (FieldKey::Version, QueryField::Present(v)) => Ok(QueryField::Present(
            NameVersion::parse(v.trim())?.to_string(),
        )),
        (_, value) => Ok(value),
    }
}

macro_rules! query_ops {
    ($ty:ident, $keys:expr) => {
        impl $ty {
            /// Build a query from a flat mapping. Missing keys are unconstrained; null, empty and
            /// `<none>` values must be absent; `<any>` is unconstrained.
            pub fn from_fields(map: &FieldMap) -> Result<Self, NameError> {
                QueryFields::from_fields(map, &$keys).map(Self)
            }

            pub(crate) fn exact(parts: &BTreeMap<FieldKey, String>, version: &NameVersion) -> Self {
                Self(QueryFields::exact(parts, version, &$keys))
            }

            pub fn get(&self, key: FieldKey) -> &QueryField {
                self.0.get(key)
            }

            /// Return a copy with one field replaced.
            pub fn with(&self, key: FieldKey, value: QueryField) -> Result<Self, NameError> {
                self.0.with(key, value, &$keys).map(Self)
            }

            /// Drop unconstrained fields and turn "must be absent" fields into `None`.
            pub fn with_none(&self) -> ResolvedQuery {
                self.0.with_none()
            }

            /// Queries never require any field.
            pub fn is_valid(&self) -> Result<(), NameError> {
                Ok(())
            }

            pub fn path(&self) -> Result<String, UnsupportedOperationError> {
                Err(UnsupportedOperationError { operation: "path" })
            }

            pub fn source_path(&self) -> Result<String, UnsupportedOperationError> {
                Err(UnsupportedOperationError {
                    operation: "source_path",
                })
            }

            pub fn cache_key(&self) -> Result<String, UnsupportedOperationError> {
                Err(UnsupportedOperationError {
                    operation: "cache_key",
                })
            }

            /// Every field, with `<any>`/`<none>` markers for unconstrained and absent fields.
            pub fn dict(&self) -> FieldMap {
                self.0.dict(&$keys)
            }
        }
    };
}

/// A query over bundle names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameQuery(QueryFields);

impl NameQuery {
    /// Fields a bundle name query can constrain.
    pub const KEYS: [FieldKey; 12] = [
        FieldKey::Source,
        FieldKey::Dataset,
        FieldKey::Subset,
        FieldKey::Type,
        FieldKey::Part,
        FieldKey::Bspace,
        FieldKey::Btime,
        FieldKey::Variation,
        FieldKey::Version,
        FieldKey::Name,
        FieldKey::Vname,
        FieldKey::Fqname,
    ];
}

query_ops!(NameQuery, NameQuery::KEYS);

/// A query over partition names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionNameQuery(QueryFields);

impl PartitionNameQuery {
    /// Fields a partition name query can constrain.
    pub const KEYS: [FieldKey; 18] = [
        FieldKey::Source,
        FieldKey::Dataset,
        FieldKey::Subset,
        FieldKey::Type,
        FieldKey::Part,
        FieldKey::Bspace,
        FieldKey::Btime,
        FieldKey::Variation,
        FieldKey::Table,
        FieldKey::Time,
        FieldKey::Space,
        FieldKey::Grain,
        FieldKey::Format,
        FieldKey::Segment,
        FieldKey::Version,
        FieldKey::Name,
        FieldKey::Vname,
        FieldKey::Fqname,
    ];
}

query_ops!(PartitionNameQuery, PartitionNameQuery::KEYS);
