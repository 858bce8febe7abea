//! Partition storage formats.
//!
//! The `format` field of a partition name selects how the partition is stored, which in turn
//! decides the file extension of its cache key. The mapping from format name to format is a
//! static table; adding a format means adding a variant and a row.

/// Storage format of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PartitionFormat {
    /// Relational database file (the default)
    #[default]
    Db,
    Csv,
    Hdf,
    Geo,
}

/// Format name → format, in registration order.
const REGISTRY: [(&str, PartitionFormat); 4] = [
    ("db", PartitionFormat::Db),
    ("csv", PartitionFormat::Csv),
    ("hdf", PartitionFormat::Hdf),
    ("geo", PartitionFormat::Geo),
];

impl PartitionFormat {
    /// Extension of bundle cache keys, which are always database files.
    pub const BUNDLE_EXTENSION: &str = ".db";

    /// Look up a format by name. `None` selects the default format.
    pub fn from_name(name: Option<&str>) -> Result<Self, UnknownFormatError> {
        let Some(name) = name else {
            return Ok(PartitionFormat::default());
        };
        REGISTRY
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, format)| *format)
            .ok_or_else(|| UnknownFormatError(name.to_string()))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PartitionFormat::Db => "db",
            PartitionFormat::Csv => "csv",
            PartitionFormat::Hdf => "hdf",
            PartitionFormat::Geo => "geo",
        }
    }

    /// File extension of the cache key, including the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            PartitionFormat::Db => ".db",
            PartitionFormat::Csv => ".csv",
            PartitionFormat::Hdf => ".hdf5",
            PartitionFormat::Geo => ".geodb",
        }
    }

    /// Whether the format is left out of generated names.
    pub fn is_implicit(self) -> bool {
        self == PartitionFormat::Db
    }
}

impl std::fmt::Display for PartitionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartitionFormat {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(Some(s))
    }
}

impl serde::Serialize for PartitionFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for PartitionFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// The format name is not registered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown partition format '{0}' (expected one of 'db', 'csv', 'hdf', 'geo')")]
pub struct UnknownFormatError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_resolves_registered_formats() {
        for (name, format) in REGISTRY {
            assert_eq!(PartitionFormat::from_name(Some(name)), Ok(format));
            assert_eq!(format.as_str(), name);
        }
    }

    #[test]
    fn from_name_defaults_to_db() {
        assert_eq!(PartitionFormat::from_name(None), Ok(PartitionFormat::Db));
    }

    #[test]
    fn from_name_with_unknown_format_fails() {
        assert_eq!(
            "parquet".parse::<PartitionFormat>(),
            Err(UnknownFormatError("parquet".to_string()))
        );
    }
}
