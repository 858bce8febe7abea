//! Partition names and partial partition names.

use std::collections::BTreeMap;

use object_number::ObjectNumber;

use crate::{
    field::{FieldKey, FieldMap, NAME_PART_SEP},
    format::PartitionFormat,
    name::{self, Name, NameError},
    query::PartitionNameQuery,
    version::NameVersion,
};

/// The name of a partition: a bundle name extended with table, time, space, grain, format and
/// segment fields.
///
/// The partition fields are placed after the bundle fields and before the version in `vname`.
/// In paths they form up to three extra segments: the table, `time-space` and `grain-segment`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName {
    parts: BTreeMap<FieldKey, String>,
    version: NameVersion,
    format: PartitionFormat,
}

impl PartitionName {
    /// Build a partition name from a flat mapping. Keys that are not name fields are ignored.
    pub fn from_fields(map: &FieldMap) -> Result<Self, NameError> {
        let keys = FieldKey::BUNDLE
            .into_iter()
            .chain(FieldKey::PARTITION)
            .collect::<Vec<_>>();
        let parts = name::read_parts(map, &keys);
        let format = PartitionFormat::from_name(parts.get(&FieldKey::Format).map(String::as_str))?;

        let name = Self {
            parts,
            version: name::read_version(map)?,
            format,
        };
        name.is_valid()?;
        Ok(name)
    }

    pub fn is_valid(&self) -> Result<(), NameError> {
        name::validate(&self.parts)
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.parts.get(&key).map(String::as_str)
    }

    pub fn table(&self) -> Option<&str> {
        self.get(FieldKey::Table)
    }

    pub fn version(&self) -> &NameVersion {
        &self.version
    }

    pub fn format(&self) -> PartitionFormat {
        self.format
    }

    /// Return a copy with one field replaced (or removed, for `None`).
    pub fn with(&self, key: FieldKey, value: Option<&str>) -> Result<Self, NameError> {
        let mut map = self.to_fields();
        match value {
            Some(v) => map.insert(key.as_str().to_string(), v.into()),
            None => map.remove(key.as_str()),
        };
        if key != FieldKey::Version && !self.accepts(key) {
            return Err(NameError::NotAField(key));
        }
        Self::from_fields(&map)
    }

    pub fn with_version(&self, version: impl Into<NameVersion>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> String {
        name::join_name(&self.parts)
    }

    pub fn vname(&self) -> String {
        name::join_vname(&self.name(), &self.version)
    }

    /// The bundle path followed by the partition's local segments.
    pub fn path(&self) -> String {
        let bundle = name::bundle_path(&self.parts, &self.version);
        self.with_local_parts(&bundle)
    }

    /// The partition's local segments only, e.g. `sales/2010-ca/year-1`.
    pub fn sub_path(&self) -> String {
        name::join_path(self.local_parts().iter().map(String::as_str))
    }

    pub fn source_path(&self) -> String {
        let bundle = name::bundle_source_path(&self.parts);
        self.with_local_parts(&bundle)
    }

    /// The path with the extension of the partition format.
    pub fn cache_key(&self) -> String {
        format!("{}{}", self.path(), self.format.extension())
    }

    pub fn to_fields(&self) -> FieldMap {
        name::to_fields(&self.parts, &self.version)
    }

    pub fn dict(&self) -> FieldMap {
        let mut map = self.to_fields();
        map.insert(FieldKey::Name.as_str().into(), self.name().into());
        map.insert(FieldKey::Vname.as_str().into(), self.vname().into());
        map
    }

    /// The bundle name this partition belongs to.
    pub fn bundle_name(&self) -> Name {
        let bundle = self
            .parts
            .iter()
            .filter(|(key, _)| FieldKey::BUNDLE.contains(key))
            .map(|(key, value)| (*key, value.clone()))
            .collect();
        Name::from_parts(bundle, self.version.clone())
    }

    pub fn as_query(&self) -> PartitionNameQuery {
        PartitionNameQuery::exact(&self.parts, &self.version)
    }

    /// Only the partition fields of this name.
    pub fn as_partial(&self) -> PartialPartitionName {
        PartialPartitionName {
            parts: self
                .parts
                .iter()
                .filter(|(key, _)| FieldKey::PARTITION.contains(key))
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
        }
    }

    /// Partition names bind only to partition numbers.
    pub fn type_is_compatible(&self, on: &ObjectNumber) -> bool {
        matches!(on, ObjectNumber::Partition(_))
    }

    fn accepts(&self, key: FieldKey) -> bool {
        FieldKey::BUNDLE.contains(&key) || FieldKey::PARTITION.contains(&key)
    }

    fn local_parts(&self) -> Vec<String> {
        let sep = NAME_PART_SEP.to_string();
        let group = |keys: &[FieldKey]| {
            keys.iter()
                .filter_map(|key| self.parts.get(key).map(String::as_str))
                .collect::<Vec<_>>()
                .join(&sep)
        };

        [
            group(&[FieldKey::Table]),
            group(&[FieldKey::Time, FieldKey::Space]),
            group(&[FieldKey::Grain, FieldKey::Segment]),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect()
    }

    fn with_local_parts(&self, base: &str) -> String {
        let local = self.local_parts();
        name::join_path([base].into_iter().chain(local.iter().map(String::as_str)))
    }
}

impl std::fmt::Display for PartitionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// The partition-specific fields of a partition name, without any bundle fields.
///
/// Partial names are never validated. They are completed into a [`PartitionName`] by
/// [`PartialPartitionName::promote`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PartialPartitionName {
    parts: BTreeMap<FieldKey, String>,
}

impl PartialPartitionName {
    pub fn from_fields(map: &FieldMap) -> Self {
        Self {
            parts: name::read_parts(map, &FieldKey::PARTITION),
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.parts.get(&key).map(String::as_str)
    }

    pub fn table(&self) -> Option<&str> {
        self.get(FieldKey::Table)
    }

    pub fn to_fields(&self) -> FieldMap {
        self.parts
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value.as_str().into()))
            .collect()
    }

    /// Combine with the fields and version of a bundle name into a full partition name.
    pub fn promote(&self, bundle: &Name) -> Result<PartitionName, NameError> {
        bundle.as_partition(&self.to_fields())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::field::{self, FieldValue};

    fn bundle() -> Name {
        Name::from_fields(&field::fields([
            ("source", "example.com"),
            ("dataset", "sales"),
            ("version", "0.1.2"),
        ]))
        .expect("bundle name should be valid")
    }

    fn partition(pairs: &[(&str, &str)]) -> PartitionName {
        bundle()
            .as_partition(&field::fields(pairs.iter().copied()))
            .expect("partition name should be valid")
    }

    #[test]
    fn derived_strings_include_local_parts() {
        //* Given
        let name = partition(&[
            ("table", "orders"),
            ("time", "2010"),
            ("space", "CA"),
            ("grain", "county"),
            ("segment", "1"),
        ]);

        //* Then
        assert_eq!(name.name(), "example.com-sales-orders-2010-ca-county-1");
        assert_eq!(name.vname(), "example.com-sales-orders-2010-ca-county-1-0.1.2");
        assert_eq!(name.path(), "example.com/sales-0.1.2/orders/2010-ca/county-1");
        assert_eq!(name.sub_path(), "orders/2010-ca/county-1");
        assert_eq!(name.source_path(), "example.com/sales/orders/2010-ca/county-1");
        assert_eq!(
            name.cache_key(),
            "example.com/sales-0.1.2/orders/2010-ca/county-1.db"
        );
    }

    #[test]
    fn db_format_is_left_out_of_name() {
        //* Given
        let name = partition(&[("table", "orders"), ("format", "db")]);

        //* Then
        assert_eq!(name.format(), PartitionFormat::Db);
        assert_eq!(name.name(), "example.com-sales-orders");
        assert_eq!(name.get(FieldKey::Format), Some("db"), "field is still recorded");
    }

    #[test]
    fn other_formats_select_extension() {
        //* Given
        let name = partition(&[("table", "orders"), ("format", "csv")]);

        //* Then
        assert_eq!(name.format(), PartitionFormat::Csv);
        assert_eq!(name.name(), "example.com-sales-orders-csv");
        assert_eq!(name.cache_key(), "example.com/sales-0.1.2/orders.csv");
    }

    #[test]
    fn unknown_format_fails() {
        let result = bundle().as_partition(&field::fields([("format", "parquet")]));
        assert!(matches!(result, Err(NameError::UnknownFormat(_))));
    }

    #[test]
    fn partition_without_local_parts_uses_bundle_path() {
        let name = partition(&[]);
        assert_eq!(name.path(), "example.com/sales-0.1.2");
        assert_eq!(name.sub_path(), "");
    }

    #[test]
    fn as_partial_then_promote_restores_name() {
        //* Given
        let name = partition(&[("table", "orders"), ("time", "2011")]);

        //* When
        let partial = name.as_partial();
        let promoted = partial.promote(&bundle()).expect("promote should succeed");

        //* Then
        assert_eq!(partial.to_fields().get("source"), None, "partial has no bundle fields");
        assert_eq!(promoted, name);
    }

    #[test]
    fn partial_never_validates() {
        //* When
        let partial = PartialPartitionName::from_fields(&field::fields([("Table", "x")]));

        //* Then
        assert_eq!(partial.table(), None, "keys are matched exactly");
        assert_eq!(partial.to_fields(), FieldMap::new());
    }

    #[test]
    fn partial_cleans_values() {
        let partial = PartialPartitionName::from_fields(&field::fields([
            ("table", FieldValue::from("Sales Data")),
            ("segment", FieldValue::from(2_i64)),
        ]));
        assert_eq!(partial.table(), Some("sales_data"));
        assert_eq!(partial.get(FieldKey::Segment), Some("2"));
    }

    #[test]
    fn partial_drops_query_markers() {
        //* Given
        let fields = field::fields([
            ("table", FieldValue::from("orders")),
            ("time", FieldValue::from(field::NONE)),
            ("space", FieldValue::from(field::ANY)),
        ]);

        //* When
        let name = PartialPartitionName::from_fields(&fields)
            .promote(&bundle())
            .expect("promoted name should be valid");

        //* Then
        assert_eq!(name.get(FieldKey::Time), None);
        assert_eq!(name.get(FieldKey::Space), None);
        assert_eq!(name.name(), "example.com-sales-orders");
    }

    #[test]
    fn bundle_name_drops_partition_fields() {
        let name = partition(&[("table", "orders")]);
        assert_eq!(name.bundle_name(), bundle());
    }

    #[test]
    fn with_updates_partition_field() {
        //* Given
        let name = partition(&[("table", "orders")]);

        //* When
        let updated = name
            .with(FieldKey::Time, Some("2012"))
            .expect("update should be valid");

        //* Then
        assert_eq!(updated.sub_path(), "orders/2012");
        assert_eq!(name.sub_path(), "orders", "original is unchanged");
    }
}
