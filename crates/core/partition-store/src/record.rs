//! Stored partition records.

use std::collections::BTreeMap;

use bundle_identity::{FieldKey, FieldMap, Identity, IdentityError, PartitionIdentity};
use object_number::TypeTag;
use serde::{Deserialize, Serialize};

use crate::predicate::Column;

/// Build state of a partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionState {
    #[default]
    New,
    Building,
    Built,
    Error,
}

/// A partition as persisted by a [`PartitionRecordStore`](crate::PartitionRecordStore).
///
/// The name fields are stored flat so stores can filter on them. `identity` keeps the identity
/// dict the record was created from; [`PartitionRecord::to_identity`] rebuilds from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionRecord {
    pub id: String,
    pub vid: String,
    /// `vid` of the owning bundle; every query is scoped by it
    pub dataset_vid: String,
    /// Partition number within the bundle
    pub sequence_id: u64,
    pub fqname: String,
    pub vname: String,
    pub name: String,
    pub cache_key: String,
    pub table_id: Option<String>,
    pub table: Option<String>,
    pub time: Option<String>,
    pub space: Option<String>,
    pub grain: Option<String>,
    pub format: Option<String>,
    pub segment: Option<String>,
    #[serde(default)]
    pub state: PartitionState,
    /// Tables whose data the partition holds
    #[serde(default)]
    pub tables: Vec<String>,
    /// Free-form attributes
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
    pub identity: FieldMap,
}

impl PartitionRecord {
    /// A record for a newly created partition.
    pub fn new(
        ident: &PartitionIdentity,
        dataset_vid: impl Into<String>,
        table_id: Option<String>,
    ) -> Self {
        let name = ident.name();
        let field = |key: FieldKey| name.get(key).map(ToString::to_string);

        Self {
            id: ident.id(),
            vid: ident.vid(),
            dataset_vid: dataset_vid.into(),
            sequence_id: ident.on().partition(),
            fqname: ident.fqname(),
            vname: ident.vname(),
            name: name.name(),
            cache_key: ident.cache_key(),
            table_id,
            table: field(FieldKey::Table),
            time: field(FieldKey::Time),
            space: field(FieldKey::Space),
            grain: field(FieldKey::Grain),
            format: Some(name.format().as_str().to_string()),
            segment: field(FieldKey::Segment),
            state: PartitionState::New,
            tables: field(FieldKey::Table).into_iter().collect(),
            data: BTreeMap::new(),
            identity: ident.ident_dict(),
        }
    }

    /// Add tables to the `tables` list, skipping ones already present.
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = String>) -> Self {
        for table in tables {
            if !self.tables.contains(&table) {
                self.tables.push(table);
            }
        }
        self
    }

    pub fn with_data(mut self, data: BTreeMap<String, serde_json::Value>) -> Self {
        self.data.extend(data);
        self
    }

    /// Rebuild the partition identity this record was created from.
    pub fn to_identity(&self) -> Result<PartitionIdentity, IdentityError> {
        match Identity::from_dict(&self.identity)? {
            Identity::Partition(ident) => Ok(ident),
            Identity::Bundle(_) => Err(IdentityError::TypeMismatch {
                kind: "partition",
                found: TypeTag::Dataset,
            }),
        }
    }

    /// The value of a filterable column.
    pub fn column(&self, column: Column) -> Option<&str> {
        match column {
            Column::Id => Some(&self.id),
            Column::Vid => Some(&self.vid),
            Column::Fqname => Some(&self.fqname),
            Column::Vname => Some(&self.vname),
            Column::Name => Some(&self.name),
            Column::CacheKey => Some(&self.cache_key),
            Column::TableId => self.table_id.as_deref(),
            Column::Time => self.time.as_deref(),
            Column::Space => self.space.as_deref(),
            Column::Grain => self.grain.as_deref(),
            Column::Format => self.format.as_deref(),
            Column::Segment => self.segment.as_deref(),
        }
    }
}
