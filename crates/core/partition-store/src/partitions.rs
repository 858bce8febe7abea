//! Partition resolution for one bundle.

use std::collections::BTreeMap;

use bundle_identity::{
    BundleIdentity, FieldKey, FieldMap, FieldValue, PartialPartitionName, PartitionFormat,
    PartitionIdentity, PartitionNameQuery, field,
};

use crate::{
    error::{CreateError, DeleteError, FindError},
    predicate::{self, Clause, Column, Predicate},
    record::PartitionRecord,
    store::{InsertError, PartitionRecordStore, TableRef, TableResolver},
};

/// Whether [`Partitions::find_or_new`] returned an existing partition or created one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    Created,
}

/// The fields of a partition to find or create.
#[derive(Debug, Clone, Default)]
pub struct PartitionRequest {
    pub fields: FieldMap,
    /// Overrides the `format` field when set. Without either, the default format of
    /// [`Partitions`] applies.
    pub format: Option<PartitionFormat>,
    /// Extra tables recorded on a created partition
    pub tables: Vec<String>,
    /// Attributes recorded on a created partition
    pub data: BTreeMap<String, serde_json::Value>,
}

impl PartitionRequest {
    pub fn new(fields: FieldMap) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    pub fn with_format(self, format: PartitionFormat) -> Self {
        Self {
            format: Some(format),
            ..self
        }
    }

    pub fn with_tables(self, tables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn with_data(self, data: BTreeMap<String, serde_json::Value>) -> Self {
        Self { data, ..self }
    }

    fn fields(&self, default_format: PartitionFormat) -> FieldMap {
        let key = FieldKey::Format.as_str();
        let given = self
            .fields
            .get(key)
            .and_then(FieldValue::as_text)
            .filter(|given| !given.is_empty() && !field::is_marker(given));

        let mut fields = self.fields.clone();
        match (self.format, given) {
            (Some(format), _) => {
                fields.insert(key.into(), format.as_str().into());
            }
            (None, Some(_)) => {}
            (None, None) => {
                fields.insert(key.into(), default_format.as_str().into());
            }
        }
        fields
    }
}

/// The partitions of one bundle, resolved against a record store.
///
/// Every lookup is scoped to the bundle's `vid`. A lookup that matches more than one partition
/// fails with [`FindError::ResultCount`] rather than picking one.
#[derive(Debug, Clone)]
pub struct Partitions<S, R> {
    bundle: BundleIdentity,
    store: S,
    tables: R,
    /// Format of partitions requested without one
    default_format: PartitionFormat,
}

impl<S, R> Partitions<S, R>
where
    S: PartitionRecordStore,
    R: TableResolver,
{
    pub fn new(bundle: BundleIdentity, store: S, tables: R) -> Self {
        Self {
            bundle,
            store,
            tables,
            default_format: PartitionFormat::default(),
        }
    }

    pub fn with_default_format(self, default_format: PartitionFormat) -> Self {
        Self {
            default_format,
            ..self
        }
    }

    pub fn bundle(&self) -> &BundleIdentity {
        &self.bundle
    }

    /// The single partition matching `query`, if any.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid()), err)]
    pub async fn find(
        &self,
        query: &PartitionNameQuery,
    ) -> Result<Option<PartitionIdentity>, FindError> {
        let predicate = self.predicate(query).await?;
        let records = self.filter(&predicate).await?;
        single(records)?.map(|record| to_identity(&record)).transpose()
    }

    /// Every partition matching `query`.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid()), err)]
    pub async fn find_all(
        &self,
        query: &PartitionNameQuery,
    ) -> Result<Vec<PartitionIdentity>, FindError> {
        let predicate = self.predicate(query).await?;
        self.filter(&predicate)
            .await?
            .iter()
            .map(to_identity)
            .collect()
    }

    /// Number of partitions in the bundle.
    pub async fn count(&self) -> Result<usize, FindError> {
        Ok(self.filter(&self.scope()).await?.len())
    }

    /// Every partition of the bundle, ordered by `vid`.
    pub async fn all(&self) -> Result<Vec<PartitionIdentity>, FindError> {
        self.filter(&self.scope()).await?.iter().map(to_identity).collect()
    }

    /// Every partition of the bundle not stored in `format`.
    pub async fn all_excluding_format(
        &self,
        format: PartitionFormat,
    ) -> Result<Vec<PartitionIdentity>, FindError> {
        let predicate = self
            .scope()
            .and(Clause::Ne(Column::Format, format.as_str().to_string()));
        self.filter(&predicate).await?.iter().map(to_identity).collect()
    }

    /// Look a partition up by `id` or `vid`, then by exact name.
    #[tracing::instrument(skip(self), fields(bundle = %self.bundle.vid()), err)]
    pub async fn get(&self, id_or_name: &str) -> Result<Option<PartitionIdentity>, FindError> {
        let by_number = self.scope().and(Clause::Or(vec![
            Clause::Eq(Column::Id, Some(id_or_name.to_string())),
            Clause::Eq(Column::Vid, Some(id_or_name.to_string())),
        ]));
        if let Some(record) = single(self.filter(&by_number).await?)? {
            return to_identity(&record).map(Some);
        }

        let by_name = self
            .scope()
            .and(Clause::Eq(Column::Name, Some(id_or_name.to_string())));
        single(self.filter(&by_name).await?)?
            .map(|record| to_identity(&record))
            .transpose()
    }

    /// The first partition holding `table`. A table the resolver does not know has none.
    #[tracing::instrument(skip(self), fields(bundle = %self.bundle.vid()), err)]
    pub async fn find_table(&self, table: &str) -> Result<Option<PartitionIdentity>, FindError> {
        let Some(table) = self.lookup_table(table).await? else {
            return Ok(None);
        };
        let predicate = self
            .scope()
            .and(Clause::Eq(Column::TableId, Some(table.id)));
        self.filter(&predicate)
            .await?
            .first()
            .map(to_identity)
            .transpose()
    }

    /// Return the partition matching the request, creating it if there is none.
    ///
    /// A concurrent creator of the same partition makes this fail with
    /// [`CreateError::Conflict`]; retrying then finds the partition the other caller created.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid()), err)]
    pub async fn find_or_new(
        &self,
        request: &PartitionRequest,
    ) -> Result<(PartitionIdentity, Outcome), CreateError> {
        let fields = request.fields(self.default_format);

        // Match against stored values, which are cleaned
        let mut query_fields = fields.clone();
        query_fields.extend(PartialPartitionName::from_fields(&fields).to_fields());
        let query =
            PartitionNameQuery::from_fields(&query_fields).map_err(CreateError::InvalidName)?;

        if let Some(found) = self.find(&query).await? {
            tracing::debug!(vid = %found.vid(), "found existing partition");
            return Ok((found, Outcome::Found));
        }

        let created = self.create(request, &fields).await?;
        Ok((created, Outcome::Created))
    }

    /// Create the partition for the request. Fails if a matching partition exists.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid()), err)]
    pub async fn new_partition(
        &self,
        request: &PartitionRequest,
    ) -> Result<PartitionIdentity, CreateError> {
        match self.find_or_new(request).await? {
            (created, Outcome::Created) => Ok(created),
            (found, Outcome::Found) => Err(CreateError::AlreadyExists(found.fqname())),
        }
    }

    /// Delete the record of `partition`.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid(), vid = %partition.vid()), err)]
    pub async fn delete(&self, partition: &PartitionIdentity) -> Result<usize, DeleteError> {
        let predicate = self
            .scope()
            .and(Clause::Eq(Column::Id, Some(partition.id())));
        self.store.delete(&predicate).await.map_err(DeleteError)
    }

    /// Delete every partition record of the bundle.
    #[tracing::instrument(skip_all, fields(bundle = %self.bundle.vid()), err)]
    pub async fn clean(&self) -> Result<usize, DeleteError> {
        self.store.delete(&self.scope()).await.map_err(DeleteError)
    }

    async fn create(
        &self,
        request: &PartitionRequest,
        fields: &FieldMap,
    ) -> Result<PartitionIdentity, CreateError> {
        let name = PartialPartitionName::from_fields(fields)
            .promote(self.bundle.name())
            .map_err(CreateError::InvalidName)?;

        let table = match name.table() {
            Some(table) => Some(self.resolve_table(table).await?),
            None => None,
        };

        let next = self
            .filter(&self.scope())
            .await?
            .iter()
            .map(|record| record.sequence_id + 1)
            .max()
            .unwrap_or(0);
        let on = self
            .bundle
            .on()
            .as_partition(next)
            .map_err(CreateError::Overflow)?;
        let ident = PartitionIdentity::new(name, on).map_err(CreateError::Identity)?;

        let record = PartitionRecord::new(&ident, self.bundle.vid(), table.map(|t| t.id))
            .with_tables(request.tables.iter().cloned())
            .with_data(request.data.clone());

        match self.store.insert(record).await {
            Ok(record) => {
                tracing::info!(vid = %record.vid, fqname = %record.fqname, "created partition");
                Ok(ident)
            }
            Err(InsertError::UniqueViolation { column, value }) => {
                tracing::warn!(%column, %value, "partition already created by another writer");
                Err(CreateError::Conflict {
                    column: column.to_string(),
                    value,
                })
            }
            Err(InsertError::Store(err)) => Err(CreateError::Store(err)),
        }
    }

    fn scope(&self) -> Predicate {
        Predicate::scope(self.bundle.vid())
    }

    async fn predicate(&self, query: &PartitionNameQuery) -> Result<Predicate, FindError> {
        let (predicate, table) = predicate::derive(&self.bundle.vid(), &query.with_none());
        match table {
            Some(table) => {
                let table = self.resolve_table(&table).await?;
                Ok(predicate.and(Clause::Eq(Column::TableId, Some(table.id))))
            }
            None => Ok(predicate),
        }
    }

    async fn resolve_table(&self, table: &str) -> Result<TableRef, FindError> {
        self.lookup_table(table)
            .await?
            .ok_or_else(|| FindError::UnknownTable(table.to_string()))
    }

    async fn lookup_table(&self, table: &str) -> Result<Option<TableRef>, FindError> {
        self.tables
            .resolve_table(table)
            .await
            .map_err(|source| FindError::TableResolution {
                table: table.to_string(),
                source,
            })
    }

    async fn filter(&self, predicate: &Predicate) -> Result<Vec<PartitionRecord>, FindError> {
        self.store.filter(predicate).await.map_err(FindError::Store)
    }
}

fn single(mut records: Vec<PartitionRecord>) -> Result<Option<PartitionRecord>, FindError> {
    match records.len() {
        0 | 1 => Ok(records.pop()),
        count => Err(FindError::ResultCount {
            count,
            vnames: records.into_iter().map(|record| record.vname).collect(),
        }),
    }
}

fn to_identity(record: &PartitionRecord) -> Result<PartitionIdentity, FindError> {
    record
        .to_identity()
        .map_err(|source| FindError::InvalidRecord {
            vid: record.vid.clone(),
            source,
        })
}
