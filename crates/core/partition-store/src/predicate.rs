//! Filter predicates over partition records, and their derivation from queries.
//!
//! A [`Predicate`] is always scoped to one bundle. The clauses are a plain description that a
//! store can translate into its own query language; [`Predicate::matches`] is the reference
//! semantics.

use bundle_identity::{FieldKey, ResolvedQuery};

use crate::record::PartitionRecord;

/// A filterable column of a partition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Vid,
    Fqname,
    Vname,
    Name,
    CacheKey,
    TableId,
    Time,
    Space,
    Grain,
    Format,
    Segment,
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Column::Id => "id",
            Column::Vid => "vid",
            Column::Fqname => "fqname",
            Column::Vname => "vname",
            Column::Name => "name",
            Column::CacheKey => "cache_key",
            Column::TableId => "t_id",
            Column::Time => "time",
            Column::Space => "space",
            Column::Grain => "grain",
            Column::Format => "format",
            Column::Segment => "segment",
        };
        f.write_str(name)
    }
}

/// One condition on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// The column equals the value; `None` requires the column to be unset
    Eq(Column, Option<String>),
    /// The column is unset or differs from the value
    Ne(Column, String),
    /// At least one of the clauses holds
    Or(Vec<Clause>),
}

impl Clause {
    pub fn matches(&self, record: &PartitionRecord) -> bool {
        match self {
            Clause::Eq(column, value) => record.column(*column) == value.as_deref(),
            Clause::Ne(column, value) => record.column(*column) != Some(value.as_str()),
            Clause::Or(clauses) => clauses.iter().any(|c| c.matches(record)),
        }
    }
}

/// A conjunction of clauses over the records of one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub dataset_vid: String,
    pub clauses: Vec<Clause>,
}

impl Predicate {
    /// Every record of the bundle.
    pub fn scope(dataset_vid: impl Into<String>) -> Self {
        Self {
            dataset_vid: dataset_vid.into(),
            clauses: Vec::new(),
        }
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn matches(&self, record: &PartitionRecord) -> bool {
        record.dataset_vid == self.dataset_vid && self.clauses.iter().all(|c| c.matches(record))
    }
}

/// Generated names, in precedence order. The first constrained one is the only filter.
const EXACT_NAMES: [(FieldKey, Column); 3] = [
    (FieldKey::Fqname, Column::Fqname),
    (FieldKey::Vname, Column::Vname),
    (FieldKey::Name, Column::Name),
];

/// Fields filtered one by one when no generated name is constrained.
const FIELD_COLUMNS: [(FieldKey, Column); 5] = [
    (FieldKey::Time, Column::Time),
    (FieldKey::Space, Column::Space),
    (FieldKey::Grain, Column::Grain),
    (FieldKey::Format, Column::Format),
    (FieldKey::Segment, Column::Segment),
];

/// The predicate for a resolved query.
///
/// If the query requires a specific table, its name is returned alongside the predicate: the
/// caller must resolve it to a table id and add `Eq(TableId, id)`. A table required to be
/// absent is already part of the predicate.
pub fn derive(dataset_vid: &str, query: &ResolvedQuery) -> (Predicate, Option<String>) {
    let scope = Predicate::scope(dataset_vid);

    if let Some((key, column, value)) = EXACT_NAMES
        .iter()
        .find_map(|(key, column)| query.get(*key).map(|value| (*key, *column, value)))
    {
        tracing::debug!(%key, ?value, "filtering partitions by exact name");
        return (scope.and(Clause::Eq(column, value.map(ToString::to_string))), None);
    }

    let mut predicate = FIELD_COLUMNS
        .iter()
        .filter_map(|(key, column)| {
            query
                .get(*key)
                .map(|value| Clause::Eq(*column, value.map(ToString::to_string)))
        })
        .fold(scope, Predicate::and);

    let table = match query.get(FieldKey::Table) {
        None => None,
        Some(None) => {
            predicate = predicate.and(Clause::Eq(Column::TableId, None));
            None
        }
        Some(Some(name)) => Some(name.to_string()),
    };

    tracing::debug!(
        clauses = predicate.clauses.len(),
        table = ?table,
        "filtering partitions by fields"
    );
    (predicate, table)
}

#[cfg(test)]
mod tests {
    use bundle_identity::{FieldValue, PartitionNameQuery, field};
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolved(pairs: &[(&str, FieldValue)]) -> ResolvedQuery {
        PartitionNameQuery::from_fields(&field::fields(pairs.iter().cloned()))
            .expect("query should build")
            .with_none()
    }

    #[test]
    fn derive_with_unconstrained_query_is_scope_only() {
        //* When
        let (predicate, table) = derive("d001", &resolved(&[]));

        //* Then
        assert_eq!(predicate, Predicate::scope("d001"));
        assert_eq!(table, None);
    }

    #[test]
    fn derive_prefers_fqname_over_everything() {
        //* Given
        let query = resolved(&[
            ("fqname", FieldValue::from("a-b-0.0.1~p001001")),
            ("vname", FieldValue::from("a-b-0.0.1")),
            ("table", FieldValue::from("sales")),
            ("time", FieldValue::from("2010")),
        ]);

        //* When
        let (predicate, table) = derive("d001", &query);

        //* Then
        assert_eq!(
            predicate.clauses,
            [Clause::Eq(Column::Fqname, Some("a-b-0.0.1~p001001".into()))]
        );
        assert_eq!(table, None, "table is not resolved when a name wins");
    }

    #[test]
    fn derive_prefers_vname_over_name() {
        let query = resolved(&[
            ("vname", FieldValue::from("a-b-0.0.1")),
            ("name", FieldValue::from("a-b")),
        ]);
        let (predicate, _) = derive("d001", &query);
        assert_eq!(
            predicate.clauses,
            [Clause::Eq(Column::Vname, Some("a-b-0.0.1".into()))]
        );
    }

    #[test]
    fn derive_filters_fields_in_fixed_order() {
        //* Given
        let query = resolved(&[
            ("segment", FieldValue::Int(3)),
            ("space", FieldValue::Null),
            ("time", FieldValue::from("2010")),
            ("grain", FieldValue::from("<any>")),
            ("table", FieldValue::from("sales")),
        ]);

        //* When
        let (predicate, table) = derive("d001", &query);

        //* Then
        assert_eq!(
            predicate.clauses,
            [
                Clause::Eq(Column::Time, Some("2010".into())),
                Clause::Eq(Column::Space, None),
                Clause::Eq(Column::Segment, Some("3".into())),
            ]
        );
        assert_eq!(table.as_deref(), Some("sales"), "table must be resolved by the caller");
    }

    #[test]
    fn derive_with_absent_table_requires_null_table_id() {
        let query = resolved(&[("table", FieldValue::from("<none>"))]);
        let (predicate, table) = derive("d001", &query);
        assert_eq!(predicate.clauses, [Clause::Eq(Column::TableId, None)]);
        assert_eq!(table, None);
    }
}
