//! Object number types.
//!
//! An object number is the compact machine identifier of a dataset, table, column or partition.
//! Its canonical string form is
//!
//! ```text
//! <type-tag><dataset-digits><child-digits...><revision-digits-or-empty>
//! ```
//!
//! where every digit group is base62, left-padded with `'0'` to its fixed width. The revision
//! group is omitted entirely when no revision is set.
//!
//! Child numbers (table, column, partition) keep their owner without a revision; the revision is
//! carried once, on the child, and re-applied when the owner is requested.

use crate::{
    assignment_class::AssignmentClass,
    base62::{self, DecodeError},
    lengths::{self, COLUMN_DIGITS, PARTITION_DIGITS, REVISION_DIGITS, TABLE_DIGITS},
};

/// Largest revision that fits the revision suffix.
pub const MAX_REVISION: u64 = base62::capacity(REVISION_DIGITS as u32) - 1;

/// Largest table value that fits the table field.
pub const MAX_TABLE: u64 = base62::capacity(TABLE_DIGITS as u32) - 1;

/// Largest column value that fits the column field.
pub const MAX_COLUMN: u64 = base62::capacity(COLUMN_DIGITS as u32) - 1;

/// Largest partition value that fits the partition field.
pub const MAX_PARTITION: u64 = base62::capacity(PARTITION_DIGITS as u32) - 1;

/// The leading character of an object number, naming its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Dataset,
    Table,
    Column,
    Partition,
}

impl TypeTag {
    /// Tag accepted for datasets numbered before the `d` tag existed.
    pub const LEGACY_DATASET: char = 'a';

    pub const fn as_char(self) -> char {
        match self {
            TypeTag::Dataset => 'd',
            TypeTag::Table => 't',
            TypeTag::Column => 'c',
            TypeTag::Partition => 'p',
        }
    }

    /// Map a tag character to its variant, accepting the legacy dataset tag.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'd' | Self::LEGACY_DATASET => Some(TypeTag::Dataset),
            't' => Some(TypeTag::Table),
            'c' => Some(TypeTag::Column),
            'p' => Some(TypeTag::Partition),
            _ => None,
        }
    }

    /// Number of characters between the dataset field and the revision suffix.
    pub const fn child_digits(self) -> usize {
        match self {
            TypeTag::Dataset => 0,
            TypeTag::Table => TABLE_DIGITS,
            TypeTag::Column => TABLE_DIGITS + COLUMN_DIGITS,
            TypeTag::Partition => PARTITION_DIGITS,
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeTag::Dataset => "dataset",
            TypeTag::Table => "table",
            TypeTag::Column => "column",
            TypeTag::Partition => "partition",
        };
        f.write_str(name)
    }
}

/// The number of a dataset (bundle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetNumber {
    dataset: u64,
    assignment_class: AssignmentClass,
    revision: Option<u64>,
}

impl DatasetNumber {
    /// Create a dataset number, checking that the value fits the class's digit width.
    pub fn new(dataset: u64, assignment_class: AssignmentClass) -> Result<Self, OverflowError> {
        check(Field::Dataset, dataset, assignment_class.capacity() - 1)?;
        Ok(Self {
            dataset,
            assignment_class,
            revision: None,
        })
    }

    /// Draw a dataset number uniformly from the full range of the class.
    ///
    /// This is collision avoidance by probability only. Nothing here checks the number against
    /// existing datasets; a duplicate surfaces later as a uniqueness conflict in the store.
    pub fn generate(assignment_class: AssignmentClass) -> Self {
        Self {
            dataset: rand::random_range(0..assignment_class.capacity()),
            assignment_class,
            revision: None,
        }
    }

    /// Return a copy carrying `revision`.
    pub fn with_revision(self, revision: Option<u64>) -> Result<Self, OverflowError> {
        check_revision(revision)?;
        Ok(Self { revision, ..self })
    }

    pub fn dataset(&self) -> u64 {
        self.dataset
    }

    pub fn assignment_class(&self) -> AssignmentClass {
        self.assignment_class
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Number of a table in this dataset; the table inherits this number's revision.
    pub fn as_table(&self, table: u64) -> Result<TableNumber, OverflowError> {
        TableNumber::new(*self, table, None)
    }

    /// Number of a partition of this dataset; the partition inherits this number's revision.
    pub fn as_partition(&self, partition: u64) -> Result<PartitionNumber, OverflowError> {
        PartitionNumber::new(*self, partition, None)
    }

    fn unrevisioned(self) -> Self {
        Self {
            revision: None,
            ..self
        }
    }
}

impl std::fmt::Display for DatasetNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&compose(TypeTag::Dataset, self, &[], self.revision))
    }
}

/// The number of a table within a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableNumber {
    dataset: DatasetNumber,
    table: u64,
    revision: Option<u64>,
}

impl TableNumber {
    /// Create a table number. Without an explicit revision the dataset's revision is inherited.
    pub fn new(
        dataset: DatasetNumber,
        table: u64,
        revision: Option<u64>,
    ) -> Result<Self, OverflowError> {
        check(Field::Table, table, MAX_TABLE)?;
        let revision = revision.or(dataset.revision);
        check_revision(revision)?;
        Ok(Self {
            dataset: dataset.unrevisioned(),
            table,
            revision,
        })
    }

    pub fn table(&self) -> u64 {
        self.table
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// The owning dataset, carrying this table's revision.
    pub fn dataset(&self) -> DatasetNumber {
        DatasetNumber {
            revision: self.revision,
            ..self.dataset
        }
    }

    /// Number of a column of this table; the column inherits this number's revision.
    pub fn as_column(&self, column: u64) -> Result<ColumnNumber, OverflowError> {
        ColumnNumber::new(*self, column, None)
    }

    fn unrevisioned(self) -> Self {
        Self {
            revision: None,
            ..self
        }
    }
}

impl std::fmt::Display for TableNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let children = [(self.table, TABLE_DIGITS)];
        f.write_str(&compose(
            TypeTag::Table,
            &self.dataset,
            &children,
            self.revision,
        ))
    }
}

/// The number of a column within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnNumber {
    table: TableNumber,
    column: u64,
    revision: Option<u64>,
}

impl ColumnNumber {
    /// Create a column number. Without an explicit revision the table's revision is inherited.
    pub fn new(
        table: TableNumber,
        column: u64,
        revision: Option<u64>,
    ) -> Result<Self, OverflowError> {
        check(Field::Column, column, MAX_COLUMN)?;
        let revision = revision.or(table.revision);
        check_revision(revision)?;
        Ok(Self {
            table: table.unrevisioned(),
            column,
            revision,
        })
    }

    pub fn column(&self) -> u64 {
        self.column
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// The owning table, carrying this column's revision.
    pub fn table(&self) -> TableNumber {
        TableNumber {
            revision: self.revision,
            ..self.table
        }
    }

    /// The owning dataset, carrying this column's revision.
    pub fn dataset(&self) -> DatasetNumber {
        self.table().dataset()
    }
}

impl std::fmt::Display for ColumnNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let children = [(self.table.table, TABLE_DIGITS), (self.column, COLUMN_DIGITS)];
        f.write_str(&compose(
            TypeTag::Column,
            &self.table.dataset,
            &children,
            self.revision,
        ))
    }
}

/// The number of a partition within a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionNumber {
    dataset: DatasetNumber,
    partition: u64,
    revision: Option<u64>,
}

impl PartitionNumber {
    /// Create a partition number. Without an explicit revision the dataset's revision is
    /// inherited.
    pub fn new(
        dataset: DatasetNumber,
        partition: u64,
        revision: Option<u64>,
    ) -> Result<Self, OverflowError> {
        check(Field::Partition, partition, MAX_PARTITION)?;
        let revision = revision.or(dataset.revision);
        check_revision(revision)?;
        Ok(Self {
            dataset: dataset.unrevisioned(),
            partition,
            revision,
        })
    }

    pub fn partition(&self) -> u64 {
        self.partition
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// The owning dataset, carrying this partition's revision.
    pub fn dataset(&self) -> DatasetNumber {
        DatasetNumber {
            revision: self.revision,
            ..self.dataset
        }
    }
}

impl std::fmt::Display for PartitionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let children = [(self.partition, PARTITION_DIGITS)];
        f.write_str(&compose(
            TypeTag::Partition,
            &self.dataset,
            &children,
            self.revision,
        ))
    }
}

/// Any object number.
///
/// `Display` composes the canonical string and `FromStr` parses it back; for every valid value
/// `on`, `on.to_string().parse() == Ok(on)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectNumber {
    Dataset(DatasetNumber),
    Table(TableNumber),
    Column(ColumnNumber),
    Partition(PartitionNumber),
}

impl ObjectNumber {
    /// Parse a canonical object number string.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        s.parse()
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            ObjectNumber::Dataset(_) => TypeTag::Dataset,
            ObjectNumber::Table(_) => TypeTag::Table,
            ObjectNumber::Column(_) => TypeTag::Column,
            ObjectNumber::Partition(_) => TypeTag::Partition,
        }
    }

    pub fn revision(&self) -> Option<u64> {
        match self {
            ObjectNumber::Dataset(on) => on.revision,
            ObjectNumber::Table(on) => on.revision,
            ObjectNumber::Column(on) => on.revision,
            ObjectNumber::Partition(on) => on.revision,
        }
    }

    /// The dataset this number belongs to (itself for a dataset), with this number's revision.
    pub fn dataset(&self) -> DatasetNumber {
        match self {
            ObjectNumber::Dataset(on) => *on,
            ObjectNumber::Table(on) => on.dataset(),
            ObjectNumber::Column(on) => on.dataset(),
            ObjectNumber::Partition(on) => on.dataset(),
        }
    }

    /// Return a copy with `revision` replacing the current one. The original is unchanged.
    pub fn rev(&self, revision: Option<u64>) -> Result<Self, OverflowError> {
        check_revision(revision)?;
        let on = match *self {
            ObjectNumber::Dataset(on) => ObjectNumber::Dataset(DatasetNumber { revision, ..on }),
            ObjectNumber::Table(on) => ObjectNumber::Table(TableNumber { revision, ..on }),
            ObjectNumber::Column(on) => ObjectNumber::Column(ColumnNumber { revision, ..on }),
            ObjectNumber::Partition(on) => {
                ObjectNumber::Partition(PartitionNumber { revision, ..on })
            }
        };
        Ok(on)
    }

    /// The same number with no revision; its string form is the unversioned `id`.
    pub fn without_revision(&self) -> Self {
        match *self {
            ObjectNumber::Dataset(on) => ObjectNumber::Dataset(on.unrevisioned()),
            ObjectNumber::Table(on) => ObjectNumber::Table(on.unrevisioned()),
            ObjectNumber::Column(on) => ObjectNumber::Column(ColumnNumber {
                revision: None,
                ..on
            }),
            ObjectNumber::Partition(on) => ObjectNumber::Partition(PartitionNumber {
                revision: None,
                ..on
            }),
        }
    }

    pub fn as_dataset(&self) -> Option<&DatasetNumber> {
        match self {
            ObjectNumber::Dataset(on) => Some(on),
            _ => None,
        }
    }

    pub fn as_partition(&self) -> Option<&PartitionNumber> {
        match self {
            ObjectNumber::Partition(on) => Some(on),
            _ => None,
        }
    }
}

impl From<DatasetNumber> for ObjectNumber {
    fn from(on: DatasetNumber) -> Self {
        ObjectNumber::Dataset(on)
    }
}

impl From<TableNumber> for ObjectNumber {
    fn from(on: TableNumber) -> Self {
        ObjectNumber::Table(on)
    }
}

impl From<ColumnNumber> for ObjectNumber {
    fn from(on: ColumnNumber) -> Self {
        ObjectNumber::Column(on)
    }
}

impl From<PartitionNumber> for ObjectNumber {
    fn from(on: PartitionNumber) -> Self {
        ObjectNumber::Partition(on)
    }
}

impl TryFrom<ObjectNumber> for DatasetNumber {
    type Error = WrongTypeError;

    fn try_from(on: ObjectNumber) -> Result<Self, Self::Error> {
        match on {
            ObjectNumber::Dataset(on) => Ok(on),
            other => Err(WrongTypeError {
                expected: TypeTag::Dataset,
                found: other.type_tag(),
            }),
        }
    }
}

impl TryFrom<ObjectNumber> for PartitionNumber {
    type Error = WrongTypeError;

    fn try_from(on: ObjectNumber) -> Result<Self, Self::Error> {
        match on {
            ObjectNumber::Partition(on) => Ok(on),
            other => Err(WrongTypeError {
                expected: TypeTag::Partition,
                found: other.type_tag(),
            }),
        }
    }
}

impl std::fmt::Display for ObjectNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectNumber::Dataset(on) => on.fmt(f),
            ObjectNumber::Table(on) => on.fmt(f),
            ObjectNumber::Column(on) => on.fmt(f),
            ObjectNumber::Partition(on) => on.fmt(f),
        }
    }
}

impl std::str::FromStr for ObjectNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(tag_char) = s.chars().next() else {
            return Err(ParseError::Empty);
        };
        let tag = TypeTag::from_char(tag_char).ok_or_else(|| ParseError::UnknownType {
            tag: tag_char,
            input: s.to_string(),
        })?;

        let rest = &s[tag_char.len_utf8()..];
        if let Some(character) = rest.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(ParseError::Decode(DecodeError::InvalidCharacter {
                character,
                value: rest.to_string(),
            }));
        }

        let entry = rest
            .len()
            .checked_sub(tag.child_digits())
            .and_then(lengths::lookup)
            .ok_or_else(|| ParseError::UnfamiliarLength {
                input: s.to_string(),
                length: rest.len(),
            })?;

        let (dataset_digits, rest) = rest.split_at(entry.dataset_digits);
        let (child_digits, revision_digits) = rest.split_at(tag.child_digits());

        let dataset = DatasetNumber::new(base62::decode(dataset_digits)?, entry.class)?;
        let revision = match revision_digits {
            "" => None,
            digits => Some(base62::decode(digits)?),
        };

        let on = match tag {
            TypeTag::Dataset => ObjectNumber::Dataset(dataset.with_revision(revision)?),
            TypeTag::Table => {
                let table = base62::decode(child_digits)?;
                ObjectNumber::Table(TableNumber::new(dataset, table, revision)?)
            }
            TypeTag::Column => {
                let (table_digits, column_digits) = child_digits.split_at(TABLE_DIGITS);
                let table = TableNumber::new(dataset, base62::decode(table_digits)?, None)?;
                let column = base62::decode(column_digits)?;
                ObjectNumber::Column(ColumnNumber::new(table, column, revision)?)
            }
            TypeTag::Partition => {
                let partition = base62::decode(child_digits)?;
                ObjectNumber::Partition(PartitionNumber::new(dataset, partition, revision)?)
            }
        };

        Ok(on)
    }
}

impl std::str::FromStr for DatasetNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<ObjectNumber>()?.try_into()?)
    }
}

impl std::str::FromStr for PartitionNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<ObjectNumber>()?.try_into()?)
    }
}

impl serde::Serialize for ObjectNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ObjectNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

fn compose(
    tag: TypeTag,
    dataset: &DatasetNumber,
    children: &[(u64, usize)],
    revision: Option<u64>,
) -> String {
    let entry = lengths::entry_for(dataset.assignment_class, revision.is_some());

    let mut out = String::with_capacity(1 + entry.len + tag.child_digits());
    out.push(tag.as_char());
    out.push_str(&base62::encode_padded(dataset.dataset, entry.dataset_digits));
    for &(value, width) in children {
        out.push_str(&base62::encode_padded(value, width));
    }
    if let Some(revision) = revision {
        out.push_str(&base62::encode_padded(revision, entry.revision_digits));
    }
    out
}

fn check(field: Field, value: u64, max: u64) -> Result<(), OverflowError> {
    if value > max {
        return Err(OverflowError { field, value, max });
    }
    Ok(())
}

fn check_revision(revision: Option<u64>) -> Result<(), OverflowError> {
    match revision {
        Some(revision) => check(Field::Revision, revision, MAX_REVISION),
        None => Ok(()),
    }
}

/// A fixed-width field of an object number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Dataset,
    Table,
    Column,
    Partition,
    Revision,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Dataset => "dataset",
            Field::Table => "table",
            Field::Column => "column",
            Field::Partition => "partition",
            Field::Revision => "revision",
        };
        f.write_str(name)
    }
}

/// A field value does not fit its fixed digit width
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} value {value} is too large (max is {max})")]
pub struct OverflowError {
    pub field: Field,
    pub value: u64,
    pub max: u64,
}

/// An object number has a different variant than required
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a {expected} number, got a {found} number")]
pub struct WrongTypeError {
    pub expected: TypeTag,
    pub found: TypeTag,
}

/// Errors that can occur when parsing an object number from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing to parse
    #[error("object number cannot be empty")]
    Empty,

    /// The leading character is not a known type tag
    #[error("unknown type character '{tag}' in '{input}'")]
    UnknownType { tag: char, input: String },

    /// The length after the type tag matches no row of the dataset length table
    #[error("object number '{input}' has an unfamiliar length: {length}")]
    UnfamiliarLength { input: String, length: usize },

    /// A digit group is not valid base62
    #[error("invalid digits in object number: {0}")]
    Decode(#[from] DecodeError),

    /// A decoded field exceeds its width
    #[error("invalid field in object number: {0}")]
    Overflow(#[from] OverflowError),

    /// The string parsed, but to the wrong variant
    #[error(transparent)]
    WrongType(#[from] WrongTypeError),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dataset(value: u64, class: AssignmentClass) -> DatasetNumber {
        DatasetNumber::new(value, class).expect("dataset value should fit")
    }

    #[test]
    fn compose_self_assigned_dataset_pads_to_nine_digits() {
        //* Given
        let on = dataset(5, AssignmentClass::SelfAssigned);

        //* When
        let composed = on.to_string();

        //* Then
        assert_eq!(composed, "d000000005");
        let parsed: ObjectNumber = composed.parse().expect("composed string should parse");
        assert_eq!(parsed, ObjectNumber::Dataset(on));
        assert_eq!(parsed.revision(), None, "no revision was set");
    }

    #[test]
    fn compose_appends_padded_revision() {
        //* Given
        let on = dataset(5, AssignmentClass::Authoritative)
            .with_revision(Some(7))
            .expect("revision should fit");

        //* Then
        assert_eq!(on.to_string(), "d005007");
    }

    #[test]
    fn revision_zero_is_distinct_from_no_revision() {
        //* Given
        let on = dataset(1, AssignmentClass::Registered)
            .with_revision(Some(0))
            .expect("revision should fit");

        //* When
        let parsed: ObjectNumber = on.to_string().parse().expect("should parse");

        //* Then
        assert_eq!(on.to_string(), "d00001000");
        assert_eq!(parsed.revision(), Some(0));
    }

    #[test]
    fn parse_inverts_compose_for_every_variant_and_class() {
        for class in AssignmentClass::ALL {
            for revision in [None, Some(1), Some(MAX_REVISION)] {
                //* Given
                let ds = dataset(class.capacity() - 1, class)
                    .with_revision(revision)
                    .expect("revision should fit");
                let table = ds.as_table(MAX_TABLE).expect("table should fit");
                let numbers = [
                    ObjectNumber::Dataset(ds),
                    ObjectNumber::Table(table),
                    ObjectNumber::Column(table.as_column(61).expect("column should fit")),
                    ObjectNumber::Partition(ds.as_partition(3).expect("partition should fit")),
                ];

                for on in numbers {
                    //* When
                    let composed = on.to_string();
                    let parsed = ObjectNumber::parse(&composed);

                    //* Then
                    assert_eq!(parsed, Ok(on), "round trip of '{composed}'");
                }
            }
        }
    }

    #[test]
    fn children_inherit_dataset_revision() {
        //* Given
        let ds = dataset(10, AssignmentClass::SelfAssigned)
            .with_revision(Some(4))
            .expect("revision should fit");

        //* When
        let table = ds.as_table(1).expect("table should fit");
        let column = table.as_column(2).expect("column should fit");
        let partition = ds.as_partition(3).expect("partition should fit");

        //* Then
        assert_eq!(table.revision(), Some(4));
        assert_eq!(column.revision(), Some(4));
        assert_eq!(partition.revision(), Some(4));
        assert_eq!(partition.dataset(), ds, "owner carries the child's revision");
    }

    #[test]
    fn explicit_child_revision_wins_over_inherited() {
        let ds = dataset(10, AssignmentClass::SelfAssigned)
            .with_revision(Some(4))
            .expect("revision should fit");

        let partition = PartitionNumber::new(ds, 0, Some(9)).expect("partition should fit");

        assert_eq!(partition.revision(), Some(9));
        assert_eq!(partition.dataset().revision(), Some(9));
    }

    #[test]
    fn column_string_layout() {
        //* Given
        let table = dataset(1, AssignmentClass::Authoritative)
            .as_table(2)
            .expect("table should fit");
        let column = table.as_column(3).expect("column should fit");

        //* Then
        assert_eq!(column.to_string(), "c00102003");
        assert_eq!(column.table().table(), 2);
        assert_eq!(column.dataset().dataset(), 1);
    }

    #[test]
    fn rev_returns_modified_copy() {
        //* Given
        let original = ObjectNumber::Partition(
            dataset(77, AssignmentClass::SelfAssigned)
                .as_partition(5)
                .expect("partition should fit"),
        );

        //* When
        let revised = original.rev(Some(12)).expect("revision should fit");

        //* Then
        assert_eq!(original.revision(), None, "original is untouched");
        assert_eq!(revised.revision(), Some(12));
        assert_eq!(revised.without_revision(), original);
    }

    #[test]
    fn legacy_dataset_tag_parses_as_dataset() {
        //* When
        let parsed = ObjectNumber::parse("a000000005").expect("legacy tag should parse");

        //* Then
        assert_eq!(parsed.type_tag(), TypeTag::Dataset);
        assert_eq!(parsed.to_string(), "d000000005", "re-composes with the current tag");
    }

    #[test]
    fn parse_with_unknown_tag_fails() {
        let result = ObjectNumber::parse("x000000005");
        assert!(matches!(result, Err(ParseError::UnknownType { tag: 'x', .. })));
    }

    #[test]
    fn parse_with_unfamiliar_length_fails() {
        //* Given
        let inputs = ["d0000", "d00000000000", "p01", "t"];

        //* Then
        for input in inputs {
            let result = ObjectNumber::parse(input);
            assert!(
                matches!(result, Err(ParseError::UnfamiliarLength { .. }) | Err(ParseError::Empty)),
                "'{input}' should be rejected by length, got {result:?}"
            );
        }
    }

    #[test]
    fn parse_with_non_base62_digit_fails() {
        let result = ObjectNumber::parse("d00000000-");
        assert!(matches!(result, Err(ParseError::Decode(_))));
    }

    #[test]
    fn parse_empty_fails() {
        assert_eq!(ObjectNumber::parse(""), Err(ParseError::Empty));
    }

    #[test]
    fn construction_rejects_values_beyond_width() {
        //* Then
        assert!(matches!(
            DatasetNumber::new(AssignmentClass::Authoritative.capacity(), AssignmentClass::Authoritative),
            Err(OverflowError { field: Field::Dataset, .. })
        ));
        let ds = dataset(1, AssignmentClass::Registered);
        assert!(matches!(
            ds.as_table(MAX_TABLE + 1),
            Err(OverflowError { field: Field::Table, .. })
        ));
        assert!(matches!(
            ds.as_partition(MAX_PARTITION + 1),
            Err(OverflowError { field: Field::Partition, .. })
        ));
        assert!(matches!(
            ds.with_revision(Some(MAX_REVISION + 1)),
            Err(OverflowError { field: Field::Revision, .. })
        ));
    }

    #[test]
    fn generate_stays_within_class_range() {
        for class in AssignmentClass::ALL {
            for _ in 0..32 {
                let on = DatasetNumber::generate(class);
                assert!(on.dataset() < class.capacity());
                assert_eq!(on.to_string().len(), 1 + class.digits());
            }
        }
    }

    #[test]
    fn typed_from_str_rejects_other_variants() {
        //* Given
        let partition = dataset(1, AssignmentClass::Authoritative)
            .as_partition(1)
            .expect("partition should fit")
            .to_string();

        //* When
        let result = partition.parse::<DatasetNumber>();

        //* Then
        assert!(matches!(
            result,
            Err(ParseError::WrongType(WrongTypeError {
                expected: TypeTag::Dataset,
                found: TypeTag::Partition
            }))
        ));
    }

    #[test]
    fn serde_uses_canonical_string() {
        //* Given
        let on = ObjectNumber::Dataset(dataset(5, AssignmentClass::SelfAssigned));

        //* When
        let json = serde_json::to_string(&on).expect("should serialize");
        let back: ObjectNumber = serde_json::from_str(&json).expect("should deserialize");

        //* Then
        assert_eq!(json, "\"d000000005\"");
        assert_eq!(back, on);
    }
}
