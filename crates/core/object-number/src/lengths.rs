//! Field widths and the dataset length table.
//!
//! The dataset field is 3, 5, 7 or 9 digits wide depending on the assignment class, and the
//! revision suffix is either absent or 3 digits wide. Once the fixed-width child fields of a type
//! are removed, the remaining length therefore identifies exactly one
//! `(dataset digits, revision digits, assignment class)` triple. [`DATASET_LENGTHS`] is that
//! mapping, and both the encoder and the parser go through it.

use crate::assignment_class::AssignmentClass;

/// Width of the table field.
pub const TABLE_DIGITS: usize = 2;

/// Width of the column field.
pub const COLUMN_DIGITS: usize = 3;

/// Width of the partition field.
pub const PARTITION_DIGITS: usize = 3;

/// Width of the revision suffix when a revision is set.
pub const REVISION_DIGITS: usize = 3;

/// Possible widths of the revision suffix.
const REVISION_WIDTHS: [usize; 2] = [0, REVISION_DIGITS];

/// One row of the dataset length table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthEntry {
    /// Length of the dataset field plus the revision suffix
    pub len: usize,
    /// Width of the dataset field
    pub dataset_digits: usize,
    /// Width of the revision suffix (0 when absent)
    pub revision_digits: usize,
    pub class: AssignmentClass,
}

/// Every valid `(dataset digits, revision digits, class)` combination, keyed by total length.
pub const DATASET_LENGTHS: [LengthEntry; 8] = build_table();

const fn build_table() -> [LengthEntry; 8] {
    let mut table = [LengthEntry {
        len: 0,
        dataset_digits: 0,
        revision_digits: 0,
        class: AssignmentClass::SelfAssigned,
    }; 8];

    let mut i = 0;
    while i < AssignmentClass::ALL.len() {
        let class = AssignmentClass::ALL[i];
        let mut j = 0;
        while j < REVISION_WIDTHS.len() {
            let revision_digits = REVISION_WIDTHS[j];
            table[i * REVISION_WIDTHS.len() + j] = LengthEntry {
                len: class.digits() + revision_digits,
                dataset_digits: class.digits(),
                revision_digits,
                class,
            };
            j += 1;
        }
        i += 1;
    }

    table
}

const _: () = {
    // Two rows sharing a length would make parsing ambiguous.
    let mut i = 0;
    while i < DATASET_LENGTHS.len() {
        let mut j = i + 1;
        while j < DATASET_LENGTHS.len() {
            assert!(DATASET_LENGTHS[i].len != DATASET_LENGTHS[j].len);
            j += 1;
        }
        i += 1;
    }
};

/// Find the table row for a dataset-plus-revision payload of `len` characters.
pub fn lookup(len: usize) -> Option<LengthEntry> {
    DATASET_LENGTHS.iter().copied().find(|entry| entry.len == len)
}

/// Find the table row used to encode a number of the given class.
pub fn entry_for(class: AssignmentClass, has_revision: bool) -> LengthEntry {
    // Rows are laid out class-major, in `AssignmentClass::ALL` order.
    DATASET_LENGTHS[class as usize * REVISION_WIDTHS.len() + usize::from(has_revision)]
}
