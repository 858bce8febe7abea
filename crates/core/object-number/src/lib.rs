//! Object numbers: compact, typed, optionally revisioned identifiers for datasets, tables,
//! columns and partitions.
//!
//! This crate provides the base62 codec every identifier field is built on, the assignment
//! classes that decide the width of the dataset field, and the [`ObjectNumber`] variants with
//! their canonical string encoding.

pub mod assignment_class;
pub mod base62;
pub mod lengths;
pub mod number;

pub use self::{
    assignment_class::{AssignmentClass, AssignmentClassError},
    base62::DecodeError,
    number::{
        ColumnNumber, DatasetNumber, Field, ObjectNumber, OverflowError, ParseError,
        PartitionNumber, TableNumber, TypeTag, WrongTypeError,
    },
};
