//! Logging setup shared by the catalog crates and their tests.

pub mod logging;
