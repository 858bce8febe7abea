//! Tests for partition resolution against the in-memory store

mod utils;

mod it_find_or_new;
mod it_get_delete;
