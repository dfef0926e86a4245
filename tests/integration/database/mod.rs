//! SQLite store tests

pub mod sqlite_store_test;
