//! DBC parsing and the message catalog
//!
//! This module contains the DBC line parser and the catalog that merges
//! definitions from multiple files.

pub mod catalog;
pub mod dbc;

// Re-export key types for convenience
pub use catalog::{
    ByteOrder, CatalogStats, DbcCatalog, MessageDefinition, SignalDefinition, ValueType,
};
