// LogTrim - core/mod.rs
//
// Core business logic layer: format decoding, streaming, interval
// algebra, indexing, and export.
// Must NOT depend on: app or platform layers.

pub mod dataflash;
pub mod export;
pub mod history;
pub mod indexer;
pub mod model;
pub mod reader;
pub mod segments;
pub mod timestamp;
