//! Recommendation History Store
//!
//! CSV-backed daily snapshot table with one-record-per-(date, asset)
//! upsert semantics: a second write for the same calendar date replaces
//! the first. The design assumes a single writer; every mutation is a
//! full read-modify-rewrite through a temp file.

pub mod store;

pub use store::RecommendationHistoryStore;
