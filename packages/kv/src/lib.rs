//! Generic key/value secret engine.
//!
//! Stores arbitrary JSON objects at arbitrary paths inside its mount's
//! storage view. Reads return the stored object, writes replace it, lists
//! return the names one level below a directory.

mod backend;

pub use backend::{KvBackend, BACKEND_TYPE};
