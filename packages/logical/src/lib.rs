//! Lockbox logical layer: the contract every mounted backend satisfies.
//!
//! This crate knows nothing about mount tables or routing. It defines:
//! - `Request` / `Response`: what flows into and out of a backend
//! - `Operation`: the kind of work a request asks for
//! - `Backend`: the capability set a mount target implements
//! - `Storage`: a namespaced key/value interface, plus `InmemStorage` and
//!   the prefixing `StorageView`
//!
//! # Example
//!
//! ```rust
//! use lockbox_logical::{Operation, Request};
//! use std::time::Duration;
//!
//! let req = Request::new(Operation::Read, "secret/foo").with_wrap_ttl(Duration::from_secs(30));
//! assert_eq!(req.path, "secret/foo");
//! ```

mod backend;
mod error;
mod operation;
mod paths;
mod request;
mod response;
mod storage;
mod system_view;

pub use backend::Backend;
pub use error::{Error, Result};
pub use operation::{Operation, ParseOperationError};
pub use paths::Paths;
pub use request::{Connection, Request};
pub use response::{Response, WrapInfo};
pub use storage::{InmemStorage, Storage, StorageEntry, StorageView};
pub use system_view::{StaticSystemView, SystemView};

pub use bytes::Bytes;
