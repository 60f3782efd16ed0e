//! Core types for strata struct-of-arrays containers.
//!
//! This is the leaf crate with no internal dependencies. It holds the pure
//! parts of the system: the column [`layout`] calculator, the
//! [`StorageConfig`] and the shared [`SoaError`] type. Everything that
//! touches raw memory lives in `strata-store`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod layout;

pub use config::StorageConfig;
pub use error::SoaError;
pub use layout::{compute_layout, ColumnLayout, FieldShape, SoaLayout};
