//! Strata: fixed-capacity struct-of-arrays containers.
//!
//! A container holds a fixed number of records, but stores them column by
//! column: each field of the record type lives in its own contiguous,
//! properly aligned array. Element handles give record-style access to one
//! slot at a time, and whole columns are available as slices.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the strata sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! soa_record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Person {
//!         pub name: String,
//!         pub age: i32,
//!     }
//! }
//!
//! // Capacity is part of the type; storage is inline.
//! let mut people = FixedSoa::<Person, 3>::new();
//! people.field_write(0, Person::name, "a".to_string()).unwrap();
//! people.field_write(1, Person::name, "b".to_string()).unwrap();
//! people.field_write(0, Person::age, 10).unwrap();
//!
//! assert_eq!(people.field_read(1, Person::name).unwrap(), "b");
//! assert_eq!(people.field_read(1, Person::age).unwrap(), 0);
//!
//! // Capacity chosen at run time; storage is on the heap.
//! let more = DynSoa::<Person>::with_capacity(100).unwrap();
//! assert_eq!(more.iter().filter(|row| row.get(Person::age) == 0).count(), 100);
//!
//! // Out-of-range slots are errors, not panics.
//! let err = people.row(3).unwrap_err();
//! assert!(err.to_string().contains("[0, 3)"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`layout`] | `strata-core` | Column layout calculator, configuration, errors |
//! | [`store`] | `strata-store` | Storage backends, handles, iterators, containers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Column layout, configuration and errors (`strata-core`).
///
/// [`layout::SoaLayout`] computes where each column starts inside a
/// buffer; it does not touch memory and is usable on its own.
pub use strata_core as layout;

/// Storage backends, element handles and containers (`strata-store`).
///
/// Most users only need [`store::FixedSoa`] and [`store::DynSoa`], which
/// are also available in the [`prelude`].
pub use strata_store as store;

pub use strata_store::soa_record;

/// Common imports for typical strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Containers
    pub use strata_store::{DynSoa, FixedSoa, SharedSoa, Soa};

    // Records and handles
    pub use strata_store::{soa_record, FieldKey, Record, Row, RowMut};

    // Configuration and errors
    pub use strata_core::{SoaError, StorageConfig};
}
