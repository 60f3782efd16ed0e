//! Column storage and container types for strata.
//!
//! Stores a fixed number of records column by column: every field of the
//! record type gets its own contiguous array inside a single buffer, and
//! slot `i` of the container is the `i`-th entry of every column.
//!
//! This is the only strata crate that contains `unsafe` code. All raw
//! pointer arithmetic is confined to the private `raw` module; every other
//! module builds safe APIs on top of it.
//!
//! # Architecture
//!
//! ```text
//! Soa<R, S> (container facade)
//! ├── SoaLayout (column bases and strides, from strata-core)
//! ├── S: Storage
//! │   ├── InlineBuffer<R, N> (capacity in the type, no allocation)
//! │   └── HeapBuffer (capacity at run time, zeroed heap allocation)
//! └── Row / RowMut (per-slot handles, borrowed from the container)
//! ```
//!
//! Record types implement [`Record`], normally through [`soa_record!`],
//! which also generates one [`FieldKey`] constant per field.
//!
//! # Example
//!
//! ```
//! use strata_store::{soa_record, FixedSoa};
//!
//! soa_record! {
//!     pub struct Particle {
//!         pub position: [f32; 2],
//!         pub mass: f32,
//!     }
//! }
//!
//! let mut particles = FixedSoa::<Particle, 4>::new();
//! particles.fill(Particle::mass, 1.0);
//! for mut row in particles.iter_mut() {
//!     let x = row.slot() as f32;
//!     row.set(Particle::position, [x, 0.0]);
//! }
//! let total: f32 = particles.column(Particle::mass).iter().sum();
//! assert_eq!(total, 4.0);
//! assert_eq!(particles.field_read(3, Particle::position).unwrap(), [3.0, 0.0]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod handle;
pub mod iter;
mod macros;
mod raw;
pub mod record;
pub mod soa;

// Public re-exports for the primary API surface.
pub use buffer::{HeapBuffer, InlineBuffer, Storage};
pub use handle::{Row, RowMut};
pub use iter::{Rows, RowsMut};
pub use record::{FieldKey, FieldSpec, Record};
pub use soa::{DynSoa, FixedSoa, SharedSoa, Soa};

pub use strata_core::{ColumnLayout, FieldShape, SoaError, SoaLayout, StorageConfig};
