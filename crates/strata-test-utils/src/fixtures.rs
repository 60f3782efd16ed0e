//! Reusable record types.
//!
//! - [`Person`]: owned heap data next to a plain integer.
//! - [`Particle`]: mixed sizes and alignments, no drop glue.
//! - [`Tracked`]: two drop-counting columns plus a plain id.
//! - [`Fragile`]: a column whose destructor may panic.

use strata_store::soa_record;

use crate::{DropCounter, Volatile};

soa_record! {
    /// Named person with an age.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Person {
        pub name: String,
        pub age: i32,
    }
}

impl Person {
    pub fn new(name: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}

soa_record! {
    /// Point mass in 3D.
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub struct Particle {
        pub position: [f32; 3],
        pub velocity: [f32; 3],
        pub mass: f32,
        pub alive: bool,
    }
}

soa_record! {
    /// Record with two drop-tracked fields.
    #[derive(Debug, Default)]
    pub struct Tracked {
        pub first: DropCounter,
        pub second: DropCounter,
        pub id: u32,
    }
}

soa_record! {
    /// Record whose first column may panic on drop.
    #[derive(Debug, Default)]
    pub struct Fragile {
        pub volatile: Volatile,
        pub tally: DropCounter,
    }
}
