//! Integration test: end-to-end container usage through the public API.
//!
//! Exercises both storage backends with the shared fixtures, including
//! the error paths callers see and read-only sharing across threads.

use std::sync::Arc;
use std::thread;

use strata_store::{DynSoa, FixedSoa, SharedSoa, SoaError, StorageConfig};
use strata_test_utils::{Particle, Person};

// ── Basic reads and writes ──────────────────────────────────────────

#[test]
fn names_and_ages_in_three_slots() {
    let mut people = DynSoa::<Person>::with_capacity(3).unwrap();
    for (slot, name) in ["a", "b", "c"].into_iter().enumerate() {
        people.field_write(slot, Person::name, name.to_string()).unwrap();
    }
    people.field_write(0, Person::age, 10).unwrap();

    assert_eq!(people.field_read(1, Person::name).unwrap(), "b");
    assert_eq!(people.field_read(0, Person::age).unwrap(), 10);
    assert_eq!(people.field_read(1, Person::age).unwrap(), 0);
    assert_eq!(people.len(), 3);
}

#[test]
fn handle_for_missing_slot_names_the_range() {
    let people = FixedSoa::<Person, 2>::new();
    let err = people.row(2).unwrap_err();
    assert_eq!(err, SoaError::IndexOutOfBounds { index: 2, len: 2 });
    assert!(err.to_string().contains("[0, 2)"));
}

#[test]
fn zero_capacity_is_valid() {
    let people = DynSoa::<Person>::with_capacity(0).unwrap();
    assert_eq!(people.iter().count(), 0);
    assert!(people.row(0).is_err());
}

#[test]
#[cfg_attr(miri, ignore)]
fn oversized_heap_request_reports_allocation_failure() {
    let people = DynSoa::<Person>::with_capacity(1 << 56);
    match people {
        Err(SoaError::AllocationFailed { bytes, align }) => {
            assert!(bytes >= (1 << 56) * std::mem::size_of::<String>());
            assert_eq!(align, std::mem::align_of::<String>());
        }
        other => panic!("expected AllocationFailed, got {other:?}"),
    }
}

#[test]
fn records_round_trip_through_rows() {
    let input = vec![Person::new("ada", 36), Person::new("alan", 41)];
    let people = DynSoa::from_records(input.clone()).unwrap();
    let output: Vec<Person> = people
        .iter()
        .map(|row| Person {
            name: row.get(Person::name),
            age: row.get(Person::age),
        })
        .collect();
    assert_eq!(output, input);
}

// ── Column access ───────────────────────────────────────────────────

#[test]
fn particle_integration_step() {
    let mut particles = FixedSoa::<Particle, 8>::new();
    particles.fill(Particle::alive, true);
    particles.fill(Particle::velocity, [1.0, 0.5, 0.0]);
    particles.field_write(3, Particle::alive, false).unwrap();

    for mut row in particles.iter_mut() {
        if !row.get(Particle::alive) {
            continue;
        }
        let v = row.get(Particle::velocity);
        let p = row.get_mut(Particle::position);
        for axis in 0..3 {
            p[axis] += v[axis];
        }
    }

    assert_eq!(particles.field_read(0, Particle::position).unwrap(), [1.0, 0.5, 0.0]);
    assert_eq!(particles.field_read(3, Particle::position).unwrap(), [0.0; 3]);
    let alive = particles.column(Particle::alive).iter().filter(|a| **a).count();
    assert_eq!(alive, 7);
}

#[test]
fn columns_are_aligned_for_their_type() {
    let particles = DynSoa::<Particle>::with_capacity(5).unwrap();
    assert_eq!(particles.column(Particle::mass).as_ptr() as usize % 4, 0);
    assert_eq!(particles.column(Particle::position).len(), 5);

    let padded =
        DynSoa::<Particle>::with_config(5, &StorageConfig::cache_aligned()).unwrap();
    for column in padded.layout().columns() {
        assert_eq!(column.base() % StorageConfig::CACHE_LINE, 0);
    }
    assert_eq!(padded.column(Particle::alive).as_ptr() as usize % 64, 0);
}

#[test]
fn field_lookup_by_name_matches_keys() {
    let particles = FixedSoa::<Particle, 1>::new();
    assert_eq!(particles.field_index("mass").unwrap(), Particle::mass.index());
    assert_eq!(Particle::alive.name(), "alive");
    assert!(particles.field_index("charge").is_err());
}

// ── Sharing ─────────────────────────────────────────────────────────

#[test]
fn shared_container_is_readable_from_many_threads() {
    let mut people = DynSoa::<Person>::with_capacity(64).unwrap();
    for mut row in people.iter_mut() {
        let slot = row.slot() as i32;
        row.set(Person::age, slot);
        row.set(Person::name, format!("p{slot}"));
    }
    let shared: SharedSoa<Person> = people.into_shared();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.column(Person::age).iter().map(|&a| i64::from(a)).sum::<i64>())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), (0..64).sum::<i64>());
    }
    assert_eq!(shared.field_read(63, Person::name).unwrap(), "p63");
}

#[test]
fn scoped_threads_write_disjoint_slots() {
    let mut people = FixedSoa::<Person, 6>::new();
    thread::scope(|scope| {
        for mut row in people.iter_mut() {
            scope.spawn(move || {
                let slot = row.slot();
                row.set(Person::age, slot as i32 * 2);
            });
        }
    });
    assert_eq!(people.column(Person::age), &[0, 2, 4, 6, 8, 10]);
}

#[test]
fn unique_shared_container_can_be_mutated() {
    let mut shared = DynSoa::<Person>::with_capacity(2).unwrap().into_shared();
    let people = Arc::get_mut(&mut shared).unwrap();
    people.field_write(0, Person::age, 5).unwrap();
    assert_eq!(shared.field_read(0, Person::age).unwrap(), 5);
}
