//! Low-level primitives over the flat column buffer.
//!
//! Every `unsafe` operation on column memory is funnelled through this
//! module: typed slot addressing, column initialisation, teardown and
//! byte-wise slot swaps. Callers guarantee that `base` is the start of a
//! live buffer of at least `layout.total_bytes()` bytes aligned to
//! `layout.align()`.

use std::mem;
use std::ptr::{self, NonNull};

use strata_core::SoaLayout;

use crate::record::FieldSpec;

/// Fill `len` slots of a `T` column with `T::default()`.
///
/// # Safety
///
/// `column` must be aligned for `T` and valid for writes of `len` values.
pub(crate) unsafe fn init_column<T: Default>(column: *mut u8, len: usize) {
    let column = column.cast::<T>();
    for slot in 0..len {
        // SAFETY: slot < len and the caller guarantees `len` writable slots.
        unsafe { column.add(slot).write(T::default()) };
    }
}

/// Drop `len` initialised values of a `T` column in place.
///
/// A panicking destructor does not stop the remaining slots from being
/// dropped.
///
/// # Safety
///
/// `column` must point to `len` initialised, aligned `T` values that are
/// not read again.
pub(crate) unsafe fn drop_column<T>(column: *mut u8, len: usize) {
    let slice = ptr::slice_from_raw_parts_mut(column.cast::<T>(), len);
    // SAFETY: forwarded caller contract.
    unsafe { ptr::drop_in_place(slice) }
}

/// Typed pointer to `slot` of column `field`.
///
/// # Safety
///
/// `field < layout.field_count()`, `slot < layout.capacity()`, and the
/// column's value type must be `T`.
#[inline]
pub(crate) unsafe fn slot_ptr<T>(
    base: NonNull<u8>,
    layout: &SoaLayout,
    field: usize,
    slot: usize,
) -> NonNull<T> {
    debug_assert!(slot < layout.capacity());
    debug_assert_eq!(layout.columns()[field].stride(), mem::size_of::<T>());
    let offset = layout.address(field, slot);
    // SAFETY: offset + size_of::<T>() <= total_bytes for in-range slots.
    unsafe { base.add(offset).cast::<T>() }
}

/// Typed pointer to slot 0 of column `field`.
///
/// Valid (aligned, non-null) even when the container has no slots.
///
/// # Safety
///
/// `field < layout.field_count()` and the column's value type is `T`.
#[inline]
pub(crate) unsafe fn column_ptr<T>(base: NonNull<u8>, layout: &SoaLayout, field: usize) -> NonNull<T> {
    let col = &layout.columns()[field];
    debug_assert_eq!(col.stride(), mem::size_of::<T>());
    // SAFETY: column bases never exceed total_bytes.
    unsafe { base.add(col.base()).cast::<T>() }
}

/// Default-initialise every slot of every column.
///
/// If a `Default` impl panics, values already written are leaked rather
/// than dropped.
///
/// # Safety
///
/// `fields` must be the field table `layout` was computed from, and the
/// buffer must not hold initialised values that still need dropping.
pub(crate) unsafe fn init_columns(base: NonNull<u8>, layout: &SoaLayout, fields: &[FieldSpec]) {
    debug_assert_eq!(fields.len(), layout.field_count());
    for (spec, col) in fields.iter().zip(layout.columns()) {
        // SAFETY: the column lies within the buffer and is aligned for the
        // field type; see the caller contract.
        unsafe { spec.init(base.as_ptr().add(col.base()), layout.capacity()) };
    }
}

/// Drop every slot of every column, field by field.
///
/// If a destructor panics, the rest of that column and all later columns
/// are still dropped while unwinding.
///
/// # Safety
///
/// Every column must be fully initialised and must not be used again.
pub(crate) unsafe fn drop_columns(base: NonNull<u8>, layout: &SoaLayout, fields: &[FieldSpec]) {
    struct Teardown<'a> {
        base: NonNull<u8>,
        layout: &'a SoaLayout,
        fields: &'a [FieldSpec],
        next: usize,
    }

    impl Teardown<'_> {
        fn run(&mut self) {
            while let Some(spec) = self.fields.get(self.next) {
                let col = &self.layout.columns()[self.next];
                self.next += 1;
                // SAFETY: each column is dropped once; `next` advances
                // before the call so a panic moves on to the next column.
                unsafe { spec.drop(self.base.as_ptr().add(col.base()), self.layout.capacity()) };
            }
        }
    }

    impl Drop for Teardown<'_> {
        fn drop(&mut self) {
            self.run();
        }
    }

    debug_assert_eq!(fields.len(), layout.field_count());
    let mut teardown = Teardown {
        base,
        layout,
        fields,
        next: 0,
    };
    teardown.run();
}

/// Exchange all field values of slots `a` and `b`.
///
/// Values are moved bytewise, which is a valid move for every Rust type.
///
/// # Safety
///
/// Both slots must be `< layout.capacity()` and the buffer must be valid
/// for reads and writes.
pub(crate) unsafe fn swap_slots(base: NonNull<u8>, layout: &SoaLayout, a: usize, b: usize) {
    if a == b {
        return;
    }
    for (field, col) in layout.columns().iter().enumerate() {
        let stride = col.stride();
        if stride == 0 {
            continue;
        }
        // SAFETY: distinct slots of one column never overlap.
        unsafe {
            let pa = base.as_ptr().add(layout.address(field, a));
            let pb = base.as_ptr().add(layout.address(field, b));
            ptr::swap_nonoverlapping(pa, pb, stride);
        }
    }
}

/// Aligned, non-null pointer for zero-byte buffers.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(align)).unwrap_or(NonNull::dangling())
}
