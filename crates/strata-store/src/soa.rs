//! The container facade: fixed-capacity and runtime-capacity SoA storage.
//!
//! [`Soa`] is generic over its [`Storage`] backend and is normally used
//! through one of two aliases:
//!
//! - [`FixedSoa<R, N>`]: `N` is part of the type, the buffer is inline.
//! - [`DynSoa<R>`]: capacity chosen at run time, the buffer is on the heap.
//!   Wrap it in [`SharedSoa`] (an `Arc`) for shared read access.
//!
//! Capacity never changes after construction. Every slot holds an
//! initialised value of every field from construction until drop.
//!
//! # Bounds checking
//!
//! All safe slot accessors check `slot < len()` and return
//! [`SoaError::IndexOutOfBounds`] otherwise. The `*_unchecked` variants
//! skip the check; calling them with an out-of-range slot is undefined
//! behaviour, caught by a `debug_assert!` in debug builds only.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Range;
use std::slice;
use std::sync::Arc;

use strata_core::{SoaError, SoaLayout, StorageConfig};

use crate::buffer::{HeapBuffer, InlineBuffer, Storage};
use crate::handle::{Row, RowMut};
use crate::iter::{Rows, RowsMut};
use crate::raw;
use crate::record::{FieldKey, Record};

/// Fixed-capacity container with inline storage.
pub type FixedSoa<R, const N: usize> = Soa<R, InlineBuffer<R, N>>;

/// Runtime-capacity container with heap storage.
pub type DynSoa<R> = Soa<R, HeapBuffer>;

/// Reference-counted runtime-capacity container.
///
/// The buffer is released when the last clone is dropped.
pub type SharedSoa<R> = Arc<DynSoa<R>>;

/// Struct-of-arrays container of records `R` over storage `S`.
///
/// Logically owns `len()` values of `R`, stored column by column.
pub struct Soa<R: Record, S: Storage> {
    layout: SoaLayout,
    storage: S,
    _marker: PhantomData<R>,
}

impl<R: Record, S: Storage> Soa<R, S> {
    /// Take ownership of `storage` and default-initialise every slot.
    fn from_storage(layout: SoaLayout, mut storage: S) -> Self {
        debug_assert!(layout.total_bytes() <= storage.size_bytes());
        // SAFETY: the storage is sized and aligned for `layout`, which was
        // computed from `R::FIELDS`, and holds no live values yet.
        unsafe { raw::init_columns(storage.as_mut_ptr(), &layout, R::FIELDS) };
        Self {
            layout,
            storage,
            _marker: PhantomData,
        }
    }

    /// Number of slots. Fixed for the container's lifetime.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.capacity()
    }

    /// Whether the container has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The valid slot range, `0..len()`.
    pub fn slots(&self) -> Range<usize> {
        0..self.len()
    }

    /// Highest valid slot (`len() - 1`), or `None` when empty.
    pub fn last_slot(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Column placement used by this container.
    pub fn layout(&self) -> &SoaLayout {
        &self.layout
    }

    /// Size of the backing buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.storage.size_bytes()
    }

    /// Declaration index of the field called `name`.
    pub fn field_index(&self, name: &str) -> Result<usize, SoaError> {
        self.layout.field_index(name)
    }

    /// Read-only handle for `slot`.
    #[inline]
    pub fn row(&self, slot: usize) -> Result<Row<'_, R>, SoaError> {
        self.layout.check_slot(slot)?;
        // SAFETY: slot checked above.
        Ok(unsafe { self.row_unchecked(slot) })
    }

    /// Mutable handle for `slot`.
    #[inline]
    pub fn row_mut(&mut self, slot: usize) -> Result<RowMut<'_, R>, SoaError> {
        self.layout.check_slot(slot)?;
        // SAFETY: slot checked above.
        Ok(unsafe { self.row_unchecked_mut(slot) })
    }

    /// Read-only handle for `slot` without a bounds check.
    ///
    /// # Safety
    ///
    /// `slot` must be less than `self.len()`.
    #[inline]
    pub unsafe fn row_unchecked(&self, slot: usize) -> Row<'_, R> {
        debug_assert!(slot < self.len(), "slot {slot} out of range 0..{}", self.len());
        // SAFETY: caller guarantees the slot; `&self` freezes the storage.
        unsafe { Row::new(self.storage.as_ptr(), &self.layout, slot) }
    }

    /// Mutable handle for `slot` without a bounds check.
    ///
    /// # Safety
    ///
    /// `slot` must be less than `self.len()`.
    #[inline]
    pub unsafe fn row_unchecked_mut(&mut self, slot: usize) -> RowMut<'_, R> {
        debug_assert!(slot < self.len(), "slot {slot} out of range 0..{}", self.len());
        let base = self.storage.as_mut_ptr();
        // SAFETY: caller guarantees the slot; `&mut self` gives exclusivity.
        unsafe { RowMut::new(base, &self.layout, slot) }
    }

    /// Handles for every slot in ascending order.
    ///
    /// Each call starts a fresh pass over `0..len()`.
    pub fn iter(&self) -> Rows<'_, R> {
        // SAFETY: every slot below capacity is initialised; `&self`
        // freezes the storage.
        unsafe { Rows::new(self.storage.as_ptr(), &self.layout) }
    }

    /// Mutable handles for every slot in ascending order.
    pub fn iter_mut(&mut self) -> RowsMut<'_, R> {
        let base = self.storage.as_mut_ptr();
        // SAFETY: `&mut self` gives exclusivity; the iterator yields each
        // slot once.
        unsafe { RowsMut::new(base, &self.layout) }
    }

    /// Copy out one field of one slot.
    #[inline]
    pub fn field_read<T: Clone>(&self, slot: usize, key: FieldKey<R, T>) -> Result<T, SoaError> {
        self.field_ref(slot, key).cloned()
    }

    /// Borrow one field of one slot.
    #[inline]
    pub fn field_ref<T>(&self, slot: usize, key: FieldKey<R, T>) -> Result<&T, SoaError> {
        self.layout.check_slot(slot)?;
        // SAFETY: slot checked above.
        Ok(unsafe { self.field_ref_unchecked(slot, key) })
    }

    /// Mutably borrow one field of one slot.
    #[inline]
    pub fn field_mut<T>(&mut self, slot: usize, key: FieldKey<R, T>) -> Result<&mut T, SoaError> {
        self.layout.check_slot(slot)?;
        // SAFETY: slot checked above.
        Ok(unsafe { self.field_mut_unchecked(slot, key) })
    }

    /// Overwrite one field of one slot, dropping the old value.
    #[inline]
    pub fn field_write<T>(
        &mut self,
        slot: usize,
        key: FieldKey<R, T>,
        value: T,
    ) -> Result<(), SoaError> {
        *self.field_mut(slot, key)? = value;
        Ok(())
    }

    /// Overwrite one field of one slot, returning the old value.
    pub fn field_replace<T>(
        &mut self,
        slot: usize,
        key: FieldKey<R, T>,
        value: T,
    ) -> Result<T, SoaError> {
        Ok(mem::replace(self.field_mut(slot, key)?, value))
    }

    /// Borrow one field of one slot without a bounds check.
    ///
    /// # Safety
    ///
    /// `slot` must be less than `self.len()`.
    #[inline]
    pub unsafe fn field_ref_unchecked<T>(&self, slot: usize, key: FieldKey<R, T>) -> &T {
        debug_assert!(slot < self.len(), "slot {slot} out of range 0..{}", self.len());
        // SAFETY: caller guarantees the slot; key type matches its column.
        unsafe { raw::slot_ptr::<T>(self.storage.as_ptr(), &self.layout, key.index(), slot).as_ref() }
    }

    /// Mutably borrow one field of one slot without a bounds check.
    ///
    /// # Safety
    ///
    /// `slot` must be less than `self.len()`.
    #[inline]
    pub unsafe fn field_mut_unchecked<T>(&mut self, slot: usize, key: FieldKey<R, T>) -> &mut T {
        debug_assert!(slot < self.len(), "slot {slot} out of range 0..{}", self.len());
        let base = self.storage.as_mut_ptr();
        // SAFETY: caller guarantees the slot; `&mut self` gives exclusivity.
        unsafe { raw::slot_ptr::<T>(base, &self.layout, key.index(), slot).as_mut() }
    }

    /// The whole column of one field, indexed by slot.
    pub fn column<T>(&self, key: FieldKey<R, T>) -> &[T] {
        // SAFETY: the column holds `len()` initialised values of `T`, and
        // its pointer is aligned even when empty.
        unsafe {
            let ptr = raw::column_ptr::<T>(self.storage.as_ptr(), &self.layout, key.index());
            slice::from_raw_parts(ptr.as_ptr(), self.len())
        }
    }

    /// The whole column of one field, mutably.
    pub fn column_mut<T>(&mut self, key: FieldKey<R, T>) -> &mut [T] {
        let len = self.len();
        let base = self.storage.as_mut_ptr();
        // SAFETY: as in `column`, with exclusivity from `&mut self`.
        unsafe {
            let ptr = raw::column_ptr::<T>(base, &self.layout, key.index());
            slice::from_raw_parts_mut(ptr.as_ptr(), len)
        }
    }

    /// Set one field to `value` in every slot.
    pub fn fill<T: Clone>(&mut self, key: FieldKey<R, T>, value: T) {
        self.column_mut(key).fill(value);
    }

    /// Exchange every field of slots `a` and `b`.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<(), SoaError> {
        self.layout.check_slot(a)?;
        self.layout.check_slot(b)?;
        let base = self.storage.as_mut_ptr();
        // SAFETY: both slots checked; `&mut self` gives exclusivity.
        unsafe { raw::swap_slots(base, &self.layout, a, b) };
        Ok(())
    }

    /// Scatter `record` into `slot`, returning the record previously there.
    pub fn replace_record(&mut self, slot: usize, record: R) -> Result<R, SoaError> {
        let mut row = self.row_mut(slot)?;
        Ok(record.replace_row(&mut row))
    }

    /// Scatter `record` into `slot`, dropping the previous values.
    pub fn set_record(&mut self, slot: usize, record: R) -> Result<(), SoaError> {
        self.replace_record(slot, record).map(drop)
    }
}

impl<R: Record, const N: usize> Soa<R, InlineBuffer<R, N>> {
    /// Container with `N` default-initialised slots.
    ///
    /// Records whose fields need stricter alignment than the record itself
    /// (`repr(packed)`) are rejected at build time:
    ///
    /// ```compile_fail
    /// strata_store::soa_record! {
    ///     #[repr(packed)]
    ///     struct Packed {
    ///         a: u8,
    ///         b: u32,
    ///     }
    /// }
    ///
    /// let _ = strata_store::FixedSoa::<Packed, 4>::new();
    /// ```
    pub fn new() -> Self {
        const {
            let fields = R::FIELDS;
            let mut i = 0;
            while i < fields.len() {
                assert!(
                    fields[i].shape().align <= mem::align_of::<R>(),
                    "inline storage requires every field to be aligned no stricter than the record"
                );
                i += 1;
            }
        }
        // Padding before a column is smaller than its field's size, so the
        // columns fit in `[R; N + 1]`, which is below `isize::MAX`.
        let layout = SoaLayout::compute(R::FIELDS, N)
            .expect("inline layout is bounded by the size of [R; N + 1]");
        debug_assert!(InlineBuffer::<R, N>::fits(&layout));
        Self::from_storage(layout, InlineBuffer::zeroed())
    }

    /// Container holding `records` in slot order.
    pub fn from_array(records: [R; N]) -> Self {
        let mut soa = Self::new();
        for (slot, record) in records.into_iter().enumerate() {
            // SAFETY: enumerate over [R; N] yields slots < N.
            let mut row = unsafe { soa.row_unchecked_mut(slot) };
            drop(record.replace_row(&mut row));
        }
        soa
    }
}

impl<R: Record, const N: usize> Default for Soa<R, InlineBuffer<R, N>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Soa<R, HeapBuffer> {
    /// Heap container with `capacity` default-initialised slots.
    pub fn with_capacity(capacity: usize) -> Result<Self, SoaError> {
        Self::with_config(capacity, &StorageConfig::default())
    }

    /// Heap container laid out according to `config`.
    pub fn with_config(capacity: usize, config: &StorageConfig) -> Result<Self, SoaError> {
        config.validate()?;
        let layout = SoaLayout::with_column_align(R::FIELDS, capacity, config.column_align)?;
        let storage = HeapBuffer::allocate(&layout)?;
        Ok(Self::from_storage(layout, storage))
    }

    /// Heap container sized to and filled from `records`.
    ///
    /// If the iterator yields fewer items than it reported, the remaining
    /// slots keep their default values; surplus items are ignored.
    pub fn from_records<I>(records: I) -> Result<Self, SoaError>
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: ExactSizeIterator,
    {
        let records = records.into_iter();
        let mut soa = Self::with_capacity(records.len())?;
        let capacity = soa.len();
        for (slot, record) in records.take(capacity).enumerate() {
            soa.set_record(slot, record)?;
        }
        Ok(soa)
    }

    /// Move into a reference-counted handle.
    pub fn into_shared(self) -> SharedSoa<R> {
        Arc::new(self)
    }
}

impl<R: Record, S: Storage> Drop for Soa<R, S> {
    fn drop(&mut self) {
        tracing::trace!(
            slots = self.layout.capacity(),
            fields = R::FIELDS.len(),
            "dropping columns"
        );
        let base = self.storage.as_mut_ptr();
        // SAFETY: every column was initialised in `from_storage` and is
        // never touched again after this.
        unsafe { raw::drop_columns(base, &self.layout, R::FIELDS) };
    }
}

impl<R: Record, S: Storage> fmt::Debug for Soa<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.layout.columns().iter().map(|c| c.name()).collect();
        f.debug_struct("Soa")
            .field("len", &self.len())
            .field("fields", &fields)
            .finish()
    }
}

impl<'a, R: Record, S: Storage> IntoIterator for &'a Soa<R, S> {
    type Item = Row<'a, R>;
    type IntoIter = Rows<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, R: Record, S: Storage> IntoIterator for &'a mut Soa<R, S> {
    type Item = RowMut<'a, R>;
    type IntoIter = RowsMut<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
