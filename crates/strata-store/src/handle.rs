//! Element handles: transient per-slot views into a container.
//!
//! A [`Row`] or [`RowMut`] binds a buffer pointer, the container's layout
//! and one slot index. The slot is validated once when the handle is
//! created, so field access through a handle is pure offset arithmetic.
//!
//! Handles borrow the container, so they cannot outlive it, and they
//! implement neither `Clone` nor `Copy`. A handle can be moved but never
//! duplicated.

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use strata_core::SoaLayout;

use crate::raw;
use crate::record::{FieldKey, Record};

/// Read-only view of one slot.
pub struct Row<'a, R> {
    base: NonNull<u8>,
    layout: &'a SoaLayout,
    slot: usize,
    _marker: PhantomData<&'a R>,
}

impl<'a, R: Record> Row<'a, R> {
    /// # Safety
    ///
    /// `slot < layout.capacity()` and `base` points to initialised storage
    /// described by `layout` that stays valid and unmutated for `'a`.
    #[inline]
    pub(crate) unsafe fn new(base: NonNull<u8>, layout: &'a SoaLayout, slot: usize) -> Self {
        debug_assert!(slot < layout.capacity());
        Self {
            base,
            layout,
            slot,
            _marker: PhantomData,
        }
    }

    /// Slot index this handle is bound to.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Borrow the value of one field.
    #[inline]
    pub fn get_ref<T>(&self, key: FieldKey<R, T>) -> &'a T {
        // SAFETY: the slot was validated at construction, the key's type
        // matches its column (Record contract), and the storage is shared-
        // borrowed for 'a.
        unsafe { raw::slot_ptr::<T>(self.base, self.layout, key.index(), self.slot).as_ref() }
    }

    /// Copy out the value of one field.
    #[inline]
    pub fn get<T: Clone>(&self, key: FieldKey<R, T>) -> T {
        self.get_ref(key).clone()
    }
}

impl<R> fmt::Debug for Row<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

// SAFETY: a Row behaves like `&'a R`.
unsafe impl<R: Sync> Send for Row<'_, R> {}
// SAFETY: a Row behaves like `&'a R`.
unsafe impl<R: Sync> Sync for Row<'_, R> {}

/// Mutable view of one slot.
pub struct RowMut<'a, R> {
    base: NonNull<u8>,
    layout: &'a SoaLayout,
    slot: usize,
    _marker: PhantomData<&'a mut R>,
}

impl<'a, R: Record> RowMut<'a, R> {
    /// # Safety
    ///
    /// `slot < layout.capacity()`, `base` points to initialised storage
    /// described by `layout` that is valid for writes for `'a`, and no
    /// other live reference or handle observes this slot during `'a`.
    #[inline]
    pub(crate) unsafe fn new(base: NonNull<u8>, layout: &'a SoaLayout, slot: usize) -> Self {
        debug_assert!(slot < layout.capacity());
        Self {
            base,
            layout,
            slot,
            _marker: PhantomData,
        }
    }

    /// Slot index this handle is bound to.
    pub fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    fn ptr<T>(&self, key: FieldKey<R, T>) -> NonNull<T> {
        // SAFETY: slot validated at construction; key type matches column.
        unsafe { raw::slot_ptr::<T>(self.base, self.layout, key.index(), self.slot) }
    }

    /// Borrow the value of one field.
    #[inline]
    pub fn get_ref<T>(&self, key: FieldKey<R, T>) -> &T {
        // SAFETY: this handle has exclusive access to the slot; the shared
        // borrow of `self` prevents concurrent mutation through it.
        unsafe { self.ptr(key).as_ref() }
    }

    /// Copy out the value of one field.
    #[inline]
    pub fn get<T: Clone>(&self, key: FieldKey<R, T>) -> T {
        self.get_ref(key).clone()
    }

    /// Mutably borrow the value of one field.
    #[inline]
    pub fn get_mut<T>(&mut self, key: FieldKey<R, T>) -> &mut T {
        // SAFETY: exclusive slot access, tied to the `&mut self` borrow.
        unsafe { self.ptr(key).as_mut() }
    }

    /// Consume the handle, keeping a mutable borrow of one field for `'a`.
    #[inline]
    pub fn into_mut<T>(self, key: FieldKey<R, T>) -> &'a mut T {
        // SAFETY: exclusive slot access for 'a; the handle is consumed so
        // no second path to the slot remains.
        unsafe { self.ptr(key).as_mut() }
    }

    /// Overwrite one field, dropping the previous value.
    #[inline]
    pub fn set<T>(&mut self, key: FieldKey<R, T>, value: T) {
        *self.get_mut(key) = value;
    }

    /// Overwrite one field, returning the previous value.
    #[inline]
    pub fn replace<T>(&mut self, key: FieldKey<R, T>, value: T) -> T {
        mem::replace(self.get_mut(key), value)
    }

    /// Read-only view of the same slot, borrowing this handle.
    pub fn as_row(&self) -> Row<'_, R> {
        // SAFETY: the shared borrow of `self` freezes the slot for the
        // returned handle's lifetime.
        unsafe { Row::new(self.base, self.layout, self.slot) }
    }
}

impl<R> fmt::Debug for RowMut<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowMut")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

// SAFETY: a RowMut behaves like `&'a mut R`.
unsafe impl<R: Send> Send for RowMut<'_, R> {}
// SAFETY: a RowMut behaves like `&'a mut R`.
unsafe impl<R: Sync> Sync for RowMut<'_, R> {}
