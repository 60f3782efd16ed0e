//! Slot iterators yielding element handles in ascending order.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use strata_core::SoaLayout;

use crate::handle::{Row, RowMut};
use crate::record::Record;

/// Iterator over read-only handles, created by [`Soa::iter`](crate::Soa::iter).
pub struct Rows<'a, R> {
    base: NonNull<u8>,
    layout: &'a SoaLayout,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a R>,
}

impl<'a, R: Record> Rows<'a, R> {
    /// # Safety
    ///
    /// Same contract as [`Row::new`] for every slot in `0..layout.capacity()`.
    pub(crate) unsafe fn new(base: NonNull<u8>, layout: &'a SoaLayout) -> Self {
        Self {
            base,
            layout,
            front: 0,
            back: layout.capacity(),
            _marker: PhantomData,
        }
    }
}

impl<'a, R: Record> Iterator for Rows<'a, R> {
    type Item = Row<'a, R>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let slot = self.front;
        self.front += 1;
        // SAFETY: slot < back <= capacity.
        Some(unsafe { Row::new(self.base, self.layout, slot) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<R: Record> DoubleEndedIterator for Rows<'_, R> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: front <= back < capacity.
        Some(unsafe { Row::new(self.base, self.layout, self.back) })
    }
}

impl<R: Record> ExactSizeIterator for Rows<'_, R> {}

impl<R: Record> FusedIterator for Rows<'_, R> {}

// SAFETY: yields only `Row`s, which behave like `&'a R`.
unsafe impl<R: Sync> Send for Rows<'_, R> {}
// SAFETY: as above.
unsafe impl<R: Sync> Sync for Rows<'_, R> {}

/// Iterator over mutable handles, created by [`Soa::iter_mut`](crate::Soa::iter_mut).
///
/// Each slot is yielded at most once, so the handles never alias.
pub struct RowsMut<'a, R> {
    base: NonNull<u8>,
    layout: &'a SoaLayout,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut R>,
}

impl<'a, R: Record> RowsMut<'a, R> {
    /// # Safety
    ///
    /// Same contract as [`RowMut::new`] for every slot in
    /// `0..layout.capacity()`.
    pub(crate) unsafe fn new(base: NonNull<u8>, layout: &'a SoaLayout) -> Self {
        Self {
            base,
            layout,
            front: 0,
            back: layout.capacity(),
            _marker: PhantomData,
        }
    }
}

impl<'a, R: Record> Iterator for RowsMut<'a, R> {
    type Item = RowMut<'a, R>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let slot = self.front;
        self.front += 1;
        // SAFETY: slot < back <= capacity, and `front` only moves forward so
        // this slot is never yielded again.
        Some(unsafe { RowMut::new(self.base, self.layout, slot) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<R: Record> DoubleEndedIterator for RowsMut<'_, R> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: front <= back < capacity; `back` only moves backward.
        Some(unsafe { RowMut::new(self.base, self.layout, self.back) })
    }
}

impl<R: Record> ExactSizeIterator for RowsMut<'_, R> {}

impl<R: Record> FusedIterator for RowsMut<'_, R> {}

// SAFETY: yields only `RowMut`s for distinct slots, which behave like `&'a mut R`.
unsafe impl<R: Send> Send for RowsMut<'_, R> {}
// SAFETY: shared access to the iterator exposes no slot data.
unsafe impl<R: Sync> Sync for RowsMut<'_, R> {}
