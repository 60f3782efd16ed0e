//! Backing storage for column buffers.
//!
//! Two backends implement [`Storage`]:
//!
//! - [`InlineBuffer`]: sized by a const generic, lives inside the container
//!   value (stack, embedding struct, ...). Creation cannot fail at run time.
//! - [`HeapBuffer`]: sized at construction, allocated zeroed through
//!   `std::alloc`, released when dropped.
//!
//! Backends only own raw bytes. Typed initialisation and teardown of the
//! values inside are the container's job.

use std::alloc::{self, Layout as AllocLayout};
use std::cell::UnsafeCell;
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

use strata_core::{SoaError, SoaLayout};

use crate::raw;

mod private {
    pub trait Sealed {}
}

/// A contiguous byte region that holds every column of a container.
///
/// This trait is sealed; the two backends in this module are the only
/// implementations.
pub trait Storage: private::Sealed {
    /// Start of the buffer, valid for reads.
    fn as_ptr(&self) -> NonNull<u8>;

    /// Start of the buffer, valid for reads and writes.
    fn as_mut_ptr(&mut self) -> NonNull<u8>;

    /// Size of the region in bytes.
    fn size_bytes(&self) -> usize;
}

/// Heap-allocated, zero-initialised byte buffer.
///
/// Zero-byte buffers (no slots, or only zero-sized fields) allocate
/// nothing and use an aligned dangling pointer.
pub struct HeapBuffer {
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
}

impl HeapBuffer {
    /// Allocate `layout.total_bytes()` zeroed bytes aligned to `layout.align()`.
    pub(crate) fn allocate(layout: &SoaLayout) -> Result<Self, SoaError> {
        let size = layout.total_bytes();
        let align = layout.align();
        if size == 0 {
            return Ok(Self {
                ptr: raw::dangling(align),
                size,
                align,
            });
        }

        let alloc_layout =
            AllocLayout::from_size_align(size, align).map_err(|_| SoaError::CapacityOverflow {
                capacity: layout.capacity(),
                row_bytes: layout.row_bytes(),
            })?;
        // SAFETY: alloc_layout has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(alloc_layout) };
        let ptr = NonNull::new(ptr).ok_or(SoaError::AllocationFailed { bytes: size, align })?;
        tracing::debug!(bytes = size, align, slots = layout.capacity(), "allocated column buffer");
        Ok(Self { ptr, size, align })
    }

    /// Alignment of the buffer start.
    pub fn align(&self) -> usize {
        self.align
    }
}

impl private::Sealed for HeapBuffer {}

impl Storage for HeapBuffer {
    fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    fn as_mut_ptr(&mut self) -> NonNull<u8> {
        self.ptr
    }

    fn size_bytes(&self) -> usize {
        self.size
    }
}

impl Drop for HeapBuffer {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        // SAFETY: the same size/align pair was accepted by `allocate`.
        let alloc_layout = unsafe { AllocLayout::from_size_align_unchecked(self.size, self.align) };
        // SAFETY: `ptr` came from `alloc_zeroed` with this layout and is
        // released exactly once.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), alloc_layout) };
        tracing::debug!(bytes = self.size, align = self.align, "released column buffer");
    }
}

// SAFETY: HeapBuffer uniquely owns plain bytes; it has no thread affinity.
// Whether the *values* in it may cross threads is decided by the container
// through its record type parameter.
unsafe impl Send for HeapBuffer {}
// SAFETY: see above; shared access hands out only `&` references.
unsafe impl Sync for HeapBuffer {}

#[repr(C)]
struct InlineCells<R, const N: usize> {
    rows: [MaybeUninit<R>; N],
    slack: MaybeUninit<R>,
}

/// Inline byte buffer large enough for `N` records of `R` in column form.
///
/// The region is `N + 1` records long. The extra record absorbs the
/// alignment padding between columns, which never exceeds the record's own
/// size. It is aligned like `R`, which is at least as strict as any of its
/// fields.
pub struct InlineBuffer<R, const N: usize> {
    cells: UnsafeCell<InlineCells<R, N>>,
}

impl<R, const N: usize> InlineBuffer<R, N> {
    /// All-zero buffer.
    pub(crate) fn zeroed() -> Self {
        Self {
            cells: UnsafeCell::new(InlineCells {
                rows: [const { MaybeUninit::zeroed() }; N],
                slack: MaybeUninit::zeroed(),
            }),
        }
    }

    /// Whether `layout` can be placed in this buffer.
    pub(crate) fn fits(layout: &SoaLayout) -> bool {
        layout.total_bytes() <= mem::size_of::<InlineCells<R, N>>()
            && layout.align() <= mem::align_of::<InlineCells<R, N>>()
    }
}

impl<R, const N: usize> private::Sealed for InlineBuffer<R, N> {}

impl<R, const N: usize> Storage for InlineBuffer<R, N> {
    fn as_ptr(&self) -> NonNull<u8> {
        // SAFETY: UnsafeCell::get never returns null.
        unsafe { NonNull::new_unchecked(self.cells.get().cast::<u8>()) }
    }

    fn as_mut_ptr(&mut self) -> NonNull<u8> {
        NonNull::from(self.cells.get_mut()).cast::<u8>()
    }

    fn size_bytes(&self) -> usize {
        mem::size_of::<InlineCells<R, N>>()
    }
}

// SAFETY: shared access to the buffer only ever produces `&` references to
// the values inside, which is sound when `R` (and so every field) is Sync.
unsafe impl<R: Sync, const N: usize> Sync for InlineBuffer<R, N> {}
