//! Record type descriptions and compile-time field keys.
//!
//! A [`Record`] is an ordinary struct whose fields are stored column by
//! column. Its [`FieldSpec`] table drives layout, initialisation and
//! teardown; its [`FieldKey`] constants drive typed access. Both are
//! normally generated by [`soa_record!`](crate::soa_record).

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use strata_core::FieldShape;

use crate::handle::RowMut;
use crate::raw;

/// Type-erased description of one declared field.
///
/// Besides size and alignment it carries the monomorphised routines that
/// default-initialise and drop a whole column of the field's type.
#[derive(Clone, Copy)]
pub struct FieldSpec {
    shape: FieldShape,
    init_column: unsafe fn(*mut u8, usize),
    drop_column: Option<unsafe fn(*mut u8, usize)>,
}

impl FieldSpec {
    /// Describe a field named `name` holding values of type `T`.
    ///
    /// New slots are filled with `T::default()`.
    pub const fn of<T: Default>(name: &'static str) -> Self {
        let drop_column = if mem::needs_drop::<T>() {
            Some(raw::drop_column::<T> as unsafe fn(*mut u8, usize))
        } else {
            None
        };
        Self {
            shape: FieldShape::of::<T>(name),
            init_column: raw::init_column::<T>,
            drop_column,
        }
    }

    /// Field name as declared.
    pub fn name(&self) -> &'static str {
        self.shape.name
    }

    /// Size and alignment of the field's value type.
    pub const fn shape(&self) -> &FieldShape {
        &self.shape
    }

    /// Whether values of this field have drop glue.
    pub fn needs_drop(&self) -> bool {
        self.drop_column.is_some()
    }

    /// Write `T::default()` into `len` consecutive slots.
    ///
    /// # Safety
    ///
    /// `column` must be valid for writes of `len` values of this field's
    /// type and suitably aligned. Previous contents are overwritten
    /// without being dropped.
    pub(crate) unsafe fn init(&self, column: *mut u8, len: usize) {
        // SAFETY: forwarded caller contract.
        unsafe { (self.init_column)(column, len) }
    }

    /// Drop `len` consecutive initialised values in place.
    ///
    /// # Safety
    ///
    /// `column` must point to `len` initialised, aligned values of this
    /// field's type that are not used again afterwards.
    pub(crate) unsafe fn drop(&self, column: *mut u8, len: usize) {
        if let Some(drop_column) = self.drop_column {
            // SAFETY: forwarded caller contract.
            unsafe { drop_column(column, len) }
        }
    }
}

impl AsRef<FieldShape> for FieldSpec {
    fn as_ref(&self) -> &FieldShape {
        &self.shape
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.shape.name)
            .field("size", &self.shape.size)
            .field("align", &self.shape.align)
            .field("needs_drop", &self.needs_drop())
            .finish()
    }
}

/// A record type whose fields can be stored as separate columns.
///
/// # Safety
///
/// For every `FieldKey<Self, T>` that exists with index `i`,
/// `Self::FIELDS[i]` must have been built with `FieldSpec::of::<T>`.
/// Containers rely on this to reinterpret column bytes as `T`.
///
/// Implement this with [`soa_record!`](crate::soa_record) rather than by
/// hand.
pub unsafe trait Record: Sized {
    /// One spec per field, in declaration order.
    const FIELDS: &'static [FieldSpec];

    /// Move every field of `self` into `row`, returning the values that
    /// were there before as a record.
    fn replace_row(self, row: &mut RowMut<'_, Self>) -> Self;
}

/// Compile-time identifier of field `T` within record `R`.
///
/// Keys are zero-cost: they carry only the field's declaration index.
/// They are generated as associated constants (`Person::name`) and are
/// the only way to reach a column, so an unknown field is a build error.
pub struct FieldKey<R, T> {
    index: usize,
    _marker: PhantomData<fn(&R) -> &T>,
}

impl<R, T> FieldKey<R, T> {
    /// Create a key for the field at declaration index `index`.
    ///
    /// # Safety
    ///
    /// `R::FIELDS[index]` must describe a field of type exactly `T`
    /// (see [`Record`]).
    pub const unsafe fn new_unchecked(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Declaration index of the field.
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<R: Record, T> FieldKey<R, T> {
    /// Declared name of the field.
    pub fn name(self) -> &'static str {
        R::FIELDS[self.index].name()
    }
}

impl<R, T> Clone for FieldKey<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for FieldKey<R, T> {}

impl<R, T> PartialEq for FieldKey<R, T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<R, T> Eq for FieldKey<R, T> {}

impl<R, T> fmt::Debug for FieldKey<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldKey({})", self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::soa_record! {
        struct Sample {
            label: String,
            count: u32,
            unit: (),
        }
    }

    #[test]
    fn specs_follow_declaration_order() {
        let names: Vec<_> = Sample::FIELDS.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["label", "count", "unit"]);
    }

    #[test]
    fn spec_records_size_and_align() {
        let spec = FieldSpec::of::<u64>("x");
        assert_eq!(spec.shape().size, 8);
        assert_eq!(spec.shape().align, mem::align_of::<u64>());
    }

    #[test]
    fn drop_glue_is_detected() {
        assert!(Sample::FIELDS[0].needs_drop());
        assert!(!Sample::FIELDS[1].needs_drop());
        assert!(!Sample::FIELDS[2].needs_drop());
    }

    #[test]
    fn keys_carry_declaration_index() {
        assert_eq!(Sample::label.index(), 0);
        assert_eq!(Sample::count.index(), 1);
        assert_eq!(Sample::unit.index(), 2);
        assert_eq!(Sample::count.name(), "count");
    }

    #[test]
    fn keys_are_copy_and_comparable() {
        let a = Sample::count;
        let b = a;
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "FieldKey(1)");
    }

    #[test]
    fn spec_debug_shows_name() {
        let text = format!("{:?}", Sample::FIELDS[0]);
        assert!(text.contains("label"));
        assert!(text.contains("needs_drop: true"));
    }
}
