//! Column layout calculation for struct-of-arrays buffers.
//!
//! A [`SoaLayout`] maps each declared field of a record type to a column
//! inside one flat byte buffer:
//!
//! ```text
//! capacity = 3, fields = [a: u8, b: u32, c: u16]
//!
//! byte  0   1   2   3   4 ...          16 ...     22
//!       ┌───┬───┬───┬───┬──────────────┬──────────┐
//!       │a0 │a1 │a2 │pad│ b0  b1  b2   │ c0 c1 c2 │
//!       └───┴───┴───┴───┴──────────────┴──────────┘
//!       base_a = 0      base_b = 4     base_c = 16
//! ```
//!
//! Column `i` starts at the end of column `i - 1`, rounded up to the
//! alignment of field `i`. Zero-sized columns sit at offset 0 and take no
//! space. The value of field `i` for slot `s` lives at
//! `base_i + s * stride_i`.

use std::ops::Range;

use smallvec::SmallVec;

use crate::error::SoaError;

/// Size and alignment of one declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldShape {
    /// Field name as written in the record declaration.
    pub name: &'static str,
    /// `size_of` the field's value type; the column stride.
    pub size: usize,
    /// `align_of` the field's value type.
    pub align: usize,
}

impl FieldShape {
    /// Describe a field from explicit size and alignment.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub const fn new(name: &'static str, size: usize, align: usize) -> Self {
        assert!(align.is_power_of_two(), "field alignment must be a power of two");
        Self { name, size, align }
    }

    /// Describe a field holding values of type `T`.
    pub const fn of<T>(name: &'static str) -> Self {
        Self {
            name,
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }
}

impl AsRef<FieldShape> for FieldShape {
    fn as_ref(&self) -> &FieldShape {
        self
    }
}

/// Placement of one column inside the flat buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    name: &'static str,
    stride: usize,
    align: usize,
    base: usize,
}

impl ColumnLayout {
    /// Field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Distance in bytes between consecutive slots of this column.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Alignment the column base satisfies.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Byte offset of slot 0 within the buffer.
    pub fn base(&self) -> usize {
        self.base
    }
}

/// Precomputed column placement for one `(record type, capacity)` pair.
///
/// Built once per container and consulted on every access. All offsets
/// are guaranteed to fit in `isize`, so [`SoaLayout::address`] cannot
/// overflow for in-range slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoaLayout {
    capacity: usize,
    columns: SmallVec<[ColumnLayout; 8]>,
    row_bytes: usize,
    total_bytes: usize,
    align: usize,
}

impl SoaLayout {
    /// Compute a layout with natural column alignment.
    pub fn compute<F: AsRef<FieldShape>>(
        fields: &[F],
        capacity: usize,
    ) -> Result<Self, SoaError> {
        Self::with_column_align(fields, capacity, 1)
    }

    /// Compute a layout where every column base is also a multiple of
    /// `column_align`.
    ///
    /// `column_align` must be a power of two, otherwise
    /// [`SoaError::InvalidConfig`] is returned. See also
    /// [`StorageConfig::validate`](crate::StorageConfig::validate).
    pub fn with_column_align<F: AsRef<FieldShape>>(
        fields: &[F],
        capacity: usize,
        column_align: usize,
    ) -> Result<Self, SoaError> {
        if !column_align.is_power_of_two() {
            return Err(SoaError::InvalidConfig {
                reason: format!("column_align ({column_align}) must be a power of two"),
            });
        }
        let row_bytes = fields
            .iter()
            .fold(0usize, |acc, f| acc.saturating_add(f.as_ref().size));
        let overflow = SoaError::CapacityOverflow {
            capacity,
            row_bytes,
        };

        let mut columns = SmallVec::with_capacity(fields.len());
        let mut cursor = 0usize;
        let mut align = column_align;
        for field in fields {
            let shape = field.as_ref();
            let col_align = shape.align.max(column_align);
            align = align.max(col_align);

            let len = shape
                .size
                .checked_mul(capacity)
                .ok_or_else(|| overflow.clone())?;
            let base = if len == 0 {
                0
            } else {
                align_up(cursor, col_align).ok_or_else(|| overflow.clone())?
            };
            if len > 0 {
                cursor = base.checked_add(len).ok_or_else(|| overflow.clone())?;
            }
            columns.push(ColumnLayout {
                name: shape.name,
                stride: shape.size,
                align: col_align,
                base,
            });
        }

        if cursor > isize::MAX as usize {
            return Err(overflow);
        }

        Ok(Self {
            capacity,
            columns,
            row_bytes,
            total_bytes: cursor,
            align,
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of columns (declared fields).
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    /// Column for the field at `field` (declaration index).
    pub fn column(&self, field: usize) -> Option<&ColumnLayout> {
        self.columns.get(field)
    }

    /// Sum of all strides: the bytes one record occupies across columns.
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Size of the flat buffer, including inter-column padding.
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Alignment the buffer start must satisfy.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Byte range occupied by column `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field >= self.field_count()`.
    pub fn column_range(&self, field: usize) -> Range<usize> {
        let col = &self.columns[field];
        col.base..col.base + col.stride * self.capacity
    }

    /// Declaration index of the field called `name`.
    ///
    /// This is a linear scan intended for diagnostics and tooling, not
    /// for per-access use.
    pub fn field_index(&self, name: &str) -> Result<usize, SoaError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| SoaError::InvalidFieldReference {
                name: name.to_owned(),
            })
    }

    /// Verify `slot` lies in `[0, capacity)`.
    #[inline]
    pub fn check_slot(&self, slot: usize) -> Result<(), SoaError> {
        if slot < self.capacity {
            Ok(())
        } else {
            Err(SoaError::IndexOutOfBounds {
                index: slot,
                len: self.capacity,
            })
        }
    }

    /// Byte offset of `slot` in column `field`, without a bounds check.
    ///
    /// The result is only meaningful for `slot < capacity`; callers are
    /// expected to have validated the slot already.
    ///
    /// # Panics
    ///
    /// Panics if `field >= self.field_count()`.
    #[inline]
    pub fn address(&self, field: usize, slot: usize) -> usize {
        debug_assert!(slot < self.capacity, "slot {slot} >= capacity {}", self.capacity);
        let col = &self.columns[field];
        col.base + slot * col.stride
    }

    /// Bounds-checked [`SoaLayout::address`].
    #[inline]
    pub fn checked_address(&self, field: usize, slot: usize) -> Result<usize, SoaError> {
        self.check_slot(slot)?;
        Ok(self.address(field, slot))
    }
}

/// Compute the layout for `fields` at `capacity` with natural alignment.
pub fn compute_layout<F: AsRef<FieldShape>>(
    fields: &[F],
    capacity: usize,
) -> Result<SoaLayout, SoaError> {
    SoaLayout::compute(fields, capacity)
}

fn align_up(offset: usize, align: usize) -> Option<usize> {
    let mask = align - 1;
    offset.checked_add(mask).map(|v| v & !mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<FieldShape> {
        vec![
            FieldShape::of::<u8>("a"),
            FieldShape::of::<u32>("b"),
            FieldShape::of::<u16>("c"),
        ]
    }

    #[test]
    fn bases_follow_declaration_order() {
        let layout = compute_layout(&sample_fields(), 3).unwrap();
        let bases: Vec<_> = layout.columns().iter().map(|c| c.base()).collect();
        assert_eq!(bases, vec![0, 4, 16]);
        assert_eq!(layout.total_bytes(), 22);
        assert_eq!(layout.row_bytes(), 7);
        assert_eq!(layout.align(), 4);
    }

    #[test]
    fn uniform_fields_have_no_padding() {
        let fields = [FieldShape::of::<f32>("x"), FieldShape::of::<f32>("y")];
        let layout = compute_layout(&fields, 100).unwrap();
        assert_eq!(layout.columns()[1].base(), 400);
        assert_eq!(layout.total_bytes(), 100 * layout.row_bytes());
    }

    #[test]
    fn zero_capacity_is_valid_and_empty() {
        let layout = compute_layout(&sample_fields(), 0).unwrap();
        assert_eq!(layout.capacity(), 0);
        assert_eq!(layout.total_bytes(), 0);
        assert!(layout.columns().iter().all(|c| c.base() == 0));
    }

    #[test]
    fn no_fields_is_valid() {
        let layout = compute_layout::<FieldShape>(&[], 10).unwrap();
        assert_eq!(layout.field_count(), 0);
        assert_eq!(layout.total_bytes(), 0);
        assert_eq!(layout.align(), 1);
    }

    #[test]
    fn zero_sized_field_takes_no_space() {
        let fields = [
            FieldShape::of::<u64>("a"),
            FieldShape::of::<()>("unit"),
            FieldShape::of::<u64>("b"),
        ];
        let layout = compute_layout(&fields, 4).unwrap();
        assert_eq!(layout.columns()[1].base(), 0);
        assert_eq!(layout.columns()[2].base(), 32);
        assert_eq!(layout.total_bytes(), 64);
    }

    #[test]
    fn address_is_base_plus_slot_times_stride() {
        let layout = compute_layout(&sample_fields(), 3).unwrap();
        assert_eq!(layout.address(0, 2), 2);
        assert_eq!(layout.address(1, 0), 4);
        assert_eq!(layout.address(1, 2), 12);
        assert_eq!(layout.address(2, 1), 18);
    }

    #[test]
    fn checked_address_rejects_out_of_range() {
        let layout = compute_layout(&sample_fields(), 2).unwrap();
        assert_eq!(
            layout.checked_address(0, 2),
            Err(SoaError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert!(layout.checked_address(1, 1).is_ok());
    }

    #[test]
    fn column_align_pads_every_base() {
        let layout = SoaLayout::with_column_align(&sample_fields(), 3, 64).unwrap();
        let bases: Vec<_> = layout.columns().iter().map(|c| c.base()).collect();
        assert_eq!(bases, vec![0, 64, 128]);
        assert_eq!(layout.align(), 64);
        assert!(layout.columns().iter().all(|c| c.align() == 64));
    }

    #[test]
    fn column_align_must_be_a_power_of_two() {
        for bad in [0usize, 3, 48] {
            let result = SoaLayout::with_column_align(&sample_fields(), 3, bad);
            assert!(
                matches!(result, Err(SoaError::InvalidConfig { .. })),
                "column_align {bad} accepted"
            );
        }
    }

    #[test]
    fn field_index_by_name() {
        let layout = compute_layout(&sample_fields(), 3).unwrap();
        assert_eq!(layout.field_index("c"), Ok(2));
        assert_eq!(
            layout.field_index("missing"),
            Err(SoaError::InvalidFieldReference {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn overflowing_capacity_is_reported() {
        let fields = [FieldShape::of::<u64>("a"), FieldShape::of::<u64>("b")];
        let result = compute_layout(&fields, usize::MAX / 8);
        assert_eq!(
            result,
            Err(SoaError::CapacityOverflow {
                capacity: usize::MAX / 8,
                row_bytes: 16,
            })
        );
    }

    #[test]
    fn total_above_isize_max_is_overflow() {
        let fields = [FieldShape::of::<u8>("a")];
        let result = compute_layout(&fields, isize::MAX as usize + 1);
        assert!(matches!(result, Err(SoaError::CapacityOverflow { .. })));
    }

    #[test]
    fn column_range_covers_capacity() {
        let layout = compute_layout(&sample_fields(), 3).unwrap();
        assert_eq!(layout.column_range(1), 4..16);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn field_shape_rejects_bad_alignment() {
        FieldShape::new("bad", 4, 3);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_shape() -> impl Strategy<Value = FieldShape> {
            (0usize..5, 0usize..4).prop_map(|(align_pow, mult)| {
                let align = 1usize << align_pow;
                FieldShape::new("f", align * mult, align)
            })
        }

        proptest! {
            #[test]
            fn columns_are_disjoint_aligned_and_in_bounds(
                shapes in prop::collection::vec(arb_shape(), 0..10),
                capacity in 0usize..500,
                column_align_pow in 0usize..7,
            ) {
                let column_align = 1usize << column_align_pow;
                let layout = SoaLayout::with_column_align(&shapes, capacity, column_align).unwrap();

                let mut ranges: Vec<Range<usize>> = Vec::new();
                for (i, col) in layout.columns().iter().enumerate() {
                    let range = layout.column_range(i);
                    prop_assert!(range.end <= layout.total_bytes());
                    prop_assert_eq!(col.base() % col.align(), 0);
                    prop_assert_eq!(layout.align() % col.align(), 0);
                    if !range.is_empty() {
                        ranges.push(range);
                    }
                }
                for (i, a) in ranges.iter().enumerate() {
                    for b in &ranges[i + 1..] {
                        prop_assert!(a.end <= b.start || b.end <= a.start);
                    }
                }
            }

            #[test]
            fn natural_layout_padding_is_bounded(
                shapes in prop::collection::vec(arb_shape(), 0..10),
                capacity in 0usize..500,
            ) {
                let layout = compute_layout(&shapes, capacity).unwrap();
                let padding_bound: usize = shapes
                    .iter()
                    .filter(|s| s.size > 0)
                    .map(|s| s.align - 1)
                    .sum();
                prop_assert!(layout.total_bytes() <= capacity * layout.row_bytes() + padding_bound);
                prop_assert!(layout.total_bytes() >= capacity * layout.row_bytes());
            }

            #[test]
            fn every_slot_address_fits_its_column(
                shapes in prop::collection::vec(arb_shape(), 1..6),
                capacity in 1usize..200,
            ) {
                let layout = compute_layout(&shapes, capacity).unwrap();
                for field in 0..layout.field_count() {
                    let range = layout.column_range(field);
                    let stride = layout.columns()[field].stride();
                    let first = layout.address(field, 0);
                    let last = layout.address(field, capacity - 1);
                    prop_assert_eq!(first, range.start);
                    prop_assert_eq!(last + stride, range.end);
                }
            }
        }
    }
}
