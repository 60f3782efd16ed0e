//! Declarative code generation for record types.

/// Declare a struct and make it storable in strata containers.
///
/// Expands to the struct itself, a [`Record`](crate::Record) impl whose
/// field table lists every field in declaration order, and one
/// [`FieldKey`](crate::FieldKey) associated constant per field, named after
/// the field and with the field's visibility.
///
/// Every field type must implement `Default`; new slots start out as the
/// default value. Associated constants share a namespace with inherent
/// methods, so the struct cannot also have a method named like a field.
///
/// ```
/// strata_store::soa_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Person {
///         pub name: String,
///         pub age: i32,
///     }
/// }
///
/// let mut people = strata_store::DynSoa::<Person>::with_capacity(3).unwrap();
/// people.field_write(1, Person::name, "b".to_string()).unwrap();
/// assert_eq!(people.field_read(1, Person::name).unwrap(), "b");
/// assert_eq!(people.field_read(1, Person::age).unwrap(), 0);
/// ```
#[macro_export]
macro_rules! soa_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        const _: () = {
            #[allow(non_camel_case_types, dead_code)]
            enum __FieldIndex {
                $( $field, )*
            }

            #[allow(non_upper_case_globals)]
            impl $name {
                $(
                    #[doc = concat!("Column key for the `", stringify!($field), "` field.")]
                    $field_vis const $field: $crate::FieldKey<$name, $ty> =
                        // SAFETY: `FIELDS` below lists the fields in this same
                        // order, each built with `FieldSpec::of::<$ty>`.
                        unsafe { $crate::FieldKey::new_unchecked(__FieldIndex::$field as usize) };
                )*
            }

            // SAFETY: one spec per field, in declaration order, matching the
            // indices and types of the keys above.
            unsafe impl $crate::Record for $name {
                const FIELDS: &'static [$crate::FieldSpec] = &[
                    $( $crate::FieldSpec::of::<$ty>(stringify!($field)), )*
                ];

                #[allow(unused_variables)]
                fn replace_row(self, row: &mut $crate::RowMut<'_, Self>) -> Self {
                    Self {
                        $( $field: row.replace(Self::$field, self.$field), )*
                    }
                }
            }
        };
    };
}
