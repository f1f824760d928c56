/// Generate `field()` / `field_is_present()` accessor pairs for `Option<T>`
/// fields holding `Copy` values.
macro_rules! impl_presence_accessors {
    ($fields:ty { $($(#[$doc:meta])* $field:ident, $present:ident: $ty:ty;)* }) => {
        impl $fields {
            $(
                $(#[$doc])*
                pub fn $field(&self) -> Option<$ty> {
                    self.$field
                }

                #[doc = concat!("Whether `", stringify!($field), "` was reported by the last update.")]
                pub fn $present(&self) -> bool {
                    self.$field.is_some()
                }
            )*
        }
    };
}

pub(crate) use impl_presence_accessors;
