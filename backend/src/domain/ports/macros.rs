//! Helper macro generating port error enums with snake_case constructors.
//!
//! Each variant becomes a `thiserror` variant with the given display string
//! plus a constructor named after it. String-like fields take `impl Into<_>`
//! so call sites can pass `&str` or `String`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant [] [] $( $($field : $ty,)* )?);
            )*
        }
    };

    // Fields exhausted: emit the constructor.
    (@constructor $variant:ident [] []) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };
    (@constructor $variant:ident [$($params:tt)*] [$($inits:tt)+]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)+ }
            }
        }
    };
    (
        @constructor $variant:ident [$($params:tt)*] [$($inits:tt)*]
        $field:ident : $ty:ty, $($rest:tt)*
    ) => {
        define_port_error!(
            @constructor $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };
}

pub(crate) use define_port_error;
