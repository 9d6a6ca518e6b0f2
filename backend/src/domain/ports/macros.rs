//! Declarative helper for port error enums.
//!
//! Each variant carries named fields and a display template. A snake_case
//! constructor is generated per variant, taking `impl Into<_>` for every
//! field so call sites can pass `&str` or `String` interchangeably.

macro_rules! define_port_error {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$doc:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $display:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$doc])*
                #[error($display)]
                $variant { $($field: $ty),+ },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SampleError {
            Refused { reason: String } => "refused: {reason}",
            Upstream { code: u16, detail: String } => "upstream {code}: {detail}",
        }
    }

    #[test]
    fn constructors_take_borrowed_strings() {
        let err = SampleError::refused("closed");
        assert_eq!(err, SampleError::Refused { reason: "closed".to_owned() });
        assert_eq!(err.to_string(), "refused: closed");
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let err = SampleError::upstream(503_u16, String::from("busy"));
        assert_eq!(err.to_string(), "upstream 503: busy");
    }
}
