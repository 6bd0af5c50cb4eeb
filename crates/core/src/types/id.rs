//! Row identifiers.
//!
//! Every table uses a `SERIAL` key. Each one gets its own wrapper so a metric
//! id can't be passed where a user id is expected.

/// Declare an `i32`-backed row id.
///
/// Doc attributes written before the name are forwarded to the generated
/// struct. The id serializes as a bare number, prints as one, and binds to
/// `INTEGER` columns when the `postgres` feature is on.
///
/// ```rust
/// # use tallybook_core::define_id;
/// define_id!(
///     /// A till register.
///     RegisterId
/// );
///
/// let till = RegisterId::new(4);
/// assert_eq!(till.as_i32(), 4);
/// assert_eq!(till.to_string(), "4");
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        $crate::__id_postgres!($name);
    };
}

/// Postgres bindings for an id type; they defer to `i32`.
#[doc(hidden)]
#[macro_export]
macro_rules! __id_postgres {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::core::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Account owning metrics and notifications; the `users.id` key.
    UserId
);

define_id!(
    /// One day's figures for one user; the `daily_metrics.id` key.
    MetricId
);

define_id!(
    /// A generated notification; the `notifications.id` key.
    NotificationId
);
