//! Newtype wrappers around `i64` for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `StudentId` where a
//! `MaterialId` is expected. With the `sqlx` feature enabled each ID type
//! also implements `sqlx::Type`, `sqlx::Encode`, and `sqlx::Decode` for
//! PostgreSQL `BIGINT` columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a well-formed positive identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a positive integer identifier")]
pub struct InvalidId(pub String);

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw database identifier.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw identifier value.
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Build an identifier from a raw value, rejecting zero and negatives.
            pub fn positive(raw: i64) -> Option<Self> {
                (raw > 0).then_some(Self(raw))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(Self::positive)
                    .ok_or_else(|| InvalidId(s.to_string()))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a material (folder or file node).
    MaterialId
);

define_id!(
    /// Unique identifier for a student.
    StudentId
);

define_id!(
    /// Unique identifier for a teacher.
    TeacherId
);

define_id!(
    /// Unique identifier for a platform user account.
    UserId
);

define_id!(
    /// Unique identifier for a course.
    CourseId
);

define_id!(
    /// Unique identifier for a student group within a course.
    GroupId
);

/// Collect raw values out of a slice of identifiers, for array binds.
pub fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_positive() {
        let id: StudentId = "42".parse().expect("should parse");
        assert_eq!(id, StudentId::new(42));
        let padded: StudentId = " 7 ".parse().expect("should parse");
        assert_eq!(padded.get(), 7);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("abc".parse::<StudentId>().is_err());
        assert!("0".parse::<StudentId>().is_err());
        assert!("-3".parse::<StudentId>().is_err());
        assert!("1.5".parse::<MaterialId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&MaterialId::new(12)).expect("serialize");
        assert_eq!(json, "12");
        let parsed: MaterialId = serde_json::from_str("12").expect("deserialize");
        assert_eq!(parsed, MaterialId::new(12));
    }

    #[test]
    fn test_raw_ids() {
        let ids = [StudentId::new(3), StudentId::new(1)];
        assert_eq!(raw_ids(&ids), vec![3, 1]);
    }
}
