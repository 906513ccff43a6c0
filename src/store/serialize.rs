//! SQLite serialization for typed identifiers
//!
//! Implements ToSql and FromSql for the string newtypes so they can be
//! bound and read without going through bare `String`s.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::identity::{AttributeName, AttributeValue, TemplateId, VariantId};

macro_rules! sql_text {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value.as_str().map(|s| <$ty>::new(s))
                }
            }
        )+
    };
}

sql_text!(TemplateId, VariantId, AttributeName, AttributeValue);
