//! `SQLite` codec: the tree is stored as serialized JSON in a TEXT column.
//!
//! The stored text is what `SQLite`'s JSON1 functions operate on, so columns
//! written through [`JsonDocument`] stay queryable with `json_extract` and
//! friends.

use std::borrow::Cow;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, Type};

use crate::JsonDocument;

impl Type<Sqlite> for JsonDocument {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <&str as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for JsonDocument {
    fn encode_by_ref(
        &self,
        args: &mut Vec<SqliteArgumentValue<'q>>,
    ) -> Result<IsNull, BoxDynError> {
        let text = serde_json::to_string(self.value())?;
        args.push(SqliteArgumentValue::Text(Cow::Owned(text)));
        Ok(IsNull::No)
    }
}

impl<'r> Decode<'r, Sqlite> for JsonDocument {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(Self::new(serde_json::from_str(text)?))
    }
}
