//! `PostgreSQL` codec: the tree is stored as native `jsonb`.
//!
//! Delegates to sqlx's `Json` wrapper, which registers against the `jsonb`
//! type, so columns declared `jsonb` accept and return [`JsonDocument`]
//! without a cast.

use serde_json::Value;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use sqlx::types::Json;
use sqlx::{Decode, Encode, Type};

use crate::JsonDocument;

impl Type<Postgres> for JsonDocument {
    fn type_info() -> PgTypeInfo {
        <Json<Value> as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <Json<Value> as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for JsonDocument {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <Json<&Value> as Encode<'q, Postgres>>::encode_by_ref(&Json(self.value()), buf)
    }
}

impl<'r> Decode<'r, Postgres> for JsonDocument {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let json = <Json<Value> as Decode<'r, Postgres>>::decode(value)?;
        Ok(Self::new(json.0))
    }
}
