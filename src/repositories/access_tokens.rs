use crate::common::context::Context;
use crate::entities::access_tokens::AccessToken;

const TABLE_NAME: &str = "access_tokens";
const READ_FIELDS: &str = "holder_id, holder_kind, token_hash, expires_at";

pub async fn fetch_one<C: Context>(
    ctx: &C,
    holder_id: i64,
    holder_kind: &str,
) -> sqlx::Result<AccessToken> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE holder_id = ? AND holder_kind = ?"
    );
    sqlx::query_as(QUERY)
        .bind(holder_id)
        .bind(holder_kind)
        .fetch_one(ctx.db())
        .await
}
