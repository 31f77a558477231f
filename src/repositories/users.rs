use crate::common::context::Context;
use crate::entities::participants::UserProfile;

const TABLE_NAME: &str = "users";
const READ_FIELDS: &str = "id, username, nickname, avatar, created_at";

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<UserProfile> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY).bind(user_id).fetch_one(ctx.db()).await
}
