use crate::common::context::Context;
use crate::entities::participants::MerchantProfile;

const TABLE_NAME: &str = "merchants";
const READ_FIELDS: &str = "id, name, logo, account_name, created_at";

pub async fn fetch_one<C: Context>(ctx: &C, merchant_id: i64) -> sqlx::Result<MerchantProfile> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(merchant_id)
        .fetch_one(ctx.db())
        .await
}
