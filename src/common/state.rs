use crate::common::registry::ConnectionRegistry;
use sqlx::{MySql, Pool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<MySql>,
    pub registry: Arc<ConnectionRegistry>,
}
