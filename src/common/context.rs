use crate::common::registry::ConnectionRegistry;
use sqlx::{MySql, Pool};

pub trait Context: Sync + Send {
    fn db(&self) -> &Pool<MySql>;
    fn registry(&self) -> &ConnectionRegistry;
}
