use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pod row. `id` is the internal surrogate key and is never exposed
/// through the API; clients address pods by `uuid`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pod {
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
