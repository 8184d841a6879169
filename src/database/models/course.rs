use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{CourseLevel, CourseStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub price: Decimal,
    pub level: CourseLevel,
    pub status: CourseStatus,
    pub instructor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub const TABLE: &'static str = "courses";

    /// Columns the admin listing may be ordered by
    pub const SORTABLE: &'static [&'static str] = &["created_at", "updated_at", "title", "price", "level", "status"];
}
