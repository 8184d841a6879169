use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (user, lesson)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub enrollment_id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds watched
    pub watch_time: i32,
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    pub const TABLE: &'static str = "progress";
}
