use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::LessonType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    /// Minutes
    pub duration: Option<i32>,
    #[sqlx(rename = "sort_order")]
    #[serde(rename = "order")]
    pub order: i32,
    #[sqlx(rename = "lesson_type")]
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    pub const TABLE: &'static str = "lessons";
}
