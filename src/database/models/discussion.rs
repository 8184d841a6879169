use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A thread attached to a course, a lesson, or both
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discussion {
    pub const TABLE: &'static str = "discussions";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub discussion_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Reply {
    pub const TABLE: &'static str = "replies";
}
