use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{EnrollmentRef, LessonRef, ProgressUpdate, ProgressView};
use crate::database::models::{Enrollment, Lesson, LessonProgress};
use crate::database::Repository;
use crate::filter::FilterValue;
use crate::services::aggregates::progress_percentage;
use crate::services::{related, DomainError, DomainResult};
use crate::types::EnrollmentStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInput {
    pub lesson_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub completed: Option<bool>,
    /// Seconds
    pub watch_time: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressQuery {
    pub course_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
}

/// Keeps the stored flags when the request leaves them out.
const UPSERT_PROGRESS: &str = "\
INSERT INTO progress (id, user_id, lesson_id, enrollment_id, completed, completed_at, watch_time, updated_at) \
VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), CASE WHEN COALESCE($5, FALSE) THEN now() ELSE NULL END, COALESCE($6, 0), now()) \
ON CONFLICT (user_id, lesson_id) DO UPDATE SET \
    enrollment_id = EXCLUDED.enrollment_id, \
    completed = COALESCE($5, progress.completed), \
    completed_at = CASE WHEN $5 IS NULL THEN progress.completed_at WHEN $5 THEN now() ELSE NULL END, \
    watch_time = COALESCE($6, progress.watch_time), \
    updated_at = now() \
RETURNING *";

const COUNT_COMPLETED: &str = "\
SELECT COUNT(*) FROM progress p JOIN lessons l ON l.id = p.lesson_id \
WHERE p.user_id = $1 AND l.course_id = $2 AND l.is_published AND p.completed";

const COUNT_PUBLISHED: &str = "SELECT COUNT(*) FROM lessons WHERE course_id = $1 AND is_published";

pub struct ProgressService {
    pool: PgPool,
}

impl ProgressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record lesson progress and roll it up into the enrollment.
    pub async fn record(&self, user_id: Uuid, input: ProgressInput) -> DomainResult<ProgressUpdate> {
        let lesson_id = input.lesson_id.ok_or_else(|| DomainError::invalid("lessonId", "lessonId is required"))?;
        let enrollment_id = input
            .enrollment_id
            .ok_or_else(|| DomainError::invalid("enrollmentId", "enrollmentId is required"))?;
        let watch_time = validate_watch_time(input.watch_time)?;

        let mut tx = self.pool.begin().await?;

        // Locked until commit so a concurrent cancel cannot be overwritten.
        let enrollment = sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = $1 FOR UPDATE")
            .bind(enrollment_id)
            .fetch_optional(&mut *tx)
            .await?
            .filter(|e| e.user_id == user_id)
            .ok_or_else(|| DomainError::Forbidden("Enrollment not found or access denied".to_string()))?;
        if enrollment.status == EnrollmentStatus::Cancelled {
            return Err(DomainError::BadRequest("Enrollment is cancelled".to_string()));
        }

        sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = $1 AND course_id = $2")
            .bind(lesson_id)
            .bind(enrollment.course_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::NotFound("Lesson not found in this course".to_string()))?;

        let progress = sqlx::query_as::<_, LessonProgress>(UPSERT_PROGRESS)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(lesson_id)
            .bind(enrollment.id)
            .bind(input.completed)
            .bind(watch_time)
            .fetch_one(&mut *tx)
            .await?;

        let (completed,): (i64,) = sqlx::query_as(COUNT_COMPLETED)
            .bind(user_id)
            .bind(enrollment.course_id)
            .fetch_one(&mut *tx)
            .await?;
        let (total,): (i64,) = sqlx::query_as(COUNT_PUBLISHED)
            .bind(enrollment.course_id)
            .fetch_one(&mut *tx)
            .await?;

        let percentage = progress_percentage(completed, total);
        let status = enrollment.status.transition(EnrollmentStatus::for_progress(percentage))?;

        sqlx::query(
            "UPDATE enrollments SET progress = $2, status = $3, \
             completed_at = CASE WHEN $3 = 'COMPLETED' THEN COALESCE(completed_at, now()) ELSE NULL END \
             WHERE id = $1",
        )
        .bind(enrollment.id)
        .bind(percentage)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if status != enrollment.status {
            tracing::info!("Enrollment {} moved from {} to {}", enrollment.id, enrollment.status, status);
        }

        Ok(ProgressUpdate { progress, progress_percentage: percentage })
    }

    /// The caller's progress rows in lesson order.
    pub async fn list(&self, user_id: Uuid, query: ProgressQuery) -> DomainResult<Vec<ProgressView>> {
        let repo = Repository::<LessonProgress>::new(LessonProgress::TABLE, self.pool.clone());
        let mut filter = repo.filter()?.eq("user_id", user_id)?.eq_opt("enrollment_id", query.enrollment_id)?;

        if let Some(course_id) = query.course_id {
            let lessons = Repository::<Lesson>::new(Lesson::TABLE, self.pool.clone());
            let course_lessons = lessons
                .select_any(lessons.filter()?.eq("course_id", course_id)?)
                .await?;
            filter = filter.is_in("lesson_id", course_lessons.iter().map(|l| FilterValue::Uuid(l.id)).collect())?;
        }

        let rows = repo.select_any(filter).await?;
        let lessons = related::lessons(&self.pool, &related::unique_ids(rows.iter().map(|p| p.lesson_id))).await?;
        let enrollments =
            related::enrollments(&self.pool, &related::unique_ids(rows.iter().map(|p| p.enrollment_id))).await?;

        let mut views: Vec<ProgressView> = rows
            .into_iter()
            .map(|progress| ProgressView {
                lesson: lessons.get(&progress.lesson_id).map(LessonRef::from),
                enrollment: enrollments.get(&progress.enrollment_id).map(EnrollmentRef::from),
                progress,
            })
            .collect();
        views.sort_by_key(|v| (v.lesson.as_ref().map(|l| l.order).unwrap_or(i32::MAX), v.progress.lesson_id));
        Ok(views)
    }
}

fn validate_watch_time(watch_time: Option<i64>) -> DomainResult<Option<i32>> {
    match watch_time {
        None => Ok(None),
        Some(t) if t < 0 => Err(DomainError::invalid("watchTime", "watchTime must not be negative")),
        Some(t) => i32::try_from(t)
            .map(Some)
            .map_err(|_| DomainError::invalid("watchTime", "watchTime is too large")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_time_bounds() {
        assert_eq!(validate_watch_time(None).unwrap(), None);
        assert_eq!(validate_watch_time(Some(0)).unwrap(), Some(0));
        assert_eq!(validate_watch_time(Some(754)).unwrap(), Some(754));
        assert!(matches!(validate_watch_time(Some(-1)), Err(DomainError::Validation { field: "watchTime", .. })));
        assert!(validate_watch_time(Some(i64::MAX)).is_err());
    }
}
