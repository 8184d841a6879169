use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{EnrolledCourse, EnrollmentCourse, EnrollmentListItem, EnrollmentView, LessonCount, LessonOutline};
use crate::api::{PageRequest, Pagination};
use crate::database::models::{Course, Enrollment, LessonProgress};
use crate::database::{DatabaseError, Repository};
use crate::filter::{FilterValue, SortDirection};
use crate::services::aggregates::progress_percentage;
use crate::services::{related, DomainError, DomainResult};
use crate::types::EnrollmentStatus;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollInput {
    pub course_id: Option<Uuid>,
}

/// The caller's enrollment in a course, if any.
pub(crate) async fn find_for(pool: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<Option<Enrollment>, DatabaseError> {
    let repo = Repository::<Enrollment>::new(Enrollment::TABLE, pool.clone());
    repo.select_one(repo.filter()?.eq("user_id", user_id)?.eq("course_id", course_id)?)
        .await
}

/// True when the caller holds a non-cancelled enrollment in the course.
pub(crate) async fn is_enrolled(pool: &PgPool, user_id: Uuid, course_id: Uuid) -> Result<bool, DatabaseError> {
    Ok(matches!(
        find_for(pool, user_id, course_id).await?,
        Some(e) if e.status != EnrollmentStatus::Cancelled
    ))
}

pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> Repository<Enrollment> {
        Repository::new(Enrollment::TABLE, self.pool.clone())
    }

    pub async fn enroll(&self, user_id: Uuid, input: EnrollInput) -> DomainResult<EnrollmentView> {
        let course_id = input
            .course_id
            .ok_or_else(|| DomainError::invalid("courseId", "courseId is required"))?;

        let course = Repository::<Course>::new(Course::TABLE, self.pool.clone())
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Course not found".to_string()))?;
        if !course.status.is_enrollable() {
            return Err(DomainError::BadRequest("Course is not available for enrollment".to_string()));
        }

        if let Some(existing) = find_for(&self.pool, user_id, course_id).await? {
            return Err(already_enrolled(existing.status));
        }

        let inserted = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, user_id, course_id, status, progress, enrolled_at) \
             VALUES ($1, $2, $3, $4, 0, now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .bind(EnrollmentStatus::Active)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from);

        let enrollment = match inserted {
            Ok(e) => e,
            Err(e) if e.is_unique_violation() => return Err(already_enrolled(EnrollmentStatus::Active)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!("User {} enrolled in course {}", user_id, course_id);

        let instructor = related::user_summaries(&self.pool, &[course.instructor_id])
            .await?
            .remove(&course.instructor_id);
        Ok(EnrollmentView {
            enrollment,
            course: EnrolledCourse { id: course.id, title: course.title, instructor },
        })
    }

    /// The caller's enrollments, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        status: Option<EnrollmentStatus>,
        page: PageRequest,
    ) -> DomainResult<(Vec<EnrollmentListItem>, Pagination)> {
        let repo = self.repo();
        let filter = repo.filter()?.eq("user_id", user_id)?.eq_opt("status", status)?;
        let total = repo.count(filter.clone()).await?;
        let enrollments = repo
            .select_any(
                filter
                    .order("enrolled_at", SortDirection::Desc)?
                    .limit(page.limit as i64, Some(page.offset()))?,
            )
            .await?;

        let course_ids = related::unique_ids(enrollments.iter().map(|e| e.course_id));
        let courses = related::courses(&self.pool, &course_ids).await?;
        let categories = related::categories(
            &self.pool,
            &related::unique_ids(courses.values().filter_map(|c| c.category_id)),
        )
        .await?;
        let instructors = related::user_summaries(
            &self.pool,
            &related::unique_ids(courses.values().map(|c| c.instructor_id)),
        )
        .await?;
        let lessons = related::published_lessons(&self.pool, &course_ids).await?;

        let lesson_ids: Vec<FilterValue> = lessons.values().flatten().map(|l| FilterValue::Uuid(l.id)).collect();
        let progress_rows = if lesson_ids.is_empty() {
            Vec::new()
        } else {
            let progress_repo = Repository::<LessonProgress>::new(LessonProgress::TABLE, self.pool.clone());
            progress_repo
                .select_any(progress_repo.filter()?.eq("user_id", user_id)?.is_in("lesson_id", lesson_ids)?)
                .await?
        };

        let mut items = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = courses
                .get(&enrollment.course_id)
                .cloned()
                .ok_or_else(|| DomainError::NotFound("Course not found".to_string()))?;
            let course_lessons = lessons.get(&course.id).cloned().unwrap_or_default();
            let records: Vec<LessonProgress> = progress_rows
                .iter()
                .filter(|p| course_lessons.iter().any(|l| l.id == p.lesson_id))
                .cloned()
                .collect();
            let completed = records.iter().filter(|p| p.completed).count() as i64;
            let total_lessons = course_lessons.len() as i64;

            items.push(EnrollmentListItem {
                progress_records: records,
                progress_percentage: progress_percentage(completed, total_lessons),
                completed_lessons: completed,
                total_lessons,
                course: EnrollmentCourse {
                    category: course.category_id.and_then(|id| categories.get(&id).cloned()),
                    instructor: instructors.get(&course.instructor_id).cloned(),
                    lessons: course_lessons.iter().map(LessonOutline::from).collect(),
                    count: LessonCount { lessons: total_lessons },
                    course,
                },
                enrollment,
            });
        }

        Ok((items, Pagination::new(page, total)))
    }

    pub async fn check(&self, user_id: Uuid, course_id: Uuid) -> DomainResult<Option<Enrollment>> {
        Ok(find_for(&self.pool, user_id, course_id).await?)
    }

    /// Cancel one of the caller's enrollments.
    pub async fn cancel(&self, user_id: Uuid, enrollment_id: Uuid) -> DomainResult<Enrollment> {
        let mut tx = self.pool.begin().await?;
        let enrollment =
            sqlx::query_as::<_, Enrollment>("SELECT * FROM enrollments WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(enrollment_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DomainError::NotFound("Enrollment not found".to_string()))?;

        let next = enrollment.status.transition(EnrollmentStatus::Cancelled)?;
        let updated = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments SET status = $2 WHERE id = $1 AND status = $3 RETURNING *",
        )
        .bind(enrollment.id)
        .bind(next)
        .bind(enrollment.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DomainError::BadRequest("Enrollment changed while cancelling; try again".to_string()))?;
        tx.commit().await?;
        tracing::info!("User {} cancelled enrollment {}", user_id, enrollment.id);
        Ok(updated)
    }
}

fn already_enrolled(status: EnrollmentStatus) -> DomainError {
    match status {
        EnrollmentStatus::Cancelled => DomainError::BadRequest("Enrollment in this course was cancelled".to_string()),
        _ => DomainError::BadRequest("Already enrolled in this course".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_enrollment_messages() {
        assert_eq!(already_enrolled(EnrollmentStatus::Active).to_string(), "Already enrolled in this course");
        assert_eq!(already_enrolled(EnrollmentStatus::Completed).to_string(), "Already enrolled in this course");
        assert_eq!(
            already_enrolled(EnrollmentStatus::Cancelled).to_string(),
            "Enrollment in this course was cancelled"
        );
    }
}
