use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::api::format::{CourseRef, ReviewView, SavedReview};
use crate::database::models::Review;
use crate::database::Repository;
use crate::filter::SortDirection;
use crate::services::enrollments::is_enrolled;
use crate::services::{optional_text, related, DomainError, DomainResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub course_id: Option<Uuid>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    pub course_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

pub fn validate_rating(rating: Option<i64>) -> DomainResult<i32> {
    match rating {
        Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(r as i32),
        _ => Err(DomainError::invalid(
            "rating",
            format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
        )),
    }
}

/// `xmax` is zero only on a freshly inserted row version.
const UPSERT_REVIEW: &str = "\
INSERT INTO reviews (id, user_id, course_id, rating, comment, created_at, updated_at) \
VALUES ($1, $2, $3, $4, $5, now(), now()) \
ON CONFLICT (user_id, course_id) DO UPDATE SET \
    rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = now() \
RETURNING *, (xmax = 0) AS inserted";

#[derive(FromRow)]
struct UpsertedReview {
    #[sqlx(flatten)]
    review: Review,
    inserted: bool,
}

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> Repository<Review> {
        Repository::new(Review::TABLE, self.pool.clone())
    }

    /// Create the caller's review of a course, or replace the one they left.
    pub async fn submit(&self, user_id: Uuid, input: ReviewInput) -> DomainResult<SavedReview> {
        let course_id = input.course_id.ok_or_else(|| DomainError::invalid("courseId", "courseId is required"))?;
        let rating = validate_rating(input.rating)?;

        if !is_enrolled(&self.pool, user_id, course_id).await? {
            return Err(DomainError::BadRequest("You must be enrolled in this course to review it".to_string()));
        }

        let UpsertedReview { review, inserted: created } = sqlx::query_as::<_, UpsertedReview>(UPSERT_REVIEW)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(course_id)
            .bind(rating)
            .bind(optional_text(input.comment))
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            "{} review {} of course {}",
            if created { "Created" } else { "Updated" },
            review.id,
            course_id
        );

        let user = related::user_summaries(&self.pool, &[user_id]).await?.remove(&user_id);
        Ok(SavedReview { review: ReviewView { review, user, course: None }, created })
    }

    /// Reviews, newest first.
    pub async fn list(&self, query: ReviewQuery) -> DomainResult<Vec<ReviewView>> {
        let repo = self.repo();
        let filter = repo
            .filter()?
            .eq_opt("course_id", query.course_id)?
            .eq_opt("user_id", query.user_id)?
            .order("created_at", SortDirection::Desc)?;
        let reviews = repo.select_any(filter).await?;

        let users = related::user_summaries(&self.pool, &related::unique_ids(reviews.iter().map(|r| r.user_id))).await?;
        let courses = related::courses(&self.pool, &related::unique_ids(reviews.iter().map(|r| r.course_id))).await?;

        Ok(reviews
            .into_iter()
            .map(|review| ReviewView {
                user: users.get(&review.user_id).cloned(),
                course: courses.get(&review.course_id).map(CourseRef::from),
                review,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_range() {
        assert_eq!(validate_rating(Some(1)).unwrap(), 1);
        assert_eq!(validate_rating(Some(5)).unwrap(), 5);
        for bad in [Some(0), Some(6), Some(-3), None] {
            let err = validate_rating(bad).unwrap_err();
            assert_eq!(err.to_string(), "Rating must be between 1 and 5");
        }
    }
}
