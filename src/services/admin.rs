//! Administrator operations: platform statistics, the activity feed, and
//! course management across all instructors.
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{ActivityItem, ActivityKind, AdminCourseItem, AdminStats, CreatedCourse, PublicUser};
use crate::database::models::{Course, Enrollment, Review, User};
use crate::database::Repository;
use crate::filter::{FilterValue, SortDirection};
use crate::services::catalog::{validate_price, CatalogService, CourseDraft, NewCourse};
use crate::services::{related, required, DomainError, DomainResult};
use crate::types::{CourseLevel, CourseStatus, EnrollmentStatus, UserRole};

pub const RECENT_DAYS: i64 = 30;
pub const ACTIVITY_PER_KIND: i64 = 5;
pub const ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<Decimal>,
    pub level: Option<CourseLevel>,
    pub status: Option<CourseStatus>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminCourseQuery {
    pub search: Option<String>,
    pub status: Option<CourseStatus>,
    /// e.g. `"title asc, created_at desc"`; newest first when absent
    pub sort: Option<String>,
}

pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn stats(&self) -> DomainResult<AdminStats> {
        let since = Utc::now() - Duration::days(RECENT_DAYS);
        let users = Repository::<User>::new(User::TABLE, self.pool.clone());
        let courses = Repository::<Course>::new(Course::TABLE, self.pool.clone());
        let enrollments = Repository::<Enrollment>::new(Enrollment::TABLE, self.pool.clone());
        let reviews = Repository::<Review>::new(Review::TABLE, self.pool.clone());

        Ok(AdminStats {
            total_users: users.count(users.filter()?).await?,
            total_courses: courses.count(courses.filter()?).await?,
            total_enrollments: enrollments
                .count(enrollments.filter()?.eq("status", EnrollmentStatus::Active)?)
                .await?,
            total_reviews: reviews.count(reviews.filter()?).await?,
            recent_users: users.count(users.filter()?.gte("created_at", since)?).await?,
            recent_courses: courses.count(courses.filter()?.gte("created_at", since)?).await?,
        })
    }

    /// Newest signups, courses, enrollments and reviews merged into one feed.
    pub async fn activity(&self) -> DomainResult<Vec<ActivityItem>> {
        let users = Repository::<User>::new(User::TABLE, self.pool.clone());
        let recent_users = users.select_any(newest(users.filter()?, "created_at")?).await?;

        let courses = Repository::<Course>::new(Course::TABLE, self.pool.clone());
        let recent_courses = courses.select_any(newest(courses.filter()?, "created_at")?).await?;

        let enrollments = Repository::<Enrollment>::new(Enrollment::TABLE, self.pool.clone());
        let recent_enrollments = enrollments.select_any(newest(enrollments.filter()?, "enrolled_at")?).await?;

        let reviews = Repository::<Review>::new(Review::TABLE, self.pool.clone());
        let recent_reviews = reviews.select_any(newest(reviews.filter()?, "created_at")?).await?;

        let people = related::users(
            &self.pool,
            &related::unique_ids(
                recent_courses
                    .iter()
                    .map(|c| c.instructor_id)
                    .chain(recent_enrollments.iter().map(|e| e.user_id))
                    .chain(recent_reviews.iter().map(|r| r.user_id)),
            ),
        )
        .await?;
        let titles = related::courses(
            &self.pool,
            &related::unique_ids(
                recent_enrollments
                    .iter()
                    .map(|e| e.course_id)
                    .chain(recent_reviews.iter().map(|r| r.course_id)),
            ),
        )
        .await?;
        let name_of = |id: &Uuid| people.get(id).map(|u| u.name.clone()).unwrap_or_else(|| "Unknown user".to_string());
        let title_of = |id: &Uuid| titles.get(id).map(|c| c.title.clone()).unwrap_or_else(|| "Unknown course".to_string());

        let mut feed = Vec::new();
        feed.extend(recent_users.iter().map(|u| {
            ActivityItem::new(
                ActivityKind::User,
                u.id,
                "New user registered".to_string(),
                format!("{} joined as {}", u.name, u.role.as_str().to_lowercase()),
                u.created_at,
            )
        }));
        feed.extend(recent_courses.iter().map(|c| {
            ActivityItem::new(
                ActivityKind::Course,
                c.id,
                "New course created".to_string(),
                format!("{} by {}", c.title, name_of(&c.instructor_id)),
                c.created_at,
            )
        }));
        feed.extend(recent_enrollments.iter().map(|e| {
            ActivityItem::new(
                ActivityKind::Enrollment,
                e.id,
                "New enrollment".to_string(),
                format!("{} enrolled in {}", name_of(&e.user_id), title_of(&e.course_id)),
                e.enrolled_at,
            )
        }));
        feed.extend(recent_reviews.iter().map(|r| {
            ActivityItem::new(
                ActivityKind::Review,
                r.id,
                "New review".to_string(),
                format!("{} rated {} {}/5", name_of(&r.user_id), title_of(&r.course_id), r.rating),
                r.created_at,
            )
        }));

        Ok(merge_feed(feed))
    }

    /// Every course in any status, newest first.
    pub async fn courses(&self, query: AdminCourseQuery) -> DomainResult<Vec<AdminCourseItem>> {
        let repo = Repository::<Course>::new(Course::TABLE, self.pool.clone());
        let mut filter = repo.filter()?.eq_opt("status", query.status)?;
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.search(&["title", "description"], search)?;
        }
        filter = match query.sort.as_deref() {
            Some(spec) => filter
                .order_spec(spec, Course::SORTABLE)
                .map_err(|e| DomainError::invalid("sort", e.to_string()))?,
            None => filter.order("created_at", SortDirection::Desc)?,
        };
        let courses = repo.select_any(filter).await?;

        let course_ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
        let instructors =
            related::user_summaries(&self.pool, &related::unique_ids(courses.iter().map(|c| c.instructor_id))).await?;
        let categories =
            related::categories(&self.pool, &related::unique_ids(courses.iter().filter_map(|c| c.category_id))).await?;
        let counts = related::course_counts(&self.pool, &course_ids).await?;

        Ok(courses
            .into_iter()
            .map(|course| AdminCourseItem {
                instructor: instructors.get(&course.instructor_id).cloned(),
                category: course.category_id.and_then(|id| categories.get(&id).cloned()),
                count: counts.get(&course.id).copied().unwrap_or_default(),
                course,
            })
            .collect())
    }

    /// Create a course on behalf of a named instructor.
    pub async fn create_course(&self, input: NewCourse) -> DomainResult<CreatedCourse> {
        let instructor_id = input
            .instructor_id
            .ok_or_else(|| DomainError::invalid("instructorId", "instructorId is required"))?;
        let draft = CourseDraft::validate(input, instructor_id)?;

        let catalog = CatalogService::new(self.pool.clone());
        catalog.ensure_instructor(instructor_id).await?;
        catalog.insert_course(draft).await
    }

    pub async fn update_course(&self, id: Uuid, patch: CoursePatch) -> DomainResult<Course> {
        let course = Repository::<Course>::new(Course::TABLE, self.pool.clone())
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Course not found".to_string()))?;

        let status = match patch.status {
            Some(next) => course.status.transition(next)?,
            None => course.status,
        };
        let title = patch.title.as_deref().map(|t| required("title", Some(t))).transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(|d| required("description", Some(d)))
            .transpose()?;
        let price = validate_price(patch.price)?;
        if let Some(cid) = patch.category_id {
            if related::categories(&self.pool, &[cid]).await?.is_empty() {
                return Err(DomainError::BadRequest("Category not found".to_string()));
            }
        }

        let updated = sqlx::query_as::<_, Course>(
            "UPDATE courses SET \
                 title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 thumbnail = COALESCE($4, thumbnail), \
                 price = COALESCE($5, price), \
                 level = COALESCE($6, level), \
                 status = $7, \
                 category_id = COALESCE($8, category_id), \
                 updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(patch.thumbnail)
        .bind(price)
        .bind(patch.level)
        .bind(status)
        .bind(patch.category_id)
        .fetch_one(&self.pool)
        .await?;

        if status != course.status {
            tracing::info!("Course {} moved from {} to {}", id, course.status, status);
        }
        Ok(updated)
    }

    /// Remove a course with its lessons, enrollments, progress, reviews and threads.
    pub async fn delete_course(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let lesson_scope = "SELECT id FROM lessons WHERE course_id = $1";
        let discussion_scope =
            format!("SELECT id FROM discussions WHERE course_id = $1 OR lesson_id IN ({})", lesson_scope);
        let statements = [
            format!("DELETE FROM replies WHERE discussion_id IN ({})", discussion_scope),
            format!("DELETE FROM discussions WHERE id IN ({})", discussion_scope),
            format!("DELETE FROM progress WHERE lesson_id IN ({})", lesson_scope),
            "DELETE FROM reviews WHERE course_id = $1".to_string(),
            "DELETE FROM enrollments WHERE course_id = $1".to_string(),
            "DELETE FROM lessons WHERE course_id = $1".to_string(),
        ];
        for sql in statements.iter() {
            sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        }

        let removed = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            tx.rollback().await?;
            return Err(DomainError::NotFound("Course not found".to_string()));
        }

        tx.commit().await?;
        tracing::info!("Deleted course {}", id);
        Ok(())
    }

    /// Users who may teach, by name.
    pub async fn instructors(&self) -> DomainResult<Vec<PublicUser>> {
        let repo = Repository::<User>::new(User::TABLE, self.pool.clone());
        let filter = repo
            .filter()?
            .is_in("role", vec![FilterValue::from(UserRole::Instructor), FilterValue::from(UserRole::Admin)])?
            .order("name", SortDirection::Asc)?;
        Ok(repo.select_any(filter).await?.iter().map(PublicUser::from).collect())
    }
}

fn newest(filter: crate::filter::Filter, column: &str) -> Result<crate::filter::Filter, crate::filter::FilterError> {
    filter.order(column, SortDirection::Desc)?.limit(ACTIVITY_PER_KIND, None)
}

/// Newest first, capped at `ACTIVITY_LIMIT`.
fn merge_feed(mut feed: Vec<ActivityItem>) -> Vec<ActivityItem> {
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed.truncate(ACTIVITY_LIMIT);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_is_sorted_and_capped() {
        let now = Utc::now();
        let feed: Vec<ActivityItem> = (0..14)
            .map(|i| {
                ActivityItem::new(
                    if i % 2 == 0 { ActivityKind::User } else { ActivityKind::Review },
                    Uuid::new_v4(),
                    format!("item {}", i),
                    String::new(),
                    now - Duration::minutes(i),
                )
            })
            .rev()
            .collect();

        let merged = merge_feed(feed);
        assert_eq!(merged.len(), ACTIVITY_LIMIT);
        assert_eq!(merged[0].title, "item 0");
        assert!(merged.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
