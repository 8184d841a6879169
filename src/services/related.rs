//! Batch loading of related rows.
//!
//! Listing endpoints fetch their primary rows with one query, then resolve
//! every relation with one more query per relation keyed by id.
use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{CourseCounts, UserSummary};
use crate::database::models::{Category, Course, Discussion, Enrollment, Lesson, Reply, User};
use crate::database::{DatabaseError, Repository};
use crate::filter::{FilterValue, SortDirection};

/// Distinct ids in first-seen order
pub fn unique_ids<I>(ids: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn uuid_values(ids: &[Uuid]) -> Vec<FilterValue> {
    ids.iter().copied().map(FilterValue::Uuid).collect()
}

fn by_id<T, F>(rows: Vec<T>, key: F) -> HashMap<Uuid, T>
where
    F: Fn(&T) -> Uuid,
{
    rows.into_iter().map(|row| (key(&row), row)).collect()
}

pub async fn users(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, User>, DatabaseError> {
    let rows = Repository::<User>::new(User::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |u| u.id))
}

pub async fn user_summaries(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, DatabaseError> {
    Ok(users(pool, ids)
        .await?
        .iter()
        .map(|(id, user)| (*id, UserSummary::from(user)))
        .collect())
}

pub async fn categories(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, Category>, DatabaseError> {
    let rows = Repository::<Category>::new(Category::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |c| c.id))
}

pub async fn courses(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, Course>, DatabaseError> {
    let rows = Repository::<Course>::new(Course::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |c| c.id))
}

pub async fn lessons(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, Lesson>, DatabaseError> {
    let rows = Repository::<Lesson>::new(Lesson::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |l| l.id))
}

pub async fn enrollments(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, Enrollment>, DatabaseError> {
    let rows = Repository::<Enrollment>::new(Enrollment::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |e| e.id))
}

pub async fn discussions(pool: &PgPool, ids: &[Uuid]) -> Result<HashMap<Uuid, Discussion>, DatabaseError> {
    let rows = Repository::<Discussion>::new(Discussion::TABLE, pool.clone()).select_ids(ids).await?;
    Ok(by_id(rows, |d| d.id))
}

/// Published lessons per course, in lesson order.
pub async fn published_lessons(pool: &PgPool, course_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Lesson>>, DatabaseError> {
    let mut grouped: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
    if course_ids.is_empty() {
        return Ok(grouped);
    }
    let repo = Repository::<Lesson>::new(Lesson::TABLE, pool.clone());
    let filter = repo
        .filter()?
        .is_in("course_id", uuid_values(course_ids))?
        .eq("is_published", true)?
        .order("sort_order", SortDirection::Asc)?
        .order("created_at", SortDirection::Asc)?;
    for lesson in repo.select_any(filter).await? {
        grouped.entry(lesson.course_id).or_default().push(lesson);
    }
    Ok(grouped)
}

/// Replies per discussion, oldest first.
pub async fn replies(pool: &PgPool, discussion_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Reply>>, DatabaseError> {
    let mut grouped: HashMap<Uuid, Vec<Reply>> = HashMap::new();
    if discussion_ids.is_empty() {
        return Ok(grouped);
    }
    let repo = Repository::<Reply>::new(Reply::TABLE, pool.clone());
    let filter = repo
        .filter()?
        .is_in("discussion_id", uuid_values(discussion_ids))?
        .order("created_at", SortDirection::Asc)?;
    for reply in repo.select_any(filter).await? {
        grouped.entry(reply.discussion_id).or_default().push(reply);
    }
    Ok(grouped)
}

/// Enrollment and review counts per course.
pub async fn course_counts(pool: &PgPool, course_ids: &[Uuid]) -> Result<HashMap<Uuid, CourseCounts>, DatabaseError> {
    let mut counts: HashMap<Uuid, CourseCounts> = HashMap::new();
    if course_ids.is_empty() {
        return Ok(counts);
    }

    let enrollments: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT course_id, COUNT(*) FROM enrollments WHERE course_id = ANY($1) GROUP BY course_id",
    )
    .bind(course_ids)
    .fetch_all(pool)
    .await?;
    for (course_id, n) in enrollments {
        counts.entry(course_id).or_default().enrollments = n;
    }

    let reviews: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT course_id, COUNT(*) FROM reviews WHERE course_id = ANY($1) GROUP BY course_id",
    )
    .bind(course_ids)
    .fetch_all(pool)
    .await?;
    for (course_id, n) in reviews {
        counts.entry(course_id).or_default().reviews = n;
    }

    Ok(counts)
}

/// Every rating left on each course.
pub async fn ratings(pool: &PgPool, course_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<i32>>, DatabaseError> {
    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    if course_ids.is_empty() {
        return Ok(grouped);
    }
    let rows: Vec<(Uuid, i32)> = sqlx::query_as("SELECT course_id, rating FROM reviews WHERE course_id = ANY($1)")
        .bind(course_ids)
        .fetch_all(pool)
        .await?;
    for (course_id, rating) in rows {
        grouped.entry(course_id).or_default().push(rating);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_keeps_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(unique_ids(vec![a, b, a, b, a]), vec![a, b]);
        assert!(unique_ids(Vec::new()).is_empty());
    }
}
