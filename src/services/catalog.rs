use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{CourseDetail, CourseListItem, CreatedCourse, LessonOutline, ReviewView};
use crate::api::{PageRequest, Pagination};
use crate::database::models::{Category, Course, Review};
use crate::database::Repository;
use crate::filter::{FilterValue, SortDirection};
use crate::middleware::AuthUser;
use crate::services::aggregates::{average_rating, total_duration};
use crate::services::{optional_text, related, required, DomainError, DomainResult};
use crate::types::{CourseLevel, CourseStatus, UserRole};

/// Body of a course creation request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<Decimal>,
    pub level: Option<CourseLevel>,
    pub category_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub status: Option<CourseStatus>,
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub level: Option<CourseLevel>,
    pub search: Option<String>,
}

/// Validated column values for a new course row
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CourseDraft {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub price: Decimal,
    pub level: CourseLevel,
    pub status: CourseStatus,
    pub instructor_id: Uuid,
    pub category_id: Option<Uuid>,
}

impl CourseDraft {
    pub fn validate(input: NewCourse, instructor_id: Uuid) -> DomainResult<Self> {
        let title = required("title", input.title.as_deref())?;
        let description = required("description", input.description.as_deref())?;
        let level = input.level.ok_or_else(|| DomainError::invalid("level", "level is required"))?;
        let price = validate_price(input.price)?.unwrap_or(Decimal::ZERO);
        let status = CourseStatus::Draft.transition(input.status.unwrap_or(CourseStatus::Draft))?;

        Ok(Self {
            title,
            description,
            thumbnail: optional_text(input.thumbnail),
            price,
            level,
            status,
            instructor_id,
            category_id: input.category_id,
        })
    }
}

pub(crate) fn validate_price(price: Option<Decimal>) -> DomainResult<Option<Decimal>> {
    match price {
        Some(p) if p.is_sign_negative() && !p.is_zero() => Err(DomainError::invalid("price", "price must not be negative")),
        other => Ok(other),
    }
}

/// Instructors always author their own courses; admins may name someone else.
pub(crate) fn resolve_instructor(author: &AuthUser, requested: Option<Uuid>) -> Uuid {
    match (author.role, requested) {
        (UserRole::Admin, Some(id)) => id,
        _ => author.user_id,
    }
}

pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Published courses, newest first.
    pub async fn list_courses(&self, query: CourseQuery, page: PageRequest) -> DomainResult<(Vec<CourseListItem>, Pagination)> {
        let repo = Repository::<Course>::new(Course::TABLE, self.pool.clone());
        let mut filter = repo.filter()?.eq("status", CourseStatus::Published)?;

        if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let categories = Repository::<Category>::new(Category::TABLE, self.pool.clone());
            let matches = categories.select_any(categories.filter()?.search(&["name"], category)?).await?;
            filter = filter.is_in("category_id", matches.iter().map(|c| FilterValue::Uuid(c.id)).collect())?;
        }
        filter = filter.eq_opt("level", query.level)?;
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.search(&["title", "description"], search)?;
        }

        let total = repo.count(filter.clone()).await?;
        let filter = filter
            .order("created_at", SortDirection::Desc)?
            .limit(page.limit as i64, Some(page.offset()))?;
        let courses = repo.select_any(filter).await?;

        let items = self.course_cards(courses).await?;
        Ok((items, Pagination::new(page, total)))
    }

    async fn course_cards(&self, courses: Vec<Course>) -> DomainResult<Vec<CourseListItem>> {
        let course_ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
        let instructor_ids = related::unique_ids(courses.iter().map(|c| c.instructor_id));
        let category_ids = related::unique_ids(courses.iter().filter_map(|c| c.category_id));

        let instructors = related::user_summaries(&self.pool, &instructor_ids).await?;
        let categories = related::categories(&self.pool, &category_ids).await?;
        let mut lessons = related::published_lessons(&self.pool, &course_ids).await?;
        let counts = related::course_counts(&self.pool, &course_ids).await?;
        let ratings = related::ratings(&self.pool, &course_ids).await?;

        Ok(courses
            .into_iter()
            .map(|course| {
                let lessons = lessons.remove(&course.id).unwrap_or_default();
                let course_ratings = ratings.get(&course.id).map(Vec::as_slice).unwrap_or(&[]);
                CourseListItem {
                    instructor: instructors.get(&course.instructor_id).cloned(),
                    category: course.category_id.and_then(|id| categories.get(&id).cloned()),
                    total_duration: total_duration(lessons.iter().map(|l| l.duration)),
                    lessons: lessons.iter().map(LessonOutline::from).collect(),
                    count: counts.get(&course.id).copied().unwrap_or_default(),
                    average_rating: average_rating(course_ratings),
                    review_count: course_ratings.len() as i64,
                    course,
                }
            })
            .collect())
    }

    /// A single course in any status.
    pub async fn get_course(&self, id: Uuid) -> DomainResult<CourseDetail> {
        let course = Repository::<Course>::new(Course::TABLE, self.pool.clone())
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Course not found".to_string()))?;

        let reviews_repo = Repository::<Review>::new(Review::TABLE, self.pool.clone());
        let reviews = reviews_repo
            .select_any(
                reviews_repo
                    .filter()?
                    .eq("course_id", id)?
                    .order("created_at", SortDirection::Desc)?,
            )
            .await?;

        let mut user_ids: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        user_ids.push(course.instructor_id);
        let users = related::user_summaries(&self.pool, &related::unique_ids(user_ids)).await?;
        let category = match course.category_id {
            Some(cid) => related::categories(&self.pool, &[cid]).await?.remove(&cid),
            None => None,
        };
        let lessons = related::published_lessons(&self.pool, &[id]).await?.remove(&id).unwrap_or_default();
        let count = related::course_counts(&self.pool, &[id]).await?.get(&id).copied().unwrap_or_default();

        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        let reviews = reviews
            .into_iter()
            .map(|review| ReviewView { user: users.get(&review.user_id).cloned(), course: None, review })
            .collect();

        Ok(CourseDetail {
            instructor: users.get(&course.instructor_id).cloned(),
            category,
            total_duration: total_duration(lessons.iter().map(|l| l.duration)),
            lessons,
            reviews,
            count,
            average_rating: average_rating(&ratings),
            review_count: ratings.len() as i64,
            course,
        })
    }

    /// New courses always start as DRAFT.
    pub async fn create_course(&self, author: &AuthUser, mut input: NewCourse) -> DomainResult<CreatedCourse> {
        input.status = None;
        let instructor_id = resolve_instructor(author, input.instructor_id);
        let draft = CourseDraft::validate(input, instructor_id)?;
        if instructor_id != author.user_id {
            self.ensure_instructor(instructor_id).await?;
        }
        self.insert_course(draft).await
    }

    pub(crate) async fn ensure_instructor(&self, id: Uuid) -> DomainResult<()> {
        let users = related::users(&self.pool, &[id]).await?;
        match users.get(&id) {
            Some(user) if user.role.can_author() => Ok(()),
            _ => Err(DomainError::BadRequest("Instructor not found".to_string())),
        }
    }

    pub(crate) async fn insert_course(&self, draft: CourseDraft) -> DomainResult<CreatedCourse> {
        let category = match draft.category_id {
            Some(cid) => Some(
                related::categories(&self.pool, &[cid])
                    .await?
                    .remove(&cid)
                    .ok_or_else(|| DomainError::BadRequest("Category not found".to_string()))?,
            ),
            None => None,
        };

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, title, description, thumbnail, price, level, status, instructor_id, category_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.thumbnail)
        .bind(draft.price)
        .bind(draft.level)
        .bind(draft.status)
        .bind(draft.instructor_id)
        .bind(draft.category_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created course {} ({}) for instructor {}", course.id, course.status, course.instructor_id);

        let instructor = related::user_summaries(&self.pool, &[course.instructor_id])
            .await?
            .remove(&course.instructor_id);
        Ok(CreatedCourse { course, instructor, category })
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        let repo = Repository::<Category>::new(Category::TABLE, self.pool.clone());
        Ok(repo.select_any(repo.filter()?.order("name", SortDirection::Asc)?).await?)
    }

    pub async fn create_category(&self, input: NewCategory) -> DomainResult<Category> {
        let name = required("name", input.name.as_deref())?;
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, icon, color, created_at) \
             VALUES ($1, $2, $3, $4, $5, now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(optional_text(input.description))
        .bind(optional_text(input.icon))
        .bind(optional_text(input.color))
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }
}
