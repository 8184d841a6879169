use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::format::{CourseRef, DiscussionRef, DiscussionView, LessonTitle, ReplyCount, ReplyView};
use crate::database::models::{Discussion, Lesson, Reply};
use crate::database::Repository;
use crate::filter::SortDirection;
use crate::services::enrollments::is_enrolled;
use crate::services::{related, required, DomainError, DomainResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscussion {
    pub title: Option<String>,
    pub content: Option<String>,
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub content: Option<String>,
    pub discussion_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscussionQuery {
    pub course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplyQuery {
    pub discussion_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

const NOT_ENROLLED: &str = "You must be enrolled in this course to participate in discussions";

pub struct DiscussionService {
    pool: PgPool,
}

impl DiscussionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn lesson(&self, id: Uuid) -> DomainResult<Option<Lesson>> {
        Ok(Repository::<Lesson>::new(Lesson::TABLE, self.pool.clone()).find_by_id(id).await?)
    }

    async fn require_enrollment(&self, user_id: Uuid, course_id: Uuid) -> DomainResult<()> {
        if is_enrolled(&self.pool, user_id, course_id).await? {
            Ok(())
        } else {
            Err(DomainError::BadRequest(NOT_ENROLLED.to_string()))
        }
    }

    /// Start a thread on a course or a lesson the caller is enrolled in.
    pub async fn create(&self, user_id: Uuid, input: NewDiscussion) -> DomainResult<DiscussionView> {
        if input.course_id.is_none() && input.lesson_id.is_none() {
            return Err(DomainError::BadRequest("Either courseId or lessonId is required".to_string()));
        }
        let title = required("title", input.title.as_deref())?;
        let content = required("content", input.content.as_deref())?;

        let course_id = match input.lesson_id {
            Some(lesson_id) => {
                let lesson = self
                    .lesson(lesson_id)
                    .await?
                    .ok_or_else(|| DomainError::NotFound("Lesson not found".to_string()))?;
                if input.course_id.is_some_and(|c| c != lesson.course_id) {
                    return Err(DomainError::BadRequest("Lesson does not belong to this course".to_string()));
                }
                lesson.course_id
            }
            None => input.course_id.ok_or_else(|| DomainError::invalid("courseId", "courseId is required"))?,
        };
        self.require_enrollment(user_id, course_id).await?;

        let discussion = sqlx::query_as::<_, Discussion>(
            "INSERT INTO discussions (id, title, content, user_id, course_id, lesson_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now(), now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&title)
        .bind(&content)
        .bind(user_id)
        .bind(course_id)
        .bind(input.lesson_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Discussion {} opened on course {}", discussion.id, course_id);

        let mut views = self.views(vec![discussion]).await?;
        views.pop().ok_or_else(|| DomainError::NotFound("Discussion not found".to_string()))
    }

    /// Threads, newest first.
    pub async fn list(&self, query: DiscussionQuery) -> DomainResult<Vec<DiscussionView>> {
        let repo = Repository::<Discussion>::new(Discussion::TABLE, self.pool.clone());
        let filter = repo
            .filter()?
            .eq_opt("course_id", query.course_id)?
            .eq_opt("lesson_id", query.lesson_id)?
            .eq_opt("user_id", query.user_id)?
            .order("created_at", SortDirection::Desc)?;
        let discussions = repo.select_any(filter).await?;
        self.views(discussions).await
    }

    async fn views(&self, discussions: Vec<Discussion>) -> DomainResult<Vec<DiscussionView>> {
        let ids: Vec<Uuid> = discussions.iter().map(|d| d.id).collect();
        let mut replies = related::replies(&self.pool, &ids).await?;

        let user_ids = related::unique_ids(
            discussions
                .iter()
                .map(|d| d.user_id)
                .chain(replies.values().flatten().map(|r| r.user_id)),
        );
        let users = related::user_summaries(&self.pool, &user_ids).await?;
        let courses = related::courses(&self.pool, &related::unique_ids(discussions.iter().filter_map(|d| d.course_id))).await?;
        let lessons = related::lessons(&self.pool, &related::unique_ids(discussions.iter().filter_map(|d| d.lesson_id))).await?;

        Ok(discussions
            .into_iter()
            .map(|discussion| {
                let thread: Vec<ReplyView> = replies
                    .remove(&discussion.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|reply| ReplyView { user: users.get(&reply.user_id).cloned(), discussion: None, reply })
                    .collect();
                DiscussionView {
                    user: users.get(&discussion.user_id).cloned(),
                    course: discussion.course_id.and_then(|id| courses.get(&id)).map(CourseRef::from),
                    lesson: discussion
                        .lesson_id
                        .and_then(|id| lessons.get(&id))
                        .map(|l| LessonTitle { id: l.id, title: l.title.clone() }),
                    count: ReplyCount { replies: thread.len() as i64 },
                    replies: thread,
                    discussion,
                }
            })
            .collect())
    }

    /// Answer a thread. The caller must be enrolled in the thread's course.
    pub async fn reply(&self, user_id: Uuid, input: NewReply) -> DomainResult<ReplyView> {
        let content = required("content", input.content.as_deref())?;
        let discussion_id = input
            .discussion_id
            .ok_or_else(|| DomainError::invalid("discussionId", "discussionId is required"))?;

        let discussion = Repository::<Discussion>::new(Discussion::TABLE, self.pool.clone())
            .find_by_id(discussion_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Discussion not found".to_string()))?;

        let lesson_course = match discussion.lesson_id {
            Some(lesson_id) => self.lesson(lesson_id).await?.map(|l| l.course_id),
            None => None,
        };
        if let Some(course_id) = lesson_course.or(discussion.course_id) {
            self.require_enrollment(user_id, course_id).await?;
        }

        let reply = sqlx::query_as::<_, Reply>(
            "INSERT INTO replies (id, content, user_id, discussion_id, created_at) \
             VALUES ($1, $2, $3, $4, now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&content)
        .bind(user_id)
        .bind(discussion.id)
        .fetch_one(&self.pool)
        .await?;

        let user = related::user_summaries(&self.pool, &[user_id]).await?.remove(&user_id);
        Ok(ReplyView {
            user,
            discussion: Some(DiscussionRef { id: discussion.id, title: discussion.title }),
            reply,
        })
    }

    /// Replies, oldest first.
    pub async fn list_replies(&self, query: ReplyQuery) -> DomainResult<Vec<ReplyView>> {
        let repo = Repository::<Reply>::new(Reply::TABLE, self.pool.clone());
        let filter = repo
            .filter()?
            .eq_opt("discussion_id", query.discussion_id)?
            .eq_opt("user_id", query.user_id)?
            .order("created_at", SortDirection::Asc)?;
        let replies = repo.select_any(filter).await?;

        let users = related::user_summaries(&self.pool, &related::unique_ids(replies.iter().map(|r| r.user_id))).await?;
        let discussions =
            related::discussions(&self.pool, &related::unique_ids(replies.iter().map(|r| r.discussion_id))).await?;

        Ok(replies
            .into_iter()
            .map(|reply| ReplyView {
                user: users.get(&reply.user_id).cloned(),
                discussion: discussions
                    .get(&reply.discussion_id)
                    .map(|d| DiscussionRef { id: d.id, title: d.title.clone() }),
                reply,
            })
            .collect())
    }
}
