//! Response views.
//!
//! Each view flattens the stored row and attaches the related summaries the
//! clients render next to it. Field names go out in camelCase.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Category, Course, Discussion, Enrollment, Lesson, LessonProgress, Reply, Review, User};
use crate::types::{LessonType, UserRole};

/// Account fields safe to hand back to the account owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseRef {
    pub id: Uuid,
    pub title: String,
}

impl From<&Course> for CourseRef {
    fn from(course: &Course) -> Self {
        Self { id: course.id, title: course.title.clone() }
    }
}

/// Lesson fields shown in course cards
#[derive(Debug, Clone, Serialize)]
pub struct LessonOutline {
    pub id: Uuid,
    pub title: String,
    pub duration: Option<i32>,
    pub order: i32,
}

impl From<&Lesson> for LessonOutline {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            duration: lesson.duration,
            order: lesson.order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub id: Uuid,
    pub title: String,
    pub duration: Option<i32>,
    pub order: i32,
    #[serde(rename = "type")]
    pub lesson_type: LessonType,
    pub course_id: Uuid,
}

impl From<&Lesson> for LessonRef {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title.clone(),
            duration: lesson.duration,
            order: lesson.order,
            lesson_type: lesson.lesson_type,
            course_id: lesson.course_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CourseCounts {
    pub enrollments: i64,
    pub reviews: i64,
}

/// Catalog card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListItem {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<UserSummary>,
    pub category: Option<Category>,
    pub lessons: Vec<LessonOutline>,
    #[serde(rename = "_count")]
    pub count: CourseCounts,
    pub average_rating: f64,
    pub total_duration: i64,
    pub review_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<UserSummary>,
    pub category: Option<Category>,
    pub lessons: Vec<Lesson>,
    pub reviews: Vec<ReviewView>,
    #[serde(rename = "_count")]
    pub count: CourseCounts,
    pub average_rating: f64,
    pub total_duration: i64,
    pub review_count: i64,
}

/// Course as listed for administrators
#[derive(Debug, Clone, Serialize)]
pub struct AdminCourseItem {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<UserSummary>,
    pub category: Option<Category>,
    #[serde(rename = "_count")]
    pub count: CourseCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedCourse {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: Option<UserSummary>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedReview {
    #[serde(flatten)]
    pub review: ReviewView,
    /// False when an existing review was updated
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrolledCourse {
    pub id: Uuid,
    pub title: String,
    pub instructor: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: EnrolledCourse,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LessonCount {
    pub lessons: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentCourse {
    #[serde(flatten)]
    pub course: Course,
    pub category: Option<Category>,
    pub instructor: Option<UserSummary>,
    pub lessons: Vec<LessonOutline>,
    #[serde(rename = "_count")]
    pub count: LessonCount,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListItem {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: EnrollmentCourse,
    pub progress_records: Vec<LessonProgress>,
    pub progress_percentage: i32,
    pub completed_lessons: i64,
    pub total_lessons: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentCheck {
    pub enrolled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<Option<Enrollment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl EnrollmentCheck {
    pub fn anonymous() -> Self {
        Self { enrolled: false, enrollment: None, message: Some("User not authenticated") }
    }

    pub fn found(enrollment: Option<Enrollment>) -> Self {
        Self { enrolled: enrollment.is_some(), enrollment: Some(enrollment), message: None }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRef {
    pub id: Uuid,
    pub course_id: Uuid,
    pub progress: i32,
}

impl From<&Enrollment> for EnrollmentRef {
    fn from(enrollment: &Enrollment) -> Self {
        Self { id: enrollment.id, course_id: enrollment.course_id, progress: enrollment.progress }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    #[serde(flatten)]
    pub progress: LessonProgress,
    pub lesson: Option<LessonRef>,
    pub enrollment: Option<EnrollmentRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(flatten)]
    pub progress: LessonProgress,
    pub progress_percentage: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonTitle {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscussionRef {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReplyCount {
    pub replies: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscussionView {
    #[serde(flatten)]
    pub discussion: Discussion,
    pub user: Option<UserSummary>,
    pub course: Option<CourseRef>,
    pub lesson: Option<LessonTitle>,
    pub replies: Vec<ReplyView>,
    #[serde(rename = "_count")]
    pub count: ReplyCount,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    #[serde(flatten)]
    pub reply: Reply,
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion: Option<DiscussionRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_reviews: i64,
    pub recent_users: i64,
    pub recent_courses: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    User,
    Course,
    Enrollment,
    Review,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::User => "user",
            ActivityKind::Course => "course",
            ActivityKind::Enrollment => "enrollment",
            ActivityKind::Review => "review",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityItem {
    pub fn new(kind: ActivityKind, id: Uuid, title: String, description: String, created_at: DateTime<Utc>) -> Self {
        Self { id: format!("{}-{}", kind.as_str(), id), kind, title, description, created_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnrollmentStatus;

    fn enrollment() -> Enrollment {
        Enrollment {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            course_id: Uuid::nil(),
            status: EnrollmentStatus::Active,
            progress: 40,
            enrolled_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn enrollment_check_shapes() {
        let anon = serde_json::to_value(EnrollmentCheck::anonymous()).unwrap();
        assert_eq!(anon["enrolled"], false);
        assert_eq!(anon["message"], "User not authenticated");
        assert!(anon.get("enrollment").is_none());

        let missing = serde_json::to_value(EnrollmentCheck::found(None)).unwrap();
        assert_eq!(missing["enrolled"], false);
        assert!(missing["enrollment"].is_null());
        assert!(missing.get("message").is_none());

        let present = serde_json::to_value(EnrollmentCheck::found(Some(enrollment()))).unwrap();
        assert_eq!(present["enrolled"], true);
        assert_eq!(present["enrollment"]["progress"], 40);
        assert_eq!(present["enrollment"]["status"], "ACTIVE");
    }

    #[test]
    fn views_flatten_rows_in_camel_case() {
        let view = EnrollmentView {
            enrollment: enrollment(),
            course: EnrolledCourse { id: Uuid::nil(), title: "Rust".into(), instructor: None },
        };
        let json = serde_json::to_value(view).unwrap();
        assert!(json.get("courseId").is_some());
        assert!(json.get("enrolledAt").is_some());
        assert_eq!(json["course"]["title"], "Rust");
    }

    #[test]
    fn activity_ids_are_prefixed() {
        let id = Uuid::new_v4();
        let item = ActivityItem::new(ActivityKind::Review, id, "New review".into(), "5 stars".into(), Utc::now());
        let json = serde_json::to_value(item).unwrap();
        assert_eq!(json["id"], format!("review-{}", id));
        assert_eq!(json["type"], "review");
        assert!(json.get("createdAt").is_some());
    }
}
