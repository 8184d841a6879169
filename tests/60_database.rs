//! Flows that need Postgres. Each test builds its own schema from
//! `fixtures/schema.sql` and skips when `DATABASE_URL` is unset.
mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use maaeen::types::UserRole;
use serde_json::{json, Value};
use uuid::Uuid;

async fn record(db: &common::TestDb, token: &str, enrollment: Uuid, lesson: Uuid, extra: Value) -> (StatusCode, Value) {
    let mut body = json!({"lessonId": lesson, "enrollmentId": enrollment});
    for (key, value) in extra.as_object().into_iter().flatten() {
        body[key] = value.clone();
    }
    db.post("/api/progress", token, body).await
}

fn id_of(body: &Value) -> Uuid {
    body["data"]["id"].as_str().and_then(|s| s.parse().ok()).expect("id in response")
}

#[tokio::test]
async fn register_login_and_whoami() {
    let Some(db) = common::database().await else { return };
    let ada = json!({"name": "Ada", "email": " Ada@Example.com ", "password": "analytical"});
    let (status, body) = db.post_as("/auth/register", None, ada).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["role"], "STUDENT");
    assert!(body["data"].get("passwordHash").is_none());

    let again = json!({"name": "Ada", "email": "ada@example.com", "password": "analytical"});
    let (status, body) = db.post_as("/auth/register", None, again).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let wrong = json!({"email": "ada@example.com", "password": "wrong-password"});
    let (status, body) = db.post_as("/auth/login", None, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let right = json!({"email": "ADA@example.com", "password": "analytical"});
    let (status, body) = db.post_as("/auth/login", None, right).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["expiresIn"].as_i64().unwrap() > 0);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = db.get("/api/auth/whoami", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada");

    db.teardown().await;
}

#[tokio::test]
async fn catalog_filters_published_courses() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;
    let systems = db.category("Systems Programming").await;
    let web = db.category("Web Design").await;
    let rust = db.course(instructor, Some(systems), "PUBLISHED", "BEGINNER", "Rust Ownership").await;
    let css = db.course(instructor, Some(web), "PUBLISHED", "INTERMEDIATE", "CSS Grid").await;
    db.course(instructor, Some(systems), "DRAFT", "ADVANCED", "Rust Async").await;
    db.lesson(rust, 2, true).await;
    db.lesson(rust, 1, true).await;
    db.lesson(rust, 3, false).await;

    let (status, body) = db.get("/api/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 2);

    let (_, body) = db.get("/api/courses?category=systems", None).await;
    let courses = body["data"]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["id"], rust.to_string());
    let orders: Vec<i64> = courses[0]["lessons"].as_array().unwrap().iter().map(|l| l["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(courses[0]["totalDuration"], 20);

    let (_, body) = db.get("/api/courses?search=GRID", None).await;
    assert_eq!(body["data"]["courses"][0]["id"], css.to_string());
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let (_, body) = db.get("/api/courses?level=intermediate", None).await;
    assert_eq!(body["data"]["courses"][0]["id"], css.to_string());

    let (_, body) = db.get("/api/courses?category=cooking", None).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    let (_, body) = db.get("/api/courses?limit=1&page=2", None).await;
    assert_eq!(body["data"]["pagination"]["pages"], 2);
    assert_eq!(body["data"]["courses"].as_array().unwrap().len(), 1);

    db.teardown().await;
}

#[tokio::test]
async fn enrollment_rules() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;
    let student = db.user(UserRole::Student).await;
    let published = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    let draft = db.course(instructor, None, "DRAFT", "BEGINNER", "Go").await;
    let token = common::token_for(student, UserRole::Student);

    let (status, _) = db.post("/api/enrollments", &token, json!({"courseId": Uuid::new_v4()})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = db.post("/api/enrollments", &token, json!({"courseId": draft})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Racing requests: one wins, the other hits the unique (user, course) pair.
    let body = json!({"courseId": published});
    let (first, second) = tokio::join!(
        db.post("/api/enrollments", &token, body.clone()),
        db.post("/api/enrollments", &token, body.clone()),
    );
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    let loser = if first.0 == StatusCode::BAD_REQUEST { first.1 } else { second.1 };
    assert_eq!(loser["error"], "Already enrolled in this course");
    assert_eq!(db.count("SELECT COUNT(*) FROM enrollments WHERE course_id = $1", published).await, 1);

    let (status, body) = db.get(&format!("/api/enrollments/check?courseId={published}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enrolled"], true);

    db.teardown().await;
}

#[tokio::test]
async fn progress_rolls_up_into_enrollment() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;
    let student = db.user(UserRole::Student).await;
    let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    let first = db.lesson(course, 1, true).await;
    let second = db.lesson(course, 2, true).await;
    db.lesson(course, 3, false).await;
    let token = common::token_for(student, UserRole::Student);

    let (status, body) = db.post("/api/enrollments", &token, json!({"courseId": course})).await;
    assert_eq!(status, StatusCode::CREATED);
    let enrollment = id_of(&body);

    let (status, body) = record(&db, &token, enrollment, first, json!({"completed": true, "watchTime": 300})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["progressPercentage"], 50);
    assert_eq!(db.enrollment_state(enrollment).await, ("ACTIVE".to_string(), 50, false));

    let (_, body) = record(&db, &token, enrollment, second, json!({"completed": true})).await;
    assert_eq!(body["data"]["progressPercentage"], 100);
    assert_eq!(db.enrollment_state(enrollment).await, ("COMPLETED".to_string(), 100, true));

    // Omitted flags keep what was stored.
    let (_, body) = record(&db, &token, enrollment, second, json!({"watchTime": 42})).await;
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["watchTime"], 42);
    assert_eq!(body["data"]["progressPercentage"], 100);

    let (_, body) = record(&db, &token, enrollment, second, json!({"completed": false})).await;
    assert_eq!(body["data"]["progressPercentage"], 50);
    assert!(body["data"]["completedAt"].is_null());
    assert_eq!(db.enrollment_state(enrollment).await, ("ACTIVE".to_string(), 50, false));

    let other_course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Go").await;
    let foreign_lesson = db.lesson(other_course, 1, true).await;
    let (status, _) = record(&db, &token, enrollment, foreign_lesson, json!({"completed": true})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stranger = common::token(UserRole::Student);
    let (status, _) = db
        .post("/api/progress", &stranger, json!({"lessonId": first, "enrollmentId": enrollment}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = db.get("/api/progress", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<i64> = body["data"].as_array().unwrap().iter().map(|p| p["lesson"]["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 2]);

    db.teardown().await;
}

#[tokio::test]
async fn cancel_is_not_undone_by_concurrent_progress() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;

    for _ in 0..25 {
        let student = db.user(UserRole::Student).await;
        let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
        let lesson = db.lesson(course, 1, true).await;
        db.lesson(course, 2, true).await;
        let enrollment = db.enrollment(student, course, "ACTIVE").await;
        let token = common::token_for(student, UserRole::Student);

        let cancel_uri = format!("/api/enrollments/{enrollment}");
        let (progress, cancel) = tokio::join!(
            record(&db, &token, enrollment, lesson, json!({"completed": true})),
            db.delete(&cancel_uri, &token),
        );

        assert_eq!(cancel.0, StatusCode::OK, "{}", cancel.1);
        assert!(
            progress.0 == StatusCode::OK || progress.0 == StatusCode::BAD_REQUEST,
            "unexpected progress status {}",
            progress.0
        );
        assert_eq!(db.enrollment_state(enrollment).await.0, "CANCELLED");
    }

    db.teardown().await;
}

#[tokio::test]
async fn cancelled_enrollment_rejects_progress_and_second_cancel() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;
    let student = db.user(UserRole::Student).await;
    let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    let lesson = db.lesson(course, 1, true).await;
    let enrollment = db.enrollment(student, course, "ACTIVE").await;
    let token = common::token_for(student, UserRole::Student);

    let (status, body) = db.delete(&format!("/api/enrollments/{enrollment}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CANCELLED");

    let (status, _) = db.delete(&format!("/api/enrollments/{enrollment}"), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = db
        .post("/api/progress", &token, json!({"lessonId": lesson, "enrollmentId": enrollment, "completed": true}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Enrollment is cancelled");

    let stranger = common::token(UserRole::Student);
    let (status, _) = db.delete(&format!("/api/enrollments/{enrollment}"), &stranger).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.teardown().await;
}

#[tokio::test]
async fn review_upsert_reports_created_once() {
    let Some(db) = common::database().await else { return };
    let instructor = db.user(UserRole::Instructor).await;
    let student = db.user(UserRole::Student).await;
    let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    let token = common::token_for(student, UserRole::Student);

    let (status, _) = db.post("/api/reviews", &token, json!({"courseId": course, "rating": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "not enrolled yet");

    db.enrollment(student, course, "ACTIVE").await;
    let (status, body) = db.post("/api/reviews", &token, json!({"courseId": course, "rating": 4, "comment": "Solid"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["created"], true);

    let (status, body) = db.post("/api/reviews", &token, json!({"courseId": course, "rating": 2})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], false);
    assert_eq!(body["data"]["rating"], 2);
    assert_eq!(db.count("SELECT COUNT(*) FROM reviews WHERE course_id = $1", course).await, 1);

    let racer = db.user(UserRole::Student).await;
    db.enrollment(racer, course, "ACTIVE").await;
    let racer_token = common::token_for(racer, UserRole::Student);
    let (a, b) = tokio::join!(
        db.post("/api/reviews", &racer_token, json!({"courseId": course, "rating": 3})),
        db.post("/api/reviews", &racer_token, json!({"courseId": course, "rating": 5})),
    );
    let created = [&a.1, &b.1].iter().filter(|r| r["data"]["created"] == true).count();
    assert_eq!(created, 1);
    assert_eq!(db.count("SELECT COUNT(*) FROM reviews WHERE course_id = $1", course).await, 2);

    let (_, body) = db.get(&format!("/api/courses/{course}"), None).await;
    assert_eq!(body["data"]["reviewCount"], 2);

    db.teardown().await;
}

#[tokio::test]
async fn admin_delete_cascades() {
    let Some(db) = common::database().await else { return };
    let admin = common::token(UserRole::Admin);
    let instructor = db.user(UserRole::Instructor).await;
    let student = db.user(UserRole::Student).await;
    let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    let keep = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Go").await;
    let lesson = db.lesson(course, 1, true).await;
    db.lesson(keep, 1, true).await;
    let token = common::token_for(student, UserRole::Student);

    let (_, body) = db.post("/api/enrollments", &token, json!({"courseId": course})).await;
    let enrollment = id_of(&body);
    db.post("/api/progress", &token, json!({"lessonId": lesson, "enrollmentId": enrollment, "completed": true})).await;
    db.post("/api/reviews", &token, json!({"courseId": course, "rating": 5})).await;
    let (status, body) =
        db.post("/api/discussions", &token, json!({"title": "Borrowing", "content": "Why?", "lessonId": lesson})).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let discussion = id_of(&body);
    let (status, _) = db.post("/api/replies", &token, json!({"content": "Because", "discussionId": discussion})).await;
    assert_eq!(status, StatusCode::CREATED);
    db.enrollment(student, keep, "ACTIVE").await;

    let (status, body) = db.delete(&format!("/api/admin/courses/{course}"), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    for sql in [
        "SELECT COUNT(*) FROM courses WHERE id = $1",
        "SELECT COUNT(*) FROM lessons WHERE course_id = $1",
        "SELECT COUNT(*) FROM enrollments WHERE course_id = $1",
        "SELECT COUNT(*) FROM reviews WHERE course_id = $1",
        "SELECT COUNT(*) FROM discussions WHERE course_id = $1",
    ] {
        assert_eq!(db.count(sql, course).await, 0, "{sql}");
    }
    assert_eq!(db.count("SELECT COUNT(*) FROM replies WHERE discussion_id = $1", discussion).await, 0);
    assert_eq!(db.count("SELECT COUNT(*) FROM progress WHERE lesson_id = $1", lesson).await, 0);
    assert_eq!(db.count("SELECT COUNT(*) FROM enrollments WHERE course_id = $1", keep).await, 1);

    let (status, _) = db.delete(&format!("/api/admin/courses/{course}"), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.teardown().await;
}

#[tokio::test]
async fn admin_stats_and_activity() {
    let Some(db) = common::database().await else { return };
    let admin = common::token(UserRole::Admin);
    db.user_aged(UserRole::Student, 60).await;
    let instructor = db.user(UserRole::Instructor).await;
    let active = db.user(UserRole::Student).await;
    let cancelled = db.user(UserRole::Student).await;
    let course = db.course(instructor, None, "PUBLISHED", "BEGINNER", "Rust").await;
    db.enrollment(active, course, "ACTIVE").await;
    db.enrollment(cancelled, course, "CANCELLED").await;
    db.review(active, course, 4).await;

    let (status, body) = db.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "totalUsers": 4,
            "totalCourses": 1,
            "totalEnrollments": 1,
            "totalReviews": 1,
            "recentUsers": 3,
            "recentCourses": 1
        })
    );

    let (status, body) = db.get("/api/admin/activity", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 8);
    assert!(feed.iter().all(|item| {
        let kind = item["type"].as_str().unwrap();
        item["id"].as_str().unwrap().starts_with(&format!("{kind}-"))
    }));
    let times: Vec<DateTime<Utc>> =
        feed.iter().map(|item| serde_json::from_value(item["createdAt"].clone()).unwrap()).collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));

    let (status, body) = db.get("/api/admin/courses?sort=title%20sideways", Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["sort"].is_string());
    let (status, body) = db.get("/api/admin/courses?sort=title%20desc", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["_count"]["enrollments"], 2);

    db.teardown().await;
}
