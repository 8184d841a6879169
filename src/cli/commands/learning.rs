use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::utils::{field, output_success, output_value};
use crate::cli::OutputFormat;

pub async fn enroll(client: &ApiClient, course_id: Uuid, output_format: OutputFormat) -> anyhow::Result<()> {
    let enrollment = client.post("/api/enrollments", &json!({ "courseId": course_id })).await?;
    let message = format!("Enrolled in {} ({})", field(&enrollment["course"], "title"), field(&enrollment, "id"));
    output_success(&output_format, &message, Some(enrollment))
}

pub async fn progress(
    client: &ApiClient,
    lesson: Uuid,
    enrollment: Uuid,
    completed: bool,
    watch_time: Option<i64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut body = json!({ "lessonId": lesson, "enrollmentId": enrollment, "completed": completed });
    if let Some(seconds) = watch_time {
        body["watchTime"] = json!(seconds);
    }
    let update = client.post("/api/progress", &body).await?;
    output_value(&output_format, &update, |u| format!("Course progress: {}%", u["progressPercentage"]))
}
