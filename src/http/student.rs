//! `POST /student`: relay a student to the data aggregation service.

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};

use crate::downstream::DownstreamError;
use crate::grades::{GradesResult, Student};
use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;

pub async fn submit_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(student): Json<Student>,
) -> Result<String, DownstreamError> {
    let request_id = headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok());

    let grades = state.downstream.calculate_grades(&student, request_id).await?;

    tracing::info!(
        request_id = request_id.unwrap_or("unknown"),
        name = student.name.as_deref().unwrap_or("null"),
        "Grades received"
    );

    Ok(render_summary(&student, &grades))
}

/// Reply text combining what was sent and what came back.
pub fn render_summary(student: &Student, grades: &GradesResult) -> String {
    format!(
        "Sent the Student to the Data Aggregation Service: {} \nAnd got back:\n {}",
        student, grades
    )
}
