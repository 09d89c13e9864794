use crate::{
    data::student::{Student, StudentPayload},
    error::{BadPathSnafu, BadPayloadSnafu, RosterResult},
    routes::sse::SseEvent,
    state::RosterState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use snafu::ResultExt;

pub const STUDENTS_PATH: &str = "/students";

fn student_payload(
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> RosterResult<StudentPayload> {
    let Json(payload) = payload.context(BadPayloadSnafu)?;
    payload.ensure_required_fields()?;
    Ok(payload)
}

pub async fn post_student(
    State(state): State<RosterState>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> RosterResult<(StatusCode, Json<Student>)> {
    let student = state.save(student_payload(payload)?).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_students(
    State(state): State<RosterState>,
) -> RosterResult<Json<Vec<StudentPayload>>> {
    Ok(Json(state.list_all().await?))
}

pub async fn get_student(
    State(state): State<RosterState>,
    id: Result<Path<i32>, PathRejection>,
) -> RosterResult<Json<StudentPayload>> {
    let Path(id) = id.context(BadPathSnafu)?;
    Ok(Json(state.get_by_id(id).await?))
}

pub async fn put_student(
    State(state): State<RosterState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StudentPayload>, JsonRejection>,
) -> RosterResult<Json<Student>> {
    let Path(id) = id.context(BadPathSnafu)?;
    let student = state.update(id, student_payload(payload)?).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    id: Result<Path<i32>, PathRejection>,
) -> RosterResult<String> {
    let Path(id) = id.context(BadPathSnafu)?;
    state.delete_by_id(id).await?;
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(format!("Student {id} deleted"))
}
