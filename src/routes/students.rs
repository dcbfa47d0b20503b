use crate::{
    data::student::{Payload, Student},
    error::{BadStudentIdSnafu, RosterError, RosterResult},
    state::RosterState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

/// The `{id}` path segment. Anything that isn't a non-negative integer is turned away here,
/// before the store is touched.
#[derive(Debug, Clone, Copy)]
pub struct StudentId(pub u32);

impl<S: Send + Sync> FromRequestParts<S> for StudentId {
    type Rejection = RosterError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<u32>::from_request_parts(parts, state)
            .await
            .context(BadStudentIdSnafu)?;
        Ok(Self(id))
    }
}

#[derive(Deserialize)]
pub struct LastNameQuery {
    last_name: Option<String>,
}

#[derive(Serialize)]
pub struct DeletedMessage {
    message: String,
}

pub async fn get_students(
    State(state): State<RosterState>,
    Query(LastNameQuery { last_name }): Query<LastNameQuery>,
) -> RosterResult<Json<Vec<Student>>> {
    //`?last_name=` with nothing after it lists everyone
    let students = match last_name.as_deref().filter(|name| !name.is_empty()) {
        Some(last_name) => state.list_by_last_name(last_name).await?,
        None => state.list_all().await?,
    };
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
) -> RosterResult<Json<Student>> {
    Ok(Json(state.get_by_id(id).await?))
}

pub async fn post_student(
    State(state): State<RosterState>,
    body: Bytes,
) -> RosterResult<(StatusCode, Json<Student>)> {
    let payload = Payload::from_body(&body)?;
    let student = state.insert(&payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn put_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
    body: Bytes,
) -> RosterResult<Json<Student>> {
    let payload = Payload::from_body(&body)?;
    Ok(Json(state.replace_by_id(id, &payload).await?))
}

pub async fn patch_student_age(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
    body: Bytes,
) -> RosterResult<Json<Student>> {
    let payload = Payload::from_body(&body)?;
    Ok(Json(state.update_age(id, &payload).await?))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    StudentId(id): StudentId,
) -> RosterResult<Json<DeletedMessage>> {
    let id = state.delete_by_id(id).await?;
    Ok(Json(DeletedMessage {
        message: format!("Student ID {id} deleted successfully"),
    }))
}
