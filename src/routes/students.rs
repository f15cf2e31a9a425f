use crate::{
    data::{
        Envelope,
        student::{NewStudent, Student, UpdateStudent},
    },
    error::{MissingInsertedStudentSnafu, RosterResult},
    extract::ValidJson,
    state::RosterState,
    store::Filter,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use snafu::OptionExt;

/// Most students a single listing will return.
pub const LIST_LIMIT: usize = 1000;

pub type EnvelopeResponse = (StatusCode, Json<Envelope>);

fn not_found(id: &str) -> EnvelopeResponse {
    info!(%id, "Student not found");
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure(format!("Student with id {id} not found"))),
    )
}

pub async fn post_new_student(
    State(state): State<RosterState>,
    ValidJson(new_student): ValidJson<NewStudent>,
) -> RosterResult<EnvelopeResponse> {
    let student = new_student.into_student();
    let key = state.insert_one(&student).await?;

    let created = state
        .find_one(Filter::InternalKey(key))
        .await?
        .context(MissingInsertedStudentSnafu { key })?;
    info!(id = %created.id, "Added new student");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(
            "New student added successfully",
            vec![created],
        )),
    ))
}

pub async fn get_students(State(state): State<RosterState>) -> RosterResult<EnvelopeResponse> {
    let students = state.find_many(LIST_LIMIT).await?;
    debug!(count = students.len(), "Listed students");

    Ok((
        StatusCode::OK,
        Json(Envelope::success("Students retrieved successfully", students)),
    ))
}

pub async fn get_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<EnvelopeResponse> {
    let Some(student) = state.find_one(Filter::Id(&id)).await? else {
        return Ok(not_found(&id));
    };

    Ok((
        StatusCode::OK,
        Json(Envelope::success(
            format!("Student with ID {id} retrieved successfully"),
            vec![student],
        )),
    ))
}

pub async fn put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    ValidJson(changes): ValidJson<UpdateStudent>,
) -> RosterResult<EnvelopeResponse> {
    let updated = |student: Student| {
        (
            StatusCode::OK,
            Json(Envelope::success(
                format!("Student with id {id} updated successfully"),
                vec![student],
            )),
        )
    };

    if !changes.is_empty() && state.update_one(&id, &changes).await? == 1 {
        if let Some(student) = state.find_one(Filter::Id(&id)).await? {
            info!(%id, fields = ?changes.field_names(), "Updated student");
            return Ok(updated(student));
        }
    }

    //nothing to apply, nothing changed, or nothing matched - hand back whatever is stored
    match state.find_one(Filter::Id(&id)).await? {
        Some(student) => Ok(updated(student)),
        None => Ok(not_found(&id)),
    }
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<EnvelopeResponse> {
    if state.delete_one(&id).await? != 1 {
        return Ok(not_found(&id));
    }

    info!(%id, "Deleted student");
    Ok((
        StatusCode::OK,
        Json(Envelope::success(
            format!("Student with id {id} deleted successfully"),
            vec![],
        )),
    ))
}
