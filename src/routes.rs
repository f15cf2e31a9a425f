use crate::{
    routes::students::{delete_student, get_student, get_students, post_new_student, put_student},
    state::RosterState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};

pub mod students;

pub const BODY_LIMIT: usize = 64 * 1024;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(get_students).post(post_new_student))
        .route(
            "/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
