use crate::{
    routes::students::{
        delete_student, get_student, get_students, patch_student_age, post_student, put_student,
    },
    state::RosterState,
};
use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub mod students;

pub fn app(state: RosterState, body_limit: usize) -> Router {
    Router::new()
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student)
                .put(put_student)
                .patch(patch_student_age)
                .delete(delete_student),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
