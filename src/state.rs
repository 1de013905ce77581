use crate::services::CommentService;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub comments: CommentService,
}

impl FromRef<AppState> for CommentService {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}
