use opencourse_application::{CourseService, UserService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub course_service: CourseService,
    pub user_service: UserService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
