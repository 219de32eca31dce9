use std::sync::Arc;

use service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(users: UserService) -> Self {
        Self { users: Arc::new(users) }
    }
}
