use std::sync::Arc;

use sqlx::PgPool;

use crate::users::{PgUserRepository, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(db: PgPool) -> Self {
        Self::from_parts(Arc::new(PgUserRepository::new(db)))
    }

    pub fn from_parts(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}
