use std::sync::Arc;

use crate::{
    db::{DbPool, OrmConn, orm_from_pool},
    services::credential_service::CredentialService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(pool: DbPool, credentials: CredentialService) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            credentials: Arc::new(credentials),
        }
    }
}
