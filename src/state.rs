use crate::{config::AuthConfig, db::OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub auth: AuthConfig,
}
