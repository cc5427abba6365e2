use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::inventory::repo::{PgProductStore, ProductStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = crate::db::connect(&config).await?;
        let jwt = JwtKeys::from_config(&config.jwt);

        let timeout = config.store_timeout();
        let users = Arc::new(PgUserStore::new(db.clone(), timeout)) as Arc<dyn UserStore>;
        let products =
            Arc::new(PgProductStore::new(db.clone(), timeout)) as Arc<dyn ProductStore>;

        Ok(Self {
            db,
            config,
            jwt,
            users,
            products,
        })
    }
}
