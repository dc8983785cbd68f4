use std::sync::Arc;

use tracing::info;

use super::{
    config::Config,
    database::{RecordStore, RedisStore},
    error::StartupError,
    mail::{Mailer, SmtpMailer},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Connects the production clients. A store that cannot be reached is fatal.
    pub async fn new(config: Config) -> Result<Arc<Self>, StartupError> {
        info!("Connecting to record store...");
        let store = RedisStore::connect(&config.database_url).await?;

        let mailer = SmtpMailer::new(&config)?;
        info!("Mailer ready, notifying {}", config.admin_email);

        Ok(Self::with_clients(config, Arc::new(store), Arc::new(mailer)))
    }

    pub fn with_clients(
        config: Config,
        store: Arc<dyn RecordStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            mailer,
        })
    }
}
