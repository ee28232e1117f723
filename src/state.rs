use std::sync::Arc;

use crate::{
    config::{Config, SYNC_DELAY},
    fetch::GovDataClient,
    store::{DocumentStore, RecordStore},
    sync::{FixedDelay, Syncer},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub syncer: Syncer,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let fetcher = Arc::new(GovDataClient::new(config.gov_api_key.clone()));
        let store: Arc<dyn RecordStore> = Arc::new(DocumentStore::new(&config));
        let throttle = Arc::new(FixedDelay(SYNC_DELAY));

        let syncer = Syncer::new(fetcher, store.clone(), throttle, config.write_mode);

        Arc::new(Self {
            config,
            store,
            syncer,
        })
    }
}
