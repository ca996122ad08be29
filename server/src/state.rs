use std::sync::{Arc, RwLock};

use catalog::Template;
use engagement::Overlay;
use reqwest::Client;
use tracing::{info, warn};

use super::{
    config::Config,
    database::{init_redis, RedisStore},
};

pub struct State {
    pub config: Config,
    pub http: Client,
    pub templates: RwLock<Vec<Template>>,
    pub overlay: Overlay<RedisStore>,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let http = Client::new();
        let templates = load_templates(&http).await;

        let overlay = Overlay::new(init_redis(&config.redis_url));

        Arc::new(Self {
            config,
            http,
            templates: RwLock::new(templates),
            overlay,
        })
    }
}

/// Cache-first catalog load: the cache file wins when present, the remote
/// fetch fills and rewrites it otherwise. Both failing means an empty
/// catalog, never a failed boot.
async fn load_templates(http: &Client) -> Vec<Template> {
    match catalog::read_cache() {
        Ok(templates) if !templates.is_empty() => {
            info!("Loaded {} templates from cache", templates.len());
            templates
        }
        _ => {
            let templates = catalog::fetch_templates_or_empty(http).await;
            info!("Fetched {} templates from remote", templates.len());

            if !templates.is_empty() {
                if let Err(e) = catalog::write_cache(&templates) {
                    warn!("Failed to write catalog cache: {e}");
                }
            }

            templates
        }
    }
}
