use crate::config::AppConfig;
use crate::cors::OriginPolicy;
use crate::ice::IceServerCache;
use std::sync::Arc;

pub struct AppState {
    pub config: AppConfig,
    pub ice_servers: Arc<IceServerCache>,
    pub origin_policy: Arc<OriginPolicy>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        ice_servers: Arc<IceServerCache>,
        origin_policy: Arc<OriginPolicy>,
    ) -> Self {
        Self {
            config,
            ice_servers,
            origin_policy,
        }
    }
}
