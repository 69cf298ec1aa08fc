use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::mpesa_service::MpesaService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub mpesa_service: Arc<MpesaService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let mpesa_service = Arc::new(MpesaService::new(Arc::clone(&config))?);

        Ok(AppState {
            config,
            mpesa_service,
        })
    }
}
