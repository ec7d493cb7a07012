use crate::core::AppConfig;
use crate::forwarder::Forwarder;

pub struct AppState {
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self { forwarder }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let forwarder = Forwarder::new(config)?;
        Ok(Self::new(forwarder))
    }
}
