pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LabCalResult;
use crate::event::MeasurementEvent;
use crate::remote::protocol::{CreateEvent, DeleteEvent};
use crate::remote::provider::Provider;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A calendar that measurement events can be pushed to.
#[allow(async_fn_in_trait)]
pub trait RemoteCalendar {
    /// Create `event` and return the id the remote stored it under.
    async fn create_event(&self, event: &MeasurementEvent) -> LabCalResult<String>;

    async fn delete_event(&self, event_id: &str) -> LabCalResult<()>;
}

/// Remote provider configuration (e.g., Google Calendar settings)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }
}

impl RemoteCalendar for Remote {
    async fn create_event(&self, event: &MeasurementEvent) -> LabCalResult<String> {
        let created = self
            .provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                event: event.clone(),
            })
            .await?;
        Ok(created.id)
    }

    async fn delete_event(&self, event_id: &str) -> LabCalResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: event_id.to_string(),
            })
            .await
    }
}
