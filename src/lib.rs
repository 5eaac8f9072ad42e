use kube::{Api, Client};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use typed_builder::TypedBuilder;

pub mod client;
pub mod common;
pub mod ui;

pub use client::{KubeUiResourceClient, UiResourceClient};
pub use common::{ResourceKey, SparkApplication};
pub use ui::{UiError, UiExposer, UiExposure};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

fn default_ui_service() -> bool {
    true
}

#[derive(Debug, TypedBuilder, Deserialize)]
pub struct Configuration {
    pub controller_name: String,
    #[builder(default = true)]
    #[serde(default = "default_ui_service")]
    pub ui_service: bool,
    #[builder(default)]
    #[serde(default)]
    pub ingress_url_format: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub ingress_class_name: Option<String>,
}

#[derive(Error, Debug)]
enum ConfigurationError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("ingress url format requires the UI service to be enabled")]
    IngressWithoutService,
    #[error("ingress url format must be not empty")]
    IngressUrlFormat,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(ConfigurationError::ControllerName.into());
        }
        match (&self.ingress_url_format, self.ui_service) {
            (Some(format), _) if format.trim().is_empty() => Err(ConfigurationError::IngressUrlFormat.into()),
            (Some(_), false) => Err(ConfigurationError::IngressWithoutService.into()),
            _ => Ok(()),
        }
    }
}

/// Fetches one application and exposes its driver UI. Returns `None` when the UI service is disabled.
pub async fn expose(configuration: &Configuration, key: &ResourceKey) -> Result<Option<UiExposure>> {
    if !configuration.ui_service {
        info!("Spark UI service disabled, nothing to expose for {key}");
        return Ok(None);
    }
    let client = Client::try_default().await?;
    let app = Api::<SparkApplication>::namespaced(client.clone(), &key.namespace).get(&key.name).await?;
    let resource_client = KubeUiResourceClient::new(client, &configuration.controller_name);

    let exposure = UiExposer::builder()
        .client(&resource_client)
        .ingress_url_format(configuration.ingress_url_format.clone())
        .ingress_class_name(configuration.ingress_class_name.clone())
        .build()
        .expose(&app)
        .await?;
    Ok(Some(exposure))
}
