mod ingress;
mod port;
mod service;
mod url_template;

use std::num::ParseIntError;

pub use ingress::{create_ingress, ingress_path, IngressDescriptor, REWRITE_TARGET, REWRITE_TARGET_ANNOTATION};
use kube::ResourceExt;
pub use port::{resolve_service_port, resolve_service_port_name, resolve_target_port, DEFAULT_SPARK_WEB_UI_PORT, DEFAULT_SPARK_WEB_UI_PORT_NAME, SPARK_UI_PORT_CONFIGURATION_KEY};
pub use service::{create_service, PortKind, ServiceDescriptor};
use tracing::{info, span, Instrument, Level};
use typed_builder::TypedBuilder;
pub use url_template::{build_exposure_url, ExposureUrl};

use crate::{
    client::UiResourceClient,
    common::{DriverInfo, ResourceKey, SparkApplication},
};

#[derive(thiserror::Error, Debug)]
pub enum UiError {
    #[error("invalid value '{value}' for {key}")]
    InvalidConfigValue {
        key: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid Spark UI {kind}: '{value}'")]
    InvalidPortConfig {
        kind: PortKind,
        value: String,
        #[source]
        source: Option<Box<UiError>>,
    },
    #[error("invalid Spark UI ingress URL '{url}'")]
    InvalidUrlTemplate {
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },
    #[error("failed to create service {key}")]
    ServiceCreateFailed {
        key: ResourceKey,
        #[source]
        source: kube::Error,
    },
    #[error("failed to create ingress {key}")]
    IngressCreateFailed {
        key: ResourceKey,
        #[source]
        source: kube::Error,
    },
}

/// What was created to expose one application's UI.
#[derive(Clone, Debug, PartialEq)]
pub struct UiExposure {
    pub service: ServiceDescriptor,
    pub ingress: Option<IngressDescriptor>,
}

impl UiExposure {
    pub fn web_ui_address(&self) -> Option<String> {
        self.service.cluster_ip.as_ref().map(|ip| format!("{ip}:{}", self.service.port))
    }

    pub fn record(&self, driver_info: &mut DriverInfo) {
        driver_info.web_ui_service_name = Some(self.service.name.clone());
        driver_info.web_ui_port = Some(self.service.port);
        driver_info.web_ui_address = self.web_ui_address();
        if let Some(ingress) = &self.ingress {
            driver_info.web_ui_ingress_name = Some(ingress.name.clone());
            driver_info.web_ui_ingress_address = Some(ingress.url.to_string());
        }
    }
}

/// Runs the exposure steps for one application in order: service, then, when an ingress URL
/// format is configured, URL templating and the ingress. Nothing is rolled back when a later
/// step fails.
#[derive(TypedBuilder)]
pub struct UiExposer<'a, C: UiResourceClient> {
    client: &'a C,
    #[builder(default)]
    ingress_url_format: Option<String>,
    #[builder(default)]
    ingress_class_name: Option<String>,
}

impl<C: UiResourceClient> UiExposer<'_, C> {
    pub async fn expose(&self, app: &SparkApplication) -> Result<UiExposure, UiError> {
        let span = span!(Level::INFO, "UiExposer", id = %ResourceKey::from(app));
        async move {
            let service = create_service(app, self.client).await?;
            let ingress = match &self.ingress_url_format {
                Some(format) => {
                    let url = build_exposure_url(format, &app.name_any(), &app.namespace().unwrap_or_default())?;
                    Some(create_ingress(app, &service, &url, self.ingress_class_name.as_deref(), self.client).await?)
                },
                None => None,
            };
            info!("Spark UI exposed via service {} ingress {:?}", service.name, ingress.as_ref().map(|i| i.url.to_string()));
            Ok(UiExposure { service, ingress })
        }
        .instrument(span)
        .await
    }
}
