use std::{collections::BTreeMap, fmt::Display, ops::RangeInclusive};

use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::util::intstr::IntOrString,
};
use kube::ResourceExt;
use kube_core::ObjectMeta;
use tracing::{debug, info};

use super::{
    port::{resolve_service_port, resolve_service_port_name, resolve_target_port},
    UiError,
};
use crate::{
    client::UiResourceClient,
    common::{driver_selector, owner_references, resource_labels, ui_service_annotations, ui_service_labels, ui_service_name, ui_service_type, ResourceKey, SparkApplication},
};

const VALID_PORTS: RangeInclusive<i32> = 1..=65535;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortKind {
    ServicePort,
    TargetPort,
}

impl Display for PortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortKind::ServicePort => write!(f, "servicePort"),
            PortKind::TargetPort => write!(f, "targetPort"),
        }
    }
}

/// The driver UI service as the API server created it.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub service_type: String,
    pub port: i32,
    pub port_name: String,
    pub target_port: IntOrString,
    pub cluster_ip: Option<String>,
    pub annotations: BTreeMap<String, String>,
}

fn validated_port(kind: PortKind, resolved: Result<i32, UiError>) -> Result<i32, UiError> {
    match resolved {
        Ok(port) if VALID_PORTS.contains(&port) => Ok(port),
        Ok(port) => Err(UiError::InvalidPortConfig {
            kind,
            value: port.to_string(),
            source: None,
        }),
        Err(e) => {
            let value = match &e {
                UiError::InvalidConfigValue { value, .. } => value.clone(),
                _ => String::new(),
            };
            Err(UiError::InvalidPortConfig {
                kind,
                value,
                source: Some(Box::new(e)),
            })
        },
    }
}

pub(crate) fn build_service(app: &SparkApplication, port_name: String, port: i32, target_port: i32) -> Service {
    let mut labels = resource_labels(app);
    labels.extend(ui_service_labels(app));
    let annotations = ui_service_annotations(app);

    Service {
        metadata: ObjectMeta {
            name: Some(ui_service_name(app)),
            namespace: app.namespace(),
            labels: Some(labels),
            annotations: (!annotations.is_empty()).then_some(annotations),
            owner_references: owner_references(app),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(driver_selector(app)),
            ports: Some(vec![ServicePort {
                name: Some(port_name),
                port,
                target_port: Some(IntOrString::Int(target_port)),
                ..Default::default()
            }]),
            type_: Some(ui_service_type(app)),
            ..Default::default()
        }),
        status: None,
    }
}

fn describe(created: &Service, requested: &Service) -> ServiceDescriptor {
    let spec = created.spec.as_ref().or(requested.spec.as_ref());
    let port = spec.and_then(|s| s.ports.as_ref()).and_then(|ports| ports.first());
    ServiceDescriptor {
        name: created.name_any(),
        service_type: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        port: port.map(|p| p.port).unwrap_or_default(),
        port_name: port.and_then(|p| p.name.clone()).unwrap_or_default(),
        target_port: port.and_then(|p| p.target_port.clone()).unwrap_or(IntOrString::Int(0)),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()),
        annotations: created.annotations().clone(),
    }
}

/// Creates the Service fronting the driver UI. Port configuration is validated before anything
/// is sent to the cluster; the creation itself is attempted exactly once.
pub async fn create_service<C: UiResourceClient + ?Sized>(app: &SparkApplication, client: &C) -> Result<ServiceDescriptor, UiError> {
    let port_name = resolve_service_port_name(app);
    let port = validated_port(PortKind::ServicePort, resolve_service_port(app))?;
    let target_port = validated_port(PortKind::TargetPort, resolve_target_port(app))?;

    let service = build_service(app, port_name, port, target_port);
    let key = ResourceKey::from(&service);
    info!("Creating a service {} for the Spark UI for application {}", key, app.name_any());

    let created = client
        .create_service(&key.namespace, &service)
        .await
        .map_err(|source| UiError::ServiceCreateFailed { key: key.clone(), source })?;
    debug!("Created service {key}");
    Ok(describe(&created, &service))
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::ServiceStatus;
    use kube::core::ErrorResponse;

    use super::*;
    use crate::{
        client::MockUiResourceClient,
        common::{test::minimal_application, SparkUIOptions, SPARK_APP_NAME_LABEL, SPARK_ROLE_LABEL},
        ui::port::SPARK_UI_PORT_CONFIGURATION_KEY,
    };

    fn server_assigned(service: &Service, cluster_ip: &str) -> Service {
        let mut created = service.clone();
        created.metadata.uid = Some("a8f1c0de".to_owned());
        created.metadata.resource_version = Some("1".to_owned());
        if let Some(spec) = created.spec.as_mut() {
            spec.cluster_ip = Some(cluster_ip.to_owned());
            spec.cluster_ips = Some(vec![cluster_ip.to_owned()]);
            if let Some(port) = spec.ports.as_mut().and_then(|p| p.first_mut()) {
                port.protocol = Some("TCP".to_owned());
            }
        }
        created.status = Some(ServiceStatus::default());
        created
    }

    fn accepting_client(cluster_ip: &'static str) -> MockUiResourceClient {
        let mut client = MockUiResourceClient::new();
        client.expect_create_service().times(1).returning(move |_, s| Ok(server_assigned(s, cluster_ip)));
        client.expect_create_ingress().never();
        client
    }

    #[tokio::test]
    async fn creates_default_service() {
        let app = minimal_application("spark-pi", "spark-jobs");
        let mut client = MockUiResourceClient::new();
        client
            .expect_create_service()
            .withf(|namespace, service| {
                let spec = service.spec.as_ref().unwrap();
                let ports = spec.ports.as_ref().unwrap();
                namespace == "spark-jobs"
                    && service.metadata.name.as_deref() == Some("spark-pi-ui-svc")
                    && service.metadata.annotations.is_none()
                    && service.metadata.owner_references.as_ref().is_some_and(|o| o.len() == 1)
                    && spec.type_.as_deref() == Some("ClusterIP")
                    && ports.len() == 1
                    && ports[0].port == 4040
                    && ports[0].name.as_deref() == Some("spark-driver-ui-port")
                    && ports[0].target_port == Some(IntOrString::Int(4040))
            })
            .times(1)
            .returning(|_, s| Ok(server_assigned(s, "10.96.12.7")));

        let descriptor = create_service(&app, &client).await.unwrap();
        assert_eq!(
            descriptor,
            ServiceDescriptor {
                name: "spark-pi-ui-svc".to_owned(),
                service_type: "ClusterIP".to_owned(),
                port: 4040,
                port_name: "spark-driver-ui-port".to_owned(),
                target_port: IntOrString::Int(4040),
                cluster_ip: Some("10.96.12.7".to_owned()),
                annotations: BTreeMap::new(),
            }
        );
    }

    #[tokio::test]
    async fn layers_ui_options_over_conf() {
        let mut app = minimal_application("spark-pi", "spark-jobs");
        app.spec.spark_conf.insert(SPARK_UI_PORT_CONFIGURATION_KEY.to_owned(), "4041".to_owned());
        app.spec.spark_ui_options = Some(SparkUIOptions {
            service_port: Some(80),
            service_port_name: Some("http".to_owned()),
            service_type: Some("NodePort".to_owned()),
            service_annotations: Some(BTreeMap::from([("cloud.example.com/internal".to_owned(), "true".to_owned())])),
            service_labels: Some(BTreeMap::from([("exposed".to_owned(), "ui".to_owned())])),
            ..Default::default()
        });

        let descriptor = create_service(&app, &accepting_client("10.96.0.20")).await.unwrap();
        assert_eq!(descriptor.port, 80);
        assert_eq!(descriptor.port_name, "http");
        assert_eq!(descriptor.target_port, IntOrString::Int(4041));
        assert_eq!(descriptor.service_type, "NodePort");
        assert_eq!(descriptor.annotations.get("cloud.example.com/internal").map(String::as_str), Some("true"));

        let service = build_service(&app, "http".to_owned(), 80, 4041);
        let labels = service.metadata.labels.unwrap();
        assert_eq!(labels.get("exposed").map(String::as_str), Some("ui"));
        assert_eq!(labels.get(SPARK_APP_NAME_LABEL).map(String::as_str), Some("spark-pi"));
    }

    #[tokio::test]
    async fn non_numeric_conf_port_is_rejected_before_creation() {
        let mut app = minimal_application("spark-pi", "spark-jobs");
        app.spec.spark_conf.insert(SPARK_UI_PORT_CONFIGURATION_KEY.to_owned(), "abc".to_owned());
        let mut client = MockUiResourceClient::new();
        client.expect_create_service().never();

        let err = create_service(&app, &client).await.unwrap_err();
        assert!(matches!(&err, UiError::InvalidPortConfig { kind: PortKind::ServicePort, value, source: Some(_) } if value == "abc"));
        assert!(err.to_string().contains("abc"));
    }

    #[tokio::test]
    async fn out_of_range_port_is_rejected_before_creation() {
        let mut app = minimal_application("spark-pi", "spark-jobs");
        app.spec.spark_conf.insert(SPARK_UI_PORT_CONFIGURATION_KEY.to_owned(), "70000".to_owned());
        app.spec.spark_ui_options = Some(SparkUIOptions {
            service_port: Some(80),
            ..Default::default()
        });
        let mut client = MockUiResourceClient::new();
        client.expect_create_service().never();

        let err = create_service(&app, &client).await.unwrap_err();
        assert!(matches!(&err, UiError::InvalidPortConfig { kind: PortKind::TargetPort, value, source: None } if value == "70000"));
    }

    #[tokio::test]
    async fn store_errors_are_returned_untouched() {
        let app = minimal_application("spark-pi", "spark-jobs");
        let mut client = MockUiResourceClient::new();
        client.expect_create_service().times(1).returning(|_, _| {
            Err(kube::Error::Api(ErrorResponse {
                status: "Failure".to_owned(),
                message: "services \"spark-pi-ui-svc\" already exists".to_owned(),
                reason: "AlreadyExists".to_owned(),
                code: 409,
            }))
        });

        let err = create_service(&app, &client).await.unwrap_err();
        match err {
            UiError::ServiceCreateFailed { key, source: kube::Error::Api(response) } => {
                assert_eq!(key, ResourceKey::namespaced("spark-pi-ui-svc", "spark-jobs"));
                assert_eq!(response.code, 409);
                assert_eq!(response.reason, "AlreadyExists");
            },
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn applications_do_not_share_services() {
        let mut client = MockUiResourceClient::new();
        client.expect_create_service().times(2).returning(|_, s| Ok(server_assigned(s, "10.96.0.30")));

        let a = minimal_application("a", "ns1");
        let b = minimal_application("b", "ns1");
        let service_a = create_service(&a, &client).await.unwrap();
        let service_b = create_service(&b, &client).await.unwrap();
        assert_ne!(service_a.name, service_b.name);

        let selector_a = build_service(&a, String::new(), 4040, 4040).spec.unwrap().selector.unwrap();
        let selector_b = build_service(&b, String::new(), 4040, 4040).spec.unwrap().selector.unwrap();
        assert_eq!(selector_a.get(SPARK_APP_NAME_LABEL).map(String::as_str), Some("a"));
        assert_eq!(selector_b.get(SPARK_APP_NAME_LABEL).map(String::as_str), Some("b"));
        assert_eq!(selector_a.get(SPARK_ROLE_LABEL).map(String::as_str), Some("driver"));
        assert_eq!(selector_a.len(), 2);
    }
}
