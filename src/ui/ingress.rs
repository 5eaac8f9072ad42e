use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule, IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use kube::ResourceExt;
use kube_core::ObjectMeta;
use tracing::{debug, info};

use super::{service::ServiceDescriptor, url_template::ExposureUrl, UiError};
use crate::{
    client::UiResourceClient,
    common::{owner_references, resource_labels, ui_ingress_annotations, ui_ingress_name, ui_ingress_tls, ResourceKey, SparkApplication},
};

pub const REWRITE_TARGET_ANNOTATION: &str = "nginx.ingress.kubernetes.io/rewrite-target";
pub const REWRITE_TARGET: &str = "/$2";
const SUB_PATH_CAPTURE: &str = "(/|$)(.*)";
const PATH_TYPE: &str = "ImplementationSpecific";

/// The driver UI ingress as the API server created it.
#[derive(Clone, Debug, PartialEq)]
pub struct IngressDescriptor {
    pub name: String,
    pub url: ExposureUrl,
    pub annotations: BTreeMap<String, String>,
    pub tls: Vec<IngressTLS>,
}

impl IngressDescriptor {
    pub fn tls_hosts(&self) -> impl Iterator<Item = &str> {
        self.tls.iter().filter_map(|t| t.hosts.as_ref()).flatten().map(String::as_str)
    }
}

/// Path submitted for the ingress rule. A sub-path becomes a prefix match whose second
/// capture group is what the controller forwards upstream.
pub fn ingress_path(url: &ExposureUrl) -> String {
    if url.is_sub_path() {
        format!("{}{SUB_PATH_CAPTURE}", url.path())
    } else {
        url.path().to_owned()
    }
}

pub(crate) fn build_ingress(app: &SparkApplication, service: &ServiceDescriptor, url: &ExposureUrl, ingress_class_name: Option<&str>) -> Ingress {
    let mut annotations = ui_ingress_annotations(app);
    if url.is_sub_path() {
        annotations.insert(REWRITE_TARGET_ANNOTATION.to_owned(), REWRITE_TARGET.to_owned());
    }
    let tls = ui_ingress_tls(app);

    Ingress {
        metadata: ObjectMeta {
            name: Some(ui_ingress_name(app)),
            namespace: app.namespace(),
            labels: Some(resource_labels(app)),
            annotations: (!annotations.is_empty()).then_some(annotations),
            owner_references: owner_references(app),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: ingress_class_name.map(ToOwned::to_owned),
            rules: Some(vec![IngressRule {
                host: Some(url.host().to_owned()),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: service.name.clone(),
                                port: Some(ServiceBackendPort {
                                    number: Some(service.port),
                                    name: None,
                                }),
                            }),
                            resource: None,
                        },
                        path: Some(ingress_path(url)),
                        path_type: PATH_TYPE.to_owned(),
                    }],
                }),
            }]),
            tls: (!tls.is_empty()).then_some(tls),
            ..Default::default()
        }),
        status: None,
    }
}

/// Creates the Ingress routing `url` to the UI service. Must run after the service exists.
pub async fn create_ingress<C: UiResourceClient + ?Sized>(
    app: &SparkApplication,
    service: &ServiceDescriptor,
    url: &ExposureUrl,
    ingress_class_name: Option<&str>,
    client: &C,
) -> Result<IngressDescriptor, UiError> {
    let ingress = build_ingress(app, service, url, ingress_class_name);
    let key = ResourceKey::from(&ingress);
    info!("Creating an Ingress {} for the Spark UI for application {}", key, app.name_any());

    let created = client
        .create_ingress(&key.namespace, &ingress)
        .await
        .map_err(|source| UiError::IngressCreateFailed { key: key.clone(), source })?;
    debug!("Created ingress {key} for {url}");

    Ok(IngressDescriptor {
        name: created.name_any(),
        url: url.clone(),
        annotations: created.annotations().clone(),
        tls: created.spec.and_then(|s| s.tls).unwrap_or_default(),
    })
}
