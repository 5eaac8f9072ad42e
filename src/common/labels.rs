use std::collections::BTreeMap;

use k8s_openapi::{api::networking::v1::IngressTLS, apimachinery::pkg::apis::meta::v1::OwnerReference};
use kube::{Resource, ResourceExt};
use tracing::warn;

use super::SparkApplication;

pub const SPARK_APP_NAME_LABEL: &str = "sparkoperator.k8s.io/app-name";
pub const SUBMISSION_ID_LABEL: &str = "sparkoperator.k8s.io/submission-id";
pub const SPARK_ROLE_LABEL: &str = "spark-role";
pub const SPARK_DRIVER_ROLE: &str = "driver";
pub const DEFAULT_UI_SERVICE_TYPE: &str = "ClusterIP";

/// Labels put on every object created on behalf of an application: the application's own labels plus the
/// app name and, once submitted, the submission id.
pub fn resource_labels(app: &SparkApplication) -> BTreeMap<String, String> {
    let mut labels = app.labels().clone();
    labels.insert(SPARK_APP_NAME_LABEL.to_owned(), app.name_any());
    if let Some(submission_id) = app.submission_id() {
        labels.insert(SUBMISSION_ID_LABEL.to_owned(), submission_id.to_owned());
    }
    labels
}

/// Selects the driver pod of exactly this application.
pub fn driver_selector(app: &SparkApplication) -> BTreeMap<String, String> {
    BTreeMap::from([
        (SPARK_APP_NAME_LABEL.to_owned(), app.name_any()),
        (SPARK_ROLE_LABEL.to_owned(), SPARK_DRIVER_ROLE.to_owned()),
    ])
}

pub fn owner_references(app: &SparkApplication) -> Option<Vec<OwnerReference>> {
    let owner_reference = app.controller_owner_ref(&());
    if owner_reference.is_none() {
        warn!("Application {} has no uid, created objects will not be garbage collected with it", app.name_any());
    }
    owner_reference.map(|o| vec![o])
}

pub fn ui_service_name(app: &SparkApplication) -> String {
    format!("{}-ui-svc", app.name_any())
}

pub fn ui_ingress_name(app: &SparkApplication) -> String {
    format!("{}-ui-ingress", app.name_any())
}

pub fn ui_service_type(app: &SparkApplication) -> String {
    app.ui_options()
        .and_then(|o| o.service_type.clone())
        .unwrap_or_else(|| DEFAULT_UI_SERVICE_TYPE.to_owned())
}

pub fn ui_service_labels(app: &SparkApplication) -> BTreeMap<String, String> {
    app.ui_options().and_then(|o| o.service_labels.clone()).unwrap_or_default()
}

pub fn ui_service_annotations(app: &SparkApplication) -> BTreeMap<String, String> {
    app.ui_options().and_then(|o| o.service_annotations.clone()).unwrap_or_default()
}

pub fn ui_ingress_annotations(app: &SparkApplication) -> BTreeMap<String, String> {
    app.ui_options().and_then(|o| o.ingress_annotations.clone()).unwrap_or_default()
}

pub fn ui_ingress_tls(app: &SparkApplication) -> Vec<IngressTLS> {
    app.ui_options().and_then(|o| o.ingress_tls.clone()).unwrap_or_default()
}
