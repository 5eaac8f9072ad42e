use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::IngressTLS;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The subset of a `SparkApplication` that the UI exposure reads and writes.
///
/// Only the fields needed to expose the driver UI are modelled; everything else in the
/// manifest is ignored on deserialization.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "sparkoperator.k8s.io",
    version = "v1beta2",
    kind = "SparkApplication",
    namespaced,
    status = "SparkApplicationStatus",
    shortname = "sparkapp"
)]
#[serde(rename_all = "camelCase")]
pub struct SparkApplicationSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spark_conf: BTreeMap<String, String>,
    #[serde(rename = "sparkUIOptions", default, skip_serializing_if = "Option::is_none")]
    pub spark_ui_options: Option<SparkUIOptions>,
}

/// Explicit UI exposure settings. Every field is optional so that "unset" never collapses into a default value.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SparkUIOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_port_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_annotations: Option<BTreeMap<String, String>>,
    #[serde(rename = "ingressTLS", default, skip_serializing_if = "Option::is_none")]
    pub ingress_tls: Option<Vec<IngressTLS>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SparkApplicationStatus {
    #[serde(rename = "submissionID", default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub driver_info: DriverInfo,
}

/// Where the driver UI can be reached once it has been exposed.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct DriverInfo {
    #[serde(rename = "webUIServiceName", default, skip_serializing_if = "Option::is_none")]
    pub web_ui_service_name: Option<String>,
    #[serde(rename = "webUIPort", default, skip_serializing_if = "Option::is_none")]
    pub web_ui_port: Option<i32>,
    /// `<clusterIP>:<servicePort>`
    #[serde(rename = "webUIAddress", default, skip_serializing_if = "Option::is_none")]
    pub web_ui_address: Option<String>,
    #[serde(rename = "webUIIngressName", default, skip_serializing_if = "Option::is_none")]
    pub web_ui_ingress_name: Option<String>,
    #[serde(rename = "webUIIngressAddress", default, skip_serializing_if = "Option::is_none")]
    pub web_ui_ingress_address: Option<String>,
}

impl SparkApplication {
    pub fn ui_options(&self) -> Option<&SparkUIOptions> {
        self.spec.spark_ui_options.as_ref()
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.submission_id.as_deref())
    }
}
