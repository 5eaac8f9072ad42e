mod labels;
mod resource_key;
mod spark_application;

pub use labels::{
    driver_selector, owner_references, resource_labels, ui_ingress_annotations, ui_ingress_name, ui_ingress_tls, ui_service_annotations, ui_service_labels, ui_service_name,
    ui_service_type, DEFAULT_UI_SERVICE_TYPE, SPARK_APP_NAME_LABEL, SPARK_DRIVER_ROLE, SPARK_ROLE_LABEL, SUBMISSION_ID_LABEL,
};
pub use resource_key::{ResourceKey, DEFAULT_NAMESPACE_NAME};
pub use spark_application::{DriverInfo, SparkApplication, SparkApplicationSpec, SparkApplicationStatus, SparkUIOptions};
