use super::UiError;
use crate::common::SparkApplication;

pub const SPARK_UI_PORT_CONFIGURATION_KEY: &str = "spark.ui.port";
pub const DEFAULT_SPARK_WEB_UI_PORT: i32 = 4040;
pub const DEFAULT_SPARK_WEB_UI_PORT_NAME: &str = "spark-driver-ui-port";

/// Port the driver UI listens on. Taken from `spark.ui.port` in the Spark conf if present.
///
/// Only the application's inline `sparkConf` is consulted, never a referenced config map.
pub fn resolve_target_port(app: &SparkApplication) -> Result<i32, UiError> {
    match app.spec.spark_conf.get(SPARK_UI_PORT_CONFIGURATION_KEY) {
        Some(value) => value.parse::<i32>().map_err(|source| UiError::InvalidConfigValue {
            key: SPARK_UI_PORT_CONFIGURATION_KEY,
            value: value.clone(),
            source,
        }),
        None => Ok(DEFAULT_SPARK_WEB_UI_PORT),
    }
}

/// Port advertised by the UI service.
///
/// When UI options are present an unset service port means the default, not `spark.ui.port`.
pub fn resolve_service_port(app: &SparkApplication) -> Result<i32, UiError> {
    match app.ui_options() {
        None => resolve_target_port(app),
        Some(options) => Ok(options.service_port.unwrap_or(DEFAULT_SPARK_WEB_UI_PORT)),
    }
}

pub fn resolve_service_port_name(app: &SparkApplication) -> String {
    app.ui_options()
        .and_then(|o| o.service_port_name.clone())
        .unwrap_or_else(|| DEFAULT_SPARK_WEB_UI_PORT_NAME.to_owned())
}
