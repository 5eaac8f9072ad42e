use std::fmt::Display;

use k8s_openapi::api::{core::v1::Service, networking::v1::Ingress};
use kube::ResourceExt;

use super::SparkApplication;

pub const DEFAULT_NAMESPACE_NAME: &str = "default";

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_owned(),
            namespace: namespace.to_owned(),
        }
    }
}

impl Default for ResourceKey {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE_NAME.to_owned(),
            name: String::default(),
        }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

macro_rules! resource_key_from {
    ($resource:ty) => {
        impl From<&$resource> for ResourceKey {
            fn from(resource: &$resource) -> Self {
                Self {
                    namespace: resource.namespace().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned()),
                    name: resource.name_any(),
                }
            }
        }
    };
}

resource_key_from!(SparkApplication);
resource_key_from!(Service);
resource_key_from!(Ingress);
