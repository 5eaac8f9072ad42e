use async_trait::async_trait;
use k8s_openapi::api::{core::v1::Service, networking::v1::Ingress};
use kube::{api::PostParams, Api, Client};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// The two creation calls the UI exposure needs from the cluster.
///
/// Implementations return the object as confirmed by the API server, including any
/// server-assigned fields such as the cluster IP.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UiResourceClient: Send + Sync {
    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, kube::Error>;

    async fn create_ingress(&self, namespace: &str, ingress: &Ingress) -> Result<Ingress, kube::Error>;
}

#[derive(Clone)]
pub struct KubeUiResourceClient {
    client: Client,
    field_manager: String,
}

impl KubeUiResourceClient {
    pub fn new(client: Client, field_manager: &str) -> Self {
        Self {
            client,
            field_manager: field_manager.to_owned(),
        }
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl UiResourceClient for KubeUiResourceClient {
    async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, kube::Error> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let created = api.create(&self.post_params(), service).await?;
        debug!("Service status {:?}", created.status);
        Ok(created)
    }

    async fn create_ingress(&self, namespace: &str, ingress: &Ingress) -> Result<Ingress, kube::Error> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        let created = api.create(&self.post_params(), ingress).await?;
        debug!("Ingress status {:?}", created.status);
        Ok(created)
    }
}
