use crate::domain::plan::{
    ChangeSet, ContainerPlacement, DeploymentPlan, NetworkPolicy, ObservedContainer, ObservedState,
    ReconcileReport,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ClusterApi: Send + Sync {
    fn observed_state(
        &self,
        namespace: &str,
    ) -> impl std::future::Future<Output = Result<ObservedState>> + Send;

    fn boot_container(
        &self,
        namespace: &str,
        placement: &ContainerPlacement,
    ) -> impl std::future::Future<Output = Result<ObservedContainer>> + Send;

    fn terminate_container(
        &self,
        namespace: &str,
        container_id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn open_policy(
        &self,
        namespace: &str,
        policy: &NetworkPolicy,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn close_policy(
        &self,
        namespace: &str,
        policy: &NetworkPolicy,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn cluster_endpoint(&self) -> &str;
    fn namespace_override(&self) -> Option<&str>;
    fn poll_interval_secs(&self) -> u64;
    fn converge_timeout_secs(&self) -> u64;
    fn request_timeout_secs(&self) -> u64;
    fn retry_attempts(&self) -> u32;
}

#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn plan(&self) -> Result<DeploymentPlan>;
    async fn observe(&self) -> Result<ObservedState>;
    async fn apply(&self, changes: &ChangeSet) -> Result<ReconcileReport>;
}
