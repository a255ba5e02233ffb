use crate::domain::plan::{ContainerPlacement, NetworkPolicy, ObservedContainer, ObservedState};
use crate::domain::ports::ClusterApi;
use crate::utils::error::{DeployError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// 行程內的叢集狀態，依命名空間隔離。
/// 測試與 dry-run 都以它作為收斂目標。
#[derive(Clone, Default)]
pub struct InMemoryCluster {
    namespaces: Arc<Mutex<HashMap<String, NamespaceState>>>,
}

#[derive(Default)]
struct NamespaceState {
    containers: HashMap<String, ObservedContainer>,
    policies: HashSet<NetworkPolicy>,
    booted: u64,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn container_names(&self, namespace: &str) -> Vec<String> {
        let namespaces = self.namespaces.lock().await;
        let mut names: Vec<String> = namespaces
            .get(namespace)
            .map(|state| state.containers.values().map(|c| c.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub async fn policy_count(&self, namespace: &str) -> usize {
        let namespaces = self.namespaces.lock().await;
        namespaces
            .get(namespace)
            .map(|state| state.policies.len())
            .unwrap_or(0)
    }

    /// 直接塞入一個容器，模擬叢集漂移
    pub async fn insert_container(&self, namespace: &str, container: ObservedContainer) {
        let mut namespaces = self.namespaces.lock().await;
        let state = namespaces.entry(namespace.to_string()).or_default();
        state.containers.insert(container.id.clone(), container);
    }
}

impl ClusterApi for InMemoryCluster {
    async fn observed_state(&self, namespace: &str) -> Result<ObservedState> {
        let namespaces = self.namespaces.lock().await;
        let state = match namespaces.get(namespace) {
            Some(state) => state,
            None => return Ok(ObservedState::default()),
        };

        let mut containers: Vec<ObservedContainer> = state.containers.values().cloned().collect();
        containers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        let mut policies: Vec<NetworkPolicy> = state.policies.iter().cloned().collect();
        policies.sort();

        Ok(ObservedState {
            containers,
            policies,
        })
    }

    async fn boot_container(
        &self,
        namespace: &str,
        placement: &ContainerPlacement,
    ) -> Result<ObservedContainer> {
        let mut namespaces = self.namespaces.lock().await;
        let state = namespaces.entry(namespace.to_string()).or_default();

        state.booted += 1;
        let container = ObservedContainer {
            id: format!("{}-c{}", namespace, state.booted),
            name: placement.name.clone(),
            service: placement.service.clone(),
            image: placement.image.clone(),
        };
        state.containers.insert(container.id.clone(), container.clone());
        Ok(container)
    }

    async fn terminate_container(&self, namespace: &str, container_id: &str) -> Result<()> {
        let mut namespaces = self.namespaces.lock().await;
        let state = namespaces.entry(namespace.to_string()).or_default();

        if state.containers.remove(container_id).is_none() {
            return Err(DeployError::ClusterError {
                message: format!(
                    "No container '{}' in namespace '{}'",
                    container_id, namespace
                ),
            });
        }
        Ok(())
    }

    async fn open_policy(&self, namespace: &str, policy: &NetworkPolicy) -> Result<()> {
        let mut namespaces = self.namespaces.lock().await;
        let state = namespaces.entry(namespace.to_string()).or_default();
        state.policies.insert(policy.clone());
        Ok(())
    }

    async fn close_policy(&self, namespace: &str, policy: &NetworkPolicy) -> Result<()> {
        let mut namespaces = self.namespaces.lock().await;
        let state = namespaces.entry(namespace.to_string()).or_default();

        if !state.policies.remove(policy) {
            return Err(DeployError::ClusterError {
                message: format!(
                    "No policy {} -> {} in namespace '{}'",
                    policy.from, policy.to, namespace
                ),
            });
        }
        Ok(())
    }
}
