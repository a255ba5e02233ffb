use crate::core::planner;
use crate::domain::model::Deployment;
use crate::domain::plan::{ChangeSet, DeploymentPlan, ObservedState, ReconcileReport};
use crate::domain::ports::{ClusterApi, ConfigProvider, Reconciler};
use crate::utils::error::Result;
use chrono::Utc;

/// 以叢集 API 為後端的 Reconciler 實作。
/// 持有一份宣告的 Deployment，對指定命名空間收斂。
pub struct ClusterReconciler<C: ClusterApi, F: ConfigProvider> {
    deployment: Deployment,
    cluster: C,
    config: F,
}

impl<C: ClusterApi, F: ConfigProvider> ClusterReconciler<C, F> {
    pub fn new(deployment: Deployment, cluster: C, config: F) -> Self {
        Self {
            deployment,
            cluster,
            config,
        }
    }

    /// 配置的命名空間覆寫優先於宣告裡的命名空間
    pub fn namespace(&self) -> &str {
        self.config
            .namespace_override()
            .unwrap_or_else(|| self.deployment.namespace())
    }
}

#[async_trait::async_trait]
impl<C: ClusterApi, F: ConfigProvider> Reconciler for ClusterReconciler<C, F> {
    async fn plan(&self) -> Result<DeploymentPlan> {
        let mut plan = planner::plan(&self.deployment)?;
        if let Some(namespace) = self.config.namespace_override() {
            tracing::debug!(
                "Overriding namespace '{}' with '{}'",
                plan.namespace,
                namespace
            );
            plan.namespace = namespace.to_string();
        }
        Ok(plan)
    }

    async fn observe(&self) -> Result<ObservedState> {
        let namespace = self.namespace();
        tracing::debug!("📡 Observing cluster state for namespace '{}'", namespace);
        self.cluster.observed_state(namespace).await
    }

    async fn apply(&self, changes: &ChangeSet) -> Result<ReconcileReport> {
        let namespace = self.namespace();

        // 先補齊容器與連通性，最後才移除漂移，
        // 存活的容器在整個套用過程中不會失去政策
        for placement in &changes.boot {
            tracing::info!("📥 {}: booting container ({})", placement.name, placement.image);
            self.cluster.boot_container(namespace, placement).await?;
        }

        for policy in &changes.open {
            tracing::info!(
                "🔄 Opening policy {} -> {} over ports {}-{}",
                policy.from,
                policy.to,
                policy.min_port,
                policy.max_port
            );
            self.cluster.open_policy(namespace, policy).await?;
        }

        for policy in &changes.close {
            tracing::info!("🔄 Closing policy {} -> {}", policy.from, policy.to);
            self.cluster.close_policy(namespace, policy).await?;
        }

        for container in &changes.terminate {
            tracing::info!("🗑️ {}: terminating container {}", container.name, container.id);
            self.cluster
                .terminate_container(namespace, &container.id)
                .await?;
        }

        Ok(ReconcileReport {
            namespace: namespace.to_string(),
            booted: changes.boot.len(),
            terminated: changes.terminate.len(),
            opened: changes.open.len(),
            closed: changes.close.len(),
            finished_at: Utc::now(),
        })
    }
}
