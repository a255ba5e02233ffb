use crate::core::diff;
use crate::domain::plan::ReconcileReport;
use crate::domain::ports::Reconciler;
use crate::utils::error::{DeployError, Result};
use std::time::Duration;
use tokio::time::Instant;

/// 驅動 plan → observe → diff → apply 的收斂引擎
pub struct ReconcileEngine<R: Reconciler> {
    reconciler: R,
}

impl<R: Reconciler> ReconcileEngine<R> {
    pub fn new(reconciler: R) -> Self {
        Self { reconciler }
    }

    /// 執行一輪收斂；叢集已一致時回傳零變更的報告
    pub async fn run_once(&self) -> Result<ReconcileReport> {
        let plan = self.reconciler.plan().await?;
        tracing::info!(
            "📋 Planned {} placements and {} policies for namespace '{}'",
            plan.placements.len(),
            plan.policies.len(),
            plan.namespace
        );

        let observed = self.reconciler.observe().await?;
        let changes = diff::diff(&plan, &observed);

        if changes.is_empty() {
            tracing::info!("✅ Cluster already matches the declared deployment");
            return Ok(ReconcileReport::converged(&plan.namespace));
        }

        tracing::info!(
            "🔄 Applying {} changes: {} boot, {} terminate, {} open, {} close",
            changes.total(),
            changes.boot.len(),
            changes.terminate.len(),
            changes.open.len(),
            changes.close.len()
        );
        self.reconciler.apply(&changes).await
    }

    /// 反覆執行收斂，直到某一輪觀測不到任何差異為止。
    /// 超過 timeout 仍未收斂回傳 TimeoutError。
    pub async fn converge(&self, timeout: Duration, poll_interval: Duration) -> Result<ReconcileReport> {
        let deadline = Instant::now() + timeout;

        loop {
            let report = self.run_once().await?;
            if report.changed() == 0 {
                return Ok(report);
            }

            if Instant::now() >= deadline {
                tracing::error!(
                    "❌ Namespace '{}' did not converge within {:?}",
                    report.namespace,
                    timeout
                );
                return Err(DeployError::TimeoutError);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
