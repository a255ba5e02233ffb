use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 規劃後的單一容器放置：名稱在同一命名空間內唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPlacement {
    pub name: String,
    pub service: String,
    pub image: String,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// 解析後的單向網路政策
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NetworkPolicy {
    pub from: String,
    pub to: String,
    pub min_port: u16,
    pub max_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub namespace: String,
    pub placements: Vec<ContainerPlacement>,
    pub policies: Vec<NetworkPolicy>,
}

impl DeploymentPlan {
    pub fn replica_count(&self, service: &str) -> usize {
        self.placements.iter().filter(|p| p.service == service).count()
    }

    pub fn policy_between(&self, from: &str, to: &str) -> Option<&NetworkPolicy> {
        self.policies.iter().find(|p| p.from == from && p.to == to)
    }
}

/// 叢集回報的容器；`id` 由叢集指派
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedContainer {
    pub id: String,
    pub name: String,
    pub service: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservedState {
    pub containers: Vec<ObservedContainer>,
    pub policies: Vec<NetworkPolicy>,
}

/// 讓叢集收斂到宣告狀態所需的最小變更集
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub boot: Vec<ContainerPlacement>,
    pub terminate: Vec<ObservedContainer>,
    pub open: Vec<NetworkPolicy>,
    pub close: Vec<NetworkPolicy>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.boot.is_empty()
            && self.terminate.is_empty()
            && self.open.is_empty()
            && self.close.is_empty()
    }

    pub fn total(&self) -> usize {
        self.boot.len() + self.terminate.len() + self.open.len() + self.close.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub namespace: String,
    pub booted: usize,
    pub terminated: usize,
    pub opened: usize,
    pub closed: usize,
    pub finished_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn converged(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            booted: 0,
            terminated: 0,
            opened: 0,
            closed: 0,
            finished_at: Utc::now(),
        }
    }

    pub fn changed(&self) -> usize {
        self.booted + self.terminated + self.opened + self.closed
    }
}
