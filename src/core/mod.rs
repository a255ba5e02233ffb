pub mod diff;
pub mod engine;
pub mod planner;
pub mod reconciler;

pub use crate::domain::model::{Container, Deployment, PortRange, Service};
pub use crate::domain::plan::{ChangeSet, DeploymentPlan, ObservedState, ReconcileReport};
pub use crate::domain::ports::{ClusterApi, ConfigProvider, Reconciler};
pub use crate::utils::error::Result;
