pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{http::HttpClusterApi, memory::InMemoryCluster};
pub use crate::config::EngineConfig;
pub use crate::core::{engine::ReconcileEngine, reconciler::ClusterReconciler};
pub use crate::domain::model::{Container, Deployment, PortRange, Service};
pub use crate::utils::error::{DeployError, Result};
