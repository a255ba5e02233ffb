use crate::domain::model::Deployment;
use crate::domain::plan::{ContainerPlacement, DeploymentPlan, NetworkPolicy};
use crate::utils::error::{DeployError, Result};
use crate::utils::validation::{validate_image, validate_label};
use std::collections::{BTreeSet, HashSet};

/// 將宣告的部署展開成具體的放置計畫與網路政策。
/// 結構驗證在這裡做，建構階段保持寬鬆。
pub fn plan(deployment: &Deployment) -> Result<DeploymentPlan> {
    let mut seen = HashSet::new();
    for service in deployment.services() {
        validate_label("service.name", service.name())?;
        if !seen.insert(service.name()) {
            return Err(DeployError::PlanError {
                message: format!("Duplicate service name: {}", service.name()),
            });
        }
    }

    let mut placements = Vec::new();
    let mut policies = BTreeSet::new();

    let mut services: Vec<_> = deployment.services().iter().collect();
    services.sort_by(|a, b| a.name().cmp(b.name()));

    for service in services {
        if service.containers().is_empty() {
            tracing::warn!(
                "🔶 Service '{}' declares no containers; planning no placements",
                service.name()
            );
        }

        for (index, container) in service.containers().iter().enumerate() {
            validate_image("container.image", &container.image)?;
            placements.push(ContainerPlacement {
                // 名稱固定為 {service}.{序號}，diff 靠它對齊觀測到的容器
                name: format!("{}.{}", service.name(), index + 1),
                service: service.name().to_string(),
                image: container.image.clone(),
                command: container.command.clone(),
                env: container.env.clone(),
            });
        }

        for connection in service.connections() {
            if deployment.service(&connection.to).is_none() {
                return Err(DeployError::PlanError {
                    message: format!(
                        "Service '{}' connects to unknown service '{}'",
                        service.name(),
                        connection.to
                    ),
                });
            }
            policies.insert(NetworkPolicy {
                from: service.name().to_string(),
                to: connection.to.clone(),
                min_port: connection.ports.min(),
                max_port: connection.ports.max(),
            });
        }
    }

    Ok(DeploymentPlan {
        namespace: deployment.namespace().to_string(),
        placements,
        policies: policies.into_iter().collect(),
    })
}
