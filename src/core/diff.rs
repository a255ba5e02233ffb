use crate::domain::plan::{
    ChangeSet, DeploymentPlan, NetworkPolicy, ObservedContainer, ObservedState,
};
use std::collections::{HashMap, HashSet};

/// 比對宣告計畫與觀測狀態，產生收斂所需的最小變更集。
/// 容器以放置名稱對齊；映像不同視為需要汰換。
pub fn diff(plan: &DeploymentPlan, observed: &ObservedState) -> ChangeSet {
    let mut changes = ChangeSet::default();

    let mut by_name: HashMap<&str, Vec<&ObservedContainer>> = HashMap::new();
    for container in &observed.containers {
        by_name.entry(container.name.as_str()).or_default().push(container);
    }

    for placement in &plan.placements {
        match by_name.remove(placement.name.as_str()) {
            None => changes.boot.push(placement.clone()),
            Some(mut existing) => {
                // 第一個觀測到的保留，重複的一律視為漂移
                let keep = existing.remove(0);
                if keep.image != placement.image {
                    changes.terminate.push(keep.clone());
                    changes.boot.push(placement.clone());
                }
                for extra in existing {
                    changes.terminate.push(extra.clone());
                }
            }
        }
    }

    for leftovers in by_name.into_values() {
        for container in leftovers {
            changes.terminate.push(container.clone());
        }
    }

    let desired: HashSet<&NetworkPolicy> = plan.policies.iter().collect();
    let current: HashSet<&NetworkPolicy> = observed.policies.iter().collect();
    changes.open = desired.difference(&current).map(|p| (*p).clone()).collect();
    changes.close = current.difference(&desired).map(|p| (*p).clone()).collect();

    changes.boot.sort_by(|a, b| a.name.cmp(&b.name));
    changes
        .terminate
        .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    changes.open.sort();
    changes.close.sort();

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{ContainerPlacement, ObservedContainer};
    use std::collections::BTreeMap;

    fn placement(service: &str, index: usize, image: &str) -> ContainerPlacement {
        ContainerPlacement {
            name: format!("{}.{}", service, index),
            service: service.to_string(),
            image: image.to_string(),
            command: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    fn observed(id: &str, name: &str, image: &str) -> ObservedContainer {
        let service = name.split('.').next().unwrap().to_string();
        ObservedContainer {
            id: id.to_string(),
            name: name.to_string(),
            service,
            image: image.to_string(),
        }
    }

    fn policy(from: &str, to: &str) -> NetworkPolicy {
        NetworkPolicy {
            from: from.to_string(),
            to: to.to_string(),
            min_port: 1024,
            max_port: 65535,
        }
    }

    fn red_blue_plan() -> DeploymentPlan {
        DeploymentPlan {
            namespace: "default".to_string(),
            placements: vec![
                placement("blue", 1, "google/pause"),
                placement("blue", 2, "google/pause"),
                placement("blue", 3, "google/pause"),
                placement("red", 1, "google/pause"),
            ],
            policies: vec![policy("blue", "red"), policy("red", "blue")],
        }
    }

    #[test]
    fn test_diff_empty_cluster_boots_everything() {
        let changes = diff(&red_blue_plan(), &ObservedState::default());

        assert_eq!(changes.boot.len(), 4);
        assert_eq!(changes.open.len(), 2);
        assert!(changes.terminate.is_empty());
        assert!(changes.close.is_empty());
    }

    #[test]
    fn test_diff_converged_cluster_is_noop() {
        let state = ObservedState {
            containers: vec![
                observed("c1", "blue.1", "google/pause"),
                observed("c2", "blue.2", "google/pause"),
                observed("c3", "blue.3", "google/pause"),
                observed("c4", "red.1", "google/pause"),
            ],
            policies: vec![policy("blue", "red"), policy("red", "blue")],
        };

        let changes = diff(&red_blue_plan(), &state);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_diff_scale_down_terminates_extra_replicas() {
        let mut plan = red_blue_plan();
        plan.placements.retain(|p| p.name != "blue.3");

        let state = ObservedState {
            containers: vec![
                observed("c1", "blue.1", "google/pause"),
                observed("c2", "blue.2", "google/pause"),
                observed("c3", "blue.3", "google/pause"),
                observed("c4", "red.1", "google/pause"),
            ],
            policies: vec![policy("blue", "red"), policy("red", "blue")],
        };

        let changes = diff(&plan, &state);
        assert!(changes.boot.is_empty());
        assert_eq!(changes.terminate.len(), 1);
        assert_eq!(changes.terminate[0].name, "blue.3");
    }

    #[test]
    fn test_diff_image_change_replaces_container() {
        let mut plan = red_blue_plan();
        for p in plan.placements.iter_mut().filter(|p| p.service == "red") {
            p.image = "nginx:1.27".to_string();
        }

        let state = ObservedState {
            containers: vec![
                observed("c1", "blue.1", "google/pause"),
                observed("c2", "blue.2", "google/pause"),
                observed("c3", "blue.3", "google/pause"),
                observed("c4", "red.1", "google/pause"),
            ],
            policies: vec![policy("blue", "red"), policy("red", "blue")],
        };

        let changes = diff(&plan, &state);
        assert_eq!(changes.boot.len(), 1);
        assert_eq!(changes.boot[0].name, "red.1");
        assert_eq!(changes.boot[0].image, "nginx:1.27");
        assert_eq!(changes.terminate.len(), 1);
        assert_eq!(changes.terminate[0].id, "c4");
    }

    #[test]
    fn test_diff_terminates_rogue_and_duplicate_containers() {
        let state = ObservedState {
            containers: vec![
                observed("c1", "blue.1", "google/pause"),
                observed("c2", "blue.2", "google/pause"),
                observed("c3", "blue.3", "google/pause"),
                observed("c4", "red.1", "google/pause"),
                observed("c5", "red.1", "google/pause"),
                observed("c6", "green.1", "busybox"),
            ],
            policies: vec![policy("blue", "red"), policy("red", "blue")],
        };

        let changes = diff(&red_blue_plan(), &state);
        assert!(changes.boot.is_empty());
        let terminated: Vec<&str> = changes.terminate.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(terminated, vec!["c6", "c5"]);
    }

    #[test]
    fn test_diff_policy_set_difference() {
        let state = ObservedState {
            containers: vec![
                observed("c1", "blue.1", "google/pause"),
                observed("c2", "blue.2", "google/pause"),
                observed("c3", "blue.3", "google/pause"),
                observed("c4", "red.1", "google/pause"),
            ],
            policies: vec![policy("red", "blue"), policy("green", "red")],
        };

        let changes = diff(&red_blue_plan(), &state);
        assert_eq!(changes.open, vec![policy("blue", "red")]);
        assert_eq!(changes.close, vec![policy("green", "red")]);
    }
}
