use httpmock::prelude::*;
use small_deploy::{
    ClusterReconciler, Container, Deployment, DeployError, EngineConfig, HttpClusterApi,
    PortRange, ReconcileEngine, Service,
};

fn red_blue_deployment() -> Deployment {
    let mut deployment = Deployment::new();

    let mut red = Service::new("red", Container::new("google/pause").replicate(1));
    let mut blue = Service::new("blue", Container::new("google/pause").replicate(3));

    let ports = PortRange::new(1024, 65535).unwrap();
    red.connect(ports, &blue);
    blue.connect(ports, &red);

    deployment.deploy(red);
    deployment.deploy(blue);
    deployment
}

fn config_for(server: &MockServer) -> EngineConfig {
    let toml_content = format!(
        r#"
[engine]
poll_interval_seconds = 1

[cluster]
endpoint = "{}"
timeout_seconds = 5
retry_attempts = 0
"#,
        server.base_url()
    );
    EngineConfig::from_toml_str(&toml_content).unwrap()
}

#[tokio::test]
async fn test_engine_reconciles_empty_cluster_over_http() {
    let server = MockServer::start();

    let state_mock = server.mock(|when, then| {
        when.method(GET).path("/namespaces/default/state");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"containers": [], "policies": []}));
    });
    let boot_mock = server.mock(|when, then| {
        when.method(POST).path("/namespaces/default/containers");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "id": "c1", "name": "blue.1", "service": "blue", "image": "google/pause"
            }));
    });
    let policy_mock = server.mock(|when, then| {
        when.method(POST).path("/namespaces/default/policies");
        then.status(201);
    });

    let config = config_for(&server);
    let api = HttpClusterApi::from_config(&config).unwrap();
    let reconciler = ClusterReconciler::new(red_blue_deployment(), api, config);
    let engine = ReconcileEngine::new(reconciler);

    let report = engine.run_once().await.unwrap();

    assert_eq!(report.booted, 4);
    assert_eq!(report.opened, 2);

    state_mock.assert();
    boot_mock.assert_hits(4);
    policy_mock.assert_hits(2);
}

#[tokio::test]
async fn test_converged_remote_state_means_no_writes() {
    let server = MockServer::start();

    let state_mock = server.mock(|when, then| {
        when.method(GET).path("/namespaces/default/state");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "containers": [
                    {"id": "c1", "name": "blue.1", "service": "blue", "image": "google/pause"},
                    {"id": "c2", "name": "blue.2", "service": "blue", "image": "google/pause"},
                    {"id": "c3", "name": "blue.3", "service": "blue", "image": "google/pause"},
                    {"id": "c4", "name": "red.1", "service": "red", "image": "google/pause"}
                ],
                "policies": [
                    {"from": "blue", "to": "red", "min_port": 1024, "max_port": 65535},
                    {"from": "red", "to": "blue", "min_port": 1024, "max_port": 65535}
                ]
            }));
    });
    let write_mock = server.mock(|when, then| {
        when.method(POST).path_contains("/namespaces/");
        then.status(201);
    });

    let config = config_for(&server);
    let api = HttpClusterApi::from_config(&config).unwrap();
    let reconciler = ClusterReconciler::new(red_blue_deployment(), api, config);
    let engine = ReconcileEngine::new(reconciler);

    let report = engine.run_once().await.unwrap();

    assert_eq!(report.changed(), 0);
    state_mock.assert();
    write_mock.assert_hits(0);
}

#[tokio::test]
async fn test_cluster_failure_surfaces_as_cluster_error() {
    let server = MockServer::start();

    let state_mock = server.mock(|when, then| {
        when.method(GET).path("/namespaces/default/state");
        then.status(503);
    });

    let config = config_for(&server);
    let api = HttpClusterApi::from_config(&config).unwrap();
    let reconciler = ClusterReconciler::new(red_blue_deployment(), api, config);
    let engine = ReconcileEngine::new(reconciler);

    let err = engine.run_once().await.unwrap_err();

    state_mock.assert();
    assert!(matches!(err, DeployError::ClusterError { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_namespace_override_changes_request_paths() {
    let server = MockServer::start();

    let state_mock = server.mock(|when, then| {
        when.method(GET).path("/namespaces/ci-run-7/state");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"containers": [], "policies": []}));
    });
    let boot_mock = server.mock(|when, then| {
        when.method(POST).path("/namespaces/ci-run-7/containers");
        then.status(201)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "id": "c1", "name": "blue.1", "service": "blue", "image": "google/pause"
            }));
    });
    let policy_mock = server.mock(|when, then| {
        when.method(POST).path("/namespaces/ci-run-7/policies");
        then.status(201);
    });

    let toml_content = format!(
        r#"
[engine]
namespace = "ci-run-7"

[cluster]
endpoint = "{}"
retry_attempts = 0
"#,
        server.base_url()
    );
    let config = EngineConfig::from_toml_str(&toml_content).unwrap();
    let api = HttpClusterApi::from_config(&config).unwrap();
    let reconciler = ClusterReconciler::new(red_blue_deployment(), api, config);
    let engine = ReconcileEngine::new(reconciler);

    let report = engine.run_once().await.unwrap();

    assert_eq!(report.namespace, "ci-run-7");
    state_mock.assert();
    boot_mock.assert_hits(4);
    policy_mock.assert_hits(2);
}
