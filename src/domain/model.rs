use crate::utils::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = 65535;

/// 連線政策使用的連接埠範圍（含兩端）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    min: u16,
    max: u16,
}

impl PortRange {
    pub fn new(min: u16, max: u16) -> Result<Self> {
        if min < MIN_PORT {
            return Err(DeployError::SpecError {
                message: format!("Port range cannot include port {}", min),
            });
        }
        if min > max {
            return Err(DeployError::SpecError {
                message: format!("Inverted port range: {} > {}", min, max),
            });
        }
        Ok(Self { min, max })
    }

    pub fn single(port: u16) -> Result<Self> {
        Self::new(port, port)
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn contains(&self, port: u16) -> bool {
        port >= self.min && port <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Container {
    pub fn new(image: &str) -> Self {
        Self {
            image: image.to_string(),
            command: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// 複製出 n 份相同的容器，作為同一服務的副本
    pub fn replicate(&self, n: usize) -> Vec<Container> {
        vec![self.clone(); n]
    }
}

/// 服務對外宣告的單向連線規則
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub to: String,
    pub ports: PortRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    name: String,
    containers: Vec<Container>,
    connections: Vec<Connection>,
}

impl Service {
    pub fn new(name: &str, containers: Vec<Container>) -> Self {
        Self {
            name: name.to_string(),
            containers,
            connections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// 宣告本服務可連往 `to` 的指定連接埠範圍。
    /// 規則是單向的；雙向連通需要兩邊各宣告一次。
    pub fn connect(&mut self, ports: PortRange, to: &Service) {
        self.connections.push(Connection {
            to: to.name.clone(),
            ports,
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    namespace: String,
    services: Vec<Service>,
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}

impl Deployment {
    pub fn new() -> Self {
        Self::with_namespace("default")
    }

    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            services: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 啟動前覆寫命名空間，讓同一份宣告可以部署到不同環境
    pub fn set_namespace(&mut self, namespace: &str) {
        self.namespace = namespace.to_string();
    }

    pub fn deploy(&mut self, service: Service) -> &mut Self {
        self.services.push(service);
        self
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}
