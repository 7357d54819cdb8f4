use crate::server::ServerType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subset of a `docker inspect` `config` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(rename = "ExposedPorts", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exposed_ports: BTreeMap<String, serde_json::Value>,

    #[serde(rename = "User", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(rename = "Env", default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

impl ImageConfig {
    /// Exposed port specs such as `9080/tcp`, sorted
    pub fn exposed_ports(&self) -> Vec<String> {
        self.exposed_ports.keys().cloned().collect()
    }

    /// Run-as user; an empty string means root and is reported as absent
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }
}

/// Server family → image tag → config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageMetadataCatalog(BTreeMap<ServerType, BTreeMap<String, ImageConfig>>);

impl ImageMetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: ServerType, tag: &str, config: ImageConfig) {
        self.0
            .entry(family)
            .or_default()
            .insert(tag.to_string(), config);
    }

    pub fn get(&self, family: ServerType, tag: &str) -> Option<&ImageConfig> {
        self.0.get(&family).and_then(|tags| tags.get(tag))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
