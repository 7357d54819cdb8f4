//! Application server detection (voting) and runtime image selection

pub mod detector;
pub mod params;
pub mod votes;

pub use detector::ServerDetector;
pub use params::ServerParameterExtractor;
pub use votes::{DependencyListingVote, DescriptorVote, FolderStructureVote, VoteContext, VoteSource};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

crate::define_id_enum! {
    ServerType {
        Tomcat => "tomcat" : "Apache Tomcat",
        Jboss => "jboss" : "JBoss / WildFly" | "wildfly",
        Liberty => "liberty" : "Open Liberty",
        Undefined => "undefined" : "Undefined",
    }
}

impl ServerType {
    /// The identities votes are cast for
    pub const IDENTITIES: [ServerType; 3] = [ServerType::Tomcat, ServerType::Jboss, ServerType::Liberty];

    /// Name searched for in folders, descriptors and dependency listings
    pub fn vote_token(&self) -> &'static str {
        self.as_str()
    }
}

/// Points per server identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    votes: BTreeMap<ServerType, u32>,
}

impl Default for VoteTally {
    fn default() -> Self {
        Self {
            votes: ServerType::IDENTITIES.iter().map(|s| (*s, 0)).collect(),
        }
    }
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, server: ServerType, points: u32) {
        if server != ServerType::Undefined {
            *self.votes.entry(server).or_insert(0) += points;
        }
    }

    pub fn merge(&mut self, other: &VoteTally) {
        for (server, points) in &other.votes {
            self.add(*server, *points);
        }
    }

    pub fn get(&self, server: ServerType) -> u32 {
        self.votes.get(&server).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.votes.values().sum()
    }

    /// Strictly highest total wins; a shared maximum, including all zero, is undefined
    pub fn winner(&self) -> ServerType {
        let Some(max) = self.votes.values().max().copied() else {
            return ServerType::Undefined;
        };
        let mut leaders = self.votes.iter().filter(|(_, v)| **v == max);
        match (leaders.next(), leaders.next()) {
            (Some((server, _)), None) => *server,
            _ => ServerType::Undefined,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.total() > 0 && self.winner() == ServerType::Undefined
    }
}

impl Serialize for VoteTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.votes.len()))?;
        for (server, points) in &self.votes {
            map.serialize_entry(server.as_str(), points)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerDetectionResult {
    pub server_type: ServerType,
    /// The framework ships its own server; `server_type` is not consulted downstream
    pub is_embedded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub tally: VoteTally,
}

/// How the deploy target was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerSelection {
    Voted,
    /// The vote was undefined; the presence of a Liberty `server.xml` decided
    ConfigFileFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalServer {
    pub server_type: ServerType,
    /// Concrete image tag or a `<TYPE>_DEFAULT` sentinel
    pub compatible_image: String,
    pub exposed_ports: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<u16>,
    pub selection: ServerSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerParams {
    Embedded,
    External(ExternalServer),
}

impl ServerParams {
    pub fn is_embedded(&self) -> bool {
        matches!(self, ServerParams::Embedded)
    }

    pub fn external(&self) -> Option<&ExternalServer> {
        match self {
            ServerParams::External(server) => Some(server),
            ServerParams::Embedded => None,
        }
    }
}

impl Serialize for ServerParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            is_embedded: bool,
            #[serde(flatten)]
            external: Option<&'a ExternalServer>,
        }

        Repr {
            is_embedded: self.is_embedded(),
            external: self.external(),
        }
        .serialize(serializer)
    }
}
