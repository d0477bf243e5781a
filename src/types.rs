use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Events recorded for one image stream tag.
#[derive(Debug, Clone)]
pub struct TagEventHistory {
    pub tag: String,
    pub created: Vec<DateTime<Utc>>,
}

impl TagEventHistory {
    /// The most recent event; a tag re-pushed yesterday counts as fresh even
    /// when it was first created long ago.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.created.iter().max().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    ConfigMap,
    Secret,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::ConfigMap => write!(f, "ConfigMap"),
            ResourceKind::Secret => write!(f, "Secret"),
        }
    }
}

/// A ConfigMap or Secret considered for cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub created: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceRecord {
    pub name: String,
    /// Raw value of the idle-since annotation, if the namespace carries one.
    pub idle_since: Option<String>,
}

impl NamespaceRecord {
    pub fn new(name: impl Into<String>, idle_since: Option<String>) -> Self {
        Self {
            name: name.into(),
            idle_since,
        }
    }
}
