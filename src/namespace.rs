//! Deciding which idle namespaces may be removed.
//!
//! A namespace becomes a candidate once it carries the idle-since annotation
//! and the configured grace period has passed. Even then, every registered
//! [`Checker`] gets a veto.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::kubernetes::{ObjectLister, SECRET, WORKLOAD_KINDS, WorkloadKind};
use crate::types::NamespaceRecord;

/// Annotation holding the RFC 3339 instant a namespace was found idle.
pub const IDLE_SINCE_ANNOTATION: &str = "syn.tools/clean";

pub const WORKLOAD_CHECKER_NAME: &str = "workloads";
pub const HELM_CHECKER_NAME: &str = "helm";

/// A rule answering "is this namespace still in use".
#[async_trait]
pub trait Checker: Send + Sync {
    fn name(&self) -> &str;

    async fn occupied(&self, namespace: &str) -> anyhow::Result<bool>;
}

/// Occupied while any object of any workload kind exists.
pub struct WorkloadChecker {
    lister: Arc<dyn ObjectLister>,
    kinds: &'static [WorkloadKind],
}

impl WorkloadChecker {
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        Self {
            lister,
            kinds: WORKLOAD_KINDS,
        }
    }
}

#[async_trait]
impl Checker for WorkloadChecker {
    fn name(&self) -> &str {
        WORKLOAD_CHECKER_NAME
    }

    async fn occupied(&self, namespace: &str) -> anyhow::Result<bool> {
        for kind in self.kinds {
            let objects = self.lister.list(namespace, kind, None).await?;
            if !objects.is_empty() {
                debug!("Namespace {} still has {} {}", namespace, objects.len(), kind);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Occupied while a Helm release is stored in the namespace.
///
/// Helm 3 keeps release state in secrets labelled `owner=helm`.
pub struct HelmChecker {
    lister: Arc<dyn ObjectLister>,
}

impl HelmChecker {
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        Self { lister }
    }
}

#[async_trait]
impl Checker for HelmChecker {
    fn name(&self) -> &str {
        HELM_CHECKER_NAME
    }

    async fn occupied(&self, namespace: &str) -> anyhow::Result<bool> {
        let releases = self.lister.list(namespace, &SECRET, Some("owner=helm")).await?;
        Ok(!releases.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eligibility {
    Eligible,
    NotEligible,
}

pub struct NamespaceService {
    checkers: Vec<Box<dyn Checker>>,
}

impl NamespaceService {
    /// Service with the default checker chain: workloads first, then Helm.
    pub fn new(lister: Arc<dyn ObjectLister>) -> Self {
        Self::with_checkers(vec![
            Box::new(WorkloadChecker::new(lister.clone())),
            Box::new(HelmChecker::new(lister)),
        ])
    }

    pub fn with_checkers(checkers: Vec<Box<dyn Checker>>) -> Self {
        Self { checkers }
    }

    /// Drop every checker registered under `name`.
    pub fn without_checker(mut self, name: &str) -> Self {
        self.checkers.retain(|c| c.name() != name);
        self
    }

    pub fn checker_names(&self) -> Vec<&str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    /// Namespaces idle for at least `delete_after` that no checker claims.
    ///
    /// A malformed annotation or a failing checker fails the whole batch.
    pub async fn get_empty_for(
        &self,
        namespaces: &[NamespaceRecord],
        delete_after: Duration,
    ) -> Result<Vec<NamespaceRecord>> {
        let now = Utc::now();
        let mut empty = Vec::new();
        for ns in namespaces {
            if self.evaluate(ns, delete_after, now).await? == Eligibility::Eligible {
                info!("Namespace {} is eligible for deletion", ns.name);
                empty.push(ns.clone());
            }
        }
        Ok(empty)
    }

    async fn evaluate(
        &self,
        ns: &NamespaceRecord,
        delete_after: Duration,
        now: DateTime<Utc>,
    ) -> Result<Eligibility> {
        let Some(value) = ns.idle_since.as_deref().filter(|v| !v.is_empty()) else {
            debug!("Namespace {} has no {} annotation", ns.name, IDLE_SINCE_ANNOTATION);
            return Ok(Eligibility::NotEligible);
        };

        let idle_since = DateTime::parse_from_rfc3339(value)
            .map_err(|source| Error::DataIntegrity {
                namespace: ns.name.clone(),
                value: value.to_string(),
                source,
            })?
            .with_timezone(&Utc);

        let Some(eligible_at) = idle_since.checked_add_signed(delete_after) else {
            debug!(
                "Namespace {} can never outlast a grace period of {}",
                ns.name, delete_after
            );
            return Ok(Eligibility::NotEligible);
        };
        if now < eligible_at {
            debug!("Namespace {} is not eligible before {}", ns.name, eligible_at);
            return Ok(Eligibility::NotEligible);
        }

        for checker in &self.checkers {
            let occupied = checker
                .occupied(&ns.name)
                .await
                .map_err(|source| Error::Checker {
                    checker: checker.name().to_string(),
                    namespace: ns.name.clone(),
                    source,
                })?;
            if occupied {
                debug!("Namespace {} is occupied according to {}", ns.name, checker.name());
                return Ok(Eligibility::NotEligible);
            }
        }
        Ok(Eligibility::Eligible)
    }
}
