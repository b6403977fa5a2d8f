use async_trait::async_trait;
use serde_json::Value;

/// Permission decision result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny(String),
    RequireApproval(String),
}

/// Permission request for one action, built after validation.
#[derive(Debug, Clone)]
pub struct PermissionRequest {
    pub request_id: String,
    pub action: String,
    pub input: Value,
}

/// Consulted by the dispatcher before anything reaches the device.
#[async_trait]
pub trait ActionGuard: Send + Sync {
    async fn check(&self, request: &PermissionRequest) -> PermissionDecision;
}

/// Guard that lets every action through.
pub struct AllowAll;

#[async_trait]
impl ActionGuard for AllowAll {
    async fn check(&self, _request: &PermissionRequest) -> PermissionDecision {
        PermissionDecision::Allow
    }
}

/// Asks a human whether a flagged action may run.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, action: &str, input: &Value) -> bool;
}

pub const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "delete",
    "remove",
    "sudo",
    "admin",
    "payment",
    "transfer",
    "credentials",
];

/// Guard that requires confirmation for actions mentioning sensitive terms.
pub struct SensitiveActionGuard<C> {
    patterns: Vec<String>,
    confirmer: C,
}

impl<C: Confirmer> SensitiveActionGuard<C> {
    pub fn new(confirmer: C) -> Self {
        Self {
            patterns: SENSITIVE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            confirmer,
        }
    }

    pub fn with_patterns(confirmer: C, patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().map(|p| p.to_lowercase()).collect(),
            confirmer,
        }
    }

    pub fn is_sensitive(&self, action: &str, input: &Value) -> bool {
        let haystack = format!("{action}: {input}").to_lowercase();
        self.patterns.iter().any(|p| haystack.contains(p.as_str()))
    }
}

#[async_trait]
impl<C: Confirmer> ActionGuard for SensitiveActionGuard<C> {
    async fn check(&self, request: &PermissionRequest) -> PermissionDecision {
        if !self.is_sensitive(&request.action, &request.input) {
            return PermissionDecision::Allow;
        }
        if self.confirmer.confirm(&request.action, &request.input).await {
            PermissionDecision::Allow
        } else {
            PermissionDecision::Deny(format!(
                "sensitive action '{}' was not confirmed",
                request.action
            ))
        }
    }
}
