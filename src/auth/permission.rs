//! Role, policy and module checks against the signed-in user.

use std::fmt;
use std::str::FromStr;

use super::session::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionKind {
    Role,
    #[default]
    Policy,
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

impl FromStr for PermissionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "role" | "roles" => Ok(PermissionKind::Role),
            "policy" | "policies" => Ok(PermissionKind::Policy),
            "module" | "modules" => Ok(PermissionKind::Module),
            other => anyhow::bail!("Unknown permission kind '{}' (expected role, policy or module)", other),
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionKind::Role => write!(f, "role"),
            PermissionKind::Policy => write!(f, "policy"),
            PermissionKind::Module => write!(f, "module"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(MatchMode::Any),
            "all" => Ok(MatchMode::All),
            other => anyhow::bail!("Unknown match mode '{}' (expected any or all)", other),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Any => write!(f, "any"),
            MatchMode::All => write!(f, "all"),
        }
    }
}

impl UserProfile {
    pub fn grants(&self, kind: PermissionKind) -> &[String] {
        match kind {
            PermissionKind::Role => &self.roles,
            PermissionKind::Policy => &self.policies,
            PermissionKind::Module => &self.modules,
        }
    }
}

/// Whether `user` satisfies `required`.
///
/// An empty requirement always passes, even without a session. Otherwise
/// an absent user fails. Names compare case-sensitively.
pub fn has_access<S: AsRef<str>>(
    user: Option<&UserProfile>,
    required: &[S],
    kind: PermissionKind,
    mode: MatchMode,
) -> bool {
    if required.is_empty() {
        return true;
    }
    let Some(user) = user else {
        return false;
    };
    let granted = user.grants(kind);
    let held = |name: &S| granted.iter().any(|g| g == name.as_ref());
    match mode {
        MatchMode::Any => required.iter().any(held),
        MatchMode::All => required.iter().all(held),
    }
}
