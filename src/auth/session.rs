//! The signed-in user, held as an explicit application context.
//!
//! The profile is mirrored into a durable store under [`USER_DATA_KEY`] so a
//! later run starts authenticated. The backend token never reaches the
//! store; the session itself rides on the HTTP-only cookie.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::permission::{self, MatchMode, PermissionKind};
use crate::state::KeyValueStore;

pub const USER_DATA_KEY: &str = "user_data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, alias = "polices")]
    pub policies: Vec<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Login and callback payload. Some backend versions spell the policy list
/// `polices`; both spellings are read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub policies: Option<Vec<String>>,
    #[serde(default)]
    pub polices: Option<Vec<String>>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl From<LoginProfile> for UserProfile {
    fn from(login: LoginProfile) -> Self {
        Self {
            name: login.name,
            email: login.email,
            modules: login.modules,
            roles: login.roles,
            policies: login.policies.or(login.polices).unwrap_or_default(),
            tenant_id: login.tenant_id,
        }
    }
}

pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    user: watch::Sender<Option<UserProfile>>,
}

impl SessionContext {
    /// A signed-out context over `store`, ignoring anything it holds.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (user, _rx) = watch::channel(None);
        Self { store, user }
    }

    /// Rebuild the context from `store`. Unreadable user data is removed.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let context = Self::new(store);
        let raw = match context.store.get(USER_DATA_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "could not read stored user data");
                None
            }
        };
        if let Some(raw) = raw {
            match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => {
                    debug!(email = %profile.email, "restored session");
                    context.user.send_replace(Some(profile));
                }
                Err(e) => {
                    warn!(error = %e, "discarding malformed user data");
                    context.clear_store();
                }
            }
        }
        context
    }

    pub fn establish(&self, profile: UserProfile) {
        match serde_json::to_string(&profile) {
            Ok(json) => {
                if let Err(e) = self.store.set(USER_DATA_KEY, &json) {
                    warn!(error = %e, "could not persist user data");
                }
            }
            Err(e) => warn!(error = %e, "could not encode user data"),
        }
        self.user.send_replace(Some(profile));
    }

    pub fn end(&self) {
        self.clear_store();
        self.user.send_replace(None);
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.user.subscribe()
    }

    pub fn has_access<S: AsRef<str>>(&self, required: &[S], kind: PermissionKind, mode: MatchMode) -> bool {
        permission::has_access(self.user.borrow().as_ref(), required, kind, mode)
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.remove(USER_DATA_KEY) {
            warn!(error = %e, "could not remove stored user data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;
    use serde_json::json;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            modules: vec![],
            roles: vec!["Admin".into()],
            policies: vec!["users.read".into()],
            tenant_id: Some("t1".into()),
        }
    }

    #[test]
    fn login_profile_reads_either_policy_spelling_and_drops_token() {
        let legacy: LoginProfile = serde_json::from_value(json!({
            "name": "Ana", "email": "a@x", "polices": ["p1"], "token": "secret"
        }))
        .unwrap();
        let user = UserProfile::from(legacy);
        assert_eq!(user.policies, vec!["p1"]);
        assert!(!serde_json::to_string(&user).unwrap().contains("secret"));

        let both: LoginProfile = serde_json::from_value(json!({
            "name": "Ana", "email": "a@x", "policies": ["new"], "polices": ["old"]
        }))
        .unwrap();
        assert_eq!(UserProfile::from(both).policies, vec!["new"]);
    }

    #[test]
    fn establish_persists_and_restore_reads_back() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionContext::new(store.clone());
        session.establish(profile());
        assert!(session.is_authenticated());

        let restored = SessionContext::restore(store);
        assert_eq!(restored.user(), Some(profile()));
    }

    #[test]
    fn malformed_user_data_is_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_DATA_KEY, "{broken").unwrap();
        let session = SessionContext::restore(store.clone());
        assert!(!session.is_authenticated());
        assert_eq!(store.get(USER_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn end_clears_store_and_notifies_subscribers() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionContext::new(store.clone());
        session.establish(profile());
        let mut rx = session.subscribe();

        session.end();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
        assert_eq!(store.get(USER_DATA_KEY).unwrap(), None);
    }

    #[test]
    fn has_access_follows_current_user() {
        let session = SessionContext::new(Arc::new(MemoryStore::new()));
        assert!(!session.has_access(&["Admin"], PermissionKind::Role, MatchMode::Any));
        session.establish(profile());
        assert!(session.has_access(&["Admin"], PermissionKind::Role, MatchMode::Any));
    }
}
