//! Session context, permission checks and authentication flows.

pub mod permission;
pub mod service;
pub mod session;

pub use permission::{MatchMode, PermissionKind, has_access};
pub use service::{AuthService, LoginRequest, RegisterRequest};
pub use session::{LoginProfile, SessionContext, USER_DATA_KEY, UserProfile};
