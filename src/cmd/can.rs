//! Permission check against the stored session (`adminhub can`).

use anyhow::Result;

use adminhub::auth::{MatchMode, PermissionKind};
use adminhub::ui::icons::{CHECK, CROSS};

use super::{App, Reported};

/// Prints the verdict and exits non-zero when access is denied.
pub fn cmd_can(app: &App, required: &[String], kind: &str, mode: &str) -> Result<()> {
    let kind: PermissionKind = kind.parse()?;
    let mode: MatchMode = mode.parse()?;

    let allowed = app.session.has_access(required, kind, mode);
    let subject = match app.session.user() {
        Some(user) => user.email,
        None => "anonymous".to_string(),
    };
    let wanted = if required.is_empty() {
        "nothing".to_string()
    } else {
        format!("{} {}: {}", mode, kind, required.join(", "))
    };

    if allowed {
        println!("{}{} has access ({})", CHECK, subject, wanted);
        Ok(())
    } else {
        println!("{}{} lacks access ({})", CROSS, subject, wanted);
        Err(Reported("access denied".to_string()).into())
    }
}
