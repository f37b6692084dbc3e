//! Shared UI icons.
//!
//! Each icon falls back to a plain-text tag on terminals without emoji.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Section headers
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "-> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");
