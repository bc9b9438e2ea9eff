//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Gateway Defaults
// =============================================================================

pub fn default_address() -> String {
    "irc.chat.twitch.tv:6667".to_string()
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_dispatch_delay_ms() -> u64 {
    500
}

pub fn default_interject_threshold() -> u64 {
    crate::store::DEFAULT_THRESHOLD
}

pub fn default_audit_list() -> String {
    "audited_by_gnu".to_string()
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_storage_path() -> String {
    "db/gnubot.redb".to_string()
}
