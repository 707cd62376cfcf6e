// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palaver context subsystem.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Per-model context-size limits and estimation methods are NOT configured
//! here -- they are supplied by the model-provider adapter.

use serde::{Deserialize, Serialize};

/// Top-level Palaver configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalaverConfig {
    /// Hot cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// System of record settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Context window assembly settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Bot mention resolution settings.
    #[serde(default)]
    pub mentions: MentionConfig,
}

/// Hot cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// TTL for cached bot profiles, in seconds. Staleness within this
    /// window is acceptable; profiles are never explicitly invalidated.
    #[serde(default = "default_bot_profile_ttl_secs")]
    pub bot_profile_ttl_secs: u64,

    /// Timeout applied to every individual cache and gateway call, in
    /// milliseconds. A timed-out cache call degrades to a miss.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            bot_profile_ttl_secs: default_bot_profile_ttl_secs(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

fn default_bot_profile_ttl_secs() -> u64 {
    86_400 // 24 hours
}

fn default_op_timeout_ms() -> u64 {
    250
}

/// System of record configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("palaver").join("palaver.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("palaver.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Context window assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Language assumed for a task message when the caller supplies no
    /// preference list.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Hard bound on backward-walk hops, independent of the token budget.
    /// Defense against accidental cycles in source data.
    #[serde(default = "default_max_walk_hops")]
    pub max_walk_hops: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            max_walk_hops: default_max_walk_hops(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_walk_hops() -> u32 {
    512
}

/// Bot mention resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MentionConfig {
    /// This application's own site URL. Mention links must share its
    /// origin; links to other origins are never treated as mentions.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
        }
    }
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}
