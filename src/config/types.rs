use serde::{Deserialize, Serialize};

use crate::navigation::{NavigationMapping, DEFAULT_IMPLICIT_PREFIX};
use crate::state::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS};
use crate::url::UrlEncoding;
use crate::view::{DEFAULT_REDIRECT_PREFIX, DEFAULT_TEMPLATE_PREFIX, DEFAULT_TEMPLATE_SUFFIX};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub views: ViewsConfig,
    #[serde(default)]
    pub urls: UrlConfig,
    #[serde(default)]
    pub view_state: ViewStateConfig,
}

/// HTTP front settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the server (host:port).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Prefix of context relative URLs (e.g. "/app"). Empty for the root.
    #[serde(default)]
    pub context_path: String,
}

/// Navigation outcome resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Prefix marking an outcome as an implicit destination (default: "mvc:").
    #[serde(default = "default_implicit_prefix")]
    pub implicit_prefix: String,
    /// Explicit outcome → destination mappings.
    #[serde(default)]
    pub mappings: Vec<NavigationMapping>,
}

/// Destination resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// Prefix marking a destination as a redirect (default: "redirect:").
    #[serde(default = "default_redirect_prefix")]
    pub redirect_prefix: String,
    /// Prepended to destinations to form template paths.
    #[serde(default = "default_template_prefix")]
    pub template_prefix: String,
    /// Appended to destinations to form template paths.
    #[serde(default = "default_template_suffix")]
    pub template_suffix: String,
    /// Destinations bound to a fixed template.
    #[serde(default)]
    pub named: Vec<NamedView>,
}

/// A named destination and the template it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedView {
    pub name: String,
    pub template: String,
}

/// Bookmarkable URL settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlConfig {
    /// "none" (default) inserts values verbatim, "percent" escapes them.
    #[serde(default)]
    pub encoding: UrlEncoding,
}

/// Limits on the per-session keys sealing view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStateConfig {
    /// Most sessions holding a key at once; the least recently used is
    /// evicted beyond this (default: 10000).
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Seconds a session may stay idle before its key is dropped
    /// (default: 1800).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_implicit_prefix() -> String {
    DEFAULT_IMPLICIT_PREFIX.to_string()
}

fn default_redirect_prefix() -> String {
    DEFAULT_REDIRECT_PREFIX.to_string()
}

fn default_template_prefix() -> String {
    DEFAULT_TEMPLATE_PREFIX.to_string()
}

fn default_template_suffix() -> String {
    DEFAULT_TEMPLATE_SUFFIX.to_string()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            context_path: String::new(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            implicit_prefix: default_implicit_prefix(),
            mappings: Vec::new(),
        }
    }
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            redirect_prefix: default_redirect_prefix(),
            template_prefix: default_template_prefix(),
            template_suffix: default_template_suffix(),
            named: Vec::new(),
        }
    }
}

impl Default for ViewStateConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}
