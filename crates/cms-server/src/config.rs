//! Server configuration for the CMS.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `CMS_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default request body limit for uploads: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default session idle timeout: one day.
const DEFAULT_SESSION_IDLE_SECS: u64 = 24 * 60 * 60;

/// Default cap on stored sessions.
const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Directory holding `.md` / `.txt` documents.
    pub data_dir: PathBuf,
    /// Directory holding uploaded images.
    pub image_dir: PathBuf,
    /// YAML file mapping usernames to password hashes.
    pub users_file: PathBuf,
    /// Whether image routes and image listings are enabled.
    pub enable_images: bool,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
    /// Seconds a session may sit unused before it is dropped.
    pub session_idle_secs: u64,
    /// Upper bound on sessions held in memory.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4567)),
            data_dir: PathBuf::from("./data"),
            image_dir: PathBuf::from("./images"),
            users_file: PathBuf::from("./users.yml"),
            enable_images: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: "info".to_owned(),
            secure_cookies: false,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, on all interfaces
    /// - `CMS_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:4567`)
    /// - `CMS_DATA_DIR`: document directory (default: `./data`)
    /// - `CMS_IMAGE_DIR`: image directory (default: `./images`)
    /// - `CMS_USERS_FILE`: credential file (default: `./users.yml`)
    /// - `CMS_ENABLE_IMAGES`: serve image routes (default: `true`)
    /// - `CMS_MAX_UPLOAD_BYTES`: request body limit (default: 10 MiB)
    /// - `CMS_LOG_LEVEL`: log filter (default: `info`)
    /// - `CMS_SECURE_COOKIES`: mark the session cookie `Secure` (default: `false`)
    /// - `CMS_SESSION_IDLE_SECS`: drop sessions unused this long (default: one day)
    /// - `CMS_MAX_SESSIONS`: cap on stored sessions (default: 10000)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Unset or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Priority: CMS_BIND_ADDR > PORT > default 127.0.0.1:4567
        let bind_addr = if let Some(addr) = lookup("CMS_BIND_ADDR") {
            addr.parse().unwrap_or(defaults.bind_addr)
        } else if let Some(port) = lookup("PORT") {
            port.parse::<u16>()
                .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
                .unwrap_or(defaults.bind_addr)
        } else {
            defaults.bind_addr
        };

        let data_dir = lookup("CMS_DATA_DIR").map_or(defaults.data_dir, PathBuf::from);
        let image_dir = lookup("CMS_IMAGE_DIR").map_or(defaults.image_dir, PathBuf::from);
        let users_file = lookup("CMS_USERS_FILE").map_or(defaults.users_file, PathBuf::from);

        let enable_images = lookup("CMS_ENABLE_IMAGES")
            .map_or(defaults.enable_images, |v| v != "false" && v != "0");

        let max_upload_bytes = lookup("CMS_MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        let log_level = lookup("CMS_LOG_LEVEL").unwrap_or(defaults.log_level);

        let secure_cookies = lookup("CMS_SECURE_COOKIES")
            .is_some_and(|v| v == "true" || v == "1");

        let session_idle_secs = lookup("CMS_SESSION_IDLE_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.session_idle_secs);

        let max_sessions = lookup("CMS_MAX_SESSIONS")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_sessions);

        Self {
            bind_addr,
            data_dir,
            image_dir,
            users_file,
            enable_images,
            max_upload_bytes,
            log_level,
            secure_cookies,
            session_idle_secs,
            max_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([127, 0, 0, 1], 4567)));
        assert_eq!(cfg.data_dir, PathBuf::from("./data"));
        assert!(cfg.enable_images);
        assert!(!cfg.secure_cookies);
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn bind_addr_overrides_port() {
        let cfg = config(&[("PORT", "8080"), ("CMS_BIND_ADDR", "127.0.0.1:9000")]);
        assert_eq!(cfg.bind_addr.port(), 9000);

        let cfg = config(&[("PORT", "8080")]);
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn garbage_values_fall_back() {
        let cfg = config(&[("PORT", "eighty"), ("CMS_MAX_UPLOAD_BYTES", "lots")]);
        assert_eq!(cfg.bind_addr.port(), 4567);
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn images_can_be_disabled() {
        assert!(!config(&[("CMS_ENABLE_IMAGES", "false")]).enable_images);
        assert!(!config(&[("CMS_ENABLE_IMAGES", "0")]).enable_images);
        assert!(config(&[("CMS_ENABLE_IMAGES", "yes")]).enable_images);
    }

    #[test]
    fn session_limits() {
        let cfg = config(&[("CMS_SESSION_IDLE_SECS", "600"), ("CMS_MAX_SESSIONS", "50")]);
        assert_eq!(cfg.session_idle_secs, 600);
        assert_eq!(cfg.max_sessions, 50);

        let cfg = config(&[("CMS_MAX_SESSIONS", "0")]);
        assert_eq!(cfg.max_sessions, 10_000);
    }

    #[test]
    fn directories_come_from_env() {
        let cfg = config(&[
            ("CMS_DATA_DIR", "/srv/cms/data"),
            ("CMS_IMAGE_DIR", "/srv/cms/images"),
            ("CMS_USERS_FILE", "/srv/cms/users.yml"),
        ]);
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/cms/data"));
        assert_eq!(cfg.image_dir, PathBuf::from("/srv/cms/images"));
        assert_eq!(cfg.users_file, PathBuf::from("/srv/cms/users.yml"));
    }
}
