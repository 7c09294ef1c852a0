use std::env;

/// Process configuration, resolved once at startup from environment
/// variables (with `.env` loaded by the binaries beforehand) and passed
/// explicitly to the components that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: String,
    pub jellyfin: JellyfinConfig,
    pub admin: AdminConfig,
    pub auto_playback: AutoPlayback,
}

#[derive(Debug, Clone)]
pub struct JellyfinConfig {
    pub url: String,
    pub api_key: String,
}

/// Credentials for the HTTP Basic admin surface (tape mutations).
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// Controls the automatic session selection strategy used when a scan
/// arrives without an explicit playback target.
#[derive(Debug, Clone)]
pub struct AutoPlayback {
    pub enabled: bool,
    pub default_user_id: Option<String>,
    pub auto_select_session: bool,
}

impl AutoPlayback {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            default_user_id: None,
            auto_select_session: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("DB_PATH").unwrap_or_else(|_| "./vhs_nfc.db".to_string()),
            jellyfin: JellyfinConfig {
                url: env::var("JELLYFIN_URL")
                    .unwrap_or_else(|_| "http://localhost:8096".to_string()),
                api_key: env::var("JELLYFIN_API_KEY").unwrap_or_default(),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
            },
            auto_playback: AutoPlayback {
                enabled: env_flag("AUTO_PLAYBACK_ENABLED"),
                default_user_id: env::var("DEFAULT_USER_ID").ok().filter(|v| !v.is_empty()),
                auto_select_session: env_flag("AUTO_SELECT_SESSION"),
            },
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("true") | Ok("1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_flag_accepts_true_and_one() {
        env::set_var("VHS_TAP_TEST_FLAG_A", "true");
        env::set_var("VHS_TAP_TEST_FLAG_B", "1");
        env::set_var("VHS_TAP_TEST_FLAG_C", "yes");
        assert!(env_flag("VHS_TAP_TEST_FLAG_A"));
        assert!(env_flag("VHS_TAP_TEST_FLAG_B"));
        assert!(!env_flag("VHS_TAP_TEST_FLAG_C"));
        assert!(!env_flag("VHS_TAP_TEST_FLAG_UNSET"));
    }

    #[test]
    fn disabled_auto_playback_has_no_target() {
        let auto = AutoPlayback::disabled();
        assert!(!auto.enabled);
        assert!(!auto.auto_select_session);
        assert!(auto.default_user_id.is_none());
    }
}
