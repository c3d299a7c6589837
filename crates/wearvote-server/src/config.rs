use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, warn};

use wearvote_sim::Schedule;
use wearvote_types::models::UserId;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
    /// Demo user that receives synthetic interactions and messages.
    pub primary_user: UserId,
    pub auto_reply: bool,
    pub max_upload_bytes: usize,
    pub schedule: Schedule,
}

impl Config {
    pub fn load() -> Self {
        Self {
            host: try_load("WEARVOTE_HOST", "0.0.0.0".to_string()),
            port: try_load("WEARVOTE_PORT", 3000),
            db_path: try_load("WEARVOTE_DB_PATH", PathBuf::from("db.json")),
            uploads_dir: try_load("WEARVOTE_UPLOADS_DIR", PathBuf::from("./public/uploads")),
            primary_user: try_load("WEARVOTE_PRIMARY_USER", 1),
            auto_reply: try_load("WEARVOTE_AUTO_REPLY", true),
            max_upload_bytes: try_load::<usize>("WEARVOTE_MAX_UPLOAD_MB", 50).saturating_mul(1024 * 1024),
            schedule: Schedule {
                startup_delay: secs("WEARVOTE_STARTUP_DELAY_SECS", 2),
                post_interval: secs("WEARVOTE_POST_INTERVAL_SECS", 600),
                post_batch: try_load("WEARVOTE_POST_BATCH", 4),
                interaction_interval: secs("WEARVOTE_INTERACTION_INTERVAL_SECS", 360),
                interaction_batch: try_load("WEARVOTE_INTERACTION_BATCH", 3),
                message_interval: secs("WEARVOTE_MESSAGE_INTERVAL_SECS", 900),
                message_batch: try_load("WEARVOTE_MESSAGE_BATCH", 2),
                cleanup_interval: secs("WEARVOTE_CLEANUP_INTERVAL_SECS", 3600),
            },
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    parse_or(key, env::var(key).ok(), default)
}

/// Periods of zero would make `tokio::time::interval` panic.
fn secs(key: &str, default: u64) -> Duration {
    let value: u64 = try_load(key, default);
    if value == 0 && !key.ends_with("STARTUP_DELAY_SECS") {
        warn!("{key} must be positive, using default: {default}");
        return Duration::from_secs(default);
    }
    Duration::from_secs(value)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = raw else {
        debug!("{key} not set, using default");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_invalid_values_fall_back() {
        assert_eq!(parse_or("WEARVOTE_PORT", None, 3000u16), 3000);
        assert_eq!(parse_or("WEARVOTE_PORT", Some("8080".into()), 3000u16), 8080);
        assert_eq!(parse_or("WEARVOTE_PORT", Some("eighty".into()), 3000u16), 3000);
        assert_eq!(parse_or("WEARVOTE_PORT", Some("70000".into()), 3000u16), 3000);
    }

    #[test]
    fn flags_and_paths_parse() {
        assert!(!parse_or("WEARVOTE_AUTO_REPLY", Some(" false ".into()), true));
        assert!(parse_or("WEARVOTE_AUTO_REPLY", Some("nope".into()), true));
        assert_eq!(
            parse_or("WEARVOTE_DB_PATH", Some("/var/lib/wearvote/db.json".into()), PathBuf::from("db.json")),
            PathBuf::from("/var/lib/wearvote/db.json")
        );
    }
}
