use std::str::FromStr;
use std::time::Duration;

/// Stream API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Per-room side channel buffer. Receivers further behind than this skip
    /// messages.
    pub room_channel_capacity: usize,
    /// Tuning for the tip notification pipeline.
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unparsable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 4100),
            room_channel_capacity: env_or("ROOM_CHANNEL_CAPACITY", 256),
            notifications: NotificationConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4100,
            room_channel_capacity: 256,
            notifications: NotificationConfig::default(),
        }
    }
}

/// Thresholds, queue caps and display timings for tip notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Amount at or above which a tip gets the full-screen overlay.
    pub large_tip_threshold: f64,
    /// Amount at or above which a tip gets the mega treatment.
    pub mega_tip_threshold: f64,
    /// Max events waiting behind the active notification.
    pub max_pending: usize,
    /// Max overlay candidates waiting behind the current overlay.
    pub max_overlay_queue: usize,
    /// Max dedup keys remembered per session.
    pub processed_cap: usize,
    pub cleanup_interval: Duration,
    pub enter_duration: Duration,
    pub gift_enter_duration: Duration,
    pub display_duration: Duration,
    pub gift_display_duration: Duration,
    pub exit_duration: Duration,
    /// Max entries kept in the chat tip log.
    pub max_chat_notifications: usize,
    /// Chat log entries older than this are pruned.
    pub chat_retention: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            large_tip_threshold: 50.0,
            mega_tip_threshold: 200.0,
            max_pending: 5,
            max_overlay_queue: 3,
            processed_cap: 1000,
            cleanup_interval: Duration::from_secs(5 * 60),
            enter_duration: Duration::from_millis(500),
            gift_enter_duration: Duration::from_millis(300),
            display_duration: Duration::from_millis(3000),
            gift_display_duration: Duration::from_millis(4000),
            exit_duration: Duration::from_millis(500),
            max_chat_notifications: 5,
            chat_retention: Duration::from_secs(60 * 60),
        }
    }
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            large_tip_threshold: env_or("TIP_LARGE_THRESHOLD", defaults.large_tip_threshold),
            mega_tip_threshold: env_or("TIP_MEGA_THRESHOLD", defaults.mega_tip_threshold),
            max_pending: env_or("TIP_MAX_PENDING", defaults.max_pending),
            max_overlay_queue: env_or("TIP_MAX_OVERLAY_QUEUE", defaults.max_overlay_queue),
            processed_cap: env_or("TIP_PROCESSED_CAP", defaults.processed_cap),
            cleanup_interval: std::env::var("TIP_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            ..defaults
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
