use serde::{Deserialize, Serialize};

/// Configuration for the reservations module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservationsConfig {
    /// How many reservations the "upcoming" views return.
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: u64,
    /// Base URL of the notification service; None disables outgoing notifications.
    #[serde(default)]
    pub notifications_base_url: Option<String>,
    /// Administrator account created at startup when missing.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            upcoming_limit: default_upcoming_limit(),
            notifications_base_url: None,
            bootstrap_admin: None,
        }
    }
}

fn default_upcoming_limit() -> u64 {
    5
}
