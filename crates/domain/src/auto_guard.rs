use serde::{Deserialize, Serialize};

/// Hours during which automated messages may be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendingWindow {
    /// IANA timezone the hours refer to.
    pub timezone: String,
    /// Allowed weekdays, 1 = Monday through 7 = Sunday.
    pub allowed_weekdays: Vec<u8>,
    /// First allowed hour, inclusive.
    pub start_hour: u8,
    /// Last allowed hour, exclusive.
    pub end_hour: u8,
}

/// Volume limits applied to automated messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimits {
    /// Messages per hour across all contacts.
    pub max_per_hour: u32,
    /// Messages per day across all contacts.
    pub max_per_day: u32,
    /// Messages per contact per day.
    pub max_per_contact_per_day: u32,
    /// Minimum delay between two messages to one contact.
    pub min_interval_minutes: u32,
}

/// Guard policy displayed by the panel.
///
/// The engine owns enforcement; these values are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoGuardConfig {
    /// Whether the guard is switched on.
    pub enabled: bool,
    /// Allowed sending hours.
    pub sending_window: SendingWindow,
    /// Volume limits.
    pub rate_limits: RateLimits,
}

impl AutoGuardConfig {
    /// Returns the fixed placeholder policy shown until the engine exposes one.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            enabled: true,
            sending_window: SendingWindow {
                timezone: "Europe/Paris".to_owned(),
                allowed_weekdays: vec![1, 2, 3, 4, 5, 6],
                start_hour: 9,
                end_hour: 20,
            },
            rate_limits: RateLimits {
                max_per_hour: 50,
                max_per_day: 300,
                max_per_contact_per_day: 2,
                min_interval_minutes: 120,
            },
        }
    }
}
