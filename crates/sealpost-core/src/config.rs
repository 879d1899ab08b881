//! Forwarding gate configuration and configuration errors.

use sealpost_proto::MessageCategory;
use thiserror::Error;

/// Invalid or missing configuration. Never echoes secret values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A TTL is zero or exceeds the 24 h bound.
    #[error("dedup TTL for {category} is out of bounds")]
    TtlOutOfBounds {
        /// Category whose TTL is invalid.
        category: MessageCategory,
    },

    /// Key material has the wrong shape (length, encoding, or equal keys).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(&'static str),

    /// Quiet-hours window with an hour outside `0..24`.
    #[error("hour window values must be below 24")]
    InvalidHourWindow,

    /// Replay freshness window of zero seconds.
    #[error("replay window must be at least one second")]
    InvalidReplayWindow,

    /// A required setting is absent from the environment.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// A setting is present but unparseable.
    #[error("invalid value for setting: {0}")]
    InvalidSetting(&'static str),
}

/// Hour-of-day window (UTC) during which forwarding is active.
///
/// `start_hour == end_hour` means the window covers the full day.
/// Windows may wrap midnight: `{ start_hour: 22, end_hour: 6 }` is active
/// from 22:00 through 05:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    /// First active hour, inclusive.
    pub start_hour: u8,
    /// First inactive hour (exclusive bound).
    pub end_hour: u8,
}

impl HourWindow {
    /// True when `hour` falls inside the window.
    #[must_use]
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour == self.end_hour {
            return true;
        }
        if self.start_hour < self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::InvalidHourWindow`] when either bound is >= 24.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_hour >= 24 || self.end_hour >= 24 {
            return Err(ConfigError::InvalidHourWindow);
        }
        Ok(())
    }
}

/// Device-side forwarding gates.
///
/// Gates decide whether a captured message leaves the device at all, so
/// they run before any network activity. Evaluation order is fixed:
/// global switch, sender allowlist, hour window, category switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Global forwarding switch.
    pub enabled: bool,
    /// Accepted sender identifiers, matched case-insensitively.
    /// Empty means every sender is accepted.
    pub allowlist: Vec<String>,
    /// Active-hours window; `None` means always active.
    pub hours: Option<HourWindow>,
    /// When set, the hour window is bypassed (user pressed "send now").
    pub manual_override: bool,
    /// Categories the user switched off.
    pub disabled_categories: Vec<MessageCategory>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowlist: Vec::new(),
            hours: None,
            manual_override: false,
            disabled_categories: Vec::new(),
        }
    }
}

impl GateConfig {
    /// True when `sender` passes the allowlist.
    #[must_use]
    pub fn sender_allowed(&self, sender: &str) -> bool {
        if self.allowlist.is_empty() {
            return true;
        }
        self.allowlist.iter().any(|entry| entry.eq_ignore_ascii_case(sender))
    }

    /// True when forwarding is active at `now_unix` (UTC hours), taking
    /// the manual override into account.
    #[must_use]
    pub fn within_window(&self, now_unix: u64) -> bool {
        if self.manual_override {
            return true;
        }
        match self.hours {
            None => true,
            Some(window) => {
                let hour = ((now_unix / 3600) % 24) as u8;
                window.contains(hour)
            },
        }
    }

    /// True unless the user disabled `category`.
    #[must_use]
    pub fn category_enabled(&self, category: MessageCategory) -> bool {
        !self.disabled_categories.contains(&category)
    }

    /// # Errors
    ///
    /// Propagates [`HourWindow::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(window) = self.hours {
            window.validate()?;
        }
        Ok(())
    }
}
