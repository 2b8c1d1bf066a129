use chrono::{DateTime, Duration, Utc};

/// Per-file state kept by a host that stays alive across plays.
///
/// An update fires at most once per file session, and never twice within
/// the cooldown even when the host resets the session (seeking back past
/// the trigger point, reloading the file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub triggered: bool,
    pub last_check_time: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_run(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        if self.triggered {
            return false;
        }
        self.last_check_time.map_or(true, |last| now - last >= cooldown)
    }

    pub fn mark_checked(&mut self, now: DateTime<Utc>) {
        self.triggered = true;
        self.last_check_time = Some(now);
    }

    /// A new file started. The cooldown still applies.
    pub fn reset(&mut self) {
        self.triggered = false;
    }
}
