use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamConfigError {
    #[error("exam duration must be > 0 minutes")]
    ZeroDuration,

    #[error("autosave interval must be > 0 seconds")]
    ZeroAutosaveInterval,
}

/// Tunable session parameters.
///
/// The autosave cadence is deliberately a knob rather than a constant: losing
/// up to one interval of interaction on a hard crash is the accepted
/// trade-off, and deployments can tighten or relax it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamConfig {
    duration_minutes: u32,
    autosave_secs: u64,
}

impl ExamConfig {
    pub const DEFAULT_DURATION_MINUTES: u32 = 30;
    pub const DEFAULT_AUTOSAVE_SECS: u64 = 2;

    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ExamConfigError` for a zero duration or autosave interval.
    pub fn new(duration_minutes: u32, autosave_secs: u64) -> Result<Self, ExamConfigError> {
        if duration_minutes == 0 {
            return Err(ExamConfigError::ZeroDuration);
        }
        if autosave_secs == 0 {
            return Err(ExamConfigError::ZeroAutosaveInterval);
        }
        Ok(Self {
            duration_minutes,
            autosave_secs,
        })
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes * 60
    }

    #[must_use]
    pub fn autosave_secs(&self) -> u64 {
        self.autosave_secs
    }
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_minutes: Self::DEFAULT_DURATION_MINUTES,
            autosave_secs: Self::DEFAULT_AUTOSAVE_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ExamConfig::default();
        assert_eq!(config.duration_secs(), 1800);
        assert_eq!(config.autosave_secs(), 2);
    }

    #[test]
    fn zero_values_are_rejected() {
        assert_eq!(
            ExamConfig::new(0, 2).unwrap_err(),
            ExamConfigError::ZeroDuration
        );
        assert_eq!(
            ExamConfig::new(30, 0).unwrap_err(),
            ExamConfigError::ZeroAutosaveInterval
        );
    }
}
