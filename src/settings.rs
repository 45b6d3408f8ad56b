use hifitime::prelude::Duration;

use crate::report::display::DisplayGeometry;

/// Shortest reporting interval we accept
pub const MIN_INTERVAL_MS: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Reporting interval
    pub interval: Duration,

    /// Only report once a location is resolved
    pub require_fix: bool,

    /// Character display geometry
    pub display: DisplayGeometry,

    /// Hardware identifier, used in the session identifier
    pub hardware_id: String,

    /// Report as JSON lines rather than a text table
    pub json: bool,

    /// Remote telemetry, when enabled
    #[cfg(feature = "upload")]
    pub upload: Option<UploadSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: Duration::from_milliseconds(2000.0),
            require_fix: false,
            display: Default::default(),
            hardware_id: "gnss-logger".to_string(),
            json: false,
            #[cfg(feature = "upload")]
            upload: None,
        }
    }
}

impl Settings {
    /// Reporting interval, as [std::time::Duration]
    pub fn std_interval(&self) -> std::time::Duration {
        let nanos = self.interval.total_nanoseconds().max(0) as u64;
        std::time::Duration::from_nanos(nanos)
    }
}

#[cfg(feature = "upload")]
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Endpoint
    pub url: String,

    /// Request timeout
    pub timeout: std::time::Duration,
}

#[cfg(test)]
mod test {
    use super::Settings;
    use std::time::Duration;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.std_interval(), Duration::from_millis(2000));
        assert_eq!(settings.display.cols, 16);
        assert_eq!(settings.display.rows, 2);
        assert!(!settings.require_fix);
        assert!(!settings.json);
    }
}
