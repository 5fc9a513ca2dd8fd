//! Operating modes of the MS430.
//!
//! After power-up or reset the board is in standby. From there it either measures
//! autonomously on a fixed period (cycle mode) or once per command (on-demand).
//! Air quality data require cycle mode, since the gas sensor self-calibrates only
//! under continuous operation.

use std::time::Duration;

use crate::error::ProtocolError;

/// Period between measurements in cycle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CyclePeriod {
    /// A measurement every 3 seconds.
    #[cfg_attr(feature = "serde", serde(rename = "3s"))]
    Seconds3,
    /// A measurement every 100 seconds.
    #[cfg_attr(feature = "serde", serde(rename = "100s"))]
    Seconds100,
    /// A measurement every 300 seconds.
    #[cfg_attr(feature = "serde", serde(rename = "300s"))]
    Seconds300,
}

impl CyclePeriod {
    /// Time between new data releases.
    pub fn duration(self) -> Duration {
        match self {
            CyclePeriod::Seconds3 => Duration::from_secs(3),
            CyclePeriod::Seconds100 => Duration::from_secs(100),
            CyclePeriod::Seconds300 => Duration::from_secs(300),
        }
    }
}

impl From<CyclePeriod> for u8 {
    fn from(value: CyclePeriod) -> Self {
        match value {
            CyclePeriod::Seconds3 => 0,
            CyclePeriod::Seconds100 => 1,
            CyclePeriod::Seconds300 => 2,
        }
    }
}

impl TryFrom<u8> for CyclePeriod {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CyclePeriod::Seconds3),
            1 => Ok(CyclePeriod::Seconds100),
            2 => Ok(CyclePeriod::Seconds300),
            _ => Err(ProtocolError::UnsupportedConfiguration {
                setting: "cycle period",
                value,
            }),
        }
    }
}

impl std::fmt::Display for CyclePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.duration().as_secs())
    }
}

/// The driver's view of the board's mode.
///
/// On-demand is not a separate mode on the board itself (the board idles in standby
/// between triggered measurements) but it is tracked separately so that each
/// operation can check what it needs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    /// Idle, no measurements are made.
    #[default]
    Standby,
    /// Autonomous measurement with the given period.
    Cycle(CyclePeriod),
    /// Single measurements triggered by the host.
    OnDemand,
}

impl DeviceMode {
    /// True if the ready line will signal new data in this mode.
    pub fn releases_data(self) -> bool {
        match self {
            DeviceMode::Standby => false,
            DeviceMode::Cycle(_) | DeviceMode::OnDemand => true,
        }
    }

    /// True if air quality data are produced in this mode.
    pub fn has_air_quality(self) -> bool {
        match self {
            DeviceMode::Cycle(_) => true,
            DeviceMode::Standby | DeviceMode::OnDemand => false,
        }
    }
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceMode::Standby => write!(f, "standby"),
            DeviceMode::Cycle(period) => write!(f, "cycle ({period})"),
            DeviceMode::OnDemand => write!(f, "on-demand"),
        }
    }
}

/// Mode reported by the board itself in its operational mode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationalMode {
    /// Standby mode (also reported between on-demand measurements).
    Standby,
    /// Cycle mode.
    Cycle,
}

impl TryFrom<u8> for OperationalMode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationalMode::Standby),
            1 => Ok(OperationalMode::Cycle),
            _ => Err(ProtocolError::UnsupportedConfiguration {
                setting: "operational mode",
                value,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cycle_period_codes() {
        for period in [
            CyclePeriod::Seconds3,
            CyclePeriod::Seconds100,
            CyclePeriod::Seconds300,
        ] {
            assert_eq!(CyclePeriod::try_from(u8::from(period)), Ok(period));
        }
        assert!(matches!(
            CyclePeriod::try_from(3),
            Err(ProtocolError::UnsupportedConfiguration { value: 3, .. })
        ));
    }

    #[test]
    fn only_cycle_mode_has_air_quality() {
        assert!(DeviceMode::Cycle(CyclePeriod::Seconds3).has_air_quality());
        assert!(!DeviceMode::OnDemand.has_air_quality());
        assert!(!DeviceMode::Standby.releases_data());
    }
}
