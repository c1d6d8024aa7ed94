//! Receiver reset variants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ubx::messages::{
    CFG_RST_MODE_GNSS, CFG_RST_MODE_GNSS_START, CFG_RST_MODE_GNSS_STOP,
    CFG_RST_MODE_HW_CONTROLLED, CFG_RST_MODE_SW, CFG_RST_NAVBBR_COLDSTART,
    CFG_RST_NAVBBR_HOTSTART, CFG_RST_NAVBBR_WARMSTART,
};

/// Reset type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Hotstart
    Hot,
    /// Warmstart
    Warm,
    /// Coldstart
    Cold,
    /// Revert configuration to default, keep navigation data
    Default,
    /// Revert configuration to default and coldstart
    Factory,
    /// Stop GNSS
    GnssStop,
    /// Start GNSS
    GnssStart,
    /// Restart GNSS
    GnssRestart,
}

impl ResetMode {
    /// All reset modes
    pub const ALL: [ResetMode; 8] = [
        ResetMode::Hot,
        ResetMode::Warm,
        ResetMode::Cold,
        ResetMode::Default,
        ResetMode::Factory,
        ResetMode::GnssStop,
        ResetMode::GnssStart,
        ResetMode::GnssRestart,
    ];

    /// UBX-CFG-RST navBbrMask and resetMode
    pub fn cfg_rst_params(self) -> (u16, u8) {
        match self {
            ResetMode::Hot => (CFG_RST_NAVBBR_HOTSTART, CFG_RST_MODE_SW),
            ResetMode::Warm => (CFG_RST_NAVBBR_WARMSTART, CFG_RST_MODE_SW),
            ResetMode::Cold => (CFG_RST_NAVBBR_COLDSTART, CFG_RST_MODE_SW),
            ResetMode::Default => (CFG_RST_NAVBBR_HOTSTART, CFG_RST_MODE_HW_CONTROLLED),
            ResetMode::Factory => (CFG_RST_NAVBBR_COLDSTART, CFG_RST_MODE_HW_CONTROLLED),
            ResetMode::GnssStop => (CFG_RST_NAVBBR_HOTSTART, CFG_RST_MODE_GNSS_STOP),
            ResetMode::GnssStart => (CFG_RST_NAVBBR_HOTSTART, CFG_RST_MODE_GNSS_START),
            ResetMode::GnssRestart => (CFG_RST_NAVBBR_HOTSTART, CFG_RST_MODE_GNSS),
        }
    }

    /// Whether the configuration in BBR and Flash is cleared before the reset
    pub fn reverts_config(self) -> bool {
        matches!(self, ResetMode::Default | ResetMode::Factory)
    }

    fn as_str(self) -> &'static str {
        match self {
            ResetMode::Hot => "hot",
            ResetMode::Warm => "warm",
            ResetMode::Cold => "cold",
            ResetMode::Default => "default",
            ResetMode::Factory => "factory",
            ResetMode::GnssStop => "stop",
            ResetMode::GnssStart => "start",
            ResetMode::GnssRestart => "gnss",
        }
    }
}

impl fmt::Display for ResetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        ResetMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| format!("unknown reset mode '{}'", s))
    }
}
