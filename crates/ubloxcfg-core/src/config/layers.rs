//! Configuration layers
//!
//! The same logical layers are encoded differently per command: flag bits for
//! VALSET and VALDEL, a single small integer for VALGET.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use super::ConfigError;

/// A set of configuration layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Layers(u8);

const NAMES: [(Layers, &str); 4] = [
    (Layers::RAM, "RAM"),
    (Layers::BBR, "BBR"),
    (Layers::FLASH, "Flash"),
    (Layers::DEFAULT, "Default"),
];

impl Layers {
    /// No layer
    pub const NONE: Layers = Layers(0x00);
    /// Volatile RAM (current configuration)
    pub const RAM: Layers = Layers(0x01);
    /// Battery-backed RAM
    pub const BBR: Layers = Layers(0x02);
    /// Flash
    pub const FLASH: Layers = Layers(0x04);
    /// Compiled-in defaults (read-only)
    pub const DEFAULT: Layers = Layers(0x08);

    /// Check whether all layers of `other` are in this set
    pub fn contains(&self, other: Layers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Layer flags for UBX-CFG-VALSET (RAM 0x01, BBR 0x02, Flash 0x04)
    pub fn valset_flags(&self) -> Result<u8, ConfigError> {
        if self.is_empty() || self.contains(Layers::DEFAULT) {
            return Err(ConfigError::InvalidLayers(format!(
                "{} (UBX-CFG-VALSET needs RAM, BBR and/or Flash)",
                self
            )));
        }
        Ok(self.0)
    }

    /// Layer flags for UBX-CFG-VALDEL (BBR 0x02, Flash 0x04)
    pub fn valdel_flags(&self) -> Result<u8, ConfigError> {
        if self.is_empty() || self.contains(Layers::RAM) || self.contains(Layers::DEFAULT) {
            return Err(ConfigError::InvalidLayers(format!(
                "{} (UBX-CFG-VALDEL needs BBR and/or Flash)",
                self
            )));
        }
        Ok(self.0)
    }

    /// Layer value for UBX-CFG-VALGET (RAM 0, BBR 1, Flash 2, Default 7)
    pub fn valget_layer(&self) -> Result<u8, ConfigError> {
        match *self {
            Layers::RAM => Ok(0),
            Layers::BBR => Ok(1),
            Layers::FLASH => Ok(2),
            Layers::DEFAULT => Ok(7),
            _ => Err(ConfigError::InvalidLayers(format!(
                "{} (UBX-CFG-VALGET needs exactly one layer)",
                self
            ))),
        }
    }

    /// Layer from a UBX-CFG-VALGET layer value
    pub fn from_valget_layer(layer: u8) -> Option<Layers> {
        match layer {
            0 => Some(Layers::RAM),
            1 => Some(Layers::BBR),
            2 => Some(Layers::FLASH),
            7 => Some(Layers::DEFAULT),
            _ => None,
        }
    }
}

impl BitOr for Layers {
    type Output = Layers;

    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}

impl fmt::Display for Layers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(layer, _)| self.contains(*layer))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(","))
    }
}

impl FromStr for Layers {
    type Err = ConfigError;

    /// Parse a comma-separated, case-insensitive list, e.g. "RAM,BBR,Flash"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut layers = Layers::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let layer = NAMES
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(part))
                .map(|(layer, _)| *layer)
                .ok_or_else(|| ConfigError::InvalidLayers(format!("unknown layer '{}'", part)))?;
            layers = layers | layer;
        }
        if layers.is_empty() {
            return Err(ConfigError::InvalidLayers(format!("no layer in '{}'", s)));
        }
        Ok(layers)
    }
}
