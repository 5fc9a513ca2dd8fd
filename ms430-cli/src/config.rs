//! Settings file, merged with the command-line flags.
use std::path::Path;

use anyhow::Context;
use ms430_hal::{
    InterruptType, LightInterruptConfig, LightPolarity, LightThreshold, ParticleSensor,
    ProtocolError, SoundInterruptConfig, SoundThreshold, TemperatureUnit,
};
use serde::Deserialize;

use crate::bridge::GpPin;
use crate::cli::{AddressArg, Cli};
use crate::output::OutputFormat;

/// Contents of the TOML settings file.
///
/// Every key is optional. Missing keys take the values of [`Config::default`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// I2C address of the board
    pub(crate) address: AddressArg,
    pub(crate) temperature_unit: TemperatureUnit,
    pub(crate) particle_sensor: ParticleSensor,
    pub(crate) format: OutputFormat,
    /// GP pins of the MCP2221 wired to the board's output lines
    pub(crate) pins: Pins,
    pub(crate) light_interrupt: LightInterruptSettings,
    pub(crate) sound_interrupt: SoundInterruptSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: AddressArg::Open,
            temperature_unit: TemperatureUnit::Celsius,
            particle_sensor: ParticleSensor::Off,
            format: OutputFormat::Text,
            pins: Pins::default(),
            light_interrupt: LightInterruptSettings::default(),
            sound_interrupt: SoundInterruptSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Pins {
    pub(crate) ready: GpPin,
    pub(crate) light: GpPin,
    pub(crate) sound: GpPin,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            ready: GpPin::Gp1,
            light: GpPin::Gp2,
            sound: GpPin::Gp3,
        }
    }
}

/// Light interrupt settings used by the interrupts command.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct LightInterruptSettings {
    pub(crate) enabled: bool,
    #[serde(rename = "type")]
    pub(crate) interrupt_type: InterruptType,
    /// Whole lux part of the threshold
    pub(crate) threshold_lux: u16,
    /// Hundredths of a lux, 0 to 99
    pub(crate) threshold_hundredths: u8,
    pub(crate) polarity: LightPolarity,
}

impl Default for LightInterruptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interrupt_type: InterruptType::Latch,
            threshold_lux: 100,
            threshold_hundredths: 50,
            polarity: LightPolarity::Positive,
        }
    }
}

impl LightInterruptSettings {
    pub(crate) fn to_config(self) -> Result<LightInterruptConfig, ProtocolError> {
        Ok(LightInterruptConfig {
            interrupt_type: self.interrupt_type,
            threshold: LightThreshold::new(self.threshold_lux, self.threshold_hundredths)?,
            polarity: self.polarity,
        })
    }
}

/// Sound interrupt settings used by the interrupts command.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct SoundInterruptSettings {
    pub(crate) enabled: bool,
    #[serde(rename = "type")]
    pub(crate) interrupt_type: InterruptType,
    /// Peak amplitude threshold in mPa
    pub(crate) threshold_mpa: u16,
}

impl Default for SoundInterruptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interrupt_type: InterruptType::Latch,
            threshold_mpa: 100,
        }
    }
}

impl SoundInterruptSettings {
    pub(crate) fn to_config(self) -> SoundInterruptConfig {
        SoundInterruptConfig {
            interrupt_type: self.interrupt_type,
            threshold: SoundThreshold(self.threshold_mpa),
        }
    }
}

impl Config {
    /// Read the settings file, or use the defaults if there is none.
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading settings from {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Parsing settings in {}", path.display()))?;
        log::debug!("Loaded settings from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Replace settings with any given on the command line.
    pub(crate) fn apply_flags(&mut self, cli: &Cli) {
        if let Some(address) = cli.address {
            self.address = address;
        }
        if cli.fahrenheit {
            self.temperature_unit = TemperatureUnit::Fahrenheit;
        }
        if let Some(sensor) = cli.particle_sensor {
            self.particle_sensor = sensor.into();
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        if let Some(pin) = cli.ready_pin {
            self.pins.ready = pin;
        }
        if let Some(pin) = cli.light_pin {
            self.pins.light = pin;
        }
        if let Some(pin) = cli.sound_pin {
            self.pins.sound = pin;
        }
    }
}
