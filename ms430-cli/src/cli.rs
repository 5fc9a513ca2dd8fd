use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ms430_hal::{CyclePeriod, I2cAddress, ParticleSensor};

use crate::bridge::GpPin;
use crate::output::OutputFormat;
use crate::util;

/// Read an MS430 environment sensor board through an MCP2221
///
/// The MS430 is connected to the MCP2221's I2C bus, with its READY line wired to
/// one of the GP pins. The LIT and SIT interrupt lines are only needed for the
/// interrupts command.
///
/// Settings may also be given in a TOML file with --config. Flags given on the
/// command line take precedence over the file.
#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct Cli {
    /// Device vendor ID in hexadecimal
    #[arg(short, long = "vid", default_value = "0x4D8", value_parser = util::u16_from_hex)]
    pub(crate) vid: u16,
    /// Device product ID in hexadecimal
    #[arg(short, long = "pid", default_value = "0xDD", value_parser = util::u16_from_hex)]
    pub(crate) pid: u16,
    /// Settings file (TOML)
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
    /// I2C address, as chosen by the board's solder bridge
    #[arg(long, value_enum)]
    pub(crate) address: Option<AddressArg>,
    /// Show temperatures in Fahrenheit
    #[arg(long)]
    pub(crate) fahrenheit: bool,
    /// Particle sensor connected to the board
    #[arg(long, value_enum)]
    pub(crate) particle_sensor: Option<ParticleSensorArg>,
    /// How readings are printed
    #[arg(short, long, value_enum)]
    pub(crate) format: Option<OutputFormat>,
    /// GP pin wired to READY
    #[arg(long, value_enum)]
    pub(crate) ready_pin: Option<GpPin>,
    /// GP pin wired to LIT
    #[arg(long, value_enum)]
    pub(crate) light_pin: Option<GpPin>,
    /// GP pin wired to SIT
    #[arg(long, value_enum)]
    pub(crate) sound_pin: Option<GpPin>,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Parser)]
pub(crate) enum Commands {
    /// Measure continuously on a fixed period, with air quality data.
    Cycle {
        /// Seconds between measurements
        #[arg(long, value_enum, default_value = "3")]
        period: PeriodArg,
        /// Keep the last N readings and print their summary after each one
        #[arg(long, value_name = "N")]
        history: Option<usize>,
    },
    /// Trigger a measurement, print it, pause and repeat.
    OnDemand {
        /// Seconds to wait between measurements
        #[arg(long, default_value = "3.5", value_parser = util::seconds)]
        pause: Duration,
    },
    /// Enable the light and sound interrupts and report them as they occur.
    Interrupts,
    /// Show the board's mode and interrupt settings.
    Mode,
    /// Reset the board.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AddressArg {
    /// 0x71, solder bridge open
    Open,
    /// 0x70, solder bridge closed
    Closed,
}

impl From<AddressArg> for I2cAddress {
    fn from(value: AddressArg) -> Self {
        match value {
            AddressArg::Open => I2cAddress::SolderBridgeOpen,
            AddressArg::Closed => I2cAddress::SolderBridgeClosed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ParticleSensorArg {
    Off,
    /// Shinyei PPD42
    Ppd42,
    /// Nova SDS011
    Sds011,
}

impl From<ParticleSensorArg> for ParticleSensor {
    fn from(value: ParticleSensorArg) -> Self {
        match value {
            ParticleSensorArg::Off => ParticleSensor::Off,
            ParticleSensorArg::Ppd42 => ParticleSensor::Ppd42,
            ParticleSensorArg::Sds011 => ParticleSensor::Sds011,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PeriodArg {
    #[value(name = "3")]
    Seconds3,
    #[value(name = "100")]
    Seconds100,
    #[value(name = "300")]
    Seconds300,
}

impl From<PeriodArg> for CyclePeriod {
    fn from(value: PeriodArg) -> Self {
        match value {
            PeriodArg::Seconds3 => CyclePeriod::Seconds3,
            PeriodArg::Seconds100 => CyclePeriod::Seconds100,
            PeriodArg::Seconds300 => CyclePeriod::Seconds300,
        }
    }
}
