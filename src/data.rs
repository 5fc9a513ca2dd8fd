//! Decoded environmental data.
//!
//! Each struct holds one category of data as produced by the functions in
//! [`crate::decode`]. Values keep the board's precision (one or two decimal places)
//! and are never rounded.

use crate::error::ProtocolError;
use crate::interpret::{AqiAccuracy, AqiRating};
use crate::registers::SOUND_FREQ_BANDS;

/// Unit used when presenting temperatures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TemperatureUnit {
    /// Degrees Celsius (the board's native unit).
    #[default]
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
}

impl TemperatureUnit {
    /// Unit symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Convert a Celsius temperature to Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Particle sensor model connected to the board's PRT input.
///
/// The board only reports a number; which unit that number is in depends on the
/// sensor model, so the driver must be told which one is fitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParticleSensor {
    /// No particle sensor; particle data are not read.
    #[default]
    Off,
    /// Shinyei PPD42, concentration in particles per litre.
    Ppd42,
    /// Nova SDS011, concentration in µg/m³.
    Sds011,
}

impl ParticleSensor {
    /// Unit of the concentration reported with this sensor fitted.
    pub fn concentration_unit(self) -> &'static str {
        match self {
            ParticleSensor::Off => "(?)",
            ParticleSensor::Ppd42 => "ppL",
            ParticleSensor::Sds011 => "µg/m³",
        }
    }
}

impl From<ParticleSensor> for u8 {
    fn from(value: ParticleSensor) -> Self {
        match value {
            ParticleSensor::Off => 0,
            ParticleSensor::Ppd42 => 1,
            ParticleSensor::Sds011 => 2,
        }
    }
}

impl TryFrom<u8> for ParticleSensor {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ParticleSensor::Off),
            1 => Ok(ParticleSensor::Ppd42),
            2 => Ok(ParticleSensor::Sds011),
            _ => Err(ProtocolError::UnsupportedConfiguration {
                setting: "particle sensor",
                value,
            }),
        }
    }
}

/// Air data: temperature, pressure, humidity and gas sensor resistance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AirData {
    /// Temperature in °C.
    pub temperature_c: f32,
    /// Temperature in °F.
    pub temperature_f: f32,
    /// Unit chosen for presenting the temperature.
    pub temperature_unit: TemperatureUnit,
    /// Air pressure in Pa.
    pub pressure_pa: u32,
    /// Relative humidity in %.
    pub humidity_percent: f32,
    /// Resistance of the gas sensor in Ω.
    pub gas_resistance_ohm: u32,
}

impl AirData {
    /// Temperature in the chosen unit.
    pub fn temperature(&self) -> f32 {
        match self.temperature_unit {
            TemperatureUnit::Celsius => self.temperature_c,
            TemperatureUnit::Fahrenheit => self.temperature_f,
        }
    }
}

/// Air quality data, only produced in cycle mode.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AirQualityData {
    /// Air quality index.
    pub aqi: f32,
    /// Estimated CO₂ concentration in ppm.
    pub co2e_ppm: f32,
    /// Equivalent breath VOC concentration in ppm.
    pub bvoc_ppm: f32,
    /// Raw accuracy code reported by the board.
    pub accuracy_code: u8,
}

impl AirQualityData {
    /// Calibration state of the air quality values.
    pub fn accuracy(&self) -> AqiAccuracy {
        AqiAccuracy::from(self.accuracy_code)
    }

    /// Description of the air quality index.
    pub fn rating(&self) -> AqiRating {
        AqiRating::from_aqi(self.aqi)
    }

    /// True once the values are meaningful (accuracy above zero).
    pub fn is_valid(&self) -> bool {
        self.accuracy() != AqiAccuracy::NotYetValid
    }
}

/// Light data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LightData {
    /// Illuminance in lux.
    pub illuminance_lux: f32,
    /// White light level (unitless).
    pub white_level: u16,
}

/// Sound data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SoundData {
    /// A-weighted sound pressure level in dBA.
    pub spl_dba: f32,
    /// Sound pressure level of each frequency band in dB.
    ///
    /// See [`SOUND_BAND_MIDS_HZ`](crate::registers::SOUND_BAND_MIDS_HZ) for the
    /// band centre frequencies.
    pub band_spl_db: [f32; SOUND_FREQ_BANDS],
    /// Peak sound amplitude in mPa.
    pub peak_amplitude_mpa: f32,
    /// True once the microphone has stabilised after start-up.
    pub stable: bool,
}

/// Particle data.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParticleData {
    /// Particle sensor output duty cycle in %.
    pub duty_cycle_percent: f32,
    /// Particle concentration, in the unit of [`Self::sensor`].
    pub concentration: f32,
    /// Sensor the data came from; fixes the concentration unit.
    pub sensor: ParticleSensor,
    /// False during the initialisation period after the sensor is enabled.
    pub valid: bool,
}

impl ParticleData {
    /// Unit of [`Self::concentration`].
    pub fn concentration_unit(&self) -> &'static str {
        self.sensor.concentration_unit()
    }
}

/// All data from a single measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Readings {
    /// Air data.
    pub air: AirData,
    /// Air quality data, `None` outside of cycle mode.
    pub air_quality: Option<AirQualityData>,
    /// Light data.
    pub light: LightData,
    /// Sound data.
    pub sound: SoundData,
    /// Particle data, `None` if no particle sensor is selected.
    pub particle: Option<ParticleData>,
}
