//! Register map of the MS430.
//!
//! Every interaction with the board is a write of one register or command byte,
//! optionally followed by a payload (settings) or a read of a fixed number of bytes
//! (data). The types here name those bytes; they carry no behaviour beyond lookup.

/// 7-bit I2C address of the MS430, selected by the solder bridge on the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum I2cAddress {
    /// Solder bridge left open (factory default).
    #[default]
    SolderBridgeOpen,
    /// Solder bridge soldered closed.
    SolderBridgeClosed,
}

impl From<I2cAddress> for u8 {
    fn from(value: I2cAddress) -> Self {
        match value {
            I2cAddress::SolderBridgeOpen => 0x71,
            I2cAddress::SolderBridgeClosed => 0x70,
        }
    }
}

/// Executable commands.
///
/// Commands are a single byte written to the board with no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a single measurement of all quantities (except air quality).
    OnDemandMeasure,
    /// Reset the board, clearing all settings and entering standby mode.
    Reset,
    /// Enter cycle mode, using the period set in [`Setting::CyclePeriod`].
    CycleMode,
    /// Stop cycle mode and enter standby.
    StandbyMode,
    /// Clear a latched light interrupt.
    ClearLightInterrupt,
    /// Clear a latched sound interrupt.
    ClearSoundInterrupt,
}

impl Command {
    /// Command byte written to the board.
    pub const fn code(self) -> u8 {
        match self {
            Command::OnDemandMeasure => 0xE1,
            Command::Reset => 0xE2,
            Command::CycleMode => 0xE4,
            Command::StandbyMode => 0xE5,
            Command::ClearLightInterrupt => 0xE6,
            Command::ClearSoundInterrupt => 0xE7,
        }
    }
}

/// Writable (and readable) settings registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Which particle sensor, if any, is connected to the PRT input.
    ParticleSensorSelect,
    /// Light interrupt enabled (1) or disabled (0).
    LightInterruptEnable,
    /// Light interrupt threshold, integer lux (2 bytes LE) then hundredths.
    LightInterruptThreshold,
    /// Light interrupt type (latch or comparator).
    LightInterruptType,
    /// Light interrupt polarity (above or below the threshold).
    LightInterruptPolarity,
    /// Sound interrupt enabled (1) or disabled (0).
    SoundInterruptEnable,
    /// Sound interrupt threshold in mPa (2 bytes LE).
    SoundInterruptThreshold,
    /// Sound interrupt type (latch or comparator).
    SoundInterruptType,
    /// Cycle mode period selection.
    CyclePeriod,
}

impl Setting {
    /// Register address of the setting.
    pub const fn address(self) -> u8 {
        match self {
            Setting::ParticleSensorSelect => 0x07,
            Setting::LightInterruptEnable => 0x81,
            Setting::LightInterruptThreshold => 0x82,
            Setting::LightInterruptType => 0x83,
            Setting::LightInterruptPolarity => 0x84,
            Setting::SoundInterruptEnable => 0x85,
            Setting::SoundInterruptThreshold => 0x86,
            Setting::SoundInterruptType => 0x87,
            Setting::CyclePeriod => 0x89,
        }
    }

    /// Number of payload bytes the register holds.
    pub const fn byte_len(self) -> usize {
        match self {
            Setting::LightInterruptThreshold => 3,
            Setting::SoundInterruptThreshold => 2,
            _ => 1,
        }
    }
}

/// Read-only register holding the operational mode (standby or cycle).
pub const OPERATIONAL_MODE_READ: u8 = 0x8A;

/// Number of sound frequency bands measured by the board.
pub const SOUND_FREQ_BANDS: usize = 6;

/// Centre frequency of each sound band, in Hz.
pub const SOUND_BAND_MIDS_HZ: [u16; SOUND_FREQ_BANDS] = [125, 250, 500, 1000, 2000, 4000];

/// Maximum illuminance measurement and light interrupt threshold, in lux.
pub const MAX_LUX_VALUE: u16 = 3774;

/// Data categories, each read as a whole in one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Category {
    /// Temperature, pressure, humidity and gas sensor resistance.
    Air,
    /// Air quality index, estimated CO₂, breath VOC and accuracy.
    AirQuality,
    /// Illuminance and white light level.
    Light,
    /// A-weighted SPL, band SPLs, peak amplitude and stability.
    Sound,
    /// Particle sensor duty cycle, concentration and validity.
    Particle,
}

impl Category {
    /// Register address to read the whole category from.
    pub const fn address(self) -> u8 {
        match self {
            Category::Air => 0x10,
            Category::AirQuality => 0x11,
            Category::Light => 0x12,
            Category::Sound => 0x13,
            Category::Particle => 0x14,
        }
    }

    /// Exact number of bytes the category occupies.
    pub const fn byte_len(self) -> usize {
        match self {
            Category::Air => 12,
            Category::AirQuality => 10,
            Category::Light => 5,
            Category::Sound => 18,
            Category::Particle => 6,
        }
    }

    /// Human-readable name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Category::Air => "air",
            Category::AirQuality => "air quality",
            Category::Light => "light",
            Category::Sound => "sound",
            Category::Particle => "particle",
        }
    }
}

/// Individual quantities, each readable on its own.
///
/// Each quantity is a slice of its category's buffer, so the same decoding rules
/// apply at the same relative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Temperature in °C (signed-magnitude, 1 decimal place).
    Temperature,
    /// Pressure in Pa.
    Pressure,
    /// Relative humidity in % (1 decimal place).
    Humidity,
    /// Gas sensor resistance in Ω.
    GasResistance,
    /// Air quality index (1 decimal place).
    Aqi,
    /// Estimated CO₂ in ppm (1 decimal place).
    Co2e,
    /// Equivalent breath VOC in ppm (2 decimal places).
    Bvoc,
    /// Air quality accuracy code.
    AqiAccuracy,
    /// Illuminance in lux (2 decimal places).
    Illuminance,
    /// White light level.
    WhiteLight,
    /// A-weighted sound pressure level in dBA.
    Spl,
    /// Sound pressure level of each frequency band in dB.
    SplBands,
    /// Peak sound amplitude in mPa.
    SoundPeak,
    /// Microphone stability flag.
    SoundStable,
    /// Particle sensor duty cycle in %.
    DutyCycle,
    /// Particle concentration.
    Concentration,
    /// Particle data validity flag.
    ParticleValid,
}

impl Quantity {
    /// Register address to read the quantity from.
    pub const fn address(self) -> u8 {
        match self {
            Quantity::Temperature => 0x21,
            Quantity::Pressure => 0x22,
            Quantity::Humidity => 0x23,
            Quantity::GasResistance => 0x24,
            Quantity::Aqi => 0x25,
            Quantity::Co2e => 0x26,
            Quantity::Bvoc => 0x27,
            Quantity::AqiAccuracy => 0x28,
            Quantity::Illuminance => 0x31,
            Quantity::WhiteLight => 0x32,
            Quantity::Spl => 0x41,
            Quantity::SplBands => 0x42,
            Quantity::SoundPeak => 0x43,
            Quantity::SoundStable => 0x44,
            Quantity::DutyCycle => 0x51,
            Quantity::Concentration => 0x52,
            Quantity::ParticleValid => 0x53,
        }
    }

    /// Exact number of bytes the quantity occupies.
    pub const fn byte_len(self) -> usize {
        match self {
            Quantity::Temperature => 2,
            Quantity::Pressure => 4,
            Quantity::Humidity => 2,
            Quantity::GasResistance => 4,
            Quantity::Aqi => 3,
            Quantity::Co2e => 3,
            Quantity::Bvoc => 3,
            Quantity::AqiAccuracy => 1,
            Quantity::Illuminance => 3,
            Quantity::WhiteLight => 2,
            Quantity::Spl => 2,
            Quantity::SplBands => 2 * SOUND_FREQ_BANDS,
            Quantity::SoundPeak => 3,
            Quantity::SoundStable => 1,
            Quantity::DutyCycle => 2,
            Quantity::Concentration => 3,
            Quantity::ParticleValid => 1,
        }
    }

    /// The category this quantity belongs to.
    pub const fn category(self) -> Category {
        match self {
            Quantity::Temperature
            | Quantity::Pressure
            | Quantity::Humidity
            | Quantity::GasResistance => Category::Air,
            Quantity::Aqi | Quantity::Co2e | Quantity::Bvoc | Quantity::AqiAccuracy => {
                Category::AirQuality
            }
            Quantity::Illuminance | Quantity::WhiteLight => Category::Light,
            Quantity::Spl | Quantity::SplBands | Quantity::SoundPeak | Quantity::SoundStable => {
                Category::Sound
            }
            Quantity::DutyCycle | Quantity::Concentration | Quantity::ParticleValid => {
                Category::Particle
            }
        }
    }

    /// Human-readable name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::Humidity => "humidity",
            Quantity::GasResistance => "gas resistance",
            Quantity::Aqi => "air quality index",
            Quantity::Co2e => "estimated CO2",
            Quantity::Bvoc => "breath VOC",
            Quantity::AqiAccuracy => "air quality accuracy",
            Quantity::Illuminance => "illuminance",
            Quantity::WhiteLight => "white light level",
            Quantity::Spl => "A-weighted SPL",
            Quantity::SplBands => "band SPL",
            Quantity::SoundPeak => "peak sound amplitude",
            Quantity::SoundStable => "sound stability",
            Quantity::DutyCycle => "particle duty cycle",
            Quantity::Concentration => "particle concentration",
            Quantity::ParticleValid => "particle validity",
        }
    }
}
