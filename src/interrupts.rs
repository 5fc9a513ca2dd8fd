//! Light and sound interrupt settings.
//!
//! The board drives its LIT and SIT outputs low when illuminance or sound level
//! crosses a threshold. Each interrupt has a type, a threshold and (for light) a
//! polarity, each held in its own register. [`LightInterruptConfig`] and
//! [`SoundInterruptConfig`] convert between these settings and the register bytes.

use crate::error::ProtocolError;
use crate::fixed_point::{decode_u16_le, encode_u16_le};
use crate::registers::MAX_LUX_VALUE;

/// How an interrupt output behaves once triggered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InterruptType {
    /// The output stays asserted until cleared by the host.
    #[default]
    Latch,
    /// The output follows the measured value, asserted while past the threshold.
    Comparator,
}

impl From<InterruptType> for u8 {
    fn from(value: InterruptType) -> Self {
        match value {
            InterruptType::Latch => 0,
            InterruptType::Comparator => 1,
        }
    }
}

impl TryFrom<u8> for InterruptType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InterruptType::Latch),
            1 => Ok(InterruptType::Comparator),
            _ => Err(ProtocolError::UnsupportedConfiguration {
                setting: "interrupt type",
                value,
            }),
        }
    }
}

/// Which side of the light threshold triggers the interrupt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LightPolarity {
    /// Trigger when the illuminance rises above the threshold.
    #[default]
    Positive,
    /// Trigger when the illuminance falls below the threshold.
    Negative,
}

impl From<LightPolarity> for u8 {
    fn from(value: LightPolarity) -> Self {
        match value {
            LightPolarity::Positive => 0,
            LightPolarity::Negative => 1,
        }
    }
}

impl TryFrom<u8> for LightPolarity {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LightPolarity::Positive),
            1 => Ok(LightPolarity::Negative),
            _ => Err(ProtocolError::UnsupportedConfiguration {
                setting: "light interrupt polarity",
                value,
            }),
        }
    }
}

/// Illuminance threshold, as a whole number of lux and hundredths of a lux.
///
/// The fraction is given as an integer so that the threshold is exactly what is
/// written to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightThreshold {
    integer_lux: u16,
    fraction_hundredths: u8,
}

impl LightThreshold {
    /// Create a threshold of `integer_lux + fraction_hundredths / 100` lux.
    ///
    /// Thresholds above [`MAX_LUX_VALUE`] or with a fraction above 99 are rejected,
    /// never clamped.
    ///
    /// ```
    /// # use ms430_hal::interrupts::LightThreshold;
    /// assert!(LightThreshold::new(3774, 0).is_ok());
    /// assert!(LightThreshold::new(3774, 1).is_err());
    /// ```
    pub fn new(integer_lux: u16, fraction_hundredths: u8) -> Result<Self, ProtocolError> {
        if fraction_hundredths > 99 {
            return Err(ProtocolError::OutOfRange {
                setting: "light threshold fraction",
                value: f32::from(fraction_hundredths),
                max: 99.0,
            });
        }
        // Compared in hundredths to avoid float rounding at the boundary.
        let hundredths = u32::from(integer_lux) * 100 + u32::from(fraction_hundredths);
        if hundredths > u32::from(MAX_LUX_VALUE) * 100 {
            return Err(ProtocolError::OutOfRange {
                setting: "light threshold",
                value: f32::from(integer_lux) + f32::from(fraction_hundredths) / 100.0,
                max: f32::from(MAX_LUX_VALUE),
            });
        }
        Ok(Self {
            integer_lux,
            fraction_hundredths,
        })
    }

    /// Whole lux part.
    pub fn integer_lux(&self) -> u16 {
        self.integer_lux
    }

    /// Fractional part in hundredths of a lux.
    pub fn fraction_hundredths(&self) -> u8 {
        self.fraction_hundredths
    }

    /// Threshold in lux.
    pub fn lux(&self) -> f32 {
        f32::from(self.integer_lux) + f32::from(self.fraction_hundredths) / 100.0
    }

    /// Register bytes: `[integer low, integer high, fraction]`.
    pub fn encode(&self) -> [u8; 3] {
        let [low, high] = encode_u16_le(self.integer_lux);
        [low, high, self.fraction_hundredths]
    }

    /// Parse register bytes, applying the same bounds as [`Self::new`].
    pub fn decode(bytes: [u8; 3]) -> Result<Self, ProtocolError> {
        Self::new(decode_u16_le([bytes[0], bytes[1]]), bytes[2])
    }
}

/// Sound level threshold in whole mPa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SoundThreshold(pub u16);

impl SoundThreshold {
    /// Register bytes, little-endian.
    pub fn encode(&self) -> [u8; 2] {
        encode_u16_le(self.0)
    }

    /// Parse register bytes.
    pub fn decode(bytes: [u8; 2]) -> Self {
        Self(decode_u16_le(bytes))
    }
}

/// Light interrupt settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightInterruptConfig {
    /// Latch or comparator behaviour.
    pub interrupt_type: InterruptType,
    /// Illuminance threshold.
    pub threshold: LightThreshold,
    /// Trigger above or below the threshold.
    pub polarity: LightPolarity,
}

/// Register contents of a light interrupt configuration, excluding the enable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightInterruptRegisters {
    /// Interrupt type register byte.
    pub interrupt_type: u8,
    /// Threshold register bytes.
    pub threshold: [u8; 3],
    /// Polarity register byte.
    pub polarity: u8,
}

impl LightInterruptConfig {
    /// Encode the settings into register bytes.
    pub fn to_registers(&self) -> LightInterruptRegisters {
        LightInterruptRegisters {
            interrupt_type: self.interrupt_type.into(),
            threshold: self.threshold.encode(),
            polarity: self.polarity.into(),
        }
    }

    /// Decode settings read back from the board.
    pub fn from_registers(registers: LightInterruptRegisters) -> Result<Self, ProtocolError> {
        Ok(Self {
            interrupt_type: registers.interrupt_type.try_into()?,
            threshold: LightThreshold::decode(registers.threshold)?,
            polarity: registers.polarity.try_into()?,
        })
    }
}

/// Sound interrupt settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundInterruptConfig {
    /// Latch or comparator behaviour.
    pub interrupt_type: InterruptType,
    /// Sound level threshold.
    pub threshold: SoundThreshold,
}

/// Register contents of a sound interrupt configuration, excluding the enable flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundInterruptRegisters {
    /// Interrupt type register byte.
    pub interrupt_type: u8,
    /// Threshold register bytes.
    pub threshold: [u8; 2],
}

impl SoundInterruptConfig {
    /// Encode the settings into register bytes.
    pub fn to_registers(&self) -> SoundInterruptRegisters {
        SoundInterruptRegisters {
            interrupt_type: self.interrupt_type.into(),
            threshold: self.threshold.encode(),
        }
    }

    /// Decode settings read back from the board.
    pub fn from_registers(registers: SoundInterruptRegisters) -> Result<Self, ProtocolError> {
        Ok(Self {
            interrupt_type: registers.interrupt_type.try_into()?,
            threshold: SoundThreshold::decode(registers.threshold),
        })
    }
}
