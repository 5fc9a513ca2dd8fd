use crate::mode::DeviceMode;

/// Problems found in data or settings, independent of any bus traffic.
///
/// These are returned by the pure decoding and encoding functions, and wrapped in
/// [`Error::Protocol`] by the driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// A raw buffer did not have the exact length of the data it should hold.
    ///
    /// Buffers are never truncated or padded; nothing is decoded from them.
    #[error("{name} data must be {expected} bytes, got {actual}")]
    MalformedBuffer {
        /// Name of the category or quantity being decoded.
        name: &'static str,
        /// Required number of bytes.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
    /// A threshold or setting value exceeds its documented bound.
    #[error("{setting} value {value} is above the maximum of {max}")]
    OutOfRange {
        /// Name of the setting.
        setting: &'static str,
        /// Value requested, as written by the caller.
        value: f32,
        /// Largest allowed value.
        max: f32,
    },
    /// A setting value is below its documented minimum.
    #[error("{setting} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the setting.
        setting: &'static str,
        /// Value requested, as written by the caller.
        value: f32,
        /// Smallest allowed value.
        min: f32,
    },
    /// A setting byte does not correspond to any known option.
    ///
    /// Returned when reading back a register holding an unknown code, or when
    /// decoding such a code supplied by the caller.
    #[error("unrecognised {setting} value {value:#04X}")]
    UnsupportedConfiguration {
        /// Name of the setting.
        setting: &'static str,
        /// Raw setting byte.
        value: u8,
    },
}

/// Errors returned by the [`Ms430`](crate::Ms430) driver.
///
/// `E` is the error type of the I2C bus and `L` the error type of the ready line.
/// Both are passed through unmodified: the driver never retries a failed transfer.
#[derive(Debug, thiserror::Error)]
pub enum Error<E, L> {
    /// Data or settings were invalid.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The I2C transfer failed.
    #[error("I2C transfer failed: {0:?}")]
    Transport(E),
    /// Reading the ready line failed.
    #[error("reading the ready line failed: {0:?}")]
    ReadyLine(L),
    /// The operation is not possible in the board's current mode.
    #[error("cannot {operation} in {mode} mode")]
    WrongMode {
        /// What was attempted.
        operation: &'static str,
        /// Mode the board was in.
        mode: DeviceMode,
    },
}
