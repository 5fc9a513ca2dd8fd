#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod data;
pub mod decode;
mod driver;
mod error;
pub mod fixed_point;
pub mod history;
pub mod interpret;
pub mod interrupts;
mod mode;
pub mod registers;
mod signal;

pub use data::{
    AirData, AirQualityData, LightData, ParticleData, ParticleSensor, Readings, SoundData,
    TemperatureUnit,
};
pub use driver::Ms430;
pub use error::{Error, ProtocolError};
pub use history::{SharedHistory, Sample};
pub use interpret::{AqiAccuracy, AqiRating};
pub use interrupts::{
    InterruptType, LightInterruptConfig, LightPolarity, LightThreshold, SoundInterruptConfig,
    SoundThreshold,
};
pub use mode::{CyclePeriod, DeviceMode, OperationalMode};
pub use registers::I2cAddress;
pub use signal::{EdgeSignal, FallingEdge};
