//! Decoding raw data buffers into typed data.
//!
//! Every function checks that the buffer has exactly the length of the category or
//! quantity it decodes, and returns [`ProtocolError::MalformedBuffer`] otherwise. No
//! field is read from a buffer of the wrong length.
//!
//! The category decoders are built from the quantity decoders, applied to the
//! quantity's slice of the category buffer, so reading a whole category and reading
//! one quantity on its own always agree.

use crate::data::{
    AirData, AirQualityData, LightData, ParticleData, ParticleSensor, SoundData,
    TemperatureUnit, celsius_to_fahrenheit,
};
use crate::error::ProtocolError;
use crate::fixed_point::{
    TEMPERATURE_SIGN_MASK, TEMPERATURE_VALUE_MASK, decode_signed_magnitude, decode_u16_le,
    decode_u32_le, decode_unsigned_fixed,
};
use crate::registers::{Category, Quantity, SOUND_FREQ_BANDS};

/// Reject buffers that are not exactly `expected` bytes long.
fn check_len(raw: &[u8], name: &'static str, expected: usize) -> Result<(), ProtocolError> {
    if raw.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::MalformedBuffer {
            name,
            expected,
            actual: raw.len(),
        })
    }
}

fn check_category(raw: &[u8], category: Category) -> Result<(), ProtocolError> {
    check_len(raw, category.name(), category.byte_len())
}

fn check_quantity(raw: &[u8], quantity: Quantity) -> Result<(), ProtocolError> {
    check_len(raw, quantity.name(), quantity.byte_len())
}

////////////////////////////////////////////////////////////////////////////////
// Individual quantities
////////////////////////////////////////////////////////////////////////////////

/// Temperature in °C from its 2-byte signed-magnitude encoding.
pub fn decode_temperature(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Temperature)?;
    Ok(decode_signed_magnitude(
        raw[0],
        raw[1],
        TEMPERATURE_SIGN_MASK,
        TEMPERATURE_VALUE_MASK,
    ))
}

/// Pressure in Pa.
pub fn decode_pressure(raw: &[u8]) -> Result<u32, ProtocolError> {
    check_quantity(raw, Quantity::Pressure)?;
    Ok(decode_u32_le([raw[0], raw[1], raw[2], raw[3]]))
}

/// Relative humidity in %.
pub fn decode_humidity(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Humidity)?;
    Ok(decode_unsigned_fixed(raw, 1, 1))
}

/// Gas sensor resistance in Ω.
pub fn decode_gas_resistance(raw: &[u8]) -> Result<u32, ProtocolError> {
    check_quantity(raw, Quantity::GasResistance)?;
    Ok(decode_u32_le([raw[0], raw[1], raw[2], raw[3]]))
}

/// Air quality index.
pub fn decode_aqi(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Aqi)?;
    Ok(decode_unsigned_fixed(raw, 2, 1))
}

/// Estimated CO₂ in ppm.
pub fn decode_co2e(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Co2e)?;
    Ok(decode_unsigned_fixed(raw, 2, 1))
}

/// Equivalent breath VOC in ppm (two decimal places).
pub fn decode_bvoc(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Bvoc)?;
    Ok(decode_unsigned_fixed(raw, 2, 2))
}

/// Illuminance in lux.
pub fn decode_illuminance(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Illuminance)?;
    Ok(decode_unsigned_fixed(raw, 2, 2))
}

/// White light level.
pub fn decode_white_level(raw: &[u8]) -> Result<u16, ProtocolError> {
    check_quantity(raw, Quantity::WhiteLight)?;
    Ok(decode_u16_le([raw[0], raw[1]]))
}

/// A-weighted sound pressure level in dBA.
pub fn decode_spl(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Spl)?;
    Ok(decode_unsigned_fixed(raw, 1, 1))
}

/// Sound pressure level of each frequency band, in dB.
///
/// The bands are not stored as integer/fraction pairs: the six integer parts come
/// first, then the six fraction parts, so band `n` is
/// `raw[n] + raw[n + SOUND_FREQ_BANDS] / 10`.
pub fn decode_band_spl(raw: &[u8]) -> Result<[f32; SOUND_FREQ_BANDS], ProtocolError> {
    check_quantity(raw, Quantity::SplBands)?;
    let (integers, fractions) = raw.split_at(SOUND_FREQ_BANDS);
    Ok(std::array::from_fn(|band| {
        decode_unsigned_fixed(&[integers[band], fractions[band]], 1, 1)
    }))
}

/// Peak sound amplitude in mPa.
pub fn decode_sound_peak(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::SoundPeak)?;
    Ok(decode_unsigned_fixed(raw, 2, 2))
}

/// Particle sensor duty cycle in %.
pub fn decode_duty_cycle(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::DutyCycle)?;
    Ok(decode_unsigned_fixed(raw, 1, 2))
}

/// Particle concentration, in the unit of the fitted sensor.
pub fn decode_concentration(raw: &[u8]) -> Result<f32, ProtocolError> {
    check_quantity(raw, Quantity::Concentration)?;
    Ok(decode_unsigned_fixed(raw, 2, 2))
}

////////////////////////////////////////////////////////////////////////////////
// Whole categories
////////////////////////////////////////////////////////////////////////////////

/// Decode the 12-byte air data buffer.
///
/// | Bytes | Quantity                           |
/// |-------|------------------------------------|
/// | 0–1   | temperature (signed-magnitude)     |
/// | 2–5   | pressure, `u32` LE                 |
/// | 6–7   | humidity, 1 decimal place          |
/// | 8–11  | gas sensor resistance, `u32` LE    |
///
/// Both Celsius and Fahrenheit temperatures are filled in; `unit` selects which one
/// [`AirData::temperature`] returns.
pub fn decode_air(raw: &[u8], unit: TemperatureUnit) -> Result<AirData, ProtocolError> {
    check_category(raw, Category::Air)?;
    let temperature_c = decode_temperature(&raw[0..2])?;
    Ok(AirData {
        temperature_c,
        temperature_f: celsius_to_fahrenheit(temperature_c),
        temperature_unit: unit,
        pressure_pa: decode_pressure(&raw[2..6])?,
        humidity_percent: decode_humidity(&raw[6..8])?,
        gas_resistance_ohm: decode_gas_resistance(&raw[8..12])?,
    })
}

/// Decode the 10-byte air quality data buffer.
///
/// Bytes 0–2 hold the AQI, 3–5 the estimated CO₂, 6–8 the breath VOC (two decimal
/// places) and byte 9 the accuracy code.
pub fn decode_air_quality(raw: &[u8]) -> Result<AirQualityData, ProtocolError> {
    check_category(raw, Category::AirQuality)?;
    Ok(AirQualityData {
        aqi: decode_aqi(&raw[0..3])?,
        co2e_ppm: decode_co2e(&raw[3..6])?,
        bvoc_ppm: decode_bvoc(&raw[6..9])?,
        accuracy_code: raw[9],
    })
}

/// Decode the 5-byte light data buffer.
pub fn decode_light(raw: &[u8]) -> Result<LightData, ProtocolError> {
    check_category(raw, Category::Light)?;
    Ok(LightData {
        illuminance_lux: decode_illuminance(&raw[0..3])?,
        white_level: decode_white_level(&raw[3..5])?,
    })
}

/// Decode the 18-byte sound data buffer.
///
/// Bytes 0–1 hold the A-weighted SPL, 2–13 the band SPLs (see [`decode_band_spl`]
/// for their layout), 14–16 the peak amplitude and byte 17 the stability flag.
pub fn decode_sound(raw: &[u8]) -> Result<SoundData, ProtocolError> {
    check_category(raw, Category::Sound)?;
    Ok(SoundData {
        spl_dba: decode_spl(&raw[0..2])?,
        band_spl_db: decode_band_spl(&raw[2..14])?,
        peak_amplitude_mpa: decode_sound_peak(&raw[14..17])?,
        stable: raw[17] != 0,
    })
}

/// Decode the 6-byte particle data buffer.
///
/// With no particle sensor selected the buffer is ignored (it may be empty) and a
/// zeroed, invalid reading is returned.
pub fn decode_particle(raw: &[u8], sensor: ParticleSensor) -> Result<ParticleData, ProtocolError> {
    if sensor == ParticleSensor::Off {
        return Ok(ParticleData::default());
    }
    check_category(raw, Category::Particle)?;
    Ok(ParticleData {
        duty_cycle_percent: decode_duty_cycle(&raw[0..2])?,
        concentration: decode_concentration(&raw[2..5])?,
        sensor,
        valid: raw[5] != 0,
    })
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    const AIR: [u8; 12] = [
        22, 7, // 22.7 °C
        0xA0, 0x86, 0x01, 0x00, // 100,000 Pa
        45, 2, // 45.2 %
        0x40, 0x42, 0x0F, 0x00, // 1,000,000 Ω
    ];

    #[test]
    fn air() {
        let air = decode_air(&AIR, TemperatureUnit::Celsius).unwrap();
        assert_approx_eq!(air.temperature_c, 22.7, 1e-4);
        assert_approx_eq!(air.temperature_f, 72.86, 1e-3);
        assert_eq!(air.pressure_pa, 100_000);
        assert_approx_eq!(air.humidity_percent, 45.2, 1e-4);
        assert_eq!(air.gas_resistance_ohm, 1_000_000);
        assert_eq!(air.temperature(), air.temperature_c);
    }

    #[test]
    fn air_fahrenheit_selection() {
        let air = decode_air(&AIR, TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(air.temperature(), air.temperature_f);
        assert_eq!(air.temperature_unit.symbol(), "°F");
    }

    #[test]
    fn negative_temperature() {
        let mut raw = AIR;
        raw[0] = 0x80 | 3;
        raw[1] = 5;
        let air = decode_air(&raw, TemperatureUnit::Celsius).unwrap();
        assert_approx_eq!(air.temperature_c, -3.5, 1e-4);
    }

    #[test]
    fn temperature_sign_bit_for_every_first_byte() {
        for byte0 in 0..=u8::MAX {
            for byte1 in [0u8, 1, 9] {
                let expected = f32::from(byte0 & 0x7F) + f32::from(byte1) / 10.0;
                let expected = if byte0 & 0x80 != 0 { -expected } else { expected };
                let mut raw = AIR;
                raw[0] = byte0;
                raw[1] = byte1;
                let air = decode_air(&raw, TemperatureUnit::Celsius).unwrap();
                assert_eq!(air.temperature_c, expected, "byte0 = {byte0:#04X}");
            }
        }
    }

    #[test]
    fn wrong_length_is_rejected_before_decoding() {
        assert_eq!(
            decode_air(&AIR[..11], TemperatureUnit::Celsius),
            Err(ProtocolError::MalformedBuffer {
                name: "air",
                expected: 12,
                actual: 11
            })
        );
        assert!(decode_sound(&[0u8; 19]).is_err());
        assert!(decode_light(&[]).is_err());
        assert!(decode_air_quality(&[0u8; 9]).is_err());
        assert!(decode_particle(&[0u8; 5], ParticleSensor::Sds011).is_err());
    }

    #[test]
    fn air_quality() {
        let raw = [
            0x2C, 0x01, 5, // AQI 300.5
            0x20, 0x03, 4, // CO2e 800.4
            0x01, 0x00, 25, // bVOC 1.25
            3,
        ];
        let aq = decode_air_quality(&raw).unwrap();
        assert_approx_eq!(aq.aqi, 300.5, 1e-3);
        assert_approx_eq!(aq.co2e_ppm, 800.4, 1e-3);
        assert_approx_eq!(aq.bvoc_ppm, 1.25, 1e-4);
        assert_eq!(aq.accuracy_code, 3);
        assert!(aq.is_valid());
    }

    #[test]
    fn light() {
        let light = decode_light(&[0x9E, 0x0E, 0, 0x10, 0x27]).unwrap();
        assert_eq!(light.illuminance_lux, 3742.0);
        assert_eq!(light.white_level, 10_000);
    }

    #[test]
    fn sound_bands_are_not_interleaved() {
        let raw = [10, 0, 20, 21, 22, 23, 24, 25, 1, 2, 3, 4, 5, 6, 50, 1, 10, 1];
        let sound = decode_sound(&raw).unwrap();
        assert_eq!(sound.spl_dba, 10.0);
        assert_approx_eq!(sound.band_spl_db[0], 20.1, 1e-4);
        assert_approx_eq!(sound.band_spl_db[1], 21.2, 1e-4);
        assert_approx_eq!(sound.band_spl_db[5], 25.6, 1e-4);
        // 0x0132 + 10/100
        assert_approx_eq!(sound.peak_amplitude_mpa, 306.1, 1e-3);
        assert!(sound.stable);
    }

    #[test]
    fn particle_with_sensor() {
        let raw = [12, 34, 0xE8, 0x03, 50, 1];
        let particle = decode_particle(&raw, ParticleSensor::Sds011).unwrap();
        assert_approx_eq!(particle.duty_cycle_percent, 12.34, 1e-4);
        assert_approx_eq!(particle.concentration, 1000.5, 1e-3);
        assert!(particle.valid);
        assert_eq!(particle.concentration_unit(), "µg/m³");
    }

    #[test]
    fn particle_is_pure() {
        let raw = [1, 2, 3, 4, 5, 0];
        let first = decode_particle(&raw, ParticleSensor::Ppd42).unwrap();
        let second = decode_particle(&raw, ParticleSensor::Ppd42).unwrap();
        assert_eq!(first.duty_cycle_percent.to_bits(), second.duty_cycle_percent.to_bits());
        assert_eq!(first.concentration.to_bits(), second.concentration.to_bits());
        assert_eq!(first, second);
        assert!(!first.valid);
    }

    #[test]
    fn particle_sensor_off_needs_no_buffer() {
        let particle = decode_particle(&[], ParticleSensor::Off).unwrap();
        assert_eq!(particle, ParticleData::default());
        assert!(!particle.valid);
    }

    #[test]
    fn humidity_quantity() {
        assert_approx_eq!(decode_humidity(&[55, 3]).unwrap(), 55.3, 1e-4);
        assert_eq!(decode_humidity(&[0, 200]).unwrap(), 20.0);
        assert!(decode_humidity(&[55]).is_err());
    }
}
