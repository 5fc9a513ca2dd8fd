//! Formatting of readings for the terminal.
use ms430_hal::history::{FieldSummary, HistorySummary};
use ms430_hal::registers::SOUND_BAND_MIDS_HZ;
use ms430_hal::{
    AirData, AirQualityData, LightData, ParticleData, Readings, SoundData, TemperatureUnit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// One labelled value per line
    Text,
    /// All values on one line, separated by spaces
    Columns,
    /// One JSON object per line
    Json,
}

/// Format a full set of readings, ending with a newline.
pub(crate) fn format_readings(
    readings: &Readings,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    match format {
        OutputFormat::Text => {
            air_text(&mut out, &readings.air);
            if let Some(air_quality) = &readings.air_quality {
                air_quality_text(&mut out, air_quality);
            }
            light_text(&mut out, &readings.light);
            sound_text(&mut out, &readings.sound);
            if let Some(particle) = &readings.particle {
                particle_text(&mut out, particle);
            }
        }
        OutputFormat::Columns => {
            air_columns(&mut out, &readings.air);
            if let Some(air_quality) = &readings.air_quality {
                air_quality_columns(&mut out, air_quality);
            }
            light_columns(&mut out, &readings.light);
            sound_columns(&mut out, &readings.sound);
            if let Some(particle) = &readings.particle {
                particle_columns(&mut out, particle);
            }
            // Drop the trailing separator.
            out.pop();
        }
        OutputFormat::Json => out = serde_json::to_string(readings)?,
    }
    out.push('\n');
    Ok(out)
}

fn air_text(out: &mut String, air: &AirData) {
    out.push_str(&format!(
        "Temperature = {:.1} {}\n",
        air.temperature(),
        air.temperature_unit.symbol()
    ));
    out.push_str(&format!("Pressure = {} Pa\n", air.pressure_pa));
    out.push_str(&format!("Humidity = {:.1} %\n", air.humidity_percent));
    out.push_str(&format!("Gas Sensor Resistance = {} \u{03A9}\n", air.gas_resistance_ohm));
}

fn air_quality_text(out: &mut String, air_quality: &AirQualityData) {
    if air_quality.is_valid() {
        out.push_str(&format!(
            "Air Quality Index = {:.1} ({})\n",
            air_quality.aqi,
            air_quality.rating()
        ));
        out.push_str(&format!("Estimated CO\u{2082} = {:.1} ppm\n", air_quality.co2e_ppm));
        out.push_str(&format!("Equivalent Breath VOC = {:.2} ppm\n", air_quality.bvoc_ppm));
    }
    out.push_str(&format!("Air Quality Accuracy: {}\n", air_quality.accuracy()));
}

fn light_text(out: &mut String, light: &LightData) {
    out.push_str(&format!("Illuminance = {:.2} lux\n", light.illuminance_lux));
    out.push_str(&format!("White Light Level = {}\n", light.white_level));
}

fn sound_text(out: &mut String, sound: &SoundData) {
    out.push_str(&format!(
        "A-weighted Sound Pressure Level = {:.1} dBA\n",
        sound.spl_dba
    ));
    for (band, (spl, mid)) in (1..).zip(sound.band_spl_db.iter().zip(SOUND_BAND_MIDS_HZ)) {
        out.push_str(&format!("Frequency Band {band} ({mid} Hz) SPL = {spl:.1} dB\n"));
    }
    out.push_str(&format!(
        "Peak Sound Amplitude = {:.2} mPa\n",
        sound.peak_amplitude_mpa
    ));
}

fn particle_text(out: &mut String, particle: &ParticleData) {
    out.push_str(&format!(
        "Particle Sensor Duty Cycle = {:.2} %\n",
        particle.duty_cycle_percent
    ));
    out.push_str(&format!(
        "Particle Concentration = {:.2} {}\n",
        particle.concentration,
        particle.concentration_unit()
    ));
    let validity = if particle.valid {
        "Yes"
    } else {
        "No (Initializing)"
    };
    out.push_str(&format!("Particle data valid: {validity}\n"));
}

fn air_columns(out: &mut String, air: &AirData) {
    out.push_str(&format!(
        "{:.1} {} {:.1} {} ",
        air.temperature(),
        air.pressure_pa,
        air.humidity_percent,
        air.gas_resistance_ohm
    ));
}

fn air_quality_columns(out: &mut String, air_quality: &AirQualityData) {
    out.push_str(&format!(
        "{:.1} {:.1} {:.2} {} ",
        air_quality.aqi, air_quality.co2e_ppm, air_quality.bvoc_ppm, air_quality.accuracy_code
    ));
}

fn light_columns(out: &mut String, light: &LightData) {
    out.push_str(&format!("{:.2} {} ", light.illuminance_lux, light.white_level));
}

fn sound_columns(out: &mut String, sound: &SoundData) {
    out.push_str(&format!("{:.1} ", sound.spl_dba));
    for spl in sound.band_spl_db {
        out.push_str(&format!("{spl:.1} "));
    }
    out.push_str(&format!(
        "{:.2} {} ",
        sound.peak_amplitude_mpa,
        u8::from(sound.stable)
    ));
}

fn particle_columns(out: &mut String, particle: &ParticleData) {
    out.push_str(&format!(
        "{:.2} {:.2} {} ",
        particle.duty_cycle_percent,
        particle.concentration,
        u8::from(particle.valid)
    ));
}

/// Format the min, mean and max of a history, ending with a newline.
pub(crate) fn format_summary(
    summary: &HistorySummary,
    unit: TemperatureUnit,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        let mut out = serde_json::to_string(summary)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Last {} readings (min / mean / max):\n",
        summary.samples
    ));
    let fields: [(&str, Option<FieldSummary>, &str, usize); 8] = [
        ("Temperature", summary.temperature, unit.symbol(), 1),
        ("Pressure", summary.pressure_pa, "Pa", 0),
        ("Humidity", summary.humidity_percent, "%", 1),
        ("Air Quality Index", summary.aqi, "", 1),
        ("Equivalent Breath VOC", summary.bvoc_ppm, "ppm", 2),
        ("Sound Pressure Level", summary.spl_dba, "dBA", 1),
        ("Illuminance", summary.illuminance_lux, "lux", 2),
        ("Particle Concentration", summary.particle_concentration, "", 2),
    ];
    for (name, field, unit, places) in fields {
        if let Some(FieldSummary { min, mean, max }) = field {
            out.push_str(&format!(
                "  {name} = {min:.places$} / {mean:.places$} / {max:.places$} {unit}\n"
            ));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use ms430_hal::ParticleSensor;

    use super::*;

    fn readings() -> Readings {
        Readings {
            air: AirData {
                temperature_c: 22.4,
                temperature_f: 72.32,
                temperature_unit: TemperatureUnit::Celsius,
                pressure_pa: 101_325,
                humidity_percent: 55.3,
                gas_resistance_ohm: 84_000,
            },
            air_quality: Some(AirQualityData {
                aqi: 37.5,
                co2e_ppm: 512.3,
                bvoc_ppm: 0.57,
                accuracy_code: 2,
            }),
            light: LightData {
                illuminance_lux: 311.07,
                white_level: 812,
            },
            sound: SoundData {
                spl_dba: 48.2,
                band_spl_db: [20.1, 31.0, 40.5, 42.2, 38.9, 27.3],
                peak_amplitude_mpa: 12.34,
                stable: true,
            },
            particle: None,
        }
    }

    #[test]
    fn text_lines() {
        let out = format_readings(&readings(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Temperature = 22.4 °C");
        assert_eq!(lines[1], "Pressure = 101325 Pa");
        assert_eq!(lines[2], "Humidity = 55.3 %");
        assert_eq!(lines[3], "Gas Sensor Resistance = 84000 Ω");
        assert_eq!(lines[4], "Air Quality Index = 37.5 (Good)");
        assert_eq!(lines[5], "Estimated CO₂ = 512.3 ppm");
        assert_eq!(lines[6], "Equivalent Breath VOC = 0.57 ppm");
        assert!(lines[7].starts_with("Air Quality Accuracy: Medium"));
        assert_eq!(lines[8], "Illuminance = 311.07 lux");
        assert_eq!(lines[11], "Frequency Band 1 (125 Hz) SPL = 20.1 dB");
        assert_eq!(lines[16], "Frequency Band 6 (4000 Hz) SPL = 27.3 dB");
        assert_eq!(lines.last(), Some(&"Peak Sound Amplitude = 12.34 mPa"));
    }

    #[test]
    fn text_hides_air_quality_until_valid() {
        let mut readings = readings();
        if let Some(air_quality) = readings.air_quality.as_mut() {
            air_quality.accuracy_code = 0;
        }
        let out = format_readings(&readings, OutputFormat::Text).unwrap();
        assert!(!out.contains("Air Quality Index"));
        assert!(!out.contains("CO₂"));
        assert!(out.contains("Air Quality Accuracy: Not yet valid"));
    }

    #[test]
    fn text_particle_data() {
        let mut readings = readings();
        readings.particle = Some(ParticleData {
            duty_cycle_percent: 1.5,
            concentration: 7.25,
            sensor: ParticleSensor::Sds011,
            valid: false,
        });
        let out = format_readings(&readings, OutputFormat::Text).unwrap();
        assert!(out.contains("Particle Sensor Duty Cycle = 1.50 %\n"));
        assert!(out.contains("Particle Concentration = 7.25 µg/m³\n"));
        assert!(out.ends_with("Particle data valid: No (Initializing)\n"));
    }

    #[test]
    fn fahrenheit_text() {
        let mut readings = readings();
        readings.air.temperature_unit = TemperatureUnit::Fahrenheit;
        let out = format_readings(&readings, OutputFormat::Text).unwrap();
        assert!(out.starts_with("Temperature = 72.3 °F\n"));
    }

    #[test]
    fn columns() {
        let out = format_readings(&readings(), OutputFormat::Columns).unwrap();
        assert_eq!(
            out,
            "22.4 101325 55.3 84000 37.5 512.3 0.57 2 311.07 812 \
             48.2 20.1 31.0 40.5 42.2 38.9 27.3 12.34 1\n"
        );
    }

    #[test]
    fn json_object_per_line() {
        let out = format_readings(&readings(), OutputFormat::Json).unwrap();
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["air"]["pressure_pa"], 101_325);
        assert_eq!(value["light"]["white_level"], 812);
        assert!(value["particle"].is_null());
    }

    #[test]
    fn summary_skips_missing_fields() {
        let summary = HistorySummary {
            samples: 2,
            temperature: Some(FieldSummary {
                min: 20.0,
                mean: 21.0,
                max: 22.0,
            }),
            pressure_pa: None,
            humidity_percent: None,
            aqi: None,
            bvoc_ppm: None,
            spl_dba: None,
            illuminance_lux: None,
            particle_concentration: None,
        };
        let out =
            format_summary(&summary, TemperatureUnit::Celsius, OutputFormat::Text).unwrap();
        assert_eq!(
            out,
            "Last 2 readings (min / mean / max):\n  Temperature = 20.0 / 21.0 / 22.0 °C\n"
        );
    }
}
