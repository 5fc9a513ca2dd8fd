//! Driver behaviour against mocked I2C and ready-line traffic.
use assert_approx_eq::assert_approx_eq;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

use ms430_hal::{
    CyclePeriod, DeviceMode, EdgeSignal, Error, FallingEdge, I2cAddress, InterruptType,
    LightInterruptConfig, LightPolarity, LightThreshold, Ms430, OperationalMode, ParticleSensor,
    ProtocolError, SoundInterruptConfig, SoundThreshold, TemperatureUnit,
};

const ADDRESS: u8 = 0x71;

const AIR: [u8; 12] = [22, 7, 0xA0, 0x86, 0x01, 0x00, 45, 2, 0x40, 0x42, 0x0F, 0x00];
const AIR_QUALITY: [u8; 10] = [0x32, 0x00, 5, 0x20, 0x03, 4, 0x01, 0x00, 25, 2];
const LIGHT: [u8; 5] = [0xC8, 0x00, 50, 0x10, 0x27];
const SOUND: [u8; 18] = [10, 0, 20, 21, 22, 23, 24, 25, 1, 2, 3, 4, 5, 6, 50, 1, 10, 1];

type Driver = Ms430<I2cMock, FallingEdge<PinMock>>;

fn driver(i2c: &[I2cTransaction], ready: &[PinTransaction]) -> Driver {
    Ms430::new(
        I2cMock::new(i2c),
        FallingEdge::new(PinMock::new(ready)),
        I2cAddress::SolderBridgeOpen,
    )
}

fn finish(ms430: Driver) {
    let (mut i2c, ready) = ms430.release();
    i2c.done();
    ready.release().done();
}

fn read(register: u8, response: &[u8]) -> I2cTransaction {
    I2cTransaction::write_read(ADDRESS, vec![register], response.to_vec())
}

fn write(bytes: &[u8]) -> I2cTransaction {
    I2cTransaction::write(ADDRESS, bytes.to_vec())
}

/// Driver already in cycle mode with a 3 s period.
fn cycling(i2c_after: &[I2cTransaction], ready: &[PinTransaction]) -> Driver {
    let mut i2c = vec![write(&[0x89, 0]), write(&[0xE4])];
    i2c.extend_from_slice(i2c_after);
    let mut ms430 = driver(&i2c, ready);
    ms430.enter_cycle_mode(CyclePeriod::Seconds3).unwrap();
    ms430
}

#[test]
fn reset_waits_for_ready_line() {
    let ready = [
        // Still initialising after power-up.
        PinTransaction::get(State::High),
        PinTransaction::get(State::Low),
        // After the reset command.
        PinTransaction::get(State::High),
        PinTransaction::get(State::High),
        PinTransaction::get(State::Low),
        // Edges cleared.
        PinTransaction::get(State::Low),
    ];
    let mut ms430 = driver(&[write(&[0xE2])], &ready);
    ms430.reset(&mut NoopDelay::new()).unwrap();
    assert_eq!(ms430.mode(), DeviceMode::Standby);
    finish(ms430);
}

#[test]
fn edge_during_reset_is_not_reported_as_data() {
    let ready = [
        PinTransaction::get(State::Low),
        PinTransaction::get(State::High),
        PinTransaction::get(State::Low),
        PinTransaction::get(State::Low),
        // data_ready afterwards
        PinTransaction::get(State::Low),
    ];
    let mut ms430 = driver(&[write(&[0xE2])], &ready);
    ms430.reset(&mut NoopDelay::new()).unwrap();
    assert!(!ms430.data_ready().unwrap());
    finish(ms430);
}

#[test]
fn reset_clears_particle_sensor_selection() {
    let ready = [
        PinTransaction::get(State::Low),
        PinTransaction::get(State::Low),
        PinTransaction::get(State::Low),
    ];
    let mut ms430 = driver(&[write(&[0x07, 1]), write(&[0xE2])], &ready);
    ms430.select_particle_sensor(ParticleSensor::Ppd42).unwrap();
    ms430.reset(&mut NoopDelay::new()).unwrap();
    assert_eq!(ms430.particle_sensor(), ParticleSensor::Off);
    finish(ms430);
}

#[test]
fn cycle_mode_read_all() {
    let i2c = [
        read(0x10, &AIR),
        read(0x11, &AIR_QUALITY),
        read(0x12, &LIGHT),
        read(0x13, &SOUND),
    ];
    let ready = [
        PinTransaction::get(State::High),
        PinTransaction::get(State::High),
        PinTransaction::get(State::Low),
    ];
    let mut ms430 = cycling(&i2c, &ready);
    assert_eq!(ms430.mode(), DeviceMode::Cycle(CyclePeriod::Seconds3));

    ms430.wait_for_data_ready(&mut NoopDelay::new()).unwrap();
    let readings = ms430.read_all().unwrap();

    assert_approx_eq!(readings.air.temperature(), 22.7, 1e-4);
    assert_eq!(readings.air.pressure_pa, 100_000);
    let air_quality = readings.air_quality.unwrap();
    assert_approx_eq!(air_quality.aqi, 50.5, 1e-4);
    assert_approx_eq!(air_quality.bvoc_ppm, 1.25, 1e-4);
    assert!(air_quality.is_valid());
    assert_approx_eq!(readings.light.illuminance_lux, 200.5, 1e-4);
    assert_approx_eq!(readings.sound.band_spl_db[0], 20.1, 1e-4);
    assert!(readings.particle.is_none());
    finish(ms430);
}

#[test]
fn cycle_mode_read_all_with_particle_sensor() {
    let i2c = [
        write(&[0x07, 1]),
        write(&[0x89, 0]),
        write(&[0xE4]),
        read(0x10, &AIR),
        read(0x11, &AIR_QUALITY),
        read(0x12, &LIGHT),
        read(0x13, &SOUND),
        read(0x14, &[3, 5, 0xE8, 0x03, 25, 0]),
    ];
    let ready = [PinTransaction::get(State::High), PinTransaction::get(State::Low)];
    let mut ms430 = driver(&i2c, &ready);
    ms430.select_particle_sensor(ParticleSensor::Ppd42).unwrap();
    ms430.enter_cycle_mode(CyclePeriod::Seconds3).unwrap();
    ms430.wait_for_data_ready(&mut NoopDelay::new()).unwrap();
    let readings = ms430.read_all().unwrap();

    assert!(readings.air_quality.is_some());
    let particle = readings.particle.unwrap();
    assert_eq!(particle.sensor, ParticleSensor::Ppd42);
    assert_approx_eq!(particle.duty_cycle_percent, 3.05, 1e-4);
    assert_approx_eq!(particle.concentration, 1000.25, 1e-3);
    assert!(!particle.valid);
    assert_eq!(particle.concentration_unit(), "ppL");
    finish(ms430);
}

#[test]
fn on_demand_read_all_has_no_air_quality() {
    let i2c = [
        write(&[0xE1]),
        read(0x10, &AIR),
        read(0x12, &LIGHT),
        read(0x13, &SOUND),
    ];
    let ready = [PinTransaction::get(State::High), PinTransaction::get(State::Low)];
    let mut ms430 = driver(&i2c, &ready);
    ms430.enter_on_demand_mode().unwrap();
    ms430.measure_on_demand().unwrap();
    ms430.wait_for_data_ready(&mut NoopDelay::new()).unwrap();
    let readings = ms430.read_all().unwrap();
    assert!(readings.air_quality.is_none());
    finish(ms430);
}

/// Ready line with a hardware edge latch. Each entry of `pulses` says whether a
/// falling edge happened before the matching poll; the level is always high when
/// polled.
struct LatchingLine {
    pulses: std::vec::IntoIter<bool>,
    polls: usize,
}

impl EdgeSignal for LatchingLine {
    type Error = core::convert::Infallible;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn take_falling_edge(&mut self) -> Result<bool, Self::Error> {
        self.polls += 1;
        Ok(self.pulses.next().unwrap_or(false))
    }

    fn clear_edges(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn pulse_between_polls_releases_data() {
    let line = LatchingLine {
        pulses: vec![false, false, true].into_iter(),
        polls: 0,
    };
    let mut ms430 = Ms430::new(
        I2cMock::new(&[write(&[0xE1])]),
        line,
        I2cAddress::SolderBridgeOpen,
    );
    ms430.enter_on_demand_mode().unwrap();
    ms430.measure_on_demand().unwrap();
    ms430.wait_for_data_ready(&mut NoopDelay::new()).unwrap();
    assert!(!ms430.data_ready().unwrap());

    let (mut i2c, line) = ms430.release();
    i2c.done();
    assert_eq!(line.polls, 4);
}

#[test]
fn air_quality_requires_cycle_mode() {
    let mut ms430 = driver(&[], &[]);
    ms430.enter_on_demand_mode().unwrap();
    assert!(matches!(
        ms430.read_air_quality_data(),
        Err(Error::WrongMode {
            mode: DeviceMode::OnDemand,
            ..
        })
    ));
    assert!(matches!(ms430.read_aqi(), Err(Error::WrongMode { .. })));
    finish(ms430);
}

#[test]
fn waiting_in_standby_is_refused() {
    let mut ms430 = driver(&[], &[]);
    assert!(matches!(
        ms430.wait_for_data_ready(&mut NoopDelay::new()),
        Err(Error::WrongMode {
            mode: DeviceMode::Standby,
            ..
        })
    ));
    finish(ms430);
}

#[test]
fn illegal_transitions_make_no_bus_traffic() {
    let mut ms430 = cycling(&[], &[]);
    assert!(matches!(
        ms430.enter_cycle_mode(CyclePeriod::Seconds100),
        Err(Error::WrongMode { .. })
    ));
    assert!(matches!(
        ms430.enter_on_demand_mode(),
        Err(Error::WrongMode { .. })
    ));
    assert!(matches!(
        ms430.measure_on_demand(),
        Err(Error::WrongMode { .. })
    ));
    assert_eq!(ms430.mode(), DeviceMode::Cycle(CyclePeriod::Seconds3));
    finish(ms430);
}

#[test]
fn standby_from_cycle_mode() {
    let mut ms430 = cycling(&[write(&[0xE5]), write(&[0x89, 2]), write(&[0xE4])], &[]);
    ms430.enter_standby().unwrap();
    assert_eq!(ms430.mode(), DeviceMode::Standby);
    ms430.enter_cycle_mode(CyclePeriod::Seconds300).unwrap();
    finish(ms430);
}

#[test]
fn particle_sensor_off_reads_nothing() {
    let mut ms430 = driver(&[], &[]);
    let particle = ms430.read_particle_data().unwrap();
    assert!(!particle.valid);
    assert_eq!(particle.concentration, 0.0);
    finish(ms430);
}

#[test]
fn particle_sensor_selection() {
    let i2c = [write(&[0x07, 2]), read(0x14, &[12, 34, 0x10, 0x00, 50, 1])];
    let mut ms430 = driver(&i2c, &[]);
    ms430.select_particle_sensor(ParticleSensor::Sds011).unwrap();
    let particle = ms430.read_particle_data().unwrap();
    assert_approx_eq!(particle.duty_cycle_percent, 12.34, 1e-4);
    assert_approx_eq!(particle.concentration, 16.5, 1e-4);
    assert!(particle.valid);
    assert_eq!(particle.concentration_unit(), "µg/m³");
    finish(ms430);
}

#[test]
fn light_interrupt_configuration_order() {
    let i2c = [
        write(&[0x83, 1]),
        write(&[0x82, 0xE8, 0x03, 25]),
        write(&[0x84, 1]),
        write(&[0x81, 1]),
    ];
    let mut ms430 = driver(&i2c, &[]);
    let config = LightInterruptConfig {
        interrupt_type: InterruptType::Comparator,
        threshold: LightThreshold::new(1000, 25).unwrap(),
        polarity: LightPolarity::Negative,
    };
    ms430.configure_light_interrupt(&config).unwrap();
    finish(ms430);
}

#[test]
fn light_interrupt_read_back() {
    let i2c = [
        read(0x81, &[1]),
        read(0x83, &[0]),
        read(0x82, &[0x64, 0x00, 0]),
        read(0x84, &[0]),
        write(&[0x81, 0]),
        read(0x81, &[0]),
    ];
    let mut ms430 = driver(&i2c, &[]);
    let config = ms430.read_light_interrupt_config().unwrap().unwrap();
    assert_eq!(config.interrupt_type, InterruptType::Latch);
    assert_eq!(config.threshold, LightThreshold::new(100, 0).unwrap());
    assert_eq!(config.polarity, LightPolarity::Positive);
    ms430.disable_light_interrupt().unwrap();
    assert_eq!(ms430.read_light_interrupt_config().unwrap(), None);
    finish(ms430);
}

#[test]
fn sound_interrupt_configure_and_clear() {
    let i2c = [
        write(&[0x87, 0]),
        write(&[0x86, 0xF4, 0x01]),
        write(&[0x85, 1]),
        write(&[0xE7]),
        write(&[0xE6]),
        read(0x85, &[1]),
        read(0x87, &[0]),
        read(0x86, &[0xF4, 0x01]),
    ];
    let mut ms430 = driver(&i2c, &[]);
    let config = SoundInterruptConfig {
        interrupt_type: InterruptType::Latch,
        threshold: SoundThreshold(500),
    };
    ms430.configure_sound_interrupt(&config).unwrap();
    ms430.clear_sound_interrupt().unwrap();
    ms430.clear_light_interrupt().unwrap();
    assert_eq!(ms430.read_sound_interrupt_config().unwrap(), Some(config));
    finish(ms430);
}

#[test]
fn operational_mode_and_cycle_period() {
    let i2c = [read(0x8A, &[1]), read(0x89, &[1]), read(0x8A, &[7])];
    let mut ms430 = driver(&i2c, &[]);
    assert_eq!(ms430.read_operational_mode().unwrap(), OperationalMode::Cycle);
    assert_eq!(ms430.read_cycle_period().unwrap(), CyclePeriod::Seconds100);
    assert!(matches!(
        ms430.read_operational_mode(),
        Err(Error::Protocol(ProtocolError::UnsupportedConfiguration { value: 7, .. }))
    ));
    finish(ms430);
}

#[test]
fn individual_quantities() {
    let i2c = [
        read(0x21, &[0x80 | 2, 5]),
        read(0x21, &[20, 0]),
        read(0x23, &[55, 3]),
        read(0x31, &[0xC8, 0x00, 50]),
        read(0x42, &SOUND[2..14]),
    ];
    let mut ms430 = driver(&i2c, &[]);
    assert_approx_eq!(ms430.read_temperature().unwrap(), -2.5, 1e-4);
    ms430.set_temperature_unit(TemperatureUnit::Fahrenheit);
    assert_approx_eq!(ms430.read_temperature().unwrap(), 68.0, 1e-4);
    assert_approx_eq!(ms430.read_humidity().unwrap(), 55.3, 1e-4);
    assert_approx_eq!(ms430.read_illuminance().unwrap(), 200.5, 1e-4);
    let bands = ms430.read_band_spl().unwrap();
    assert_approx_eq!(bands[0], 20.1, 1e-4);
    assert_approx_eq!(bands[5], 25.6, 1e-4);
    finish(ms430);
}

#[test]
fn bus_errors_pass_through() {
    let i2c = [write(&[0x07, 1]).with_error(ErrorKind::Other)];
    let mut ms430 = driver(&i2c, &[]);
    assert!(matches!(
        ms430.select_particle_sensor(ParticleSensor::Ppd42),
        Err(Error::Transport(ErrorKind::Other))
    ));
    // The selection only takes effect once written.
    assert_eq!(ms430.particle_sensor(), ParticleSensor::Off);
    finish(ms430);
}
