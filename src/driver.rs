use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, I2c};

use crate::data::{
    AirData, AirQualityData, LightData, ParticleData, ParticleSensor, Readings, SoundData,
    TemperatureUnit,
};
use crate::decode;
use crate::error::Error;
use crate::interrupts::{
    LightInterruptConfig, LightInterruptRegisters, SoundInterruptConfig, SoundInterruptRegisters,
};
use crate::mode::{CyclePeriod, DeviceMode, OperationalMode};
use crate::registers::{
    Category, Command, I2cAddress, OPERATIONAL_MODE_READ, Quantity, SOUND_FREQ_BANDS, Setting,
};
use crate::signal::EdgeSignal;

/// Interval between samples of the ready line while waiting.
const READY_POLL_MS: u32 = 50;

/// Time for the board to act on a reset command before the ready line is checked.
const RESET_SETTLE_MS: u32 = 5;

/// Longest buffer of any category, used as scratch space for reads.
const MAX_READ_LEN: usize = Category::Sound.byte_len();

/// Longest settings payload plus the register byte.
const MAX_WRITE_LEN: usize = 1 + Setting::LightInterruptThreshold.byte_len();

type DriverError<I2C, R> = Error<<I2C as i2c::ErrorType>::Error, <R as EdgeSignal>::Error>;
type DriverResult<T, I2C, R> = Result<T, DriverError<I2C, R>>;

/// Driver for the MS430.
///
/// # Quick start
///
/// Construct the driver with an I2C bus, the board's READY line (see
/// [`FallingEdge`](crate::FallingEdge) for a plain input pin) and the board address,
/// then call [`Ms430::reset`] to bring the board to a known state.
///
/// ```no_run
/// # use embedded_hal::{delay::DelayNs, digital::InputPin, i2c::I2c};
/// # fn example<I: I2c, P: InputPin>(i2c: I, pin: P, mut delay: impl DelayNs)
/// #     -> Result<(), Box<dyn std::error::Error>> {
/// use ms430_hal::{CyclePeriod, FallingEdge, I2cAddress, Ms430};
///
/// let mut ms430 = Ms430::new(i2c, FallingEdge::new(pin), I2cAddress::default());
/// ms430.reset(&mut delay).map_err(|e| format!("{e:?}"))?;
/// ms430.enter_cycle_mode(CyclePeriod::Seconds3).map_err(|e| format!("{e:?}"))?;
/// loop {
///     ms430.wait_for_data_ready(&mut delay).map_err(|e| format!("{e:?}"))?;
///     let readings = ms430.read_all().map_err(|e| format!("{e:?}"))?;
///     println!("{:.1} °C", readings.air.temperature());
/// }
/// # }
/// ```
///
/// # Modes
///
/// The driver tracks the board's [`DeviceMode`] and checks it before each
/// operation that depends on it. Operations that are not possible in the current
/// mode return [`Error::WrongMode`] without any bus traffic.
///
/// The driver assumes it is the only thing talking to the board. If the board is
/// reset or reconfigured behind its back, call [`Ms430::reset`] to resynchronise.
#[derive(Debug)]
pub struct Ms430<I2C, R> {
    i2c: I2C,
    ready: R,
    address: u8,
    mode: DeviceMode,
    particle_sensor: ParticleSensor,
    temperature_unit: TemperatureUnit,
}

impl<I2C, R> Ms430<I2C, R>
where
    I2C: I2c,
    R: EdgeSignal,
{
    /// Create the driver. No bus traffic occurs until a method is called.
    pub fn new(i2c: I2C, ready: R, address: I2cAddress) -> Self {
        Self {
            i2c,
            ready,
            address: address.into(),
            mode: DeviceMode::Standby,
            particle_sensor: ParticleSensor::Off,
            temperature_unit: TemperatureUnit::Celsius,
        }
    }

    /// Destroy the driver, returning the bus and the ready line.
    ///
    /// The board is left in whatever mode it was in.
    pub fn release(self) -> (I2C, R) {
        (self.i2c, self.ready)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Bus primitives
    ////////////////////////////////////////////////////////////////////////////////

    fn write_command(&mut self, command: Command) -> DriverResult<(), I2C, R> {
        log::debug!("Command {command:?} ({:#04X})", command.code());
        self.i2c
            .write(self.address, &[command.code()])
            .map_err(Error::Transport)
    }

    fn write_setting(&mut self, setting: Setting, payload: &[u8]) -> DriverResult<(), I2C, R> {
        debug_assert_eq!(payload.len(), setting.byte_len(), "Wrong payload length.");
        let mut buf = [0u8; MAX_WRITE_LEN];
        buf[0] = setting.address();
        buf[1..=payload.len()].copy_from_slice(payload);
        log::debug!("Write {setting:?}: {payload:02X?}");
        self.i2c
            .write(self.address, &buf[..=payload.len()])
            .map_err(Error::Transport)
    }

    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> DriverResult<(), I2C, R> {
        self.i2c
            .write_read(self.address, &[register], buf)
            .map_err(Error::Transport)?;
        log::trace!("Read {register:#04X}: {buf:02X?}");
        Ok(())
    }

    fn read_setting<const N: usize>(&mut self, setting: Setting) -> DriverResult<[u8; N], I2C, R> {
        debug_assert_eq!(N, setting.byte_len(), "Wrong read length.");
        let mut buf = [0u8; N];
        self.read_register(setting.address(), &mut buf)?;
        Ok(buf)
    }

    /// Read a category into scratch space, returning the filled prefix.
    fn read_category<'b>(
        &mut self,
        category: Category,
        buf: &'b mut [u8; MAX_READ_LEN],
    ) -> DriverResult<&'b [u8], I2C, R> {
        let raw = &mut buf[..category.byte_len()];
        self.read_register(category.address(), raw)?;
        Ok(raw)
    }

    fn read_quantity<'b>(
        &mut self,
        quantity: Quantity,
        buf: &'b mut [u8; MAX_READ_LEN],
    ) -> DriverResult<&'b [u8], I2C, R> {
        let raw = &mut buf[..quantity.byte_len()];
        self.read_register(quantity.address(), raw)?;
        Ok(raw)
    }

    fn wait_while_ready_high(&mut self, delay: &mut impl DelayNs) -> DriverResult<(), I2C, R> {
        while self.ready.is_high().map_err(Error::ReadyLine)? {
            delay.delay_ms(READY_POLL_MS);
        }
        Ok(())
    }

    fn require_mode(
        &self,
        operation: &'static str,
        allowed: impl FnOnce(DeviceMode) -> bool,
    ) -> DriverResult<(), I2C, R> {
        if allowed(self.mode) {
            Ok(())
        } else {
            Err(Error::WrongMode {
                operation,
                mode: self.mode,
            })
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Modes
    ////////////////////////////////////////////////////////////////////////////////

    /// Reset the board and wait until it is in standby.
    ///
    /// The ready line is held high while the board initialises, after power-up and
    /// again after the reset command. This waits for both, polling every 50 ms, and
    /// then discards any edge seen along the way.
    ///
    /// All board settings return to their defaults, including the particle sensor
    /// selection and the interrupts.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> DriverResult<(), I2C, R> {
        self.wait_while_ready_high(delay)?;
        self.write_command(Command::Reset)?;
        delay.delay_ms(RESET_SETTLE_MS);
        self.wait_while_ready_high(delay)?;
        self.ready.clear_edges().map_err(Error::ReadyLine)?;
        self.mode = DeviceMode::Standby;
        self.particle_sensor = ParticleSensor::Off;
        log::debug!("Reset complete");
        Ok(())
    }

    /// The board's current mode, as tracked by the driver.
    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    /// Start measuring every `period`.
    ///
    /// Fails with [`Error::WrongMode`] if the board is already in cycle mode; enter
    /// standby first to change the period.
    pub fn enter_cycle_mode(&mut self, period: CyclePeriod) -> DriverResult<(), I2C, R> {
        self.require_mode("enter cycle mode", |mode| {
            !matches!(mode, DeviceMode::Cycle(_))
        })?;
        self.write_setting(Setting::CyclePeriod, &[period.into()])?;
        self.write_command(Command::CycleMode)?;
        self.mode = DeviceMode::Cycle(period);
        log::debug!("Entered {} mode", self.mode);
        Ok(())
    }

    /// Switch to on-demand measurement.
    ///
    /// The board itself stays in standby, so this does not touch the bus. Call
    /// [`Ms430::measure_on_demand`] to start each measurement.
    pub fn enter_on_demand_mode(&mut self) -> DriverResult<(), I2C, R> {
        self.require_mode("enter on-demand mode", |mode| {
            !matches!(mode, DeviceMode::Cycle(_))
        })?;
        self.mode = DeviceMode::OnDemand;
        log::debug!("Entered {} mode", self.mode);
        Ok(())
    }

    /// Start a single measurement.
    ///
    /// The measurement takes about 0.5 s; the ready line signals its completion.
    /// Only possible in on-demand mode.
    pub fn measure_on_demand(&mut self) -> DriverResult<(), I2C, R> {
        self.require_mode("measure on demand", |mode| mode == DeviceMode::OnDemand)?;
        self.write_command(Command::OnDemandMeasure)
    }

    /// Stop measuring and enter standby. Possible from any mode.
    pub fn enter_standby(&mut self) -> DriverResult<(), I2C, R> {
        self.write_command(Command::StandbyMode)?;
        self.mode = DeviceMode::Standby;
        Ok(())
    }

    /// Read the mode reported by the board.
    ///
    /// The board reports standby between on-demand measurements, so this does not
    /// distinguish on-demand mode from standby.
    pub fn read_operational_mode(&mut self) -> DriverResult<OperationalMode, I2C, R> {
        let mut buf = [0u8; 1];
        self.read_register(OPERATIONAL_MODE_READ, &mut buf)?;
        Ok(OperationalMode::try_from(buf[0])?)
    }

    /// Read the cycle period setting back from the board.
    pub fn read_cycle_period(&mut self) -> DriverResult<CyclePeriod, I2C, R> {
        let [code] = self.read_setting(Setting::CyclePeriod)?;
        Ok(CyclePeriod::try_from(code)?)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Ready line
    ////////////////////////////////////////////////////////////////////////////////

    /// Returns true if new data have been released since the last check.
    ///
    /// Each release is reported once.
    pub fn data_ready(&mut self) -> DriverResult<bool, I2C, R> {
        self.ready.take_falling_edge().map_err(Error::ReadyLine)
    }

    /// Block until new data are released, polling the ready line every 50 ms.
    ///
    /// There is no timeout. In standby no data are ever released, so this fails
    /// with [`Error::WrongMode`] instead of waiting forever.
    pub fn wait_for_data_ready(&mut self, delay: &mut impl DelayNs) -> DriverResult<(), I2C, R> {
        self.require_mode("wait for data", DeviceMode::releases_data)?;
        while !self.data_ready()? {
            delay.delay_ms(READY_POLL_MS);
        }
        log::trace!("Data ready");
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Settings
    ////////////////////////////////////////////////////////////////////////////////

    /// Tell the board which particle sensor is connected.
    ///
    /// Selecting [`ParticleSensor::Off`] disables particle measurement, and
    /// [`Ms430::read_particle_data`] stops reading from the board.
    pub fn select_particle_sensor(&mut self, sensor: ParticleSensor) -> DriverResult<(), I2C, R> {
        self.write_setting(Setting::ParticleSensorSelect, &[sensor.into()])?;
        self.particle_sensor = sensor;
        Ok(())
    }

    /// The selected particle sensor.
    pub fn particle_sensor(&self) -> ParticleSensor {
        self.particle_sensor
    }

    /// Choose the unit of [`AirData::temperature`] and [`Ms430::read_temperature`].
    ///
    /// This is a presentation setting only; the board always measures in °C.
    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.temperature_unit = unit;
    }

    /// The chosen temperature unit.
    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.temperature_unit
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Category reads
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the temperature, pressure, humidity and gas sensor resistance.
    pub fn read_air_data(&mut self) -> DriverResult<AirData, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_category(Category::Air, &mut buf)?;
        Ok(decode::decode_air(raw, self.temperature_unit)?)
    }

    /// Read the air quality data. Only possible in cycle mode.
    pub fn read_air_quality_data(&mut self) -> DriverResult<AirQualityData, I2C, R> {
        self.require_mode("read air quality data", DeviceMode::has_air_quality)?;
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_category(Category::AirQuality, &mut buf)?;
        let data = decode::decode_air_quality(raw)?;
        if !data.is_valid() {
            log::debug!("Air quality data not yet valid");
        }
        Ok(data)
    }

    /// Read the illuminance and white light level.
    pub fn read_light_data(&mut self) -> DriverResult<LightData, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_category(Category::Light, &mut buf)?;
        Ok(decode::decode_light(raw)?)
    }

    /// Read the sound levels.
    pub fn read_sound_data(&mut self) -> DriverResult<SoundData, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_category(Category::Sound, &mut buf)?;
        Ok(decode::decode_sound(raw)?)
    }

    /// Read the particle data.
    ///
    /// With no particle sensor selected, nothing is read from the board and a
    /// zeroed, invalid reading is returned.
    pub fn read_particle_data(&mut self) -> DriverResult<ParticleData, I2C, R> {
        if self.particle_sensor == ParticleSensor::Off {
            return Ok(decode::decode_particle(&[], ParticleSensor::Off)?);
        }
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_category(Category::Particle, &mut buf)?;
        Ok(decode::decode_particle(raw, self.particle_sensor)?)
    }

    /// Read every category available in the current mode.
    ///
    /// Air quality data are only read in cycle mode, and particle data only when a
    /// particle sensor is selected.
    pub fn read_all(&mut self) -> DriverResult<Readings, I2C, R> {
        let air = self.read_air_data()?;
        let air_quality = if self.mode.has_air_quality() {
            Some(self.read_air_quality_data()?)
        } else {
            None
        };
        let light = self.read_light_data()?;
        let sound = self.read_sound_data()?;
        let particle = if self.particle_sensor == ParticleSensor::Off {
            None
        } else {
            Some(self.read_particle_data()?)
        };
        Ok(Readings {
            air,
            air_quality,
            light,
            sound,
            particle,
        })
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Individual quantities
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the temperature in the chosen unit.
    pub fn read_temperature(&mut self) -> DriverResult<f32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Temperature, &mut buf)?;
        let celsius = decode::decode_temperature(raw)?;
        Ok(match self.temperature_unit {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => crate::data::celsius_to_fahrenheit(celsius),
        })
    }

    /// Read the air pressure in Pa.
    pub fn read_pressure(&mut self) -> DriverResult<u32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Pressure, &mut buf)?;
        Ok(decode::decode_pressure(raw)?)
    }

    /// Read the relative humidity in %.
    pub fn read_humidity(&mut self) -> DriverResult<f32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Humidity, &mut buf)?;
        Ok(decode::decode_humidity(raw)?)
    }

    /// Read the gas sensor resistance in Ω.
    pub fn read_gas_resistance(&mut self) -> DriverResult<u32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::GasResistance, &mut buf)?;
        Ok(decode::decode_gas_resistance(raw)?)
    }

    /// Read the air quality index. Only possible in cycle mode.
    pub fn read_aqi(&mut self) -> DriverResult<f32, I2C, R> {
        self.require_mode("read air quality index", DeviceMode::has_air_quality)?;
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Aqi, &mut buf)?;
        Ok(decode::decode_aqi(raw)?)
    }

    /// Read the illuminance in lux.
    pub fn read_illuminance(&mut self) -> DriverResult<f32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Illuminance, &mut buf)?;
        Ok(decode::decode_illuminance(raw)?)
    }

    /// Read the white light level.
    pub fn read_white_level(&mut self) -> DriverResult<u16, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::WhiteLight, &mut buf)?;
        Ok(decode::decode_white_level(raw)?)
    }

    /// Read the A-weighted sound pressure level in dBA.
    pub fn read_spl(&mut self) -> DriverResult<f32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::Spl, &mut buf)?;
        Ok(decode::decode_spl(raw)?)
    }

    /// Read the sound pressure level of each frequency band in dB.
    pub fn read_band_spl(&mut self) -> DriverResult<[f32; SOUND_FREQ_BANDS], I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::SplBands, &mut buf)?;
        Ok(decode::decode_band_spl(raw)?)
    }

    /// Read the peak sound amplitude in mPa.
    pub fn read_sound_peak(&mut self) -> DriverResult<f32, I2C, R> {
        let mut buf = [0u8; MAX_READ_LEN];
        let raw = self.read_quantity(Quantity::SoundPeak, &mut buf)?;
        Ok(decode::decode_sound_peak(raw)?)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Interrupts
    ////////////////////////////////////////////////////////////////////////////////

    /// Configure and enable the light interrupt.
    ///
    /// The settings are written before the enable flag, so the interrupt never
    /// fires with a stale threshold.
    pub fn configure_light_interrupt(
        &mut self,
        config: &LightInterruptConfig,
    ) -> DriverResult<(), I2C, R> {
        let registers = config.to_registers();
        self.write_setting(Setting::LightInterruptType, &[registers.interrupt_type])?;
        self.write_setting(Setting::LightInterruptThreshold, &registers.threshold)?;
        self.write_setting(Setting::LightInterruptPolarity, &[registers.polarity])?;
        self.write_setting(Setting::LightInterruptEnable, &[1])
    }

    /// Disable the light interrupt.
    pub fn disable_light_interrupt(&mut self) -> DriverResult<(), I2C, R> {
        self.write_setting(Setting::LightInterruptEnable, &[0])
    }

    /// Clear a latched light interrupt, releasing the LIT line.
    pub fn clear_light_interrupt(&mut self) -> DriverResult<(), I2C, R> {
        self.write_command(Command::ClearLightInterrupt)
    }

    /// Read the light interrupt settings back from the board.
    ///
    /// Returns `None` if the interrupt is disabled.
    pub fn read_light_interrupt_config(
        &mut self,
    ) -> DriverResult<Option<LightInterruptConfig>, I2C, R> {
        let [enabled] = self.read_setting(Setting::LightInterruptEnable)?;
        if enabled == 0 {
            return Ok(None);
        }
        let [interrupt_type] = self.read_setting(Setting::LightInterruptType)?;
        let threshold = self.read_setting(Setting::LightInterruptThreshold)?;
        let [polarity] = self.read_setting(Setting::LightInterruptPolarity)?;
        let config = LightInterruptConfig::from_registers(LightInterruptRegisters {
            interrupt_type,
            threshold,
            polarity,
        })?;
        Ok(Some(config))
    }

    /// Configure and enable the sound interrupt.
    pub fn configure_sound_interrupt(
        &mut self,
        config: &SoundInterruptConfig,
    ) -> DriverResult<(), I2C, R> {
        let registers = config.to_registers();
        self.write_setting(Setting::SoundInterruptType, &[registers.interrupt_type])?;
        self.write_setting(Setting::SoundInterruptThreshold, &registers.threshold)?;
        self.write_setting(Setting::SoundInterruptEnable, &[1])
    }

    /// Disable the sound interrupt.
    pub fn disable_sound_interrupt(&mut self) -> DriverResult<(), I2C, R> {
        self.write_setting(Setting::SoundInterruptEnable, &[0])
    }

    /// Clear a latched sound interrupt, releasing the SIT line.
    pub fn clear_sound_interrupt(&mut self) -> DriverResult<(), I2C, R> {
        self.write_command(Command::ClearSoundInterrupt)
    }

    /// Read the sound interrupt settings back from the board.
    ///
    /// Returns `None` if the interrupt is disabled.
    pub fn read_sound_interrupt_config(
        &mut self,
    ) -> DriverResult<Option<SoundInterruptConfig>, I2C, R> {
        let [enabled] = self.read_setting(Setting::SoundInterruptEnable)?;
        if enabled == 0 {
            return Ok(None);
        }
        let [interrupt_type] = self.read_setting(Setting::SoundInterruptType)?;
        let threshold = self.read_setting(Setting::SoundInterruptThreshold)?;
        let config = SoundInterruptConfig::from_registers(SoundInterruptRegisters {
            interrupt_type,
            threshold,
        })?;
        Ok(Some(config))
    }
}
