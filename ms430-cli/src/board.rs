//! Board setup shared by every command, plus the mode and reset commands.
use anyhow::Context;
use ms430_hal::{EdgeSignal, FallingEdge, Ms430};

use crate::bridge::{BridgeError, Gp1EdgeLatch, GpPin, Input, Mcp2221, PinClaim};
use crate::config::Config;
use crate::util::HostDelay;

pub(crate) type Board<'a> = Ms430<&'a Mcp2221, EdgeLine<'a>>;

/// A board output line watched for falling edges.
///
/// GP1 has a hardware edge latch. Other pins are sampled, and a low pulse shorter
/// than the polling interval can be missed on them.
#[derive(Debug)]
pub(crate) enum EdgeLine<'a> {
    Latched(Gp1EdgeLatch<'a, Mcp2221>),
    Sampled(FallingEdge<Input<'a>>),
}

impl<'a> EdgeLine<'a> {
    /// Edge detection for a claimed pin.
    pub(crate) fn new(claim: &PinClaim<'a>, pin: GpPin) -> Self {
        match pin {
            GpPin::Gp1 => EdgeLine::Latched(claim.gp1_edge_latch()),
            pin => EdgeLine::Sampled(FallingEdge::new(claim.input(pin))),
        }
    }
}

impl EdgeSignal for EdgeLine<'_> {
    type Error = BridgeError;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        match self {
            EdgeLine::Latched(line) => line.is_high(),
            EdgeLine::Sampled(line) => line.is_high(),
        }
    }

    fn take_falling_edge(&mut self) -> Result<bool, Self::Error> {
        match self {
            EdgeLine::Latched(line) => line.take_falling_edge(),
            EdgeLine::Sampled(line) => line.take_falling_edge(),
        }
    }

    fn clear_edges(&mut self) -> Result<(), Self::Error> {
        match self {
            EdgeLine::Latched(line) => line.clear_edges(),
            EdgeLine::Sampled(line) => line.clear_edges(),
        }
    }
}

/// Reset the board and apply the settings.
///
/// The ready pin must be part of `claim`.
pub(crate) fn connect<'a>(
    device: &'a Mcp2221,
    claim: &PinClaim<'a>,
    config: &Config,
) -> anyhow::Result<Board<'a>> {
    // A transfer left half-done by an earlier run would block the bus.
    device
        .i2c_cancel_transfer()
        .context("Freeing the I2C bus")?;
    if config.pins.ready != GpPin::Gp1 {
        log::warn!(
            "READY on {} is sampled, not latched; use GP1 to be sure of seeing every edge",
            config.pins.ready
        );
    }
    let ready = EdgeLine::new(claim, config.pins.ready);
    let mut board = Ms430::new(device, ready, config.address.into());
    board.reset(&mut HostDelay).context("Resetting the MS430")?;
    board
        .select_particle_sensor(config.particle_sensor)
        .context("Selecting the particle sensor")?;
    board.set_temperature_unit(config.temperature_unit);
    Ok(board)
}

pub(crate) fn reset_action(device: &Mcp2221, config: &Config) -> anyhow::Result<()> {
    let claim = device.claim_inputs(&[config.pins.ready])?;
    connect(device, &claim, config)?;
    println!("MS430 reset; now in standby.");
    Ok(())
}

/// Print the mode and interrupt settings the board reports.
///
/// The board is not reset, so a cycle started by another program stays visible.
pub(crate) fn mode_action(device: &Mcp2221, config: &Config) -> anyhow::Result<()> {
    let claim = device.claim_inputs(&[config.pins.ready])?;
    let ready = EdgeLine::new(&claim, config.pins.ready);
    let mut board: Board<'_> = Ms430::new(device, ready, config.address.into());

    println!("Operational mode: {:?}", board.read_operational_mode()?);
    println!("Cycle period: {}", board.read_cycle_period()?);
    match board.read_light_interrupt_config()? {
        Some(light) => println!(
            "Light interrupt: {:?}, {:.2} lux threshold, {:?} polarity",
            light.interrupt_type,
            light.threshold.lux(),
            light.polarity
        ),
        None => println!("Light interrupt: disabled"),
    }
    match board.read_sound_interrupt_config()? {
        Some(sound) => println!(
            "Sound interrupt: {:?}, {} mPa threshold",
            sound.interrupt_type, sound.threshold.0
        ),
        None => println!("Sound interrupt: disabled"),
    }
    Ok(())
}
