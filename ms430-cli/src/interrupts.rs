use std::time::Duration;

use anyhow::Context;
use ms430_hal::{EdgeSignal, InterruptType};

use crate::board::{self, EdgeLine};
use crate::bridge::Mcp2221;
use crate::config::Config;
use crate::util;

/// How often the LIT and SIT lines are checked.
///
/// Only a line on GP1 is latched in hardware. On other pins a comparator-type
/// interrupt that goes low and back high within one interval is not reported.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Enable the configured interrupts, then report each one as it occurs until
/// stopped.
///
/// Latch-type interrupts are cleared after being reported so that they can fire
/// again.
pub(crate) fn action(device: &Mcp2221, config: &Config) -> anyhow::Result<()> {
    let light = config.light_interrupt;
    let sound = config.sound_interrupt;

    let mut pins = vec![config.pins.ready];
    if light.enabled {
        pins.push(config.pins.light);
    }
    if sound.enabled {
        pins.push(config.pins.sound);
    }
    let claim = device.claim_inputs(&pins)?;
    let mut board = board::connect(device, &claim, config)?;

    if sound.enabled {
        board
            .configure_sound_interrupt(&sound.to_config())
            .context("Configuring the sound interrupt")?;
    }
    if light.enabled {
        let light_config = light.to_config().context("Light interrupt threshold")?;
        board
            .configure_light_interrupt(&light_config)
            .context("Configuring the light interrupt")?;
    }

    let mut light_line = light
        .enabled
        .then(|| EdgeLine::new(&claim, config.pins.light));
    let mut sound_line = sound
        .enabled
        .then(|| EdgeLine::new(&claim, config.pins.sound));
    for line in light_line.iter_mut().chain(sound_line.iter_mut()) {
        line.clear_edges()?;
    }

    if light_line.is_none() && sound_line.is_none() {
        println!("No interrupts have been enabled.");
        return Ok(());
    }
    println!("Waiting for interrupts. Press ctrl-c to exit.\n");

    while !util::stop_requested() {
        if let Some(line) = light_line.as_mut() {
            if line.take_falling_edge()? {
                println!("LIGHT INTERRUPT.");
                if light.interrupt_type == InterruptType::Latch {
                    board.clear_light_interrupt()?;
                }
            }
        }
        if let Some(line) = sound_line.as_mut() {
            if line.take_falling_edge()? {
                println!("SOUND INTERRUPT.");
                if sound.interrupt_type == InterruptType::Latch {
                    board.clear_sound_interrupt()?;
                }
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    board.disable_light_interrupt()?;
    board.disable_sound_interrupt()?;
    Ok(())
}
