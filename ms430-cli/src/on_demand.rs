use std::io::Write;
use std::time::Duration;

use crate::board;
use crate::bridge::Mcp2221;
use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::util::{self, HostDelay};

/// Pauses shorter than this make the humidity and temperature readings inaccurate.
const SHORTEST_ACCURATE_PAUSE: Duration = Duration::from_secs(2);

/// Trigger a measurement, print it and pause, until stopped.
pub(crate) fn action(device: &Mcp2221, config: &Config, pause: Duration) -> anyhow::Result<()> {
    if pause < SHORTEST_ACCURATE_PAUSE {
        log::warn!("A pause under 2 s gives inaccurate humidity and temperature readings");
    }
    let claim = device.claim_inputs(&[config.pins.ready])?;
    let mut board = board::connect(device, &claim, config)?;
    board.enter_on_demand_mode()?;

    let mut stdout = std::io::stdout().lock();
    while !util::stop_requested() {
        board.measure_on_demand()?;
        board.wait_for_data_ready(&mut HostDelay)?;
        let readings = board.read_all()?;
        stdout.write_all(output::format_readings(&readings, config.format)?.as_bytes())?;
        if config.format == OutputFormat::Text {
            writeln!(stdout)?;
        }
        stdout.flush()?;
        std::thread::sleep(pause);
    }
    Ok(())
}
