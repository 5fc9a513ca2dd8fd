use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use ms430_hal::{CyclePeriod, Sample, SharedHistory};

use crate::board;
use crate::bridge::Mcp2221;
use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::util;

/// How often the READY line is checked between readings.
const READY_POLL: Duration = Duration::from_millis(50);

/// Run the board in cycle mode and print every reading until stopped.
pub(crate) fn action(
    device: &Mcp2221,
    config: &Config,
    period: CyclePeriod,
    history: Option<usize>,
) -> anyhow::Result<()> {
    let history = history
        .map(SharedHistory::new)
        .transpose()
        .context("Creating the reading history")?;

    let claim = device.claim_inputs(&[config.pins.ready])?;
    let mut board = board::connect(device, &claim, config)?;
    board.enter_cycle_mode(period)?;
    log::info!("Entered cycle mode with period {period}");

    let mut stdout = std::io::stdout().lock();
    while !util::stop_requested() {
        if !board.data_ready()? {
            std::thread::sleep(READY_POLL);
            continue;
        }
        let readings = board.read_all()?;
        stdout.write_all(output::format_readings(&readings, config.format)?.as_bytes())?;
        if let Some(history) = &history {
            history.push(Sample::from(&readings));
            let summary = output::format_summary(
                &history.summary(),
                config.temperature_unit,
                config.format,
            )?;
            stdout.write_all(summary.as_bytes())?;
        }
        if config.format == OutputFormat::Text {
            writeln!(stdout)?;
        }
        stdout.flush()?;
    }

    board.enter_standby()?;
    Ok(())
}
