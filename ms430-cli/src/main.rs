use anyhow::Context;
use clap::Parser;

use bridge::Mcp2221;
use cli::Commands;
use config::Config;

mod board;
mod bridge;
mod cli;
mod config;
mod cycle;
mod interrupts;
mod on_demand;
mod output;
mod util;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = cli::Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_flags(&cli);
    util::stop_on_ctrl_c().context("Installing the Ctrl-C handler")?;

    let device = Mcp2221::connect_with_vid_and_pid(cli.vid, cli.pid)
        .with_context(|| format!("Opening MCP2221 {:04X}:{:04X}", cli.vid, cli.pid))?;
    match cli.command {
        Commands::Cycle { period, history } => {
            cycle::action(&device, &config, period.into(), history)?
        }
        Commands::OnDemand { pause } => on_demand::action(&device, &config, pause)?,
        Commands::Interrupts => interrupts::action(&device, &config)?,
        Commands::Mode => board::mode_action(&device, &config)?,
        Commands::Reset => board::reset_action(&device, &config)?,
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::cli::Cli;

    use clap::CommandFactory;

    #[test]
    fn check_cli_debug_asserts() {
        Cli::command().debug_assert();
    }
}
