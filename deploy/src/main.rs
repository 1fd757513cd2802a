mod chain;
mod command_line;
mod config;
mod contracts;
mod deploy;
mod errors;
#[cfg(test)]
mod memory;
mod utils;

use anyhow::{anyhow, Result};
use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cmd = CommandLine::parse();
    tokio::select! {
        result = cmd.execute() => result,
        _ = tokio::signal::ctrl_c() => Err(anyhow!(
            "interrupted, a submitted transaction may still be mined; check the logged hash"
        )),
    }
}
