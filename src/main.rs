use anyhow::Result;
use clap::Parser;

mod bits;
mod board;
mod cli;
mod cmd;
mod controller;
mod error;
mod fixed;
mod link;
mod port;
mod pov;
mod reg;
mod repl;
mod spi;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    match args.cmd {
        cli::Cmd::Probe(opts) => cmd::probe::run(opts),
        cli::Cmd::Exec(opts) => cmd::exec::run(opts),
        cli::Cmd::Reg(opts) => cmd::reg::run(opts),
        cli::Cmd::Pov(opts) => cmd::pov::run(opts),
        cli::Cmd::Demo(opts) => cmd::demo::run(opts),
        cli::Cmd::Pack(opts) => cmd::pack::run(opts),
    }
}
