mod battery;
mod demo;
mod optimize;
mod prices;

use clap::{Parser, Subcommand};

use crate::cli::{demo::DemoArgs, optimize::OptimizeArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: read the prices, optimize the schedule, and print it.
    #[clap(name = "optimize")]
    Optimize(Box<OptimizeArgs>),

    /// Optimize the built-in sample day.
    #[clap(name = "demo")]
    Demo(Box<DemoArgs>),
}
