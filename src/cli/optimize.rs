use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    cli::{battery::BatteryArgs, prices::PriceArgs},
    core::{Battery, Optimizer, Outcome},
    prelude::*,
    quantity::rate::KilowattHourRate,
    report::{
        export::export,
        tables::{build_steps_table, build_summary_table},
    },
};

#[derive(Parser)]
pub struct OptimizeArgs {
    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub prices: PriceArgs,

    #[clap(flatten)]
    pub solver: SolverArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

impl OptimizeArgs {
    pub fn run(self) -> Result {
        let battery = self.battery.battery()?;
        let rates = self.prices.source()?.read()?;
        dispatch(&battery, &rates, &self.solver, &self.output)
    }
}

#[must_use]
#[derive(Parser)]
pub struct SolverArgs {
    /// Give up on the solver after this many seconds.
    #[clap(long = "time-limit-secs", env = "TIME_LIMIT_SECS")]
    pub time_limit_secs: Option<f64>,
}

impl SolverArgs {
    pub fn time_limit(&self) -> Result<Option<Duration>> {
        self.time_limit_secs
            .map(Duration::try_from_secs_f64)
            .transpose()
            .context("the time limit must be a non-negative number of seconds")
    }
}

#[must_use]
#[derive(Parser)]
pub struct OutputArgs {
    /// Export the plan to this CSV, JSON, or XLSX file.
    #[clap(long, env = "OUTPUT")]
    pub output: Option<PathBuf>,
}

/// Optimize, print the plan, and export it when requested.
pub fn dispatch(
    battery: &Battery,
    rates: &[KilowattHourRate],
    solver: &SolverArgs,
    output: &OutputArgs,
) -> Result {
    let outcome = Optimizer::builder()
        .battery(battery)
        .rates(rates)
        .maybe_time_limit(solver.time_limit()?)
        .optimize();
    match outcome {
        Outcome::Solved(plan) => {
            println!("{}", build_steps_table(&plan));
            println!("{}", build_summary_table(&plan));
            if let Some(path) = &output.output {
                export(&plan, path)?;
            }
            Ok(())
        }
        Outcome::NoTimeSteps => {
            warn!("No prices to optimize for");
            Ok(())
        }
        Outcome::NoSolution(status) => bail!("no solution found: {status}"),
    }
}
