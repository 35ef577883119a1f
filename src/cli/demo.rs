use clap::Parser;

use crate::{
    cli::{
        battery::BatteryArgs,
        optimize::{OutputArgs, SolverArgs, dispatch},
    },
    prelude::*,
    prices::{PriceSource, REFERENCE_DAY},
};

#[derive(Parser)]
pub struct DemoArgs {
    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub solver: SolverArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

impl DemoArgs {
    pub fn run(self) -> Result {
        let battery = self.battery.battery()?;
        let rates = PriceSource::Inline(REFERENCE_DAY.to_vec()).read()?;
        dispatch(&battery, &rates, &self.solver, &self.output)
    }
}
