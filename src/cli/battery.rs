//! Battery-related CLI arguments.

use clap::Parser;

use crate::{
    core::Battery,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Maximum stored energy in kilowatt-hours.
    #[clap(long = "capacity-max-kwh", default_value = "100", env = "CAPACITY_MAX_KWH")]
    pub capacity_max: KilowattHours,

    /// Minimum stored energy in kilowatt-hours.
    #[clap(long = "capacity-min-kwh", default_value = "0", env = "CAPACITY_MIN_KWH")]
    pub capacity_min: KilowattHours,

    /// Charging power in kilowatts.
    #[clap(long = "charging-power-kw", default_value = "30", env = "CHARGING_POWER_KW")]
    pub charging_power: Kilowatts,

    /// Discharging power in kilowatts.
    #[clap(long = "discharging-power-kw", default_value = "30", env = "DISCHARGING_POWER_KW")]
    pub discharging_power: Kilowatts,

    /// Fraction of the drawn energy that gets stored.
    #[clap(long, default_value = "0.95", env = "CHARGING_EFFICIENCY")]
    pub charging_efficiency: f64,

    /// Fraction of the withdrawn energy that gets delivered.
    #[clap(long, default_value = "0.95", env = "DISCHARGING_EFFICIENCY")]
    pub discharging_efficiency: f64,

    /// Stored energy at the start, in kilowatt-hours.
    #[clap(long = "initial-energy-kwh", default_value = "0", env = "INITIAL_ENERGY_KWH")]
    pub initial_energy: KilowattHours,
}

impl BatteryArgs {
    pub fn battery(&self) -> Result<Battery> {
        let battery = Battery::builder()
            .capacity_max(self.capacity_max)
            .capacity_min(self.capacity_min)
            .charging_power(self.charging_power)
            .discharging_power(self.discharging_power)
            .charging_efficiency(self.charging_efficiency)
            .discharging_efficiency(self.discharging_efficiency)
            .initial_energy(self.initial_energy)
            .build()
            .context("invalid battery configuration")?;
        info!(
            capacity_max = %battery.capacity_max(),
            charging_power = %battery.charging_power(),
            discharging_power = %battery.discharging_power(),
            round_trip_efficiency = battery.round_trip_efficiency(),
            "Configured the battery",
        );
        Ok(battery)
    }
}
