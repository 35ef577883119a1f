use bon::bon;
use serde::Serialize;

use crate::quantity::{energy::KilowattHours, power::Kilowatts};

/// Static operating envelope of the battery together with its initial state of charge.
///
/// Construct via [`Battery::builder`], which validates every invariant, so that an existing
/// value is always a physically consistent battery.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Battery {
    capacity_max: KilowattHours,
    capacity_min: KilowattHours,
    charging_power: Kilowatts,
    discharging_power: Kilowatts,
    charging_efficiency: f64,
    discharging_efficiency: f64,
    initial_energy: KilowattHours,
}

#[bon]
impl Battery {
    #[builder]
    pub fn new(
        /// Maximum stored energy.
        capacity_max: KilowattHours,

        /// Minimum allowed stored energy, for example the reserve kept for back-up.
        #[builder(default)]
        capacity_min: KilowattHours,

        /// Maximum charging power, drawn from the grid.
        charging_power: Kilowatts,

        /// Maximum discharging power, delivered to the grid.
        discharging_power: Kilowatts,

        /// Fraction of the drawn energy that ends up stored.
        #[builder(default = 1.0)]
        charging_efficiency: f64,

        /// Fraction of the withdrawn stored energy that gets delivered.
        #[builder(default = 1.0)]
        discharging_efficiency: f64,

        /// Stored energy at the start of the horizon.
        #[builder(default)]
        initial_energy: KilowattHours,
    ) -> Result<Self, BatteryError> {
        if !capacity_max.is_finite() || capacity_max <= KilowattHours::ZERO {
            return Err(BatteryError::NonPositiveCapacity(capacity_max));
        }
        if !capacity_min.is_finite() || capacity_min < KilowattHours::ZERO {
            return Err(BatteryError::NegativeCapacity(capacity_min));
        }
        if capacity_min > capacity_max {
            return Err(BatteryError::InvertedCapacityBounds { min: capacity_min, max: capacity_max });
        }
        for (direction, power) in
            [(Direction::Charging, charging_power), (Direction::Discharging, discharging_power)]
        {
            if !power.is_finite() || power <= Kilowatts::ZERO {
                return Err(BatteryError::NonPositivePower { direction, power });
            }
        }
        for (direction, efficiency) in [
            (Direction::Charging, charging_efficiency),
            (Direction::Discharging, discharging_efficiency),
        ] {
            // Also rejects NaN:
            if !(efficiency > 0.0 && efficiency <= 1.0) {
                return Err(BatteryError::EfficiencyOutOfRange { direction, efficiency });
            }
        }
        if !initial_energy.is_finite()
            || initial_energy < capacity_min
            || initial_energy > capacity_max
        {
            return Err(BatteryError::InitialEnergyOutOfBounds {
                initial: initial_energy,
                min: capacity_min,
                max: capacity_max,
            });
        }
        Ok(Self {
            capacity_max,
            capacity_min,
            charging_power,
            discharging_power,
            charging_efficiency,
            discharging_efficiency,
            initial_energy,
        })
    }
}

impl Battery {
    pub const fn capacity_max(&self) -> KilowattHours {
        self.capacity_max
    }

    pub const fn capacity_min(&self) -> KilowattHours {
        self.capacity_min
    }

    pub const fn charging_power(&self) -> Kilowatts {
        self.charging_power
    }

    pub const fn discharging_power(&self) -> Kilowatts {
        self.discharging_power
    }

    pub const fn charging_efficiency(&self) -> f64 {
        self.charging_efficiency
    }

    pub const fn discharging_efficiency(&self) -> f64 {
        self.discharging_efficiency
    }

    pub const fn initial_energy(&self) -> KilowattHours {
        self.initial_energy
    }

    /// Fraction of the energy recovered after charging and then discharging it.
    pub const fn round_trip_efficiency(&self) -> f64 {
        self.charging_efficiency * self.discharging_efficiency
    }

    /// Stored energy after one step with the given charging and discharging power.
    pub fn energy_after(
        &self,
        energy_before: KilowattHours,
        charge: Kilowatts,
        discharge: Kilowatts,
    ) -> KilowattHours {
        energy_before + charge.per_step() * self.charging_efficiency
            - discharge.per_step() / self.discharging_efficiency
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Direction {
    #[display("charging")]
    Charging,

    #[display("discharging")]
    Discharging,
}

/// Invalid battery configuration.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BatteryError {
    #[error("maximum capacity must be positive and finite, got {0}")]
    NonPositiveCapacity(KilowattHours),

    #[error("minimum capacity must be non-negative and finite, got {0}")]
    NegativeCapacity(KilowattHours),

    #[error("minimum capacity ({min}) exceeds maximum capacity ({max})")]
    InvertedCapacityBounds { min: KilowattHours, max: KilowattHours },

    #[error("{direction} power must be positive and finite, got {power}")]
    NonPositivePower { direction: Direction, power: Kilowatts },

    #[error("{direction} efficiency must be within (0, 1], got {efficiency}")]
    EfficiencyOutOfRange { direction: Direction, efficiency: f64 },

    #[error("initial energy ({initial}) is outside of [{min}, {max}]")]
    InitialEnergyOutOfBounds { initial: KilowattHours, min: KilowattHours, max: KilowattHours },
}
