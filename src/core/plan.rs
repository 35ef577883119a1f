use serde::Serialize;

use crate::{
    core::{battery::Battery, model::Values, throughput::Throughput},
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// Optimal charge and discharge schedule over the whole horizon.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    pub steps: Vec<Step>,

    /// Net cash flow of the schedule: revenue from discharging minus the cost of charging.
    pub profit: Cost,

    pub throughput: Throughput,
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub index: usize,
    pub rate: KilowattHourRate,

    /// Power drawn from the grid.
    pub charge: Kilowatts,

    /// Power delivered to the grid.
    pub discharge: Kilowatts,

    pub energy_before: KilowattHours,
    pub energy_after: KilowattHours,
}

impl Step {
    /// Cash flow of this step alone.
    pub fn profit(&self) -> Cost {
        (self.discharge - self.charge).per_step() * self.rate
    }

    /// Whether the battery both charges and discharges within the step.
    ///
    /// The linear model does not forbid it. It only pays off when the prices are negative,
    /// because it burns energy on the conversion losses.
    pub fn is_simultaneous(&self) -> bool {
        self.charge.0 > Throughput::TOLERANCE.0 && self.discharge.0 > Throughput::TOLERANCE.0
    }
}

impl Plan {
    /// Allowed mismatch between the solved energy levels and the energy balance.
    const BALANCE_TOLERANCE: KilowattHours = KilowattHours(1e-5);

    /// Assemble the plan from the raw solver values.
    pub(super) fn new(battery: &Battery, rates: &[KilowattHourRate], values: &Values) -> Self {
        let steps: Vec<Step> = rates
            .iter()
            .enumerate()
            .map(|(index, &rate)| Step {
                index,
                rate,
                charge: values.charge[index],
                discharge: values.discharge[index],
                energy_before: values.energy[index],
                energy_after: values.energy[index + 1],
            })
            .collect();
        debug_assert!(steps.iter().all(|step| {
            let expected = battery.energy_after(step.energy_before, step.charge, step.discharge);
            (expected - step.energy_after).abs() < Self::BALANCE_TOLERANCE
        }));
        let plan = Self {
            steps,
            profit: values.objective,
            throughput: Throughput::from_energy_levels(&values.energy, battery.capacity_max()),
        };
        debug_assert_eq!(plan.energy_levels(), values.energy);
        plan
    }

    /// Stored energy at every step boundary, starting with the initial energy.
    pub fn energy_levels(&self) -> Vec<KilowattHours> {
        self.steps
            .first()
            .map(|step| step.energy_before)
            .into_iter()
            .chain(self.steps.iter().map(|step| step.energy_after))
            .collect()
    }

    pub fn n_simultaneous_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.is_simultaneous()).count()
    }
}
