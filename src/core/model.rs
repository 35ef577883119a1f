use good_lp::{
    Expression,
    ProblemVariables,
    Solution as _,
    SolverModel,
    Variable,
    constraint,
    minilp,
    solvers::minilp::MiniLpProblem,
    variable,
};

use crate::{
    core::{battery::Battery, status::SolverStatus},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// Linear program of the battery arbitrage over a fixed horizon.
///
/// Per step `t`, charging power `c[t] ∈ [0, charging power]` and discharging power
/// `d[t] ∈ [0, discharging power]`. Stored energy `e[0..=T]` stays within the capacity bounds,
/// starts at the initial energy and follows `e[t+1] = e[t] + ηc × c[t] − d[t] / ηd`.
/// The objective is `Σ rate[t] × (d[t] − c[t])`, maximised.
#[must_use]
pub struct DispatchModel {
    charge: Vec<Variable>,
    discharge: Vec<Variable>,
    energy: Vec<Variable>,
    objective: Expression,
    problem: MiniLpProblem,
}

/// Raw optimal values read back from the solver.
#[must_use]
pub struct Values {
    pub charge: Vec<Kilowatts>,
    pub discharge: Vec<Kilowatts>,

    /// Stored energy at every step boundary, one more than the number of steps.
    pub energy: Vec<KilowattHours>,

    pub objective: Cost,
}

impl DispatchModel {
    #[instrument(skip_all, fields(n_steps = rates.len()))]
    pub fn build(battery: &Battery, rates: &[KilowattHourRate]) -> Self {
        let n_steps = rates.len();
        let mut variables = ProblemVariables::new();

        let charge =
            variables.add_vector(variable().min(0.0).max(battery.charging_power().0), n_steps);
        let discharge =
            variables.add_vector(variable().min(0.0).max(battery.discharging_power().0), n_steps);
        let energy = variables.add_vector(
            variable().min(battery.capacity_min().0).max(battery.capacity_max().0),
            n_steps + 1,
        );

        let objective: Expression = rates
            .iter()
            .zip(charge.iter().zip(&discharge))
            .map(|(rate, (&charge, &discharge))| rate.0 * (discharge - charge))
            .sum();

        let mut problem = variables.maximise(objective.clone()).using(minilp);
        problem.add_constraint(constraint!(energy[0] == battery.initial_energy().0));

        let charging_efficiency = battery.charging_efficiency();
        let discharging_factor = 1.0 / battery.discharging_efficiency();
        for step in 0..n_steps {
            problem.add_constraint(constraint!(
                energy[step + 1]
                    == energy[step] + charging_efficiency * charge[step]
                        - discharging_factor * discharge[step]
            ));
        }
        debug!(n_variables = 3 * n_steps + 1, n_constraints = n_steps + 1, "Built the model");

        Self { charge, discharge, energy, objective, problem }
    }

    /// Run the simplex solver to optimality.
    #[instrument(skip_all, fields(n_steps = self.charge.len()))]
    pub fn solve(self) -> Result<Values, SolverStatus> {
        let solution = self.problem.solve()?;
        let read_power = |variables: &[Variable]| -> Vec<Kilowatts> {
            variables.iter().map(|&variable| Kilowatts(solution.value(variable))).collect()
        };
        let values = Values {
            charge: read_power(&self.charge),
            discharge: read_power(&self.discharge),
            energy: self
                .energy
                .iter()
                .map(|&variable| KilowattHours(solution.value(variable)))
                .collect(),
            objective: Cost(solution.eval(&self.objective)),
        };
        debug!(objective = %values.objective, "Solved");
        Ok(values)
    }
}
