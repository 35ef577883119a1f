use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use bon::Builder;

use crate::{
    core::{
        battery::Battery,
        model::{DispatchModel, Values},
        plan::Plan,
        status::SolverStatus,
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Result of a single optimization.
#[must_use]
#[derive(Debug)]
pub enum Outcome {
    Solved(Plan),

    /// The price series is empty, so there was nothing to solve.
    NoTimeSteps,

    NoSolution(SolverStatus),
}

#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Optimizer<'a> {
    battery: &'a Battery,
    rates: &'a [KilowattHourRate],

    /// Give up on the solver after this long.
    time_limit: Option<Duration>,
}

impl<S: optimizer_builder::IsComplete> OptimizerBuilder<'_, S> {
    pub fn optimize(self) -> Outcome {
        self.build().optimize()
    }
}

impl Optimizer<'_> {
    /// Find the most profitable schedule for the price series.
    #[instrument(skip_all, name = "Optimizing…", fields(n_steps = self.rates.len()))]
    fn optimize(self) -> Outcome {
        if self.rates.is_empty() {
            warn!("The price series is empty, nothing to optimize");
            return Outcome::NoTimeSteps;
        }

        let start_time = Instant::now();
        let result = match self.time_limit {
            Some(time_limit) => self.solve_with_time_limit(time_limit),
            None => DispatchModel::build(self.battery, self.rates).solve(),
        };
        let elapsed = start_time.elapsed();

        match result {
            Ok(values) => {
                let plan = Plan::new(self.battery, self.rates, &values);
                info!(
                    ?elapsed,
                    profit = %plan.profit,
                    charged = %plan.throughput.charged,
                    discharged = %plan.throughput.discharged,
                    round_trip_cycles = plan.throughput.round_trip_cycles(),
                    "Optimized",
                );
                let n_simultaneous_steps = plan.n_simultaneous_steps();
                if n_simultaneous_steps != 0 {
                    warn!(n_simultaneous_steps, "The plan charges and discharges at the same time");
                }
                Outcome::Solved(plan)
            }
            Err(status @ SolverStatus::Infeasible) => {
                error!(?elapsed, "The model is infeasible, check the battery configuration");
                Outcome::NoSolution(status)
            }
            Err(status) => {
                warn!(?elapsed, %status, "No solution found");
                Outcome::NoSolution(status)
            }
        }
    }

    /// Solve on a separate thread and wait for it at most `time_limit`.
    ///
    /// On expiry, the thread is detached and its result gets dropped.
    fn solve_with_time_limit(&self, time_limit: Duration) -> Result<Values, SolverStatus> {
        let battery = *self.battery;
        let rates = self.rates.to_vec();
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name("solver".to_owned())
            .spawn(move || {
                // Nobody listens anymore after a timeout:
                let _ = sender.send(DispatchModel::build(&battery, &rates).solve());
            })
            .map_err(|error| SolverStatus::Failed(error.to_string()))?;
        receiver.recv_timeout(time_limit).map_err(|error| match error {
            RecvTimeoutError::Timeout => SolverStatus::TimedOut,
            RecvTimeoutError::Disconnected => {
                SolverStatus::Failed("the solver thread has panicked".to_owned())
            }
        })?
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        prices::REFERENCE_DAY,
        quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts},
    };

    const EPSILON: f64 = 1e-6;

    fn battery() -> Battery {
        Battery::builder()
            .capacity_max(KilowattHours(100.0))
            .charging_power(Kilowatts(30.0))
            .discharging_power(Kilowatts(30.0))
            .charging_efficiency(0.95)
            .discharging_efficiency(0.95)
            .build()
            .unwrap()
    }

    fn rates(prices: &[f64]) -> Vec<KilowattHourRate> {
        prices.iter().copied().map(KilowattHourRate).collect()
    }

    fn solve(battery: &Battery, rates: &[KilowattHourRate]) -> Plan {
        match Optimizer::builder().battery(battery).rates(rates).optimize() {
            Outcome::Solved(plan) => plan,
            outcome => panic!("unexpected outcome: {outcome:?}"),
        }
    }

    fn assert_feasible(battery: &Battery, plan: &Plan) {
        let levels = plan.energy_levels();
        assert_abs_diff_eq!(levels[0].0, battery.initial_energy().0, epsilon = EPSILON);
        for level in &levels {
            assert!(level.0 >= battery.capacity_min().0 - EPSILON);
            assert!(level.0 <= battery.capacity_max().0 + EPSILON);
        }
        for step in &plan.steps {
            assert!(step.charge.0 >= -EPSILON);
            assert!(step.charge.0 <= battery.charging_power().0 + EPSILON);
            assert!(step.discharge.0 >= -EPSILON);
            assert!(step.discharge.0 <= battery.discharging_power().0 + EPSILON);
            let expected = battery.energy_after(step.energy_before, step.charge, step.discharge);
            assert_abs_diff_eq!(step.energy_after.0, expected.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_reference_day() {
        let battery = battery();
        let plan = solve(&battery, &rates(&REFERENCE_DAY));
        assert_feasible(&battery, &plan);
        assert_eq!(plan.steps.len(), 24);

        // Cheapest hours:
        assert_abs_diff_eq!(plan.steps[4].charge.0, 30.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[5].charge.0, 30.0, epsilon = EPSILON);
        let early_charge: f64 = plan.steps[3..=6].iter().map(|step| step.charge.0).sum();
        assert_abs_diff_eq!(early_charge, 100.0 / 0.95, epsilon = 1e-4);

        // Dearest hours:
        assert_abs_diff_eq!(plan.steps[11].discharge.0, 30.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[12].discharge.0, 30.0, epsilon = EPSILON);

        assert!(plan.profit > Cost::ZERO);
        assert_abs_diff_eq!(plan.profit.0, 2211.316, epsilon = 1e-2);
        let profit: f64 = plan.steps.iter().map(|step| step.profit().0).sum();
        assert_abs_diff_eq!(profit, plan.profit.0, epsilon = 1e-4);

        // The optimum fills and empties the battery exactly once, so 1.0 cycle up to solver noise:
        let cycles = plan.throughput.round_trip_cycles();
        assert!(cycles > 0.0);
        assert!(cycles <= 1.0 + EPSILON);
        assert_eq!(plan.n_simultaneous_steps(), 0);
    }

    #[test]
    fn test_increasing_prices() {
        let battery = battery();
        let plan = solve(&battery, &rates(&[1.0, 2.0, 3.0, 4.0]));
        assert_feasible(&battery, &plan);
        assert_abs_diff_eq!(plan.steps[0].charge.0, 30.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[0].discharge.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[3].charge.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[3].discharge.0, 30.0, epsilon = EPSILON);
    }

    #[test]
    fn test_zero_prices() {
        let battery = battery();
        let plan = solve(&battery, &rates(&[0.0; 6]));
        assert_feasible(&battery, &plan);
        assert_abs_diff_eq!(plan.profit.0, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_price_scaling() {
        let battery = battery();
        let prices = [1.0, 2.0, 8.0, 9.0];
        let plan = solve(&battery, &rates(&prices));
        let scaled_plan = solve(&battery, &rates(&prices.map(|price| price * 2.5)));

        assert_abs_diff_eq!(scaled_plan.profit.0, plan.profit.0 * 2.5, epsilon = 1e-4);
        for (step, scaled_step) in plan.steps.iter().zip(&scaled_plan.steps) {
            assert_abs_diff_eq!(step.charge.0, scaled_step.charge.0, epsilon = 1e-4);
            assert_abs_diff_eq!(step.discharge.0, scaled_step.discharge.0, epsilon = 1e-4);
        }
        assert!(plan.throughput.round_trip_cycles() >= 0.0);
    }

    #[test]
    fn test_initial_energy_is_sold() {
        let battery = Battery::builder()
            .capacity_max(KilowattHours(100.0))
            .charging_power(Kilowatts(30.0))
            .discharging_power(Kilowatts(30.0))
            .charging_efficiency(0.95)
            .discharging_efficiency(0.95)
            .initial_energy(KilowattHours(20.0))
            .build()
            .unwrap();
        let plan = solve(&battery, &rates(&[5.0]));
        assert_feasible(&battery, &plan);
        assert_eq!(plan.n_simultaneous_steps(), 0);
        assert_abs_diff_eq!(plan.steps[0].charge.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.steps[0].discharge.0, 19.0, epsilon = EPSILON);
        assert_abs_diff_eq!(plan.profit.0, 95.0, epsilon = EPSILON);
    }

    #[test]
    fn test_empty_horizon() {
        let outcome = Optimizer::builder().battery(&battery()).rates(&[]).optimize();
        assert!(matches!(outcome, Outcome::NoTimeSteps));
    }

    #[test]
    fn test_time_limit() {
        let battery = battery();
        let rates = rates(&REFERENCE_DAY);
        let outcome = Optimizer::builder()
            .battery(&battery)
            .rates(&rates)
            .time_limit(Duration::from_secs(60))
            .optimize();
        let Outcome::Solved(plan) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_abs_diff_eq!(plan.profit.0, 2211.316, epsilon = 1e-2);
    }

    #[test]
    fn test_zero_time_limit() {
        let battery = battery();
        let rates = rates(&REFERENCE_DAY);
        let outcome = Optimizer::builder()
            .battery(&battery)
            .rates(&rates)
            .time_limit(Duration::ZERO)
            .optimize();
        assert!(
            matches!(outcome, Outcome::NoSolution(SolverStatus::TimedOut)),
            "unexpected outcome: {outcome:?}",
        );
    }

    #[test]
    fn test_concurrent_optimizations() {
        let battery = battery();
        let first = rates(&REFERENCE_DAY);
        let second = rates(&[1.0, 2.0, 3.0, 4.0]);
        let (first_plan, second_plan) = thread::scope(|scope| {
            let first_handle = scope.spawn(|| solve(&battery, &first));
            let second_handle = scope.spawn(|| solve(&battery, &second));
            (first_handle.join().unwrap(), second_handle.join().unwrap())
        });
        assert_eq!(first_plan.steps.len(), 24);
        assert_eq!(second_plan.steps.len(), 4);
        assert_abs_diff_eq!(first_plan.profit.0, 2211.316, epsilon = 1e-2);
    }
}
