use itertools::Itertools;
use serde::Serialize;

use crate::quantity::energy::KilowattHours;

/// Energy moved in and out of the storage over the horizon.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Throughput {
    /// Total increase of the stored energy.
    pub charged: KilowattHours,

    /// Total decrease of the stored energy.
    pub discharged: KilowattHours,

    capacity: KilowattHours,
}

impl Throughput {
    /// Energy changes within this band are solver noise rather than activity.
    pub const TOLERANCE: KilowattHours = KilowattHours(1e-6);

    /// Accumulate the step-to-step changes of the energy trajectory.
    ///
    /// The capacity is the battery's maximum capacity, which is always positive.
    pub fn from_energy_levels(energy_levels: &[KilowattHours], capacity: KilowattHours) -> Self {
        let mut charged = KilowattHours::ZERO;
        let mut discharged = KilowattHours::ZERO;
        for (before, after) in energy_levels.iter().tuple_windows() {
            let delta = *after - *before;
            if delta > Self::TOLERANCE {
                charged += delta;
            } else if delta < -Self::TOLERANCE {
                discharged -= delta;
            }
        }
        Self { charged, discharged, capacity }
    }

    pub fn charge_cycles(&self) -> f64 {
        self.charged / self.capacity
    }

    pub fn discharge_cycles(&self) -> f64 {
        self.discharged / self.capacity
    }

    /// Full charge-then-discharge equivalents.
    pub fn round_trip_cycles(&self) -> f64 {
        (self.charged + self.discharged) / (self.capacity * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_full_cycle() {
        let levels = [0.0, 50.0, 100.0, 60.0, 0.0].map(KilowattHours);
        let throughput = Throughput::from_energy_levels(&levels, KilowattHours(100.0));
        assert_abs_diff_eq!(throughput.charged.0, 100.0);
        assert_abs_diff_eq!(throughput.discharged.0, 100.0);
        assert_abs_diff_eq!(throughput.charge_cycles(), 1.0);
        assert_abs_diff_eq!(throughput.discharge_cycles(), 1.0);
        assert_abs_diff_eq!(throughput.round_trip_cycles(), 1.0);
    }

    #[test]
    fn test_ignores_noise() {
        let levels = [10.0, 10.0 + 5e-7, 10.0, 10.0 - 9e-7].map(KilowattHours);
        let throughput = Throughput::from_energy_levels(&levels, KilowattHours(100.0));
        assert_eq!(throughput.charged, KilowattHours::ZERO);
        assert_eq!(throughput.discharged, KilowattHours::ZERO);
        assert_abs_diff_eq!(throughput.round_trip_cycles(), 0.0);
    }

    #[test]
    fn test_partial_cycle() {
        let levels = [20.0, 45.0, 30.0].map(KilowattHours);
        let throughput = Throughput::from_energy_levels(&levels, KilowattHours(50.0));
        assert_abs_diff_eq!(throughput.charge_cycles(), 0.5);
        assert_abs_diff_eq!(throughput.discharge_cycles(), 0.3);
        assert_abs_diff_eq!(throughput.round_trip_cycles(), 0.4);
    }

    #[test]
    fn test_empty_trajectory() {
        let throughput = Throughput::from_energy_levels(&[], KilowattHours(10.0));
        assert_abs_diff_eq!(throughput.round_trip_cycles(), 0.0);
    }
}
