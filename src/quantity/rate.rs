use crate::quantity::{cost::Cost, energy::KilowattHours};

quantity!(
    /// Energy price in the currency of the input series per kilowatt-hour.
    KilowattHourRate, via: f64, suffix: "/kWh", precision: 2
);

implement_mul!(KilowattHours, KilowattHourRate, Cost);
