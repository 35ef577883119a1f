use crate::quantity::energy::KilowattHours;

quantity!(
    /// Average power over one time step.
    Kilowatts, via: f64, suffix: "kW", precision: 2
);

impl Kilowatts {
    /// Energy transferred at this power during a single step.
    ///
    /// A step is the resolution of the price series, one hour by convention,
    /// hence the same number.
    pub const fn per_step(self) -> KilowattHours {
        KilowattHours(self.0)
    }
}
