quantity!(
    /// Money in the currency of the input price series.
    Cost, via: f64, suffix: "", precision: 2
);
