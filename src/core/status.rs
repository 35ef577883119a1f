use good_lp::ResolutionError;

/// Why the solver did not produce an optimal schedule.
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum SolverStatus {
    /// The constraints contradict each other.
    ///
    /// Idling is always feasible for a valid battery, so this points at a configuration bug.
    #[display("infeasible")]
    Infeasible,

    #[display("unbounded")]
    Unbounded,

    /// The solve did not finish within the configured time limit.
    #[display("timed out")]
    TimedOut,

    #[display("failed: {_0}")]
    Failed(String),
}

impl From<ResolutionError> for SolverStatus {
    fn from(error: ResolutionError) -> Self {
        match error {
            ResolutionError::Infeasible => Self::Infeasible,
            ResolutionError::Unbounded => Self::Unbounded,
            ResolutionError::Other(message) => Self::Failed(message.to_owned()),
            ResolutionError::Str(message) => Self::Failed(message),
        }
    }
}
