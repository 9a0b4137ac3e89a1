use crate::gateway::GatewayError;
use crate::store::Endpoint;
use crate::timeline::WeekRange;

/// A candidate range shares at least one week with an existing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapError {
    pub candidate: WeekRange,
    pub existing: WeekRange,
}

impl std::fmt::Display for OverlapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} overlaps the existing period on {}",
            self.candidate, self.existing
        )
    }
}

impl std::error::Error for OverlapError {}

/// A boundary nudge that was refused. The period is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryError {
    UnknownPeriod(usize),
    /// The moved endpoint would pass the other endpoint of the same period.
    CrossesSibling { index: usize, endpoint: Endpoint },
    OutsideTimeline { index: usize, endpoint: Endpoint },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::UnknownPeriod(i) => write!(f, "No period at position {i}"),
            BoundaryError::CrossesSibling { index, endpoint } => write!(
                f,
                "Moving the {endpoint} of period {index} would invert its range"
            ),
            BoundaryError::OutsideTimeline { index, endpoint } => write!(
                f,
                "Moving the {endpoint} of period {index} would leave the plan"
            ),
        }
    }
}

impl std::error::Error for BoundaryError {}

#[derive(Debug)]
pub enum PeriodError {
    OutsideTimeline(WeekRange),
    Overlap(OverlapError),
    UnknownPeriod(usize),
    UnknownExercise(String),
    InvalidPercentage(f64),
    /// The store no longer accepts gateway traffic.
    Detached,
    Gateway(GatewayError),
}

impl std::fmt::Display for PeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodError::OutsideTimeline(r) => write!(f, "{r} is outside the plan"),
            PeriodError::Overlap(e) => write!(f, "{e}"),
            PeriodError::UnknownPeriod(i) => write!(f, "No period at position {i}"),
            PeriodError::UnknownExercise(id) => write!(f, "Exercise {id} is not in this period"),
            PeriodError::InvalidPercentage(p) => write!(f, "Invalid percentage: {p}"),
            PeriodError::Detached => write!(f, "Period store has been detached"),
            PeriodError::Gateway(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PeriodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PeriodError::Overlap(e) => Some(e),
            PeriodError::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OverlapError> for PeriodError {
    fn from(e: OverlapError) -> Self {
        PeriodError::Overlap(e)
    }
}

impl From<GatewayError> for PeriodError {
    fn from(e: GatewayError) -> Self {
        PeriodError::Gateway(e)
    }
}
