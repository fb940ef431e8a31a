use serde::Serialize;
use std::fmt;

/// When a reported conflict is predicted to happen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum TimeToConflict {
    /// The pair is already inside the horizontal minimum and not converging.
    Immediate,
    /// The closest approach is this many hours away.
    In(f64),
}

/// What the coordinator did about a reported conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ResolutionStatus {
    /// A plan with the given number of maneuvers was queued.
    Resolved(usize),
    /// The search found no plan; both agents are flagged.
    Failed,
    /// No search was run; both agents are flagged.
    NotAttempted,
}

/// A violating pair examined during one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConflictReport {
    pub callsign_a: String,
    pub callsign_b: String,
    pub time_to_conflict: TimeToConflict,
    /// Predicted horizontal separation in NM.
    pub horizontal: f64,
    /// Vertical separation in ft.
    pub vertical: f64,
    pub status: ResolutionStatus,
}

impl ConflictReport {
    /// Whether this report involves the given (normalised) callsign.
    pub fn involves(&self, callsign: &str) -> bool {
        self.callsign_a == callsign || self.callsign_b == callsign
    }
}

impl fmt::Display for TimeToConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "Immediate"),
            Self::In(hours) => write!(f, "In {:.1} min", hours * 60.0),
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(steps) => write!(f, "RESOLVED ({} steps)", steps),
            Self::Failed => write!(f, "FAILED"),
            Self::NotAttempted => write!(f, "NO RESOLUTION ATTEMPTED"),
        }
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} - {}: {:.2} NM / {:.0} ft, {}",
            self.callsign_a,
            self.callsign_b,
            self.time_to_conflict,
            self.horizontal,
            self.vertical,
            self.status
        )
    }
}
