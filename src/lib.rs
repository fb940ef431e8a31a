pub use agent::{Agent, AgentAttributes, AgentSnapshot};
pub use cgmath;
pub use config::{QueuePolicy, Scenario, SimConfig};
pub use conflict::{closest_approach, ClosestApproach, SeparationMinima};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use kinematics::{KinematicState, StateLimits};
pub use maneuver::{ActionSet, Maneuver, ManeuverKind};
pub use report::{ConflictReport, ResolutionStatus, TimeToConflict};
pub use search::{ConflictPair, Quantization, Resolver, SearchConfig, SearchOutcome};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;

mod agent;
mod config;
pub mod conflict;
mod coordinator;
mod error;
pub mod kinematics;
pub mod maneuver;
pub mod math;
mod report;
pub mod scenario;
pub mod search;
mod util;

new_key_type! {
    /// Unique ID of an [Agent].
    pub struct AgentId;
}

type AgentSet = SlotMap<AgentId, Agent>;
