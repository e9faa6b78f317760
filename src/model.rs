use crate::geometry::Vec2;
use crate::simulation::{JourneyId, StageId};

/// A single pedestrian. Position is continuous; `v0` is the desired free-flow
/// speed sampled at setup and fixed for the agent's lifetime.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: u64,
    pub position: Vec2,
    pub v0: f64,
    pub radius: f64,
    pub journey_id: JourneyId,
    pub stage_id: StageId,
}

/// Everything needed to register one agent with the simulation.
#[derive(Debug, Clone, Copy)]
pub struct AgentParameters {
    pub position: Vec2,
    pub v0: f64,
    pub radius: f64,
    pub journey_id: JourneyId,
    pub stage_id: StageId,
}

impl AgentParameters {
    pub fn new(position: Vec2, v0: f64, journey_id: JourneyId, stage_id: StageId) -> Self {
        AgentParameters {
            position,
            v0,
            radius: DEFAULT_AGENT_RADIUS,
            journey_id,
            stage_id,
        }
    }
}

pub const DEFAULT_AGENT_RADIUS: f64 = 0.2;

/// The capability seam between the simulation driver and the motion physics.
/// A model maps one agent's state, the other live agents, and the current
/// routing target to a velocity for this step. Swapping the model never
/// touches the driver.
pub trait MotionModel: Sync {
    fn velocity(&self, agent: &Agent, neighbors: &[Agent], target: Vec2) -> Vec2;
}

/// Collision-free speed model: agents head straight for the target and scale
/// their speed down with the gap to the nearest agent ahead of them in the
/// queue, so that bodies never overlap. Heavier avoidance physics is out of
/// scope.
///
/// An agent only yields to neighbors strictly closer to the target (ids break
/// exact ties), which makes blocking a strict order: the front agent of any
/// cluster is always free to move, so a packed crowd compresses and drains
/// instead of freezing.
#[derive(Debug, Clone, Copy)]
pub struct CollisionFreeSpeedModel {
    /// Time gap kept to the agent ahead, in seconds. Larger values make the
    /// crowd more cautious.
    pub time_gap: f64,
}

impl Default for CollisionFreeSpeedModel {
    fn default() -> Self {
        CollisionFreeSpeedModel { time_gap: 1.0 }
    }
}

impl CollisionFreeSpeedModel {
    /// Distance to the nearest neighbor blocking this agent's lane toward the
    /// target, or infinity when the lane is free. Only neighbors ahead in the
    /// queue ordering (closer to the target, ids breaking ties) count as
    /// blockers.
    fn gap_ahead(&self, agent: &Agent, neighbors: &[Agent], target: Vec2, direction: Vec2) -> f64 {
        let remaining = agent.position.distance(target);
        let mut gap = f64::INFINITY;
        for other in neighbors {
            if other.id == agent.id {
                continue;
            }
            let other_remaining = other.position.distance(target);
            if (other_remaining, other.id) >= (remaining, agent.id) {
                continue;
            }
            let offset = other.position - agent.position;
            let along = offset.x * direction.x + offset.y * direction.y;
            if along <= 0.0 {
                continue;
            }
            let lateral = (offset - direction.scale(along)).length();
            if lateral < agent.radius + other.radius {
                gap = gap.min(offset.length());
            }
        }
        gap
    }
}

impl MotionModel for CollisionFreeSpeedModel {
    fn velocity(&self, agent: &Agent, neighbors: &[Agent], target: Vec2) -> Vec2 {
        let direction = (target - agent.position).normalized();
        let gap = self.gap_ahead(agent, neighbors, target, direction);
        let body = 2.0 * agent.radius;
        let speed = if gap.is_finite() {
            agent.v0.min(((gap - body) / self.time_gap).max(0.0))
        } else {
            agent.v0
        };
        direction.scale(speed)
    }
}
