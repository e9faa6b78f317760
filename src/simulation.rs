use crate::error::{Error, Result};
use crate::geometry::{Polygon, Vec2};
use crate::model::{Agent, AgentParameters, MotionModel};
use crate::trajectory::{TrajectoryRow, TrajectoryWriter};

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use tracing::debug;

/// Seconds of simulated time per iteration.
pub const DEFAULT_TIME_STEP: f64 = 0.05;

/// Iteration cap for [`Simulation::run`]. A defective model or geometry that
/// strands an agent reports [`Error::DidNotConverge`] instead of spinning
/// forever.
pub const DEFAULT_MAX_ITERATIONS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JourneyId(pub u64);

/// A target region agents are routed toward and removed upon reaching.
#[derive(Debug, Clone)]
struct ExitStage {
    polygon: Polygon,
    target: Vec2,
}

/// An ordered routing policy over stages. The corner scenario uses the
/// trivial single-stage journey that sends every agent straight to the exit.
#[derive(Debug, Clone)]
pub struct JourneyDescription {
    stages: Vec<StageId>,
}

impl JourneyDescription {
    pub fn new(stages: Vec<StageId>) -> Self {
        JourneyDescription { stages }
    }
}

/// What a completed run looked like.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub iterations: u64,
    pub agents: usize,
}

/// Top-level simulation driver. Owns the live agent set and the scenario
/// geometry, delegates per-step motion to `M`, and appends one trajectory row
/// per live agent per step as a side effect of [`Simulation::iterate`].
pub struct Simulation<M: MotionModel> {
    model: M,
    walkable_area: Polygon,
    stages: Vec<ExitStage>,
    journeys: Vec<JourneyDescription>,
    agents: Vec<Agent>,
    writer: Option<TrajectoryWriter>,
    dt: f64,
    iteration: u64,
    next_agent_id: u64,
    total_agents: usize,
}

impl<M: MotionModel> Simulation<M> {
    pub fn new(model: M, walkable_area: Polygon, writer: Option<TrajectoryWriter>) -> Self {
        Simulation {
            model,
            walkable_area,
            stages: Vec::new(),
            journeys: Vec::new(),
            agents: Vec::new(),
            writer,
            dt: DEFAULT_TIME_STEP,
            iteration: 0,
            next_agent_id: 0,
            total_agents: 0,
        }
    }

    /// Register an exit stage. Agents whose position enters the polygon are
    /// removed from the live set.
    pub fn add_exit_stage(&mut self, polygon: Polygon) -> StageId {
        let target = polygon.centroid();
        self.stages.push(ExitStage { polygon, target });
        StageId(self.stages.len() as u64 - 1)
    }

    pub fn add_journey(&mut self, journey: JourneyDescription) -> Result<JourneyId> {
        for stage in &journey.stages {
            if stage.0 as usize >= self.stages.len() {
                return Err(Error::UnknownStage(stage.0));
            }
        }
        self.journeys.push(journey);
        Ok(JourneyId(self.journeys.len() as u64 - 1))
    }

    pub fn add_agent(&mut self, params: AgentParameters) -> Result<u64> {
        if params.journey_id.0 as usize >= self.journeys.len() {
            return Err(Error::UnknownJourney(params.journey_id.0));
        }
        if params.stage_id.0 as usize >= self.stages.len() {
            return Err(Error::UnknownStage(params.stage_id.0));
        }
        let id = self.next_agent_id;
        self.next_agent_id += 1;
        self.total_agents += 1;
        self.agents.push(Agent {
            id,
            position: params.position,
            v0: params.v0,
            radius: params.radius,
            journey_id: params.journey_id,
            stage_id: params.stage_id,
        });
        Ok(id)
    }

    /// Number of agents that have not yet reached their exit stage.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn iteration_count(&self) -> u64 {
        self.iteration
    }

    /// Advance the simulation by one time step: query the model for every
    /// agent's velocity, integrate against the walkable area, record the new
    /// positions, then drop agents that reached their exit.
    pub fn iterate(&mut self) -> Result<()> {
        let velocities: Vec<Vec2> = {
            let agents = &self.agents;
            let stages = &self.stages;
            let model = &self.model;
            agents
                .par_iter()
                .map(|agent| {
                    let target = stages[agent.stage_id.0 as usize].target;
                    model.velocity(agent, agents, target)
                })
                .collect()
        };

        let dt = self.dt;
        for (agent, velocity) in self.agents.iter_mut().zip(velocities) {
            let candidate = agent.position + velocity.scale(dt);
            // Axis-slide against the walkable outline: a blocked diagonal step
            // degrades to its x or y component rather than stopping dead, so
            // agents follow the corridor around the corner.
            if self.walkable_area.contains(candidate) {
                agent.position = candidate;
            } else {
                let slide_x = Vec2::new(candidate.x, agent.position.y);
                let slide_y = Vec2::new(agent.position.x, candidate.y);
                if self.walkable_area.contains(slide_x) {
                    agent.position = slide_x;
                } else if self.walkable_area.contains(slide_y) {
                    agent.position = slide_y;
                }
            }
        }

        if let Some(writer) = self.writer.as_mut() {
            let frame = self.iteration;
            for agent in &self.agents {
                writer.write_row(&TrajectoryRow {
                    frame,
                    id: agent.id,
                    x: agent.position.x,
                    y: agent.position.y,
                })?;
            }
        }

        // Agents that reached their stage either advance along their journey
        // or, on the final stage, leave the simulation.
        let stages = &self.stages;
        let journeys = &self.journeys;
        let mut i = 0;
        while i < self.agents.len() {
            let agent = &mut self.agents[i];
            if !stages[agent.stage_id.0 as usize]
                .polygon
                .contains(agent.position)
            {
                i += 1;
                continue;
            }
            let journey = &journeys[agent.journey_id.0 as usize];
            let at = journey.stages.iter().position(|s| *s == agent.stage_id);
            match at.and_then(|idx| journey.stages.get(idx + 1)) {
                Some(&next) => {
                    agent.stage_id = next;
                    i += 1;
                }
                None => {
                    self.agents.remove(i);
                }
            }
        }

        self.iteration += 1;
        Ok(())
    }

    /// Step until every agent has exited, up to `max_iterations`. Exceeding
    /// the cap reports [`Error::DidNotConverge`] instead of looping forever.
    pub fn run(&mut self, max_iterations: usize) -> Result<RunSummary> {
        let total = self.agent_count() as u64;
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("exited {pos}/{len} agents [{bar:40}] {elapsed}")
                .progress_chars("=> "),
        );

        for _ in 0..max_iterations {
            if self.agent_count() == 0 {
                break;
            }
            self.iterate()?;
            bar.set_position(total - self.agent_count() as u64);
        }
        bar.finish();

        if self.agent_count() > 0 {
            return Err(Error::DidNotConverge {
                live: self.agent_count(),
                iterations: self.iteration as usize,
            });
        }

        if let Some(writer) = self.writer.take() {
            writer.finish()?;
        }
        debug!(iterations = self.iteration, "run complete");
        Ok(RunSummary {
            iterations: self.iteration,
            agents: self.total_agents,
        })
    }
}

/// Draw `count` desired speeds from `Normal(mean, std_dev)`, deterministically
/// for a fixed seed. Paired with placement positions by index order.
pub fn sample_speeds(mean: f64, std_dev: f64, count: usize, seed: u64) -> Result<Vec<f64>> {
    let normal = Normal::new(mean, std_dev)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..count).map(|_| normal.sample(&mut rng)).collect())
}
