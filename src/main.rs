use pedsim::geometry::Scenario;
use pedsim::model::{AgentParameters, CollisionFreeSpeedModel};
use pedsim::params::SimulationParams;
use pedsim::placement::{distribute_by_number, PlacementConfig};
use pedsim::render::{animate, render_layout, RenderConfig};
use pedsim::simulation::{
    sample_speeds, JourneyDescription, Simulation, DEFAULT_MAX_ITERATIONS,
};
use pedsim::trajectory::{TrajectoryData, TrajectoryWriter};
use pedsim::Result;

use tracing::info;

// Output files, overwritten each run.
const TRAJECTORY_FILE: &str = "corner.jsonl";
const LAYOUT_FILE: &str = "corner_layout.png";
const ANIMATION_FILE: &str = "corner.gif";

fn run() -> Result<()> {
    // Settings come from an optional TOML file given as the first argument.
    let params = match std::env::args().nth(1) {
        Some(path) => SimulationParams::from_file(path)?,
        None => SimulationParams::default().validated()?,
    };
    info!(
        num_agents = params.num_agents,
        speed_mean = params.speed_mean,
        speed_std_dev = params.speed_std_dev,
        seed = params.seed,
        "simulation settings"
    );

    let scenario = Scenario::corner();
    let positions = distribute_by_number(
        &scenario.spawn_area,
        params.num_agents,
        PlacementConfig {
            seed: params.seed,
            ..PlacementConfig::default()
        },
    )?;

    let render_config = RenderConfig::default();
    render_layout(&scenario, &positions, &render_config, LAYOUT_FILE)?;
    info!(file = LAYOUT_FILE, "initial configuration rendered");

    let writer = TrajectoryWriter::create(TRAJECTORY_FILE)?;
    let mut simulation = Simulation::new(
        CollisionFreeSpeedModel::default(),
        scenario.walkable_area.clone(),
        Some(writer),
    );
    let exit_id = simulation.add_exit_stage(scenario.exit_area.clone());
    let journey_id = simulation.add_journey(JourneyDescription::new(vec![exit_id]))?;

    let speeds = sample_speeds(
        params.speed_mean,
        params.speed_std_dev,
        params.num_agents,
        params.seed,
    )?;
    for (position, v0) in positions.into_iter().zip(speeds) {
        simulation.add_agent(AgentParameters::new(position, v0, journey_id, exit_id))?;
    }

    let summary = simulation.run(DEFAULT_MAX_ITERATIONS)?;
    info!(
        iterations = summary.iterations,
        agents = summary.agents,
        file = TRAJECTORY_FILE,
        "run complete"
    );

    let data = TrajectoryData::read_file(TRAJECTORY_FILE)?;
    animate(&data, &scenario, &render_config, ANIMATION_FILE)?;
    info!(file = ANIMATION_FILE, "animation rendered");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
