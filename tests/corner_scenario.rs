use pedsim::geometry::{Scenario, Vec2};
use pedsim::model::{AgentParameters, CollisionFreeSpeedModel};
use pedsim::placement::{distribute_by_number, PlacementConfig};
use pedsim::simulation::{
    sample_speeds, JourneyDescription, Simulation, DEFAULT_MAX_ITERATIONS,
};
use pedsim::trajectory::{TrajectoryData, TrajectoryWriter};

use itertools::Itertools;

#[test]
fn corner_run_records_every_agent_to_the_exit() {
    let scenario = Scenario::corner();
    let placement = PlacementConfig::default();
    let positions = distribute_by_number(&scenario.spawn_area, 20, placement).unwrap();
    assert_eq!(positions.len(), 20);
    for p in &positions {
        assert!(scenario.spawn_area.contains(*p));
    }

    let dir = tempfile::tempdir().unwrap();
    let trajectory_path = dir.path().join("corner.jsonl");
    let writer = TrajectoryWriter::create(&trajectory_path).unwrap();

    let mut simulation = Simulation::new(
        CollisionFreeSpeedModel::default(),
        scenario.walkable_area.clone(),
        Some(writer),
    );
    let exit_id = simulation.add_exit_stage(scenario.exit_area.clone());
    let journey_id = simulation
        .add_journey(JourneyDescription::new(vec![exit_id]))
        .unwrap();

    let speeds = sample_speeds(1.34, 0.05, 20, 1).unwrap();
    for (position, v0) in positions.into_iter().zip(speeds) {
        simulation
            .add_agent(AgentParameters::new(position, v0, journey_id, exit_id))
            .unwrap();
    }

    let summary = simulation.run(DEFAULT_MAX_ITERATIONS).unwrap();
    assert_eq!(simulation.agent_count(), 0);
    assert_eq!(summary.agents, 20);

    let data = TrajectoryData::read_file(&trajectory_path).unwrap();
    assert_eq!(data.agent_ids().len(), 20);

    for (id, rows) in data.by_agent() {
        // Frames strictly increase for every agent.
        for (a, b) in rows.iter().tuple_windows() {
            assert!(
                a.frame < b.frame,
                "agent {} frames out of order: {} then {}",
                id,
                a.frame,
                b.frame
            );
        }
        // Each trajectory ends in the exit area and stays inside the
        // walkable area throughout.
        let last = rows.last().unwrap();
        assert!(scenario.exit_area.contains(Vec2::new(last.x, last.y)));
        for row in rows {
            assert!(scenario.walkable_area.contains(Vec2::new(row.x, row.y)));
        }
    }
}

#[test]
fn repeated_runs_with_one_seed_record_identical_trajectories() {
    let run = || {
        let scenario = Scenario::corner();
        let positions =
            distribute_by_number(&scenario.spawn_area, 10, PlacementConfig::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corner.jsonl");
        let writer = TrajectoryWriter::create(&path).unwrap();

        let mut simulation = Simulation::new(
            CollisionFreeSpeedModel::default(),
            scenario.walkable_area.clone(),
            Some(writer),
        );
        let exit_id = simulation.add_exit_stage(scenario.exit_area.clone());
        let journey_id = simulation
            .add_journey(JourneyDescription::new(vec![exit_id]))
            .unwrap();
        let speeds = sample_speeds(1.34, 0.05, 10, 1).unwrap();
        for (position, v0) in positions.into_iter().zip(speeds) {
            simulation
                .add_agent(AgentParameters::new(position, v0, journey_id, exit_id))
                .unwrap();
        }
        simulation.run(DEFAULT_MAX_ITERATIONS).unwrap();
        TrajectoryData::read_file(&path).unwrap().rows().to_vec()
    };

    assert_eq!(run(), run());
}
