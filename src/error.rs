use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("placed only {placed} of {requested} agents; spawn area cannot hold the requested count under the clearance constraints")]
    Placement { placed: usize, requested: usize },

    #[error("invalid parameter {name}: {value} outside [{min}, {max}]")]
    Params {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid speed distribution: {0}")]
    SpeedDistribution(#[from] rand_distr::NormalError),

    #[error("unknown stage id {0}")]
    UnknownStage(u64),

    #[error("unknown journey id {0}")]
    UnknownJourney(u64),

    #[error("simulation did not converge: {live} agents still live after {iterations} iterations")]
    DidNotConverge { live: usize, iterations: usize },

    #[error("malformed trajectory row at line {line}: {source}")]
    MalformedTrajectory {
        line: usize,
        source: serde_json::Error,
    },

    #[error("trajectory serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("scenario file error: {0}")]
    ScenarioFile(#[from] toml::de::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
