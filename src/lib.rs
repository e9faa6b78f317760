pub mod error;
pub mod geometry;
pub mod model;
pub mod params;
pub mod placement;
pub mod render;
pub mod simulation;
pub mod trajectory;

pub use error::{Error, Result};
