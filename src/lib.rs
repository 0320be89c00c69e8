//! Shortest-path connector routing around rectangular obstacles.
//!
//! Register obstacles and paths on a [`Router`], then call [`Router::solve`] to
//! get polylines that avoid every obstacle and keep `spacing` clearance from
//! corners and from other paths bending around the same corner.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod route_dump;
pub mod router;
pub mod scene;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{RouterConfig, load_config};
pub use error::RouterError;
pub use geometry::{Point, Rect};
pub use router::{Obstacle, ObstacleId, Path, PathId, Router};
pub use scene::{Scene, parse_scene};
