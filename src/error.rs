use thiserror::Error;

use crate::geometry::{Point, Rect};
use crate::router::PathId;

/// Errors surfaced by [`crate::Router`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RouterError {
    /// The handle does not name a registered path.
    #[error("unknown path {0:?}")]
    UnknownPath(PathId),

    /// A path endpoint sits relative to an obstacle in a way tangent selection
    /// cannot handle. Not expected for well-formed input.
    #[error("unexpected position of vertex {vertex:?} relative to obstacle {obstacle:?}")]
    UnexpectedVertexPosition { vertex: Point, obstacle: Rect },
}
