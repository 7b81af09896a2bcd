//! Navigation mesh baking from authored walkable triangulations.
//!
//! This crate takes the triangles a level-authoring tool exports for walkable
//! surfaces, along with per-triangle area tags and off-mesh links, and turns
//! them into a clean, deterministic [`BakeResult`] for a fixed-point
//! pathfinding runtime.
//!
//! # Stages
//!
//! - **Welding**: merge near-duplicate vertices, drop collapsed triangles and
//!   unreferenced vertices ([`weld`])
//! - **Edge fixing**: split triangles at T-junctions ([`t_junction`])
//! - **Delaunay optimization** (optional): flip sliver diagonals on a
//!   half-edge mesh ([`delaunay`], [`half_edge`])
//! - **Region classification**: by tag table, or by flood-filling same-tag
//!   islands into labeled volumes ([`region`])
//! - **Link resolution**: attach link endpoints to triangles through a uniform
//!   grid ([`links`], [`grid`])
//!
//! [`bake`] runs them in order, reports progress after each stage, and returns
//! the result with a [`BakeReport`].
//!
//! # Coordinate System
//!
//! The world is **Y-up**. "Horizontal" always means the XZ plane: the link
//! search grid and the on-surface test for link endpoints ignore height.
//! Triangles wind counter-clockwise seen from above.
//!
//! # Quick Start
//!
//! ```
//! use navmesh_bake::{BakeConfig, BakeInput, SourceLink, SourceTriangle, bake};
//!
//! let input = BakeInput::new(
//!     vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 0.0, 4.0], [0.0, 0.0, 4.0]],
//!     vec![
//!         SourceTriangle::new([0, 2, 1], 0),
//!         SourceTriangle::new([0, 3, 2], 0),
//!     ],
//! )
//! .with_links(vec![SourceLink::new("hop", [1.0, 0.0, 0.5], [3.0, 0.0, 3.5])]);
//!
//! let output = bake(&input, &BakeConfig::default(), None).unwrap();
//! println!("{}", output.report);
//!
//! assert_eq!(output.result.triangles.len(), 2);
//! assert_eq!(output.result.links.len(), 1);
//! ```
//!
//! # Failures
//!
//! Only empty or malformed input, invalid configuration and cancellation stop a
//! bake; they come back as a [`BakeFailure`] carrying the partial report.
//! Everything else (unmatched islands, region overflow, unresolved links) is
//! recorded in the report and the bake carries on.

mod error;
mod pipeline;
pub mod tracing_ext;
mod types;

#[cfg(test)]
mod edge_cases;

pub mod config;
pub mod delaunay;
pub mod fixed;
pub mod geometry;
pub mod grid;
pub mod half_edge;
pub mod input;
pub mod links;
pub mod progress;
pub mod region;
pub mod report;
pub mod t_junction;
pub mod weld;

// Re-export core types at crate root
pub use error::{BakeError, BakeFailure, ConfigError, ErrorCode, NavResult};
pub use fixed::Fixed;
pub use geometry::Aabb;
pub use types::{BakeResult, Link, MAIN_AREA, MAX_REGIONS, NavMesh, Triangle, Vertex};

// Inputs and configuration
pub use config::{BakeConfig, RegionModeKind};
pub use input::{BakeInput, SourceLink, SourceTriangle};
pub use region::{RegionVolume, TagRegion, TagTable};

// Pipeline
pub use pipeline::{BakeOutput, BakePipeline, BakeStage, bake};
pub use progress::{Progress, ProgressCallback};
pub use report::{BakeIssue, BakeReport, BakeSummary, BakeWarning, LinkEndpoint};

// Stage functions
pub use links::resolve_links;
pub use t_junction::fix_t_junctions;
pub use weld::{remove_unused_vertices, weld_vertices};
