//! Bake orchestration.
//!
//! A bake runs a fixed, linear sequence of stages over one [`NavMesh`]:
//!
//! ```text
//! Start → Welded → EdgeFixed → (Triangulated | skip) → Classified → LinksResolved → Done
//! ```
//!
//! Any stage may end the bake in `Failed`. The orchestrator itself does no
//! geometry: it calls each stage, folds stage statistics and warnings into a
//! [`BakeReport`], and asks the progress callback whether to go on.
//!
//! # Example
//!
//! ```
//! use navmesh_bake::{BakeConfig, BakeInput, SourceTriangle, bake};
//!
//! let input = BakeInput::new(
//!     vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
//!     vec![SourceTriangle::new([0, 1, 2], 0)],
//! );
//! let output = bake(&input, &BakeConfig::default(), None).unwrap();
//!
//! assert_eq!(output.result.triangles.len(), 1);
//! assert_eq!(output.result.regions, vec!["MainArea".to_string()]);
//! ```

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{BakeConfig, RegionModeKind};
use crate::delaunay;
use crate::error::{BakeError, BakeFailure};
use crate::fixed::Fixed;
use crate::input::BakeInput;
use crate::links::resolve_links;
use crate::progress::{ProgressCallback, ProgressReporter};
use crate::region::{RegionClassifier, RegionStrategy, collect_regions};
use crate::report::{BakeReport, BakeWarning};
use crate::t_junction::fix_t_junctions;
use crate::tracing_ext::{OperationTimer, log_mesh_stats};
use crate::types::{BakeResult, Link, NavMesh};
use crate::weld::{remove_collapsed_triangles, remove_unused_vertices, weld};

/// Position of a bake in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeStage {
    /// Input and configuration validated.
    Start,
    /// Vertices welded and compacted.
    Welded,
    /// T-junctions split.
    EdgeFixed,
    /// Delaunay optimization finished.
    Triangulated,
    /// Every triangle carries a region.
    Classified,
    /// Link endpoints resolved.
    LinksResolved,
    /// Result assembled.
    Done,
    /// A fatal error ended the bake.
    Failed,
}

impl BakeStage {
    /// Overall completion once this stage has finished.
    pub fn fraction(self) -> f64 {
        match self {
            BakeStage::Start => 0.0,
            BakeStage::Welded => 0.2,
            BakeStage::EdgeFixed => 0.4,
            BakeStage::Triangulated => 0.6,
            BakeStage::Classified => 0.8,
            BakeStage::LinksResolved => 0.95,
            BakeStage::Done | BakeStage::Failed => 1.0,
        }
    }

    /// Human-readable phase name for progress reporting.
    pub fn phase_name(self) -> &'static str {
        match self {
            BakeStage::Start => "Validated input",
            BakeStage::Welded => "Welded vertices",
            BakeStage::EdgeFixed => "Fixed T-junctions",
            BakeStage::Triangulated => "Optimized triangulation",
            BakeStage::Classified => "Classified regions",
            BakeStage::LinksResolved => "Resolved links",
            BakeStage::Done => "Bake complete",
            BakeStage::Failed => "Bake failed",
        }
    }

    /// Whether no further stage can follow.
    pub fn is_terminal(self) -> bool {
        matches!(self, BakeStage::Done | BakeStage::Failed)
    }
}

impl std::fmt::Display for BakeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BakeStage::Start => "start",
            BakeStage::Welded => "welded",
            BakeStage::EdgeFixed => "edge_fixed",
            BakeStage::Triangulated => "triangulated",
            BakeStage::Classified => "classified",
            BakeStage::LinksResolved => "links_resolved",
            BakeStage::Done => "done",
            BakeStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A successful bake.
#[derive(Debug, Clone)]
pub struct BakeOutput {
    /// The baked navmesh.
    pub result: BakeResult,
    /// Warnings, issues and counts.
    pub report: BakeReport,
    /// Number of stages that did work.
    pub stages_executed: usize,
}

/// Runs one bake from input to [`BakeOutput`].
///
/// ```
/// use navmesh_bake::{BakeConfig, BakeInput, BakePipeline, SourceTriangle};
/// use navmesh_bake::progress::{Progress, ProgressCallback};
///
/// let input = BakeInput::new(
///     vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
///     vec![SourceTriangle::new([0, 1, 2], 0)],
/// );
/// let config = BakeConfig::optimized();
/// let callback: ProgressCallback = Box::new(|p: &Progress| p.fraction < 0.5);
///
/// let failure = BakePipeline::new(&input, &config)
///     .with_progress(&callback)
///     .run()
///     .unwrap_err();
/// assert!(failure.is_cancelled());
/// ```
pub struct BakePipeline<'a> {
    input: &'a BakeInput,
    config: &'a BakeConfig,
    mesh: NavMesh,
    links: Vec<Link>,
    stage: BakeStage,
    report: BakeReport,
    stages_executed: usize,
    progress: ProgressReporter<'a>,
}

impl<'a> BakePipeline<'a> {
    /// Prepare a bake of `input` with `config`. Nothing runs until [`run`](Self::run).
    pub fn new(input: &'a BakeInput, config: &'a BakeConfig) -> Self {
        Self {
            input,
            config,
            mesh: NavMesh::new(),
            links: Vec::new(),
            stage: BakeStage::Start,
            report: BakeReport::default(),
            stages_executed: 0,
            progress: ProgressReporter::new(None),
        }
    }

    /// Report progress to `callback` after every stage.
    pub fn with_progress(mut self, callback: &'a ProgressCallback) -> Self {
        self.progress = ProgressReporter::new(Some(callback));
        self
    }

    /// Run every stage in order.
    ///
    /// # Errors
    ///
    /// A [`BakeFailure`] for invalid input or configuration, or when the
    /// progress callback cancels. Degraded results and dropped links are not
    /// errors; they are listed in the report.
    pub fn run(self) -> Result<BakeOutput, BakeFailure> {
        info!(
            vertices = self.input.vertices.len(),
            triangles = self.input.triangles.len(),
            links = self.input.links.len(),
            "Starting bake"
        );
        self.start()?
            .weld()?
            .fix_edges()?
            .triangulate()?
            .classify()?
            .resolve_links()?
            .finish()
    }

    // =========================================================================
    // Stages
    // =========================================================================

    fn start(mut self) -> Result<Self, BakeFailure> {
        if let Err(e) = self.config.validate() {
            return Err(self.fail(e));
        }
        if let Err(e) = self.input.validate() {
            return Err(self.fail(e));
        }
        self.mesh = self.input.to_mesh();
        self.report.summary.input_vertices = self.mesh.vertex_count();
        self.report.summary.input_triangles = self.mesh.triangle_count();
        log_mesh_stats(&self.mesh, "input");
        self.log(format!(
            "Loaded {} vertices and {} triangles",
            self.mesh.vertex_count(),
            self.mesh.triangle_count()
        ));
        self.advance(BakeStage::Start)
    }

    fn weld(mut self) -> Result<Self, BakeFailure> {
        {
            let _timer = OperationTimer::with_context("weld", &self.mesh);
            let summary = &mut self.report.summary;
            if self.config.weld_vertices {
                let stats = weld(&mut self.mesh, self.config.weld_epsilon);
                summary.vertices_welded = stats.vertices_welded;
                summary.degenerate_triangles_removed = stats.degenerate_removed;
                summary.unused_vertices_removed = stats.unused_removed;
            } else {
                summary.degenerate_triangles_removed = remove_collapsed_triangles(&mut self.mesh);
                summary.unused_vertices_removed = remove_unused_vertices(&mut self.mesh);
            }
        }

        let summary = &self.report.summary;
        let message = if self.config.weld_vertices {
            format!(
                "Welded {} vertices (epsilon = {:e}), removed {} degenerate triangles",
                summary.vertices_welded, self.config.weld_epsilon, summary.degenerate_triangles_removed
            )
        } else {
            format!(
                "Skipped welding, removed {} degenerate triangles",
                summary.degenerate_triangles_removed
            )
        };
        self.log(message);
        if self.mesh.is_empty() {
            warn!("No triangles left after welding");
        }
        self.stages_executed += 1;
        log_mesh_stats(&self.mesh, "welded");
        self.advance(BakeStage::Welded)
    }

    fn fix_edges(mut self) -> Result<Self, BakeFailure> {
        if self.config.fix_t_junctions {
            let stats = {
                let _timer = OperationTimer::with_context("fix_t_junctions", &self.mesh);
                fix_t_junctions(
                    &mut self.mesh,
                    self.config.t_junction_epsilon,
                    self.config.t_junction_height_epsilon,
                )
            };
            self.report.summary.t_junctions_split = stats.splits;
            self.report.summary.unused_vertices_removed += stats.unused_removed;
            self.log(format!("Split {} T-junctions", stats.splits));
            self.stages_executed += 1;
            log_mesh_stats(&self.mesh, "edge_fixed");
        } else {
            self.log("Skipped T-junction fixing".to_string());
        }
        self.advance(BakeStage::EdgeFixed)
    }

    fn triangulate(mut self) -> Result<Self, BakeFailure> {
        if !self.config.delaunay {
            self.log("Skipped Delaunay optimization".to_string());
            return Ok(self);
        }

        let stats = {
            let _timer = OperationTimer::with_context("delaunay", &self.mesh);
            delaunay::optimize(
                &mut self.mesh,
                self.config.delaunay_restrict_to_planes,
                self.config.delaunay_max_passes,
            )
        };
        self.report.summary.edges_flipped = stats.flips;
        self.report.summary.delaunay_passes = stats.passes;
        if stats.hit_pass_limit {
            self.report.warnings.push(BakeWarning::DelaunayPassLimit {
                passes: stats.passes,
                flips: stats.flips,
            });
        }
        self.log(format!(
            "Flipped {} edges in {} Delaunay passes",
            stats.flips, stats.passes
        ));
        self.stages_executed += 1;
        self.advance(BakeStage::Triangulated)
    }

    fn classify(mut self) -> Result<Self, BakeFailure> {
        let input = self.input;
        let config = self.config;
        let strategy = match config.region_mode {
            RegionModeKind::Disabled => RegionStrategy::Disabled,
            RegionModeKind::Simple => RegionStrategy::Direct {
                table: &input.tag_regions,
            },
            RegionModeKind::Advanced => RegionStrategy::FloodFill {
                volumes: &input.region_volumes,
                margin: config.region_margin,
            },
        };
        let mut classifier =
            match RegionClassifier::new(strategy, &config.region_tag_allowlist, config.max_regions) {
                Ok(classifier) => classifier,
                Err(e) => return Err(self.fail(e)),
            };

        let stats = {
            let _timer = OperationTimer::with_context("classify", &self.mesh);
            classifier.classify(&mut self.mesh)
        };

        let mut skipped = 0;
        for source in &input.links {
            if !source.enabled {
                skipped += 1;
                continue;
            }
            self.links.push(Link {
                name: source.name.clone(),
                start: source.start_point(),
                end: source.end_point(),
                start_triangle: None,
                end_triangle: None,
                bidirectional: source.bidirectional,
                cost_override: Fixed::from_f64(source.cost_modifier),
                region_id: Some(classifier.link_region(source.area_tag, &input.tag_regions)),
            });
        }

        self.report.summary.islands = stats.islands;
        self.report.summary.links_skipped = skipped;
        self.report.warnings.extend(classifier.into_warnings());
        self.log(format!(
            "Classified {} triangles ({} region mode)",
            self.mesh.triangle_count(),
            config.region_mode
        ));
        self.stages_executed += 1;
        self.advance(BakeStage::Classified)
    }

    fn resolve_links(mut self) -> Result<Self, BakeFailure> {
        let links = std::mem::take(&mut self.links);
        let (links, issues, stats) = {
            let _timer = OperationTimer::with_context("resolve_links", &self.mesh);
            resolve_links(
                &self.mesh,
                links,
                self.config.link_grid_cells,
                self.config.link_error_correction,
            )
        };
        self.links = links;
        self.report.issues.extend(issues);
        self.report.summary.links_resolved = stats.resolved;
        self.report.summary.links_dropped = stats.dropped;
        self.log(format!(
            "Resolved {} links, dropped {}",
            stats.resolved, stats.dropped
        ));
        self.stages_executed += 1;
        self.advance(BakeStage::LinksResolved)
    }

    fn finish(mut self) -> Result<BakeOutput, BakeFailure> {
        let regions = collect_regions(&self.mesh.triangles, &self.links);

        let summary = &mut self.report.summary;
        summary.output_vertices = self.mesh.vertex_count();
        summary.output_triangles = self.mesh.triangle_count();
        summary.regions_found = regions.len();

        self.stage = BakeStage::Done;
        self.log(format!(
            "Baked {} triangles in {} regions",
            self.mesh.triangle_count(),
            regions.len()
        ));
        info!("{}", self.report.summary);
        for warning in &self.report.warnings {
            warn!("{}", warning);
        }
        // Cancelling after the last stage has nothing left to stop
        self.progress.stage_completed(BakeStage::Done);

        Ok(BakeOutput {
            result: BakeResult {
                vertices: self.mesh.vertices,
                triangles: self.mesh.triangles,
                links: self.links,
                regions,
            },
            report: self.report,
            stages_executed: self.stages_executed,
        })
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Enter `stage` and give the caller a chance to cancel.
    fn advance(mut self, stage: BakeStage) -> Result<Self, BakeFailure> {
        self.stage = stage;
        if self.progress.stage_completed(stage) {
            Ok(self)
        } else {
            warn!(%stage, "Bake cancelled by progress callback");
            self.log(format!("Cancelled after stage {}", stage));
            Err(self.fail(BakeError::Cancelled { stage }))
        }
    }

    fn fail(self, error: BakeError) -> BakeFailure {
        warn!(code = %error.code(), stage = %self.stage, "Bake failed: {}", error);
        let mut report = self.report;
        report.log.push(format!("Failed: {}", error));
        BakeFailure {
            error,
            stage: self.stage,
            report,
        }
    }

    fn log(&mut self, message: String) {
        self.report.log.push(message);
    }
}

/// Bake `input` with `config`, reporting to `progress` after every stage.
///
/// # Errors
///
/// See [`BakePipeline::run`].
pub fn bake(
    input: &BakeInput,
    config: &BakeConfig,
    progress: Option<&ProgressCallback>,
) -> Result<BakeOutput, BakeFailure> {
    let pipeline = BakePipeline::new(input, config);
    match progress {
        Some(callback) => pipeline.with_progress(callback).run(),
        None => pipeline.run(),
    }
}
