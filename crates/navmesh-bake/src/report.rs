//! Bake diagnostics.
//!
//! Every bake returns a [`BakeReport`], whether it succeeds or fails. Degraded
//! results become [`BakeWarning`]s, per-item failures become [`BakeIssue`]s,
//! and [`BakeSummary`] carries the counts worth logging.

use serde::Serialize;

use crate::geometry::Aabb;

/// A degraded result. The bake continued with a safe fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BakeWarning {
    /// A flood-filled island fit inside no region volume and fell back to `MainArea`.
    UnmatchedIsland {
        /// Area tag shared by the island.
        area_tag: i32,
        /// Triangles in the island.
        triangles: usize,
        /// Bounds of the island's vertices.
        bounds: Aabb,
    },

    /// A region could not be registered because the region cap was reached.
    RegionCapExceeded {
        /// Region that was dropped.
        region: String,
        /// Configured cap.
        cap: usize,
    },

    /// The Delaunay optimizer stopped at its pass limit.
    DelaunayPassLimit {
        /// Passes performed.
        passes: usize,
        /// Flips performed before stopping.
        flips: usize,
    },
}

impl std::fmt::Display for BakeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BakeWarning::UnmatchedIsland {
                area_tag,
                triangles,
                bounds,
            } => write!(
                f,
                "island of {} triangle(s) with tag {} near ({:.2}, {:.2}, {:.2}) matched no region volume",
                triangles, area_tag, bounds.center().x, bounds.center().y, bounds.center().z
            ),
            BakeWarning::RegionCapExceeded { region, cap } => {
                write!(f, "region '{}' dropped: cap of {} regions reached", region, cap)
            }
            BakeWarning::DelaunayPassLimit { passes, flips } => write!(
                f,
                "Delaunay optimizer stopped after {} passes ({} flips)",
                passes, flips
            ),
        }
    }
}

/// Which end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkEndpoint {
    /// The start point.
    Start,
    /// The end point.
    End,
}

impl std::fmt::Display for LinkEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkEndpoint::Start => f.write_str("start"),
            LinkEndpoint::End => f.write_str("end"),
        }
    }
}

/// A single item that was dropped from the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BakeIssue {
    /// A link endpoint found no triangle within the search radius.
    LinkUnresolved {
        /// Link name.
        link: String,
        /// Endpoint that failed.
        endpoint: LinkEndpoint,
        /// Position of that endpoint.
        position: [f64; 3],
    },
}

impl std::fmt::Display for BakeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BakeIssue::LinkUnresolved {
                link,
                endpoint,
                position,
            } => write!(
                f,
                "link '{}' {} at ({:.2}, {:.2}, {:.2}) is not on the navmesh",
                link, endpoint, position[0], position[1], position[2]
            ),
        }
    }
}

/// Counts collected across all stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BakeSummary {
    /// Vertices supplied.
    pub input_vertices: usize,
    /// Triangles supplied.
    pub input_triangles: usize,
    /// Vertices in the result.
    pub output_vertices: usize,
    /// Triangles in the result.
    pub output_triangles: usize,
    /// Vertices merged by welding.
    pub vertices_welded: usize,
    /// Vertices dropped because nothing referenced them.
    pub unused_vertices_removed: usize,
    /// Triangles removed because their corners collapsed.
    pub degenerate_triangles_removed: usize,
    /// Triangles split at T-junctions.
    pub t_junctions_split: usize,
    /// Edges flipped by the Delaunay optimizer.
    pub edges_flipped: usize,
    /// Delaunay passes performed.
    pub delaunay_passes: usize,
    /// Islands found by flood-fill classification.
    pub islands: usize,
    /// Distinct regions in the result.
    pub regions_found: usize,
    /// Links resolved onto the mesh.
    pub links_resolved: usize,
    /// Links dropped because an endpoint could not be resolved.
    pub links_dropped: usize,
    /// Disabled links that were skipped.
    pub links_skipped: usize,
}

impl BakeSummary {
    /// Total vertices removed by cleanup.
    pub fn vertices_cleaned(&self) -> usize {
        self.input_vertices.saturating_sub(self.output_vertices)
    }
}

impl std::fmt::Display for BakeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Bake Summary:")?;
        writeln!(
            f,
            "  Vertices: {} → {} ({} welded, {} unused)",
            self.input_vertices,
            self.output_vertices,
            self.vertices_welded,
            self.unused_vertices_removed
        )?;
        writeln!(
            f,
            "  Triangles: {} → {} ({} degenerate removed, {} T-junction splits)",
            self.input_triangles,
            self.output_triangles,
            self.degenerate_triangles_removed,
            self.t_junctions_split
        )?;
        if self.delaunay_passes > 0 {
            writeln!(
                f,
                "  Delaunay: {} flips in {} passes",
                self.edges_flipped, self.delaunay_passes
            )?;
        }
        if self.islands > 0 {
            writeln!(f, "  Islands: {}", self.islands)?;
        }
        writeln!(f, "  Regions: {}", self.regions_found)?;
        write!(
            f,
            "  Links: {} resolved, {} dropped, {} skipped",
            self.links_resolved, self.links_dropped, self.links_skipped
        )?;
        Ok(())
    }
}

/// Everything a bake reports besides its result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BakeReport {
    /// Degraded results.
    pub warnings: Vec<BakeWarning>,
    /// Dropped items.
    pub issues: Vec<BakeIssue>,
    /// Counts.
    pub summary: BakeSummary,
    /// One line per stage executed.
    pub log: Vec<String>,
}

impl BakeReport {
    /// Whether the bake produced no warnings and no issues.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.issues.is_empty()
    }
}

impl std::fmt::Display for BakeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.summary)?;
        if !self.warnings.is_empty() {
            writeln!(f, "Warnings ({}):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(f, "  - {}", warning)?;
            }
        }
        if !self.issues.is_empty() {
            writeln!(f, "Issues ({}):", self.issues.len())?;
            for issue in &self.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_report_clean() {
        let mut report = BakeReport::default();
        assert!(report.is_clean());
        report.warnings.push(BakeWarning::DelaunayPassLimit {
            passes: 10,
            flips: 40,
        });
        assert!(!report.is_clean());
    }

    #[test]
    fn test_issue_names_link() {
        let issue = BakeIssue::LinkUnresolved {
            link: "ledge_jump".into(),
            endpoint: LinkEndpoint::Start,
            position: [10.0, 0.0, -3.5],
        };
        let text = issue.to_string();
        assert!(text.contains("ledge_jump"));
        assert!(text.contains("start"));
    }

    #[test]
    fn test_warning_display() {
        let warning = BakeWarning::UnmatchedIsland {
            area_tag: 4,
            triangles: 12,
            bounds: Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)),
        };
        let text = warning.to_string();
        assert!(text.contains("12 triangle"));
        assert!(text.contains("(1.00, 1.00, 1.00)"));
    }

    #[test]
    fn test_summary_display() {
        let summary = BakeSummary {
            input_vertices: 10,
            output_vertices: 7,
            vertices_welded: 3,
            links_resolved: 2,
            ..Default::default()
        };
        assert_eq!(summary.vertices_cleaned(), 3);
        let text = summary.to_string();
        assert!(text.contains("10 → 7"));
        assert!(text.contains("2 resolved"));
        assert!(!text.contains("Delaunay"));
    }

    #[test]
    fn test_report_serializes_with_kind_tags() {
        let report = BakeReport {
            issues: vec![BakeIssue::LinkUnresolved {
                link: "a".into(),
                endpoint: LinkEndpoint::End,
                position: [0.0; 3],
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["issues"][0]["kind"], "link_unresolved");
        assert_eq!(json["issues"][0]["endpoint"], "end");
    }
}
