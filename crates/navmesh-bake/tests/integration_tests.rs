//! End-to-end bake tests.
//!
//! Every test drives the public API the way a host exporter would: build a
//! `BakeInput`, pick a `BakeConfig`, call `bake`, inspect result and report.
//!
//! Run with: cargo test -p navmesh-bake --test integration_tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use nalgebra::Point3;
use navmesh_bake::geometry::in_circumcircle;
use navmesh_bake::t_junction::find_t_junction;
use navmesh_bake::{
    Aabb, BakeConfig, BakeInput, BakeIssue, BakeOutput, BakeResult, BakeStage, BakeWarning,
    ErrorCode, Fixed, LinkEndpoint, MAIN_AREA, NavMesh, Progress, ProgressCallback,
    RegionModeKind, RegionVolume, SourceLink, SourceTriangle, TagRegion, TagTable, bake,
};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn bake_ok(input: &BakeInput, config: &BakeConfig) -> BakeOutput {
    match bake(input, config, None) {
        Ok(output) => output,
        Err(failure) => panic!("bake failed at {}: {}", failure.stage, failure.error),
    }
}

fn as_mesh(result: &BakeResult) -> NavMesh {
    NavMesh {
        vertices: result.vertices.clone(),
        triangles: result.triangles.clone(),
    }
}

fn assert_region_coverage(result: &BakeResult) {
    for (i, tri) in result.triangles.iter().enumerate() {
        let region = tri
            .region_id
            .as_deref()
            .unwrap_or_else(|| panic!("triangle {} has no region", i));
        assert!(
            result.region_index(region).is_some(),
            "region '{}' missing from table",
            region
        );
    }
    for link in &result.links {
        let region = link.region_id.as_deref().unwrap();
        assert!(result.region_index(region).is_some());
    }
    if result.region_index(MAIN_AREA).is_some() {
        assert_eq!(result.regions[0], MAIN_AREA);
    }
}

/// A 10 × 10 floor split along its diagonal.
fn floor() -> BakeInput {
    BakeInput::new(
        vec![
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 0.0, 10.0],
            [0.0, 0.0, 10.0],
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([0, 3, 2], 0),
        ],
    )
}

/// A flat diamond split along its long axis into two slivers.
fn sliver_diamond() -> BakeInput {
    BakeInput::new(
        vec![
            [-2.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 0.5],
            [0.0, 0.0, -0.5],
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([0, 1, 3], 0),
        ],
    )
}

/// Ground floor, a raised bridge, and a stray platform far away. The bridge
/// and the platform share area tag 2.
fn level_with_bridge() -> BakeInput {
    BakeInput::new(
        vec![
            // Ground
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 0.0, 10.0],
            [0.0, 0.0, 10.0],
            // Bridge
            [2.0, 2.0, 2.0],
            [4.0, 2.0, 2.0],
            [4.0, 2.0, 4.0],
            [2.0, 2.0, 4.0],
            // Stray platform
            [20.0, 2.0, 20.0],
            [21.0, 2.0, 20.0],
            [21.0, 2.0, 21.0],
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([0, 3, 2], 0),
            SourceTriangle::new([4, 6, 5], 2),
            SourceTriangle::new([4, 7, 6], 2),
            SourceTriangle::new([8, 10, 9], 2),
        ],
    )
    .with_region_volumes(vec![
        RegionVolume::new(
            "Level",
            Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(11.0, 1.0, 11.0)),
            1.0,
        ),
        RegionVolume::new(
            "BridgeWide",
            Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(6.0, 3.0, 6.0)),
            3.0,
        ),
        RegionVolume::new(
            "Bridge",
            Aabb::new(Point3::new(1.5, 1.5, 1.5), Point3::new(4.5, 2.5, 4.5)),
            2.0,
        ),
    ])
}

// =============================================================================
// Welding and Edge Fixing
// =============================================================================

#[test]
fn test_seam_vertices_are_welded() {
    // The same quad exported as two objects, with a tiny seam mismatch
    let input = BakeInput::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 0.0002],
            [1.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([3, 5, 4], 0),
        ],
    );
    let output = bake_ok(&input, &BakeConfig::default());

    assert_eq!(output.result.vertices.len(), 4);
    assert_eq!(output.report.summary.vertices_welded, 2);
    assert_eq!(output.report.summary.vertices_cleaned(), 2);
    // First-seen wins: the surviving corner is the exact origin
    assert_eq!(output.result.vertices[0].position, Point3::origin());
    assert_eq!(output.result.triangles[1].vertices, [0, 3, 2]);
}

#[test]
fn test_welding_disabled_keeps_duplicates() {
    let mut input = floor();
    input.vertices.push([0.0, 0.0, 0.0]);
    input.triangles[1].vertices = [4, 3, 2];
    let config = BakeConfig {
        weld_vertices: false,
        ..Default::default()
    };
    let output = bake_ok(&input, &config);
    assert_eq!(output.result.vertices.len(), 5);
    assert_eq!(output.report.summary.vertices_welded, 0);
    assert_eq!(output.result.vertices[4].position, Point3::origin());
    assert_eq!(output.result.triangles[1].vertices, [4, 3, 2]);
}

#[test]
fn test_t_junction_scenario() {
    // A large triangle with a neighbor's corner at the midpoint of its edge AB
    let input = BakeInput::new(
        vec![
            [0.0, 0.0, 0.0],  // A
            [2.0, 0.0, 0.0],  // B
            [0.0, 0.0, 2.0],  // C
            [1.0, 0.0, -1.0], // D
            [1.0, 0.0, 0.0],  // M
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([0, 4, 3], 0),
        ],
    );
    let output = bake_ok(&input, &BakeConfig::default());

    assert_eq!(output.result.triangles.len(), 3);
    assert_eq!(output.result.vertices.len(), 5);
    assert_eq!(output.report.summary.t_junctions_split, 1);

    let mesh = as_mesh(&output.result);
    for t in 0..mesh.triangle_count() {
        assert!(find_t_junction(&mesh, t, 1e-3, 1e-2).is_none());
    }
}

#[test]
fn test_t_junction_fixing_disabled() {
    let input = BakeInput::new(
        vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0],
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 0.0],
        ],
        vec![
            SourceTriangle::new([0, 2, 1], 0),
            SourceTriangle::new([0, 4, 3], 0),
        ],
    );
    let config = BakeConfig {
        fix_t_junctions: false,
        ..Default::default()
    };
    let output = bake_ok(&input, &config);
    assert_eq!(output.result.triangles.len(), 2);
    assert!(output.report.log.iter().any(|l| l == "Skipped T-junction fixing"));
}

// =============================================================================
// Delaunay
// =============================================================================

#[test]
fn test_delaunay_scenario() {
    let output = bake_ok(&sliver_diamond(), &BakeConfig::optimized());
    let result = &output.result;

    assert_eq!(result.triangles.len(), 2);
    assert_eq!(output.report.summary.edges_flipped, 1);

    // The short diagonal (top-bottom) replaced the long one
    for tri in &result.triangles {
        assert!(tri.contains_vertex(2));
        assert!(tri.contains_vertex(3));
    }

    let mesh = as_mesh(result);
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.corners(t);
        for v in &mesh.vertices {
            if !mesh.triangles[t].contains_vertex(v.id) {
                assert!(in_circumcircle(&a, &b, &c, &v.position) <= 0.0);
            }
        }
    }
}

#[test]
fn test_delaunay_disabled_keeps_slivers() {
    let output = bake_ok(&sliver_diamond(), &BakeConfig::default());
    assert_eq!(output.report.summary.edges_flipped, 0);
    assert!(output.result.triangles[0].contains_vertex(0));
    assert!(output.result.triangles[0].contains_vertex(1));
}

#[test]
fn test_delaunay_pass_limit_is_a_warning() {
    let config = BakeConfig {
        delaunay: true,
        delaunay_max_passes: 0,
        ..Default::default()
    };
    let output = bake_ok(&sliver_diamond(), &config);
    assert_eq!(output.result.triangles.len(), 2);
    assert!(
        output
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, BakeWarning::DelaunayPassLimit { passes: 0, .. }))
    );

    // One pass is enough for the diamond, so the limit is not a warning
    let config = BakeConfig {
        delaunay_max_passes: 1,
        ..config
    };
    let output = bake_ok(&sliver_diamond(), &config);
    assert_eq!(output.report.summary.edges_flipped, 1);
    assert!(
        !output
            .report
            .warnings
            .iter()
            .any(|w| matches!(w, BakeWarning::DelaunayPassLimit { .. }))
    );
}

// =============================================================================
// Regions
// =============================================================================

#[test]
fn test_disabled_regions_are_main_area() {
    let output = bake_ok(&level_with_bridge(), &BakeConfig::default());
    assert_eq!(output.result.regions, vec![MAIN_AREA.to_string()]);
    assert_region_coverage(&output.result);
}

#[test]
fn test_tagged_regions() {
    let mut table = TagTable::new();
    table.insert(2, TagRegion::new("Bridge", 2.5));
    let input = level_with_bridge().with_tag_regions(table);

    let output = bake_ok(&input, &BakeConfig::for_tagged_areas());
    let result = &output.result;
    assert_eq!(result.regions, vec![MAIN_AREA.to_string(), "Bridge".to_string()]);
    assert_eq!(result.triangles[0].region_id.as_deref(), Some(MAIN_AREA));
    assert_eq!(result.triangles[4].region_id.as_deref(), Some("Bridge"));
    assert_relative_eq!(result.triangles[2].cost.to_f64(), 2.5, epsilon = 1e-4);
    assert_eq!(result.triangles[0].cost, Fixed::ONE);
    assert_region_coverage(result);
}

#[test]
fn test_flood_fill_regions() {
    let output = bake_ok(&level_with_bridge(), &BakeConfig::for_region_volumes(0.1));
    let result = &output.result;

    assert_eq!(output.report.summary.islands, 3);
    assert_eq!(result.triangles[0].region_id.as_deref(), Some("Level"));
    // The tighter of the two volumes around the bridge wins
    assert_eq!(result.triangles[2].region_id.as_deref(), Some("Bridge"));
    assert_eq!(result.triangles[3].cost, Fixed::from_int(2));
    // The stray platform fits nowhere
    assert_eq!(result.triangles[4].region_id.as_deref(), Some(MAIN_AREA));
    assert_eq!(
        result.regions,
        vec![
            MAIN_AREA.to_string(),
            "Level".to_string(),
            "Bridge".to_string()
        ]
    );

    assert_eq!(output.report.warnings.len(), 1);
    match &output.report.warnings[0] {
        BakeWarning::UnmatchedIsland {
            area_tag, triangles, ..
        } => {
            assert_eq!(*area_tag, 2);
            assert_eq!(*triangles, 1);
        }
        other => panic!("unexpected warning: {}", other),
    }
    assert_region_coverage(result);
}

#[test]
fn test_flood_fill_allowlist() {
    let mut config = BakeConfig::for_region_volumes(0.1);
    config.region_tag_allowlist = vec![2];
    let output = bake_ok(&level_with_bridge(), &config);
    // Tag 0 is not selected, so the ground never becomes "Level"
    assert_eq!(output.result.triangles[0].region_id.as_deref(), Some(MAIN_AREA));
    assert_eq!(output.result.triangles[2].region_id.as_deref(), Some("Bridge"));
    assert_eq!(output.report.summary.islands, 2);
}

#[test]
fn test_region_cap_overflow() {
    let mut input = BakeInput::new(
        vec![
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [5.0, 0.0, 0.0],
            [5.0, 0.0, 1.0],
            [6.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [10.0, 0.0, 1.0],
            [11.0, 0.0, 0.0],
        ],
        vec![
            SourceTriangle::new([0, 1, 2], 1),
            SourceTriangle::new([3, 4, 5], 2),
            SourceTriangle::new([6, 7, 8], 3),
        ],
    );
    let mut table = TagTable::new();
    table.insert(1, TagRegion::new("Grass", 1.0));
    table.insert(2, TagRegion::new("Sand", 2.0));
    table.insert(3, TagRegion::new("Water", 8.0));
    input.tag_regions = table;

    let config = BakeConfig {
        max_regions: 2,
        ..BakeConfig::for_tagged_areas()
    };
    let output = bake_ok(&input, &config);
    let result = &output.result;

    assert_eq!(result.regions, vec![MAIN_AREA.to_string(), "Grass".to_string()]);
    assert_eq!(result.triangles[1].region_id.as_deref(), Some(MAIN_AREA));
    // Overflowed regions keep their cost
    assert_eq!(result.triangles[2].cost, Fixed::from_int(8));

    let dropped: Vec<&str> = output
        .report
        .warnings
        .iter()
        .filter_map(|w| match w {
            BakeWarning::RegionCapExceeded { region, cap: 2 } => Some(region.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(dropped, vec!["Sand", "Water"]);
    assert_region_coverage(result);
}

// =============================================================================
// Links
// =============================================================================

#[test]
fn test_link_outside_mesh_is_dropped() {
    let input = floor().with_links(vec![
        SourceLink::new("jump_down", [-10.0, 0.0, 5.0], [5.0, 0.0, 5.0]),
        SourceLink::new("shortcut", [1.0, 0.0, 2.0], [8.0, 0.0, 7.0]),
    ]);
    let output = bake_ok(&input, &BakeConfig::default());

    assert_eq!(output.result.links.len(), 1);
    assert_eq!(output.result.links[0].name, "shortcut");
    assert_eq!(output.report.summary.links_dropped, 1);
    assert_eq!(
        output.report.issues,
        vec![BakeIssue::LinkUnresolved {
            link: "jump_down".into(),
            endpoint: LinkEndpoint::Start,
            position: [-10.0, 0.0, 5.0],
        }]
    );
    assert!(output.report.issues[0].to_string().contains("jump_down"));
}

#[test]
fn test_link_error_correction_snaps() {
    let input = floor().with_links(vec![SourceLink::new(
        "ledge",
        [10.2, 1.0, 5.0],
        [5.0, 0.5, 5.0],
    )]);
    let config = BakeConfig {
        link_error_correction: 0.5,
        ..Default::default()
    };
    let output = bake_ok(&input, &config);

    let link = &output.result.links[0];
    assert!(link.is_resolved());
    assert_relative_eq!(link.start, Point3::new(10.0, 0.0, 5.0), epsilon = 1e-9);
    assert_relative_eq!(link.end.y, 0.0, epsilon = 1e-9);

    // Without correction the same link is off the mesh
    let output = bake_ok(&input, &BakeConfig::default());
    assert!(output.result.links.is_empty());
}

#[test]
fn test_link_resolution_is_deterministic() {
    let input = floor().with_links(vec![
        SourceLink::new("a", [3.0, 0.4, 3.0], [7.0, 0.0, 2.0]),
        SourceLink::new("b", [10.1, 0.0, 10.1], [0.0, 0.0, 0.0]),
    ]);
    let config = BakeConfig {
        link_error_correction: 0.25,
        ..Default::default()
    };
    let first = bake_ok(&input, &config);
    let second = bake_ok(&input, &config);
    assert_eq!(first.result.links, second.result.links);
    assert_eq!(first.result.links.len(), 2);
}

#[test]
fn test_disabled_links_are_skipped() {
    let mut off = SourceLink::new("off", [1.0, 0.0, 2.0], [8.0, 0.0, 7.0]);
    off.enabled = false;
    let mut far = SourceLink::new("far_and_off", [100.0, 0.0, 0.0], [8.0, 0.0, 7.0]);
    far.enabled = false;
    let input = floor().with_links(vec![off, far]);

    let output = bake_ok(&input, &BakeConfig::default());
    assert!(output.result.links.is_empty());
    assert!(output.report.issues.is_empty());
    assert_eq!(output.report.summary.links_skipped, 2);
}

#[test]
fn test_link_properties_carry_over() {
    let mut link = SourceLink::new("one_way", [1.0, 0.0, 2.0], [8.0, 0.0, 7.0]);
    link.bidirectional = false;
    link.cost_modifier = 3.5;
    let output = bake_ok(&floor().with_links(vec![link]), &BakeConfig::default());

    let link = &output.result.links[0];
    assert!(!link.bidirectional);
    assert_eq!(link.cost_override, Fixed::from_f64(3.5));
    assert_eq!(link.region_id.as_deref(), Some(MAIN_AREA));
}

// =============================================================================
// Fatal Conditions and Cancellation
// =============================================================================

#[test]
fn test_empty_input() {
    let failure = bake(&BakeInput::default(), &BakeConfig::default(), None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::EmptyInput);
    assert_eq!(failure.stage, BakeStage::Start);
}

#[test]
fn test_invalid_vertex_index() {
    let mut input = floor();
    input.triangles[1].vertices = [0, 7, 2];
    let failure = bake(&input, &BakeConfig::default(), None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::InvalidVertexIndex);
}

#[test]
fn test_non_finite_coordinate() {
    let mut input = floor();
    input.vertices[2][1] = f64::INFINITY;
    let failure = bake(&input, &BakeConfig::default(), None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::InvalidCoordinate);
}

#[test]
fn test_invalid_configuration() {
    let config = BakeConfig {
        max_regions: 65,
        ..Default::default()
    };
    let failure = bake(&floor(), &config, None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::InvalidRegionCap);

    let config = BakeConfig {
        link_grid_cells: 0,
        ..Default::default()
    };
    let failure = bake(&floor(), &config, None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::InvalidConfig);

    // Too many cells is rejected up front instead of overflowing the grid
    let config = BakeConfig {
        link_grid_cells: 1 << 33,
        ..Default::default()
    };
    let failure = bake(&floor(), &config, None).unwrap_err();
    assert_eq!(failure.error.code(), ErrorCode::InvalidConfig);
    assert_eq!(failure.stage, BakeStage::Start);
}

#[test]
fn test_cancellation_stops_the_bake() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let callback: ProgressCallback = Box::new(move |p: &Progress| {
        counter.fetch_add(1, Ordering::SeqCst);
        p.stage != BakeStage::Classified
    });

    let input = floor().with_links(vec![SourceLink::new(
        "never_resolved",
        [1.0, 0.0, 2.0],
        [8.0, 0.0, 7.0],
    )]);
    let failure = bake(&input, &BakeConfig::default(), Some(&callback)).unwrap_err();

    assert!(failure.is_cancelled());
    assert_eq!(failure.stage, BakeStage::Classified);
    assert_eq!(failure.error.code(), ErrorCode::Cancelled);
    // Start, Welded, EdgeFixed, Classified
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(failure.report.summary.links_resolved, 0);
    assert!(failure.report.log.last().unwrap().contains("cancelled"));
}

#[test]
fn test_progress_fractions_increase() {
    let fractions = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&fractions);
    let callback: ProgressCallback = Box::new(move |p: &Progress| {
        sink.lock().unwrap().push(p.fraction);
        true
    });
    bake(&sliver_diamond(), &BakeConfig::optimized(), Some(&callback)).unwrap();

    let fractions = fractions.lock().unwrap();
    assert_eq!(fractions.len(), 7);
    assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_config_toml_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bake.toml");

    let config = BakeConfig {
        region_mode: RegionModeKind::Advanced,
        region_tag_allowlist: vec![2, 5],
        link_error_correction: 0.3,
        ..BakeConfig::optimized()
    };
    config.save_toml(&path).unwrap();
    let loaded = BakeConfig::from_toml_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_input_json_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("level.json");

    let input = level_with_bridge().with_links(vec![SourceLink::new(
        "climb",
        [3.0, 0.0, 3.0],
        [3.0, 2.0, 3.0],
    )]);
    input.save_json(&path).unwrap();
    let loaded = BakeInput::load_json(&path).unwrap();
    assert_eq!(loaded, input);

    let output = bake_ok(&loaded, &BakeConfig::for_region_volumes(0.1));
    // The climb lands on the bridge, the nearer of the two floors
    assert_eq!(output.result.links[0].end_triangle, Some(2));
}

#[test]
fn test_result_serializes() {
    let output = bake_ok(&floor(), &BakeConfig::default());
    let json = serde_json::to_value(&output.result).unwrap();
    assert_eq!(json["regions"][0], MAIN_AREA);
    assert_eq!(json["triangles"].as_array().unwrap().len(), 2);

    let report = serde_json::to_value(&output.report).unwrap();
    assert_eq!(report["summary"]["output_triangles"], 2);
}

#[test]
fn test_flat_arrays() {
    let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
    let triangles = [0, 1, 2, 4];
    let input = BakeInput::from_flat(&positions, &triangles).unwrap();
    let output = bake_ok(&input, &BakeConfig::default());
    assert_eq!(output.result.triangles[0].area_tag, 4);

    let err = BakeInput::from_flat(&positions[..8], &triangles).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MalformedInput);
}
