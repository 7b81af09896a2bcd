//! Edge case tests for bake robustness.
//!
//! Empty, degenerate and otherwise unusual meshes pushed through every stage.
//! None of these may panic.

#[cfg(test)]
mod tests {
    use crate::delaunay::optimize;
    use crate::grid::SpatialGrid;
    use crate::half_edge::HalfEdgeMesh;
    use crate::links::{LinkResolver, resolve_links};
    use crate::region::{RegionClassifier, RegionStrategy, RegionVolume, TagTable, find_islands};
    use crate::t_junction::fix_t_junctions;
    use crate::weld::weld;
    use crate::{
        Aabb, BakeConfig, BakeInput, MAIN_AREA, NavMesh, RegionModeKind, SourceLink,
        SourceTriangle, Triangle, Vertex, bake,
    };
    use nalgebra::Point3;

    fn single_triangle() -> NavMesh {
        NavMesh {
            vertices: vec![
                Vertex::from_coords(0, 0.0, 0.0, 0.0),
                Vertex::from_coords(1, 0.0, 0.0, 1.0),
                Vertex::from_coords(2, 1.0, 0.0, 0.0),
            ],
            triangles: vec![Triangle::new([0, 1, 2], 0)],
        }
    }

    /// Three collinear vertices: a triangle with no area.
    fn needle() -> NavMesh {
        NavMesh {
            vertices: vec![
                Vertex::from_coords(0, 0.0, 0.0, 0.0),
                Vertex::from_coords(1, 1.0, 0.0, 0.0),
                Vertex::from_coords(2, 2.0, 0.0, 0.0),
            ],
            triangles: vec![Triangle::new([0, 1, 2], 0)],
        }
    }

    // ==================== Empty Mesh Tests ====================

    #[test]
    fn test_empty_mesh_stages() {
        let mut mesh = NavMesh::new();
        let stats = weld(&mut mesh, 1e-6);
        assert_eq!(stats.vertices_welded, 0);
        assert_eq!(fix_t_junctions(&mut mesh, 1e-3, 1e-2).splits, 0);
        assert_eq!(optimize(&mut mesh, true, 10).flips, 0);
        assert!(find_islands(&mesh, |_| true).is_empty());
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_empty_mesh_links() {
        let mesh = NavMesh::new();
        let links = vec![crate::Link {
            name: "nowhere".into(),
            start: Point3::origin(),
            end: Point3::new(1.0, 0.0, 0.0),
            start_triangle: None,
            end_triangle: None,
            bidirectional: true,
            cost_override: crate::Fixed::ONE,
            region_id: None,
        }];
        let (resolved, issues, _) = resolve_links(&mesh, links, 4, 1.0);
        assert!(resolved.is_empty());
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_empty_input_bake_fails_cleanly() {
        let input = BakeInput::new(vec![[0.0; 3]; 3], Vec::new());
        let failure = bake(&input, &BakeConfig::default(), None).unwrap_err();
        assert!(!failure.is_cancelled());
        assert!(failure.report.issues.is_empty());
    }

    // ==================== Degenerate Geometry Tests ====================

    #[test]
    fn test_fully_collapsed_mesh() {
        // Every vertex welds onto the first one
        let input = BakeInput::new(
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1e-4], [1e-4, 0.0, 0.0]],
            vec![SourceTriangle::new([0, 1, 2], 0)],
        );
        let config = BakeConfig {
            weld_epsilon: 1e-6,
            delaunay: true,
            ..Default::default()
        };
        let output = bake(&input, &config, None).unwrap();
        assert!(output.result.triangles.is_empty());
        assert!(output.result.vertices.is_empty());
        assert!(output.result.regions.is_empty());
        assert_eq!(output.report.summary.degenerate_triangles_removed, 1);
    }

    #[test]
    fn test_needle_triangle() {
        let mut mesh = needle();
        assert_eq!(fix_t_junctions(&mut mesh, 1e-3, 1e-2).splits, 0);
        assert_eq!(optimize(&mut mesh, true, 10).flips, 0);

        let grid = SpatialGrid::build(&mesh, 4);
        assert_eq!(grid.candidates(&Point3::new(1.0, 0.0, 0.0), 0.0), vec![0]);
        let hit = LinkResolver::new(&mesh, 4, 0.0).resolve_point(&Point3::new(1.5, 0.0, 0.0));
        assert_eq!(hit.map(|h| h.triangle), Some(0));
    }

    #[test]
    fn test_vertical_wall() {
        // A wall has no horizontal extent along one axis and no up-facing normal
        let mut mesh = NavMesh {
            vertices: vec![
                Vertex::from_coords(0, 0.0, 0.0, 0.0),
                Vertex::from_coords(1, 1.0, 0.0, 0.0),
                Vertex::from_coords(2, 1.0, 2.0, 0.0),
                Vertex::from_coords(3, 0.0, 2.0, 0.0),
            ],
            triangles: vec![Triangle::new([0, 1, 2], 0), Triangle::new([0, 2, 3], 0)],
        };
        let stats = optimize(&mut mesh, true, 10);
        assert_eq!(stats.rewound, 0);
        assert_eq!(mesh.triangle_count(), 2);
        let grid = SpatialGrid::build(&mesh, 8);
        assert!(!grid.candidates(&Point3::new(0.5, 1.0, 0.0), 0.0).is_empty());
    }

    #[test]
    fn test_duplicate_triangles() {
        let mut mesh = single_triangle();
        mesh.triangles.push(Triangle::new([0, 1, 2], 0));
        assert_eq!(fix_t_junctions(&mut mesh, 1e-3, 1e-2).splits, 0);
        let he = HalfEdgeMesh::from_mesh(&mesh);
        assert_eq!(he.face_count(), 2);
        assert_eq!(optimize(&mut mesh, true, 10).flips, 0);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_zero_epsilons() {
        let mut mesh = single_triangle();
        mesh.vertices.push(Vertex::from_coords(3, 0.0, 0.0, 0.0));
        mesh.triangles.push(Triangle::new([3, 2, 1], 0));
        let stats = weld(&mut mesh, 0.0);
        assert_eq!(stats.vertices_welded, 0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(fix_t_junctions(&mut mesh, 0.0, 0.0).splits, 0);
    }

    // ==================== Region Edge Cases ====================

    #[test]
    fn test_flood_fill_without_volumes() {
        let mut mesh = single_triangle();
        mesh.triangles[0].area_tag = 5;
        let volumes: Vec<RegionVolume> = Vec::new();
        let mut classifier = RegionClassifier::new(
            RegionStrategy::FloodFill {
                volumes: &volumes,
                margin: 0.0,
            },
            &[],
            1,
        )
        .unwrap();
        let stats = classifier.classify(&mut mesh);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(mesh.triangles[0].region_id.as_deref(), Some(MAIN_AREA));
        assert_eq!(classifier.into_warnings().len(), 1);
    }

    #[test]
    fn test_single_region_cap() {
        let mut table = TagTable::new();
        table.insert(1, crate::TagRegion::new("Grass", 1.0));
        let mut mesh = single_triangle();
        mesh.triangles[0].area_tag = 1;
        let mut classifier =
            RegionClassifier::new(RegionStrategy::Direct { table: &table }, &[], 1).unwrap();
        classifier.classify(&mut mesh);
        assert_eq!(mesh.triangles[0].region_id.as_deref(), Some(MAIN_AREA));
        assert_eq!(classifier.registry().overflow(), ["Grass".to_string()]);
    }

    #[test]
    fn test_zero_size_volume_with_margin() {
        let input = BakeInput::new(
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.1], [0.1, 0.0, 0.0]],
            vec![SourceTriangle::new([0, 1, 2], 2)],
        )
        .with_region_volumes(vec![RegionVolume::new(
            "Point",
            Aabb::new(Point3::new(0.05, 0.0, 0.05), Point3::new(0.05, 0.0, 0.05)),
            2.0,
        )]);
        let config = BakeConfig {
            region_mode: RegionModeKind::Advanced,
            region_margin: 0.1,
            ..Default::default()
        };
        let output = bake(&input, &config, None).unwrap();
        assert_eq!(output.result.triangles[0].region_id.as_deref(), Some("Point"));
    }

    // ==================== Link Edge Cases ====================

    #[test]
    fn test_link_with_nan_endpoint() {
        let input = BakeInput::new(
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            vec![SourceTriangle::new([0, 1, 2], 0)],
        )
        .with_links(vec![SourceLink::new(
            "broken",
            [f64::NAN, 0.0, 0.0],
            [0.2, 0.0, 0.2],
        )]);
        let output = bake(&input, &BakeConfig::default(), None).unwrap();
        assert!(output.result.links.is_empty());
        assert_eq!(output.report.issues.len(), 1);
    }

    #[test]
    fn test_huge_error_correction() {
        let mesh = single_triangle();
        let resolver = LinkResolver::new(&mesh, 2, 1e300);
        let hit = resolver.resolve_point(&Point3::new(1e6, 0.0, 1e6)).unwrap();
        assert_eq!(hit.triangle, 0);
    }
}
