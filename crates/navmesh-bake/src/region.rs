//! Region classification.
//!
//! Every triangle ends up with a named region and a pathing cost. Two
//! strategies exist, selected by [`RegionStrategy`]:
//!
//! - **Direct**: each triangle's area tag is looked up in a [`TagTable`].
//! - **Flood-fill**: connected same-tag islands are matched against labeled
//!   [`RegionVolume`]s; the smallest volume containing a whole island wins.
//!
//! The runtime stores region membership as a bitmask, so the number of distinct
//! regions is capped. [`RegionRegistry`] enforces the cap; names beyond it are
//! recorded for diagnostics but never written onto triangles.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use navmesh_bake::region::{RegionClassifier, RegionStrategy, TagRegion};
//! use navmesh_bake::{NavMesh, Triangle, Vertex};
//!
//! let mut mesh = NavMesh::new();
//! mesh.vertices.push(Vertex::from_coords(0, 0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1, 0.0, 0.0, 1.0));
//! mesh.vertices.push(Vertex::from_coords(2, 1.0, 0.0, 0.0));
//! mesh.triangles.push(Triangle::new([0, 1, 2], 3));
//!
//! let mut table = BTreeMap::new();
//! table.insert(3, TagRegion::new("Mud", 2.5));
//!
//! let mut classifier = RegionClassifier::new(RegionStrategy::Direct { table: &table }, &[], 64).unwrap();
//! classifier.classify(&mut mesh);
//! assert_eq!(mesh.triangles[0].region_id.as_deref(), Some("Mud"));
//! ```

use std::collections::{BTreeMap, VecDeque};

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BakeError, NavResult};
use crate::fixed::Fixed;
use crate::geometry::Aabb;
use crate::report::BakeWarning;
use crate::types::{Link, MAIN_AREA, MAX_REGIONS, NavMesh, Triangle};

fn default_cost() -> f64 {
    1.0
}

/// Region and cost for one area tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRegion {
    /// Region name.
    pub name: String,
    /// Pathing cost for triangles with this tag.
    #[serde(default = "default_cost")]
    pub cost: f64,
}

impl TagRegion {
    /// Create a table entry.
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// Area tag to region table.
pub type TagTable = BTreeMap<i32, TagRegion>;

/// A labeled box that casts its region onto the islands it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionVolume {
    /// Region name.
    pub name: String,
    /// World-space bounds.
    pub bounds: Aabb,
    /// Pathing cost for triangles inside.
    #[serde(default = "default_cost")]
    pub cost: f64,
}

impl RegionVolume {
    /// Create a region volume.
    pub fn new(name: impl Into<String>, bounds: Aabb, cost: f64) -> Self {
        Self {
            name: name.into(),
            bounds,
            cost,
        }
    }
}

/// How triangles are assigned to regions.
#[derive(Debug, Clone, Copy)]
pub enum RegionStrategy<'a> {
    /// Everything lands in `MainArea`.
    Disabled,
    /// Look each triangle's tag up in `table`.
    Direct {
        /// Tag to region table.
        table: &'a TagTable,
    },
    /// Match same-tag islands against labeled volumes.
    FloodFill {
        /// Candidate volumes.
        volumes: &'a [RegionVolume],
        /// Margin added to every volume before containment tests.
        margin: f64,
    },
}

/// Capped, ordered set of region names. `MainArea` always occupies slot 0.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    names: Vec<String>,
    cap: usize,
    overflow: Vec<String>,
}

impl RegionRegistry {
    /// Create a registry holding at most `cap` names.
    ///
    /// # Errors
    ///
    /// [`BakeError::InvalidRegionCap`] unless `1 <= cap <= MAX_REGIONS`.
    pub fn new(cap: usize) -> NavResult<Self> {
        if cap == 0 || cap > MAX_REGIONS {
            return Err(BakeError::InvalidRegionCap {
                cap,
                max: MAX_REGIONS,
            });
        }
        Ok(Self {
            names: vec![MAIN_AREA.to_string()],
            cap,
            overflow: Vec::new(),
        })
    }

    /// Register `name`, returning its slot, or `None` if the cap is reached.
    pub fn register(&mut self, name: &str) -> Option<usize> {
        if let Some(index) = self.index_of(name) {
            return Some(index);
        }
        if self.names.len() < self.cap {
            self.names.push(name.to_string());
            return Some(self.names.len() - 1);
        }
        if !self.overflow.iter().any(|n| n == name) {
            self.overflow.push(name.to_string());
        }
        None
    }

    /// Slot of `name`, if registered.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Registered names in slot order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names rejected because the cap was reached.
    pub fn overflow(&self) -> &[String] {
        &self.overflow
    }

    /// Configured cap.
    pub fn cap(&self) -> usize {
        self.cap
    }
}

/// Counts from one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    /// Islands found by flood-fill.
    pub islands: usize,
    /// Islands that matched no volume.
    pub unmatched: usize,
}

/// Assigns regions and costs to triangles and links.
pub struct RegionClassifier<'a> {
    strategy: RegionStrategy<'a>,
    allowlist: &'a [i32],
    registry: RegionRegistry,
    warnings: Vec<BakeWarning>,
}

impl<'a> RegionClassifier<'a> {
    /// Create a classifier.
    ///
    /// `allowlist` selects which area tags are classified; empty selects all.
    ///
    /// # Errors
    ///
    /// [`BakeError::InvalidRegionCap`] for a cap outside `1..=MAX_REGIONS`.
    pub fn new(strategy: RegionStrategy<'a>, allowlist: &'a [i32], max_regions: usize) -> NavResult<Self> {
        Ok(Self {
            strategy,
            allowlist,
            registry: RegionRegistry::new(max_regions)?,
            warnings: Vec::new(),
        })
    }

    fn is_selected(&self, tag: i32) -> bool {
        self.allowlist.is_empty() || self.allowlist.contains(&tag)
    }

    /// Resolve `name` through the registry, falling back to `MainArea` on overflow.
    fn admit(&mut self, name: &str) -> String {
        if self.registry.register(name).is_some() {
            return name.to_string();
        }
        let first_time = !self.warnings.iter().any(
            |w| matches!(w, BakeWarning::RegionCapExceeded { region, .. } if region == name),
        );
        if first_time {
            warn!(region = name, cap = self.registry.cap(), "Region cap reached");
            self.warnings.push(BakeWarning::RegionCapExceeded {
                region: name.to_string(),
                cap: self.registry.cap(),
            });
        }
        MAIN_AREA.to_string()
    }

    /// Region and cost for `tag` from a tag table.
    ///
    /// Tag 0 is always `MainArea`. Unmapped tags get `MainArea` at unit cost;
    /// mapped but unselected tags get `MainArea` and keep the mapped cost.
    fn lookup(&mut self, table: &TagTable, tag: i32) -> (String, Fixed) {
        match table.get(&tag) {
            Some(entry) if tag != 0 && self.is_selected(tag) => {
                let name = self.admit(&entry.name);
                (name, Fixed::from_f64(entry.cost))
            }
            Some(entry) => (MAIN_AREA.to_string(), Fixed::from_f64(entry.cost)),
            None => (MAIN_AREA.to_string(), Fixed::ONE),
        }
    }

    /// Assign a region and cost to every triangle of `mesh`.
    pub fn classify(&mut self, mesh: &mut NavMesh) -> ClassifyStats {
        match self.strategy {
            RegionStrategy::Disabled => {
                for tri in &mut mesh.triangles {
                    tri.region_id = Some(MAIN_AREA.to_string());
                }
                ClassifyStats::default()
            }
            RegionStrategy::Direct { table } => {
                for tri in &mut mesh.triangles {
                    let (name, cost) = self.lookup(table, tri.area_tag);
                    tri.region_id = Some(name);
                    tri.cost = cost;
                }
                ClassifyStats::default()
            }
            RegionStrategy::FloodFill { volumes, margin } => self.flood_fill(mesh, volumes, margin),
        }
    }

    fn flood_fill(&mut self, mesh: &mut NavMesh, volumes: &[RegionVolume], margin: f64) -> ClassifyStats {
        let mut stats = ClassifyStats::default();
        let islands = find_islands(mesh, |tag| self.is_selected(tag));
        let expanded: Vec<Aabb> = volumes.iter().map(|v| v.bounds.expanded(margin)).collect();

        for tri in &mut mesh.triangles {
            if !self.is_selected(tri.area_tag) {
                tri.region_id = Some(MAIN_AREA.to_string());
                tri.cost = Fixed::ONE;
            }
        }

        for island in &islands {
            stats.islands += 1;
            let vertices = island_vertices(mesh, island);

            let best = volumes
                .iter()
                .zip(&expanded)
                .enumerate()
                .filter(|(_, (_, bounds))| vertices.iter().all(|&v| bounds.contains(&mesh.position(v))))
                // Flat volumes have no extent in y, so footprint breaks volume ties
                .min_by(|(ia, (_, a)), (ib, (_, b))| {
                    a.volume()
                        .total_cmp(&b.volume())
                        .then(a.horizontal_area().total_cmp(&b.horizontal_area()))
                        .then(ia.cmp(ib))
                })
                .map(|(_, (volume, _))| volume);

            let (name, cost) = match best {
                Some(volume) => (self.admit(&volume.name), Fixed::from_f64(volume.cost)),
                None => {
                    stats.unmatched += 1;
                    let area_tag = mesh.triangles[island[0]].area_tag;
                    let bounds = Aabb::from_points(vertices.iter().map(|&v| mesh.position(v)));
                    if let Some(bounds) = bounds {
                        warn!(
                            area_tag,
                            triangles = island.len(),
                            "Island matched no region volume"
                        );
                        self.warnings.push(BakeWarning::UnmatchedIsland {
                            area_tag,
                            triangles: island.len(),
                            bounds,
                        });
                    }
                    (MAIN_AREA.to_string(), Fixed::ONE)
                }
            };

            for &t in island {
                mesh.triangles[t].region_id = Some(name.clone());
                mesh.triangles[t].cost = cost;
            }
        }

        info!(
            "Flood-fill found {} islands ({} unmatched)",
            stats.islands, stats.unmatched
        );
        stats
    }

    /// Region for a link with `area_tag`, looked up in `table`.
    ///
    /// Links are always `MainArea` when classification is disabled.
    pub fn link_region(&mut self, area_tag: i32, table: &TagTable) -> String {
        match self.strategy {
            RegionStrategy::Disabled => MAIN_AREA.to_string(),
            _ => self.lookup(table, area_tag).0,
        }
    }

    /// The registry, for inspection.
    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    /// Warnings collected so far.
    pub fn into_warnings(self) -> Vec<BakeWarning> {
        self.warnings
    }
}

/// Group selected triangles into islands: maximal sets connected through
/// shared vertices with the same area tag.
///
/// Islands are ordered by their lowest triangle index, and each island lists
/// its triangles in breadth-first order from that triangle.
pub fn find_islands(mesh: &NavMesh, selected: impl Fn(i32) -> bool) -> Vec<Vec<usize>> {
    let mut vertex_triangles: Vec<Vec<usize>> = vec![Vec::new(); mesh.vertices.len()];
    for (t, tri) in mesh.triangles.iter().enumerate() {
        for &v in &tri.vertices {
            vertex_triangles[v].push(t);
        }
    }

    let mut visited = vec![false; mesh.triangles.len()];
    let mut islands = Vec::new();

    for start in 0..mesh.triangles.len() {
        let tag = mesh.triangles[start].area_tag;
        if visited[start] || !selected(tag) {
            continue;
        }

        let mut island = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(t) = queue.pop_front() {
            island.push(t);
            for &v in &mesh.triangles[t].vertices {
                for &n in &vertex_triangles[v] {
                    if !visited[n] && mesh.triangles[n].area_tag == tag {
                        visited[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        islands.push(island);
    }

    debug!("Found {} islands", islands.len());
    islands
}

fn island_vertices(mesh: &NavMesh, island: &[usize]) -> Vec<usize> {
    let mut seen = HashSet::new();
    island
        .iter()
        .flat_map(|&t| mesh.triangles[t].vertices)
        .filter(|&v| seen.insert(v))
        .collect()
}

/// Distinct regions used by `triangles` and `links`.
///
/// `MainArea` comes first when used; the rest follow in order of first use.
pub fn collect_regions(triangles: &[Triangle], links: &[Link]) -> Vec<String> {
    let used = triangles
        .iter()
        .map(|t| t.region_id.as_deref())
        .chain(links.iter().map(|l| l.region_id.as_deref()))
        .flatten();

    let mut regions: Vec<String> = Vec::new();
    for name in used {
        if !regions.iter().any(|r| r == name) {
            regions.push(name.to_string());
        }
    }
    if let Some(main) = regions.iter().position(|r| r == MAIN_AREA) {
        let main = regions.remove(main);
        regions.insert(0, main);
    }
    regions
}
