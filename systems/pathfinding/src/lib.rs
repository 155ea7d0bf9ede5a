#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* pathfinding over immutable grid snapshots.
//!
//! Searches run against a [`GridSnapshot`] so the result reflects a single,
//! consistent view of walkability even if the live grid is edited before the
//! path is consumed. Movement is 8-directional: orthogonal steps cost `1`,
//! diagonal steps cost `√2`, and the octile distance serves as an admissible,
//! consistent heuristic. Ties between equally promising candidates are broken
//! by the lexicographically smaller `(column, row)` so identical inputs always
//! produce identical paths.

use std::{cmp::Ordering, collections::BinaryHeap, f64::consts::SQRT_2};

use log::trace;
use zoo_tycoon_core::{CellCoord, GridError, GridSnapshot, PathRequest};

/// Ordered sequence of cells from start to goal, both inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
    cost: f64,
}

impl Path {
    /// Waypoints in travel order, starting with the start cell.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Total traversal cost of the path.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of moves required, zero when start and goal coincide.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// First waypoint of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.waypoints.first().copied()
    }

    /// Final waypoint of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.waypoints.last().copied()
    }

    /// Consumes the path, yielding its waypoints.
    #[must_use]
    pub fn into_waypoints(self) -> Vec<CellCoord> {
        self.waypoints
    }
}

/// Result of a pathfinding search.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
    /// A route exists.
    Found(Path),
    /// The goal cannot be reached from the start.
    NotFound,
}

impl PathOutcome {
    /// Reports whether a route was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Borrows the found path, if any.
    #[must_use]
    pub const fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::NotFound => None,
        }
    }
}

/// Reusable A* search engine.
///
/// The engine keeps its scratch buffers between searches so repeated requests
/// on the same grid size do not reallocate.
#[derive(Debug, Default)]
pub struct PathfindingEngine {
    workspace: Workspace,
}

impl PathfindingEngine {
    /// Creates an engine with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a route for `request` against `snapshot`.
    ///
    /// Start and goal must lie inside the snapshot. The start cell does not
    /// need to be walkable so that an agent standing on a freshly blocked tile
    /// can still leave it.
    pub fn find_path(
        &mut self,
        snapshot: &GridSnapshot,
        request: PathRequest,
    ) -> Result<PathOutcome, GridError> {
        let start = request.start();
        let goal = request.goal();
        let _ = snapshot.is_walkable(start)?;
        let goal_walkable = snapshot.is_walkable(goal)?;

        if start == goal {
            return Ok(PathOutcome::Found(Path {
                waypoints: vec![start],
                cost: 0.0,
            }));
        }

        if !goal_walkable {
            trace!("goal {goal:?} is blocked, skipping search");
            return Ok(PathOutcome::NotFound);
        }

        Ok(self.workspace.search(snapshot, start, goal))
    }
}

#[derive(Debug, Default)]
struct Workspace {
    columns: u32,
    cost_so_far: Vec<f64>,
    came_from: Vec<Option<usize>>,
    closed: Vec<bool>,
    open: BinaryHeap<Candidate>,
}

impl Workspace {
    fn prepare(&mut self, columns: u32, rows: u32) {
        let node_count_u64 = u64::from(columns) * u64::from(rows);
        let node_count = usize::try_from(node_count_u64).unwrap_or(0);

        self.columns = columns;
        self.cost_so_far.clear();
        self.cost_so_far.resize(node_count, f64::INFINITY);
        self.came_from.clear();
        self.came_from.resize(node_count, None);
        self.closed.clear();
        self.closed.resize(node_count, false);
        self.open.clear();
    }

    fn search(&mut self, snapshot: &GridSnapshot, start: CellCoord, goal: CellCoord) -> PathOutcome {
        self.prepare(snapshot.columns(), snapshot.rows());

        let (Some(start_index), Some(goal_index)) = (self.index(start), self.index(goal)) else {
            return PathOutcome::NotFound;
        };

        self.cost_so_far[start_index] = 0.0;
        self.open.push(Candidate {
            estimate: start.octile_distance(goal),
            cost: 0.0,
            cell: start,
        });

        let mut expanded = 0_usize;
        while let Some(candidate) = self.open.pop() {
            let Some(current) = self.index(candidate.cell) else {
                continue;
            };
            if self.closed[current] {
                continue;
            }
            self.closed[current] = true;
            expanded += 1;

            if current == goal_index {
                trace!("reached {goal:?} after expanding {expanded} cells");
                return PathOutcome::Found(self.reconstruct(goal_index, candidate.cost));
            }

            for (neighbor, step_cost) in neighbors(snapshot, candidate.cell) {
                let Some(next) = self.index(neighbor) else {
                    continue;
                };
                if self.closed[next] {
                    continue;
                }

                let tentative = candidate.cost + step_cost;
                if tentative < self.cost_so_far[next] {
                    self.cost_so_far[next] = tentative;
                    self.came_from[next] = Some(current);
                    self.open.push(Candidate {
                        estimate: tentative + neighbor.octile_distance(goal),
                        cost: tentative,
                        cell: neighbor,
                    });
                }
            }
        }

        trace!("exhausted {expanded} cells without reaching {goal:?}");
        PathOutcome::NotFound
    }

    fn reconstruct(&self, goal_index: usize, cost: f64) -> Path {
        let mut waypoints = Vec::new();
        let mut cursor = Some(goal_index);
        while let Some(index) = cursor {
            waypoints.push(self.cell(index));
            cursor = self.came_from[index];
        }
        waypoints.reverse();
        Path { waypoints, cost }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        let index = row.checked_mul(width)?.checked_add(column)?;
        (index < self.closed.len()).then_some(index)
    }

    fn cell(&self, index: usize) -> CellCoord {
        let width = usize::try_from(self.columns).unwrap_or(1).max(1);
        let column = u32::try_from(index % width).unwrap_or(u32::MAX);
        let row = u32::try_from(index / width).unwrap_or(u32::MAX);
        CellCoord::new(column, row)
    }
}

/// Open-set entry ranked by estimated total cost, then by `(column, row)`.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    estimate: f64,
    cost: f64,
    cell: CellCoord,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        self.estimate
            .total_cmp(&other.estimate)
            .then_with(|| self.cell.cmp(&other.cell))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest element, so the lowest rank must compare greatest.
        other.rank(self)
    }
}

const OFFSETS: [(i64, i64); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

fn neighbors(
    snapshot: &GridSnapshot,
    cell: CellCoord,
) -> impl Iterator<Item = (CellCoord, f64)> + '_ {
    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let next = offset(cell, dx, dy)?;
        if !walkable(snapshot, next) {
            return None;
        }

        let cost = if dx != 0 && dy != 0 { SQRT_2 } else { 1.0 };
        Some((next, cost))
    })
}

fn offset(cell: CellCoord, dx: i64, dy: i64) -> Option<CellCoord> {
    let column = u32::try_from(i64::from(cell.column()) + dx).ok()?;
    let row = u32::try_from(i64::from(cell.row()) + dy).ok()?;
    Some(CellCoord::new(column, row))
}

fn walkable(snapshot: &GridSnapshot, cell: CellCoord) -> bool {
    snapshot.is_walkable(cell).unwrap_or(false)
}
