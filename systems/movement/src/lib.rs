#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Moves visitors along planned paths and re-plans when the grid changes.
//!
//! Work is split into two phases that the simulation calls once per tick:
//! [`MovementController::plan`] resolves queued path requests against a
//! single grid snapshot, and [`MovementController::advance`] walks agents
//! toward their next waypoint while checking the live grid for tiles that
//! became blocked after the path was computed.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use log::{debug, trace};
use zoo_tycoon_core::{AgentId, CellCoord, GridError, PathRequest, TileGrid};
use zoo_tycoon_system_pathfinding::{PathOutcome, PathfindingEngine};

/// Tunables that convert grid paths into pixel-space motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    tile_length: f32,
    speed: f32,
    arrival_epsilon: f32,
}

impl MovementConfig {
    /// Creates a configuration.
    ///
    /// `speed` is expressed in pixels per second.
    #[must_use]
    pub const fn new(tile_length: f32, speed: f32, arrival_epsilon: f32) -> Self {
        Self {
            tile_length,
            speed,
            arrival_epsilon,
        }
    }

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Distance covered per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Distance under which a waypoint counts as reached.
    #[must_use]
    pub const fn arrival_epsilon(&self) -> f32 {
        self.arrival_epsilon
    }

    /// Pixel-space centre of `cell`.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.tile_length,
            (cell.row() as f32 + 0.5) * self.tile_length,
        )
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::new(32.0, 96.0, 0.5)
    }
}

/// Notable movement outcomes produced while planning or advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementReport {
    /// The agent reached the final waypoint of its path.
    Arrived {
        /// Agent that arrived.
        agent: AgentId,
        /// Cell the agent now stands on.
        cell: CellCoord,
    },
    /// The next waypoint became blocked and a new path was requested.
    Replanned {
        /// Agent whose path went stale.
        agent: AgentId,
        /// Waypoint that is no longer walkable.
        blocked: CellCoord,
    },
    /// No route to the requested goal exists; the agent stays idle.
    Unreachable {
        /// Agent that could not be routed.
        agent: AgentId,
        /// Requested destination.
        goal: CellCoord,
    },
}

/// Read-only snapshot describing a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentView {
    /// Identifier assigned on spawn.
    pub id: AgentId,
    /// Pixel-space position.
    pub position: Vec2,
    /// Last cell the agent reached.
    pub cell: CellCoord,
    /// Destination of the active or pending path, if any.
    pub goal: Option<CellCoord>,
    /// Waypoints still to be visited on the active path.
    pub remaining_waypoints: usize,
    /// Indicates whether a path request waits for the next planning phase.
    pub pending: bool,
}

impl AgentView {
    /// Reports whether the agent has neither a path nor a pending request.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.goal.is_none()
    }
}

#[derive(Clone, Debug)]
struct Route {
    waypoints: Vec<CellCoord>,
    next: usize,
    goal: CellCoord,
}

#[derive(Clone, Debug)]
struct Agent {
    position: Vec2,
    cell: CellCoord,
    route: Option<Route>,
    pending: Option<PathRequest>,
}

impl Agent {
    fn view(&self, id: AgentId) -> AgentView {
        let goal = self
            .route
            .as_ref()
            .map(|route| route.goal)
            .or_else(|| self.pending.map(|request| request.goal()));
        AgentView {
            id,
            position: self.position,
            cell: self.cell,
            goal,
            remaining_waypoints: self
                .route
                .as_ref()
                .map_or(0, |route| route.waypoints.len().saturating_sub(route.next)),
            pending: self.pending.is_some(),
        }
    }
}

/// Owns mobile agents and drives them along their paths.
#[derive(Debug)]
pub struct MovementController {
    config: MovementConfig,
    engine: PathfindingEngine,
    agents: BTreeMap<AgentId, Agent>,
    next_agent: u32,
}

impl MovementController {
    /// Creates a controller without agents.
    #[must_use]
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            engine: PathfindingEngine::new(),
            agents: BTreeMap::new(),
            next_agent: 0,
        }
    }

    /// Configuration used to convert paths into motion.
    #[must_use]
    pub const fn config(&self) -> MovementConfig {
        self.config
    }

    /// Places an idle agent at the centre of `cell`.
    pub fn spawn(&mut self, grid: &TileGrid, cell: CellCoord) -> Result<AgentId, GridError> {
        let _ = grid.is_walkable(cell)?;
        let id = AgentId::new(self.next_agent);
        self.next_agent = self.next_agent.saturating_add(1);
        let _ = self.agents.insert(
            id,
            Agent {
                position: self.config.cell_center(cell),
                cell,
                route: None,
                pending: None,
            },
        );
        debug!("spawned agent {id} at {cell:?}");
        Ok(id)
    }

    /// Removes an agent, reporting whether it existed.
    pub fn despawn(&mut self, agent: AgentId) -> bool {
        self.agents.remove(&agent).is_some()
    }

    /// Sends `agent` toward `goal`.
    ///
    /// Any current path is discarded immediately and a request from the
    /// agent's current cell is queued for the next planning phase. Returns
    /// `Ok(false)` when the agent does not exist.
    pub fn request_path(
        &mut self,
        grid: &TileGrid,
        agent: AgentId,
        goal: CellCoord,
    ) -> Result<bool, GridError> {
        let _ = grid.is_walkable(goal)?;
        let Some(state) = self.agents.get_mut(&agent) else {
            return Ok(false);
        };
        state.route = None;
        state.pending = Some(PathRequest::new(state.cell, goal));
        trace!("agent {agent} queued a path to {goal:?}");
        Ok(true)
    }

    /// Resolves every pending request against one snapshot of `grid`.
    pub fn plan(&mut self, grid: &TileGrid) -> Result<Vec<MovementReport>, GridError> {
        let mut reports = Vec::new();
        if self.agents.values().all(|agent| agent.pending.is_none()) {
            return Ok(reports);
        }

        let snapshot = grid.snapshot();
        for (&id, agent) in &mut self.agents {
            let Some(request) = agent.pending.take() else {
                continue;
            };

            match self.engine.find_path(&snapshot, request)? {
                PathOutcome::Found(path) => {
                    trace!("agent {id} routed in {} steps", path.steps());
                    agent.route = Some(Route {
                        waypoints: path.into_waypoints(),
                        next: 0,
                        goal: request.goal(),
                    });
                }
                PathOutcome::NotFound => {
                    debug!("agent {id} cannot reach {:?}", request.goal());
                    reports.push(MovementReport::Unreachable {
                        agent: id,
                        goal: request.goal(),
                    });
                }
            }
        }
        Ok(reports)
    }

    /// Moves every routed agent for `dt` of simulated time.
    pub fn advance(
        &mut self,
        grid: &TileGrid,
        dt: Duration,
    ) -> Result<Vec<MovementReport>, GridError> {
        let mut reports = Vec::new();
        let budget = self.config.speed * dt.as_secs_f32();
        for (&id, agent) in &mut self.agents {
            if let Some(report) = walk(&self.config, grid, id, agent, budget)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Snapshot of a single agent.
    #[must_use]
    pub fn agent(&self, agent: AgentId) -> Option<AgentView> {
        self.agents.get(&agent).map(|state| state.view(agent))
    }

    /// Snapshots of every agent in identifier order.
    pub fn agents(&self) -> impl Iterator<Item = AgentView> + '_ {
        self.agents.iter().map(|(&id, agent)| agent.view(id))
    }
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

fn walk(
    config: &MovementConfig,
    grid: &TileGrid,
    id: AgentId,
    agent: &mut Agent,
    mut budget: f32,
) -> Result<Option<MovementReport>, GridError> {
    // A zero distance always counts as arrival so the direction below never divides by zero.
    let reach = config.arrival_epsilon.max(0.0);
    loop {
        let Some(route) = agent.route.as_mut() else {
            return Ok(None);
        };
        let Some(&waypoint) = route.waypoints.get(route.next) else {
            agent.route = None;
            debug!("agent {id} arrived at {:?}", agent.cell);
            return Ok(Some(MovementReport::Arrived {
                agent: id,
                cell: agent.cell,
            }));
        };

        if waypoint != agent.cell && !grid.is_walkable(waypoint)? {
            let goal = route.goal;
            agent.route = None;
            agent.pending = Some(PathRequest::new(agent.cell, goal));
            debug!("agent {id} found {waypoint:?} blocked, replanning");
            return Ok(Some(MovementReport::Replanned {
                agent: id,
                blocked: waypoint,
            }));
        }

        let target = config.cell_center(waypoint);
        let offset = target - agent.position;
        let distance = offset.length();
        if distance <= reach {
            agent.position = target;
            agent.cell = waypoint;
            route.next += 1;
            continue;
        }

        if budget <= 0.0 {
            return Ok(None);
        }
        let step = budget.min(distance);
        if step >= distance {
            agent.position = target;
        } else {
            agent.position += offset / distance * step;
        }
        budget -= step;
        if distance - step > reach {
            return Ok(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> MovementController {
        MovementController::new(MovementConfig::new(10.0, 10.0, 0.01))
    }

    #[test]
    fn cell_centres_are_offset_by_half_a_tile() {
        let config = MovementConfig::new(32.0, 1.0, 0.1);
        assert_eq!(config.cell_center(CellCoord::new(0, 0)), Vec2::new(16.0, 16.0));
        assert_eq!(config.cell_center(CellCoord::new(2, 1)), Vec2::new(80.0, 48.0));
    }

    #[test]
    fn spawn_rejects_cells_outside_the_grid() {
        let grid = TileGrid::new(3, 3);
        let mut movement = controller();
        assert!(movement.spawn(&grid, CellCoord::new(3, 0)).is_err());
        assert_eq!(movement.agents().count(), 0);
    }

    #[test]
    fn request_path_replaces_current_route() {
        let grid = TileGrid::new(6, 1);
        let mut movement = controller();
        let agent = movement
            .spawn(&grid, CellCoord::new(0, 0))
            .expect("inside grid");

        assert_eq!(movement.request_path(&grid, agent, CellCoord::new(5, 0)), Ok(true));
        let _ = movement.plan(&grid).expect("planned");
        assert_eq!(movement.request_path(&grid, agent, CellCoord::new(2, 0)), Ok(true));

        let view = movement.agent(agent).expect("agent exists");
        assert!(view.pending);
        assert_eq!(view.goal, Some(CellCoord::new(2, 0)));
        assert_eq!(view.remaining_waypoints, 0);
    }

    #[test]
    fn movement_never_overshoots_the_waypoint() {
        let grid = TileGrid::new(3, 1);
        let mut movement = controller();
        let agent = movement
            .spawn(&grid, CellCoord::new(0, 0))
            .expect("inside grid");
        let _ = movement
            .request_path(&grid, agent, CellCoord::new(1, 0))
            .expect("inside grid");
        let _ = movement.plan(&grid).expect("planned");

        let reports = movement
            .advance(&grid, Duration::from_secs(5))
            .expect("advanced");

        let view = movement.agent(agent).expect("agent exists");
        assert_eq!(view.position, Vec2::new(15.0, 5.0));
        assert_eq!(view.cell, CellCoord::new(1, 0));
        assert_eq!(
            reports,
            vec![MovementReport::Arrived {
                agent,
                cell: CellCoord::new(1, 0)
            }]
        );
        assert!(view.is_idle());
    }

    #[test]
    fn negative_arrival_epsilon_still_arrives() {
        let grid = TileGrid::new(3, 1);
        let mut movement = MovementController::new(MovementConfig::new(32.0, 96.0, -1.0));
        let agent = movement
            .spawn(&grid, CellCoord::new(0, 0))
            .expect("inside grid");
        let _ = movement
            .request_path(&grid, agent, CellCoord::new(2, 0))
            .expect("inside grid");
        let _ = movement.plan(&grid).expect("planned");

        let mut reports = Vec::new();
        for _ in 0..40 {
            reports.extend(
                movement
                    .advance(&grid, Duration::from_millis(50))
                    .expect("advanced"),
            );
        }

        let view = movement.agent(agent).expect("agent exists");
        assert!(view.position.is_finite(), "position {}", view.position);
        assert_eq!(view.position, Vec2::new(80.0, 16.0));
        assert!(view.is_idle());
        assert_eq!(
            reports,
            vec![MovementReport::Arrived {
                agent,
                cell: CellCoord::new(2, 0)
            }]
        );
    }

    #[test]
    fn unknown_agents_are_ignored() {
        let grid = TileGrid::new(2, 2);
        let mut movement = controller();
        assert_eq!(
            movement.request_path(&grid, AgentId::new(7), CellCoord::new(1, 1)),
            Ok(false)
        );
        assert!(!movement.despawn(AgentId::new(7)));
    }
}
