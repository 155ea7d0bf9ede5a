//! Fixed-step simulation loop fed by scenario actions.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use zoo_tycoon_core::{CommandError, Money, ZooStats};
use zoo_tycoon_system_history::{
    Command, CommandManager, HireKeeperCommand, PlaceAnimalCommand, PlaceHabitatCommand,
    PlaceShopCommand,
};
use zoo_tycoon_system_movement::{MovementController, MovementReport};
use zoo_tycoon_world::{query, World};

use crate::{config::ZooConfig, script::Action};

/// Simulated time covered by a single tick.
pub(crate) const TICK: Duration = Duration::from_millis(50);

/// Tally of what happened during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) actions: usize,
    pub(crate) declined: usize,
    pub(crate) ticks: u64,
    pub(crate) arrivals: usize,
    pub(crate) replans: usize,
    pub(crate) unreachable: usize,
}

impl RunSummary {
    fn record(&mut self, report: MovementReport) {
        match report {
            MovementReport::Arrived { agent, cell } => {
                info!("visitor {agent} arrived at ({}, {})", cell.column(), cell.row());
                self.arrivals += 1;
            }
            MovementReport::Replanned { agent, blocked } => {
                info!(
                    "visitor {agent} rerouting around ({}, {})",
                    blocked.column(),
                    blocked.row()
                );
                self.replans += 1;
            }
            MovementReport::Unreachable { agent, goal } => {
                warn!(
                    "visitor {agent} cannot reach ({}, {})",
                    goal.column(),
                    goal.row()
                );
                self.unreachable += 1;
            }
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} actions ({} declined), {} ticks, {} arrivals, {} replans, {} unreachable",
            self.actions, self.declined, self.ticks, self.arrivals, self.replans, self.unreachable
        )
    }
}

/// Owns the world together with the systems that act on it.
#[derive(Debug)]
pub(crate) struct Simulation {
    config: ZooConfig,
    world: World,
    history: CommandManager,
    movement: MovementController,
    summary: RunSummary,
}

impl Simulation {
    /// Wires the systems around `world`.
    pub(crate) fn new(config: ZooConfig, mut world: World) -> Self {
        world
            .treasury_mut()
            .subscribe(|balance: &Money| debug!("balance is now {balance}"));
        world.subscribe_stats(|stats: &ZooStats| {
            debug!(
                "zoo holds {} habitats, {} shops, {} animals, {} keepers",
                stats.habitats, stats.shops, stats.animals, stats.keepers
            );
        });

        let history = match config.history_limit {
            0 => CommandManager::new(),
            limit => CommandManager::with_limit(limit),
        };
        let movement = MovementController::new(config.movement_config());
        Self {
            config,
            world,
            history,
            movement,
            summary: RunSummary::default(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Plays `actions` in order.
    ///
    /// Declined actions are logged and counted. A command that touches a
    /// tile outside the grid aborts the run.
    pub(crate) fn run(&mut self, actions: &[Action]) -> Result<()> {
        for action in actions {
            self.summary.actions += 1;
            if let Action::Tick { count } = action {
                for _ in 0..*count {
                    self.tick()?;
                }
                continue;
            }

            let declined = self
                .apply(action)
                .with_context(|| format!("`{action}` failed"))?;
            if let Some(reason) = declined {
                warn!("declined `{action}`: {reason}");
                self.summary.declined += 1;
            }
        }
        Ok(())
    }

    /// Runs one tick: path planning followed by movement.
    pub(crate) fn tick(&mut self) -> Result<()> {
        let grid = query::tile_grid(&self.world);
        let planned = self.movement.plan(grid)?;
        let moved = self.movement.advance(grid, TICK)?;
        for report in planned.into_iter().chain(moved) {
            self.summary.record(report);
        }
        self.summary.ticks += 1;
        Ok(())
    }

    /// Applies one non-tick action, returning why it was declined, if it was.
    fn apply(&mut self, action: &Action) -> Result<Option<Declined>> {
        match action {
            Action::Habitat { blueprint, origin } => {
                let Some(blueprint) = self.config.habitat_blueprint(blueprint) else {
                    return Ok(Some(Declined::UnknownBlueprint(blueprint.clone())));
                };
                let command = PlaceHabitatCommand::new(blueprint.clone(), *origin);
                self.execute(Box::new(command))
            }
            Action::Shop { blueprint, origin } => {
                let Some(blueprint) = self.config.shop_blueprint(blueprint) else {
                    return Ok(Some(Declined::UnknownBlueprint(blueprint.clone())));
                };
                let command = PlaceShopCommand::new(blueprint.clone(), *origin);
                self.execute(Box::new(command))
            }
            Action::Animal { species, cell } => {
                self.execute(Box::new(PlaceAnimalCommand::new(species.as_str(), *cell)))
            }
            Action::Keeper { name, cell } => {
                let command = HireKeeperCommand::new(
                    name.as_str(),
                    self.config.keeper_upkeep,
                    self.config.keeper_hire_cost,
                    *cell,
                );
                self.execute(Box::new(command))
            }
            Action::Undo => {
                let undone = self.history.undo(&mut self.world);
                match settle(undone)? {
                    Ok(true) => Ok(None),
                    Ok(false) => {
                        info!("nothing to undo");
                        Ok(None)
                    }
                    Err(declined) => Ok(Some(declined)),
                }
            }
            Action::Redo => {
                let redone = self.history.redo(&mut self.world);
                match settle(redone)? {
                    Ok(true) => Ok(None),
                    Ok(false) => {
                        info!("nothing to redo");
                        Ok(None)
                    }
                    Err(declined) => Ok(Some(declined)),
                }
            }
            Action::Clear => {
                self.history.clear();
                Ok(None)
            }
            Action::Visitor { cell } => {
                let agent = self.movement.spawn(query::tile_grid(&self.world), *cell)?;
                info!("visitor {agent} entered at ({}, {})", cell.column(), cell.row());
                Ok(None)
            }
            Action::Walk { agent, goal } => {
                let grid = query::tile_grid(&self.world);
                if self.movement.request_path(grid, *agent, *goal)? {
                    Ok(None)
                } else {
                    Ok(Some(Declined::UnknownAgent(agent.get())))
                }
            }
            Action::Tick { .. } => Ok(None),
        }
    }

    fn execute(&mut self, command: Box<dyn Command>) -> Result<Option<Declined>> {
        let description = command.description();
        let executed = self.history.execute(&mut self.world, command);
        if let Err(declined) = settle(executed)? {
            return Ok(Some(declined));
        }
        info!("{description}; balance {}", query::balance(&self.world));
        Ok(None)
    }
}

/// Splits command failures into gameplay declines and grid errors, which are fatal.
fn settle<T>(result: Result<T, CommandError>) -> Result<Result<T, Declined>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(CommandError::Grid(error)) => Err(error.into()),
        Err(error) => Ok(Err(Declined::Command(error))),
    }
}

#[derive(Debug)]
enum Declined {
    UnknownBlueprint(String),
    UnknownAgent(u32),
    Command(CommandError),
}

impl fmt::Display for Declined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlueprint(name) => write!(f, "no blueprint named `{name}`"),
            Self::UnknownAgent(agent) => write!(f, "no visitor #{agent}"),
            Self::Command(error) => write!(f, "{error}"),
        }
    }
}
