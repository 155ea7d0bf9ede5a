use log::warn;
use zoo_tycoon_core::{CellCoord, CommandError, KeeperId, Money};
use zoo_tycoon_world::{query, Keeper, World};

use crate::Command;

/// Hires a keeper for the habitat covering `cell`.
#[derive(Debug)]
pub struct HireKeeperCommand {
    name: String,
    upkeep: Money,
    hire_cost: Money,
    cell: CellCoord,
    keeper: Option<KeeperId>,
    applied: bool,
}

impl HireKeeperCommand {
    /// Creates a command that has not been executed yet.
    #[must_use]
    pub fn new(name: impl Into<String>, upkeep: Money, hire_cost: Money, cell: CellCoord) -> Self {
        Self {
            name: name.into(),
            upkeep,
            hire_cost,
            cell,
            keeper: None,
            applied: false,
        }
    }

    /// Identifier allocated on first execution.
    #[must_use]
    pub const fn keeper(&self) -> Option<KeeperId> {
        self.keeper
    }
}

impl Command for HireKeeperCommand {
    fn execute(&mut self, world: &mut World) -> Result<(), CommandError> {
        let Some(habitat) = query::habitat_at(world, self.cell).map(|habitat| habitat.id()) else {
            return Err(CommandError::NoHabitatAtLocation { cell: self.cell });
        };

        let available = query::balance(world);
        if !world.treasury_mut().spend(self.hire_cost) {
            return Err(CommandError::InsufficientFunds {
                required: self.hire_cost,
                available,
            });
        }

        let id = *self
            .keeper
            .get_or_insert_with(|| world.allocate_keeper_id());
        if let Err(error) = world.hire_keeper(Keeper::new(id, &self.name, self.upkeep, habitat)) {
            world.treasury_mut().add(self.hire_cost);
            return Err(error);
        }
        self.applied = true;
        Ok(())
    }

    fn undo(&mut self, world: &mut World) -> Result<(), CommandError> {
        let Some(id) = self.keeper.filter(|_| self.applied) else {
            warn!("undo requested for {} before it was hired", self.description());
            return Ok(());
        };
        self.applied = false;

        if world.dismiss_keeper(id).is_none() {
            warn!("keeper {id} was already gone on undo");
        }
        world.treasury_mut().add(self.hire_cost);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "hire {} at ({}, {})",
            self.name,
            self.cell.column(),
            self.cell.row()
        )
    }
}
