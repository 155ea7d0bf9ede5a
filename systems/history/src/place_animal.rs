use log::warn;
use zoo_tycoon_core::{AnimalId, CellCoord, CommandError};
use zoo_tycoon_world::{query, Animal, World};

use crate::Command;

/// Adds an animal to whichever habitat covers `cell`.
///
/// Animals are free; the habitat's capacity is the only limit.
#[derive(Debug)]
pub struct PlaceAnimalCommand {
    species: String,
    cell: CellCoord,
    animal: Option<AnimalId>,
    applied: bool,
}

impl PlaceAnimalCommand {
    /// Creates a command that has not been executed yet.
    #[must_use]
    pub fn new(species: impl Into<String>, cell: CellCoord) -> Self {
        Self {
            species: species.into(),
            cell,
            animal: None,
            applied: false,
        }
    }

    /// Identifier allocated on first execution.
    #[must_use]
    pub const fn animal(&self) -> Option<AnimalId> {
        self.animal
    }
}

impl Command for PlaceAnimalCommand {
    fn execute(&mut self, world: &mut World) -> Result<(), CommandError> {
        let Some(habitat) = query::habitat_at(world, self.cell) else {
            return Err(CommandError::NoHabitatAtLocation { cell: self.cell });
        };
        let habitat_id = habitat.id();
        if habitat.is_full() {
            return Err(CommandError::HabitatFull {
                habitat: habitat_id,
                capacity: habitat.capacity(),
            });
        }

        let id = *self
            .animal
            .get_or_insert_with(|| world.allocate_animal_id());
        world.admit_animal(Animal::new(id, &self.species, habitat_id))?;
        self.applied = true;
        Ok(())
    }

    fn undo(&mut self, world: &mut World) -> Result<(), CommandError> {
        let Some(id) = self.animal.filter(|_| self.applied) else {
            warn!("undo requested for {} before it was placed", self.description());
            return Ok(());
        };
        self.applied = false;

        if world.remove_animal(id).is_none() {
            warn!("animal {id} was already gone on undo");
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "add {} at ({}, {})",
            self.species,
            self.cell.column(),
            self.cell.row()
        )
    }
}
