#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reversible world edits and the history that replays them.
//!
//! Every player edit is a [`Command`]: an object that knows how to apply
//! itself to the [`World`] and how to take itself back. The
//! [`CommandManager`] owns executed commands on an undo stack and undone
//! commands on a redo stack; executing anything new invalidates the redo
//! stack.

mod footprint;
mod hire_keeper;
mod place_animal;
mod place_habitat;
mod place_shop;

use std::{collections::VecDeque, fmt};

use log::debug;
use zoo_tycoon_core::CommandError;
use zoo_tycoon_world::World;

pub use hire_keeper::HireKeeperCommand;
pub use place_animal::PlaceAnimalCommand;
pub use place_habitat::PlaceHabitatCommand;
pub use place_shop::PlaceShopCommand;

/// Reversible world edit.
///
/// Implementations check every precondition before mutating anything, so a
/// declined `execute` leaves the world untouched. `execute` is called again on
/// redo and must reuse any identifier it allocated the first time.
pub trait Command: fmt::Debug {
    /// Applies the edit.
    fn execute(&mut self, world: &mut World) -> Result<(), CommandError>;

    /// Reverts a previously applied edit.
    fn undo(&mut self, world: &mut World) -> Result<(), CommandError>;

    /// Human readable summary shown next to undo and redo controls.
    fn description(&self) -> String;
}

/// Undo and redo stacks of executed commands.
#[derive(Debug, Default)]
pub struct CommandManager {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    limit: Option<usize>,
}

impl CommandManager {
    /// Creates a manager with unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that keeps at most `limit` undoable commands.
    ///
    /// Older entries are discarded permanently once the limit is exceeded.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Executes `command` and records it for undo.
    ///
    /// A declined command is dropped and both stacks stay as they were.
    pub fn execute(
        &mut self,
        world: &mut World,
        mut command: Box<dyn Command>,
    ) -> Result<(), CommandError> {
        if let Err(error) = command.execute(world) {
            debug!("declined {}: {error}", command.description());
            return Err(error);
        }

        debug!("executed {}", command.description());
        if !self.redo_stack.is_empty() {
            debug!("discarding {} redoable commands", self.redo_stack.len());
            self.redo_stack.clear();
        }
        self.push_undo(command);
        Ok(())
    }

    /// Reverts the most recent command.
    ///
    /// Returns `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, world: &mut World) -> Result<bool, CommandError> {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return Ok(false);
        };

        command.undo(world)?;
        debug!("undid {}", command.description());
        self.redo_stack.push(command);
        Ok(true)
    }

    /// Re-applies the most recently undone command.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. When the world has
    /// drifted so that the command no longer applies, the command is dropped
    /// and the reason returned.
    pub fn redo(&mut self, world: &mut World) -> Result<bool, CommandError> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(error) = command.execute(world) {
            debug!("dropped {} on redo: {error}", command.description());
            return Err(error);
        }
        debug!("redid {}", command.description());
        self.push_undo(command);
        Ok(true)
    }

    /// Forgets every recorded command without reverting anything.
    pub fn clear(&mut self) {
        debug!(
            "clearing history ({} undo, {} redo)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Description of the command the next undo would revert.
    #[must_use]
    pub fn describe_undo(&self) -> Option<String> {
        self.undo_stack.back().map(|command| command.description())
    }

    /// Description of the command the next redo would re-apply.
    #[must_use]
    pub fn describe_redo(&self) -> Option<String> {
        self.redo_stack.last().map(|command| command.description())
    }

    /// Number of undoable commands.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redoable commands.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    fn push_undo(&mut self, command: Box<dyn Command>) {
        self.undo_stack.push_back(command);
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                if let Some(oldest) = self.undo_stack.pop_front() {
                    debug!("history limit reached, forgetting {}", oldest.description());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use zoo_tycoon_core::{CellCoord, Money};
    use zoo_tycoon_world::Config;

    #[derive(Debug)]
    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        decline: bool,
    }

    impl Command for Recorder {
        fn execute(&mut self, _world: &mut World) -> Result<(), CommandError> {
            if self.decline {
                return Err(CommandError::NoHabitatAtLocation {
                    cell: CellCoord::new(0, 0),
                });
            }
            self.log.borrow_mut().push(format!("do {}", self.label));
            Ok(())
        }

        fn undo(&mut self, _world: &mut World) -> Result<(), CommandError> {
            self.log.borrow_mut().push(format!("undo {}", self.label));
            Ok(())
        }

        fn description(&self) -> String {
            self.label.to_owned()
        }
    }

    fn recorder(label: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Command> {
        Box::new(Recorder {
            label,
            log: Rc::clone(log),
            decline: false,
        })
    }

    fn world() -> World {
        World::new(&Config::new(4, 4, Money::ZERO)).expect("open terrain")
    }

    #[test]
    fn undo_and_redo_walk_the_stacks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = world();
        let mut manager = CommandManager::new();

        manager.execute(&mut world, recorder("a", &log)).expect("accepted");
        manager.execute(&mut world, recorder("b", &log)).expect("accepted");
        assert_eq!(manager.describe_undo().as_deref(), Some("b"));

        assert_eq!(manager.undo(&mut world), Ok(true));
        assert_eq!(manager.describe_redo().as_deref(), Some("b"));
        assert_eq!(manager.redo(&mut world), Ok(true));

        assert_eq!(*log.borrow(), ["do a", "do b", "undo b", "do b"]);
        assert_eq!((manager.undo_depth(), manager.redo_depth()), (2, 0));
    }

    #[test]
    fn declined_commands_leave_history_untouched() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = world();
        let mut manager = CommandManager::new();
        manager.execute(&mut world, recorder("a", &log)).expect("accepted");
        assert_eq!(manager.undo(&mut world), Ok(true));

        let declined = Box::new(Recorder {
            label: "nope",
            log: Rc::clone(&log),
            decline: true,
        });
        assert!(manager.execute(&mut world, declined).is_err());

        assert_eq!((manager.undo_depth(), manager.redo_depth()), (0, 1));
    }

    #[test]
    fn empty_stacks_are_benign() {
        let mut world = world();
        let mut manager = CommandManager::new();
        assert_eq!(manager.undo(&mut world), Ok(false));
        assert_eq!(manager.redo(&mut world), Ok(false));
        assert_eq!(manager.describe_undo(), None);
    }

    #[test]
    fn limit_discards_oldest_entries() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = world();
        let mut manager = CommandManager::with_limit(2);
        for label in ["a", "b", "c"] {
            manager.execute(&mut world, recorder(label, &log)).expect("accepted");
        }

        assert_eq!(manager.undo_depth(), 2);
        assert_eq!(manager.undo(&mut world), Ok(true));
        assert_eq!(manager.undo(&mut world), Ok(true));
        assert_eq!(manager.undo(&mut world), Ok(false));
        assert!(!log.borrow().contains(&"undo a".to_owned()));
    }
}
