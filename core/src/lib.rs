#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Zoo Tycoon simulation.
//!
//! This crate defines the value types that connect adapters, the
//! authoritative world, and the systems. The world owns a [`TileGrid`] whose
//! walkability is mutated exclusively by reversible commands, while the
//! pathfinding system reads immutable [`GridSnapshot`] copies so that a search
//! never observes a grid mutated mid-computation. Identifiers, currency, save
//! records and the error taxonomy live here so every crate agrees on them.

mod grid;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{GridSnapshot, TileGrid};

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Octile distance between two cells: diagonal steps cost √2 and
    /// orthogonal steps cost 1.
    #[must_use]
    pub fn octile_distance(self, other: CellCoord) -> f64 {
        let dx = f64::from(self.column.abs_diff(other.column));
        let dy = f64::from(self.row.abs_diff(other.row));
        let (short, long) = if dx < dy { (dx, dy) } else { (dy, dx) };
        short * std::f64::consts::SQRT_2 + (long - short)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the provided cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && row >= top
            && column < left + u64::from(self.size.width())
            && row < top + u64::from(self.size.height())
    }

    /// Reports whether two rectangles share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &CellRect) -> bool {
        self.cells().any(|cell| other.contains(cell))
    }

    /// Iterates the cells covered by the rectangle in row-major order.
    ///
    /// Cells whose coordinates would overflow `u32` are skipped, which only
    /// happens for rectangles that could never fit inside a grid anyway.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |dy| {
            (0..size.width()).filter_map(move |dx| {
                let column = origin.column().checked_add(dx)?;
                let row = origin.row().checked_add(dy)?;
                Some(CellCoord::new(column, row))
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to a placed habitat.
    HabitatId
);
identifier!(
    /// Unique identifier assigned to a placed shop.
    ShopId
);
identifier!(
    /// Unique identifier assigned to an animal living in a habitat.
    AnimalId
);
identifier!(
    /// Unique identifier assigned to a hired keeper.
    KeeperId
);
identifier!(
    /// Unique identifier assigned to a mobile agent by the movement controller.
    AgentId
);

/// Whole units of in-game currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// An empty purse.
    pub const ZERO: Money = Money(0);

    /// Wraps a raw currency amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Raw currency amount.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Subtracts `other`, returning `None` when the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Adds `other`, saturating at the numeric upper bound.
    #[must_use]
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Immutable request for a route between two cells.
///
/// Requests are issued once per need and never mutated afterwards; a changed
/// destination produces a brand-new request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathRequest {
    start: CellCoord,
    goal: CellCoord,
}

impl PathRequest {
    /// Creates a request from `start` to `goal`.
    #[must_use]
    pub const fn new(start: CellCoord, goal: CellCoord) -> Self {
        Self { start, goal }
    }

    /// Cell the route begins at.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Cell the route must reach.
    #[must_use]
    pub const fn goal(&self) -> CellCoord {
        self.goal
    }
}

/// Template describing a habitat that may be placed into the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitatBlueprint {
    /// Display name of the habitat type, for example "Savanna".
    pub name: String,
    /// Cells covered by the habitat footprint.
    pub size: CellRectSize,
    /// Maximum number of animals the habitat can hold.
    pub capacity: u32,
    /// Price debited from the treasury on placement.
    pub cost: Money,
}

/// Template describing a shop that may be placed into the world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopBlueprint {
    /// Display name of the shop type.
    pub name: String,
    /// Cells covered by the shop footprint.
    pub size: CellRectSize,
    /// Price debited from the treasury on placement.
    pub cost: Money,
}

/// Next identifiers handed out by the world for each entity kind.
///
/// Counters only ever grow; undoing a placement does not give its identifier
/// back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    /// Next habitat identifier.
    pub next_habitat: u32,
    /// Next shop identifier.
    pub next_shop: u32,
    /// Next animal identifier.
    pub next_animal: u32,
    /// Next keeper identifier.
    pub next_keeper: u32,
}

/// Aggregate counters published to stats displays after every world change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZooStats {
    /// Number of habitats currently placed.
    pub habitats: usize,
    /// Number of shops currently placed.
    pub shops: usize,
    /// Number of animals living in habitats.
    pub animals: usize,
    /// Number of keepers on the payroll.
    pub keepers: usize,
}

/// Persisted habitat record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedHabitat {
    /// Identifier of the habitat.
    pub id: HabitatId,
    /// Blueprint name the habitat was built from.
    pub name: String,
    /// Footprint occupied by the habitat.
    pub region: CellRect,
    /// Maximum number of animals.
    pub capacity: u32,
}

/// Persisted shop record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedShop {
    /// Identifier of the shop.
    pub id: ShopId,
    /// Blueprint name the shop was built from.
    pub name: String,
    /// Footprint occupied by the shop.
    pub region: CellRect,
}

/// Persisted animal record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAnimal {
    /// Identifier of the animal.
    pub id: AnimalId,
    /// Species name.
    pub species: String,
    /// Habitat the animal lives in.
    pub habitat: HabitatId,
}

/// Persisted keeper record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedKeeper {
    /// Identifier of the keeper.
    pub id: KeeperId,
    /// Keeper name.
    pub name: String,
    /// Running cost of the keeper.
    pub upkeep: Money,
    /// Habitat the keeper tends.
    pub habitat: HabitatId,
}

/// Everything the simulation needs to rebuild a world after a restart.
///
/// Static terrain is not stored; it is regenerated from configuration and the
/// structure footprints are stamped on top of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWorld {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Treasury balance.
    pub balance: Money,
    /// Identifier allocation state.
    pub counters: IdCounters,
    /// Placed habitats.
    pub habitats: Vec<SavedHabitat>,
    /// Placed shops.
    pub shops: Vec<SavedShop>,
    /// Animals living in habitats.
    pub animals: Vec<SavedAnimal>,
    /// Hired keepers.
    pub keepers: Vec<SavedKeeper>,
}

/// Storage collaborator that loads and saves the world.
///
/// The storage format is owned by the implementor.
pub trait Persistence {
    /// Loads a previously saved world, or `None` when nothing was saved yet.
    fn load_game(&mut self) -> Result<Option<SavedWorld>, PersistenceError>;

    /// Persists the provided world state.
    fn save_game(&mut self, world: &SavedWorld) -> Result<(), PersistenceError>;
}

/// Tile access outside of the grid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The coordinate lies outside `[0, columns) x [0, rows)`.
    #[error("cell ({}, {}) is outside the {columns}x{rows} grid", .cell.column(), .cell.row())]
    OutOfRange {
        /// Offending coordinate.
        cell: CellCoord,
        /// Grid width.
        columns: u32,
        /// Grid height.
        rows: u32,
    },
}

/// Reasons a command declines to execute.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The treasury cannot cover the cost.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Cost of the action.
        required: Money,
        /// Balance at the time of the attempt.
        available: Money,
    },
    /// No habitat covers the targeted cell.
    #[error("no habitat at ({}, {})", .cell.column(), .cell.row())]
    NoHabitatAtLocation {
        /// Targeted cell.
        cell: CellCoord,
    },
    /// The habitat already holds as many animals as it can.
    #[error("habitat {habitat} is full ({capacity} animals)")]
    HabitatFull {
        /// Habitat that rejected the animal.
        habitat: HabitatId,
        /// Capacity of the habitat.
        capacity: u32,
    },
    /// The referenced habitat no longer exists.
    #[error("habitat {habitat} does not exist")]
    UnknownHabitat {
        /// Missing habitat.
        habitat: HabitatId,
    },
    /// The footprint overlaps an existing structure.
    #[error("cell ({}, {}) is already occupied by a structure", .cell.column(), .cell.row())]
    Occupied {
        /// First overlapping cell.
        cell: CellCoord,
    },
    /// The command touched a tile outside of the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Failures raised by [`Persistence`] implementations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The underlying storage could not be read or written.
    #[error("storage unavailable: {0}")]
    Storage(#[from] std::io::Error),
    /// Stored data could not be interpreted.
    #[error("saved game is corrupt: {0}")]
    Corrupt(String),
}
