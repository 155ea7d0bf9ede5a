#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Zoo Tycoon.
//!
//! The [`World`] is an explicitly constructed context object. It owns the tile
//! grid, the treasury and the registries of structures and residents, and is
//! handed by `&mut` to whichever component needs to mutate it. Reversible
//! commands use the primitive operations exposed here; read-only access goes
//! through the [`query`] module.

mod publisher;
mod registry;
mod treasury;

use log::{debug, warn};
use zoo_tycoon_core::{
    AnimalId, CellCoord, CellRect, CommandError, GridError, HabitatId, KeeperId,
    Money, PersistenceError, SavedAnimal, SavedHabitat, SavedKeeper, SavedShop, SavedWorld,
    ShopId, TileGrid, ZooStats,
};

pub use publisher::{Publisher, Subscriber};
pub use registry::{Animal, Evicted, Habitat, Keeper, Shop};
pub use treasury::Treasury;

use registry::Registry;

/// Static terrain stamped onto a fresh grid before any structure is placed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Terrain {
    border: bool,
    obstacles: Vec<CellCoord>,
}

impl Terrain {
    /// Terrain without any obstruction.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Blocks every tile on the outer edge of the grid.
    #[must_use]
    pub fn with_border(mut self) -> Self {
        self.border = true;
        self
    }

    /// Blocks the provided tiles, for example trees or rocks.
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = CellCoord>) -> Self {
        self.obstacles.extend(obstacles);
        self
    }

    fn stamp(&self, grid: &mut TileGrid) -> Result<(), GridError> {
        if self.border {
            let columns = grid.columns();
            let rows = grid.rows();
            for row in 0..rows {
                for column in 0..columns {
                    let edge = row == 0 || column == 0 || row + 1 == rows || column + 1 == columns;
                    if edge {
                        let _ = grid.set_walkable(CellCoord::new(column, row), false)?;
                    }
                }
            }
        }

        for obstacle in &self.obstacles {
            let _ = grid.set_walkable(*obstacle, false)?;
        }
        Ok(())
    }
}

/// Parameters required to create a fresh world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    columns: u32,
    rows: u32,
    starting_balance: Money,
    terrain: Terrain,
}

impl Config {
    /// Creates a configuration for an open grid with the provided balance.
    #[must_use]
    pub fn new(columns: u32, rows: u32, starting_balance: Money) -> Self {
        Self {
            columns,
            rows,
            starting_balance,
            terrain: Terrain::open(),
        }
    }

    /// Replaces the terrain stamped onto the fresh grid.
    #[must_use]
    pub fn with_terrain(mut self, terrain: Terrain) -> Self {
        self.terrain = terrain;
        self
    }
}

/// Record of the walkability a footprint had before it was claimed.
///
/// Releasing the claim restores each tile to exactly the value recorded here,
/// so terrain that was already blocked stays blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootprintClaim {
    prior: Vec<(CellCoord, bool)>,
}

/// Represents the authoritative Zoo Tycoon world state.
#[derive(Debug)]
pub struct World {
    tile_grid: TileGrid,
    treasury: Treasury,
    registry: Registry,
    stats: Publisher<ZooStats>,
}

impl World {
    /// Creates a fresh world from configuration.
    pub fn new(config: &Config) -> Result<Self, GridError> {
        let mut tile_grid = TileGrid::new(config.columns, config.rows);
        config.terrain.stamp(&mut tile_grid)?;
        debug!(
            "created {}x{} world with {} blocked tiles and {}",
            config.columns,
            config.rows,
            tile_grid.blocked_count(),
            config.starting_balance
        );
        Ok(Self {
            tile_grid,
            treasury: Treasury::new(config.starting_balance),
            registry: Registry::default(),
            stats: Publisher::new(),
        })
    }

    /// Rebuilds a world from a saved game.
    ///
    /// Terrain is regenerated, then every saved footprint is stamped as
    /// non-walkable and the identifier counters are restored.
    pub fn from_saved(terrain: &Terrain, saved: &SavedWorld) -> Result<Self, PersistenceError> {
        let mut tile_grid = TileGrid::new(saved.columns, saved.rows);
        terrain
            .stamp(&mut tile_grid)
            .map_err(|error| PersistenceError::Corrupt(error.to_string()))?;

        let mut registry = Registry::with_counters(saved.counters);
        let regions = saved
            .habitats
            .iter()
            .map(|habitat| habitat.region)
            .chain(saved.shops.iter().map(|shop| shop.region));
        for region in regions {
            for cell in region.cells() {
                let _ = tile_grid
                    .set_walkable(cell, false)
                    .map_err(|error| PersistenceError::Corrupt(error.to_string()))?;
            }
        }

        for habitat in &saved.habitats {
            let record = Habitat::new(habitat.id, &habitat.name, habitat.region, habitat.capacity);
            let _ = registry.habitats.insert(habitat.id, record);
        }
        for shop in &saved.shops {
            let record = Shop::new(shop.id, &shop.name, shop.region);
            let _ = registry.shops.insert(shop.id, record);
        }
        for animal in &saved.animals {
            if !registry.admit(Animal::new(animal.id, &animal.species, animal.habitat)) {
                return Err(PersistenceError::Corrupt(format!(
                    "animal {} references missing habitat {}",
                    animal.id, animal.habitat
                )));
            }
        }
        for keeper in &saved.keepers {
            if !registry.habitats.contains_key(&keeper.habitat) {
                return Err(PersistenceError::Corrupt(format!(
                    "keeper {} references missing habitat {}",
                    keeper.id, keeper.habitat
                )));
            }
            let record = Keeper::new(keeper.id, &keeper.name, keeper.upkeep, keeper.habitat);
            let _ = registry.keepers.insert(keeper.id, record);
        }

        debug!(
            "restored {}x{} world with {} habitats and {} animals",
            saved.columns,
            saved.rows,
            registry.habitats.len(),
            registry.animals.len()
        );
        Ok(Self {
            tile_grid,
            treasury: Treasury::new(saved.balance),
            registry,
            stats: Publisher::new(),
        })
    }

    /// Captures the persistent parts of the world.
    #[must_use]
    pub fn to_saved(&self) -> SavedWorld {
        SavedWorld {
            columns: self.tile_grid.columns(),
            rows: self.tile_grid.rows(),
            balance: self.treasury.balance(),
            counters: self.registry.counters,
            habitats: self
                .registry
                .habitats
                .values()
                .map(|habitat| SavedHabitat {
                    id: habitat.id(),
                    name: habitat.name().to_owned(),
                    region: habitat.region(),
                    capacity: habitat.capacity(),
                })
                .collect(),
            shops: self
                .registry
                .shops
                .values()
                .map(|shop| SavedShop {
                    id: shop.id(),
                    name: shop.name().to_owned(),
                    region: shop.region(),
                })
                .collect(),
            animals: self
                .registry
                .animals
                .values()
                .map(|animal| SavedAnimal {
                    id: animal.id(),
                    species: animal.species().to_owned(),
                    habitat: animal.habitat(),
                })
                .collect(),
            keepers: self
                .registry
                .keepers
                .values()
                .map(|keeper| SavedKeeper {
                    id: keeper.id(),
                    name: keeper.name().to_owned(),
                    upkeep: keeper.upkeep(),
                    habitat: keeper.habitat(),
                })
                .collect(),
        }
    }

    /// Mutable access to the currency store.
    pub fn treasury_mut(&mut self) -> &mut Treasury {
        &mut self.treasury
    }

    /// Registers a subscriber notified with fresh [`ZooStats`] after every
    /// structure or resident change.
    pub fn subscribe_stats<S>(&mut self, subscriber: S)
    where
        S: Subscriber<ZooStats> + 'static,
    {
        self.stats.subscribe(subscriber);
    }

    /// Updates the walkability of a single tile, returning its previous value.
    fn set_walkable(&mut self, cell: CellCoord, walkable: bool) -> Result<bool, GridError> {
        self.tile_grid.set_walkable(cell, walkable)
    }

    /// Verifies that `region` could be claimed without mutating anything.
    pub fn check_footprint(&self, region: &CellRect) -> Result<(), CommandError> {
        if !self.tile_grid.contains_rect(region) {
            let outside = region
                .cells()
                .find(|cell| !self.tile_grid.contains(*cell))
                .unwrap_or_else(|| region.origin());
            return Err(CommandError::Grid(GridError::OutOfRange {
                cell: outside,
                columns: self.tile_grid.columns(),
                rows: self.tile_grid.rows(),
            }));
        }

        if let Some(cell) = region
            .cells()
            .find(|cell| self.registry.structure_covering(*cell))
        {
            return Err(CommandError::Occupied { cell });
        }
        Ok(())
    }

    /// Marks every tile of `region` non-walkable and records prior values.
    pub fn claim_footprint(&mut self, region: CellRect) -> Result<FootprintClaim, CommandError> {
        self.check_footprint(&region)?;

        let mut prior = Vec::new();
        for cell in region.cells() {
            let previous = self.set_walkable(cell, false)?;
            prior.push((cell, previous));
        }
        Ok(FootprintClaim { prior })
    }

    /// Restores every tile of a claim to its recorded walkability.
    pub fn release_footprint(&mut self, claim: &FootprintClaim) -> Result<(), GridError> {
        for (cell, walkable) in &claim.prior {
            let _ = self.set_walkable(*cell, *walkable)?;
        }
        Ok(())
    }

    /// Allocates the next habitat identifier.
    pub fn allocate_habitat_id(&mut self) -> HabitatId {
        self.registry.next_habitat_id()
    }

    /// Allocates the next shop identifier.
    pub fn allocate_shop_id(&mut self) -> ShopId {
        self.registry.next_shop_id()
    }

    /// Allocates the next animal identifier.
    pub fn allocate_animal_id(&mut self) -> AnimalId {
        self.registry.next_animal_id()
    }

    /// Allocates the next keeper identifier.
    pub fn allocate_keeper_id(&mut self) -> KeeperId {
        self.registry.next_keeper_id()
    }

    /// Registers a habitat whose footprint has already been claimed.
    pub fn insert_habitat(&mut self, habitat: Habitat) {
        debug!("habitat {} registered at {:?}", habitat.id(), habitat.region());
        let _ = self.registry.habitats.insert(habitat.id(), habitat);
        self.publish_stats();
    }

    /// Removes a habitat along with every animal and keeper assigned to it.
    pub fn remove_habitat(&mut self, id: HabitatId) -> Option<(Habitat, Evicted)> {
        let evicted = self.registry.evict(id);
        let Some(habitat) = self.registry.habitats.remove(&id) else {
            warn!("attempted to remove unknown habitat {id}");
            self.reinstate(evicted);
            return None;
        };
        debug!(
            "habitat {id} removed, evicting {} animals and {} keepers",
            evicted.animals.len(),
            evicted.keepers.len()
        );
        self.publish_stats();
        Some((habitat, evicted))
    }

    /// Puts previously evicted dependents back into their habitats.
    pub fn reinstate(&mut self, evicted: Evicted) {
        if evicted.is_empty() {
            return;
        }
        for animal in evicted.animals {
            let id = animal.id();
            if !self.registry.admit(animal) {
                warn!("could not reinstate animal {id}, its habitat is gone");
            }
        }
        for keeper in evicted.keepers {
            if self.registry.habitats.contains_key(&keeper.habitat()) {
                let _ = self.registry.keepers.insert(keeper.id(), keeper);
            } else {
                warn!("could not reinstate keeper {}, its habitat is gone", keeper.id());
            }
        }
        self.publish_stats();
    }

    /// Registers a shop whose footprint has already been claimed.
    pub fn insert_shop(&mut self, shop: Shop) {
        debug!("shop {} registered at {:?}", shop.id(), shop.region());
        let _ = self.registry.shops.insert(shop.id(), shop);
        self.publish_stats();
    }

    /// Removes a shop from the registry.
    pub fn remove_shop(&mut self, id: ShopId) -> Option<Shop> {
        let shop = self.registry.shops.remove(&id)?;
        self.publish_stats();
        Some(shop)
    }

    /// Binds an animal to its habitat and bumps the occupant count.
    pub fn admit_animal(&mut self, animal: Animal) -> Result<(), CommandError> {
        let habitat = animal.habitat();
        let Some(record) = self.registry.habitats.get(&habitat) else {
            return Err(CommandError::UnknownHabitat { habitat });
        };
        if record.is_full() {
            return Err(CommandError::HabitatFull {
                habitat,
                capacity: record.capacity(),
            });
        }
        let _ = self.registry.admit(animal);
        self.publish_stats();
        Ok(())
    }

    /// Removes an animal and decrements its habitat's occupant count.
    pub fn remove_animal(&mut self, id: AnimalId) -> Option<Animal> {
        let animal = self.registry.release(id)?;
        self.publish_stats();
        Some(animal)
    }

    /// Assigns a keeper to an existing habitat.
    pub fn hire_keeper(&mut self, keeper: Keeper) -> Result<(), CommandError> {
        let habitat = keeper.habitat();
        if !self.registry.habitats.contains_key(&habitat) {
            return Err(CommandError::UnknownHabitat { habitat });
        }
        let _ = self.registry.keepers.insert(keeper.id(), keeper);
        self.publish_stats();
        Ok(())
    }

    /// Removes a keeper from the payroll.
    pub fn dismiss_keeper(&mut self, id: KeeperId) -> Option<Keeper> {
        let keeper = self.registry.keepers.remove(&id)?;
        self.publish_stats();
        Some(keeper)
    }

    fn stats(&self) -> ZooStats {
        ZooStats {
            habitats: self.registry.habitats.len(),
            shops: self.registry.shops.len(),
            animals: self.registry.animals.len(),
            keepers: self.registry.keepers.len(),
        }
    }

    fn publish_stats(&mut self) {
        let stats = self.stats();
        self.stats.publish(&stats);
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Animal, Habitat, Keeper, Shop, World};
    use zoo_tycoon_core::{CellCoord, HabitatId, IdCounters, Money, TileGrid, ZooStats};

    /// Provides read-only access to the authoritative tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Current treasury balance.
    #[must_use]
    pub fn balance(world: &World) -> Money {
        world.treasury.balance()
    }

    /// Aggregate structure and resident counts.
    #[must_use]
    pub fn stats(world: &World) -> ZooStats {
        world.stats()
    }

    /// Identifier allocation state.
    #[must_use]
    pub fn counters(world: &World) -> IdCounters {
        world.registry.counters
    }

    /// Habitat whose footprint covers `cell`, if any.
    #[must_use]
    pub fn habitat_at(world: &World, cell: CellCoord) -> Option<&Habitat> {
        world.registry.habitat_at(cell)
    }

    /// Habitat registered under `id`, if any.
    #[must_use]
    pub fn habitat(world: &World, id: HabitatId) -> Option<&Habitat> {
        world.registry.habitats.get(&id)
    }

    /// Iterator over the placed habitats in identifier order.
    pub fn habitats(world: &World) -> impl Iterator<Item = &Habitat> {
        world.registry.habitats.values()
    }

    /// Iterator over the placed shops in identifier order.
    pub fn shops(world: &World) -> impl Iterator<Item = &Shop> {
        world.registry.shops.values()
    }

    /// Animals living in `habitat`, in identifier order.
    pub fn animals_in(world: &World, habitat: HabitatId) -> impl Iterator<Item = &Animal> {
        world
            .registry
            .animals
            .values()
            .filter(move |animal| animal.habitat() == habitat)
    }

    /// Keepers tending `habitat`, in identifier order.
    pub fn keepers_of(world: &World, habitat: HabitatId) -> impl Iterator<Item = &Keeper> {
        world
            .registry
            .keepers
            .values()
            .filter(move |keeper| keeper.habitat() == habitat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use zoo_tycoon_core::CellRectSize;

    fn small_world() -> World {
        World::new(&Config::new(8, 6, Money::new(500))).expect("valid terrain")
    }

    fn region(column: u32, row: u32, width: u32, height: u32) -> CellRect {
        CellRect::from_origin_and_size(CellCoord::new(column, row), CellRectSize::new(width, height))
    }

    #[test]
    fn border_terrain_blocks_the_edge() {
        let config = Config::new(4, 3, Money::ZERO).with_terrain(Terrain::open().with_border());
        let world = World::new(&config).expect("valid terrain");
        let grid = query::tile_grid(&world);

        assert_eq!(grid.is_walkable(CellCoord::new(0, 0)), Ok(false));
        assert_eq!(grid.is_walkable(CellCoord::new(3, 1)), Ok(false));
        assert_eq!(grid.is_walkable(CellCoord::new(1, 1)), Ok(true));
        assert_eq!(grid.blocked_count(), 10);
    }

    #[test]
    fn obstacles_outside_the_grid_are_rejected() {
        let config = Config::new(4, 3, Money::ZERO)
            .with_terrain(Terrain::open().with_obstacles([CellCoord::new(9, 9)]));
        assert!(matches!(
            World::new(&config),
            Err(GridError::OutOfRange { .. })
        ));
    }

    #[test]
    fn claim_and_release_restore_exact_walkability() {
        let config = Config::new(6, 6, Money::ZERO)
            .with_terrain(Terrain::open().with_obstacles([CellCoord::new(2, 2)]));
        let mut world = World::new(&config).expect("valid terrain");

        let claim = world
            .claim_footprint(region(1, 1, 2, 2))
            .expect("footprint fits");
        assert_eq!(query::tile_grid(&world).blocked_count(), 4);

        world.release_footprint(&claim).expect("cells in range");

        let grid = query::tile_grid(&world);
        assert_eq!(grid.is_walkable(CellCoord::new(2, 2)), Ok(false));
        assert_eq!(grid.is_walkable(CellCoord::new(1, 1)), Ok(true));
        assert_eq!(grid.blocked_count(), 1);
    }

    #[test]
    fn check_footprint_rejects_out_of_bounds_and_overlap() {
        let mut world = small_world();
        assert!(matches!(
            world.check_footprint(&region(7, 0, 2, 2)),
            Err(CommandError::Grid(GridError::OutOfRange { .. }))
        ));

        let id = world.allocate_habitat_id();
        let _ = world
            .claim_footprint(region(0, 0, 2, 2))
            .expect("footprint fits");
        world.insert_habitat(Habitat::new(id, "Savanna", region(0, 0, 2, 2), 2));

        assert_eq!(
            world.check_footprint(&region(1, 1, 2, 2)),
            Err(CommandError::Occupied {
                cell: CellCoord::new(1, 1)
            })
        );
    }

    #[test]
    fn stats_subscribers_follow_registry_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = small_world();
        let sink = Rc::clone(&seen);
        world.subscribe_stats(move |stats: &ZooStats| sink.borrow_mut().push(*stats));

        let habitat = world.allocate_habitat_id();
        world.insert_habitat(Habitat::new(habitat, "Arctic", region(2, 2, 2, 2), 1));
        let animal = world.allocate_animal_id();
        world
            .admit_animal(Animal::new(animal, "Penguin", habitat))
            .expect("room for one");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].habitats, 1);
        assert_eq!(seen[1].animals, 1);
    }

    #[test]
    fn admit_rejects_full_habitat() {
        let mut world = small_world();
        let habitat = world.allocate_habitat_id();
        world.insert_habitat(Habitat::new(habitat, "Arctic", region(2, 2, 2, 2), 1));
        let first = world.allocate_animal_id();
        world
            .admit_animal(Animal::new(first, "Penguin", habitat))
            .expect("room for one");

        let second = world.allocate_animal_id();
        assert_eq!(
            world.admit_animal(Animal::new(second, "Penguin", habitat)),
            Err(CommandError::HabitatFull {
                habitat,
                capacity: 1
            })
        );
        assert_eq!(query::habitat(&world, habitat).map(Habitat::occupants), Some(1));
    }

    #[test]
    fn removing_habitat_evicts_and_reinstate_restores() {
        let mut world = small_world();
        let habitat = world.allocate_habitat_id();
        world.insert_habitat(Habitat::new(habitat, "Jungle", region(3, 3, 2, 2), 3));
        let animal = world.allocate_animal_id();
        world
            .admit_animal(Animal::new(animal, "Gorilla", habitat))
            .expect("room");
        let keeper = world.allocate_keeper_id();
        world
            .hire_keeper(Keeper::new(keeper, "Ada", Money::new(10), habitat))
            .expect("habitat exists");

        let (removed, evicted) = world.remove_habitat(habitat).expect("habitat exists");
        assert_eq!(query::stats(&world), ZooStats::default());

        world.insert_habitat(removed);
        world.reinstate(evicted);

        assert_eq!(query::animals_in(&world, habitat).count(), 1);
        assert_eq!(query::keepers_of(&world, habitat).count(), 1);
        assert_eq!(query::habitat(&world, habitat).map(Habitat::occupants), Some(1));
    }

    #[test]
    fn saved_world_restores_footprints_and_counters() {
        let config = Config::new(8, 6, Money::new(300));
        let mut world = World::new(&config).expect("valid terrain");
        let habitat = world.allocate_habitat_id();
        let _ = world
            .claim_footprint(region(1, 1, 3, 2))
            .expect("footprint fits");
        world.insert_habitat(Habitat::new(habitat, "Savanna", region(1, 1, 3, 2), 4));
        let animal = world.allocate_animal_id();
        world
            .admit_animal(Animal::new(animal, "Lion", habitat))
            .expect("room");

        let saved = world.to_saved();
        let restored = World::from_saved(&Terrain::open(), &saved).expect("consistent save");

        assert_eq!(query::tile_grid(&restored), query::tile_grid(&world));
        assert_eq!(query::counters(&restored), query::counters(&world));
        assert_eq!(query::balance(&restored), Money::new(300));
        assert_eq!(query::habitat(&restored, habitat).map(Habitat::occupants), Some(1));
        assert_eq!(restored.to_saved(), saved);
    }

    #[test]
    fn corrupt_save_is_reported() {
        let mut saved = small_world().to_saved();
        saved.animals.push(SavedAnimal {
            id: AnimalId::new(0),
            species: "Lion".to_owned(),
            habitat: HabitatId::new(42),
        });
        assert!(matches!(
            World::from_saved(&Terrain::open(), &saved),
            Err(PersistenceError::Corrupt(_))
        ));
    }
}
