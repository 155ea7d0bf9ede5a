//! Authoritative structure and resident bookkeeping.

use std::collections::BTreeMap;

use zoo_tycoon_core::{
    AnimalId, CellCoord, CellRect, HabitatId, IdCounters, KeeperId, Money, ShopId,
};

/// Habitat placed into the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Habitat {
    id: HabitatId,
    name: String,
    region: CellRect,
    capacity: u32,
    occupants: u32,
}

impl Habitat {
    /// Creates an empty habitat record.
    #[must_use]
    pub fn new(id: HabitatId, name: impl Into<String>, region: CellRect, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            region,
            capacity,
            occupants: 0,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> HabitatId {
        self.id
    }

    /// Blueprint name the habitat was built from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Footprint covered by the habitat.
    #[must_use]
    pub const fn region(&self) -> CellRect {
        self.region
    }

    /// Maximum number of animals.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of animals currently living in the habitat.
    #[must_use]
    pub const fn occupants(&self) -> u32 {
        self.occupants
    }

    /// Reports whether the habitat has reached its capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.occupants >= self.capacity
    }
}

/// Shop placed into the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shop {
    id: ShopId,
    name: String,
    region: CellRect,
}

impl Shop {
    /// Creates a shop record.
    #[must_use]
    pub fn new(id: ShopId, name: impl Into<String>, region: CellRect) -> Self {
        Self {
            id,
            name: name.into(),
            region,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> ShopId {
        self.id
    }

    /// Blueprint name the shop was built from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Footprint covered by the shop.
    #[must_use]
    pub const fn region(&self) -> CellRect {
        self.region
    }
}

/// Animal bound to a habitat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Animal {
    id: AnimalId,
    species: String,
    habitat: HabitatId,
}

impl Animal {
    /// Creates an animal record.
    #[must_use]
    pub fn new(id: AnimalId, species: impl Into<String>, habitat: HabitatId) -> Self {
        Self {
            id,
            species: species.into(),
            habitat,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> AnimalId {
        self.id
    }

    /// Species name.
    #[must_use]
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Habitat the animal lives in.
    #[must_use]
    pub const fn habitat(&self) -> HabitatId {
        self.habitat
    }
}

/// Keeper assigned to a habitat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keeper {
    id: KeeperId,
    name: String,
    upkeep: Money,
    habitat: HabitatId,
}

impl Keeper {
    /// Creates a keeper record.
    #[must_use]
    pub fn new(id: KeeperId, name: impl Into<String>, upkeep: Money, habitat: HabitatId) -> Self {
        Self {
            id,
            name: name.into(),
            upkeep,
            habitat,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> KeeperId {
        self.id
    }

    /// Keeper name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Running cost of the keeper.
    #[must_use]
    pub const fn upkeep(&self) -> Money {
        self.upkeep
    }

    /// Habitat the keeper tends.
    #[must_use]
    pub const fn habitat(&self) -> HabitatId {
        self.habitat
    }
}

/// Dependents removed together with their habitat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evicted {
    /// Animals that lived in the habitat.
    pub animals: Vec<Animal>,
    /// Keepers that tended the habitat.
    pub keepers: Vec<Keeper>,
}

impl Evicted {
    /// Reports whether nothing was evicted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animals.is_empty() && self.keepers.is_empty()
    }
}

/// Registry that stores structures and residents and allocates identifiers.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    pub(crate) habitats: BTreeMap<HabitatId, Habitat>,
    pub(crate) shops: BTreeMap<ShopId, Shop>,
    pub(crate) animals: BTreeMap<AnimalId, Animal>,
    pub(crate) keepers: BTreeMap<KeeperId, Keeper>,
    pub(crate) counters: IdCounters,
}

impl Registry {
    pub(crate) fn with_counters(counters: IdCounters) -> Self {
        Self {
            counters,
            ..Self::default()
        }
    }

    pub(crate) fn next_habitat_id(&mut self) -> HabitatId {
        let id = HabitatId::new(self.counters.next_habitat);
        self.counters.next_habitat = self.counters.next_habitat.saturating_add(1);
        id
    }

    pub(crate) fn next_shop_id(&mut self) -> ShopId {
        let id = ShopId::new(self.counters.next_shop);
        self.counters.next_shop = self.counters.next_shop.saturating_add(1);
        id
    }

    pub(crate) fn next_animal_id(&mut self) -> AnimalId {
        let id = AnimalId::new(self.counters.next_animal);
        self.counters.next_animal = self.counters.next_animal.saturating_add(1);
        id
    }

    pub(crate) fn next_keeper_id(&mut self) -> KeeperId {
        let id = KeeperId::new(self.counters.next_keeper);
        self.counters.next_keeper = self.counters.next_keeper.saturating_add(1);
        id
    }

    /// Reports whether any structure footprint covers `cell`.
    pub(crate) fn structure_covering(&self, cell: CellCoord) -> bool {
        self.habitats
            .values()
            .any(|habitat| habitat.region.contains(cell))
            || self.shops.values().any(|shop| shop.region.contains(cell))
    }

    pub(crate) fn habitat_at(&self, cell: CellCoord) -> Option<&Habitat> {
        self.habitats
            .values()
            .find(|habitat| habitat.region.contains(cell))
    }

    pub(crate) fn admit(&mut self, animal: Animal) -> bool {
        let Some(habitat) = self.habitats.get_mut(&animal.habitat) else {
            return false;
        };
        habitat.occupants = habitat.occupants.saturating_add(1);
        let _ = self.animals.insert(animal.id, animal);
        true
    }

    pub(crate) fn release(&mut self, id: AnimalId) -> Option<Animal> {
        let animal = self.animals.remove(&id)?;
        if let Some(habitat) = self.habitats.get_mut(&animal.habitat) {
            habitat.occupants = habitat.occupants.saturating_sub(1);
        }
        Some(animal)
    }

    pub(crate) fn evict(&mut self, habitat: HabitatId) -> Evicted {
        let animal_ids: Vec<AnimalId> = self
            .animals
            .values()
            .filter(|animal| animal.habitat == habitat)
            .map(|animal| animal.id)
            .collect();
        let keeper_ids: Vec<KeeperId> = self
            .keepers
            .values()
            .filter(|keeper| keeper.habitat == habitat)
            .map(|keeper| keeper.id)
            .collect();

        let animals = animal_ids
            .into_iter()
            .filter_map(|id| self.release(id))
            .collect();
        let keepers = keeper_ids
            .into_iter()
            .filter_map(|id| self.keepers.remove(&id))
            .collect();

        Evicted { animals, keepers }
    }
}
