//! TOML configuration for the command-line runner.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use zoo_tycoon_core::{CellCoord, CellRectSize, HabitatBlueprint, Money, ShopBlueprint};
use zoo_tycoon_system_movement::MovementConfig;
use zoo_tycoon_world::{Config, Terrain};

/// Runner configuration with built-in defaults for every field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ZooConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) tile_length: f32,
    pub(crate) starting_balance: Money,
    /// Maximum number of undoable commands; `0` keeps everything.
    pub(crate) history_limit: usize,
    pub(crate) keeper_hire_cost: Money,
    pub(crate) keeper_upkeep: Money,
    pub(crate) movement: MovementSettings,
    pub(crate) terrain: TerrainSettings,
    pub(crate) habitats: Vec<HabitatBlueprint>,
    pub(crate) shops: Vec<ShopBlueprint>,
}

/// Visitor motion tunables.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MovementSettings {
    pub(crate) speed: f32,
    pub(crate) arrival_epsilon: f32,
}

/// Procedural terrain parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TerrainSettings {
    pub(crate) seed: u64,
    pub(crate) trees: u32,
    pub(crate) border: bool,
}

impl Default for ZooConfig {
    fn default() -> Self {
        Self {
            columns: 24,
            rows: 16,
            tile_length: 32.0,
            starting_balance: Money::new(10_000),
            history_limit: 100,
            keeper_hire_cost: Money::new(250),
            keeper_upkeep: Money::new(25),
            movement: MovementSettings::default(),
            terrain: TerrainSettings::default(),
            habitats: vec![
                habitat("Savanna", 4, 3, 4, 1_500),
                habitat("Arctic", 3, 3, 3, 1_200),
                habitat("Jungle", 4, 4, 6, 2_000),
                habitat("Aviary", 2, 2, 8, 800),
            ],
            shops: vec![shop("Kiosk", 1, 1, 300), shop("Restaurant", 2, 2, 900)],
        }
    }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            speed: 96.0,
            arrival_epsilon: 0.5,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            trees: 12,
            border: true,
        }
    }
}

impl ZooConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            bail!("grid must be at least 1x1, got {}x{}", self.columns, self.rows);
        }
        if !(self.tile_length > 0.0) {
            bail!("tile_length must be positive, got {}", self.tile_length);
        }
        if !(self.movement.speed > 0.0) {
            bail!("movement speed must be positive, got {}", self.movement.speed);
        }
        let epsilon = self.movement.arrival_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            bail!("movement arrival_epsilon must be a non-negative number, got {epsilon}");
        }
        for blueprint in &self.habitats {
            if blueprint.size.width() == 0 || blueprint.size.height() == 0 {
                bail!("habitat blueprint `{}` has an empty footprint", blueprint.name);
            }
        }
        for blueprint in &self.shops {
            if blueprint.size.width() == 0 || blueprint.size.height() == 0 {
                bail!("shop blueprint `{}` has an empty footprint", blueprint.name);
            }
        }
        Ok(())
    }

    /// Looks up a habitat blueprint by case-insensitive name.
    pub(crate) fn habitat_blueprint(&self, name: &str) -> Option<&HabitatBlueprint> {
        self.habitats
            .iter()
            .find(|blueprint| blueprint.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a shop blueprint by case-insensitive name.
    pub(crate) fn shop_blueprint(&self, name: &str) -> Option<&ShopBlueprint> {
        self.shops
            .iter()
            .find(|blueprint| blueprint.name.eq_ignore_ascii_case(name))
    }

    /// Terrain for a `columns` x `rows` grid generated from the configured seed.
    ///
    /// Trees never land on the border, and the same seed always yields the
    /// same trees so a saved game can regenerate its terrain.
    pub(crate) fn terrain(&self, columns: u32, rows: u32) -> Terrain {
        let mut terrain = Terrain::open();
        if self.terrain.border {
            terrain = terrain.with_border();
        }

        let inset = u32::from(self.terrain.border);
        if columns <= inset * 2 || rows <= inset * 2 {
            return terrain;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.terrain.seed);
        let trees: Vec<CellCoord> = (0..self.terrain.trees)
            .map(|_| {
                CellCoord::new(
                    rng.gen_range(inset..columns - inset),
                    rng.gen_range(inset..rows - inset),
                )
            })
            .collect();
        terrain.with_obstacles(trees)
    }

    /// World parameters for a fresh game.
    pub(crate) fn world_config(&self) -> Config {
        Config::new(self.columns, self.rows, self.starting_balance)
            .with_terrain(self.terrain(self.columns, self.rows))
    }

    /// Motion parameters for visitors.
    pub(crate) fn movement_config(&self) -> MovementConfig {
        MovementConfig::new(
            self.tile_length,
            self.movement.speed,
            self.movement.arrival_epsilon,
        )
    }
}

fn habitat(name: &str, width: u32, height: u32, capacity: u32, cost: u64) -> HabitatBlueprint {
    HabitatBlueprint {
        name: name.to_owned(),
        size: CellRectSize::new(width, height),
        capacity,
        cost: Money::new(cost),
    }
}

fn shop(name: &str, width: u32, height: u32, cost: u64) -> ShopBlueprint {
    ShopBlueprint {
        name: name.to_owned(),
        size: CellRectSize::new(width, height),
        cost: Money::new(cost),
    }
}
