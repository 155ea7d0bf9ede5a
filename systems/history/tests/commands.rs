use zoo_tycoon_core::{
    CellCoord, CellRectSize, CommandError, GridError, HabitatBlueprint, HabitatId, Money,
    ShopBlueprint, ZooStats,
};
use zoo_tycoon_system_history::{
    CommandManager, HireKeeperCommand, PlaceAnimalCommand, PlaceHabitatCommand, PlaceShopCommand,
};
use zoo_tycoon_world::{query, Config, Habitat, Terrain, World};

fn savanna(cost: u64) -> HabitatBlueprint {
    HabitatBlueprint {
        name: "Savanna".to_owned(),
        size: CellRectSize::new(2, 2),
        capacity: 2,
        cost: Money::new(cost),
    }
}

fn kiosk() -> ShopBlueprint {
    ShopBlueprint {
        name: "Kiosk".to_owned(),
        size: CellRectSize::new(1, 1),
        cost: Money::new(30),
    }
}

fn world_with(balance: u64) -> World {
    World::new(&Config::new(10, 10, Money::new(balance))).expect("open terrain")
}

fn place_habitat(manager: &mut CommandManager, world: &mut World, column: u32, row: u32) {
    manager
        .execute(
            world,
            Box::new(PlaceHabitatCommand::new(
                savanna(100),
                CellCoord::new(column, row),
            )),
        )
        .expect("placement accepted");
}

#[test]
fn execute_then_undo_restores_grid_and_balance() {
    let mut world = world_with(500);
    let mut manager = CommandManager::new();
    let before = query::tile_grid(&world).clone();

    place_habitat(&mut manager, &mut world, 2, 2);
    assert_eq!(query::balance(&world), Money::new(400));
    assert_eq!(query::tile_grid(&world).blocked_count(), 4);

    assert_eq!(manager.undo(&mut world), Ok(true));

    assert_eq!(query::tile_grid(&world), &before, "grid restored");
    assert_eq!(query::balance(&world), Money::new(500), "cost refunded");
    assert_eq!(query::stats(&world), ZooStats::default());
}

#[test]
fn executing_after_undo_invalidates_redo() {
    let mut world = world_with(1_000);
    let mut manager = CommandManager::new();

    place_habitat(&mut manager, &mut world, 0, 0);
    place_habitat(&mut manager, &mut world, 4, 0);
    assert_eq!(manager.undo(&mut world), Ok(true));
    place_habitat(&mut manager, &mut world, 0, 4);

    let snapshot = world.to_saved();
    assert_eq!(manager.redo(&mut world), Ok(false));
    assert_eq!(world.to_saved(), snapshot, "redo must be a no-op");
    assert!(query::habitat_at(&world, CellCoord::new(4, 0)).is_none());
}

#[test]
fn undo_restores_pre_blocked_terrain_exactly() {
    let config = Config::new(6, 6, Money::new(200))
        .with_terrain(Terrain::open().with_obstacles([CellCoord::new(3, 3)]));
    let mut world = World::new(&config).expect("valid terrain");
    let mut manager = CommandManager::new();

    place_habitat(&mut manager, &mut world, 2, 2);
    assert_eq!(manager.undo(&mut world), Ok(true));

    let grid = query::tile_grid(&world);
    assert_eq!(grid.is_walkable(CellCoord::new(3, 3)), Ok(false), "tree stays");
    assert_eq!(grid.is_walkable(CellCoord::new(2, 2)), Ok(true));
    assert_eq!(grid.blocked_count(), 1);
}

#[test]
fn insufficient_funds_declines_without_side_effects() {
    let mut world = world_with(100);
    let mut manager = CommandManager::new();

    place_habitat(&mut manager, &mut world, 0, 0);
    assert_eq!(query::balance(&world), Money::ZERO);

    let result = manager.execute(
        &mut world,
        Box::new(PlaceHabitatCommand::new(savanna(100), CellCoord::new(5, 5))),
    );

    assert_eq!(
        result,
        Err(CommandError::InsufficientFunds {
            required: Money::new(100),
            available: Money::ZERO,
        })
    );
    assert_eq!(query::balance(&world), Money::ZERO);
    assert_eq!(query::tile_grid(&world).blocked_count(), 4);
    assert_eq!(manager.undo_depth(), 1);
}

#[test]
fn out_of_range_and_overlap_are_checked_before_funds() {
    let mut world = world_with(100);
    let mut manager = CommandManager::new();
    place_habitat(&mut manager, &mut world, 0, 0);

    let overlap = manager.execute(
        &mut world,
        Box::new(PlaceHabitatCommand::new(savanna(100), CellCoord::new(1, 1))),
    );
    assert_eq!(
        overlap,
        Err(CommandError::Occupied {
            cell: CellCoord::new(1, 1)
        })
    );

    let outside = manager.execute(
        &mut world,
        Box::new(PlaceHabitatCommand::new(savanna(100), CellCoord::new(9, 9))),
    );
    assert!(matches!(
        outside,
        Err(CommandError::Grid(GridError::OutOfRange { .. }))
    ));
}

#[test]
fn clear_makes_undo_and_redo_no_ops() {
    let mut world = world_with(500);
    let mut manager = CommandManager::new();
    place_habitat(&mut manager, &mut world, 0, 0);
    place_habitat(&mut manager, &mut world, 4, 4);
    assert_eq!(manager.undo(&mut world), Ok(true));

    manager.clear();

    assert_eq!(manager.undo(&mut world), Ok(false));
    assert_eq!(manager.redo(&mut world), Ok(false));
    assert_eq!(query::stats(&world).habitats, 1, "clear does not revert");
}

#[test]
fn redo_reuses_allocated_identifiers() {
    let mut world = world_with(500);
    let mut manager = CommandManager::new();
    place_habitat(&mut manager, &mut world, 0, 0);
    let counters = query::counters(&world);

    assert_eq!(manager.undo(&mut world), Ok(true));
    assert_eq!(manager.redo(&mut world), Ok(true));

    assert!(query::habitat(&world, HabitatId::new(0)).is_some());
    assert_eq!(query::counters(&world), counters, "no fresh id on redo");
}

#[test]
fn animals_respect_location_and_capacity() {
    let mut world = world_with(500);
    let mut manager = CommandManager::new();

    let nowhere = manager.execute(
        &mut world,
        Box::new(PlaceAnimalCommand::new("Lion", CellCoord::new(7, 7))),
    );
    assert_eq!(
        nowhere,
        Err(CommandError::NoHabitatAtLocation {
            cell: CellCoord::new(7, 7)
        })
    );

    place_habitat(&mut manager, &mut world, 0, 0);
    for _ in 0..2 {
        manager
            .execute(
                &mut world,
                Box::new(PlaceAnimalCommand::new("Lion", CellCoord::new(1, 1))),
            )
            .expect("room available");
    }
    let full = manager.execute(
        &mut world,
        Box::new(PlaceAnimalCommand::new("Lion", CellCoord::new(0, 1))),
    );
    assert_eq!(
        full,
        Err(CommandError::HabitatFull {
            habitat: HabitatId::new(0),
            capacity: 2,
        })
    );

    assert_eq!(manager.undo(&mut world), Ok(true));
    let occupants = query::habitat(&world, HabitatId::new(0)).map(Habitat::occupants);
    assert_eq!(occupants, Some(1));
}

#[test]
fn habitat_undo_cascades_and_redo_reinstates_residents() {
    let mut world = world_with(500);
    let mut builder = CommandManager::new();
    place_habitat(&mut builder, &mut world, 0, 0);

    // Residents recorded in a separate history so the habitat can be undone
    // while they still live in it.
    let mut residents = CommandManager::new();
    residents
        .execute(
            &mut world,
            Box::new(PlaceAnimalCommand::new("Zebra", CellCoord::new(0, 0))),
        )
        .expect("room available");
    residents
        .execute(
            &mut world,
            Box::new(HireKeeperCommand::new(
                "Ada",
                Money::new(5),
                Money::new(20),
                CellCoord::new(1, 0),
            )),
        )
        .expect("funds available");
    residents.clear();

    let habitat = HabitatId::new(0);
    assert_eq!(builder.undo(&mut world), Ok(true));
    assert_eq!(query::stats(&world), ZooStats::default(), "dependents removed");

    assert_eq!(builder.redo(&mut world), Ok(true));
    assert_eq!(query::animals_in(&world, habitat).count(), 1);
    assert_eq!(query::keepers_of(&world, habitat).count(), 1);
    let occupants = query::habitat(&world, habitat).map(Habitat::occupants);
    assert_eq!(occupants, Some(1));
}

#[test]
fn shops_and_keepers_round_trip_through_history() {
    let mut world = world_with(200);
    let mut manager = CommandManager::new();
    place_habitat(&mut manager, &mut world, 0, 0);
    manager
        .execute(
            &mut world,
            Box::new(PlaceShopCommand::new(kiosk(), CellCoord::new(5, 5))),
        )
        .expect("funds available");
    manager
        .execute(
            &mut world,
            Box::new(HireKeeperCommand::new(
                "Grace",
                Money::new(5),
                Money::new(40),
                CellCoord::new(0, 0),
            )),
        )
        .expect("funds available");
    assert_eq!(query::balance(&world), Money::new(30));

    let keeper_broke = manager.execute(
        &mut world,
        Box::new(HireKeeperCommand::new(
            "Linus",
            Money::new(5),
            Money::new(40),
            CellCoord::new(0, 0),
        )),
    );
    assert!(matches!(
        keeper_broke,
        Err(CommandError::InsufficientFunds { .. })
    ));

    while manager.undo(&mut world).expect("undo succeeds") {}

    assert_eq!(query::balance(&world), Money::new(200));
    assert_eq!(query::stats(&world), ZooStats::default());
    assert_eq!(query::tile_grid(&world).blocked_count(), 0);
    assert_eq!(manager.describe_redo().as_deref(), Some("place Savanna at (0, 0)"));
}
