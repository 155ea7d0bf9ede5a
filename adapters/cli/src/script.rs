//! Line-oriented scenario scripts that drive the simulation.
//!
//! Each non-empty line holds one action; `#` starts a comment. Coordinates
//! and known blueprint footprints must fit inside the grid being played.
//!
//! ```text
//! habitat <blueprint> <x> <y>
//! shop <blueprint> <x> <y>
//! animal <species> <x> <y>
//! keeper <name> <x> <y>
//! undo | redo | clear
//! visitor <x> <y>
//! walk <agent> <x> <y>
//! tick <n>
//! ```

use std::{fmt, str::SplitWhitespace};

use thiserror::Error;
use zoo_tycoon_core::{AgentId, CellCoord, CellRect, CellRectSize, TileGrid};

use crate::config::ZooConfig;

/// Scenario played when no script is provided.
pub(crate) const DEMO_SCRIPT: &str = "\
# Build a small zoo, then send a visitor across it.
habitat Savanna 2 2
animal Lion 3 3
animal Zebra 2 2
keeper Ada 4 3
shop Kiosk 8 2
undo
redo
visitor 1 8
walk 0 20 12
tick 20
habitat Jungle 10 6
tick 200
";

/// Single scripted player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Habitat { blueprint: String, origin: CellCoord },
    Shop { blueprint: String, origin: CellCoord },
    Animal { species: String, cell: CellCoord },
    Keeper { name: String, cell: CellCoord },
    Undo,
    Redo,
    Clear,
    Visitor { cell: CellCoord },
    Walk { agent: AgentId, goal: CellCoord },
    Tick { count: u32 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Habitat { blueprint, origin } => {
                write!(f, "habitat {blueprint} {} {}", origin.column(), origin.row())
            }
            Self::Shop { blueprint, origin } => {
                write!(f, "shop {blueprint} {} {}", origin.column(), origin.row())
            }
            Self::Animal { species, cell } => {
                write!(f, "animal {species} {} {}", cell.column(), cell.row())
            }
            Self::Keeper { name, cell } => {
                write!(f, "keeper {name} {} {}", cell.column(), cell.row())
            }
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::Clear => f.write_str("clear"),
            Self::Visitor { cell } => write!(f, "visitor {} {}", cell.column(), cell.row()),
            Self::Walk { agent, goal } => {
                write!(f, "walk {} {} {}", agent.get(), goal.column(), goal.row())
            }
            Self::Tick { count } => write!(f, "tick {count}"),
        }
    }
}

/// Script line that could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub(crate) struct ScriptError {
    line: usize,
    kind: ScriptErrorKind,
}

/// Reason a script line was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptErrorKind {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("`{action}` expects {argument}")]
    MissingArgument {
        action: &'static str,
        argument: &'static str,
    },
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
    #[error("unexpected trailing input `{0}`")]
    TrailingInput(String),
    #[error("({column}, {row}) lies outside the {columns}x{rows} grid")]
    OutsideGrid {
        column: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },
    #[error("`{blueprint}` at ({column}, {row}) does not fit the {columns}x{rows} grid")]
    FootprintOutsideGrid {
        blueprint: String,
        column: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },
}

/// Parses a whole script, stopping at the first malformed line.
///
/// Blueprint footprints are looked up in `config` and, like every scripted
/// cell, must lie inside `grid`.
pub(crate) fn parse(
    source: &str,
    config: &ZooConfig,
    grid: &TileGrid,
) -> Result<Vec<Action>, ScriptError> {
    let mut actions = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let action = parse_line(content)
            .and_then(|action| check_bounds(action, config, grid))
            .map_err(|kind| ScriptError {
            line: index + 1,
            kind,
        })?;
        actions.push(action);
    }
    Ok(actions)
}

fn parse_line(content: &str) -> Result<Action, ScriptErrorKind> {
    let mut words = Arguments {
        action: "",
        words: content.split_whitespace(),
    };
    let keyword = words.words.next().unwrap_or_default();

    let action = match keyword {
        "habitat" => {
            words.action = "habitat";
            Action::Habitat {
                blueprint: words.name("a blueprint name")?,
                origin: words.cell()?,
            }
        }
        "shop" => {
            words.action = "shop";
            Action::Shop {
                blueprint: words.name("a blueprint name")?,
                origin: words.cell()?,
            }
        }
        "animal" => {
            words.action = "animal";
            Action::Animal {
                species: words.name("a species")?,
                cell: words.cell()?,
            }
        }
        "keeper" => {
            words.action = "keeper";
            Action::Keeper {
                name: words.name("a keeper name")?,
                cell: words.cell()?,
            }
        }
        "undo" => Action::Undo,
        "redo" => Action::Redo,
        "clear" => Action::Clear,
        "visitor" => {
            words.action = "visitor";
            Action::Visitor {
                cell: words.cell()?,
            }
        }
        "walk" => {
            words.action = "walk";
            Action::Walk {
                agent: AgentId::new(words.number("an agent id")?),
                goal: words.cell()?,
            }
        }
        "tick" => {
            words.action = "tick";
            Action::Tick {
                count: words.number("a tick count")?,
            }
        }
        other => return Err(ScriptErrorKind::UnknownAction(other.to_owned())),
    };

    match words.words.next() {
        Some(extra) => Err(ScriptErrorKind::TrailingInput(extra.to_owned())),
        None => Ok(action),
    }
}

fn check_bounds(
    action: Action,
    config: &ZooConfig,
    grid: &TileGrid,
) -> Result<Action, ScriptErrorKind> {
    let target = match &action {
        Action::Habitat { blueprint, origin } => Some((
            *origin,
            config
                .habitat_blueprint(blueprint)
                .map(|found| (blueprint, found.size)),
        )),
        Action::Shop { blueprint, origin } => Some((
            *origin,
            config
                .shop_blueprint(blueprint)
                .map(|found| (blueprint, found.size)),
        )),
        Action::Animal { cell, .. } | Action::Keeper { cell, .. } | Action::Visitor { cell } => {
            Some((*cell, None))
        }
        Action::Walk { goal, .. } => Some((*goal, None)),
        Action::Undo | Action::Redo | Action::Clear | Action::Tick { .. } => None,
    };
    let Some((cell, footprint)) = target else {
        return Ok(action);
    };

    if !grid.contains(cell) {
        return Err(ScriptErrorKind::OutsideGrid {
            column: cell.column(),
            row: cell.row(),
            columns: grid.columns(),
            rows: grid.rows(),
        });
    }
    if let Some((blueprint, size)) = footprint {
        if !fits(grid, cell, size) {
            return Err(ScriptErrorKind::FootprintOutsideGrid {
                blueprint: blueprint.clone(),
                column: cell.column(),
                row: cell.row(),
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }
    }
    Ok(action)
}

fn fits(grid: &TileGrid, origin: CellCoord, size: CellRectSize) -> bool {
    grid.contains_rect(&CellRect::from_origin_and_size(origin, size))
}

struct Arguments<'a> {
    action: &'static str,
    words: SplitWhitespace<'a>,
}

impl Arguments<'_> {
    fn name(&mut self, argument: &'static str) -> Result<String, ScriptErrorKind> {
        self.words
            .next()
            .map(str::to_owned)
            .ok_or(ScriptErrorKind::MissingArgument {
                action: self.action,
                argument,
            })
    }

    fn number(&mut self, argument: &'static str) -> Result<u32, ScriptErrorKind> {
        let word = self.words.next().ok_or(ScriptErrorKind::MissingArgument {
            action: self.action,
            argument,
        })?;
        word.parse()
            .map_err(|_| ScriptErrorKind::InvalidNumber(word.to_owned()))
    }

    fn cell(&mut self) -> Result<CellCoord, ScriptErrorKind> {
        let column = self.number("an x coordinate")?;
        let row = self.number("a y coordinate")?;
        Ok(CellCoord::new(column, row))
    }
}
