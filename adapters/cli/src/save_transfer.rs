//! Single-line save strings and the file store that keeps them.

use std::{
    error::Error,
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use log::debug;
use zoo_tycoon_core::{Persistence, PersistenceError, SavedWorld};

const SAVE_DOMAIN: &str = "zoo";
const SAVE_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Encodes a saved world as `zoo:v1:<columns>x<rows>:<payload>`.
pub(crate) fn encode(world: &SavedWorld) -> Result<String, SaveTransferError> {
    let json = serde_json::to_vec(world).map_err(SaveTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SAVE_DOMAIN}{FIELD_DELIMITER}{SAVE_VERSION}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
        world.columns, world.rows
    ))
}

/// Decodes a save string produced by [`encode`].
pub(crate) fn decode(value: &str) -> Result<SavedWorld, SaveTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SaveTransferError::Empty);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveTransferError::MissingField("prefix"))?;
    let version = parts.next().ok_or(SaveTransferError::MissingField("version"))?;
    let dimensions = parts
        .next()
        .ok_or(SaveTransferError::MissingField("grid dimensions"))?;
    let payload = parts.next().ok_or(SaveTransferError::MissingField("payload"))?;

    if domain != SAVE_DOMAIN {
        return Err(SaveTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SAVE_VERSION {
        return Err(SaveTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SaveTransferError::InvalidEncoding)?;
    let world: SavedWorld =
        serde_json::from_slice(&bytes).map_err(SaveTransferError::InvalidPayload)?;

    if (world.columns, world.rows) != (columns, rows) {
        return Err(SaveTransferError::DimensionMismatch {
            header: (columns, rows),
            payload: (world.columns, world.rows),
        });
    }
    Ok(world)
}

/// Errors raised while encoding or decoding save strings.
#[derive(Debug)]
pub(crate) enum SaveTransferError {
    /// The save string was empty or whitespace.
    Empty,
    /// A colon separated field was absent.
    MissingField(&'static str),
    /// The save string does not start with the zoo prefix.
    InvalidPrefix(String),
    /// The save string was written by an unknown format version.
    UnsupportedVersion(String),
    /// The `<columns>x<rows>` field could not be parsed.
    InvalidDimensions(String),
    /// The header and the payload disagree about the grid size.
    DimensionMismatch {
        header: (u32, u32),
        payload: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The JSON payload could not be produced or understood.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SaveTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "save string was empty"),
            Self::MissingField(field) => write!(f, "save string is missing the {field}"),
            Self::InvalidPrefix(prefix) => write!(f, "save prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "save version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { header, payload } => write!(
                f,
                "header declares a {}x{} grid but the payload holds {}x{}",
                header.0, header.1, payload.0, payload.1
            ),
            Self::InvalidEncoding(error) => write!(f, "could not decode save payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not process save payload: {error}"),
        }
    }
}

impl Error for SaveTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SaveTransferError> {
    let invalid = || SaveTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}

/// Stores the save string in a single text file.
#[derive(Clone, Debug)]
pub(crate) struct SaveFile {
    path: PathBuf,
}

impl SaveFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for SaveFile {
    fn load_game(&mut self) -> Result<Option<SavedWorld>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("no save at {}", self.path.display());
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };
        let world = decode(&contents).map_err(|error| PersistenceError::Corrupt(error.to_string()))?;
        debug!("loaded save from {}", self.path.display());
        Ok(Some(world))
    }

    fn save_game(&mut self, world: &SavedWorld) -> Result<(), PersistenceError> {
        let line = encode(world).map_err(|error| PersistenceError::Corrupt(error.to_string()))?;
        fs::write(&self.path, format!("{line}\n"))?;
        debug!("saved game to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoo_tycoon_core::{
        CellCoord, CellRect, CellRectSize, HabitatId, IdCounters, Money, SavedHabitat,
    };

    fn populated() -> SavedWorld {
        SavedWorld {
            columns: 20,
            rows: 15,
            balance: Money::new(750),
            counters: IdCounters {
                next_habitat: 3,
                ..IdCounters::default()
            },
            habitats: vec![SavedHabitat {
                id: HabitatId::new(2),
                name: "Arctic".to_owned(),
                region: CellRect::from_origin_and_size(
                    CellCoord::new(5, 7),
                    CellRectSize::new(3, 3),
                ),
                capacity: 3,
            }],
            shops: Vec::new(),
            animals: Vec::new(),
            keepers: Vec::new(),
        }
    }

    #[test]
    fn encoded_string_carries_header_and_round_trips() {
        let world = populated();
        let encoded = encode(&world).expect("serialisable");
        assert!(encoded.starts_with("zoo:v1:20x15:"), "{encoded}");
        assert!(!encoded.contains('\n'));
        assert_eq!(decode(&encoded).expect("decodes"), world);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(decode("  "), Err(SaveTransferError::Empty)));
        assert!(matches!(
            decode("park:v1:2x2:e30"),
            Err(SaveTransferError::InvalidPrefix(_))
        ));
        assert!(matches!(
            decode("zoo:v9:2x2:e30"),
            Err(SaveTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("zoo:v1:0x2:e30"),
            Err(SaveTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("zoo:v1:2x2"),
            Err(SaveTransferError::MissingField("payload"))
        ));
        assert!(matches!(
            decode("zoo:v1:2x2:!!!"),
            Err(SaveTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn header_must_match_payload_dimensions() {
        let encoded = encode(&populated()).expect("serialisable");
        let tampered = encoded.replacen("20x15", "21x15", 1);
        assert!(matches!(
            decode(&tampered),
            Err(SaveTransferError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn save_file_round_trips_and_reports_missing_saves() {
        let path = std::env::temp_dir().join(format!("zoo-tycoon-save-{}.txt", std::process::id()));
        let _ = fs::remove_file(&path);
        let mut store = SaveFile::new(&path);

        assert!(store.load_game().expect("missing file is fine").is_none());
        store.save_game(&populated()).expect("writable temp dir");
        let loaded = store.load_game().expect("readable").expect("save present");

        assert_eq!(loaded, populated());
        assert_eq!(store.path(), path.as_path());
        fs::remove_file(&path).expect("cleanup");
    }
}
