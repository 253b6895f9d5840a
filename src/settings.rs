//! Level generation settings
//!
//! Persisted as JSON next to the game's other data. Loaded once per process,
//! editable before a run starts, and frozen into the run on start.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

pub use crate::tuning::Tuning;

const DEFAULT_VISIBLE_ROWS: i32 = 10;
const DEFAULT_DISTANCE_TO_FIRST_ROW: f32 = 15.0;
const DEFAULT_DISTANCE_BETWEEN_ROWS: f32 = 7.5;
const DEFAULT_GREY_CHANCE: f32 = 0.5;
const DEFAULT_BLUE_CHANCE: f32 = 0.25;
const DEFAULT_START_LANES: i32 = 3;
/// Seeds are stored as a 32-bit int in the settings file
const MAX_SEED: i64 = i32::MAX as i64;

/// Settings that shape the generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelSettings {
    /// Rows generated up front when a run starts
    pub number_of_visible_obstacle_rows: i32,
    /// Z of the first row
    pub distance_to_first_row: f32,
    /// Z spacing between consecutive rows
    pub distance_between_rows: f32,
    /// Weight of neutral-static obstacles
    pub grey_obstacle_chance: f32,
    /// Weight of lane-oscillating obstacles (orange takes the rest)
    pub blue_obstacle_chance: f32,
    /// Lanes present when a run starts
    pub start_number_of_lanes: i32,
    /// Seed for the run's random stream
    pub seed: i64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            number_of_visible_obstacle_rows: DEFAULT_VISIBLE_ROWS,
            distance_to_first_row: DEFAULT_DISTANCE_TO_FIRST_ROW,
            distance_between_rows: DEFAULT_DISTANCE_BETWEEN_ROWS,
            grey_obstacle_chance: DEFAULT_GREY_CHANCE,
            blue_obstacle_chance: DEFAULT_BLUE_CHANCE,
            start_number_of_lanes: DEFAULT_START_LANES,
            seed: 0,
        }
    }
}

impl LevelSettings {
    /// Rows generated up front (validated, so always >= 1)
    pub fn visible_rows(&self) -> usize {
        self.number_of_visible_obstacle_rows.max(1) as usize
    }

    /// Lanes at run start (validated, so always >= 1)
    pub fn start_lanes(&self) -> usize {
        self.start_number_of_lanes.max(1) as usize
    }

    /// Seed as fed to the random stream
    pub fn run_seed(&self) -> u64 {
        self.seed.max(0) as u64
    }

    /// Coerce every out-of-domain field to its default.
    ///
    /// Returns one error per corrected field; each is also logged at warn.
    pub fn validate(&mut self) -> Vec<SettingsError> {
        let mut problems = Vec::new();

        if self.number_of_visible_obstacle_rows < 1 {
            problems.push(invalid(
                "numberOfVisibleObstacleRows",
                self.number_of_visible_obstacle_rows,
                DEFAULT_VISIBLE_ROWS,
            ));
            self.number_of_visible_obstacle_rows = DEFAULT_VISIBLE_ROWS;
        }

        // Negated comparisons so NaN is rejected too
        if !(self.distance_to_first_row >= 1.0) {
            problems.push(invalid(
                "distanceToFirstRow",
                self.distance_to_first_row,
                DEFAULT_DISTANCE_TO_FIRST_ROW,
            ));
            self.distance_to_first_row = DEFAULT_DISTANCE_TO_FIRST_ROW;
        }

        if !(self.distance_between_rows >= 1.0) {
            problems.push(invalid(
                "distanceBetweenRows",
                self.distance_between_rows,
                DEFAULT_DISTANCE_BETWEEN_ROWS,
            ));
            self.distance_between_rows = DEFAULT_DISTANCE_BETWEEN_ROWS;
        }

        if !(0.0..=1.0).contains(&self.grey_obstacle_chance) {
            problems.push(invalid(
                "greyObstacleChance",
                self.grey_obstacle_chance,
                DEFAULT_GREY_CHANCE,
            ));
            self.grey_obstacle_chance = DEFAULT_GREY_CHANCE;
        }

        if !(0.0..=1.0).contains(&self.blue_obstacle_chance) {
            problems.push(invalid(
                "blueObstacleChance",
                self.blue_obstacle_chance,
                DEFAULT_BLUE_CHANCE,
            ));
            self.blue_obstacle_chance = DEFAULT_BLUE_CHANCE;
        }

        if self.start_number_of_lanes < 1 {
            problems.push(invalid(
                "startNumberOfLanes",
                self.start_number_of_lanes,
                DEFAULT_START_LANES,
            ));
            self.start_number_of_lanes = DEFAULT_START_LANES;
        }

        if !(0..=MAX_SEED).contains(&self.seed) {
            let replacement = random_seed();
            problems.push(invalid("seed", self.seed, replacement));
            self.seed = replacement;
        }

        for problem in &problems {
            log::warn!("{}", problem);
        }
        problems
    }

    /// Set the seed from text input, falling back to a random seed
    pub fn set_seed_from_str(&mut self, input: &str) {
        match input.trim().parse::<i64>() {
            Ok(seed) if (0..=MAX_SEED).contains(&seed) => self.seed = seed,
            _ => {
                log::warn!("Couldn't parse '{}' as a seed, using a random one", input);
                self.seed = random_seed();
            }
        }
    }

    /// Parse settings from JSON text and validate them
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.validate();
        Ok(settings)
    }

    /// Read settings from `path`.
    ///
    /// Out-of-domain fields are corrected; a missing or unparseable file is an
    /// error for the caller to recover from.
    pub fn import(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| SettingsError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings to `path`, creating parent directories
    pub fn export(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }

        // Plain data, serialization can't fail
        let json = serde_json::to_string_pretty(self).unwrap_or_default();
        fs::write(path, json).map_err(io_err)?;
        log::info!("Saved level settings with seed {}", self.seed);
        Ok(())
    }

    /// Load settings, falling back to freshly persisted defaults
    pub fn load(path: &Path) -> Self {
        match Self::import(path) {
            Ok(settings) => {
                log::info!("Loaded level settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { ref source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::warn!("No settings at {}, using defaults", path.display());
                Self::persist_defaults(path)
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::persist_defaults(path)
            }
        }
    }

    fn persist_defaults(path: &Path) -> Self {
        let settings = Self::default();
        if let Err(e) = settings.export(path) {
            log::warn!("Could not persist default settings: {}", e);
        }
        settings
    }
}

fn invalid(field: &'static str, value: impl ToString, replacement: impl ToString) -> SettingsError {
    SettingsError::InvalidValue {
        field,
        value: value.to_string(),
        replacement: replacement.to_string(),
    }
}

fn random_seed() -> i64 {
    rand::random_range(0..MAX_SEED)
}
