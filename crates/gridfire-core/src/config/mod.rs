//! Match, field, and loadout configuration.
//!
//! Every struct deserializes from JSON with `#[serde(default)]`, so a config
//! file only needs the fields it changes. Call `validate` after loading; the
//! constructors in [`crate::coordinator`] do this for you.

pub mod presets;

use std::fs;
use std::path::{Path, PathBuf};

use rubble::{Extent, GridConfig, Signal, SignalConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::damage::Damage;
use crate::status::StatusEffect;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The JSON did not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Largest radius or range a loadout may use on any field.
pub const MAX_REACH: i32 = 1024;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

// =============================================================================
// Field
// =============================================================================

/// Battlefield generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Columns
    pub width: i32,
    /// Rows
    pub height: i32,
    /// Fraction of cells that start with an obstacle
    pub obstacle_coverage: f64,
    /// Fraction of cells that start with a hard obstacle (part of the above)
    pub hard_obstacle_coverage: f64,
    /// Inclusive hit point range of generated hard obstacles
    pub hard_obstacle_hp: (i32, i32),
    /// Inclusive armor range of generated hard obstacles
    pub hard_obstacle_armor: (i32, i32),
    /// Sound lost by every cell each round
    pub sound_decay: u8,
    /// Heat lost by every cell each round
    pub heat_decay: u8,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 15,
            obstacle_coverage: 0.4,
            hard_obstacle_coverage: 0.2,
            hard_obstacle_hp: (50, 200),
            hard_obstacle_armor: (1, 3),
            sound_decay: 1,
            heat_decay: 1,
        }
    }
}

impl FieldConfig {
    /// An open field with no generated obstacles.
    #[must_use]
    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            obstacle_coverage: 0.0,
            hard_obstacle_coverage: 0.0,
            ..Self::default()
        }
    }

    /// Grid configuration for these dimensions and decay rates.
    #[must_use]
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            extent: Extent::new(self.width, self.height),
            signal_configs: vec![
                SignalConfig::new(Signal::Sound).with_decay(self.sound_decay),
                SignalConfig::new(Signal::Heat).with_decay(self.heat_decay),
            ],
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(invalid(format!(
                "field must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if !(0.0..1.0).contains(&self.obstacle_coverage) {
            return Err(invalid(format!(
                "obstacle_coverage {} outside [0, 1)",
                self.obstacle_coverage
            )));
        }
        if !(0.0..=self.obstacle_coverage).contains(&self.hard_obstacle_coverage) {
            return Err(invalid(format!(
                "hard_obstacle_coverage {} outside [0, obstacle_coverage]",
                self.hard_obstacle_coverage
            )));
        }
        check_range("hard_obstacle_hp", self.hard_obstacle_hp)?;
        check_range("hard_obstacle_armor", self.hard_obstacle_armor)
    }
}

fn check_range(name: &str, (lo, hi): (i32, i32)) -> Result<(), ConfigError> {
    if lo > hi {
        return Err(invalid(format!("{name} range ({lo}, {hi}) is inverted")));
    }
    Ok(())
}

// =============================================================================
// Equipment
// =============================================================================

/// Armor worn by a robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorConfig {
    /// Armor level at spawn
    pub max_armor: i32,
    /// Fraction of damage absorbed when not penetrated
    pub protection: f64,
    /// Probability of losing one armor level per absorbed hit
    pub reduction_rate: f64,
}

impl Default for ArmorConfig {
    fn default() -> Self {
        Self {
            max_armor: 3,
            protection: 0.5,
            reduction_rate: 0.3,
        }
    }
}

/// How a sensor gathers information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorKind {
    /// Read sound or heat levels in a square around the robot
    Signal {
        /// Which signal to read
        signal: Signal,
        /// Half-width of the square
        radius: i32,
    },
    /// Reveal occupants in a square around the robot
    Lidar {
        /// Half-width of the square
        radius: i32,
    },
    /// Fly along a path of steps and reveal occupants around where it stops
    Drone {
        /// Half-width of the revealed square
        radius: i32,
        /// Longest accepted path
        max_path: usize,
    },
    /// Drive in one direction, pushing through soft obstacles, and reveal
    /// occupants around where it stops
    ScoutCar {
        /// Half-width of the revealed square
        radius: i32,
        /// Maximum cells travelled
        range: i32,
        /// Soft obstacles it can clear on the way
        removal_budget: u32,
    },
}

/// A sensor slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Display name
    pub name: String,
    /// Behavior
    pub kind: SensorKind,
    /// Sound emitted at the robot when used
    #[serde(default)]
    pub sound_emission: i32,
    /// Heat emitted at the robot when used
    #[serde(default)]
    pub heat_emission: i32,
}

/// Ballistics of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaponKind {
    /// Fires along a line and hits the first occupant
    Straight {
        /// Hit probability at distance 1
        accuracy: f64,
        /// Accuracy lost per additional cell
        accuracy_decay: f64,
        /// Farthest cell reached
        range: i32,
    },
    /// Lobbed to a chosen distance and damages everything in a radius
    Projectile {
        /// Shortest throw
        min_range: i32,
        /// Longest throw
        max_range: i32,
        /// Blast radius
        impact_radius: i32,
        /// Damage lost per whole cell from the impact point
        impact_damage_decay: i32,
    },
}

/// A weapon slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    /// Display name
    pub name: String,
    /// Damage per hit
    pub damage: Damage,
    /// Ballistics
    pub kind: WeaponKind,
    /// Sound emitted at the robot when fired
    #[serde(default)]
    pub sound_emission: i32,
    /// Heat emitted at the robot when fired
    #[serde(default)]
    pub heat_emission: i32,
    /// Reaction time; faster weapons resolve earlier in the round
    #[serde(default)]
    pub reaction_time: u32,
}

/// What a gadget does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GadgetKind {
    /// Place a hard obstacle on the adjacent cell
    Barricade {
        /// Hit points of the placed obstacle
        hp: i32,
        /// Armor of the placed obstacle
        armor: i32,
    },
    /// Thrown device that disrupts robots in a radius
    AreaStatus {
        /// Shortest throw
        min_range: i32,
        /// Longest throw
        max_range: i32,
        /// Effect radius
        impact_radius: i32,
        /// Disruption applied to every robot in the radius
        effect: StatusEffect,
        /// Further rounds the disruption is re-applied to the same robots
        #[serde(default)]
        lingering_rounds: u64,
    },
}

/// A gadget slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GadgetConfig {
    /// Display name
    pub name: String,
    /// Behavior
    pub kind: GadgetKind,
    /// Uses available at spawn and after each refill
    pub uses: u32,
    /// Uses are restored every this many rounds; 0 never refills
    #[serde(default)]
    pub refill_every: u64,
    /// Reaction time; faster gadgets resolve earlier in the round
    #[serde(default)]
    pub reaction_time: u32,
    /// Sound emitted at the robot when used
    #[serde(default)]
    pub sound_emission: i32,
    /// Heat emitted at the robot when used
    #[serde(default)]
    pub heat_emission: i32,
}

// =============================================================================
// Robot
// =============================================================================

/// Everything needed to spawn a robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Chassis name, used in logs
    pub name: String,
    /// Hit points at spawn
    pub hp: i32,
    /// Armor
    pub armor: ArmorConfig,
    /// Sound emitted at the destination of a move
    pub move_sound: i32,
    /// Heat emitted at the destination of a move
    pub move_heat: i32,
    /// Queue priority of move commands; lower resolves first
    pub move_priority: u32,
    /// Sensor slots
    pub sensors: Vec<SensorConfig>,
    /// Weapon slots
    pub weapons: Vec<WeaponConfig>,
    /// Gadget slots
    pub gadgets: Vec<GadgetConfig>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        presets::standard_robot()
    }
}

impl RobotConfig {
    /// A robot with the default chassis and no equipment.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            sensors: Vec::new(),
            weapons: Vec::new(),
            gadgets: Vec::new(),
            ..Self::default()
        }
    }

    /// Check value ranges of the chassis and every slot. Radii and ranges
    /// must lie in `0..=MAX_REACH`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_reach(MAX_REACH)
    }

    /// As [`RobotConfig::validate`], with every radius and range capped at
    /// `limit` instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate_reach(&self, limit: i32) -> Result<(), ConfigError> {
        if self.hp <= 0 {
            return Err(invalid(format!("robot '{}' must start with hp > 0", self.name)));
        }
        if self.armor.max_armor < 0 {
            return Err(invalid(format!("robot '{}' has negative armor", self.name)));
        }
        for weapon in &self.weapons {
            if let WeaponKind::Projectile {
                min_range,
                max_range,
                ..
            } = weapon.kind
            {
                check_range(&weapon.name, (min_range, max_range))?;
            }
        }
        for gadget in &self.gadgets {
            if let GadgetKind::AreaStatus {
                min_range,
                max_range,
                ..
            } = gadget.kind
            {
                check_range(&gadget.name, (min_range, max_range))?;
            }
        }
        for (slot, what, value) in self.reaches() {
            if !(0..=limit).contains(&value) {
                return Err(invalid(format!(
                    "{slot} {what} {value} outside [0, {limit}]"
                )));
            }
        }
        Ok(())
    }

    /// Every radius and range in the loadout, labelled by slot.
    fn reaches(&self) -> Vec<(&str, &'static str, i32)> {
        let mut out = Vec::new();
        for sensor in &self.sensors {
            let name = sensor.name.as_str();
            match sensor.kind {
                SensorKind::Signal { radius, .. }
                | SensorKind::Lidar { radius }
                | SensorKind::Drone { radius, .. } => out.push((name, "radius", radius)),
                SensorKind::ScoutCar { radius, range, .. } => {
                    out.push((name, "radius", radius));
                    out.push((name, "range", range));
                }
            }
        }
        for weapon in &self.weapons {
            let name = weapon.name.as_str();
            match weapon.kind {
                WeaponKind::Straight { range, .. } => out.push((name, "range", range)),
                WeaponKind::Projectile {
                    min_range,
                    max_range,
                    impact_radius,
                    ..
                } => {
                    out.push((name, "min_range", min_range));
                    out.push((name, "max_range", max_range));
                    out.push((name, "impact_radius", impact_radius));
                }
            }
        }
        for gadget in &self.gadgets {
            if let GadgetKind::AreaStatus {
                min_range,
                max_range,
                impact_radius,
                ..
            } = gadget.kind
            {
                let name = gadget.name.as_str();
                out.push((name, "min_range", min_range));
                out.push((name, "max_range", max_range));
                out.push((name, "impact_radius", impact_radius));
            }
        }
        out
    }
}

// =============================================================================
// Match
// =============================================================================

/// Top-level configuration of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Master seed for field generation, spawns and hit rolls
    pub seed: u64,
    /// Battlefield
    pub field: FieldConfig,
    /// Half-width of the end-of-round vision square
    pub vision_radius: i32,
    /// Loadout given to participants that join without their own
    pub robot: RobotConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            field: FieldConfig::default(),
            vision_radius: 1,
            robot: RobotConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Parse from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`MatchConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check every nested value. Loadout radii and ranges may not exceed
    /// the longer side of the field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        let side = self.field.width.max(self.field.height);
        if !(0..=side).contains(&self.vision_radius) {
            return Err(invalid(format!(
                "vision_radius {} outside [0, {side}]",
                self.vision_radius
            )));
        }
        self.robot.validate_reach(side.min(MAX_REACH))
    }
}
