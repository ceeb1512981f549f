//! Robot component structs.
//!
//! Equipment configs are static; the only mutable equipment state is the
//! remaining use count of each gadget, kept in [`GadgetSlot`].

use std::fmt;

use glam::IVec2;
use rubble::{CellReading, Extent, Glyph};
use serde::{Deserialize, Serialize};

use crate::command::{Action, Aim, SenseParams};
use crate::config::{
    GadgetConfig, GadgetKind, RobotConfig, SensorConfig, SensorKind, WeaponConfig, WeaponKind,
};
use crate::error::CommandError;

/// A gadget and its remaining uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GadgetSlot {
    /// Static configuration
    pub config: GadgetConfig,
    /// Uses left before the next refill
    pub remaining: u32,
}

impl GadgetSlot {
    /// A fully stocked slot.
    #[must_use]
    pub fn new(config: GadgetConfig) -> Self {
        let remaining = config.uses;
        Self { config, remaining }
    }

    /// Spend one use. Returns `false` and changes nothing when empty.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Restore every use.
    pub fn refill(&mut self) {
        self.remaining = self.config.uses;
    }

    /// Whether the slot refills at the end of `round`.
    #[must_use]
    pub fn refills_after(&self, round: u64) -> bool {
        self.config.refill_every > 0 && round % self.config.refill_every == 0
    }
}

/// Sensors, weapons and gadgets of one robot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    /// Sensor slots
    pub sensors: Vec<SensorConfig>,
    /// Weapon slots
    pub weapons: Vec<WeaponConfig>,
    /// Gadget slots
    pub gadgets: Vec<GadgetSlot>,
}

impl Loadout {
    /// Build from a robot configuration.
    #[must_use]
    pub fn from_config(config: &RobotConfig) -> Self {
        Self {
            sensors: config.sensors.clone(),
            weapons: config.weapons.clone(),
            gadgets: config.gadgets.iter().cloned().map(GadgetSlot::new).collect(),
        }
    }

    /// Sensor in `index`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchSensor`] if the slot is empty.
    pub fn sensor(&self, index: usize) -> Result<&SensorConfig, CommandError> {
        self.sensors.get(index).ok_or(CommandError::NoSuchSensor {
            index,
            available: self.sensors.len(),
        })
    }

    /// Weapon in `index`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchWeapon`] if the slot is empty.
    pub fn weapon(&self, index: usize) -> Result<&WeaponConfig, CommandError> {
        self.weapons.get(index).ok_or(CommandError::NoSuchWeapon {
            index,
            available: self.weapons.len(),
        })
    }

    /// Gadget in `index`.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoSuchGadget`] if the slot is empty.
    pub fn gadget(&self, index: usize) -> Result<&GadgetSlot, CommandError> {
        self.gadgets.get(index).ok_or(CommandError::NoSuchGadget {
            index,
            available: self.gadgets.len(),
        })
    }

    /// Check that an action names existing equipment with matching
    /// parameters.
    ///
    /// # Errors
    ///
    /// The first [`CommandError`] found.
    pub fn validate(&self, action: &Action) -> Result<(), CommandError> {
        match action {
            Action::Move(_) => Ok(()),
            Action::Sense { sensor, params } => validate_sense(self.sensor(*sensor)?, params),
            Action::Fire { weapon, aim } => {
                let weapon = self.weapon(*weapon)?;
                match weapon.kind {
                    WeaponKind::Straight { .. } => expect_line(&weapon.name, *aim),
                    WeaponKind::Projectile {
                        min_range,
                        max_range,
                        ..
                    } => expect_lob(&weapon.name, *aim, min_range, max_range),
                }
            }
            Action::Gadget { gadget, aim } => {
                let config = &self.gadget(*gadget)?.config;
                match config.kind {
                    GadgetKind::Barricade { .. } => expect_line(&config.name, *aim),
                    GadgetKind::AreaStatus {
                        min_range,
                        max_range,
                        ..
                    } => expect_lob(&config.name, *aim, min_range, max_range),
                }
            }
        }
    }
}

fn validate_sense(sensor: &SensorConfig, params: &SenseParams) -> Result<(), CommandError> {
    match (sensor.kind, params) {
        (SensorKind::Signal { .. } | SensorKind::Lidar { .. }, SenseParams::None)
        | (SensorKind::ScoutCar { .. }, SenseParams::Heading(_)) => Ok(()),
        (SensorKind::Signal { .. } | SensorKind::Lidar { .. }, _) => {
            Err(CommandError::UnexpectedParameters {
                sensor: sensor.name.clone(),
            })
        }
        (SensorKind::Drone { max_path, .. }, SenseParams::Path(path)) => {
            if path.is_empty() {
                Err(CommandError::EmptyPath)
            } else if path.len() > max_path {
                Err(CommandError::PathTooLong {
                    len: path.len(),
                    max: max_path,
                })
            } else {
                Ok(())
            }
        }
        (SensorKind::Drone { .. }, _) => Err(CommandError::MissingPath {
            sensor: sensor.name.clone(),
        }),
        (SensorKind::ScoutCar { .. }, _) => Err(CommandError::MissingHeading {
            sensor: sensor.name.clone(),
        }),
    }
}

fn expect_line(name: &str, aim: Aim) -> Result<(), CommandError> {
    match aim {
        Aim::Line(_) => Ok(()),
        Aim::Lob { .. } => Err(CommandError::WrongAim {
            equipment: name.to_string(),
            expected: "line",
        }),
    }
}

fn expect_lob(name: &str, aim: Aim, min: i32, max: i32) -> Result<(), CommandError> {
    match aim {
        Aim::Lob { range, .. } if (min..=max).contains(&range) => Ok(()),
        Aim::Lob { range, .. } => Err(CommandError::RangeOutOfBounds { range, min, max }),
        Aim::Line(_) => Err(CommandError::WrongAim {
            equipment: name.to_string(),
            expected: "lobbed",
        }),
    }
}

/// What a robot remembers of the battlefield.
///
/// Other robots are recorded as open ground: positions of enemies are only
/// ever known from the latest snapshot, never remembered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMap {
    extent: Extent,
    glyphs: Vec<Glyph>,
}

impl KnownMap {
    /// A map with every cell unknown.
    #[must_use]
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            glyphs: vec![Glyph::Unknown; extent.area()],
        }
    }

    /// Record a snapshot. `own` is the observer's cell, which keeps its
    /// robot glyph.
    pub fn merge(&mut self, reading: &CellReading, own: Option<IVec2>) {
        for (pos, glyph) in reading.iter() {
            let Some(index) = self.extent.index_of(pos) else {
                continue;
            };
            self.glyphs[index] = match glyph {
                Glyph::Robot if Some(pos) != own => Glyph::Empty,
                other => *other,
            };
        }
    }

    /// Remembered glyph of a cell.
    #[must_use]
    pub fn get(&self, pos: IVec2) -> Option<Glyph> {
        self.extent.index_of(pos).map(|i| self.glyphs[i])
    }

    /// Number of cells ever observed.
    #[must_use]
    pub fn known_cells(&self) -> usize {
        self.glyphs.iter().filter(|g| **g != Glyph::Unknown).count()
    }
}

impl fmt::Display for KnownMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.extent.width).unwrap_or(1).max(1);
        for (row_index, row) in self.glyphs.chunks(width).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().map(|g| g.as_char()).collect();
            f.write_str(&line)?;
        }
        Ok(())
    }
}
