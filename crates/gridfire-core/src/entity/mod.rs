//! Entity module: robots and their state.
//!
//! This module provides the robot entity for Gridfire's combat simulation:
//! - [`EntityId`]: Unique identifier, shared with the grid
//! - [`Robot`]: Health, armor, loadout, status, feed, and private map
//! - [`components`]: Loadout and map component structs
//!
//! A robot does not store its own position. The grid cell holding
//! `Occupant::Robot(id)` is the single source of truth, and
//! [`crate::world::World`] keeps the id-to-cell index that points at it.
//!
//! # Example
//!
//! ```
//! use gridfire_core::config::RobotConfig;
//! use gridfire_core::entity::{EntityId, Robot};
//! use rubble::Extent;
//!
//! let robot = Robot::from_config(EntityId::new(1), &RobotConfig::default(), Extent::new(15, 15));
//! assert_eq!(robot.hp, 100);
//! assert_eq!(robot.status_line(), "Player 1  HP: 100/100  armor: 3/3");
//! ```

pub mod components;

use rand::RngCore;
use rubble::{CellReading, Extent};
use serde::{Deserialize, Serialize};

pub use components::{GadgetSlot, KnownMap, Loadout};
pub use rubble::EntityId;

use crate::command::{reaction_priority, Action, SENSE_PRIORITY};
use crate::config::{ArmorConfig, RobotConfig};
use crate::damage::{armored_loss, Damage, DamageOutcome, Damageable};
use crate::error::CommandError;
use crate::feed::Feed;
use crate::status::StatusModel;

/// A robot controlled by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    id: EntityId,
    /// Current hit points
    pub hp: i32,
    /// Hit points at spawn
    pub max_hp: i32,
    /// Current armor level
    pub armor: i32,
    /// Armor behavior
    pub armor_config: ArmorConfig,
    /// Sound emitted at the destination of a move
    pub move_sound: i32,
    /// Heat emitted at the destination of a move
    pub move_heat: i32,
    /// Queue priority of move commands
    pub move_priority: u32,
    /// Equipment
    pub loadout: Loadout,
    /// Capability states
    pub status: StatusModel,
    /// Information feed
    pub feed: Feed,
    /// Latest end-of-round vision, if vision was active
    pub vision: Option<CellReading>,
    /// Remembered battlefield
    pub map: KnownMap,
}

impl Robot {
    /// Build a robot from its configuration.
    #[must_use]
    pub fn from_config(id: EntityId, config: &RobotConfig, extent: Extent) -> Self {
        Self {
            id,
            hp: config.hp,
            max_hp: config.hp,
            armor: config.armor.max_armor,
            armor_config: config.armor,
            move_sound: config.move_sound,
            move_heat: config.move_heat,
            move_priority: config.move_priority,
            loadout: Loadout::from_config(config),
            status: StatusModel::new(),
            feed: Feed::default(),
            vision: None,
            map: KnownMap::new(extent),
        }
    }

    /// The robot's id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the robot has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.status.is_destroyed()
    }

    /// Conventional queue priority of an action.
    ///
    /// Actions naming an empty slot get priority 0; they are rejected by
    /// [`Robot::validate`] before they can be queued.
    #[must_use]
    pub fn priority_for(&self, action: &Action) -> u32 {
        match action {
            Action::Move(_) => self.move_priority,
            Action::Sense { .. } => SENSE_PRIORITY,
            Action::Fire { weapon, .. } => self
                .loadout
                .weapon(*weapon)
                .map_or(0, |w| reaction_priority(w.reaction_time)),
            Action::Gadget { gadget, .. } => self
                .loadout
                .gadget(*gadget)
                .map_or(0, |g| reaction_priority(g.config.reaction_time)),
        }
    }

    /// Check an action against the loadout.
    ///
    /// # Errors
    ///
    /// See [`Loadout::validate`].
    pub fn validate(&self, action: &Action) -> Result<(), CommandError> {
        self.loadout.validate(action)
    }

    /// One-line health summary.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!(
            "Player {}  HP: {}/{}  armor: {}/{}",
            self.id, self.hp, self.max_hp, self.armor, self.armor_config.max_armor
        )
    }
}

impl Damageable for Robot {
    fn take_damage(&mut self, damage: Damage, rng: &mut dyn RngCore) -> DamageOutcome {
        if self.is_destroyed() {
            return DamageOutcome::Ignored;
        }

        let (loss, wears) = armored_loss(
            damage,
            self.armor,
            self.armor_config.protection,
            self.armor_config.reduction_rate,
            rng,
        );
        self.hp -= loss;
        if wears {
            self.armor = (self.armor - 1).max(0);
        }
        self.feed.push_text("Receives damage!");

        if self.hp <= 0 {
            self.status.set_destroyed();
            self.feed.push_text("Robot destroyed!");
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Damaged { health_lost: loss }
        }
    }

    fn display_name(&self) -> String {
        format!("player {}", self.id)
    }
}
