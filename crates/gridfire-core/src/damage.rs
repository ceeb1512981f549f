//! Damage values and the damageable contract.
//!
//! Weapons produce a [`Damage`]; anything that can absorb it implements
//! [`Damageable`]. Robots soak damage through armor, hard obstacles resist
//! hits that fail to penetrate, and soft obstacles vanish on any hit.

use rand::{Rng, RngCore};
use rubble::HardObstacle;
use serde::{Deserialize, Serialize};

/// Raw damage and armor penetration of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Damage {
    /// Hit points removed before armor
    pub amount: i32,
    /// Armor level this hit defeats
    pub penetration: i32,
}

impl Damage {
    /// Create a damage value.
    #[must_use]
    pub const fn new(amount: i32, penetration: i32) -> Self {
        Self {
            amount,
            penetration,
        }
    }

    /// Damage after losing `decay` per whole unit of distance, floored at 0.
    #[must_use]
    pub fn falloff(self, decay: i32, distance: i32) -> Self {
        Self {
            amount: (self.amount - decay * distance).max(0),
            ..self
        }
    }
}

/// What a hit did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The target lost hit points and survived.
    Damaged {
        /// Hit points removed
        health_lost: i32,
    },
    /// The target was destroyed by this hit.
    Destroyed,
    /// The target could not be damaged (already destroyed).
    Ignored,
}

/// Anything a weapon can hurt.
///
/// Implementations draw from `rng` for stochastic effects such as armor wear,
/// so tests can pin outcomes with a fixed generator.
pub trait Damageable {
    /// Apply one hit.
    fn take_damage(&mut self, damage: Damage, rng: &mut dyn RngCore) -> DamageOutcome;

    /// Name used in feed lines, e.g. `"weapon hit {name}!"`.
    fn display_name(&self) -> String;
}

impl Damageable for HardObstacle {
    /// A hit whose penetration reaches the armor destroys the obstacle
    /// outright; weaker hits chip away at its hit points.
    fn take_damage(&mut self, damage: Damage, _rng: &mut dyn RngCore) -> DamageOutcome {
        if damage.penetration >= self.armor {
            self.hp = 0;
            return DamageOutcome::Destroyed;
        }
        self.hp -= damage.amount;
        if self.hp <= 0 {
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Damaged {
                health_lost: damage.amount,
            }
        }
    }

    fn display_name(&self) -> String {
        "hard barricade".to_string()
    }
}

/// Soft obstacle: destroyed by any hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftObstacle;

impl Damageable for SoftObstacle {
    fn take_damage(&mut self, _damage: Damage, _rng: &mut dyn RngCore) -> DamageOutcome {
        DamageOutcome::Destroyed
    }

    fn display_name(&self) -> String {
        "barricade".to_string()
    }
}

/// Armor parameters used when a robot absorbs a hit.
///
/// If the robot's current armor is at least the hit's penetration, it takes
/// `floor(amount * (1 - protection))` and loses one armor point with
/// probability `reduction_rate`. Otherwise it takes the full amount.
#[must_use]
pub fn armored_loss(
    damage: Damage,
    armor: i32,
    protection: f64,
    reduction_rate: f64,
    rng: &mut dyn RngCore,
) -> (i32, bool) {
    if armor >= damage.penetration {
        #[allow(clippy::cast_possible_truncation)]
        let loss = (f64::from(damage.amount) * (1.0 - protection)).floor() as i32;
        let wears = rng.gen::<f64>() <= reduction_rate;
        (loss, wears)
    } else {
        (damage.amount, false)
    }
}
