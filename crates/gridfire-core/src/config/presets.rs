//! Standard armory.
//!
//! Ready-made sensors, weapons, and gadgets with the stock balance values.

use rubble::Signal;

use super::{
    ArmorConfig, GadgetConfig, GadgetKind, RobotConfig, SensorConfig, SensorKind, WeaponConfig,
    WeaponKind,
};
use crate::damage::Damage;
use crate::status::{CapabilityFlags, StatusEffect};

fn straight(
    name: &str,
    damage: Damage,
    (accuracy, accuracy_decay, range): (f64, f64, i32),
    (sound, heat, reaction): (i32, i32, u32),
) -> WeaponConfig {
    WeaponConfig {
        name: name.to_string(),
        damage,
        kind: WeaponKind::Straight {
            accuracy,
            accuracy_decay,
            range,
        },
        sound_emission: sound,
        heat_emission: heat,
        reaction_time: reaction,
    }
}

fn projectile(
    name: &str,
    damage: Damage,
    (min_range, max_range, impact_radius, impact_damage_decay): (i32, i32, i32, i32),
    (sound, heat, reaction): (i32, i32, u32),
) -> WeaponConfig {
    WeaponConfig {
        name: name.to_string(),
        damage,
        kind: WeaponKind::Projectile {
            min_range,
            max_range,
            impact_radius,
            impact_damage_decay,
        },
        sound_emission: sound,
        heat_emission: heat,
        reaction_time: reaction,
    }
}

// Straight-firing weapons

/// Assault rifle.
#[must_use]
pub fn assault_rifle() -> WeaponConfig {
    straight("assault rifle", Damage::new(80, 3), (0.75, 0.03, 8), (6, 4, 40))
}

/// Submachine gun.
#[must_use]
pub fn submachine_gun() -> WeaponConfig {
    straight("submachine gun", Damage::new(70, 2), (0.9, 0.03, 6), (5, 3, 65))
}

/// Pistol.
#[must_use]
pub fn pistol() -> WeaponConfig {
    straight("pistol", Damage::new(60, 2), (0.95, 0.02, 5), (4, 2, 90))
}

/// Sniper rifle. Accuracy improves with distance.
#[must_use]
pub fn sniper_rifle() -> WeaponConfig {
    straight("sniper rifle", Damage::new(100, 4), (0.2, -0.03, 12), (8, 5, 10))
}

/// Shotgun.
#[must_use]
pub fn shotgun() -> WeaponConfig {
    straight("shotgun", Damage::new(100, 1), (1.0, 0.15, 4), (7, 4, 30))
}

// Projectile weapons

/// Impact grenade.
#[must_use]
pub fn impact_grenade() -> WeaponConfig {
    projectile("impact grenade", Damage::new(40, 0), (4, 6, 3, 10), (4, 2, 60))
}

/// Fragmentation grenade.
#[must_use]
pub fn frag_grenade() -> WeaponConfig {
    projectile("frag grenade", Damage::new(60, 2), (3, 6, 2, 20), (5, 3, 30))
}

/// Breaching grenade. Low damage, but opens any hard obstacle.
#[must_use]
pub fn breaching_grenade() -> WeaponConfig {
    projectile("breaching grenade", Damage::new(10, 5), (3, 5, 2, 0), (5, 2, 80))
}

// Gadgets

/// Deployable barricade: places a hard obstacle next to the robot.
#[must_use]
pub fn deployable_barricade() -> GadgetConfig {
    GadgetConfig {
        name: "deployable barricade".to_string(),
        kind: GadgetKind::Barricade { hp: 200, armor: 5 },
        uses: 2,
        refill_every: 0,
        reaction_time: 10,
        sound_emission: 2,
        heat_emission: 0,
    }
}

/// EMP grenade: knocks out sensors, gadgets and vision.
#[must_use]
pub fn emp_grenade() -> GadgetConfig {
    GadgetConfig {
        name: "EMP grenade".to_string(),
        kind: GadgetKind::AreaStatus {
            min_range: 2,
            max_range: 5,
            impact_radius: 2,
            effect: StatusEffect::new(
                CapabilityFlags::SENSE | CapabilityFlags::GADGET | CapabilityFlags::VISION,
                2,
            ),
            lingering_rounds: 1,
        },
        uses: 1,
        refill_every: 10,
        reaction_time: 50,
        sound_emission: 3,
        heat_emission: 1,
    }
}

/// Flashbang: blinds and stalls for a moment.
#[must_use]
pub fn flashbang() -> GadgetConfig {
    GadgetConfig {
        name: "flashbang".to_string(),
        kind: GadgetKind::AreaStatus {
            min_range: 1,
            max_range: 4,
            impact_radius: 1,
            effect: StatusEffect::new(CapabilityFlags::VISION | CapabilityFlags::FIRE, 2),
            lingering_rounds: 0,
        },
        uses: 2,
        refill_every: 0,
        reaction_time: 70,
        sound_emission: 6,
        heat_emission: 2,
    }
}

// Sensors

/// Listens for sound in a radius of 2.
#[must_use]
pub fn sound_sensor() -> SensorConfig {
    SensorConfig {
        name: "sound sensor".to_string(),
        kind: SensorKind::Signal {
            signal: Signal::Sound,
            radius: 2,
        },
        sound_emission: 0,
        heat_emission: 0,
    }
}

/// Reads heat in a radius of 2.
#[must_use]
pub fn heat_sensor() -> SensorConfig {
    SensorConfig {
        name: "heat sensor".to_string(),
        kind: SensorKind::Signal {
            signal: Signal::Heat,
            radius: 2,
        },
        sound_emission: 0,
        heat_emission: 0,
    }
}

/// Reveals occupants in a radius of 2.
#[must_use]
pub fn lidar() -> SensorConfig {
    SensorConfig {
        name: "lidar".to_string(),
        kind: SensorKind::Lidar { radius: 2 },
        sound_emission: 1,
        heat_emission: 1,
    }
}

/// Scouting drone with a path of up to five steps.
#[must_use]
pub fn drone() -> SensorConfig {
    SensorConfig {
        name: "drone".to_string(),
        kind: SensorKind::Drone {
            radius: 1,
            max_path: 5,
        },
        sound_emission: 2,
        heat_emission: 1,
    }
}

/// Scout car that drives up to six cells and clears up to two soft obstacles.
#[must_use]
pub fn scout_car() -> SensorConfig {
    SensorConfig {
        name: "scout car".to_string(),
        kind: SensorKind::ScoutCar {
            radius: 1,
            range: 6,
            removal_budget: 2,
        },
        sound_emission: 3,
        heat_emission: 2,
    }
}

/// The default chassis with a balanced loadout.
#[must_use]
pub fn standard_robot() -> RobotConfig {
    RobotConfig {
        name: "standard".to_string(),
        hp: 100,
        armor: ArmorConfig::default(),
        move_sound: 5,
        move_heat: 3,
        move_priority: 50,
        sensors: vec![sound_sensor(), heat_sensor(), lidar(), drone(), scout_car()],
        weapons: vec![assault_rifle(), frag_grenade()],
        gadgets: vec![deployable_barricade(), emp_grenade()],
    }
}
