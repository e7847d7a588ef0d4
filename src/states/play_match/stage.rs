//! Stage Layouts
//!
//! Static platform geometry, slot spawn anchors and scenery props for each stage.
//! Every stage has exactly one solid main floor; the remaining platforms are one-way.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{Body, Facing, Platform, PlayMatchEntity, Prop, SpawnPoint};
use super::constants::{MAX_PLAYERS, PLAYER_HEIGHT};

/// Selectable stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StageId {
    #[default]
    Battlefield,
    Plateau,
}

impl StageId {
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Battlefield => "Battlefield",
            StageId::Plateau => "Plateau",
        }
    }

    pub fn all() -> &'static [StageId] {
        &[StageId::Battlefield, StageId::Plateau]
    }

    pub fn layout(&self) -> StageLayout {
        match self {
            StageId::Battlefield => StageLayout {
                main_floor: PlatformSpec::solid(Vec2::new(0.0, -1.0), Vec2::new(9.0, 1.0)),
                ledges: vec![
                    PlatformSpec::one_way(Vec2::new(-5.0, 3.0), 2.0),
                    PlatformSpec::one_way(Vec2::new(5.0, 3.0), 2.0),
                    PlatformSpec::one_way(Vec2::new(0.0, 6.0), 2.2),
                ],
                spawns: [
                    (Vec2::new(-6.0, 0.0), Facing::Right),
                    (Vec2::new(6.0, 0.0), Facing::Left),
                    (Vec2::new(-5.0, 3.15), Facing::Right),
                    (Vec2::new(5.0, 3.15), Facing::Left),
                ],
                props: vec![PropSpec {
                    position: Vec2::new(-2.5, 0.0),
                    half_extents: Vec2::splat(0.4),
                }],
            },
            StageId::Plateau => StageLayout {
                main_floor: PlatformSpec::solid(Vec2::new(0.0, -1.0), Vec2::new(7.0, 1.0)),
                ledges: vec![
                    PlatformSpec::one_way(Vec2::new(-4.0, 2.5), 1.8),
                    PlatformSpec::one_way(Vec2::new(4.0, 2.5), 1.8),
                ],
                spawns: [
                    (Vec2::new(-5.0, 0.0), Facing::Right),
                    (Vec2::new(5.0, 0.0), Facing::Left),
                    (Vec2::new(-2.0, 0.0), Facing::Right),
                    (Vec2::new(2.0, 0.0), Facing::Left),
                ],
                props: vec![
                    PropSpec {
                        position: Vec2::new(0.0, 0.0),
                        half_extents: Vec2::new(0.5, 0.35),
                    },
                ],
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformSpec {
    pub center: Vec2,
    pub platform: Platform,
}

impl PlatformSpec {
    fn solid(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            platform: Platform {
                half_extents,
                one_way: false,
                main: true,
            },
        }
    }

    fn one_way(center: Vec2, half_width: f32) -> Self {
        Self {
            center,
            platform: Platform {
                half_extents: Vec2::new(half_width, 0.15),
                one_way: true,
                main: false,
            },
        }
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.platform.half_extents.y
    }
}

/// Scenery prop resting on the floor at `position` (bottom center).
#[derive(Debug, Clone, Copy)]
pub struct PropSpec {
    pub position: Vec2,
    pub half_extents: Vec2,
}

/// Full description of a stage.
#[derive(Debug, Clone)]
pub struct StageLayout {
    pub main_floor: PlatformSpec,
    pub ledges: Vec<PlatformSpec>,
    /// Feet position and facing of each slot's spawn anchor
    pub spawns: [(Vec2, Facing); MAX_PLAYERS],
    pub props: Vec<PropSpec>,
}

impl StageLayout {
    pub fn platforms(&self) -> impl Iterator<Item = &PlatformSpec> {
        std::iter::once(&self.main_floor).chain(self.ledges.iter())
    }

    /// Body center of a combatant standing on the spawn anchor of `slot`.
    pub fn spawn_center(&self, slot: usize) -> Option<(Vec2, Facing)> {
        self.spawns
            .get(slot)
            .map(|(feet, facing)| (*feet + Vec2::new(0.0, PLAYER_HEIGHT * 0.5), *facing))
    }
}

/// Entities spawned for a stage.
#[derive(Debug, Clone, Default)]
pub struct SpawnedStage {
    pub anchors: Vec<Entity>,
}

/// Spawn platforms, spawn anchors and props for `stage`.
pub fn spawn_stage(commands: &mut Commands, stage: StageId) -> SpawnedStage {
    let layout = stage.layout();

    for spec in layout.platforms() {
        commands.spawn((
            spec.platform,
            Transform::from_translation(spec.center.extend(0.0)),
            PlayMatchEntity,
        ));
    }

    let anchors = (0..MAX_PLAYERS)
        .filter_map(|slot| layout.spawn_center(slot).map(|(center, _)| (slot, center)))
        .map(|(slot, center)| {
            commands
                .spawn((
                    SpawnPoint { slot },
                    Transform::from_translation(center.extend(0.0)),
                    PlayMatchEntity,
                ))
                .id()
        })
        .collect();

    for prop in &layout.props {
        let center = prop.position + Vec2::new(0.0, prop.half_extents.y);
        commands.spawn((
            Prop,
            Body::new(prop.half_extents),
            Transform::from_translation(center.extend(0.0)),
            PlayMatchEntity,
        ));
    }

    info!(
        "Stage {} spawned: {} platforms, {} props",
        stage.name(),
        layout.ledges.len() + 1,
        layout.props.len()
    );

    SpawnedStage { anchors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stage_has_one_main_floor() {
        for stage in StageId::all() {
            let layout = stage.layout();
            let mains = layout.platforms().filter(|p| p.platform.main).count();
            assert_eq!(mains, 1, "{}", stage.name());
            assert!(layout.ledges.iter().all(|l| l.platform.one_way && !l.platform.main));
        }
    }

    #[test]
    fn test_spawns_stand_on_a_platform() {
        for stage in StageId::all() {
            let layout = stage.layout();
            for (feet, _) in layout.spawns.iter() {
                let supported = layout.platforms().any(|p| {
                    (p.top() - feet.y).abs() < 1e-4
                        && (feet.x - p.center.x).abs() <= p.platform.half_extents.x
                });
                assert!(supported, "{} spawn {:?} floats", stage.name(), feet);
            }
        }
    }

    #[test]
    fn test_stage_id_serde_names() {
        let stage: StageId = serde_json::from_str("\"Plateau\"").expect("parses");
        assert_eq!(stage, StageId::Plateau);
    }
}
