//! Live view
//!
//! Flat-colored sprites for the stage, props, combatants and projectiles, plus a
//! camera that follows the combatants still in play. Only added in windowed mode;
//! nothing here writes simulation state.

use bevy::app::AppExit;
use bevy::color::{Alpha, Mix};
use bevy::prelude::*;

use crate::states::play_match::constants::{PLAYER_COLORS, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::states::play_match::{
    AnimationFlags, Body, Combatant, ControlState, Facing, MatchOutcome, Platform, Projectile,
    Prop,
};

/// World units per screen pixel.
const CAMERA_SCALE: f32 = 0.025;
/// How quickly the camera catches up with the combatants (per second).
const CAMERA_FOLLOW_RATE: f32 = 3.0;

const PLATFORM_COLOR: Color = Color::srgb(0.35, 0.38, 0.45);
const LEDGE_COLOR: Color = Color::srgb(0.55, 0.6, 0.7);
const PROP_COLOR: Color = Color::srgb(0.6, 0.45, 0.3);
const PROJECTILE_COLOR: Color = Color::srgb(1.0, 0.9, 0.3);

/// Plugin for the windowed presentation of a match
pub struct ViewPlugin;

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera).add_systems(
            Update,
            (
                attach_stage_sprites,
                attach_combatant_sprites,
                attach_projectile_sprites,
                update_combatant_sprites,
                follow_combatants,
                announce_outcome,
                handle_escape_key,
            ),
        );
    }
}

/// Marker for the match camera
#[derive(Component)]
pub struct MainCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: CAMERA_SCALE,
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(0.0, 2.0, 0.0),
        MainCamera,
    ));
}

fn attach_stage_sprites(
    mut commands: Commands,
    platforms: Query<(Entity, &Platform), Added<Platform>>,
    props: Query<(Entity, &Body), Added<Prop>>,
) {
    for (entity, platform) in platforms.iter() {
        let color = if platform.main { PLATFORM_COLOR } else { LEDGE_COLOR };
        commands.entity(entity).insert(Sprite {
            color,
            custom_size: Some(platform.half_extents * 2.0),
            ..default()
        });
    }
    for (entity, body) in props.iter() {
        commands.entity(entity).insert(Sprite {
            color: PROP_COLOR,
            custom_size: Some(body.half_extents * 2.0),
            ..default()
        });
    }
}

fn attach_combatant_sprites(
    mut commands: Commands,
    combatants: Query<(Entity, &Combatant), Added<Combatant>>,
) {
    for (entity, combatant) in combatants.iter() {
        let color = PLAYER_COLORS[combatant.slot % PLAYER_COLORS.len()];
        commands.entity(entity).insert(Sprite {
            color,
            custom_size: Some(Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            ..default()
        });
    }
}

fn attach_projectile_sprites(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile), Added<Projectile>>,
) {
    for (entity, projectile) in projectiles.iter() {
        commands.entity(entity).insert(Sprite {
            color: PROJECTILE_COLOR,
            custom_size: Some(Vec2::splat(projectile.radius * 2.0)),
            ..default()
        });
    }
}

/// Hide combatants out of play, mirror facing, tint inert, hurt and launched states.
fn update_combatant_sprites(
    mut combatants: Query<(&Combatant, &AnimationFlags, &mut Sprite, &mut Visibility)>,
) {
    for (combatant, flags, mut sprite, mut visibility) in combatants.iter_mut() {
        *visibility = if combatant.lifecycle.is_active() {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        sprite.flip_x = combatant.facing == Facing::Left;

        let base = PLAYER_COLORS[combatant.slot % PLAYER_COLORS.len()];
        sprite.color = if combatant.control == ControlState::Inert {
            base.with_alpha(0.3)
        } else if flags.launched {
            Color::WHITE
        } else if flags.hit {
            base.mix(&Color::WHITE, 0.5)
        } else if combatant.is_invulnerable() {
            base.with_alpha(0.6)
        } else {
            base
        };
    }
}

/// Ease the camera toward the midpoint of the combatants in play.
fn follow_combatants(
    time: Res<Time>,
    combatants: Query<(&Combatant, &Transform), Without<MainCamera>>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut camera_transform) = camera.get_single_mut() else {
        return;
    };
    let positions: Vec<Vec2> = combatants
        .iter()
        .filter(|(c, _)| c.lifecycle.is_active())
        .map(|(_, t)| t.translation.truncate())
        .collect();
    if positions.is_empty() {
        return;
    }

    let center = positions.iter().sum::<Vec2>() / positions.len() as f32;
    let current = camera_transform.translation.truncate();
    let t = (CAMERA_FOLLOW_RATE * time.delta_secs()).min(1.0);
    let next = current.lerp(center, t);
    camera_transform.translation.x = next.x;
    camera_transform.translation.y = next.y;
}

fn announce_outcome(outcome: Option<Res<MatchOutcome>>) {
    let Some(outcome) = outcome else {
        return;
    };
    if !outcome.is_added() {
        return;
    }
    match outcome.winner {
        Some(slot) => info!("Player {} wins! Press Escape to quit.", slot + 1),
        None => info!("No survivors. Press Escape to quit."),
    }
}

fn handle_escape_key(keyboard: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}
