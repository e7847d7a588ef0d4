//! Projectile Systems
//!
//! The one-shot special projectile travels in a straight line, despawns when its
//! lifetime runs out, and hits at most one combatant: the first non-owner it touches.
//! Invulnerable combatants are passed through, so a freshly respawned player never
//! uses up someone's projectile.

use bevy::prelude::*;

use crate::combat::events::{KnockbackRequest, ProjectileExpiredEvent};
use super::attacks::Aabb;
use super::components::{Body, Combatant, MatchClock, Projectile};
use super::knockback::AttackCategory;

/// Whether a circle overlaps an axis-aligned box.
pub fn circle_overlaps(center: Vec2, radius: f32, bounds: &Aabb) -> bool {
    let min = bounds.center - bounds.half_extents;
    let max = bounds.center + bounds.half_extents;
    let closest = center.clamp(min, max);
    center.distance_squared(closest) <= radius * radius
}

/// Advance projectiles and despawn the ones whose lifetime ran out.
pub fn move_projectiles(
    mut commands: Commands,
    clock: Res<MatchClock>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    mut expired: EventWriter<ProjectileExpiredEvent>,
) {
    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        let step = projectile.direction * projectile.speed * clock.dt;
        transform.translation += step.extend(0.0);
        projectile.lifetime -= clock.dt;
        if projectile.lifetime <= 0.0 {
            expired.send(ProjectileExpiredEvent {
                owner: projectile.owner,
                projectile: entity,
            });
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// A combatant a projectile may collide with this tick.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileTarget {
    pub entity: Entity,
    pub bounds: Aabb,
    pub invulnerable: bool,
}

/// First candidate, in slot order, that `projectile` at `position` hits.
pub fn first_projectile_target(
    projectile: &Projectile,
    position: Vec2,
    candidates: &[ProjectileTarget],
) -> Option<Entity> {
    candidates
        .iter()
        .find(|target| {
            target.entity != projectile.owner
                && !target.invulnerable
                && circle_overlaps(position, projectile.radius, &target.bounds)
        })
        .map(|target| target.entity)
}

/// Hit the first vulnerable non-owner combatant each projectile touches, then despawn it.
pub fn process_projectile_hits(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile, &Transform)>,
    combatants: Query<(Entity, &Combatant, &Transform, &Body)>,
    mut requests: EventWriter<KnockbackRequest>,
) {
    let mut targets: Vec<(usize, ProjectileTarget)> = combatants
        .iter()
        .filter(|(_, c, _, _)| c.is_hittable())
        .map(|(entity, c, transform, body)| {
            (
                c.slot,
                ProjectileTarget {
                    entity,
                    bounds: Aabb::new(transform.translation.truncate(), body.half_extents),
                    invulnerable: c.is_invulnerable(),
                },
            )
        })
        .collect();
    targets.sort_by_key(|(slot, _)| *slot);
    let candidates: Vec<ProjectileTarget> = targets.into_iter().map(|(_, t)| t).collect();

    for (entity, projectile, transform) in projectiles.iter() {
        if projectile.lifetime <= 0.0 {
            continue;
        }
        let position = transform.translation.truncate();
        let Some(target) = first_projectile_target(projectile, position, &candidates) else {
            continue;
        };

        requests.send(KnockbackRequest {
            attacker: projectile.owner,
            attacker_position: position,
            target,
            base: projectile.knockback,
            category: AttackCategory::Projectile,
        });
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_touching_box_edge() {
        let bounds = Aabb::new(Vec2::ZERO, Vec2::new(0.4, 0.8));
        assert!(circle_overlaps(Vec2::new(0.7, 0.0), 0.35, &bounds));
        assert!(!circle_overlaps(Vec2::new(0.8, 0.0), 0.35, &bounds));
    }

    fn projectile(owner: Entity) -> Projectile {
        Projectile {
            owner,
            direction: Vec2::X,
            speed: 14.0,
            knockback: 10.0,
            lifetime: 2.0,
            radius: 0.35,
        }
    }

    fn target(entity: Entity, x: f32, invulnerable: bool) -> ProjectileTarget {
        ProjectileTarget {
            entity,
            bounds: Aabb::new(Vec2::new(x, 0.0), Vec2::new(0.4, 0.8)),
            invulnerable,
        }
    }

    #[test]
    fn test_invulnerable_target_is_passed_through() {
        let owner = Entity::from_raw(1);
        let shielded = Entity::from_raw(2);
        let exposed = Entity::from_raw(3);
        let candidates = [target(shielded, 0.0, true), target(exposed, 0.2, false)];

        let hit = first_projectile_target(&projectile(owner), Vec2::ZERO, &candidates);
        assert_eq!(hit, Some(exposed));

        let only_shielded = [target(shielded, 0.0, true)];
        assert_eq!(
            first_projectile_target(&projectile(owner), Vec2::ZERO, &only_shielded),
            None
        );
    }

    #[test]
    fn test_owner_is_never_hit() {
        let owner = Entity::from_raw(1);
        let candidates = [target(owner, 0.0, false)];
        assert_eq!(
            first_projectile_target(&projectile(owner), Vec2::ZERO, &candidates),
            None
        );
    }

    #[test]
    fn test_circle_near_corner() {
        let bounds = Aabb::new(Vec2::ZERO, Vec2::new(0.4, 0.8));
        assert!(!circle_overlaps(Vec2::new(0.7, 1.1), 0.35, &bounds));
        assert!(circle_overlaps(Vec2::new(0.6, 0.9), 0.35, &bounds));
    }
}
