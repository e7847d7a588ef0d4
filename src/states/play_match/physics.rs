//! Physics Step
//!
//! Minimal kinematic platformer physics run once per tick after the controller:
//! gravity, integration, landing on platforms and solid main floors. Also the
//! downward ground probe the controller reads at the start of each tick.

use bevy::prelude::*;

use super::components::{Body, Combatant, ControlState, MatchClock, Platform, Prop};
use super::constants::{
    DROP_PROBE_DISTANCE, GRAVITY, GROUND_PROBE_DISTANCE, MAX_FALL_SPEED, NARROW_PROBE_INSET,
    PROP_GROUND_FRICTION, WIDE_PROBE_MARGIN,
};
use super::locomotion::GroundContact;

/// Feet may sink this far into a platform top and still count as standing on it.
const LANDING_TOLERANCE: f32 = 0.05;

/// Platform geometry snapshot for probing and collision.
#[derive(Debug, Clone, Copy)]
pub struct PlatformSample {
    pub entity: Entity,
    pub center: Vec2,
    pub platform: Platform,
}

impl PlatformSample {
    pub fn top(&self) -> f32 {
        self.center.y + self.platform.half_extents.y
    }

    fn spans(&self, min_x: f32, max_x: f32) -> bool {
        let left = self.center.x - self.platform.half_extents.x;
        let right = self.center.x + self.platform.half_extents.x;
        max_x > left && min_x < right
    }
}

fn collect_platforms(platforms: &Query<(Entity, &Transform, &Platform)>) -> Vec<PlatformSample> {
    platforms
        .iter()
        .map(|(entity, transform, platform)| PlatformSample {
            entity,
            center: transform.translation.truncate(),
            platform: *platform,
        })
        .collect()
}

/// Probe straight down from the feet over `[min_x, max_x]`; returns the highest hit.
fn probe_span(
    feet_y: f32,
    min_x: f32,
    max_x: f32,
    body: &Body,
    platforms: &[PlatformSample],
) -> Option<(PlatformSample, f32)> {
    platforms
        .iter()
        .filter(|p| !body.ignores(p.entity) && p.spans(min_x, max_x))
        .filter_map(|p| {
            let gap = feet_y - p.top();
            (-LANDING_TOLERANCE..=GROUND_PROBE_DISTANCE)
                .contains(&gap)
                .then_some((*p, gap))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Grounded check: a narrow probe under the body, falling back to a wider one when
/// the narrow probe misses (standing on a ledge corner).
pub fn probe_ground_contact(
    position: Vec2,
    body: &Body,
    platforms: &[PlatformSample],
) -> Option<GroundContact> {
    if !body.collider_enabled || body.velocity.y > 0.0 {
        return None;
    }
    let feet_y = position.y - body.half_extents.y;
    let narrow = (body.half_extents.x - NARROW_PROBE_INSET).max(0.0);
    let wide = body.half_extents.x + WIDE_PROBE_MARGIN;

    let (sample, gap) =
        probe_span(feet_y, position.x - narrow, position.x + narrow, body, platforms)
            .or_else(|| probe_span(feet_y, position.x - wide, position.x + wide, body, platforms))?;

    Some(GroundContact {
        platform: sample.entity,
        droppable: sample.platform.one_way
            && !sample.platform.main
            && gap <= DROP_PROBE_DISTANCE,
    })
}

/// Refresh every live combatant's grounded state.
pub fn probe_ground(
    platforms: Query<(Entity, &Transform, &Platform)>,
    mut combatants: Query<(&mut Combatant, &Transform, &Body)>,
) {
    let samples = collect_platforms(&platforms);
    if samples.is_empty() {
        warn!("No platforms in the stage, ground probe skipped");
        return;
    }
    for (mut combatant, transform, body) in combatants.iter_mut() {
        if combatant.control == ControlState::Inert || !combatant.lifecycle.is_active() {
            continue;
        }
        let contact = probe_ground_contact(transform.translation.truncate(), body, &samples);
        combatant.locomotion.set_ground(contact);
    }
}

/// Advance one body by `dt` and resolve platform collisions. Returns whether the
/// body ended the step resting on a platform.
pub fn step_body(
    position: &mut Vec2,
    body: &mut Body,
    dt: f32,
    platforms: &[PlatformSample],
) -> bool {
    body.velocity.y = (body.velocity.y - GRAVITY * dt).max(-MAX_FALL_SPEED);
    let previous = *position;
    *position += body.velocity * dt;

    if !body.collider_enabled {
        return false;
    }

    let half = body.half_extents;
    let previous_feet = previous.y - half.y;
    let mut landed = false;

    // Landing from above, on any platform kind.
    if body.velocity.y <= 0.0 {
        let feet = position.y - half.y;
        let landing = platforms
            .iter()
            .filter(|p| !body.ignores(p.entity))
            .filter(|p| p.spans(position.x - half.x, position.x + half.x))
            .filter(|p| previous_feet >= p.top() - LANDING_TOLERANCE && feet <= p.top())
            .map(|p| p.top())
            .max_by(|a, b| a.total_cmp(b));
        if let Some(top) = landing {
            position.y = top + half.y;
            body.velocity.y = 0.0;
            landed = true;
        }
    }

    // Solid floors push out from the sides and from below.
    for p in platforms.iter() {
        if p.platform.one_way || body.ignores(p.entity) {
            continue;
        }
        let delta = *position - p.center;
        let overlap = half + p.platform.half_extents - delta.abs();
        if overlap.x <= 0.0 || overlap.y <= 0.0 {
            continue;
        }
        if overlap.x < overlap.y {
            position.x += overlap.x * delta.x.signum();
            if body.velocity.x * delta.x < 0.0 {
                body.velocity.x = 0.0;
            }
        } else if delta.y >= 0.0 {
            position.y += overlap.y;
            body.velocity.y = body.velocity.y.max(0.0);
            landed = true;
        } else {
            position.y -= overlap.y;
            body.velocity.y = body.velocity.y.min(0.0);
        }
    }

    landed
}

/// Integrate every simulated body.
pub fn integrate_bodies(
    clock: Res<MatchClock>,
    platforms: Query<(Entity, &Transform, &Platform)>,
    mut bodies: Query<(&mut Transform, &mut Body, Has<Prop>), Without<Platform>>,
) {
    let samples = collect_platforms(&platforms);
    for (mut transform, mut body, is_prop) in bodies.iter_mut() {
        if !body.simulated {
            continue;
        }
        let mut position = transform.translation.truncate();
        let resting = step_body(&mut position, &mut body, clock.dt, &samples);
        if is_prop && resting {
            let damping = (1.0 - PROP_GROUND_FRICTION * clock.dt).max(0.0);
            body.velocity.x *= damping;
        }
        transform.translation = position.extend(transform.translation.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn floor() -> PlatformSample {
        PlatformSample {
            entity: Entity::from_raw(1),
            center: Vec2::new(0.0, -1.0),
            platform: Platform {
                half_extents: Vec2::new(5.0, 1.0),
                one_way: false,
                main: true,
            },
        }
    }

    fn ledge() -> PlatformSample {
        PlatformSample {
            entity: Entity::from_raw(2),
            center: Vec2::new(0.0, 3.0),
            platform: Platform {
                half_extents: Vec2::new(2.0, 0.15),
                one_way: true,
                main: false,
            },
        }
    }

    fn body() -> Body {
        Body::new(Vec2::new(0.4, 0.8))
    }

    #[test]
    fn test_body_falls_and_lands_on_floor() {
        let platforms = [floor()];
        let mut b = body();
        let mut pos = Vec2::new(0.0, 3.0);
        let mut landed = false;
        for _ in 0..120 {
            landed = step_body(&mut pos, &mut b, DT, &platforms);
        }
        assert!(landed);
        assert!((pos.y - 0.8).abs() < 1e-4);
        assert_eq!(b.velocity.y, 0.0);
    }

    #[test]
    fn test_one_way_passable_from_below() {
        let platforms = [ledge()];
        let mut b = body();
        b.velocity.y = 13.0;
        let mut pos = Vec2::new(0.0, 2.0);
        step_body(&mut pos, &mut b, DT, &platforms);
        assert!(pos.y > 2.0);
        assert!(b.velocity.y > 0.0);
    }

    #[test]
    fn test_ignored_platform_is_fallen_through() {
        let platforms = [ledge()];
        let mut b = body();
        b.ignored_platforms.insert(ledge().entity, 1);
        let mut pos = Vec2::new(0.0, ledge().top() + 0.8);
        for _ in 0..10 {
            step_body(&mut pos, &mut b, DT, &platforms);
        }
        assert!(pos.y < ledge().top());
    }

    #[test]
    fn test_solid_floor_pushes_out_sideways() {
        let platforms = [floor()];
        let mut b = body();
        b.velocity.x = 5.0;
        // below the floor top, pressing into its left edge
        let mut pos = Vec2::new(-5.3, -1.0);
        step_body(&mut pos, &mut b, DT, &platforms);
        assert!(pos.x <= -5.4 + 1e-4);
        assert_eq!(b.velocity.x, 0.0);
    }

    #[test]
    fn test_narrow_probe_miss_falls_back_to_wide() {
        let platforms = [floor()];
        let b = body();
        // body center just past the floor's right edge
        let pos = Vec2::new(5.3, 0.8);
        let contact = probe_ground_contact(pos, &b, &platforms).expect("wide probe should hit");
        assert_eq!(contact.platform, floor().entity);
        assert!(!contact.droppable);
    }

    #[test]
    fn test_probe_reports_droppable_ledge() {
        let platforms = [floor(), ledge()];
        let b = body();
        let pos = Vec2::new(0.0, ledge().top() + 0.8);
        let contact = probe_ground_contact(pos, &b, &platforms).expect("standing on ledge");
        assert_eq!(contact.platform, ledge().entity);
        assert!(contact.droppable);
    }

    #[test]
    fn test_rising_body_is_not_grounded() {
        let platforms = [floor()];
        let mut b = body();
        b.velocity.y = 3.0;
        assert!(probe_ground_contact(Vec2::new(0.0, 0.8), &b, &platforms).is_none());
    }
}
