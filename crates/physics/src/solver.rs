//! Collision solvers.
//!
//! Hard collisions go through two solvers in order: the impulse solver
//! corrects velocities, the smooth position solver corrects leftover
//! penetration without injecting energy. Non-dynamic bodies contribute
//! zero inverse mass and are never displaced.

use glam::Vec2;
use wallball_core::ComponentPool;

use crate::body::Rigidbody;
use crate::collider::Collision;

/// Velocity correction through restitution and Coulomb friction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpulseSolver;

impl ImpulseSolver {
    pub fn solve(&self, collisions: &[Collision], bodies: &mut ComponentPool<Rigidbody>) {
        for collision in collisions {
            let mut a = bodies.get(collision.entity_a).clone();
            let mut b = bodies.get(collision.entity_b).clone();

            let inv_a = if a.is_dynamic() { a.inv_mass() } else { 0.0 };
            let inv_b = if b.is_dynamic() { b.inv_mass() } else { 0.0 };
            let inv_sum = inv_a + inv_b;
            if inv_sum == 0.0 {
                continue;
            }

            let normal = collision.manifold.normal;
            let relative_velocity = b.velocity() - a.velocity();
            let normal_speed = relative_velocity.dot(normal);

            // Already separating.
            if normal_speed >= 0.0 {
                continue;
            }

            let restitution = a.restitution().min(b.restitution());
            let j = -(1.0 + restitution) * normal_speed / inv_sum;
            let impulse = normal * j;

            if a.is_dynamic() {
                a.set_velocity(a.velocity() - impulse * inv_a);
            }
            if b.is_dynamic() {
                b.set_velocity(b.velocity() + impulse * inv_b);
            }

            // Coulomb friction along the contact tangent.
            let relative_velocity = b.velocity() - a.velocity();
            let normal_speed = relative_velocity.dot(normal);
            let tangent = relative_velocity - normal * normal_speed;
            if tangent.length() > 1e-4 {
                let tangent = tangent.normalize();
                let tangent_speed = relative_velocity.dot(tangent);

                let mu_static = Vec2::new(a.static_friction(), b.static_friction()).length();
                let mu_dynamic = Vec2::new(a.dynamic_friction(), b.dynamic_friction()).length();

                let f = -tangent_speed / inv_sum;
                let friction = if f.abs() < j * mu_static {
                    tangent * f
                } else {
                    tangent * (-j * mu_dynamic)
                };

                if a.is_dynamic() {
                    a.set_velocity(a.velocity() - friction * inv_a);
                }
                if b.is_dynamic() {
                    b.set_velocity(b.velocity() + friction * inv_b);
                }
            }

            bodies.set(collision.entity_a, a);
            bodies.set(collision.entity_b, b);
        }
    }
}

/// Positional correction with a percent-slop scheme. Prevents bodies
/// from sinking into each other without adding velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothPositionSolver;

impl SmoothPositionSolver {
    /// Fraction of the penetration corrected per step.
    const PERCENT: f32 = 0.8;
    /// Penetration tolerated before any correction.
    const SLOP: f32 = 0.01;

    pub fn solve(&self, collisions: &[Collision], bodies: &mut ComponentPool<Rigidbody>) {
        for collision in collisions {
            let mut a = bodies.get(collision.entity_a).clone();
            let mut b = bodies.get(collision.entity_b).clone();

            let inv_a = if a.is_dynamic() { a.inv_mass() } else { 0.0 };
            let inv_b = if b.is_dynamic() { b.inv_mass() } else { 0.0 };
            let inv_sum = inv_a + inv_b;
            if inv_sum == 0.0 {
                continue;
            }

            let depth = (collision.manifold.depth - Self::SLOP).max(0.0);
            let correction = collision.manifold.normal * (Self::PERCENT * depth / inv_sum);

            if a.is_dynamic() {
                a.set_position(a.position() - correction * inv_a);
            }
            if b.is_dynamic() {
                b.set_position(b.position() + correction * inv_b);
            }

            bodies.set(collision.entity_a, a);
            bodies.set(collision.entity_b, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use wallball_core::{ComponentMask, ComponentPool, Entity, EntityRegistry};

    use super::*;
    use crate::body::{BodyType, Rigidbody};
    use crate::collider::{Collision, Manifold};

    fn two_bodies() -> (EntityRegistry, ComponentPool<Rigidbody>, Entity, Entity) {
        let mut registry = EntityRegistry::new();
        let mut bodies: ComponentPool<Rigidbody> = ComponentPool::new(ComponentMask::RIGIDBODY);
        let a = registry.create_entity();
        let b = registry.create_entity();
        bodies.add_component(&mut registry, a);
        bodies.add_component(&mut registry, b);
        (registry, bodies, a, b)
    }

    fn head_on(bodies: &mut ComponentPool<Rigidbody>, a: Entity, b: Entity, restitution: f32) {
        for (entity, velocity) in [(a, Vec2::new(1.0, 0.0)), (b, Vec2::new(-1.0, 0.0))] {
            let body = bodies.get_mut(entity);
            body.set_body_type(BodyType::Dynamic);
            body.set_mass(1.0);
            body.set_restitution(restitution);
            body.set_velocity(velocity);
        }
    }

    fn contact(a: Entity, b: Entity, depth: f32) -> Collision {
        Collision {
            entity_a: a,
            entity_b: b,
            manifold: Manifold {
                has_collision: true,
                a: Vec2::ZERO,
                b: Vec2::ZERO,
                normal: Vec2::new(1.0, 0.0),
                depth,
            },
        }
    }

    #[test]
    fn inelastic_impact_separates() {
        let (_registry, mut bodies, a, b) = two_bodies();
        head_on(&mut bodies, a, b, 0.0);

        ImpulseSolver.solve(&[contact(a, b, 0.1)], &mut bodies);

        // With e = 0 the post-impact relative normal velocity must be
        // non-negative.
        let relative = bodies.get(b).velocity() - bodies.get(a).velocity();
        assert!(relative.dot(Vec2::new(1.0, 0.0)) >= 0.0);
    }

    #[test]
    fn elastic_impact_reflects() {
        let (_registry, mut bodies, a, b) = two_bodies();
        head_on(&mut bodies, a, b, 1.0);

        ImpulseSolver.solve(&[contact(a, b, 0.1)], &mut bodies);

        // Equal masses, e = 1: velocities swap.
        assert!((bodies.get(a).velocity().x - -1.0).abs() < 1e-5);
        assert!((bodies.get(b).velocity().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn separating_contact_is_skipped() {
        let (_registry, mut bodies, a, b) = two_bodies();
        head_on(&mut bodies, a, b, 1.0);
        bodies.get_mut(a).set_velocity(Vec2::new(-1.0, 0.0));
        bodies.get_mut(b).set_velocity(Vec2::new(1.0, 0.0));

        ImpulseSolver.solve(&[contact(a, b, 0.1)], &mut bodies);

        assert_eq!(bodies.get(a).velocity(), Vec2::new(-1.0, 0.0));
        assert_eq!(bodies.get(b).velocity(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn static_body_is_never_moved() {
        let (_registry, mut bodies, a, b) = two_bodies();
        head_on(&mut bodies, a, b, 0.5);
        bodies.get_mut(b).set_body_type(BodyType::Static);
        bodies.get_mut(b).set_velocity(Vec2::ZERO);

        ImpulseSolver.solve(&[contact(a, b, 0.1)], &mut bodies);
        SmoothPositionSolver.solve(&[contact(a, b, 0.1)], &mut bodies);

        assert_eq!(bodies.get(b).velocity(), Vec2::ZERO);
        assert_eq!(bodies.get(b).position(), Vec2::ZERO);
        // The dynamic body bounced back.
        assert!(bodies.get(a).velocity().x < 0.0);
    }

    #[test]
    fn position_solver_respects_slop() {
        let (_registry, mut bodies, a, b) = two_bodies();
        head_on(&mut bodies, a, b, 0.0);

        // Depth below the slop: nothing moves.
        SmoothPositionSolver.solve(&[contact(a, b, 0.005)], &mut bodies);
        assert_eq!(bodies.get(a).position(), Vec2::ZERO);
        assert_eq!(bodies.get(b).position(), Vec2::ZERO);

        // Deeper contact: both move apart along the normal.
        SmoothPositionSolver.solve(&[contact(a, b, 0.5)], &mut bodies);
        assert!(bodies.get(a).position().x < 0.0);
        assert!(bodies.get(b).position().x > 0.0);
    }
}
