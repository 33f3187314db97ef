//! The physics manager.
//!
//! One fixed step is: apply gravity, resolve collisions, integrate.
//! Collision resolution runs on the pre-integration state so impulses
//! apply to the same velocities integration then carries forward.

use glam::Vec2;
use wallball_core::{ComponentMask, ComponentPool, Entity, EntityRegistry};

use crate::body::Rigidbody;
use crate::collider::{AabbCollider, CircleCollider, Collider, Collision};
use crate::grid::SpatialGrid;
use crate::layers::{Layer, LayerCollisionMatrix};
use crate::solver::{ImpulseSolver, SmoothPositionSolver};

/// Owns the physics pools and drives the fixed step.
///
/// Trigger and collision events accumulate across steps until drained;
/// the rollback manager drains them after every replayed frame so game
/// reactions run at each replay.
#[derive(Debug, Clone)]
pub struct PhysicsManager {
    bodies: ComponentPool<Rigidbody>,
    aabbs: ComponentPool<AabbCollider>,
    circles: ComponentPool<CircleCollider>,
    grid: SpatialGrid,
    layer_matrix: LayerCollisionMatrix,
    gravity: Vec2,
    impulse_solver: ImpulseSolver,
    smooth_position_solver: SmoothPositionSolver,
    trigger_events: Vec<(Entity, Entity)>,
    collision_events: Vec<(Entity, Entity)>,
}

impl Default for PhysicsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsManager {
    /// World bounds of the reference broad-phase grid, meters.
    const GRID_EXTENT: f32 = 500.0;
    /// Cell size of the reference broad-phase grid, meters.
    const GRID_CELL_SIZE: f32 = 10.0;

    pub fn new() -> Self {
        Self {
            bodies: ComponentPool::new(ComponentMask::RIGIDBODY),
            aabbs: ComponentPool::new(ComponentMask::AABB_COLLIDER),
            circles: ComponentPool::new(ComponentMask::CIRCLE_COLLIDER),
            grid: SpatialGrid::new(
                -Self::GRID_EXTENT,
                Self::GRID_EXTENT,
                -Self::GRID_EXTENT,
                Self::GRID_EXTENT,
                Self::GRID_CELL_SIZE,
            ),
            layer_matrix: LayerCollisionMatrix::default(),
            gravity: Vec2::ZERO,
            impulse_solver: ImpulseSolver,
            smooth_position_solver: SmoothPositionSolver,
            trigger_events: Vec::new(),
            collision_events: Vec::new(),
        }
    }

    /// World gravity applied to bodies that take gravity.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn set_layer_collision(&mut self, a: Layer, b: Layer, value: bool) {
        self.layer_matrix.set_collision(a, b, value);
    }

    pub fn has_layer_collision(&self, a: Layer, b: Layer) -> bool {
        self.layer_matrix.has_collision(a, b)
    }

    // ------------------------------------------------------------------
    // Component accessors
    // ------------------------------------------------------------------

    pub fn add_rigidbody(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.bodies.add_component(registry, entity);
        let gravity = self.gravity;
        let body = self.bodies.get_mut(entity);
        if body.takes_gravity() {
            body.set_gravity_acceleration(gravity);
        }
    }

    pub fn set_rigidbody(&mut self, entity: Entity, mut body: Rigidbody) {
        if body.takes_gravity() {
            body.set_gravity_acceleration(self.gravity);
        }
        self.bodies.set(entity, body);
    }

    #[inline]
    pub fn body(&self, entity: Entity) -> &Rigidbody {
        self.bodies.get(entity)
    }

    #[inline]
    pub fn body_mut(&mut self, entity: Entity) -> &mut Rigidbody {
        self.bodies.get_mut(entity)
    }

    pub fn add_aabb_collider(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.aabbs.add_component(registry, entity);
    }

    pub fn set_aabb_collider(&mut self, entity: Entity, collider: AabbCollider) {
        self.aabbs.set(entity, collider);
    }

    pub fn aabb_collider(&self, entity: Entity) -> &AabbCollider {
        self.aabbs.get(entity)
    }

    pub fn add_circle_collider(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.circles.add_component(registry, entity);
    }

    pub fn set_circle_collider(&mut self, entity: Entity, collider: CircleCollider) {
        self.circles.set(entity, collider);
    }

    pub fn circle_collider(&self, entity: Entity) -> &CircleCollider {
        self.circles.get(entity)
    }

    /// The collider used for this entity. An entity carrying both
    /// shapes resolves to the box; handling both at once is not
    /// supported.
    pub fn collider_of(&self, registry: &EntityRegistry, entity: Entity) -> Option<Collider> {
        if registry.has_component(entity, ComponentMask::AABB_COLLIDER) {
            return Some(Collider::Aabb(*self.aabbs.get(entity)));
        }
        if registry.has_component(entity, ComponentMask::CIRCLE_COLLIDER) {
            return Some(Collider::Circle(*self.circles.get(entity)));
        }
        None
    }

    // ------------------------------------------------------------------
    // Fixed step
    // ------------------------------------------------------------------

    pub fn fixed_update(&mut self, registry: &EntityRegistry, dt: f32) {
        self.apply_gravity(registry);
        self.resolve_collisions(registry);
        self.move_bodies(registry, dt);
    }

    fn apply_gravity(&mut self, registry: &EntityRegistry) {
        for entity in Self::rigidbody_entities(registry) {
            let body = self.bodies.get_mut(entity);
            if !body.is_dynamic() || body.inv_mass() == 0.0 {
                continue;
            }
            let force = body.gravity_acceleration() * body.mass();
            body.apply_force(force);
        }
    }

    fn resolve_collisions(&mut self, registry: &EntityRegistry) {
        self.grid.clear();
        for entity in Self::rigidbody_entities(registry) {
            let Some(collider) = self.collider_of(registry, entity) else {
                continue;
            };
            let half_size = collider.bounding_box_size() * 0.5;
            let center = self.bodies.get(entity).position() + collider.center();
            self.grid.insert(entity, center - half_size, center + half_size);
        }

        let mut collisions: Vec<Collision> = Vec::with_capacity(64);
        let mut triggers: Vec<Collision> = Vec::with_capacity(64);

        for (entity_a, entity_b) in self.grid.collision_pairs() {
            let Some(collider_a) = self.collider_of(registry, entity_a) else {
                continue;
            };
            let Some(collider_b) = self.collider_of(registry, entity_b) else {
                continue;
            };

            let body_a = self.bodies.get(entity_a);
            let body_b = self.bodies.get(entity_b);

            if !self.layer_matrix.has_collision(body_a.layer(), body_b.layer()) {
                continue;
            }

            let manifold =
                collider_a.test_collision(body_a.transform(), &collider_b, body_b.transform());
            if !manifold.has_collision {
                continue;
            }

            let collision = Collision {
                entity_a,
                entity_b,
                manifold,
            };
            if body_a.is_trigger() || body_b.is_trigger() {
                triggers.push(collision);
            } else {
                collisions.push(collision);
            }
        }

        // Solve once for the whole batch, after the pair loop.
        self.impulse_solver.solve(&collisions, &mut self.bodies);
        self.smooth_position_solver.solve(&collisions, &mut self.bodies);

        for collision in &triggers {
            self.trigger_events.push((collision.entity_a, collision.entity_b));
        }
        for collision in &collisions {
            self.collision_events.push((collision.entity_a, collision.entity_b));
        }
    }

    fn move_bodies(&mut self, registry: &EntityRegistry, dt: f32) {
        for entity in Self::rigidbody_entities(registry) {
            let body = self.bodies.get_mut(entity);
            if body.is_static() {
                continue;
            }

            let velocity =
                body.velocity() * body.drag_factor() + body.force() * body.inv_mass() * dt;
            body.set_velocity(velocity);
            let position = body.position() + velocity * dt;
            body.set_position(position);
            body.set_force(Vec2::ZERO);
        }
    }

    fn rigidbody_entities(registry: &EntityRegistry) -> impl Iterator<Item = Entity> + '_ {
        (0..registry.entity_count() as u32)
            .map(Entity)
            .filter(|&entity| registry.has_component(entity, ComponentMask::RIGIDBODY))
    }

    // ------------------------------------------------------------------
    // Events and snapshots
    // ------------------------------------------------------------------

    /// Trigger overlaps since the last drain, in detection order.
    pub fn take_trigger_events(&mut self) -> Vec<(Entity, Entity)> {
        std::mem::take(&mut self.trigger_events)
    }

    /// Hard collisions since the last drain, in detection order.
    pub fn take_collision_events(&mut self) -> Vec<(Entity, Entity)> {
        std::mem::take(&mut self.collision_events)
    }

    /// Bulk-copy the physics pools from another manager. The grid and
    /// pending events are transient and not part of the snapshot.
    pub fn copy_all_components(&mut self, other: &PhysicsManager) {
        self.bodies.copy_all(other.bodies.all());
        self.aabbs.copy_all(other.aabbs.all());
        self.circles.copy_all(other.circles.all());
    }
}
