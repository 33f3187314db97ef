//! Rigid bodies.

use glam::Vec2;
use wallball_core::Radian;

use crate::layers::Layer;

/// How a body reacts to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never moves, never integrated.
    #[default]
    Static,
    /// Moves by its own velocity but is not pushed by impulses.
    Kinematic,
    /// Fully simulated.
    Dynamic,
}

/// Physics-space transform. Positions are meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: Radian,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: Radian(0.0),
        }
    }
}

/// A rigidbody with dynamics.
///
/// Forces accumulate between steps and are zeroed by the integrator.
/// A static body is never integrated or displaced; the solvers treat
/// its inverse mass as zero whatever is stored.
#[derive(Debug, Clone)]
pub struct Rigidbody {
    transform: Transform,
    velocity: Vec2,
    angular_velocity: Radian,
    gravity_acceleration: Vec2,
    force: Vec2,
    inv_mass: f32,
    takes_gravity: bool,
    static_friction: f32,
    dynamic_friction: f32,
    restitution: f32,
    drag_factor: f32,
    is_trigger: bool,
    body_type: BodyType,
    layer: Layer,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            velocity: Vec2::ZERO,
            angular_velocity: Radian(0.0),
            gravity_acceleration: Vec2::ZERO,
            force: Vec2::ZERO,
            inv_mass: 1.0,
            takes_gravity: true,
            static_friction: 0.0,
            dynamic_friction: 0.0,
            restitution: 0.0,
            drag_factor: 1.0,
            is_trigger: false,
            body_type: BodyType::Static,
            layer: Layer::None,
        }
    }
}

impl Rigidbody {
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    #[inline]
    pub fn rotation(&self) -> Radian {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, rotation: Radian) {
        self.transform.rotation = rotation;
    }

    #[inline]
    pub fn angular_velocity(&self) -> Radian {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Radian) {
        self.angular_velocity = angular_velocity;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Accumulate a force for the next integration step.
    pub fn apply_force(&mut self, added_force: Vec2) {
        self.force += added_force;
    }

    pub fn set_force(&mut self, force: Vec2) {
        self.force = force;
    }

    #[inline]
    pub fn gravity_acceleration(&self) -> Vec2 {
        self.gravity_acceleration
    }

    /// Ignored unless the body takes gravity; enable `takes_gravity`
    /// first.
    pub fn set_gravity_acceleration(&mut self, gravity_acceleration: Vec2) {
        if !self.takes_gravity {
            return;
        }
        self.gravity_acceleration = gravity_acceleration;
    }

    /// Mass, computed from the stored inverse. Infinite for a body with
    /// `inv_mass == 0`.
    #[inline]
    pub fn mass(&self) -> f32 {
        1.0 / self.inv_mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Only the inverse mass is stored. Mass zero maps to an immovable
    /// body; subnormal inverses are clamped so later divisions stay
    /// normal.
    pub fn set_mass(&mut self, mass: f32) {
        if mass == 0.0 {
            self.inv_mass = 0.0;
            return;
        }
        self.inv_mass = 1.0 / mass;
        if self.inv_mass.is_subnormal() {
            self.inv_mass = f32::MIN_POSITIVE;
        }
    }

    #[inline]
    pub fn takes_gravity(&self) -> bool {
        self.takes_gravity
    }

    pub fn set_takes_gravity(&mut self, takes_gravity: bool) {
        self.takes_gravity = takes_gravity;
        if !takes_gravity {
            self.gravity_acceleration = Vec2::ZERO;
        }
    }

    #[inline]
    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn set_static_friction(&mut self, static_friction: f32) {
        self.static_friction = static_friction;
    }

    #[inline]
    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn set_dynamic_friction(&mut self, dynamic_friction: f32) {
        self.dynamic_friction = dynamic_friction;
    }

    /// Bounciness of the body.
    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    #[inline]
    pub fn drag_factor(&self) -> f32 {
        self.drag_factor
    }

    pub fn set_drag_factor(&mut self, drag_factor: f32) {
        self.drag_factor = drag_factor;
    }

    /// A trigger collider reports overlaps but never gets a collision
    /// response.
    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    pub fn set_is_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    #[inline]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    #[inline]
    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }
}
