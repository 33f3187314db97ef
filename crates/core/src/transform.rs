//! Transform pools.
//!
//! Position, scale and rotation live in separate pools so the rollback
//! manager can publish physics positions without touching scale, and the
//! renderer can sample everything through one façade between ticks.
//! Positions are in physics space; [`crate::PIXEL_PER_METER`] converts
//! to render space.

use glam::Vec2;

use crate::angle::Degree;
use crate::entity::{ComponentMask, Entity, EntityRegistry};
use crate::pool::ComponentPool;

/// Combined position / scale / rotation pools.
#[derive(Debug, Clone)]
pub struct TransformManager {
    positions: ComponentPool<Vec2>,
    scales: ComponentPool<Vec2>,
    rotations: ComponentPool<Degree>,
}

impl Default for TransformManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformManager {
    pub fn new() -> Self {
        Self {
            positions: ComponentPool::new(ComponentMask::POSITION),
            // Scale defaults to one, not zero.
            scales: ComponentPool::with_fill(ComponentMask::SCALE, Vec2::ONE),
            rotations: ComponentPool::new(ComponentMask::ROTATION),
        }
    }

    pub fn add_component(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.positions.add_component(registry, entity);
        self.scales.add_component(registry, entity);
        self.rotations.add_component(registry, entity);
    }

    /// Grow all three pools to the registry's current extent.
    pub fn sync(&mut self, registry: &EntityRegistry) {
        self.positions.sync(registry);
        self.scales.sync(registry);
        self.rotations.sync(registry);
    }

    pub fn remove_component(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.positions.remove_component(registry, entity);
        self.scales.remove_component(registry, entity);
        self.rotations.remove_component(registry, entity);
    }

    #[inline]
    pub fn position(&self, entity: Entity) -> Vec2 {
        *self.positions.get(entity)
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec2) {
        self.positions.set(entity, position);
    }

    #[inline]
    pub fn scale(&self, entity: Entity) -> Vec2 {
        *self.scales.get(entity)
    }

    pub fn set_scale(&mut self, entity: Entity, scale: Vec2) {
        self.scales.set(entity, scale);
    }

    #[inline]
    pub fn rotation(&self, entity: Entity) -> Degree {
        *self.rotations.get(entity)
    }

    pub fn set_rotation(&mut self, entity: Entity, rotation: Degree) {
        self.rotations.set(entity, rotation);
    }

    pub fn all_positions(&self) -> &[Vec2] {
        self.positions.all()
    }
}
