//! Static arena walls and falling walls.
//!
//! A falling wall is a pair of kinematic bodies sharing a downward
//! velocity: a full-width background wall that crushes players, and a
//! door whose requirement flag decides who may pass. Wall data is
//! immutable after spawn, so these pools are not part of the rollback
//! snapshot; existence alone is tracked through the registry.

use wallball_core::{ComponentPool, Entity, EntityRegistry, INVALID_ENTITY};

use crate::globals::component;

/// Moves down at a fixed speed until destroyed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingObject {
    pub falling_speed: f32,
}

impl Default for FallingObject {
    fn default() -> Self {
        Self { falling_speed: 0.0 }
    }
}

/// The opening of a falling wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingDoor {
    /// Whether a player must hold the ball to pass.
    pub requires_ball: bool,
    /// The background wall this door belongs to; both are destroyed
    /// together.
    pub background_wall: Entity,
}

impl Default for FallingDoor {
    fn default() -> Self {
        Self {
            requires_ball: false,
            background_wall: INVALID_ENTITY,
        }
    }
}

/// Pools for the falling-wall components.
#[derive(Debug, Clone)]
pub struct WallManager {
    falling_objects: ComponentPool<FallingObject>,
    falling_doors: ComponentPool<FallingDoor>,
}

impl Default for WallManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WallManager {
    pub fn new() -> Self {
        Self {
            falling_objects: ComponentPool::new(component::FALLING_OBJECT),
            falling_doors: ComponentPool::new(component::FALLING_DOOR),
        }
    }

    pub fn add_falling_object(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.falling_objects.add_component(registry, entity);
    }

    pub fn set_falling_object(&mut self, entity: Entity, object: FallingObject) {
        self.falling_objects.set(entity, object);
    }

    pub fn falling_object(&self, entity: Entity) -> &FallingObject {
        self.falling_objects.get(entity)
    }

    pub fn add_falling_door(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.falling_doors.add_component(registry, entity);
    }

    pub fn set_falling_door(&mut self, entity: Entity, door: FallingDoor) {
        self.falling_doors.set(entity, door);
    }

    pub fn falling_door(&self, entity: Entity) -> &FallingDoor {
        self.falling_doors.get(entity)
    }
}

/// The five static walls of the arena.
#[derive(Debug, Clone, Copy)]
pub struct Walls {
    pub left: Entity,
    pub right: Entity,
    pub bottom: Entity,
    pub top: Entity,
    pub middle: Entity,
}
