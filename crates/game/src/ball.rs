//! Ball component.
//!
//! A thrown ball is a bouncing dynamic body; all its per-frame motion
//! comes from the physics integration, so the manager's fixed update
//! has nothing to do. The pool still exists so ball state snapshots and
//! restores with the other rollback pools.

use wallball_core::{ComponentPool, Entity, EntityRegistry};

use crate::globals::component;

/// Marker for a ball flying through the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ball;

/// Pool of ball components.
#[derive(Debug, Clone)]
pub struct BallManager {
    pool: ComponentPool<Ball>,
}

impl Default for BallManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BallManager {
    pub fn new() -> Self {
        Self {
            pool: ComponentPool::new(component::BALL),
        }
    }

    pub fn add_component(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        self.pool.add_component(registry, entity);
    }

    pub fn all(&self) -> &[Ball] {
        self.pool.all()
    }

    pub fn copy_all(&mut self, src: &[Ball]) {
        self.pool.copy_all(src);
    }

    /// Balls have no logic of their own; integration does the work.
    pub fn fixed_update(&mut self, _dt: f32) {}
}
