//! Player characters.
//!
//! Movement is force-based: each pressed direction adds `PLAYER_SPEED`
//! along its axis. The character rotates to face its movement and throws
//! the held ball along its aim. Everything a replay needs (input, aim,
//! ball possession, health, score) lives in the component so it rolls
//! back with the pools.

use glam::Vec2;
use wallball_core::{ComponentPool, Entity, EntityRegistry, Radian, INVALID_ENTITY};
use wallball_physics::PhysicsManager;
use wallball_protocol::PlayerInput;

use crate::globals::{
    component, PlayerNumber, BALL_SPEED, INVALID_PLAYER, MAX_PLAYER_NMB, PLAYER_HEALTH,
    PLAYER_SPEED,
};

/// Per-player simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerCharacter {
    pub player_number: PlayerNumber,
    pub input: PlayerInput,
    pub rotation: Radian,
    pub aim_direction: Vec2,
    pub has_ball: bool,
    pub had_ball: bool,
    pub health: i32,
    pub score: u32,
}

impl Default for PlayerCharacter {
    fn default() -> Self {
        Self {
            player_number: INVALID_PLAYER,
            input: PlayerInput::default(),
            rotation: Radian(0.0),
            aim_direction: Vec2::Y,
            // Possession is handed out at spawn; there is one ball in
            // the economy.
            has_ball: false,
            had_ball: false,
            health: PLAYER_HEALTH,
            score: 0,
        }
    }
}

impl PlayerCharacter {
    pub fn catch_ball(&mut self) {
        if self.has_ball {
            return;
        }
        self.had_ball = self.has_ball;
        self.has_ball = true;
    }

    pub fn throw_ball(&mut self) {
        if !self.has_ball {
            return;
        }
        self.had_ball = self.has_ball;
        self.has_ball = false;
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// A ball throw queued during the player update, executed by the
/// rollback manager right after it.
#[derive(Debug, Clone, Copy)]
pub struct BallSpawn {
    pub player_number: PlayerNumber,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Pool of player characters plus their fixed update.
#[derive(Debug, Clone)]
pub struct PlayerCharacterManager {
    pool: ComponentPool<PlayerCharacter>,
}

impl Default for PlayerCharacterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerCharacterManager {
    pub fn new() -> Self {
        Self {
            pool: ComponentPool::new(component::PLAYER_CHARACTER),
        }
    }

    pub fn add_component(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        log::info!("creating player character: entity {}", entity.0);
        self.pool.add_component(registry, entity);
    }

    #[inline]
    pub fn get(&self, entity: Entity) -> &PlayerCharacter {
        self.pool.get(entity)
    }

    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> &mut PlayerCharacter {
        self.pool.get_mut(entity)
    }

    pub fn set(&mut self, entity: Entity, character: PlayerCharacter) {
        self.pool.set(entity, character);
    }

    pub fn all(&self) -> &[PlayerCharacter] {
        self.pool.all()
    }

    pub fn copy_all(&mut self, src: &[PlayerCharacter]) {
        self.pool.copy_all(src);
    }

    /// One fixed step of player logic. Ball throws are returned as spawn
    /// requests; the caller creates the entities so the replay loop owns
    /// every spawn.
    pub fn fixed_update(
        &mut self,
        registry: &EntityRegistry,
        physics: &mut PhysicsManager,
        player_entities: &[Entity; MAX_PLAYER_NMB],
        _dt: f32,
    ) -> Vec<BallSpawn> {
        let mut spawns = Vec::new();

        for &player_entity in player_entities.iter() {
            if player_entity == INVALID_ENTITY
                || !registry.has_component(player_entity, component::PLAYER_CHARACTER)
            {
                continue;
            }

            let mut character = *self.pool.get(player_entity);
            let input = character.input;

            let force = Vec2::new(
                input.horizontal() as f32 * PLAYER_SPEED,
                input.vertical() as f32 * PLAYER_SPEED,
            );

            let body = physics.body_mut(player_entity);
            body.apply_force(force);

            if input.is_moving() {
                // Angle against +Y, flipped to the left half-plane when
                // moving left.
                let aim = force.normalize();
                let mut angle = aim.dot(Vec2::Y).clamp(-1.0, 1.0).acos();
                if force.x < 0.0 {
                    angle = -angle;
                }
                character.rotation = Radian(angle);
                body.set_rotation(character.rotation);
                character.aim_direction = aim;
            }

            if input.shoot() && character.has_ball {
                let velocity = body.velocity();
                let aligned_speed = if velocity.dot(character.aim_direction) > 0.0 {
                    velocity.length()
                } else {
                    0.0
                };
                spawns.push(BallSpawn {
                    player_number: character.player_number,
                    position: body.position() + character.aim_direction * 0.5,
                    velocity: character.aim_direction * (aligned_speed + BALL_SPEED),
                });
                character.throw_ball();
            }

            self.pool.set(player_entity, character);
        }

        spawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catch_and_throw_toggle_possession() {
        let mut character = PlayerCharacter::default();
        assert!(!character.has_ball);

        character.catch_ball();
        assert!(character.has_ball);
        assert!(!character.had_ball);

        character.throw_ball();
        assert!(!character.has_ball);
        assert!(character.had_ball);

        // Throwing empty-handed changes nothing.
        character.throw_ball();
        assert!(!character.has_ball);

        character.catch_ball();
        assert!(character.has_ball);
        // Catching twice changes nothing either.
        character.catch_ball();
        assert!(character.has_ball);
    }
}
