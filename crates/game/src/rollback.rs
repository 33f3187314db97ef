//! Rollback manager.
//!
//! Owns two parallel sets of simulation pools: the speculative *current*
//! set the renderer samples, and the *last validated* set agreed with
//! the authority. Advancing a frame means restoring the current set from
//! the validated one and replaying every frame in between with the best
//! known inputs; validation replays the same window and commits it.
//!
//! Missing opponent inputs are predicted as a hold of the last received
//! input. When the real input arrives late, the next replay corrects the
//! state; the authority's digest comparison catches anything that still
//! diverges.

use glam::Vec2;
use wallball_core::{
    ComponentMask, Degree, Entity, EntityRegistry, Radian, TransformManager, INVALID_ENTITY,
};
use wallball_physics::{
    AabbCollider, BodyType, CircleCollider, Layer, PhysicsManager, Rigidbody,
};
use wallball_protocol::{Frame, PhysicsState, PlayerInput, PlayerNumber};

use crate::ball::BallManager;
use crate::globals::{
    component, BALL_RESTITUTION, BALL_SCALE, DESTROY_WALL_SCORE_INCREMENT,
    FALLING_WALL_DOOR_SIZE, FALLING_WALL_SIZE, FALLING_WALL_SPAWN_HEIGHT, FALLING_WALL_SPEED,
    FIXED_PERIOD, MAX_PLAYER_NMB, PLAYER_COLLIDER_HALF_EXTENT, PLAYER_DRAG_FACTOR,
    STARTING_BALL_HOLDER, WALL_RESTITUTION, WINDOW_BUFFER_SIZE,
};
use crate::player::{PlayerCharacter, PlayerCharacterManager};
use crate::walls::{FallingDoor, FallingObject, WallManager};

/// An entity spawned since the last validated frame, and when.
#[derive(Debug, Clone, Copy)]
struct CreatedEntity {
    entity: Entity,
    created_frame: Frame,
}

/// Input rings, pool sets and the replay machinery.
pub struct RollbackManager {
    current_transform_manager: TransformManager,
    current_physics_manager: PhysicsManager,
    current_player_manager: PlayerCharacterManager,
    current_ball_manager: BallManager,

    last_validate_physics_manager: PhysicsManager,
    last_validate_player_manager: PlayerCharacterManager,
    last_validate_ball_manager: BallManager,

    wall_manager: WallManager,

    /// Per player, a ring of inputs. `inputs[p][0]` is the input for
    /// `current_frame`; older frames sit at higher indices.
    inputs: [[PlayerInput; WINDOW_BUFFER_SIZE]; MAX_PLAYER_NMB],
    last_received_frame: [Frame; MAX_PLAYER_NMB],

    created_entities: Vec<CreatedEntity>,

    current_frame: Frame,
    last_validate_frame: Frame,
    /// Frame being replayed right now; spawns during a replay are logged
    /// against it.
    tested_frame: Frame,
}

impl Default for RollbackManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RollbackManager {
    pub fn new() -> Self {
        Self {
            current_transform_manager: TransformManager::new(),
            current_physics_manager: PhysicsManager::new(),
            current_player_manager: PlayerCharacterManager::new(),
            current_ball_manager: BallManager::new(),
            last_validate_physics_manager: PhysicsManager::new(),
            last_validate_player_manager: PlayerCharacterManager::new(),
            last_validate_ball_manager: BallManager::new(),
            wall_manager: WallManager::new(),
            inputs: [[PlayerInput::new(); WINDOW_BUFFER_SIZE]; MAX_PLAYER_NMB],
            last_received_frame: [0; MAX_PLAYER_NMB],
            created_entities: Vec::new(),
            current_frame: 0,
            last_validate_frame: 0,
            tested_frame: 0,
        }
    }

    #[inline]
    pub fn current_frame(&self) -> Frame {
        self.current_frame
    }

    #[inline]
    pub fn last_validate_frame(&self) -> Frame {
        self.last_validate_frame
    }

    #[inline]
    pub fn last_received_frame(&self, player_number: PlayerNumber) -> Frame {
        self.last_received_frame[player_number as usize]
    }

    /// The ring of inputs for one player, newest first.
    pub fn inputs(&self, player_number: PlayerNumber) -> &[PlayerInput; WINDOW_BUFFER_SIZE] {
        &self.inputs[player_number as usize]
    }

    /// The transform pools the renderer samples between ticks.
    pub fn transform_manager(&self) -> &TransformManager {
        &self.current_transform_manager
    }

    pub fn current_physics_manager(&self) -> &PhysicsManager {
        &self.current_physics_manager
    }

    /// Mutable access for level setup (layer matrix, gravity).
    pub fn current_physics_manager_mut(&mut self) -> &mut PhysicsManager {
        &mut self.current_physics_manager
    }

    pub fn player_character(&self, entity: Entity) -> &PlayerCharacter {
        self.current_player_manager.get(entity)
    }

    // ------------------------------------------------------------------
    // Input intake
    // ------------------------------------------------------------------

    /// Record `input` for `input_frame`, advancing the window if the
    /// frame is ahead of the current one. A newest-yet input also
    /// backfills every predicted slot younger than it: the opponent is
    /// presumed to hold the last observed input.
    pub fn set_player_input(
        &mut self,
        player_number: PlayerNumber,
        input: PlayerInput,
        input_frame: Frame,
    ) {
        if self.current_frame < input_frame {
            self.start_new_frame(input_frame);
        }

        let offset = (self.current_frame - input_frame) as usize;
        if offset >= WINDOW_BUFFER_SIZE {
            log::warn!(
                "dropping input for frame {input_frame}: older than the {WINDOW_BUFFER_SIZE}-frame window"
            );
            return;
        }

        let ring = &mut self.inputs[player_number as usize];
        ring[offset] = input;

        if self.last_received_frame[player_number as usize] < input_frame {
            self.last_received_frame[player_number as usize] = input_frame;
            // Extend the newest known input forward over the predicted
            // slots.
            for slot in ring[..offset].iter_mut() {
                *slot = input;
            }
        }
    }

    /// Shift the input window so `inputs[0]` corresponds to `new_frame`.
    /// Vacated head slots repeat the previously newest input.
    pub fn start_new_frame(&mut self, new_frame: Frame) {
        if new_frame <= self.current_frame {
            return;
        }
        let delta = (new_frame - self.current_frame) as usize;

        for ring in &mut self.inputs {
            if delta >= WINDOW_BUFFER_SIZE {
                let hold = ring[0];
                ring.fill(hold);
            } else {
                ring.copy_within(0..WINDOW_BUFFER_SIZE - delta, delta);
                let hold = ring[delta];
                ring[..delta].fill(hold);
            }
        }
        self.current_frame = new_frame;
    }

    /// Input of `player_number` at `frame`. Asking further back than the
    /// window is a programmer error.
    pub fn input_at_frame(&self, player_number: PlayerNumber, frame: Frame) -> PlayerInput {
        let offset = (self.current_frame - frame) as usize;
        assert!(
            offset < WINDOW_BUFFER_SIZE,
            "input for frame {frame} is older than the input window"
        );
        self.inputs[player_number as usize][offset]
    }

    // ------------------------------------------------------------------
    // Replay
    // ------------------------------------------------------------------

    /// Rewind to the last validated state and replay up to the current
    /// frame, then publish the resulting positions to the transform
    /// pools.
    pub fn simulate_to_current_frame(
        &mut self,
        registry: &mut EntityRegistry,
        player_entities: &[Entity; MAX_PLAYER_NMB],
    ) {
        let current_frame = self.current_frame;
        let last_validate_frame = self.last_validate_frame;

        self.destroy_speculative_entities(registry);
        self.restore_from_last_validate();

        for frame in last_validate_frame + 1..=current_frame {
            self.tested_frame = frame;
            self.stamp_inputs(registry, frame, player_entities);
            self.step_frame(registry, player_entities);
        }

        self.publish_transforms(registry);
    }

    /// Authority-driven validation: replay from the validated state up
    /// to `new_validate_frame` and commit the result.
    ///
    /// # Panics
    ///
    /// Panics if any player's inputs do not cover the frame; validating
    /// on predictions would canonicalize guessed state.
    pub fn validate_frame(
        &mut self,
        registry: &mut EntityRegistry,
        player_entities: &[Entity; MAX_PLAYER_NMB],
        new_validate_frame: Frame,
    ) {
        if new_validate_frame < self.last_validate_frame {
            log::warn!(
                "ignoring stale validation of frame {new_validate_frame} (already at {})",
                self.last_validate_frame
            );
            return;
        }
        for player_number in 0..MAX_PLAYER_NMB {
            assert!(
                self.last_received_frame[player_number] >= new_validate_frame,
                "validating frame {new_validate_frame} without input from player {player_number} \
                 (last received {})",
                self.last_received_frame[player_number]
            );
        }

        let last_validate_frame = self.last_validate_frame;
        self.destroy_speculative_entities(registry);
        self.restore_from_last_validate();

        for frame in last_validate_frame + 1..=new_validate_frame {
            self.tested_frame = frame;
            self.stamp_inputs(registry, frame, player_entities);
            self.step_frame(registry, player_entities);
        }

        // Soft-destroyed entities are now permanently freed.
        for index in 0..registry.entity_count() as u32 {
            let entity = Entity(index);
            if registry.has_component(entity, component::DESTROYED) {
                registry.destroy_entity(entity);
            }
        }

        self.last_validate_ball_manager
            .copy_all(self.current_ball_manager.all());
        self.last_validate_player_manager
            .copy_all(self.current_player_manager.all());
        self.last_validate_physics_manager
            .copy_all_components(&self.current_physics_manager);
        self.last_validate_frame = new_validate_frame;
        self.created_entities.clear();
    }

    /// Validate `frame` and compare the per-player digests against the
    /// authority's.
    ///
    /// # Panics
    ///
    /// Panics on any digest mismatch: the simulation has desynced and
    /// every further frame would be unreproducible.
    pub fn confirm_frame(
        &mut self,
        registry: &mut EntityRegistry,
        player_entities: &[Entity; MAX_PLAYER_NMB],
        new_validate_frame: Frame,
        server_states: &[PhysicsState; MAX_PLAYER_NMB],
    ) {
        if new_validate_frame < self.last_validate_frame {
            log::warn!(
                "ignoring stale confirmation of frame {new_validate_frame} (already at {})",
                self.last_validate_frame
            );
            return;
        }
        self.validate_frame(registry, player_entities, new_validate_frame);
        for player_number in 0..MAX_PLAYER_NMB {
            let local_state = self.validate_physics_digest(player_entities[player_number]);
            assert!(
                server_states[player_number] == local_state,
                "physics states are not equal for player {} (server frame: {}, client frame: {}, \
                 server: {:#010x}, client: {:#010x})",
                player_number + 1,
                new_validate_frame,
                self.last_validate_frame,
                server_states[player_number],
                local_state
            );
        }
    }

    /// Fingerprint of one player's validated body: the unsigned wrapping
    /// sum of the 32-bit words of position, velocity, rotation and
    /// angular velocity.
    pub fn validate_physics_digest(&self, player_entity: Entity) -> PhysicsState {
        let body = self.last_validate_physics_manager.body(player_entity);
        let position = body.position();
        let velocity = body.velocity();

        let mut state: PhysicsState = 0;
        for word in [
            position.x,
            position.y,
            velocity.x,
            velocity.y,
            body.rotation().value(),
            body.angular_velocity().value(),
        ] {
            state = state.wrapping_add(word.to_bits());
        }
        state
    }

    fn destroy_speculative_entities(&mut self, registry: &mut EntityRegistry) {
        for created in &self.created_entities {
            if created.created_frame > self.last_validate_frame {
                registry.destroy_entity(created.entity);
            }
        }
        self.created_entities.clear();

        // A rollback may revive soft-destroyed entities.
        for index in 0..registry.entity_count() as u32 {
            let entity = Entity(index);
            if registry.has_component(entity, component::DESTROYED) {
                registry.remove_component(entity, component::DESTROYED);
            }
        }
    }

    fn restore_from_last_validate(&mut self) {
        self.current_ball_manager
            .copy_all(self.last_validate_ball_manager.all());
        self.current_physics_manager
            .copy_all_components(&self.last_validate_physics_manager);
        self.current_player_manager
            .copy_all(self.last_validate_player_manager.all());
    }

    fn stamp_inputs(
        &mut self,
        registry: &EntityRegistry,
        frame: Frame,
        player_entities: &[Entity; MAX_PLAYER_NMB],
    ) {
        for player_number in 0..MAX_PLAYER_NMB {
            let player_entity = player_entities[player_number];
            if player_entity == INVALID_ENTITY
                || !registry.has_component(player_entity, component::PLAYER_CHARACTER)
            {
                log::warn!("no spawned entity for player {player_number} at frame {frame}");
                continue;
            }
            let input = self.input_at_frame(player_number as PlayerNumber, frame);
            self.current_player_manager.get_mut(player_entity).input = input;
        }
    }

    fn step_frame(
        &mut self,
        registry: &mut EntityRegistry,
        player_entities: &[Entity; MAX_PLAYER_NMB],
    ) {
        self.current_ball_manager.fixed_update(FIXED_PERIOD);
        let spawns = self.current_player_manager.fixed_update(
            registry,
            &mut self.current_physics_manager,
            player_entities,
            FIXED_PERIOD,
        );
        for spawn in spawns {
            self.spawn_ball(registry, spawn.position, spawn.velocity, self.tested_frame);
        }
        self.current_physics_manager.fixed_update(registry, FIXED_PERIOD);
        self.process_physics_events(registry);
    }

    fn publish_transforms(&mut self, registry: &EntityRegistry) {
        self.current_transform_manager.sync(registry);
        for index in 0..registry.entity_count() as u32 {
            let entity = Entity(index);
            if !registry
                .has_component(entity, ComponentMask::RIGIDBODY | ComponentMask::POSITION)
            {
                continue;
            }
            let body = self.current_physics_manager.body(entity);
            let position = body.position();
            let rotation = body.rotation();
            self.current_transform_manager.set_position(entity, position);
            self.current_transform_manager
                .set_rotation(entity, Degree::from(rotation));
        }
    }

    // ------------------------------------------------------------------
    // Game reactions
    // ------------------------------------------------------------------

    /// React to the overlaps of the step just simulated. Runs inside
    /// every replayed frame; only rolled-back component state is
    /// mutated, so re-running is harmless.
    fn process_physics_events(&mut self, registry: &mut EntityRegistry) {
        let triggers = self.current_physics_manager.take_trigger_events();
        let collisions = self.current_physics_manager.take_collision_events();

        for (entity_a, entity_b) in triggers {
            self.resolve_trigger(registry, entity_a, entity_b);
            self.resolve_trigger(registry, entity_b, entity_a);
        }
        for (entity_a, entity_b) in collisions {
            self.resolve_collision(registry, entity_a, entity_b);
            self.resolve_collision(registry, entity_b, entity_a);
        }
    }

    /// Player versus door: a matching requirement opens the wall.
    fn resolve_trigger(&mut self, registry: &mut EntityRegistry, player: Entity, other: Entity) {
        if !registry.has_component(player, component::PLAYER_CHARACTER)
            || !registry.has_component(other, component::FALLING_DOOR)
            || registry.has_component(other, component::DESTROYED)
        {
            return;
        }

        let door = *self.wall_manager.falling_door(other);
        let opens = {
            let character = self.current_player_manager.get_mut(player);
            if character.has_ball == door.requires_ball {
                character.score += DESTROY_WALL_SCORE_INCREMENT;
                log::debug!(
                    "player {} opened a falling wall, score {}",
                    character.player_number,
                    character.score
                );
                true
            } else {
                false
            }
        };
        if opens {
            self.destroy_entity(registry, other);
            self.destroy_entity(registry, door.background_wall);
        }
    }

    /// Player versus ball or damager on a hard contact.
    fn resolve_collision(&mut self, registry: &mut EntityRegistry, player: Entity, other: Entity) {
        if !registry.has_component(player, component::PLAYER_CHARACTER) {
            return;
        }

        if registry.has_component(other, component::BALL)
            && !registry.has_component(other, component::DESTROYED)
        {
            let caught = {
                let character = self.current_player_manager.get_mut(player);
                if character.has_ball {
                    false
                } else {
                    character.catch_ball();
                    true
                }
            };
            if caught {
                self.destroy_entity(registry, other);
            }
        } else if registry.has_component(other, component::DAMAGER)
            && !registry.has_component(other, component::DESTROYED)
        {
            let character = self.current_player_manager.get_mut(player);
            if character.health > 0 {
                character.health -= 1;
                log::debug!(
                    "player {} crushed by a falling wall, health {}",
                    character.player_number,
                    character.health
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Spawning and destruction
    // ------------------------------------------------------------------

    /// Mark an entity destroyed. Entities spawned inside the replay
    /// window are freed immediately; anything older only gets the soft
    /// flag so a rollback across this frame can revive it.
    pub fn destroy_entity(&mut self, registry: &mut EntityRegistry, entity: Entity) {
        if self
            .created_entities
            .iter()
            .any(|created| created.entity == entity)
        {
            registry.destroy_entity(entity);
            return;
        }
        registry.add_component(entity, component::DESTROYED);
    }

    /// Install a player in both pool sets. Players exist from the first
    /// validated frame onward, so no created-entity log entry is made.
    pub fn spawn_player(
        &mut self,
        registry: &mut EntityRegistry,
        player_number: PlayerNumber,
        entity: Entity,
        position: Vec2,
        rotation: Degree,
    ) {
        let mut body = Rigidbody::default();
        body.set_body_type(BodyType::Dynamic);
        body.set_mass(1.0);
        body.set_takes_gravity(false);
        body.set_position(position);
        body.set_rotation(Radian::from(rotation));
        body.set_drag_factor(PLAYER_DRAG_FACTOR);
        body.set_layer(Layer::Player);

        let collider = AabbCollider {
            half_width: PLAYER_COLLIDER_HALF_EXTENT,
            half_height: PLAYER_COLLIDER_HALF_EXTENT,
            center: Vec2::ZERO,
        };

        let character = PlayerCharacter {
            player_number,
            rotation: Radian::from(rotation),
            has_ball: player_number == STARTING_BALL_HOLDER,
            ..PlayerCharacter::default()
        };

        self.current_player_manager.add_component(registry, entity);
        self.current_player_manager.set(entity, character);
        self.current_physics_manager.add_rigidbody(registry, entity);
        self.current_physics_manager.set_rigidbody(entity, body.clone());
        self.current_physics_manager.add_aabb_collider(registry, entity);
        self.current_physics_manager.set_aabb_collider(entity, collider);

        self.last_validate_player_manager.add_component(registry, entity);
        self.last_validate_player_manager.set(entity, character);
        self.last_validate_physics_manager.add_rigidbody(registry, entity);
        self.last_validate_physics_manager.set_rigidbody(entity, body);
        self.last_validate_physics_manager.add_aabb_collider(registry, entity);
        self.last_validate_physics_manager.set_aabb_collider(entity, collider);

        self.current_transform_manager.add_component(registry, entity);
        self.current_transform_manager.set_position(entity, position);
        self.current_transform_manager.set_rotation(entity, rotation);
    }

    /// Spawn a thrown ball. A ball created mid-window goes into the
    /// current set plus the created-entity log; on a validated frame it
    /// is mirrored into both sets.
    pub fn spawn_ball(
        &mut self,
        registry: &mut EntityRegistry,
        position: Vec2,
        velocity: Vec2,
        frame: Frame,
    ) -> Entity {
        let entity = registry.create_entity();
        let mid_window = frame > self.last_validate_frame;
        if mid_window {
            self.created_entities.push(CreatedEntity {
                entity,
                created_frame: frame,
            });
        }

        let mut body = Rigidbody::default();
        body.set_body_type(BodyType::Dynamic);
        body.set_mass(1.0);
        body.set_takes_gravity(false);
        body.set_position(position);
        body.set_velocity(velocity);
        body.set_restitution(BALL_RESTITUTION);
        body.set_layer(Layer::Ball);

        let collider = CircleCollider {
            radius: BALL_SCALE * 0.5,
            center: Vec2::ZERO,
        };

        self.current_ball_manager.add_component(registry, entity);
        self.current_physics_manager.add_rigidbody(registry, entity);
        self.current_physics_manager.set_rigidbody(entity, body.clone());
        self.current_physics_manager.add_circle_collider(registry, entity);
        self.current_physics_manager.set_circle_collider(entity, collider);

        if !mid_window {
            self.last_validate_ball_manager.add_component(registry, entity);
            self.last_validate_physics_manager.add_rigidbody(registry, entity);
            self.last_validate_physics_manager.set_rigidbody(entity, body);
            self.last_validate_physics_manager
                .add_circle_collider(registry, entity);
            self.last_validate_physics_manager
                .set_circle_collider(entity, collider);
        }

        self.current_transform_manager.add_component(registry, entity);
        self.current_transform_manager.set_position(entity, position);
        self.current_transform_manager
            .set_scale(entity, Vec2::splat(BALL_SCALE));

        entity
    }

    /// Install a static arena wall in both pool sets.
    pub fn spawn_static_wall(
        &mut self,
        registry: &mut EntityRegistry,
        position: Vec2,
        size: Vec2,
        layer: Layer,
    ) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, component::STATIC_WALL);

        let mut body = Rigidbody::default();
        body.set_body_type(BodyType::Static);
        body.set_mass(0.0);
        body.set_takes_gravity(false);
        body.set_position(position);
        body.set_restitution(WALL_RESTITUTION);
        body.set_layer(layer);

        let collider = AabbCollider {
            half_width: size.x * 0.5,
            half_height: size.y * 0.5,
            center: Vec2::ZERO,
        };

        self.current_physics_manager.add_rigidbody(registry, entity);
        self.current_physics_manager.set_rigidbody(entity, body.clone());
        self.current_physics_manager.add_aabb_collider(registry, entity);
        self.current_physics_manager.set_aabb_collider(entity, collider);

        self.last_validate_physics_manager.add_rigidbody(registry, entity);
        self.last_validate_physics_manager.set_rigidbody(entity, body);
        self.last_validate_physics_manager.add_aabb_collider(registry, entity);
        self.last_validate_physics_manager.set_aabb_collider(entity, collider);

        self.current_transform_manager.add_component(registry, entity);
        self.current_transform_manager.set_position(entity, position);
        self.current_transform_manager.set_scale(entity, size);

        entity
    }

    /// Spawn a falling wall and its door, both sliding down at the same
    /// speed. On a validated frame the pair is mirrored into both pool
    /// sets; mid-window it goes into the current set plus the log.
    pub fn spawn_falling_wall(
        &mut self,
        registry: &mut EntityRegistry,
        door_position: f32,
        requires_ball: bool,
    ) -> (Entity, Entity) {
        let mid_window = self.current_frame > self.last_validate_frame;

        let background = registry.create_entity();
        let door = registry.create_entity();

        let mut wall_body = Rigidbody::default();
        wall_body.set_body_type(BodyType::Kinematic);
        wall_body.set_takes_gravity(false);
        wall_body.set_position(Vec2::new(0.0, FALLING_WALL_SPAWN_HEIGHT));
        wall_body.set_velocity(Vec2::new(0.0, -FALLING_WALL_SPEED));
        wall_body.set_layer(Layer::Wall);

        let wall_collider = AabbCollider {
            half_width: FALLING_WALL_SIZE.x * 0.5,
            half_height: FALLING_WALL_SIZE.y * 0.5,
            center: Vec2::ZERO,
        };

        let mut door_body = Rigidbody::default();
        door_body.set_body_type(BodyType::Kinematic);
        door_body.set_takes_gravity(false);
        door_body.set_position(Vec2::new(door_position, FALLING_WALL_SPAWN_HEIGHT));
        door_body.set_velocity(Vec2::new(0.0, -FALLING_WALL_SPEED));
        door_body.set_is_trigger(true);
        door_body.set_layer(Layer::Door);

        let door_collider = AabbCollider {
            half_width: FALLING_WALL_DOOR_SIZE.x * 0.5,
            half_height: FALLING_WALL_DOOR_SIZE.y * 0.5,
            center: Vec2::ZERO,
        };

        registry.add_component(background, component::DAMAGER);
        self.wall_manager.add_falling_object(registry, background);
        self.wall_manager.set_falling_object(
            background,
            FallingObject {
                falling_speed: FALLING_WALL_SPEED,
            },
        );

        self.wall_manager.add_falling_object(registry, door);
        self.wall_manager.set_falling_object(
            door,
            FallingObject {
                falling_speed: FALLING_WALL_SPEED,
            },
        );
        self.wall_manager.add_falling_door(registry, door);
        self.wall_manager.set_falling_door(
            door,
            FallingDoor {
                requires_ball,
                background_wall: background,
            },
        );

        for (entity, body, collider) in [
            (background, &wall_body, wall_collider),
            (door, &door_body, door_collider),
        ] {
            self.current_physics_manager.add_rigidbody(registry, entity);
            self.current_physics_manager.set_rigidbody(entity, body.clone());
            self.current_physics_manager.add_aabb_collider(registry, entity);
            self.current_physics_manager.set_aabb_collider(entity, collider);

            if !mid_window {
                self.last_validate_physics_manager.add_rigidbody(registry, entity);
                self.last_validate_physics_manager
                    .set_rigidbody(entity, body.clone());
                self.last_validate_physics_manager
                    .add_aabb_collider(registry, entity);
                self.last_validate_physics_manager
                    .set_aabb_collider(entity, collider);
            }

            self.current_transform_manager.add_component(registry, entity);
            self.current_transform_manager
                .set_position(entity, body.position());
        }

        if mid_window {
            let frame = self.current_frame;
            self.created_entities.push(CreatedEntity {
                entity: background,
                created_frame: frame,
            });
            self.created_entities.push(CreatedEntity {
                entity: door,
                created_frame: frame,
            });
        }

        (background, door)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_backfill_predicts_hold() {
        let mut rollback = RollbackManager::new();
        rollback.start_new_frame(10);

        let up = PlayerInput::from_bits(PlayerInput::UP);
        rollback.set_player_input(0, up, 4);

        // The received frame and every younger (predicted) frame hold
        // the input; frames older than it stay untouched.
        for frame in 4..=10 {
            assert_eq!(rollback.input_at_frame(0, frame), up);
        }
        assert_eq!(rollback.input_at_frame(0, 3), PlayerInput::new());
        assert_eq!(rollback.last_received_frame(0), 4);
    }

    #[test]
    fn older_input_does_not_backfill() {
        let mut rollback = RollbackManager::new();
        rollback.start_new_frame(10);

        let up = PlayerInput::from_bits(PlayerInput::UP);
        let down = PlayerInput::from_bits(PlayerInput::DOWN);
        rollback.set_player_input(0, up, 8);
        rollback.set_player_input(0, down, 5);

        // Frame 5 records the late input, but the prediction from frame
        // 8 onward is untouched.
        assert_eq!(rollback.input_at_frame(0, 5), down);
        assert_eq!(rollback.input_at_frame(0, 8), up);
        assert_eq!(rollback.input_at_frame(0, 10), up);
        assert_eq!(rollback.last_received_frame(0), 8);
    }

    #[test]
    fn window_shift_law() {
        let mut rollback = RollbackManager::new();
        rollback.start_new_frame(5);
        let shoot = PlayerInput::from_bits(PlayerInput::SHOOT);
        rollback.set_player_input(0, shoot, 5);

        rollback.start_new_frame(8);

        // inputs[k] == old inputs[0], and the head repeats it.
        assert_eq!(rollback.input_at_frame(0, 5), shoot);
        assert_eq!(rollback.input_at_frame(0, 6), shoot);
        assert_eq!(rollback.input_at_frame(0, 7), shoot);
        assert_eq!(rollback.input_at_frame(0, 8), shoot);
    }

    #[test]
    fn start_new_frame_never_rewinds() {
        let mut rollback = RollbackManager::new();
        rollback.start_new_frame(10);
        rollback.start_new_frame(6);
        assert_eq!(rollback.current_frame(), 10);
    }

    #[test]
    fn input_past_window_advances_it() {
        let mut rollback = RollbackManager::new();
        let up = PlayerInput::from_bits(PlayerInput::UP);
        rollback.set_player_input(0, up, 42);
        assert_eq!(rollback.current_frame(), 42);
        assert_eq!(rollback.input_at_frame(0, 42), up);
    }

    #[test]
    fn digest_is_sensitive_to_every_word() {
        let mut registry = EntityRegistry::new();
        let mut rollback = RollbackManager::new();
        let entity = registry.create_entity();
        rollback.spawn_player(&mut registry, 0, entity, Vec2::new(1.0, 2.0), Degree(0.0));

        let base = rollback.validate_physics_digest(entity);

        // Nudge each digest input by one ULP in the validated pool and
        // check the digest moves.
        let mutations: [fn(&mut Rigidbody); 6] = [
            |b| {
                let mut p = b.position();
                p.x = f32::from_bits(p.x.to_bits() + 1);
                b.set_position(p)
            },
            |b| {
                let mut p = b.position();
                p.y = f32::from_bits(p.y.to_bits() + 1);
                b.set_position(p)
            },
            |b| {
                let mut v = b.velocity();
                v.x = f32::from_bits(v.x.to_bits() + 1);
                b.set_velocity(v)
            },
            |b| {
                let mut v = b.velocity();
                v.y = f32::from_bits(v.y.to_bits() + 1);
                b.set_velocity(v)
            },
            |b| {
                let r = b.rotation();
                b.set_rotation(Radian(f32::from_bits(r.value().to_bits() + 1)))
            },
            |b| {
                let av = b.angular_velocity();
                b.set_angular_velocity(Radian(f32::from_bits(av.value().to_bits() + 1)))
            },
        ];

        for mutate in mutations {
            let mut copy = RollbackManager::new();
            let mut copy_registry = EntityRegistry::new();
            let copy_entity = copy_registry.create_entity();
            copy.spawn_player(&mut copy_registry, 0, copy_entity, Vec2::new(1.0, 2.0), Degree(0.0));
            {
                let mut body = copy
                    .last_validate_physics_manager
                    .body(copy_entity)
                    .clone();
                mutate(&mut body);
                copy.last_validate_physics_manager
                    .set_rigidbody(copy_entity, body);
            }
            assert_ne!(copy.validate_physics_digest(copy_entity), base);
        }
    }
}
