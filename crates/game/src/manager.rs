//! Game managers.
//!
//! [`GameManager`] is the simulation-facing half shared by client and
//! server: it owns the registry, the rollback manager and the
//! player-number table, and its spawn methods are the only place
//! entities come to life. [`ClientGameManager`] adds the client loop:
//! the start gate, the fixed-step accumulator, per-tick input packets
//! and the confirmation path for authority messages.

use glam::Vec2;
use wallball_core::{Degree, Entity, EntityRegistry, TransformManager, INVALID_ENTITY};
use wallball_physics::Layer;
use wallball_protocol::{
    Frame, GamePacket, PhysicsState, PlayerInput, PlayerInputPacket, PlayerNumber,
    INVALID_PLAYER, MAX_PLAYER_NMB,
};

use crate::globals::{
    component, FIXED_PERIOD, HORIZONTAL_WALLS_SIZE, MIDDLE_WALL_SIZE, VERTICAL_WALLS_SIZE,
    WALL_BOTTOM_POS, WALL_LEFT_POS, WALL_MIDDLE_POS, WALL_RIGHT_POS, WALL_TOP_POS,
};
use crate::rollback::RollbackManager;
use crate::walls::Walls;

/// The transport seam: the only contract the network layer implements.
pub trait PacketSender {
    fn send_unreliable(&mut self, packet: GamePacket);
    fn send_reliable(&mut self, packet: GamePacket);
}

/// Shared game state and the only entity spawn entry points.
pub struct GameManager {
    registry: EntityRegistry,
    transform_manager: TransformManager,
    rollback_manager: RollbackManager,
    player_entity_map: [Entity; MAX_PLAYER_NMB],
    winner: PlayerNumber,
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GameManager {
    pub fn new() -> Self {
        Self {
            registry: EntityRegistry::new(),
            transform_manager: TransformManager::new(),
            rollback_manager: RollbackManager::new(),
            player_entity_map: [INVALID_ENTITY; MAX_PLAYER_NMB],
            winner: INVALID_PLAYER,
        }
    }

    #[inline]
    pub fn current_frame(&self) -> Frame {
        self.rollback_manager.current_frame()
    }

    #[inline]
    pub fn last_validate_frame(&self) -> Frame {
        self.rollback_manager.last_validate_frame()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Render-facing transforms, sampled between ticks.
    pub fn transform_manager(&self) -> &TransformManager {
        &self.transform_manager
    }

    pub fn rollback_manager(&self) -> &RollbackManager {
        &self.rollback_manager
    }

    pub fn rollback_manager_mut(&mut self) -> &mut RollbackManager {
        &mut self.rollback_manager
    }

    pub fn entity_from_player_number(&self, player_number: PlayerNumber) -> Entity {
        self.player_entity_map[player_number as usize]
    }

    pub fn winner(&self) -> PlayerNumber {
        self.winner
    }

    /// Build the arena: four outer walls, the thin middle wall, and the
    /// layer matrix exceptions the level relies on.
    pub fn setup_level(&mut self) -> Walls {
        {
            let physics = self.rollback_manager.current_physics_manager_mut();
            physics.set_layer_collision(Layer::Ball, Layer::MiddleWall, false);
            physics.set_layer_collision(Layer::Wall, Layer::Wall, false);
            physics.set_layer_collision(Layer::Wall, Layer::Door, false);
            physics.set_layer_collision(Layer::Wall, Layer::MiddleWall, false);
            physics.set_layer_collision(Layer::MiddleWall, Layer::Door, false);
        }

        let left = self.rollback_manager.spawn_static_wall(
            &mut self.registry,
            WALL_LEFT_POS,
            VERTICAL_WALLS_SIZE,
            Layer::Wall,
        );
        let right = self.rollback_manager.spawn_static_wall(
            &mut self.registry,
            WALL_RIGHT_POS,
            VERTICAL_WALLS_SIZE,
            Layer::Wall,
        );
        let bottom = self.rollback_manager.spawn_static_wall(
            &mut self.registry,
            WALL_BOTTOM_POS,
            HORIZONTAL_WALLS_SIZE,
            Layer::Wall,
        );
        let top = self.rollback_manager.spawn_static_wall(
            &mut self.registry,
            WALL_TOP_POS,
            HORIZONTAL_WALLS_SIZE,
            Layer::Wall,
        );
        let middle = self.rollback_manager.spawn_static_wall(
            &mut self.registry,
            WALL_MIDDLE_POS,
            MIDDLE_WALL_SIZE,
            Layer::MiddleWall,
        );

        Walls {
            left,
            right,
            bottom,
            top,
            middle,
        }
    }

    /// Spawn a player character. Unknown player numbers and repeated
    /// spawns are dropped.
    pub fn spawn_player(
        &mut self,
        player_number: PlayerNumber,
        position: Vec2,
        rotation: Degree,
    ) {
        if player_number as usize >= MAX_PLAYER_NMB {
            log::warn!("dropping spawn for unknown player {player_number}");
            return;
        }
        if self.entity_from_player_number(player_number) != INVALID_ENTITY {
            log::warn!("player {player_number} is already spawned");
            return;
        }
        log::debug!("spawning player {player_number}");

        let entity = self.registry.create_entity();
        self.player_entity_map[player_number as usize] = entity;

        self.transform_manager.add_component(&mut self.registry, entity);
        self.transform_manager.set_position(entity, position);
        self.transform_manager.set_rotation(entity, rotation);
        self.rollback_manager
            .spawn_player(&mut self.registry, player_number, entity, position, rotation);
    }

    /// Spawn a thrown ball, logged against the current frame.
    pub fn spawn_ball(&mut self, position: Vec2, velocity: Vec2) -> Entity {
        let frame = self.rollback_manager.current_frame();
        let entity =
            self.rollback_manager
                .spawn_ball(&mut self.registry, position, velocity, frame);

        self.transform_manager.add_component(&mut self.registry, entity);
        self.transform_manager.set_position(entity, position);
        entity
    }

    /// Spawn a falling wall and its door.
    pub fn spawn_falling_wall(
        &mut self,
        door_position: f32,
        requires_ball: bool,
    ) -> (Entity, Entity) {
        self.rollback_manager
            .spawn_falling_wall(&mut self.registry, door_position, requires_ball)
    }

    pub fn destroy_entity(&mut self, entity: Entity) {
        self.rollback_manager.destroy_entity(&mut self.registry, entity);
    }

    /// Record an input. Unknown player numbers are dropped.
    pub fn set_player_input(
        &mut self,
        player_number: PlayerNumber,
        input: PlayerInput,
        input_frame: Frame,
    ) {
        if player_number == INVALID_PLAYER || player_number as usize >= MAX_PLAYER_NMB {
            log::warn!("dropping input for unknown player {player_number}");
            return;
        }
        self.rollback_manager
            .set_player_input(player_number, input, input_frame);
    }

    /// Advance the input window to `new_frame`.
    pub fn start_new_frame(&mut self, new_frame: Frame) {
        self.rollback_manager.start_new_frame(new_frame);
    }

    /// Rewind and replay up to the current frame.
    pub fn simulate_to_current_frame(&mut self) {
        let players = self.player_entity_map;
        self.rollback_manager
            .simulate_to_current_frame(&mut self.registry, &players);
    }

    /// Entry point for authority validation messages.
    pub fn validate(&mut self, new_validate_frame: Frame) {
        if self.rollback_manager.current_frame() < new_validate_frame {
            self.rollback_manager.start_new_frame(new_validate_frame);
        }
        let players = self.player_entity_map;
        self.rollback_manager
            .validate_frame(&mut self.registry, &players, new_validate_frame);
    }

    /// Validate and compare digests with the authority. Panics on
    /// mismatch.
    pub fn confirm_frame(
        &mut self,
        new_validate_frame: Frame,
        physics_states: &[PhysicsState; MAX_PLAYER_NMB],
    ) {
        let players = self.player_entity_map;
        self.rollback_manager.confirm_frame(
            &mut self.registry,
            &players,
            new_validate_frame,
            physics_states,
        );
    }

    /// Digest of one player's validated body.
    pub fn validate_physics_digest(&self, player_number: PlayerNumber) -> PhysicsState {
        self.rollback_manager
            .validate_physics_digest(self.entity_from_player_number(player_number))
    }

    /// The surviving player, or `INVALID_PLAYER` while more than one is
    /// alive.
    pub fn check_winner(&self) -> PlayerNumber {
        let mut alive = 0;
        let mut winner = INVALID_PLAYER;
        for (player_number, &entity) in self.player_entity_map.iter().enumerate() {
            if entity == INVALID_ENTITY
                || !self.registry.has_component(entity, component::PLAYER_CHARACTER)
            {
                continue;
            }
            if self.rollback_manager.player_character(entity).is_alive() {
                alive += 1;
                winner = player_number as PlayerNumber;
            }
        }
        if alive == 1 {
            winner
        } else {
            INVALID_PLAYER
        }
    }

    pub fn win_game(&mut self, winner: PlayerNumber) {
        self.winner = winner;
    }

    /// Copy the rollback transforms into the render-facing pools.
    pub fn publish_transforms(&mut self) {
        self.transform_manager.sync(&self.registry);
        for index in 0..self.registry.entity_count() as u32 {
            let entity = Entity(index);
            if !self
                .registry
                .has_component(entity, wallball_core::ComponentMask::POSITION)
            {
                continue;
            }
            let rollback_transforms = self.rollback_manager.transform_manager();
            let position = rollback_transforms.position(entity);
            let scale = rollback_transforms.scale(entity);
            let rotation = rollback_transforms.rotation(entity);
            self.transform_manager.set_position(entity, position);
            self.transform_manager.set_scale(entity, scale);
            self.transform_manager.set_rotation(entity, rotation);
        }
    }
}

/// Client-side driver around [`GameManager`].
pub struct ClientGameManager {
    game: GameManager,
    packet_sender: Box<dyn PacketSender>,
    client_player: PlayerNumber,
    fixed_timer: f32,
    starting_time: u64,
    state: u32,
}

impl ClientGameManager {
    /// Game has passed its starting time.
    pub const STARTED: u32 = 1 << 0;
    /// A win packet arrived; the simulation is frozen.
    pub const FINISHED: u32 = 1 << 1;

    pub fn new(packet_sender: Box<dyn PacketSender>) -> Self {
        Self {
            game: GameManager::new(),
            packet_sender,
            client_player: INVALID_PLAYER,
            fixed_timer: 0.0,
            starting_time: 0,
            state: 0,
        }
    }

    pub fn game(&self) -> &GameManager {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameManager {
        &mut self.game
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn set_client_player(&mut self, client_player: PlayerNumber) {
        self.client_player = client_player;
    }

    pub fn client_player(&self) -> PlayerNumber {
        self.client_player
    }

    /// Handle the start packet.
    pub fn start_game(&mut self, starting_time: u64) {
        log::debug!("game starts at {starting_time}");
        self.starting_time = starting_time;
    }

    /// Handle the win packet.
    pub fn win_game(&mut self, winner: PlayerNumber) {
        self.game.win_game(winner);
        self.state |= Self::FINISHED;
    }

    /// Per-render-frame update. Replays to the newest frame, publishes
    /// transforms for the renderer, then runs as many fixed ticks as the
    /// accumulator allows. `now_ms` is the wall clock in milliseconds
    /// since the Unix epoch.
    pub fn update(&mut self, dt: f32, now_ms: u64) {
        if self.state & Self::STARTED != 0 {
            self.game.simulate_to_current_frame();
            self.game.publish_transforms();
        }

        self.fixed_timer += dt;
        while self.fixed_timer > FIXED_PERIOD {
            self.fixed_update(now_ms);
            self.fixed_timer -= FIXED_PERIOD;
        }
    }

    /// One fixed tick: gate on the starting time, send this client's
    /// recent inputs, then advance the frame window.
    pub fn fixed_update(&mut self, now_ms: u64) {
        if self.state & Self::STARTED == 0 {
            if self.starting_time == 0 || now_ms <= self.starting_time {
                return;
            }
            self.state |= Self::STARTED;
        }
        if self.state & Self::FINISHED != 0 {
            return;
        }

        let player_number = self.client_player;
        if player_number == INVALID_PLAYER {
            // Start packet arrived before our spawn packet.
            log::warn!("fixed update without a client player number");
            return;
        }

        let current_frame = self.game.current_frame();
        let ring = self.game.rollback_manager().inputs(player_number);
        let mut packet = PlayerInputPacket {
            player_number,
            current_frame,
            ..Default::default()
        };
        for (index, slot) in packet.inputs.iter_mut().enumerate() {
            if index as Frame > current_frame {
                break;
            }
            *slot = ring[index];
        }
        self.packet_sender
            .send_unreliable(GamePacket::Input(packet));

        self.game.start_new_frame(current_frame + 1);
    }

    /// Dispatch one packet from the transport. The transport enqueues
    /// asynchronously; the simulation thread drains between ticks.
    pub fn receive_packet(&mut self, packet: GamePacket) {
        match packet {
            GamePacket::Input(packet) => {
                // Our own inputs echo back on the unreliable channel.
                if packet.player_number == self.client_player {
                    return;
                }
                // inputs[i] belongs to frame current_frame - i.
                for (index, &input) in packet.inputs.iter().enumerate() {
                    let index = index as Frame;
                    if index > packet.current_frame {
                        break;
                    }
                    self.game.set_player_input(
                        packet.player_number,
                        input,
                        packet.current_frame - index,
                    );
                }
            }
            GamePacket::SpawnPlayer(packet) => {
                self.game
                    .spawn_player(packet.player_number, packet.position, packet.rotation);
            }
            GamePacket::StartGame(packet) => self.start_game(packet.starting_time),
            GamePacket::ValidateFrame(packet) => {
                self.confirm_validate_frame(packet.frame, &packet.physics_states);
            }
            GamePacket::WinGame(packet) => self.win_game(packet.winner),
        }
    }

    /// Handle the authority's validation packet. Stale frames and frames
    /// with missing inputs are logged and ignored.
    pub fn confirm_validate_frame(
        &mut self,
        new_validate_frame: Frame,
        physics_states: &[PhysicsState; MAX_PLAYER_NMB],
    ) {
        if new_validate_frame < self.game.last_validate_frame() {
            log::warn!(
                "ignoring validation of frame {new_validate_frame}: older than {}",
                self.game.last_validate_frame()
            );
            return;
        }
        for player_number in 0..MAX_PLAYER_NMB {
            let received = self
                .game
                .rollback_manager()
                .last_received_frame(player_number as PlayerNumber);
            if received < new_validate_frame {
                log::warn!(
                    "cannot confirm frame {new_validate_frame}: player {player_number} inputs \
                     stop at {received}"
                );
                return;
            }
        }
        self.game.confirm_frame(new_validate_frame, physics_states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSender {
        unreliable: std::rc::Rc<std::cell::RefCell<Vec<GamePacket>>>,
    }

    impl PacketSender for RecordingSender {
        fn send_unreliable(&mut self, packet: GamePacket) {
            self.unreliable.borrow_mut().push(packet);
        }
        fn send_reliable(&mut self, _packet: GamePacket) {}
    }

    #[test]
    fn fixed_ticks_wait_for_the_start_gate() {
        let packets = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sender = RecordingSender {
            unreliable: packets.clone(),
        };
        let mut client = ClientGameManager::new(Box::new(sender));
        client.set_client_player(0);
        client.game_mut().spawn_player(0, Vec2::ZERO, Degree(0.0));
        client.start_game(10_000);

        // Before the starting time nothing advances.
        client.update(FIXED_PERIOD * 2.5, 9_000);
        assert_eq!(client.state() & ClientGameManager::STARTED, 0);
        assert_eq!(client.game().current_frame(), 0);
        assert!(packets.borrow().is_empty());

        // Past it, ticks run and input packets flow.
        client.update(FIXED_PERIOD * 2.5, 11_000);
        assert_ne!(client.state() & ClientGameManager::STARTED, 0);
        assert!(client.game().current_frame() > 0);
        assert!(!packets.borrow().is_empty());
    }

    #[test]
    fn input_packet_carries_the_newest_inputs() {
        let packets = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sender = RecordingSender {
            unreliable: packets.clone(),
        };
        let mut client = ClientGameManager::new(Box::new(sender));
        client.set_client_player(0);
        client.game_mut().spawn_player(0, Vec2::ZERO, Degree(0.0));
        client.start_game(1);

        let shoot = PlayerInput::from_bits(PlayerInput::SHOOT);
        client.game_mut().set_player_input(0, shoot, 0);
        client.fixed_update(100);

        let packets = packets.borrow();
        match &packets[0] {
            GamePacket::Input(packet) => {
                assert_eq!(packet.player_number, 0);
                assert_eq!(packet.current_frame, 0);
                assert_eq!(packet.inputs[0], shoot);
            }
            other => panic!("expected an input packet, got {other:?}"),
        }
    }

    #[test]
    fn packets_drive_the_client() {
        use wallball_protocol::{SpawnPlayerPacket, StartGamePacket, WinGamePacket};

        let mut client = ClientGameManager::new(Box::new(RecordingSender::default()));
        client.set_client_player(0);

        client.receive_packet(GamePacket::SpawnPlayer(SpawnPlayerPacket {
            player_number: 1,
            position: Vec2::new(0.5, 0.0),
            rotation: Degree(0.0),
        }));
        assert_ne!(client.game().entity_from_player_number(1), INVALID_ENTITY);

        client.receive_packet(GamePacket::StartGame(StartGamePacket { starting_time: 123 }));

        let mut inputs = PlayerInputPacket {
            player_number: 1,
            current_frame: 3,
            ..Default::default()
        };
        inputs.inputs[0] = PlayerInput::from_bits(PlayerInput::LEFT);
        client.receive_packet(GamePacket::Input(inputs));
        assert_eq!(client.game().rollback_manager().last_received_frame(1), 3);

        client.receive_packet(GamePacket::WinGame(WinGamePacket { winner: 1 }));
        assert_ne!(client.state() & ClientGameManager::FINISHED, 0);
        assert_eq!(client.game().winner(), 1);
    }

    #[test]
    fn unknown_player_input_is_dropped() {
        let mut game = GameManager::new();
        game.set_player_input(INVALID_PLAYER, PlayerInput::new(), 0);
        game.set_player_input(7, PlayerInput::new(), 0);
        assert_eq!(game.current_frame(), 0);
    }

    #[test]
    fn winner_needs_a_single_survivor() {
        let mut game = GameManager::new();
        game.spawn_player(0, Vec2::new(-0.5, 0.0), Degree(0.0));
        game.spawn_player(1, Vec2::new(0.5, 0.0), Degree(0.0));
        assert_eq!(game.check_winner(), INVALID_PLAYER);
    }
}
