//! Packet types.
//!
//! All messages exchanged between peers. Input packets are sent
//! unreliably every fixed tick; everything else rides the reliable
//! channel.

use bincode::{Decode, Encode};
use glam::Vec2;
use wallball_core::Degree;

use crate::input::PlayerInput;
use crate::{Frame, PhysicsState, PlayerNumber, MAX_INPUT_NMB, MAX_PLAYER_NMB};

/// All possible game packets.
#[derive(Debug, Clone, Encode, Decode)]
pub enum GamePacket {
    /// Most recent inputs of one player. Unreliable.
    Input(PlayerInputPacket),

    /// Server spawns a player character. Reliable.
    SpawnPlayer(SpawnPlayerPacket),

    /// Server announces the start time. Reliable.
    StartGame(StartGamePacket),

    /// Server validates a frame and ships its digests. Reliable.
    ValidateFrame(ValidateFramePacket),

    /// Server announces the winner. Reliable.
    WinGame(WinGamePacket),
}

/// The last [`MAX_INPUT_NMB`] inputs of one player, newest first.
/// `inputs[0]` is the input for `current_frame`.
#[derive(Debug, Clone, Encode, Decode)]
pub struct PlayerInputPacket {
    pub player_number: PlayerNumber,
    pub current_frame: Frame,
    pub inputs: [PlayerInput; MAX_INPUT_NMB],
}

impl Default for PlayerInputPacket {
    fn default() -> Self {
        Self {
            player_number: crate::INVALID_PLAYER,
            current_frame: 0,
            inputs: [PlayerInput::default(); MAX_INPUT_NMB],
        }
    }
}

/// Spawn order for one player character.
#[derive(Debug, Clone, Encode, Decode)]
pub struct SpawnPlayerPacket {
    pub player_number: PlayerNumber,
    #[bincode(with_serde)]
    pub position: Vec2,
    pub rotation: Degree,
}

/// Wall-clock start time, milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Encode, Decode)]
pub struct StartGamePacket {
    pub starting_time: u64,
}

/// Authority-side validation of `frame`, with the per-player physics
/// digests the clients must match.
#[derive(Debug, Clone, Copy, Encode, Decode)]
pub struct ValidateFramePacket {
    pub frame: Frame,
    pub physics_states: [PhysicsState; MAX_PLAYER_NMB],
}

/// End of game.
#[derive(Debug, Clone, Copy, Encode, Decode)]
pub struct WinGamePacket {
    pub winner: PlayerNumber,
}
