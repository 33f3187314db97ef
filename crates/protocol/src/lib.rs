//! Wallball Protocol - wire vocabulary shared by both peers.
//!
//! Everything the transport moves between clients and the server lives
//! here: the one-byte input bitmask, the packet structs and the binary
//! codec. The transport itself (sockets, reliability) is a separate
//! concern and only sees encoded bytes.

pub mod codec;
pub mod input;
pub mod messages;

pub use codec::{decode, encode, CodecError};
pub use input::PlayerInput;
pub use messages::{
    GamePacket, PlayerInputPacket, SpawnPlayerPacket, StartGamePacket, ValidateFramePacket,
    WinGamePacket,
};

/// Identifies a player, starting at 0.
pub type PlayerNumber = u8;

/// Sentinel for an unassigned player number.
pub const INVALID_PLAYER: PlayerNumber = PlayerNumber::MAX;

/// Simulation frame counter.
pub type Frame = u32;

/// 32-bit fingerprint of one player's physics body, compared between
/// peers to detect desyncs.
pub type PhysicsState = u32;

/// Maximum number of players in a game. The input buffers, digest
/// arrays and spawn table are all sized by this.
pub const MAX_PLAYER_NMB: usize = 2;

/// Number of recent input frames carried by one [`PlayerInputPacket`].
pub const MAX_INPUT_NMB: usize = 50;
