//! Wallball Game - the rollback-networked simulation.
//!
//! Two players share a walled arena. Balls are thrown to open the doors
//! of walls falling from above; the wall itself crushes whoever it
//! reaches. Every client predicts the opponent's input, simulates ahead,
//! and rewinds/replays when authoritative input arrives. The server
//! validates frames and ships physics digests; a digest mismatch is a
//! desync and fatal.
//!
//! All simulation state lives in component pools so a rollback is a pool
//! copy plus a deterministic replay.

pub mod ball;
pub mod globals;
pub mod manager;
pub mod player;
pub mod rollback;
pub mod walls;

pub use ball::{Ball, BallManager};
pub use manager::{ClientGameManager, GameManager, PacketSender};
pub use player::{PlayerCharacter, PlayerCharacterManager};
pub use rollback::RollbackManager;
pub use walls::{FallingDoor, FallingObject, WallManager, Walls};
