//! Game-wide constants and component slots.

use glam::Vec2;
use wallball_core::ComponentMask;

pub use wallball_protocol::{Frame, PlayerNumber, INVALID_PLAYER, MAX_INPUT_NMB, MAX_PLAYER_NMB};

/// Movement force applied per pressed direction.
pub const PLAYER_SPEED: f32 = 400.0;

/// Velocity kept per step; the rest bleeds off so the movement force
/// reaches a terminal speed.
pub const PLAYER_DRAG_FACTOR: f32 = 0.9;

/// Half extent of the square player collider, meters.
pub const PLAYER_COLLIDER_HALF_EXTENT: f32 = 0.25;

pub const PLAYER_HEALTH: i32 = 1;

/// Base throw speed added on top of the aligned player speed.
pub const BALL_SPEED: f32 = 2.0;

pub const BALL_SCALE: f32 = 0.3;

pub const BALL_RESTITUTION: f32 = 1.0;

/// Input frames kept per player: 5 seconds at 50 Hz.
pub const WINDOW_BUFFER_SIZE: usize = 5 * 50;

/// Delay between the start packet and the first simulated frame,
/// milliseconds.
pub const START_DELAY: u64 = 3000;

/// The fixed simulation step, seconds.
pub const FIXED_PERIOD: f32 = 1.0 / 50.0;

pub const SPAWN_POSITIONS: [Vec2; MAX_PLAYER_NMB] =
    [Vec2::new(-0.5, 0.0), Vec2::new(0.5, 0.0)];

/// There is a single ball in play; this player holds it at spawn.
pub const STARTING_BALL_HOLDER: PlayerNumber = 0;

pub const VERTICAL_WALLS_SIZE: Vec2 = Vec2::new(1.0, 100.0);
pub const HORIZONTAL_WALLS_SIZE: Vec2 = Vec2::new(100.0, 0.4);
pub const MIDDLE_WALL_SIZE: Vec2 = Vec2::new(0.1, 100.0);
pub const WALL_LEFT_POS: Vec2 = Vec2::new(-9.0, 0.0);
pub const WALL_RIGHT_POS: Vec2 = Vec2::new(9.0, 0.0);
pub const WALL_BOTTOM_POS: Vec2 = Vec2::new(0.0, -4.1);
pub const WALL_TOP_POS: Vec2 = Vec2::new(0.0, 4.9);
pub const WALL_MIDDLE_POS: Vec2 = Vec2::new(0.0, 0.0);

/// Walls bounce balls back at full speed.
pub const WALL_RESTITUTION: f32 = 1.0;

pub const FALLING_WALL_SIZE: Vec2 = Vec2::new(100.0, 0.3);

/// The door collider is slightly taller than the wall it sits in, so
/// the opening triggers before the crush.
pub const FALLING_WALL_DOOR_COLLIDER_OFFSET: f32 = 0.2;
pub const FALLING_WALL_DOOR_SIZE: Vec2 = Vec2::new(
    1.5,
    FALLING_WALL_SIZE.y + FALLING_WALL_DOOR_COLLIDER_OFFSET,
);

/// Height at which falling walls appear, meters.
pub const FALLING_WALL_SPAWN_HEIGHT: f32 = 6.0;

/// Downward speed shared by a falling wall and its door, m/s.
pub const FALLING_WALL_SPEED: f32 = 0.5;

pub const DESTROY_WALL_SCORE_INCREMENT: u32 = 100;

/// Game-specific component slots, stacked on the engine's reserved
/// bits.
pub mod component {
    use super::ComponentMask;

    pub const PLAYER_CHARACTER: ComponentMask = ComponentMask(ComponentMask::OTHER.0);
    pub const BALL: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 1);
    pub const FALLING_OBJECT: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 2);
    pub const FALLING_DOOR: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 3);
    pub const STATIC_WALL: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 4);
    pub const DAMAGER: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 5);

    /// Soft destruction flag: the entity survives rollback across its
    /// destruction frame and is freed on the next validation.
    pub const DESTROYED: ComponentMask = ComponentMask(ComponentMask::OTHER.0 << 6);
}
