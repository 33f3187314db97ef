//! Wallball Physics - deterministic fixed-step 2D physics.
//!
//! Integration, a uniform-grid broad phase, AABB/circle narrow phase,
//! impulse and positional solvers, layer filtering and trigger/collision
//! events. Everything here must produce bit-identical results for
//! identical inputs on every client; the rollback manager replays the
//! same frames many times and compares digests with the authority.
//!
//! # Determinism Rules
//!
//! 1. Dense `Vec` iteration only, in ascending entity order
//! 2. No randomness, no time - the caller owns the fixed step
//! 3. Collision pairs are canonically ordered and deduplicated before
//!    solving

pub mod body;
pub mod collider;
pub mod engine;
pub mod grid;
pub mod layers;
pub mod solver;

pub use body::{BodyType, Rigidbody, Transform};
pub use collider::{AabbCollider, CircleCollider, Collider, Collision, Manifold};
pub use engine::PhysicsManager;
pub use grid::SpatialGrid;
pub use layers::{Layer, LayerCollisionMatrix};
