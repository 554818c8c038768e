//! clash is a realtime 2D collision detection and resolution library for
//! arbitrarily rotated rectangular colliders.
//!
//! The pipeline per game tick: collider poses are pulled from their owners,
//! a quadtree broadphase proposes candidate pairs, a separating-axis test
//! confirms them, and the [`World`] diffs the result against the remembered
//! contact set to emit enter/stay/leave [`ContactEvent`]s. Owners react
//! through the [`React`] trait and may resolve penetration with
//! [`World::separate`] or the helpers in [`resolve`].
//!
//! Compile with the `f64` feature to switch all scalar math from `f32` to
//! `f64`.
//!
//! # Example
//! ```
//! use clash::{Aabb, Pose, Profile, Vec2, World};
//!
//! #[derive(Clone, Copy, PartialEq)]
//! enum Tag { Crate, Wall }
//! impl Profile for Tag {}
//!
//! let bounds = Aabb::new(-100.0, -100.0, 100.0, 100.0);
//! let mut world = World::new(bounds, 8).unwrap();
//! let krate = world.insert(Tag::Crate, Pose::new(Vec2::new(0.0, 0.0), 0.0), 10.0, 10.0);
//! let wall = world.insert(Tag::Wall, Pose::new(Vec2::new(8.0, 0.0), 0.0), 10.0, 10.0);
//!
//! let events = world.step(|_, _| {});
//! assert!(world.touching(krate, wall));
//! assert_eq!(events.len(), 2); // enter, then the first stay
//! ```

/// Scalar type used throughout; `f32` by default, `f64` behind the `f64` feature.
#[cfg(not(feature = "f64"))]
pub type Fp = f32;
/// Scalar type used throughout; `f32` by default, `f64` behind the `f64` feature.
#[cfg(feature = "f64")]
pub type Fp = f64;

/// 2D vector of [`Fp`].
#[cfg(not(feature = "f64"))]
pub type Vec2 = glam::Vec2;
/// 2D vector of [`Fp`].
#[cfg(feature = "f64")]
pub type Vec2 = glam::DVec2;

pub mod broad;
pub mod narrow;
pub mod react;
pub mod resolve;
pub mod world;

pub use broad::{Point, QuadTree, TreeError};
pub use narrow::{Aabb, Obb};
pub use react::{dispatch, React};
pub use world::{
    Broadphase, Collider, ColliderKey, ContactEvent, ContactPhase, Hit, Pose, Profile, World,
};
