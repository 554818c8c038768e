//! Contact reactions: the dispatch seam between the collision world and the
//! owners of its colliders.

use crate::world::{ContactEvent, ContactPhase, Hit, Profile, World};

/// Receiver of contact callbacks.
///
/// Every method is a default no-op, so an implementation overrides only the
/// hooks it cares about; a pairing with no behavior costs nothing and is not
/// an error. Pair-specific behavior is the implementation's concern — match
/// on the kind tags carried by `me.profile` and `peer.profile` and let the
/// catch-all arm do nothing:
///
/// ```
/// use clash::{Hit, Profile, React, World};
///
/// #[derive(Clone, Copy, PartialEq)]
/// enum Kind { Entity, Wall, Projectile }
/// #[derive(Clone, Copy)]
/// struct Body { kind: Kind }
/// impl Profile for Body {}
///
/// struct Game;
/// impl React<Body> for Game {
///     fn on_collision(&mut self, world: &mut World<Body>, me: Hit<Body>, peer: Hit<Body>) {
///         match (me.profile.kind, peer.profile.kind) {
///             (Kind::Entity, Kind::Wall) => { let _ = world.separate(me.key, peer.key, 1.0); }
///             (Kind::Projectile, Kind::Wall) => { world.remove(me.key); }
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait React<P: Profile> {
    /// Fired every tick a pair remains touching, including the tick it
    /// entered (after [`React::on_enter`]).
    fn on_collision(&mut self, _world: &mut World<P>, _me: Hit<P>, _peer: Hit<P>) {}
    /// Fired on the tick a pair starts touching.
    fn on_enter(&mut self, _world: &mut World<P>, _me: Hit<P>, _peer: Hit<P>) {}
    /// Fired on the tick a pair stops touching.
    fn on_leave(&mut self, _world: &mut World<P>, _me: Hit<P>, _peer: Hit<P>) {}
}

pub fn dispatch<P, R>(world: &mut World<P>, events: &[ContactEvent<P>], reacter: &mut R)
where
    P: Profile,
    R: React<P>,
{
    //! Routes each event to both involved owners, `me`/`peer` swapped, so
    //! either side of a pairing reacts with the other as its argument.
    //!
    //! The events are a snapshot: reactions may freely mutate the world —
    //! separate bodies, move them, even remove colliders referenced by
    //! events later in the batch (world operations on removed keys are
    //! no-ops). Changes take effect from the next tick's snapshot.
    for event in events.iter() {
        match event.phase {
            ContactPhase::Enter => {
                reacter.on_enter(world, event.a, event.b);
                reacter.on_enter(world, event.b, event.a);
            }
            ContactPhase::Stay => {
                reacter.on_collision(world, event.a, event.b);
                reacter.on_collision(world, event.b, event.a);
            }
            ContactPhase::Leave => {
                reacter.on_leave(world, event.a, event.b);
                reacter.on_leave(world, event.b, event.a);
            }
        }
    }
}
