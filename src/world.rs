//! The collision world: collider registry, per-tick pipeline, and
//! contact-state tracking.
//!
//! Contact bookkeeping lives here and only here. Colliders expose geometry
//! queries but never mutate their own contact sets; every link/unlink is a
//! single transaction performed by the [`World`], which is what keeps the
//! sets symmetric at every tick boundary.

use fnv::{FnvBuildHasher, FnvHashSet};
use indexmap::IndexSet;
use slotmap::SlotMap;

use crate::broad::{Point, QuadTree, TreeError};
use crate::narrow::{Aabb, Obb};
use crate::{Fp, Vec2};

slotmap::new_key_type! {
    /// Stable handle of a registered collider.
    ///
    /// Keys stay valid across insertions and removals of other colliders;
    /// operations on a key whose collider is gone are no-ops.
    pub struct ColliderKey;
}

/// Insertion-ordered so contact events come out in a deterministic order.
type PairSet = IndexSet<(ColliderKey, ColliderKey), FnvBuildHasher>;

#[inline]
fn ordered(a: ColliderKey, b: ColliderKey) -> (ColliderKey, ColliderKey) {
    if a <= b { (a, b) } else { (b, a) }
}

// ---------- Owner-facing data ---------- //

/// Per-collider owner payload, carried through the pipeline and into events.
///
/// Keep it small and `Copy`: typically the owner's own handle plus a kind
/// tag for dispatch.
pub trait Profile: Copy {
    /// Whether contacts between these two colliders should be tracked at
    /// all. Checked both ways before the narrowphase; a `false` pair never
    /// touches.
    fn can_interact(&self, _other: &Self) -> bool {
        true
    }
}

/// A collider transform, synced one-way from the owning object every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    /// Rotation in radians.
    pub angle: Fp,
}
impl Pose {
    #[inline]
    pub fn new(pos: Vec2, angle: Fp) -> Pose {
        Pose { pos, angle }
    }
}

/// One side of a contact as seen from an event.
#[derive(Debug, Clone, Copy)]
pub struct Hit<P> {
    pub key: ColliderKey,
    pub profile: P,
}

/// Where in its lifecycle a contact pair is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// The pair began touching this tick.
    Enter,
    /// The pair is touching; emitted every tick it remains so, including the
    /// tick it entered (after [`ContactPhase::Enter`]).
    Stay,
    /// The pair stopped touching this tick.
    Leave,
}

/// A contact transition or continuation between two colliders, computed from
/// the tick's frozen pose snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent<P> {
    pub phase: ContactPhase,
    pub a: Hit<P>,
    pub b: Hit<P>,
}

/// Candidate-pair enumeration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadphase {
    /// Quadtree-pruned candidate pairs. The default.
    Tree,
    /// Exhaustive `i < j` enumeration. O(n²), worth it only for small
    /// scenes, but logically identical to [`Broadphase::Tree`] — handy for
    /// differential testing.
    Scan,
}

// ---------- Collider ---------- //

/// A registered oriented-rectangle collider.
///
/// The pose is derived from the owner (the owner is authoritative); the
/// contact set is owned by the [`World`]. This surface is read-only.
#[derive(Debug)]
pub struct Collider<P> {
    profile: P,
    pose: Pose,
    half: Vec2,
    contacts: FnvHashSet<ColliderKey>,
}

impl<P> Collider<P> {
    #[inline]
    pub fn profile(&self) -> &P {
        &self.profile
    }
    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    #[inline]
    pub fn obb(&self) -> Obb {
        Obb {
            pos: self.pose.pos,
            half: self.half,
            angle: self.pose.angle,
        }
    }
    #[inline]
    pub fn verts(&self) -> [Vec2; 4] {
        self.obb().verts()
    }
    #[inline]
    pub fn bounding_box(&self) -> Aabb {
        self.obb().bounding_box()
    }

    pub fn overlap_test(&self, other: &Collider<P>) -> bool {
        //! Direct narrowphase test against another collider, outside the
        //! tick pipeline; no contact state is touched. This is the query
        //! surface for collaborators like walkability classification.
        self.obb().obb_test(&other.obb())
    }

    pub fn contacts(&self) -> impl Iterator<Item = ColliderKey> + '_ {
        //! The colliders currently touching this one.
        self.contacts.iter().copied()
    }
    #[inline]
    pub fn in_contact_with(&self, key: ColliderKey) -> bool {
        self.contacts.contains(&key)
    }
}

// ---------- World ---------- //

/// The collision manager: registry of live colliders, broadphase index, and
/// the contact-state machine over unordered collider pairs.
pub struct World<P: Profile> {
    colliders: SlotMap<ColliderKey, Collider<P>>,
    pairs: PairSet,
    tree: QuadTree<ColliderKey>,
    broadphase: Broadphase,
    query_buf: Vec<ColliderKey>,
    outlier_buf: Vec<ColliderKey>,
}

impl<P: Profile> World<P> {
    pub fn new(bounds: Aabb, capacity: usize) -> Result<World<P>, TreeError> {
        //! Returns a world whose broadphase covers `bounds` with the given
        //! per-node capacity, or fails fast on an invalid configuration.
        Ok(World {
            colliders: SlotMap::with_key(),
            pairs: PairSet::default(),
            tree: QuadTree::new(bounds, capacity)?,
            broadphase: Broadphase::Tree,
            query_buf: Vec::new(),
            outlier_buf: Vec::new(),
        })
    }

    #[inline]
    pub fn broadphase(&self) -> Broadphase {
        self.broadphase
    }
    #[inline]
    pub fn set_broadphase(&mut self, broadphase: Broadphase) {
        self.broadphase = broadphase;
    }

    pub fn insert(&mut self, profile: P, pose: Pose, width: Fp, height: Fp) -> ColliderKey {
        //! Registers a collider and returns its stable key.
        self.colliders.insert(Collider {
            profile,
            pose,
            half: Vec2::new(width.abs(), height.abs()) * 0.5,
            contacts: FnvHashSet::default(),
        })
    }

    pub fn remove(&mut self, key: ColliderKey) -> bool {
        //! Unregisters a collider, unlinking it from every peer's contact
        //! set before it leaves the registry so no dangling back-reference
        //! survives. No `Leave` is emitted for its open contacts. Returns
        //! false if the key was already gone.
        let peers: Vec<ColliderKey> = match self.colliders.get(key) {
            Some(c) => c.contacts.iter().copied().collect(),
            None => return false,
        };
        for peer in peers {
            if let Some(c) = self.colliders.get_mut(peer) {
                c.contacts.remove(&key);
            }
            self.pairs.swap_remove(&ordered(key, peer));
        }
        self.colliders.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        //! Drops every collider and all contact state.
        self.colliders.clear();
        self.pairs.clear();
        self.tree.clear();
    }

    #[inline]
    pub fn get(&self, key: ColliderKey) -> Option<&Collider<P>> {
        self.colliders.get(key)
    }
    pub fn iter(&self) -> impl Iterator<Item = (ColliderKey, &Collider<P>)> {
        //! All live colliders, in registry order.
        self.colliders.iter()
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn set_pose(&mut self, key: ColliderKey, pose: Pose) -> bool {
        //! Force-refreshes a collider transform outside the per-tick sync.
        match self.colliders.get_mut(key) {
            Some(c) => {
                c.pose = pose;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn touching(&self, a: ColliderKey, b: ColliderKey) -> bool {
        //! Whether the pair is currently in the `Touching` state.
        self.pairs.contains(&ordered(a, b))
    }

    pub fn step<F>(&mut self, mut sync: F) -> Vec<ContactEvent<P>>
    where
        F: FnMut(&P, &mut Pose),
    {
        //! Runs one collision tick and returns its contact events, enters
        //! and stays in pair-discovery order followed by leaves.
        //!
        //! `sync` is called exactly once per collider, up front, to pull the
        //! pose from the owning object; all pair decisions for the tick are
        //! then made against that single frozen snapshot. Reactions applied
        //! while draining the returned events affect the next tick only.

        // 1. one-way owner sync
        for (_, c) in self.colliders.iter_mut() {
            sync(&c.profile, &mut c.pose);
        }

        // 2/3. broadphase candidates, narrowphase confirmation
        let now = match self.broadphase {
            Broadphase::Tree => self.tree_confirmed(),
            Broadphase::Scan => self.scan_confirmed(),
        };
        log::trace!(
            "step: {} colliders, {} touching pairs",
            self.colliders.len(),
            now.len()
        );

        // 4. diff against the remembered pair set
        let mut events = Vec::new();
        for &(a, b) in now.iter() {
            if self.pairs.insert((a, b)) {
                self.link(a, b);
                log::debug!("contact enter: {:?} <-> {:?}", a, b);
                events.push(self.event(ContactPhase::Enter, a, b));
            }
            events.push(self.event(ContactPhase::Stay, a, b));
        }
        let leaving: Vec<(ColliderKey, ColliderKey)> = self
            .pairs
            .iter()
            .copied()
            .filter(|pair| !now.contains(pair))
            .collect();
        for (a, b) in leaving {
            self.pairs.swap_remove(&(a, b));
            self.unlink(a, b);
            log::debug!("contact leave: {:?} <-> {:?}", a, b);
            events.push(self.event(ContactPhase::Leave, a, b));
        }
        events
    }

    pub fn separate(
        &mut self,
        movable: ColliderKey,
        rigid: ColliderKey,
        smoothness: Fp,
    ) -> Option<Vec2> {
        //! Computes the minimum displacement separating `movable` from
        //! `rigid`, applies it to `movable`'s pose immediately, and returns
        //! it so the owner can mirror it onto its own position or velocity.
        //!
        //! A no-op returning `None` when the two are not penetrating or
        //! either key is gone. See [`crate::resolve::separation`].
        let m = self.colliders.get(movable)?;
        let r = self.colliders.get(rigid)?;
        let delta = crate::resolve::separation(&m.obb(), &r.obb(), smoothness)?;
        self.colliders.get_mut(movable)?.pose.pos += delta;
        Some(delta)
    }

    // ---------- pipeline internals ---------- //

    fn link(&mut self, a: ColliderKey, b: ColliderKey) {
        if let Some(c) = self.colliders.get_mut(a) {
            c.contacts.insert(b);
        }
        if let Some(c) = self.colliders.get_mut(b) {
            c.contacts.insert(a);
        }
    }
    fn unlink(&mut self, a: ColliderKey, b: ColliderKey) {
        if let Some(c) = self.colliders.get_mut(a) {
            c.contacts.remove(&b);
        }
        if let Some(c) = self.colliders.get_mut(b) {
            c.contacts.remove(&a);
        }
    }

    fn event(&self, phase: ContactPhase, a: ColliderKey, b: ColliderKey) -> ContactEvent<P> {
        // both keys are live: `now` holds only live keys and `remove`
        // scrubs `pairs`
        ContactEvent {
            phase,
            a: Hit { key: a, profile: self.colliders[a].profile },
            b: Hit { key: b, profile: self.colliders[b].profile },
        }
    }

    fn confirm(&self, a: ColliderKey, b: ColliderKey) -> bool {
        //! Interaction filter, then the exact SAT test.
        let ca = &self.colliders[a];
        let cb = &self.colliders[b];
        ca.profile.can_interact(&cb.profile)
            && cb.profile.can_interact(&ca.profile)
            && ca.obb().obb_test(&cb.obb())
    }

    fn tree_confirmed(&mut self) -> PairSet {
        //! Rebuilds the quadtree from all live colliders and confirms the
        //! candidate pairs it proposes. Colliders whose center falls outside
        //! the broadphase bounds are kept aside and tested exhaustively, so
        //! the index never omits a true collision.
        self.tree.clear();
        let mut outliers = std::mem::take(&mut self.outlier_buf);
        outliers.clear();

        for (key, c) in self.colliders.iter() {
            let accepted = self.tree.insert(Point {
                pos: c.pose.pos,
                aabb: c.bounding_box(),
                item: key,
            });
            if !accepted {
                log::warn!("collider {:?} is outside the broadphase bounds", key);
                outliers.push(key);
            }
        }

        let mut now = PairSet::default();
        let mut buf = std::mem::take(&mut self.query_buf);
        for (key, c) in self.colliders.iter() {
            if outliers.contains(&key) {
                continue; // handled below
            }
            buf.clear();
            self.tree.query(&c.bounding_box(), &mut buf);
            for &other in buf.iter() {
                // the query is symmetric, so each unordered pair shows up
                // from both ends; take it once
                if key < other && self.confirm(key, other) {
                    now.insert((key, other));
                }
            }
        }

        // outlier pairs cannot be proposed by the tree; scan them against
        // everything, deduplicating the outlier-outlier pairs
        let mut seen: FnvHashSet<(ColliderKey, ColliderKey)> = FnvHashSet::default();
        for &o in outliers.iter() {
            for (other, _) in self.colliders.iter() {
                if other == o {
                    continue;
                }
                let pair = ordered(o, other);
                if !seen.insert(pair) {
                    continue;
                }
                if self.confirm(pair.0, pair.1) {
                    now.insert(pair);
                }
            }
        }

        self.query_buf = buf;
        self.outlier_buf = outliers;
        now
    }

    fn scan_confirmed(&self) -> PairSet {
        //! Confirms pairs by brute-force `i < j` enumeration.
        let mut now = PairSet::default();
        let keys: Vec<ColliderKey> = self.colliders.keys().collect();
        for (i, &a) in keys.iter().enumerate() {
            for &b in keys[i + 1..].iter() {
                let pair = ordered(a, b);
                if self.confirm(pair.0, pair.1) {
                    now.insert(pair);
                }
            }
        }
        now
    }
}
