//! Broadphase data and logic module: a point quadtree rebuilt from the live
//! collider set every tick.

use crate::narrow::Aabb;
use crate::Vec2;
use thiserror::Error;

/// Subdivision stops here; overfull leaves simply grow. Keeps stacks of
/// identically-positioned points from recursing without bound.
const MAX_DEPTH: u8 = 16;

/// Broadphase construction failure. Invalid configuration is fatal and
/// reported immediately; `insert` and `query` themselves never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("quadtree node capacity must be at least 1, got {0}")]
    Capacity(usize),
    #[error("quadtree boundary must be finite with positive extent")]
    Boundary,
}

/// A collider's center position plus its bounding box and an opaque handle
/// back to it.
///
/// The box rides along so range queries can match colliders whose bounds
/// reach into the range even when their centers do not.
#[derive(Debug, Clone, Copy)]
pub struct Point<T> {
    pub pos: Vec2,
    pub aabb: Aabb,
    pub item: T,
}

/// A point quadtree over a fixed boundary.
///
/// Nodes hold up to `capacity` points, then lazily subdivide into four equal
/// quadrants. The tree is built fresh from all live colliders every tick
/// (via [`QuadTree::clear`]) rather than updated incrementally; rebuilding is
/// cheap and immune to stale-node bugs under heavy spawn/despawn churn.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    boundary: Aabb,
    reach: Aabb,
    capacity: usize,
    depth: u8,
    points: Vec<Point<T>>,
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Copy> QuadTree<T> {
    pub fn new(boundary: Aabb, capacity: usize) -> Result<QuadTree<T>, TreeError> {
        //! Returns a tree over `boundary`, or the configuration error if
        //! `capacity` is zero or `boundary` is non-finite or degenerate.
        if capacity < 1 {
            return Err(TreeError::Capacity(capacity));
        }
        let ok = boundary.min.x.is_finite() && boundary.min.y.is_finite()
            && boundary.max.x.is_finite() && boundary.max.y.is_finite()
            && boundary.min.x < boundary.max.x && boundary.min.y < boundary.max.y;
        if !ok {
            return Err(TreeError::Boundary);
        }
        Ok(QuadTree::node(boundary, capacity, 0))
    }

    fn node(boundary: Aabb, capacity: usize, depth: u8) -> QuadTree<T> {
        QuadTree {
            boundary,
            reach: boundary,
            capacity,
            depth,
            points: Vec::new(),
            children: None,
        }
    }

    #[inline]
    pub fn boundary(&self) -> Aabb {
        self.boundary
    }

    pub fn clear(&mut self) {
        //! Discards all points and children; boundary and capacity are kept,
        //! as is the root's point allocation.
        self.points.clear();
        self.children = None;
        self.reach = self.boundary;
    }

    pub fn insert(&mut self, point: Point<T>) -> bool {
        //! Stores `point`, subdividing as needed. Returns false without
        //! storing anything if `point.pos` lies outside the boundary.
        if !self.boundary.point_test(point.pos) {
            return false;
        }
        // the subtree's query reach covers every stored box, so oversized
        // colliders are still found from far-away ranges
        self.reach = self.reach.union(&point.aabb);

        if self.points.len() < self.capacity || self.depth == MAX_DEPTH {
            self.points.push(point);
            return true;
        }

        if self.children.is_none() {
            self.subdivide();
        }
        match self.children.as_mut() {
            Some(children) => children.iter_mut().any(|child| child.insert(point)),
            None => false,
        }
    }

    fn subdivide(&mut self) {
        let Aabb { min, max } = self.boundary;
        let c = self.boundary.center();
        let (cap, depth) = (self.capacity, self.depth + 1);
        self.children = Some(Box::new([
            QuadTree::node(Aabb::new(c.x, c.y, max.x, max.y), cap, depth), // ne
            QuadTree::node(Aabb::new(min.x, c.y, c.x, max.y), cap, depth), // nw
            QuadTree::node(Aabb::new(c.x, min.y, max.x, c.y), cap, depth), // se
            QuadTree::node(Aabb::new(min.x, min.y, c.x, c.y), cap, depth), // sw
        ]));
    }

    pub fn query(&self, range: &Aabb, out: &mut Vec<T>) {
        //! Collects the handle of every stored point whose bounding box
        //! intersects `range`. May include boxes the narrowphase will reject;
        //! never omits an intersecting one.
        if !self.reach.aabb_test(range) {
            return;
        }
        for p in self.points.iter() {
            if p.aabb.aabb_test(range) {
                out.push(p.item);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(range, out);
            }
        }
    }

    pub fn len(&self) -> usize {
        //! Returns the number of points stored in this subtree.
        self.points.len()
            + self.children.as_ref().map_or(0, |c| c.iter().map(QuadTree::len).sum())
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn height(&self) -> usize {
        //! Returns the height of the subtree; 1 for an undivided node.
        1 + self.children.as_ref().map_or(0, |c| {
            c.iter().map(QuadTree::height).max().unwrap_or(0)
        })
    }
}
