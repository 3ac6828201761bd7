// Copyright 2025 Lars Brubaker
// License: MIT
//
// The beach line: the left-to-right sequence of parabolic arcs still active
// under the sweep line.
//
// Arcs live in a BucketAlloc arena and are organized as a bottom-up splay
// tree keyed by position along the line. Each arc also carries `side` links
// to its left and right neighbors, so neighbor access is O(1) and the tree is
// only consulted to locate the arc above a new site.
//
// The breakpoint on the left of an arc separates it from its left neighbor.
// `left_edge` is the half-edge that breakpoint traces. It belongs to the left
// neighbor's site and its origin is where the breakpoint was born.

use crate::bucketalloc::BucketAlloc;
use crate::mesh::{EdgeIdx, SiteIdx};
use crate::sweep::EventIdx;

/// Index into the arc arena.
pub type ArcIdx = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Branch {
    Left = 0,
    Right = 1,
}

use Branch::{Left, Right};

impl Branch {
    #[inline]
    fn idx(self) -> usize {
        self as usize
    }

    #[inline]
    fn inv(self) -> Self {
        match self {
            Left => Right,
            Right => Left,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Arc {
    pub site: SiteIdx,
    /// Half-edge traced by the breakpoint on the left of this arc.
    pub left_edge: Option<EdgeIdx>,
    /// Pending circle event in which this arc disappears.
    pub circle: Option<EventIdx>,

    children: [Option<ArcIdx>; 2],
    parent: Option<ArcIdx>,
    side: [Option<ArcIdx>; 2],
}

#[derive(Default)]
pub struct BeachLine {
    arcs: BucketAlloc<Arc>,
    root: Option<ArcIdx>,
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    #[inline]
    pub fn arc(&self, a: ArcIdx) -> &Arc {
        &self.arcs[a]
    }

    #[inline]
    pub fn arc_mut(&mut self, a: ArcIdx) -> &mut Arc {
        &mut self.arcs[a]
    }

    /// Left neighbor.
    #[inline]
    pub fn prev(&self, a: ArcIdx) -> Option<ArcIdx> {
        self.arcs[a].side[Left.idx()]
    }

    /// Right neighbor.
    #[inline]
    pub fn next(&self, a: ArcIdx) -> Option<ArcIdx> {
        self.arcs[a].side[Right.idx()]
    }

    /// Leftmost arc.
    pub fn first(&self) -> Option<ArcIdx> {
        let mut a = self.root?;
        while let Some(l) = self.arcs[a].children[Left.idx()] {
            a = l;
        }
        Some(a)
    }

    /// Rightmost arc.
    pub fn last(&self) -> Option<ArcIdx> {
        let mut a = self.root?;
        while let Some(r) = self.arcs[a].children[Right.idx()] {
            a = r;
        }
        Some(a)
    }

    /// Sites of all arcs, left to right.
    pub fn sites(&self) -> Vec<SiteIdx> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.first();
        while let Some(a) = cur {
            out.push(self.arcs[a].site);
            cur = self.next(a);
        }
        out
    }

    fn new_arc(&mut self, site: SiteIdx, left_edge: Option<EdgeIdx>) -> ArcIdx {
        self.arcs.insert(Arc {
            site,
            left_edge,
            ..Arc::default()
        })
    }

    /// Append an arc at the right end of the line.
    pub fn push_back(&mut self, site: SiteIdx, left_edge: Option<EdgeIdx>) -> ArcIdx {
        let node = self.new_arc(site, left_edge);
        match self.last() {
            None => self.root = Some(node),
            Some(last) => {
                self.splay(last);
                self.insert_right(last, node);
                self.splay(node);
            }
        }
        node
    }

    /// Insert a new arc immediately to the right of `a`.
    pub fn insert_after(&mut self, a: ArcIdx, site: SiteIdx, left_edge: Option<EdgeIdx>) -> ArcIdx {
        let node = self.new_arc(site, left_edge);
        self.splay(a);
        self.insert_right(a, node);
        self.splay(node);
        node
    }

    /// Remove arc `a`, joining its neighbors, and free its slot.
    pub fn remove(&mut self, a: ArcIdx) {
        self.splay(a);
        self.pop_root();
        self.arcs.free(a);
    }

    /// Splay and return the last arc in `[true, ..., true, false, ..., false]`
    /// order under `pred`. Returns None if the predicate fails everywhere.
    pub fn locate_last<F>(&mut self, pred: F) -> Option<ArcIdx>
    where
        F: Fn(&Self, ArcIdx) -> bool,
    {
        let mut current = self.root?;
        let mut last_pred;
        loop {
            last_pred = pred(self, current);
            let branch = if last_pred { Right } else { Left };
            let Some(child) = self.arcs[current].children[branch.idx()] else {
                break;
            };
            current = child;
        }
        if !last_pred {
            current = self.prev(current)?;
        }
        self.splay(current);
        Some(current)
    }

    // ───────────────────────────── Splay tree links ─────────────────────────────

    fn get_parent(&self, u: ArcIdx) -> Option<(ArcIdx, Branch)> {
        let p = self.arcs[u].parent?;
        let branch = if self.arcs[p].children[Left.idx()] == Some(u) {
            Left
        } else {
            Right
        };
        Some((p, branch))
    }

    fn link_sides(&mut self, lhs: ArcIdx, rhs: ArcIdx) {
        self.arcs[lhs].side[Right.idx()] = Some(rhs);
        self.arcs[rhs].side[Left.idx()] = Some(lhs);
    }

    fn attach(&mut self, u: ArcIdx, child: ArcIdx, branch: Branch) {
        debug_assert_ne!(u, child);
        self.arcs[u].children[branch.idx()] = Some(child);
        self.arcs[child].parent = Some(u);
    }

    fn detach(&mut self, u: ArcIdx, branch: Branch) -> Option<ArcIdx> {
        let child = self.arcs[u].children[branch.idx()].take()?;
        self.arcs[child].parent = None;
        Some(child)
    }

    fn rotate(&mut self, u: ArcIdx) {
        let Some((parent, branch)) = self.get_parent(u) else {
            return;
        };
        let grand = self.get_parent(parent);
        match self.detach(u, branch.inv()) {
            Some(child) => self.attach(parent, child, branch),
            None => {
                self.detach(parent, branch);
            }
        }
        match grand {
            Some((grandparent, grandbranch)) => self.attach(grandparent, u, grandbranch),
            None => self.arcs[u].parent = None,
        }
        self.attach(u, parent, branch.inv());
    }

    fn splay(&mut self, u: ArcIdx) {
        while let Some((parent, branch)) = self.get_parent(u) {
            if let Some((_, grandbranch)) = self.get_parent(parent) {
                if branch != grandbranch {
                    self.rotate(u);
                } else {
                    self.rotate(parent);
                }
            }
            self.rotate(u);
        }
        self.root = Some(u);
    }

    /// `root` must be the tree root.
    fn insert_right(&mut self, root: ArcIdx, node: ArcIdx) {
        debug_assert_eq!(self.root, Some(root));
        let old_right = self.detach(root, Right);
        let old_next = self.next(root);
        self.attach(root, node, Right);
        if let Some(old_right) = old_right {
            self.attach(node, old_right, Right);
        }
        if let Some(next) = old_next {
            self.link_sides(node, next);
        }
        self.link_sides(root, node);
    }

    /// Unlink the root, joining its subtrees and its neighbors.
    fn pop_root(&mut self) {
        let Some(old_root) = self.root else {
            return;
        };
        let left = self.detach(old_root, Left);
        let right = self.detach(old_root, Right);
        let [prev, next] = self.arcs[old_root].side;
        self.arcs[old_root].side = [None, None];

        match (prev, next) {
            (Some(p), Some(n)) => self.link_sides(p, n),
            (Some(p), None) => self.arcs[p].side[Right.idx()] = None,
            (None, Some(n)) => self.arcs[n].side[Left.idx()] = None,
            (None, None) => {}
        }

        self.root = match (left, right) {
            (Some(left), Some(right)) => {
                // prev is the maximum of the left subtree; splaying it there
                // leaves its right slot free for the right subtree.
                let prev = prev.unwrap_or(left);
                self.root = Some(left);
                self.splay(prev);
                self.attach(prev, right, Right);
                Some(prev)
            }
            (Some(left), None) => Some(left),
            (None, Some(right)) => Some(right),
            (None, None) => None,
        };
    }
}
