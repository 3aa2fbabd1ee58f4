//! Binary min-heap and max-heap disciplines over the queue's backing store
//!
//! Both disciplines are the classic implicit binary heap (parent of `j` is
//! `(j - 1) / 2`), ranked lexicographically on `(priority, subpriority)`.
//! The max discipline reverses only the subpriority comparison, so that
//! among elements tied for the maximum the earliest-inserted one surfaces
//! first. One set of sift routines serves both senses.

use std::cmp::Ordering;

use compare::Compare;

use crate::queue::Depq;

impl<V, P, C: Compare<P>> Depq<V, P, C> {
    /// True if the entry at `i` belongs above the entry at `j` under the
    /// active sense.
    fn before(&self, max: bool, i: usize, j: usize) -> bool {
        if max {
            self.lex_max(i, j) == Ordering::Greater
        } else {
            self.lex_min(i, j) == Ordering::Less
        }
    }

    /// Moves the entry at `i` toward the root while it outranks its
    /// parent. Returns true if it moved.
    pub(crate) fn sift_up(&mut self, max: bool, mut i: usize) -> bool {
        let mut moved = false;
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.before(max, i, parent) {
                self.swap_entries(i, parent);
                i = parent;
                moved = true;
            } else {
                break;
            }
        }
        moved
    }

    /// Moves the entry at `i` away from the root while a child outranks
    /// it, always descending toward the better child.
    pub(crate) fn sift_down(&mut self, max: bool, mut i: usize, limit: usize) {
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut top = i;
            if left < limit && self.before(max, left, top) {
                top = left;
            }
            if right < limit && self.before(max, right, top) {
                top = right;
            }
            if top == i {
                break;
            }
            self.swap_entries(i, top);
            i = top;
        }
    }

    /// Integrates `[heapsize, n)` under the min or max discipline, by
    /// bottom-up rebuild or per-element sift-up, whichever moves less.
    pub(crate) fn heapify_binary(&mut self, max: bool) {
        let n = self.data.len();
        if Self::bottom_up_preferred(n, self.heapsize) {
            if n >= 2 {
                for i in (0..=(n - 2) / 2).rev() {
                    self.sift_down(max, i, n);
                }
            }
        } else {
            for i in self.heapsize..n {
                self.sift_up(max, i);
            }
        }
    }
}
