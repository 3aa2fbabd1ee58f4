//! Interval-heap discipline: both-ended extraction over one flat array
//!
//! Consecutive slots `(2k, 2k + 1)` form an interval whose low end lives at
//! the even slot and whose high end lives at the odd slot. Every child
//! interval is contained in its parent interval, so slot 0 always holds the
//! queue minimum and slot 1 the maximum. A trailing element without a
//! partner forms a one-point interval.
//!
//! # Layout
//!
//! ```text
//!          (0 1)
//!         /     \
//!    (2 3)       (4 5)
//!    /   \       /
//!  (6 7)(8 9)(10 --)
//! ```
//!
//! For a slot `j >= 2` the parent interval's low end is `((j - 2) / 2)` with
//! the low bit cleared; the child intervals of the interval containing `i`
//! start at `(i & !1) * 2 + 2` and `(i & !1) * 2 + 4`.
//!
//! # Stability
//!
//! Ordering is lexicographic on `(priority, subpriority)`. Within an
//! interval of equal priorities the lower subpriority sits on the min side,
//! and chains of equal-priority neighbours keep lower subpriorities closer
//! to the root on both sides. The priority-driven passes record every slot
//! they move, and two subpriority passes (`tie_up`, `tie_down`) then
//! restore that ordering among equal-priority neighbours; without them,
//! elements tied for the maximum could surface out of insertion order.
//!
//! All passes take a slot range `[lo, hi)` and ignore relatives outside it,
//! which is what lets one `adjust` entry point serve bottom-up rebuilds
//! (parents out of range) and incremental integration (children out of
//! range) alike.

use std::cmp::Ordering;

use compare::Compare;

use crate::queue::Depq;

pub(crate) fn minside(i: usize) -> usize {
    i & !1
}

pub(crate) fn maxside(i: usize) -> usize {
    i | 1
}

pub(crate) fn is_minside(i: usize) -> bool {
    i & 1 == 0
}

/// Low end of the parent interval. Caller ensures `i >= 2`.
pub(crate) fn minside_parent(i: usize) -> usize {
    ((i - 2) / 2) & !1
}

/// High end of the parent interval. Caller ensures `i >= 2`.
pub(crate) fn maxside_parent(i: usize) -> usize {
    minside_parent(i) | 1
}

fn child1_minside(i: usize) -> usize {
    (i & !1) * 2 + 2
}

fn child2_minside(i: usize) -> usize {
    (i & !1) * 2 + 4
}

impl<V, P, C: Compare<P>> Depq<V, P, C> {
    fn sub_lt(&self, i: usize, j: usize) -> bool {
        self.sub_at(i) < self.sub_at(j)
    }

    /// Restores the internal ordering of the interval containing `i`:
    /// low end not above high end, and on a priority tie the lower
    /// subpriority on the min side. Returns true if the two ends swapped.
    fn fix_interval(&mut self, i: usize, lo: usize, hi: usize) -> bool {
        let m = minside(i);
        let x = maxside(i);
        if m >= lo && x < hi && self.lex_min(m, x) == Ordering::Greater {
            self.swap_entries(m, x);
            true
        } else {
            false
        }
    }

    /// Sifts the min-side slot `i` toward the root while it undercuts its
    /// min-side parent. Every displaced parent drops one level and is
    /// recorded in `touched`: on a priority tie it may now belong above on
    /// the max chain, which the subpriority passes repair.
    fn upheap_minside(
        &mut self,
        mut i: usize,
        lo: usize,
        hi: usize,
        touched: &mut Vec<usize>,
    ) -> usize {
        while i >= 2 {
            let p = minside_parent(i);
            if p < lo {
                break;
            }
            if self.lex_min(i, p) == Ordering::Less {
                self.swap_entries(i, p);
                self.fix_interval(i, lo, hi);
                touched.push(i);
                if maxside(i) < hi {
                    touched.push(maxside(i));
                }
                i = p;
            } else {
                break;
            }
        }
        touched.push(i);
        i
    }

    /// Sifts the slot `i` toward the root along the max chain while it
    /// outranks its max-side parent. Also used for a lone trailing element,
    /// which stands in for both ends of its interval.
    fn upheap_maxside(
        &mut self,
        mut i: usize,
        lo: usize,
        hi: usize,
        touched: &mut Vec<usize>,
    ) -> usize {
        while i >= 2 {
            let p = maxside_parent(i);
            if p < lo {
                break;
            }
            if self.lex_max(i, p) == Ordering::Greater {
                self.swap_entries(i, p);
                if self.fix_interval(i, lo, hi) {
                    touched.push(minside(i));
                }
                touched.push(i);
                i = p;
            } else {
                break;
            }
        }
        touched.push(i);
        i
    }

    /// Sinks the min-side slot `i` toward the leaves while some child
    /// interval's low end undercuts it. When the sinking element overshoots
    /// its interval's high end it crosses over and settles there, and the
    /// displaced high end keeps sinking along the min chain.
    ///
    /// Returns where the element that started at `i` came to rest.
    fn downheap_minside(
        &mut self,
        mut i: usize,
        lo: usize,
        hi: usize,
        touched: &mut Vec<usize>,
    ) -> usize {
        let mut settled = None;
        loop {
            let c1 = child1_minside(i);
            let c2 = child2_minside(i);
            let mut cand = None;
            if c1 >= lo && c1 < hi {
                cand = Some(c1);
            }
            if c2 >= lo && c2 < hi && cand.map_or(true, |c| self.lex_min(c2, c) == Ordering::Less) {
                cand = Some(c2);
            }
            let Some(c) = cand else { break };
            if self.lex_min(c, i) == Ordering::Less {
                self.swap_entries(i, c);
                touched.push(i);
                i = c;
                if self.fix_interval(i, lo, hi) {
                    touched.push(maxside(i));
                    settled.get_or_insert(maxside(i));
                }
            } else {
                break;
            }
        }
        touched.push(i);
        settled.unwrap_or(i)
    }

    /// Sinks the max-side slot `i` toward the leaves while some child
    /// interval outranks it on the max chain. On a priority tie the
    /// stronger element of a child interval sits on its *min* side (lower
    /// subpriority), so the candidate is routed through the max slot before
    /// the swap. Crossing over settles the sinking element on the min side
    /// and the displaced low end keeps sinking.
    fn downheap_maxside(
        &mut self,
        mut i: usize,
        lo: usize,
        hi: usize,
        touched: &mut Vec<usize>,
    ) -> usize {
        let mut settled = None;
        loop {
            let c1 = child1_minside(i);
            let c2 = child2_minside(i);
            let mut cand: Option<usize> = None;
            for base in [c1, c2] {
                if base < lo || base >= hi {
                    continue;
                }
                let high = base + 1;
                let pick = if high < hi {
                    if self.lex_max(base, high) == Ordering::Greater {
                        base
                    } else {
                        high
                    }
                } else {
                    base
                };
                if cand.map_or(true, |c| self.lex_max(pick, c) == Ordering::Greater) {
                    cand = Some(pick);
                }
            }
            let Some(mut c) = cand else { break };
            if self.lex_max(c, i) == Ordering::Greater {
                if is_minside(c) && c + 1 < hi {
                    self.swap_entries(c, c + 1);
                    touched.push(c);
                    c += 1;
                }
                self.swap_entries(i, c);
                touched.push(i);
                i = c;
                if self.fix_interval(i, lo, hi) {
                    touched.push(minside(i));
                    settled.get_or_insert(minside(i));
                }
            } else {
                break;
            }
        }
        touched.push(i);
        settled.unwrap_or(i)
    }

    /// Sifts the element(s) of the interval at `i` upward through chains of
    /// equal-priority neighbours so that lower subpriorities end up closer
    /// to the root. The interval pair behaves like one sorted two-element
    /// node of a subpriority min-heap; a riser always challenges the
    /// parent interval's high end first, then the low end.
    fn tie_up(&mut self, mut i: usize, lo: usize, hi: usize) {
        let mut displaced = Vec::new();
        loop {
            self.fix_interval(i, lo, hi);
            let m = minside(i);
            let x = maxside(i);
            if m < 2 || m < lo {
                break;
            }
            let pm = minside_parent(m);
            let px = maxside_parent(m);
            if px >= lo && px < hi {
                if self.prio_eq(m, px) && self.sub_lt(m, px) {
                    self.swap_entries(m, px);
                    displaced.push(m);
                    i = px;
                    continue;
                }
                if x < hi && self.prio_eq(x, px) && self.sub_lt(x, px) {
                    self.swap_entries(x, px);
                    displaced.push(x);
                    i = px;
                    continue;
                }
            }
            if pm >= lo && self.prio_eq(m, pm) && self.sub_lt(m, pm) {
                self.swap_entries(m, pm);
                displaced.push(m);
                i = pm;
                continue;
            }
            break;
        }
        for d in displaced {
            self.tie_down(d, lo, hi);
        }
    }

    /// Counterpart of [`tie_up`](Depq::tie_up): pushes high subpriorities
    /// down through equal-priority neighbours. Revisits an interval until
    /// both of its ends stop losing to child intervals, then continues in
    /// the child intervals it exchanged with.
    fn tie_down(&mut self, start: usize, lo: usize, hi: usize) {
        let mut pending = vec![start];
        while let Some(i) = pending.pop() {
            loop {
                self.fix_interval(i, lo, hi);
                let m = minside(i);
                let x = maxside(i);
                let top = if x < hi {
                    x
                } else if m >= lo && m < hi {
                    m
                } else {
                    break;
                };
                let c1 = child1_minside(i);
                let c2 = child2_minside(i);
                let mut best: Option<usize> = None;
                for slot in [c1, c1 + 1, c2, c2 + 1] {
                    if slot >= lo && slot < hi && self.prio_eq(slot, top) {
                        if best.map_or(true, |b| self.sub_lt(slot, b)) {
                            best = Some(slot);
                        }
                    }
                }
                match best {
                    Some(c) if self.sub_lt(c, top) => {
                        self.swap_entries(top, c);
                        self.fix_interval(top, lo, hi);
                        pending.push(c);
                    }
                    _ => break,
                }
            }
        }
    }

    /// Repairs the element at slot `i` back into full validity, assuming
    /// every other slot of `[lo, hi)` already satisfies the discipline.
    /// Single entry point used by integration, deletion and priority
    /// updates.
    pub(crate) fn adjust(&mut self, i: usize, lo: usize, hi: usize) {
        if i < lo || i >= hi {
            return;
        }
        self.fix_interval(i, lo, hi);
        let m = minside(i);
        let x = maxside(i);
        let mut touched = Vec::new();
        if m >= lo {
            let fin = self.upheap_minside(m, lo, hi, &mut touched);
            let fin = if fin == m {
                self.downheap_minside(m, lo, hi, &mut touched)
            } else {
                fin
            };
            if x >= hi && fin == m {
                // a lone trailing element also answers for the max chain
                self.upheap_maxside(m, lo, hi, &mut touched);
            }
        }
        if x < hi {
            let fin = self.upheap_maxside(x, lo, hi, &mut touched);
            if fin == x {
                self.downheap_maxside(x, lo, hi, &mut touched);
            }
        }
        for &t in &touched {
            self.tie_up(t, lo, hi);
        }
        for &t in &touched {
            self.tie_down(t, lo, hi);
        }
    }

    /// Integrates `[heapsize, n)` under the interval discipline, choosing
    /// the cheaper of bottom-up rebuild and per-element integration by the
    /// shared worst-case move count.
    pub(crate) fn heapify_interval(&mut self) {
        let n = self.data.len();
        if Self::bottom_up_preferred(n, self.heapsize) {
            for i in (0..n).rev() {
                self.adjust(i, i, n);
            }
        } else {
            for i in self.heapsize..n {
                self.adjust(i, 0, i + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Depq;

    /// Drains a fresh clone of the queue from the min end.
    fn drain_min(q: &Depq<u32, i32>) -> Vec<u32> {
        let mut q = q.clone();
        let mut out = Vec::new();
        while let Some(v) = q.delete_min() {
            q.validate();
            out.push(v);
        }
        out
    }

    fn drain_max(q: &Depq<u32, i32>) -> Vec<u32> {
        let mut q = q.clone();
        let mut out = Vec::new();
        while let Some(v) = q.delete_max() {
            q.validate();
            out.push(v);
        }
        out
    }

    /// Builds an interval-mode queue from (value, priority) pairs.
    fn interval_queue(entries: &[(u32, i32)]) -> Depq<u32, i32> {
        let mut q = Depq::new();
        for &(v, p) in entries {
            q.insert(v, p);
        }
        q.find_minmax();
        q.validate();
        q
    }

    #[test]
    fn test_both_ends_after_promotion() {
        let mut q = interval_queue(&[(0, 4), (1, 9), (2, 1), (3, 7), (4, 3)]);
        assert_eq!(q.find_min(), Some(2));
        assert_eq!(q.find_max(), Some(1));
        assert_eq!(drain_min(&q), [2, 4, 0, 3, 1]);
        assert_eq!(drain_max(&q), [1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_incremental_insert_keeps_max_stability() {
        // a smaller element displaces the first of two equal maxima down
        // the min chain; the displaced one must stay ahead of its twin
        let mut q = Depq::new();
        q.insert(0, 5);
        q.insert(1, 5);
        q.find_minmax();
        q.insert(2, 3);
        assert_eq!(q.find_max(), Some(0));
        q.validate();
        assert_eq!(drain_max(&q), [0, 1, 2]);
        assert_eq!(drain_min(&q), [2, 0, 1]);
    }

    #[test]
    fn test_all_equal_priorities_drain_in_insertion_order() {
        for n in [1, 2, 3, 4, 5, 8, 13, 32] {
            let entries: Vec<(u32, i32)> = (0..n).map(|i| (i, 7)).collect();
            let q = interval_queue(&entries);
            let want: Vec<u32> = (0..n).collect();
            assert_eq!(drain_min(&q), want, "min drain, n = {}", n);
            assert_eq!(drain_max(&q), want, "max drain, n = {}", n);
        }
    }

    #[test]
    fn test_equal_root_priorities_share_one_locator() {
        let mut q = Depq::new();
        let first = q.insert("v1", 10);
        q.insert("v2", 10);
        let (lo, hi) = q.find_minmax_locator().unwrap();
        assert_eq!(lo, hi);
        assert_eq!(lo, first);
    }

    #[test]
    fn test_alternating_deletes_stay_stable() {
        let entries: Vec<(u32, i32)> = (0..24).map(|i| (i, (i % 3) as i32)).collect();
        let mut q = interval_queue(&entries);
        // expected orders under (priority, insertion) ranking
        let mut by_min: Vec<u32> = (0..24).collect();
        by_min.sort_by_key(|&v| (v % 3, v));
        let mut by_max: Vec<u32> = (0..24).collect();
        by_max.sort_by_key(|&v| (std::cmp::Reverse(v % 3), v));

        let mut lo = by_min.into_iter();
        let mut hi_iter = by_max.into_iter();
        let mut taken = std::collections::HashSet::new();
        for round in 0..24 {
            if round % 2 == 0 {
                let want = lo.find(|v| !taken.contains(v)).unwrap();
                assert_eq!(q.delete_min(), Some(want));
                taken.insert(want);
            } else {
                let want = hi_iter.find(|v| !taken.contains(v)).unwrap();
                assert_eq!(q.delete_max(), Some(want));
                taken.insert(want);
            }
            q.validate();
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_update_inside_interval_heap() {
        let mut q = Depq::new();
        let locs: Vec<_> = (0..10).map(|i| q.insert(i as u32, 50)).collect();
        q.find_minmax();

        q.update_priority(&locs[7], 1, None).unwrap();
        q.validate();
        assert_eq!(q.find_min(), Some(7));

        q.update_priority(&locs[7], 99, None).unwrap();
        q.validate();
        assert_eq!(q.find_max(), Some(7));

        // back into the tie with its subpriority retained: it resumes its
        // original insertion rank
        q.update_priority(&locs[7], 50, None).unwrap();
        q.validate();
        assert_eq!(drain_min(&q), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(drain_max(&q), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        // an explicit subpriority reranks it behind everything else
        q.update_priority(&locs[7], 50, Some(1_000)).unwrap();
        q.validate();
        assert_eq!(drain_min(&q), [0, 1, 2, 3, 4, 5, 6, 8, 9, 7]);
        assert_eq!(drain_max(&q), [0, 1, 2, 3, 4, 5, 6, 8, 9, 7]);
    }

    #[test]
    fn test_explicit_subpriority_update_propagates() {
        // an explicit subpriority passed through update_priority must land
        // in the entry and take part in tie ordering
        let mut q = Depq::new();
        let a = q.insert("a", 5);
        q.insert("b", 5);
        q.insert("c", 5);
        q.find_minmax();

        q.update_priority(&a, 5, Some(100)).unwrap();
        assert_eq!(a.subpriority(), Some(100));
        q.validate();
        assert_eq!(drain_str(&mut q.clone(), false), ["b", "c", "a"]);
        assert_eq!(drain_str(&mut q.clone(), true), ["b", "c", "a"]);
    }

    fn drain_str(q: &mut Depq<&'static str, i32>, max: bool) -> Vec<&'static str> {
        let mut out = Vec::new();
        loop {
            let v = if max { q.delete_max() } else { q.delete_min() };
            match v {
                Some(v) => out.push(v),
                None => break,
            }
        }
        out
    }

    #[test]
    fn test_delete_locator_from_middle() {
        let mut q = Depq::new();
        let locs: Vec<_> = (0..16).map(|i| q.insert(i as u32, (i % 4) as i32)).collect();
        q.find_minmax();
        q.delete_locator(&locs[5]).unwrap();
        q.delete_locator(&locs[10]).unwrap();
        q.validate();
        assert!(!locs[5].in_queue());
        assert_eq!(locs[5].priority(), 1);
        let mut want: Vec<u32> = (0..16).filter(|v| *v != 5 && *v != 10).collect();
        want.sort_by_key(|&v| (v % 4, v));
        assert_eq!(drain_min(&q), want);
    }

    #[test]
    fn test_interval_heapify_strategies_agree() {
        // grown tails of different sizes push heapify down both paths
        for step in [1usize, 2, 3, 7, 20] {
            let mut q = Depq::new();
            let mut inserted = 0u32;
            while inserted < 40 {
                for _ in 0..step {
                    if inserted >= 40 {
                        break;
                    }
                    q.insert(inserted, (inserted % 5) as i32);
                    inserted += 1;
                }
                q.find_minmax();
                q.validate();
            }
            let mut want: Vec<u32> = (0..40).collect();
            want.sort_by_key(|&v| (v % 5, v));
            assert_eq!(drain_min(&q), want, "step = {}", step);
        }
    }
}
