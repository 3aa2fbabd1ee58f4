//! Stable double-ended priority queue with locators
//!
//! [`Depq`] is a priority queue that serves minimum extraction, maximum
//! extraction, or both at once, and hands out a [`Locator`] for every
//! inserted element so callers can update priorities or delete elements in
//! place. Elements with equal priority leave in insertion order from both
//! ends.
//!
//! # Adaptive representation
//!
//! The queue keeps its elements in one flat array and reshapes the heap
//! discipline over that array to match how it is being used:
//!
//! - min-only queries run on a binary min-heap,
//! - max-only queries run on a binary max-heap,
//! - mixed queries promote the array to an interval heap, which answers
//!   both ends in O(log n).
//!
//! Inserts always append to an unheapified tail; the next extremum query
//! integrates the tail, choosing between a bottom-up rebuild and per-element
//! sift-up by a worst-case move count. A queue that is filled once and then
//! drained from one end therefore never pays for double-ended capability.
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `insert`  | O(1) amortized (heapified lazily) |
//! | `find_min` / `find_max` | O(1) after pending heapify |
//! | `delete_min` / `delete_max` | O(log n) |
//! | `update` via locator | O(log n), O(1) while the element is in the tail |
//! | `delete_unspecified` | O(1) while the tail is unheapified |
//!
//! # Example
//!
//! ```rust
//! use depq::Depq;
//!
//! let mut q = Depq::new();
//! q.insert("eat", 4);
//! q.insert("sleep", 1);
//! let code = q.insert("code", 2);
//!
//! assert_eq!(q.find_min(), Some("sleep"));
//! assert_eq!(q.find_max(), Some("eat"));
//!
//! q.update_priority(&code, 9, None).unwrap();
//! assert_eq!(q.delete_max(), Some("code"));
//! ```

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use compare::{natural, Compare, Natural};

use crate::error::DepqError;
use crate::locator::{Binding, Inner, Locator, QueueToken};

/// Adapts a three-way comparison closure to the [`Compare`] trait, for
/// queues ordered by something other than the priority type's natural
/// order.
///
/// ```rust
/// use depq::{Depq, FnComparator};
///
/// // a max-first queue over i32 by reversing the natural order
/// let mut q = Depq::with_comparator(FnComparator(|a: &i32, b: &i32| b.cmp(a)));
/// q.insert("low", 1);
/// q.insert("high", 10);
/// assert_eq!(q.find_min(), Some("high"));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct FnComparator<F>(pub F);

impl<P, F> Compare<P> for FnComparator<F>
where
    F: Fn(&P, &P) -> Ordering,
{
    fn compare(&self, a: &P, b: &P) -> Ordering {
        self.0(a, b)
    }
}

/// The heap discipline currently imposed on the prefix `[0, heapsize)` of
/// the backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Nothing heapified yet; every element is tail.
    None,
    Min,
    Max,
    Interval,
}

/// A stable double-ended priority queue with locator handles.
///
/// `V` is the element value, `P` the priority, and `C` the comparator used
/// on priorities. The default comparator is the priority type's natural
/// order; pass [`FnComparator`] or any other [`Compare`] implementation to
/// [`Depq::with_comparator`] to override it.
///
/// Ties on priority are broken by a subpriority, which defaults to the
/// queue's insertion counter, so equal-priority elements leave in insertion
/// order from both the min and the max end.
pub struct Depq<V, P, C = Natural<P>> {
    /// Backing store. Each slot holds the same shared cell the element's
    /// locator points at; a swap rewrites the index recorded in both cells.
    pub(crate) data: Vec<Rc<RefCell<Inner<V, P>>>>,
    pub(crate) cmp: C,
    pub(crate) mode: Mode,
    /// Length of the prefix currently satisfying `mode`'s heap property.
    pub(crate) heapsize: usize,
    /// Count of every successful insertion over the queue's lifetime.
    /// Never decremented; the default subpriority source.
    pub(crate) totalcount: u64,
    pub(crate) token: Rc<QueueToken>,
}

impl<V, P: Ord> Depq<V, P> {
    /// Creates an empty queue ordered by the priority type's natural order.
    pub fn new() -> Depq<V, P> {
        Depq::with_comparator(natural())
    }

    /// Creates an empty queue with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Depq<V, P> {
        Depq::with_capacity_and_comparator(capacity, natural())
    }
}

impl<V, P, C: Compare<P>> Depq<V, P, C> {
    /// Creates an empty queue ordered by the given comparator.
    pub fn with_comparator(cmp: C) -> Depq<V, P, C> {
        Depq::with_capacity_and_comparator(0, cmp)
    }

    /// Creates an empty queue with the given capacity and comparator.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Depq<V, P, C> {
        Depq {
            data: Vec::with_capacity(capacity),
            cmp,
            mode: Mode::None,
            heapsize: 0,
            totalcount: 0,
            token: Rc::new(QueueToken),
        }
    }

    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of insertions performed over the queue's
    /// lifetime. Deletions and [`clear`](Depq::clear) do not decrease it.
    pub fn totalcount(&self) -> u64 {
        self.totalcount
    }

    /// Compares two priorities with the queue's comparator.
    pub fn compare_priority(&self, a: &P, b: &P) -> Ordering {
        self.cmp.compare(a, b)
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Inserts `value` with the given priority and returns its locator.
    ///
    /// The subpriority defaults to the current insertion counter, which
    /// makes equal-priority elements drain in insertion order. The new
    /// element lands in the unheapified tail; no sifting happens until the
    /// next extremum query.
    pub fn insert(&mut self, value: V, priority: P) -> Locator<V, P> {
        self.insert_entry(value, priority, None)
    }

    /// Inserts with an explicit subpriority instead of the default
    /// insertion ordinal.
    pub fn insert_with_subpriority(
        &mut self,
        value: V,
        priority: P,
        subpriority: u64,
    ) -> Locator<V, P> {
        self.insert_entry(value, priority, Some(subpriority))
    }

    /// Attaches a detached locator to this queue.
    ///
    /// The locator keeps its subpriority if it has one; otherwise the
    /// insertion counter is assigned, as with [`insert`](Depq::insert).
    ///
    /// # Errors
    ///
    /// [`DepqError::AlreadyAttached`] if the locator is attached to any
    /// queue (including this one).
    pub fn insert_locator(&mut self, loc: &Locator<V, P>) -> Result<(), DepqError> {
        if loc.0.borrow().is_attached() {
            return Err(DepqError::AlreadyAttached);
        }
        self.attach_tail(Rc::clone(&loc.0));
        Ok(())
    }

    fn insert_entry(&mut self, value: V, priority: P, subpriority: Option<u64>) -> Locator<V, P> {
        let cell = Rc::new(RefCell::new(Inner {
            value,
            priority,
            subpriority,
            binding: Binding::Detached,
        }));
        self.attach_tail(Rc::clone(&cell));
        Locator(cell)
    }

    /// Appends a cell to the tail, assigning index, queue identity and (if
    /// missing) the default subpriority.
    fn attach_tail(&mut self, cell: Rc<RefCell<Inner<V, P>>>) {
        let index = self.data.len();
        {
            let mut inner = cell.borrow_mut();
            let sub = inner.subpriority.unwrap_or(self.totalcount);
            inner.subpriority = Some(sub);
            inner.binding = Binding::Attached {
                queue: Rc::downgrade(&self.token),
                index,
            };
        }
        self.data.push(cell);
        self.totalcount += 1;
    }

    // ------------------------------------------------------------------
    // Finding
    // ------------------------------------------------------------------

    /// Returns the minimum element's value, or `None` on an empty queue.
    ///
    /// Takes `&mut self` because the first min query after inserts (or
    /// after max-only use) reshapes the heap.
    pub fn find_min(&mut self) -> Option<V>
    where
        V: Clone,
    {
        self.use_min();
        let i = self.top_min_index()?;
        Some(self.data[i].borrow().value.clone())
    }

    /// Returns a locator for the minimum element.
    pub fn find_min_locator(&mut self) -> Option<Locator<V, P>> {
        self.use_min();
        let i = self.top_min_index()?;
        Some(Locator(Rc::clone(&self.data[i])))
    }

    /// Returns the minimum element's priority.
    pub fn find_min_priority(&mut self) -> Option<P>
    where
        P: Clone,
    {
        self.use_min();
        let i = self.top_min_index()?;
        Some(self.data[i].borrow().priority.clone())
    }

    /// Returns the maximum element's value, or `None` on an empty queue.
    pub fn find_max(&mut self) -> Option<V>
    where
        V: Clone,
    {
        self.use_max();
        let i = self.top_max_index()?;
        Some(self.data[i].borrow().value.clone())
    }

    /// Returns a locator for the maximum element.
    pub fn find_max_locator(&mut self) -> Option<Locator<V, P>> {
        self.use_max();
        let i = self.top_max_index()?;
        Some(Locator(Rc::clone(&self.data[i])))
    }

    /// Returns the maximum element's priority.
    pub fn find_max_priority(&mut self) -> Option<P>
    where
        P: Clone,
    {
        self.use_max();
        let i = self.top_max_index()?;
        Some(self.data[i].borrow().priority.clone())
    }

    /// Returns the values of the minimum and maximum elements.
    ///
    /// With a single element, or when the two root priorities are equal,
    /// both halves name the same element: among all-equal priorities the
    /// stably-first element is both the minimum and the maximum.
    pub fn find_minmax(&mut self) -> Option<(V, V)>
    where
        V: Clone,
    {
        let (lo, hi) = self.find_minmax_indices()?;
        Some((
            self.data[lo].borrow().value.clone(),
            self.data[hi].borrow().value.clone(),
        ))
    }

    /// Returns locators for the minimum and maximum elements; see
    /// [`find_minmax`](Depq::find_minmax) for the equal-priority case.
    pub fn find_minmax_locator(&mut self) -> Option<(Locator<V, P>, Locator<V, P>)> {
        let (lo, hi) = self.find_minmax_indices()?;
        Some((
            Locator(Rc::clone(&self.data[lo])),
            Locator(Rc::clone(&self.data[hi])),
        ))
    }

    /// Returns the minimum and maximum priorities.
    pub fn find_minmax_priority(&mut self) -> Option<(P, P)>
    where
        P: Clone,
    {
        let (lo, hi) = self.find_minmax_indices()?;
        Some((
            self.data[lo].borrow().priority.clone(),
            self.data[hi].borrow().priority.clone(),
        ))
    }

    fn find_minmax_indices(&mut self) -> Option<(usize, usize)> {
        self.use_minmax();
        let lo = self.top_min_index()?;
        let hi = self.top_max_index()?;
        Some((lo, hi))
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Removes the minimum element and returns its value.
    pub fn delete_min(&mut self) -> Option<V>
    where
        V: Clone,
    {
        let loc = self.delete_min_locator()?;
        Some(loc.value())
    }

    /// Removes the minimum element and returns its (detached) locator.
    pub fn delete_min_locator(&mut self) -> Option<Locator<V, P>> {
        self.use_min();
        let i = self.top_min_index()?;
        Some(self.take_at(i))
    }

    /// Removes the minimum element and returns its priority.
    pub fn delete_min_priority(&mut self) -> Option<P>
    where
        P: Clone,
    {
        let loc = self.delete_min_locator()?;
        Some(loc.priority())
    }

    /// Removes the maximum element and returns its value.
    pub fn delete_max(&mut self) -> Option<V>
    where
        V: Clone,
    {
        let loc = self.delete_max_locator()?;
        Some(loc.value())
    }

    /// Removes the maximum element and returns its (detached) locator.
    pub fn delete_max_locator(&mut self) -> Option<Locator<V, P>> {
        self.use_max();
        let i = self.top_max_index()?;
        Some(self.take_at(i))
    }

    /// Removes the maximum element and returns its priority.
    pub fn delete_max_priority(&mut self) -> Option<P>
    where
        P: Clone,
    {
        let loc = self.delete_max_locator()?;
        Some(loc.priority())
    }

    /// Removes the last element of the backing array, whichever that is.
    ///
    /// While heapification is still pending this touches only the tail, so
    /// it is the cheapest way to shrink a queue that has not been queried
    /// yet.
    pub fn delete_unspecified(&mut self) -> Option<V>
    where
        V: Clone,
    {
        let loc = self.delete_unspecified_locator()?;
        Some(loc.value())
    }

    /// Removes the last element of the backing array and returns its
    /// locator.
    pub fn delete_unspecified_locator(&mut self) -> Option<Locator<V, P>> {
        if self.data.is_empty() {
            return None;
        }
        let i = self.data.len() - 1;
        Some(self.take_at(i))
    }

    /// Detaches `loc` and removes its element from the queue.
    ///
    /// The locator keeps the value, priority and subpriority it had at
    /// deletion time.
    ///
    /// # Errors
    ///
    /// [`DepqError::NotAttached`] for a detached locator,
    /// [`DepqError::WrongLocator`] for a locator belonging to a different
    /// queue.
    pub fn delete_locator(&mut self, loc: &Locator<V, P>) -> Result<(), DepqError> {
        let i = self.index_of(loc)?;
        self.remove_at(i);
        Ok(())
    }

    /// Detaches the element at `i`, returning a handle to it.
    fn take_at(&mut self, i: usize) -> Locator<V, P> {
        let cell = Rc::clone(&self.data[i]);
        self.remove_at(i);
        Locator(cell)
    }

    /// Removes slot `i`: the last entry fills the hole, the heap prefix is
    /// repaired if the hole was inside it.
    fn remove_at(&mut self, i: usize) {
        let last = self.data.len() - 1;
        if i != last {
            self.data.swap(i, last);
            self.data[i].borrow_mut().set_index(i);
        }
        if let Some(cell) = self.data.pop() {
            cell.borrow_mut().binding = Binding::Detached;
        }
        if self.heapsize > self.data.len() {
            self.heapsize = self.data.len();
        }
        if i < self.heapsize {
            self.repair(i);
        }
    }

    /// Restores the active discipline at `i` after its entry changed.
    fn repair(&mut self, i: usize) {
        let limit = self.heapsize;
        match self.mode {
            Mode::None => {}
            Mode::Min => {
                if !self.sift_up(false, i) {
                    self.sift_down(false, i, limit);
                }
            }
            Mode::Max => {
                if !self.sift_up(true, i) {
                    self.sift_down(true, i, limit);
                }
            }
            Mode::Interval => self.adjust(i, 0, limit),
        }
    }

    // ------------------------------------------------------------------
    // In-place updates
    // ------------------------------------------------------------------

    /// Replaces the minimum element's value and priority in place, reusing
    /// its locator, and returns that locator. Returns `None` on an empty
    /// queue.
    ///
    /// The element receives a fresh subpriority from the insertion counter
    /// (which is incremented), so it ranks after existing elements of equal
    /// priority.
    pub fn replace_min(&mut self, value: V, priority: P) -> Option<Locator<V, P>> {
        self.replace_extremum(value, priority, None, true)
    }

    /// [`replace_min`](Depq::replace_min) with an explicit subpriority.
    pub fn replace_min_with_subpriority(
        &mut self,
        value: V,
        priority: P,
        subpriority: u64,
    ) -> Option<Locator<V, P>> {
        self.replace_extremum(value, priority, Some(subpriority), true)
    }

    /// Replaces the maximum element's value and priority in place, reusing
    /// its locator, and returns that locator. Returns `None` on an empty
    /// queue.
    pub fn replace_max(&mut self, value: V, priority: P) -> Option<Locator<V, P>> {
        self.replace_extremum(value, priority, None, false)
    }

    /// [`replace_max`](Depq::replace_max) with an explicit subpriority.
    pub fn replace_max_with_subpriority(
        &mut self,
        value: V,
        priority: P,
        subpriority: u64,
    ) -> Option<Locator<V, P>> {
        self.replace_extremum(value, priority, Some(subpriority), false)
    }

    fn replace_extremum(
        &mut self,
        value: V,
        priority: P,
        subpriority: Option<u64>,
        min_side: bool,
    ) -> Option<Locator<V, P>> {
        self.use_minmax();
        let i = if min_side {
            self.top_min_index()?
        } else {
            self.top_max_index()?
        };
        let cell = Rc::clone(&self.data[i]);
        {
            let mut inner = cell.borrow_mut();
            inner.value = value;
            inner.priority = priority;
            inner.subpriority = Some(subpriority.unwrap_or(self.totalcount));
        }
        self.totalcount += 1;
        let limit = self.heapsize;
        self.adjust(i, 0, limit);
        Some(Locator(cell))
    }

    /// Atomically rewrites value, priority and subpriority of an attached
    /// element, re-sifting it as needed.
    ///
    /// A `None` subpriority keeps the element's current subpriority (use
    /// [`Locator::update_detached`] for the detached counterpart, where
    /// `None` clears the field).
    ///
    /// # Errors
    ///
    /// [`DepqError::NotAttached`] / [`DepqError::WrongLocator`] as for
    /// [`delete_locator`](Depq::delete_locator).
    pub fn update(
        &mut self,
        loc: &Locator<V, P>,
        value: V,
        priority: P,
        subpriority: Option<u64>,
    ) -> Result<(), DepqError> {
        let i = self.index_of(loc)?;
        {
            let mut inner = self.data[i].borrow_mut();
            inner.value = value;
            inner.priority = priority;
            if let Some(sub) = subpriority {
                inner.subpriority = Some(sub);
            }
        }
        self.reposition(i);
        Ok(())
    }

    /// Rewrites priority (and optionally subpriority) of an attached
    /// element, re-sifting it as needed.
    pub fn update_priority(
        &mut self,
        loc: &Locator<V, P>,
        priority: P,
        subpriority: Option<u64>,
    ) -> Result<(), DepqError> {
        let i = self.index_of(loc)?;
        {
            let mut inner = self.data[i].borrow_mut();
            inner.priority = priority;
            if let Some(sub) = subpriority {
                inner.subpriority = Some(sub);
            }
        }
        self.reposition(i);
        Ok(())
    }

    /// Rewrites the value of an attached element. Never moves it.
    pub fn update_value(&mut self, loc: &Locator<V, P>, value: V) -> Result<(), DepqError> {
        let i = self.index_of(loc)?;
        self.data[i].borrow_mut().value = value;
        Ok(())
    }

    /// Swaps a new priority into an attached element and returns the old
    /// one. The subpriority is retained. Used by the merge driver to move
    /// head values out without cloning.
    pub(crate) fn exchange_priority(
        &mut self,
        loc: &Locator<V, P>,
        priority: P,
    ) -> Result<P, DepqError> {
        let i = self.index_of(loc)?;
        let old = std::mem::replace(&mut self.data[i].borrow_mut().priority, priority);
        self.reposition(i);
        Ok(old)
    }

    /// Re-sifts slot `i` after its priority or subpriority changed.
    /// Elements in the unheapified tail stay put: the discipline is
    /// reapplied lazily at the next extremum query.
    fn reposition(&mut self, i: usize) {
        if i < self.heapsize {
            self.repair(i);
        }
    }

    // ------------------------------------------------------------------
    // Whole-queue operations
    // ------------------------------------------------------------------

    /// Detaches every element and empties the queue.
    ///
    /// The insertion counter is preserved, so elements inserted after a
    /// clear still rank after previously inserted ones on priority ties.
    pub fn clear(&mut self) {
        for cell in self.data.drain(..) {
            cell.borrow_mut().binding = Binding::Detached;
        }
        self.mode = Mode::None;
        self.heapsize = 0;
    }

    /// Calls `f` with each element's value, in unspecified order.
    pub fn each_value<F: FnMut(&V)>(&self, mut f: F) {
        for cell in &self.data {
            f(&cell.borrow().value);
        }
    }

    /// Calls `f` with each element's value and priority, in unspecified
    /// order.
    pub fn each_with_priority<F: FnMut(&V, &P)>(&self, mut f: F) {
        for cell in &self.data {
            let inner = cell.borrow();
            f(&inner.value, &inner.priority);
        }
    }

    /// Iterates over a locator for every element, in unspecified order.
    pub fn locators(&self) -> impl Iterator<Item = Locator<V, P>> + '_ {
        self.data.iter().map(|cell| Locator(Rc::clone(cell)))
    }

    // ------------------------------------------------------------------
    // Locator bookkeeping
    // ------------------------------------------------------------------

    pub(crate) fn owns_token(&self, token: &Weak<QueueToken>) -> bool {
        Weak::ptr_eq(token, &Rc::downgrade(&self.token))
    }

    /// Validates that `loc` is attached to this queue and that its slot
    /// refers back to it, returning the slot. No queue state is touched on
    /// failure.
    fn index_of(&self, loc: &Locator<V, P>) -> Result<usize, DepqError> {
        let inner = loc.0.borrow();
        match &inner.binding {
            Binding::Detached => Err(DepqError::NotAttached),
            Binding::Attached { queue, index } => {
                if !self.owns_token(queue) {
                    return Err(DepqError::WrongLocator);
                }
                if *index >= self.data.len() || !Rc::ptr_eq(&self.data[*index], &loc.0) {
                    return Err(DepqError::WrongLocator);
                }
                Ok(*index)
            }
        }
    }

    // ------------------------------------------------------------------
    // Mode controller
    // ------------------------------------------------------------------

    /// Ensures the heap can answer min queries: keeps a min-heap, promotes
    /// a max-heap to an interval heap, and integrates any pending tail.
    pub(crate) fn use_min(&mut self) {
        match self.mode {
            Mode::None | Mode::Min => {
                self.mode = Mode::Min;
                self.heapify();
            }
            Mode::Max | Mode::Interval => self.switch_to(Mode::Interval),
        }
    }

    /// Ensures the heap can answer max queries; mirror of
    /// [`use_min`](Depq::use_min).
    pub(crate) fn use_max(&mut self) {
        match self.mode {
            Mode::None | Mode::Max => {
                self.mode = Mode::Max;
                self.heapify();
            }
            Mode::Min | Mode::Interval => self.switch_to(Mode::Interval),
        }
    }

    /// Ensures both ends are answerable at once.
    pub(crate) fn use_minmax(&mut self) {
        self.switch_to(Mode::Interval);
    }

    fn switch_to(&mut self, mode: Mode) {
        if self.mode != mode {
            // a mode change invalidates the whole prefix
            self.mode = mode;
            self.heapsize = 0;
        }
        self.heapify();
    }

    /// Integrates `[heapsize, n)` into the heap prefix under the current
    /// mode, choosing whichever of bottom-up rebuild or per-element
    /// sift-up moves less data in the worst case.
    fn heapify(&mut self) {
        let n = self.data.len();
        if self.heapsize >= n {
            return;
        }
        match self.mode {
            Mode::None => return,
            Mode::Min => self.heapify_binary(false),
            Mode::Max => self.heapify_binary(true),
            Mode::Interval => self.heapify_interval(),
        }
        self.heapsize = n;
    }

    /// Worst-case move comparison: a bottom-up rebuild costs about `n - 1`
    /// moves; sifting each of the `n - heapsize` appended elements costs
    /// about `log2(n + 1) - 1` each.
    pub(crate) fn bottom_up_preferred(n: usize, heapsize: usize) -> bool {
        let h = ((n + 1) as f64).log2();
        ((n - 1) as f64) < (h - 1.0) * ((n - heapsize + 1) as f64)
    }

    // ------------------------------------------------------------------
    // Extremum slots (valid after the matching use_* call)
    // ------------------------------------------------------------------

    fn top_min_index(&self) -> Option<usize> {
        if self.data.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Only meaningful in Max or Interval mode. In interval mode the max
    /// lives at slot 1, except that equal root priorities make the
    /// stably-first element at slot 0 both extrema at once.
    fn top_max_index(&self) -> Option<usize> {
        match self.data.len() {
            0 => None,
            1 => Some(0),
            _ => match self.mode {
                Mode::Interval => {
                    if self.cmp_prio(0, 1) == Ordering::Equal {
                        Some(0)
                    } else {
                        Some(1)
                    }
                }
                _ => Some(0),
            },
        }
    }

    // ------------------------------------------------------------------
    // Store primitives shared by the disciplines
    // ------------------------------------------------------------------

    /// Swaps two slots and rewrites the index recorded in both moved
    /// locators.
    pub(crate) fn swap_entries(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.data.swap(i, j);
        self.data[i].borrow_mut().set_index(i);
        self.data[j].borrow_mut().set_index(j);
    }

    pub(crate) fn cmp_prio(&self, i: usize, j: usize) -> Ordering {
        let a = self.data[i].borrow();
        let b = self.data[j].borrow();
        self.cmp.compare(&a.priority, &b.priority)
    }

    /// Min-end rank: priority, then subpriority ascending. `Less` means
    /// `i` leaves a min drain earlier than `j`.
    pub(crate) fn lex_min(&self, i: usize, j: usize) -> Ordering {
        let a = self.data[i].borrow();
        let b = self.data[j].borrow();
        self.cmp
            .compare(&a.priority, &b.priority)
            .then(a.subpriority.cmp(&b.subpriority))
    }

    /// Max-end rank: priority, then subpriority descending, so that among
    /// equal priorities the earliest-inserted element is the greatest.
    /// `Greater` means `i` leaves a max drain earlier than `j`.
    pub(crate) fn lex_max(&self, i: usize, j: usize) -> Ordering {
        let a = self.data[i].borrow();
        let b = self.data[j].borrow();
        self.cmp
            .compare(&a.priority, &b.priority)
            .then(b.subpriority.cmp(&a.subpriority))
    }

    pub(crate) fn prio_eq(&self, i: usize, j: usize) -> bool {
        self.cmp_prio(i, j) == Ordering::Equal
    }

    pub(crate) fn sub_at(&self, i: usize) -> Option<u64> {
        self.data[i].borrow().subpriority
    }
}

// ----------------------------------------------------------------------
// Conveniences for queues whose priority is the value itself
// ----------------------------------------------------------------------

impl<V: Clone, C: Compare<V>> Depq<V, V, C> {
    /// Inserts `value` with itself as its priority.
    pub fn insert_value(&mut self, value: V) -> Locator<V, V> {
        let priority = value.clone();
        self.insert(value, priority)
    }

    /// Inserts every item of `iter`, each with itself as its priority.
    pub fn insert_all<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert_value(value);
        }
    }
}

impl<V: Clone, C: Compare<V>> Extend<V> for Depq<V, V, C> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<V: Clone + Ord> FromIterator<V> for Depq<V, V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut q = Depq::new();
        q.insert_all(iter);
        q
    }
}

impl<V, P, C: Compare<P> + Default> Default for Depq<V, P, C> {
    fn default() -> Depq<V, P, C> {
        Depq::with_comparator(C::default())
    }
}

/// Deep copy with fresh locators.
///
/// Every element of the copy gets its own locator attached to the copy;
/// locators of the source stay attached to the source. Heap shape, mode and
/// the insertion counter carry over unchanged.
impl<V: Clone, P: Clone, C: Compare<P> + Clone> Clone for Depq<V, P, C> {
    fn clone(&self) -> Self {
        let token = Rc::new(QueueToken);
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let src = cell.borrow();
                Rc::new(RefCell::new(Inner {
                    value: src.value.clone(),
                    priority: src.priority.clone(),
                    subpriority: src.subpriority,
                    binding: Binding::Attached {
                        queue: Rc::downgrade(&token),
                        index,
                    },
                }))
            })
            .collect();
        Depq {
            data,
            cmp: self.cmp.clone(),
            mode: self.mode,
            heapsize: self.heapsize,
            totalcount: self.totalcount,
            token,
        }
    }
}

impl<V: fmt::Debug, P: fmt::Debug, C> fmt::Debug for Depq<V, P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Depq(mode {:?}, heapsize {}, totalcount {}) ",
            self.mode, self.heapsize, self.totalcount
        )?;
        let mut entries = f.debug_list();
        for cell in &self.data {
            let inner = cell.borrow();
            entries.entry(&(&inner.value, &inner.priority, inner.subpriority));
        }
        entries.finish()
    }
}

// ----------------------------------------------------------------------
// Invariant validation used by the test suites
// ----------------------------------------------------------------------

#[cfg(test)]
impl<V, P, C: Compare<P>> Depq<V, P, C> {
    /// Asserts every structural invariant of the current state: locator
    /// back-references, queue identity, subpriority presence, and the
    /// active discipline's heap property over `[0, heapsize)`.
    pub(crate) fn validate(&self) {
        use crate::interval::{maxside_parent, minside_parent};

        let n = self.data.len();
        assert!(self.heapsize <= n, "heapsize {} > len {}", self.heapsize, n);
        assert!(self.totalcount >= n as u64);
        for (i, cell) in self.data.iter().enumerate() {
            let inner = cell.borrow();
            match &inner.binding {
                Binding::Attached { queue, index } => {
                    assert_eq!(*index, i, "entry {} records index {}", i, index);
                    assert!(self.owns_token(queue), "entry {} has foreign queue", i);
                    assert!(inner.subpriority.is_some(), "entry {} lacks subpriority", i);
                }
                Binding::Detached => panic!("entry {} is detached in the store", i),
            }
        }
        let hs = self.heapsize;
        match self.mode {
            Mode::None => {}
            Mode::Min => {
                for i in 1..hs {
                    let parent = (i - 1) / 2;
                    assert_ne!(
                        self.lex_min(parent, i),
                        Ordering::Greater,
                        "min-heap violated at {}",
                        i
                    );
                }
            }
            Mode::Max => {
                for i in 1..hs {
                    let parent = (i - 1) / 2;
                    assert_ne!(
                        self.lex_max(parent, i),
                        Ordering::Less,
                        "max-heap violated at {}",
                        i
                    );
                }
            }
            Mode::Interval => {
                for m in (0..hs).step_by(2) {
                    let x = m + 1;
                    if x < hs {
                        assert_ne!(
                            self.lex_min(m, x),
                            Ordering::Greater,
                            "interval pair violated at {}",
                            m
                        );
                    }
                }
                for i in (2..hs).step_by(2) {
                    assert_ne!(
                        self.lex_min(minside_parent(i), i),
                        Ordering::Greater,
                        "min chain violated at {}",
                        i
                    );
                }
                for i in (3..hs).step_by(2) {
                    assert_ne!(
                        self.lex_max(maxside_parent(i), i),
                        Ordering::Less,
                        "max chain violated at {}",
                        i
                    );
                }
            }
        }
    }
}
