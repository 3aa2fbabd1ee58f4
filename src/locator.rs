//! Locators: stable external handles to queue elements
//!
//! A [`Locator`] is handed out by every insertion into a
//! [`Depq`](crate::Depq) and stays valid across all queue mutations until
//! the element it names is deleted. It is the anchor for random-access
//! priority updates and deletions: algorithms such as Dijkstra's keep a map
//! from node to locator and adjust priorities through it.
//!
//! # Two states
//!
//! A locator is either *attached* (bound to one queue slot) or *detached*
//! (free-standing, carrying a snapshot of its last value, priority and
//! subpriority). User-constructed locators start detached; insertion
//! attaches them; deletion detaches them again while preserving the
//! priority and subpriority they had at deletion time.
//!
//! # Identity
//!
//! Locators compare by identity only: two locators are equal exactly when
//! they are handles to the same underlying element. They hash by identity
//! as well, so they can serve as map keys. `Locator` deliberately does not
//! implement `Clone`; an element has one locator, and every accessor that
//! returns a locator returns another handle to that same identity.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::error::DepqError;

/// Zero-sized identity brand owned by a queue. Attached locators hold a
/// weak reference to their queue's token; pointer equality on the token is
/// queue identity.
pub(crate) struct QueueToken;

/// Which queue slot a locator is bound to, if any.
pub(crate) enum Binding {
    Detached,
    Attached {
        queue: Weak<QueueToken>,
        index: usize,
    },
}

/// Shared element state. The queue's backing store and every handle to the
/// element point at the same `Inner`, so a swap in the store only has to
/// rewrite `binding`.
pub(crate) struct Inner<V, P> {
    pub(crate) value: V,
    pub(crate) priority: P,
    /// `Some` whenever attached; a detached locator may carry `None` until
    /// insertion assigns the queue's insertion ordinal.
    pub(crate) subpriority: Option<u64>,
    pub(crate) binding: Binding,
}

impl<V, P> Inner<V, P> {
    pub(crate) fn is_attached(&self) -> bool {
        matches!(self.binding, Binding::Attached { .. })
    }

    /// Rewrites the recorded slot after the store moved this element.
    pub(crate) fn set_index(&mut self, index: usize) {
        if let Binding::Attached { index: slot, .. } = &mut self.binding {
            *slot = index;
        }
    }
}

/// A stable, identity-equal handle to one element of a
/// [`Depq`](crate::Depq)
///
/// # Example
///
/// ```rust
/// use depq::Depq;
///
/// let mut q = Depq::new();
/// let loc = q.insert("job", 7);
/// assert!(loc.in_queue());
/// assert_eq!(loc.priority(), 7);
///
/// q.update_priority(&loc, 2, None).unwrap();
/// assert_eq!(q.find_min(), Some("job"));
///
/// q.delete_locator(&loc).unwrap();
/// assert!(!loc.in_queue());
/// assert_eq!(loc.priority(), 2); // snapshot survives deletion
/// ```
pub struct Locator<V, P>(pub(crate) Rc<RefCell<Inner<V, P>>>);

impl<V, P> Locator<V, P> {
    /// Creates a detached locator with no subpriority.
    ///
    /// The locator can be attached later with
    /// [`Depq::insert_locator`](crate::Depq::insert_locator).
    pub fn new(value: V, priority: P) -> Self {
        Locator(Rc::new(RefCell::new(Inner {
            value,
            priority,
            subpriority: None,
            binding: Binding::Detached,
        })))
    }

    /// Creates a detached locator with an explicit subpriority.
    pub fn with_subpriority(value: V, priority: P, subpriority: u64) -> Self {
        Locator(Rc::new(RefCell::new(Inner {
            value,
            priority,
            subpriority: Some(subpriority),
            binding: Binding::Detached,
        })))
    }

    /// Returns a copy of the element's value.
    pub fn value(&self) -> V
    where
        V: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Applies `f` to a borrow of the element's value.
    ///
    /// Useful when the value type is not `Clone`.
    pub fn with_value<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.0.borrow().value)
    }

    /// Returns a copy of the element's priority. For a detached locator
    /// this is the snapshot taken at deletion time.
    pub fn priority(&self) -> P
    where
        P: Clone,
    {
        self.0.borrow().priority.clone()
    }

    /// Returns the element's subpriority, or `None` for a detached locator
    /// that was never assigned one.
    pub fn subpriority(&self) -> Option<u64> {
        self.0.borrow().subpriority
    }

    /// Returns true if the locator is attached to a live queue.
    pub fn in_queue(&self) -> bool {
        match &self.0.borrow().binding {
            Binding::Attached { queue, .. } => queue.upgrade().is_some(),
            Binding::Detached => false,
        }
    }

    /// Returns true if the locator is attached to `queue` specifically.
    pub fn belongs_to<C>(&self, queue: &crate::Depq<V, P, C>) -> bool
    where
        C: compare::Compare<P>,
    {
        match &self.0.borrow().binding {
            Binding::Attached { queue: token, .. } => queue.owns_token(token),
            Binding::Detached => false,
        }
    }

    /// Rewrites value, priority and subpriority of a detached locator.
    ///
    /// Attached locators must be updated through their queue
    /// ([`Depq::update`](crate::Depq::update)) so the element can be
    /// re-sifted; calling this on one returns
    /// [`DepqError::AlreadyAttached`].
    pub fn update_detached(
        &self,
        value: V,
        priority: P,
        subpriority: Option<u64>,
    ) -> Result<(), DepqError> {
        let mut inner = self.0.borrow_mut();
        if inner.is_attached() {
            return Err(DepqError::AlreadyAttached);
        }
        inner.value = value;
        inner.priority = priority;
        inner.subpriority = subpriority;
        Ok(())
    }
}

impl<V, P> PartialEq for Locator<V, P> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V, P> Eq for Locator<V, P> {}

impl<V, P> Hash for Locator<V, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl<V: fmt::Debug, P: fmt::Debug> fmt::Debug for Locator<V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        let mut d = f.debug_struct("Locator");
        d.field("value", &inner.value)
            .field("priority", &inner.priority)
            .field("subpriority", &inner.subpriority);
        match &inner.binding {
            Binding::Attached { index, .. } => {
                d.field("state", &"attached").field("index", index)
            }
            Binding::Detached => d.field("state", &"detached"),
        }
        .finish()
    }
}
