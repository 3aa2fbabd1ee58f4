//! Lazy k-way sorted merge driven by a queue of source heads
//!
//! [`merge`] keeps one queue element per non-exhausted source, keyed by the
//! source's current head. Each pull yields the least head, advances only
//! that source, and updates its element in place; the locator (and with it
//! the tie-breaking subpriority assigned at construction) survives the
//! update, so sources earlier in the argument list win every tie. Given
//! sorted inputs the result is their sorted, stable interleaving.

use std::rc::Rc;

use crate::queue::Depq;

/// Merges the given sorted sources into one lazy sorted iterator.
///
/// Each source is pulled only as fast as the merge is consumed. Ties
/// between sources resolve toward the earlier source, so the merge is
/// stable for sorted inputs. Unsorted inputs produce the same multiset in
/// an unspecified order.
///
/// # Example
///
/// ```rust
/// let merged: Vec<u32> = depq::merge([vec![1, 2, 3, 4], vec![], vec![3, 4, 5, 6]]).collect();
/// assert_eq!(merged, [1, 2, 3, 3, 4, 4, 5, 6]);
/// ```
pub fn merge<S, I>(sources: S) -> Merge<I::IntoIter>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator,
    <I as IntoIterator>::Item: Ord,
{
    let mut sources: Vec<I::IntoIter> = sources.into_iter().map(IntoIterator::into_iter).collect();
    let mut queue = Depq::new();
    for (slot, source) in sources.iter_mut().enumerate() {
        if let Some(head) = source.next() {
            queue.insert(slot, head);
        }
    }
    Merge { queue, sources }
}

/// Iterator returned by [`merge`].
pub struct Merge<I: Iterator>
where
    I::Item: Ord,
{
    /// One element per live source: value is the source's slot, priority
    /// its current head.
    queue: Depq<usize, I::Item>,
    sources: Vec<I>,
}

impl<I> Iterator for Merge<I>
where
    I: Iterator,
    I::Item: Ord,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let loc = self.queue.find_min_locator()?;
        let slot = loc.with_value(|v| *v);
        match self.sources[slot].next() {
            Some(head) => {
                // swap the fresh head in and yield the one it replaces;
                // the locator keeps its subpriority, preserving tie order
                self.queue.exchange_priority(&loc, head).ok()
            }
            None => {
                self.queue.delete_locator(&loc).ok()?;
                // the queue dropped its handle; recover the final head
                // from the sole remaining one
                match Rc::try_unwrap(loc.0) {
                    Ok(cell) => Some(cell.into_inner().priority),
                    Err(_) => None,
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (mut low, mut high) = (self.queue.len(), Some(self.queue.len()));
        for source in &self.sources {
            let (l, h) = source.size_hint();
            low += l;
            high = match (high, h) {
                (Some(a), Some(b)) => a.checked_add(b),
                _ => None,
            };
        }
        (low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_empty_sources() {
        let out: Vec<u32> = merge([vec![1, 2, 3, 4], vec![], vec![3, 4, 5, 6]]).collect();
        assert_eq!(out, [1, 2, 3, 3, 4, 4, 5, 6]);

        let out: Vec<u32> = merge(Vec::<Vec<u32>>::new()).collect();
        assert!(out.is_empty());

        let out: Vec<u32> = merge([Vec::<u32>::new(), Vec::new()]).collect();
        assert!(out.is_empty());
    }

    #[test]
    fn test_merge_is_lazy() {
        // an endless source merges fine as long as only finitely many
        // items are pulled
        let naturals = 0u64..;
        let spikes = (0u64..).map(|i| i * 10);
        let first: Vec<u64> = merge([
            Box::new(naturals) as Box<dyn Iterator<Item = u64>>,
            Box::new(spikes),
        ])
        .take(6)
        .collect();
        assert_eq!(first, [0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_merge_stability_by_source_order() {
        // ordered (and equal) by key alone; the tag only records the source
        #[derive(Debug, Clone, Copy)]
        struct Tagged(u32, u8);
        impl Tagged {
            fn key(self) -> u32 {
                self.0
            }
        }
        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl Eq for Tagged {}
        impl PartialOrd for Tagged {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Tagged {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.cmp(&other.0)
            }
        }
        // same keys in both sources; source 0 must always come out first
        let a = vec![Tagged(1, 0), Tagged(2, 0), Tagged(2, 0)];
        let b = vec![Tagged(1, 1), Tagged(2, 1)];
        let out: Vec<Tagged> = merge([a, b]).collect();
        let keys: Vec<u32> = out.iter().map(|t| t.key()).collect();
        assert_eq!(keys, [1, 1, 2, 2, 2]);
        assert_eq!(out[0].1, 0);
        assert_eq!(out[1].1, 1);
        assert_eq!(out[2].1, 0);
        assert_eq!(out[3].1, 0);
        assert_eq!(out[4].1, 1);
    }

    #[test]
    fn test_merge_many_sources() {
        let sources: Vec<Vec<u32>> = (0..20).map(|k| (k..200).step_by(20).collect()).collect();
        let out: Vec<u32> = merge(sources).collect();
        let want: Vec<u32> = (0..200).collect();
        assert_eq!(out, want);
    }
}
