//! Container capabilities as separate traits.
//!
//! Calling code that only needs one facet of a container (say, counting or
//! searching) can depend on that trait alone. [`RingBuffer`] implements all of
//! them by delegating to its inherent methods.

use crate::buffer::{self, RingBuffer};
use crate::error::Result;

pub trait Countable {
    fn count(&self) -> usize;

    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn is_full(&self) -> bool {
        self.count() == self.capacity()
    }
}

/// Restartable, finite, oldest-first view of the stored items.
pub trait Enumerable<T> {
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    fn elements(&self) -> Self::Iter<'_>;
}

/// Bounds-checked random access by logical position.
pub trait Indexable<T> {
    fn at(&self, index: usize) -> Result<&T>;

    /// Returns the replaced value.
    fn set_at(&mut self, index: usize, value: T) -> Result<T>;
}

pub trait Searchable<T: PartialEq>: Countable {
    /// Logical position of the first match, `count()` when there is none.
    fn find(&self, item: &T) -> usize;

    fn contains(&self, item: &T) -> bool {
        self.find(item) < self.count()
    }
}

/// Moving items in and out in bulk.
pub trait BulkTransfer<T> {
    /// Not atomic; see [`RingBuffer::put_all`].
    fn put_all<I>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>;

    fn get_into(&mut self, dst: &mut [T]) -> usize;

    fn skip(&mut self, amount: usize) -> Result<()>;

    fn copy_to(&self, dst: &mut [T], amount: usize, offset: usize) -> Result<()>
    where
        T: Clone;
}

/// General-purpose mutable collection.
pub trait Collection<T: PartialEq>: Searchable<T> {
    fn add(&mut self, item: T) -> Result<()>;

    fn clear(&mut self);

    /// Removes the oldest matching item.
    fn remove(&mut self, item: &T) -> bool;

    fn copy_all_to(&self, dst: &mut [T], offset: usize) -> Result<()>
    where
        T: Clone;
}

impl<T> Countable for RingBuffer<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn capacity(&self) -> usize {
        RingBuffer::capacity(self)
    }
}

impl<T> Enumerable<T> for RingBuffer<T> {
    type Iter<'a>
        = buffer::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    fn elements(&self) -> buffer::Iter<'_, T> {
        self.iter()
    }
}

impl<T> Indexable<T> for RingBuffer<T> {
    fn at(&self, index: usize) -> Result<&T> {
        RingBuffer::at(self, index)
    }

    fn set_at(&mut self, index: usize, value: T) -> Result<T> {
        RingBuffer::set_at(self, index, value)
    }
}

impl<T: PartialEq> Searchable<T> for RingBuffer<T> {
    fn find(&self, item: &T) -> usize {
        RingBuffer::find(self, item)
    }
}

impl<T> BulkTransfer<T> for RingBuffer<T> {
    fn put_all<I>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        RingBuffer::put_all(self, items)
    }

    fn get_into(&mut self, dst: &mut [T]) -> usize {
        RingBuffer::get_into(self, dst)
    }

    fn skip(&mut self, amount: usize) -> Result<()> {
        RingBuffer::skip(self, amount)
    }

    fn copy_to(&self, dst: &mut [T], amount: usize, offset: usize) -> Result<()>
    where
        T: Clone,
    {
        RingBuffer::copy_to(self, dst, amount, offset)
    }
}

impl<T: PartialEq> Collection<T> for RingBuffer<T> {
    fn add(&mut self, item: T) -> Result<()> {
        self.put(item)
    }

    fn clear(&mut self) {
        RingBuffer::clear(self)
    }

    fn remove(&mut self, item: &T) -> bool {
        RingBuffer::remove(self, item)
    }

    fn copy_all_to(&self, dst: &mut [T], offset: usize) -> Result<()>
    where
        T: Clone,
    {
        RingBuffer::copy_all_to(self, dst, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BufferError;

    fn sample() -> RingBuffer<i32> {
        let mut rb = RingBuffer::new(5).expect("nonzero");
        rb.put_all([0, 0, 0]).expect("fits");
        rb.skip(3).expect("stored");
        rb.put_all([10, 20, 0, 15]).expect("fits");
        rb
    }

    fn tally<C: Countable>(c: &C) -> (usize, usize, bool, bool) {
        (c.count(), c.capacity(), c.is_empty(), c.is_full())
    }

    fn collect_twice<T: Clone, E: Enumerable<T>>(e: &E) -> (Vec<T>, Vec<T>) {
        (
            e.elements().cloned().collect(),
            e.elements().cloned().collect(),
        )
    }

    fn bump_all<X: Indexable<i32> + Countable>(x: &mut X) -> Result<()> {
        for i in 0..x.count() {
            let v = *x.at(i)?;
            x.set_at(i, v + 1)?;
        }
        Ok(())
    }

    fn hits<S: Searchable<i32>>(s: &S, probes: &[i32]) -> Vec<bool> {
        probes.iter().map(|p| s.contains(p)).collect()
    }

    fn shuttle<B: BulkTransfer<i32>>(from: &mut B, to: &mut B, n: usize) -> Result<usize> {
        let mut scratch = vec![0; n];
        let moved = from.get_into(&mut scratch);
        scratch.truncate(moved);
        to.put_all(scratch)
    }

    fn drain_matching<C: Collection<i32>>(c: &mut C, item: i32) -> usize {
        let mut removed = 0;
        while c.remove(&item) {
            removed += 1;
        }
        removed
    }

    #[test]
    fn countable_contract() {
        let mut rb = sample();
        assert_eq!(tally(&rb), (4, 5, false, false));
        rb.put(1).expect("room");
        assert_eq!(tally(&rb), (5, 5, false, true));
        Collection::clear(&mut rb);
        assert_eq!(tally(&rb), (0, 5, true, false));
    }

    #[test]
    fn enumerable_restarts() {
        let rb = sample();
        let (first, second) = collect_twice(&rb);
        assert_eq!(first, vec![10, 20, 0, 15]);
        assert_eq!(first, second);
    }

    #[test]
    fn indexable_contract() {
        let mut rb = sample();
        bump_all(&mut rb).expect("all indices valid");
        assert_eq!(rb.to_vec(), vec![11, 21, 1, 16]);
        assert_eq!(
            Indexable::at(&rb, 4),
            Err(BufferError::IndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn searchable_contract() {
        let rb = sample();
        assert_eq!(
            hits(&rb, &[20, 15, 10, 18, 31]),
            vec![true, true, true, false, false]
        );
        assert_eq!(Searchable::find(&rb, &31), 4);
    }

    #[test]
    fn bulk_transfer_contract() {
        let mut from = sample();
        let mut to = RingBuffer::new(3).expect("nonzero");
        assert_eq!(shuttle(&mut from, &mut to, 2), Ok(2));
        assert_eq!(to.to_vec(), vec![10, 20]);

        let err = shuttle(&mut from, &mut to, 2).expect_err("destination overflows");
        assert!(matches!(err, BufferError::PartialPut { inserted: 1, .. }));
        assert_eq!(to.to_vec(), vec![10, 20, 0]);
        assert!(from.is_empty());

        let mut dst = [0; 3];
        BulkTransfer::copy_to(&to, &mut dst, 2, 1).expect("fits");
        assert_eq!(dst, [0, 10, 20]);
        assert!(matches!(
            BulkTransfer::skip(&mut to, 4),
            Err(BufferError::InvalidArgument(_))
        ));
    }

    #[test]
    fn collection_contract() {
        let mut rb = sample();
        Collection::add(&mut rb, 20).expect("room");
        assert_eq!(drain_matching(&mut rb, 20), 2);
        assert_eq!(rb.to_vec(), vec![10, 0, 15]);

        let mut dst = vec![0; 4];
        Collection::copy_all_to(&rb, &mut dst, 1).expect("fits");
        assert_eq!(dst, vec![0, 10, 0, 15]);
        assert!(Collection::add(&mut rb, 1).is_ok());
    }
}
