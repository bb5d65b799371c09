//! Fixed-capacity FIFO ring buffer.
//!
//! [`RingBuffer`] preallocates `capacity` slots once and never grows. Items go
//! in at the back with [`put`](RingBuffer::put) and come out of the front with
//! [`get`](RingBuffer::get). A full buffer rejects new items instead of
//! overwriting the oldest one.
//!
//! Positions passed to the public API are *logical*: `0` is the oldest stored
//! item and `len() - 1` the newest. Every conversion to a slot in the backing
//! storage goes through one helper, `physical`.
//!
//! # Thread safety
//!
//! None of the operations synchronize. The buffer is `Send`/`Sync` exactly when
//! `T` is, so sharing it between threads means wrapping it in a
//! [`std::sync::Mutex`] (or similar) on the caller side. Mutating while an
//! [`Iter`] is alive is rejected at compile time by the borrow checker.

mod iter;

use crate::error::{BufferError, Result};
use std::fmt;
use std::ops::{Index, IndexMut, Range};

pub use iter::{IntoIter, Iter, IterMut};

const LOG_TARGET: &str = "ringfifo::buffer";

#[derive(Clone)]
pub struct RingBuffer<T> {
    buf: Vec<Option<T>>,
    start: usize,
    end: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` items.
    ///
    /// Fails with [`BufferError::InvalidArgument`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::invalid("capacity must be > 0"));
        }
        let mut buf = Vec::with_capacity(capacity);
        buf.resize_with(capacity, || None);
        Ok(Self {
            buf,
            start: 0,
            end: 0,
            len: 0,
        })
    }

    /// Creates a full buffer whose capacity is the number of supplied items,
    /// keeping them in the given order (first item is the oldest).
    ///
    /// An empty sequence is rejected with [`BufferError::InvalidArgument`],
    /// since a zero-capacity buffer could never hold anything.
    pub fn from_sequence<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let buf: Vec<Option<T>> = items.into_iter().map(Some).collect();
        if buf.is_empty() {
            return Err(BufferError::invalid("initial sequence must not be empty"));
        }
        let len = buf.len();
        Ok(Self {
            buf,
            start: 0,
            end: 0,
            len,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Free slots left before [`put`](Self::put) starts failing.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Maps a logical position (or an offset from `start`) onto the backing
    /// storage. `offset` must not exceed `capacity`.
    fn physical(&self, offset: usize) -> usize {
        (self.start + offset) % self.capacity()
    }

    /// Physical ranges holding the stored items, oldest first. The second range
    /// is non-empty only when the contents wrap past the end of the storage.
    fn occupied(&self) -> (Range<usize>, Range<usize>) {
        let head = self.len.min(self.capacity() - self.start);
        (self.start..self.start + head, 0..self.len - head)
    }

    fn out_of_range(&self, index: usize) -> BufferError {
        BufferError::IndexOutOfRange {
            index,
            len: self.len,
        }
    }

    /// Appends `item` after the newest element.
    ///
    /// Fails with [`BufferError::CapacityExceeded`] when the buffer is full;
    /// the buffer is left untouched in that case.
    pub fn put(&mut self, item: T) -> Result<()> {
        if self.is_full() {
            return Err(BufferError::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        self.buf[self.end] = Some(item);
        self.end = self.physical(self.len + 1);
        self.len += 1;
        Ok(())
    }

    /// Puts every item in order and returns how many were inserted.
    ///
    /// This is **not atomic**: when the buffer fills up part way, the items
    /// already inserted stay in place and the error is
    /// [`BufferError::PartialPut`] carrying that count. The rest of `items` is
    /// dropped.
    pub fn put_all<I>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = T>,
    {
        let mut inserted = 0;
        for item in items {
            if let Err(source) = self.put(item) {
                tracing::debug!(target: LOG_TARGET, inserted, "bulk put stopped on a full buffer");
                return Err(BufferError::PartialPut {
                    inserted,
                    source: Box::new(source),
                });
            }
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Removes and returns the oldest item.
    ///
    /// Fails with [`BufferError::EmptyBuffer`] when there is nothing to take.
    pub fn get(&mut self) -> Result<T> {
        self.pop_front().ok_or(BufferError::EmptyBuffer)
    }

    /// Removes up to `amount` of the oldest items. Asking for more than is
    /// stored is not an error; the result is simply shorter.
    pub fn get_many(&mut self, amount: usize) -> Vec<T> {
        let count = amount.min(self.len);
        std::iter::from_fn(|| self.pop_front()).take(count).collect()
    }

    /// Moves the oldest items into `dst`, filling it from the front, and
    /// returns how many were moved (at most `dst.len()`). Slots of `dst` past
    /// the returned count are left as they were.
    pub fn get_into(&mut self, dst: &mut [T]) -> usize {
        let count = dst.len().min(self.len);
        for slot in &mut dst[..count] {
            if let Some(item) = self.pop_front() {
                *slot = item;
            }
        }
        count
    }

    /// Drops the `amount` oldest items without returning them.
    ///
    /// Fails with [`BufferError::InvalidArgument`] when fewer than `amount`
    /// items are stored.
    pub fn skip(&mut self, amount: usize) -> Result<()> {
        if amount > self.len {
            return Err(BufferError::invalid(format!(
                "cannot skip {amount} item(s), only {} stored",
                self.len
            )));
        }
        for offset in 0..amount {
            let slot = self.physical(offset);
            self.buf[slot] = None;
        }
        self.start = self.physical(amount);
        self.len -= amount;
        tracing::trace!(target: LOG_TARGET, amount, len = self.len, "skipped items");
        Ok(())
    }

    /// The oldest item, if any, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.at(0).ok()
    }

    pub fn at(&self, index: usize) -> Result<&T> {
        if index >= self.len {
            return Err(self.out_of_range(index));
        }
        let slot = self.physical(index);
        self.buf[slot]
            .as_ref()
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        if index >= self.len {
            return Err(self.out_of_range(index));
        }
        let err = self.out_of_range(index);
        let slot = self.physical(index);
        self.buf[slot].as_mut().ok_or(err)
    }

    /// Overwrites the item at logical position `index`, returning the value it
    /// replaced.
    pub fn set_at(&mut self, index: usize, value: T) -> Result<T> {
        Ok(std::mem::replace(self.at_mut(index)?, value))
    }

    /// Empties the buffer. The backing storage is kept; stored items are
    /// dropped.
    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|slot| *slot = None);
        self.start = 0;
        self.end = 0;
        self.len = 0;
        tracing::trace!(target: LOG_TARGET, "cleared");
    }

    /// Iterates from the oldest item to the newest.
    pub fn iter(&self) -> Iter<'_, T> {
        let (head, tail) = self.occupied();
        Iter::new(&self.buf[head], &self.buf[tail])
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let (head, tail) = self.occupied();
        let start = self.start;
        let (wrapped, unwrapped) = self.buf.split_at_mut(start);
        IterMut::new(&mut unwrapped[..head.len()], &mut wrapped[tail])
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let item = self.buf[self.start].take();
        self.start = self.physical(1);
        self.len -= 1;
        item
    }

    fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let last = self.physical(self.len - 1);
        let item = self.buf[last].take();
        self.end = last;
        self.len -= 1;
        item
    }
}

impl<T: PartialEq> RingBuffer<T> {
    /// Logical position of the first item equal to `item`, or `None`.
    pub fn position(&self, item: &T) -> Option<usize> {
        self.iter().position(|stored| stored == item)
    }

    /// Logical position of the first item equal to `item`.
    ///
    /// Returns `len()` when nothing matches, so a result `< len()` always
    /// means found. [`position`](Self::position) is the `Option` flavour.
    pub fn find(&self, item: &T) -> usize {
        self.position(item).unwrap_or(self.len)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.find(item) < self.len
    }

    /// Removes the oldest item equal to `item`, shifting every newer item one
    /// position toward the front. Returns whether anything was removed.
    ///
    /// Runs in O(len).
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(index) = self.position(item) else {
            return false;
        };
        let removed = self.physical(index);
        self.buf[removed] = None;
        for logical in index + 1..self.len {
            let from = self.physical(logical);
            let to = self.physical(logical - 1);
            self.buf[to] = self.buf[from].take();
        }
        self.end = self.physical(self.len - 1);
        self.len -= 1;
        true
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the `amount` oldest items into `dst[offset..offset + amount]`
    /// without consuming them.
    ///
    /// Fails with [`BufferError::InvalidArgument`] when fewer than `amount`
    /// items are stored or the target range does not fit in `dst`.
    pub fn copy_to(&self, dst: &mut [T], amount: usize, offset: usize) -> Result<()> {
        if amount > self.len {
            return Err(BufferError::invalid(format!(
                "cannot copy {amount} item(s), only {} stored",
                self.len
            )));
        }
        let end = offset
            .checked_add(amount)
            .filter(|&end| end <= dst.len())
            .ok_or_else(|| {
                BufferError::invalid(format!(
                    "destination of length {} too small for {amount} item(s) at offset {offset}",
                    dst.len()
                ))
            })?;
        for (slot, item) in dst[offset..end].iter_mut().zip(self.iter()) {
            slot.clone_from(item);
        }
        Ok(())
    }

    /// Copies every stored item into `dst` starting at `offset`.
    pub fn copy_all_to(&self, dst: &mut [T], offset: usize) -> Result<()> {
        self.copy_to(dst, self.len, offset)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> TryFrom<Vec<T>> for RingBuffer<T> {
    type Error = BufferError;

    fn try_from(items: Vec<T>) -> Result<Self> {
        Self::from_sequence(items)
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Two buffers are equal when they hold the same items in the same logical
/// order, regardless of capacity or where the contents sit in storage.
impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for RingBuffer<T> {}

/// # Panics
///
/// Panics when `index >= len()`, like slice indexing. Use
/// [`RingBuffer::at`] for a checked read.
impl<T> Index<usize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IndexMut<usize> for RingBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> IntoIterator for RingBuffer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut RingBuffer<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
