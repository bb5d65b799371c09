use super::RingBuffer;
use std::iter::{Chain, FusedIterator};
use std::slice;

/// Borrowing iterator over a [`RingBuffer`], oldest item first.
pub struct Iter<'a, T> {
    inner: Chain<slice::Iter<'a, Option<T>>, slice::Iter<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(head: &'a [Option<T>], tail: &'a [Option<T>]) -> Self {
        Self {
            remaining: head.len() + tail.len(),
            inner: head.iter().chain(tail.iter()),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.inner.next()?.as_ref()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        let item = self.inner.next_back()?.as_ref()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutably borrowing iterator over a [`RingBuffer`], oldest item first.
pub struct IterMut<'a, T> {
    inner: Chain<slice::IterMut<'a, Option<T>>, slice::IterMut<'a, Option<T>>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(head: &'a mut [Option<T>], tail: &'a mut [Option<T>]) -> Self {
        Self {
            remaining: head.len() + tail.len(),
            inner: head.iter_mut().chain(tail.iter_mut()),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next()?.as_mut()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next_back()?.as_mut()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator that drains a [`RingBuffer`] oldest item first.
pub struct IntoIter<T> {
    buffer: RingBuffer<T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(buffer: RingBuffer<T>) -> Self {
        Self { buffer }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.len(), Some(self.buffer.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.buffer.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
