//! Utility structs and methods
use std::cmp::Ordering::Less;

/// Iterator of all one-way pairwise combinations of the inner slice
///
/// Used to enumerate the neighbor pairs of a term when counting triangles.
///
/// # Examples
/// ```
/// use phenograph::utils::Combinations;
///
/// let items = [1, 2, 3];
/// let mut c = Combinations::new(&items);
///
/// assert_eq!(c.next(), Some((&1, &2)));
/// assert_eq!(c.next(), Some((&1, &3)));
/// assert_eq!(c.next(), Some((&2, &3)));
/// assert!(c.next().is_none());
/// ```
pub struct Combinations<'a, T> {
    inner: &'a [T],
    idx1: usize,
    idx2: usize,
}

impl<'a, T> Combinations<'a, T> {
    /// Creates a new Combinations iterator
    pub fn new(inner: &'a [T]) -> Self {
        Self {
            inner,
            idx1: 0,
            idx2: 1,
        }
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = (&'a T, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (
                self.idx1 < self.inner.len(),
                self.idx2.cmp(&self.inner.len()),
            ) {
                (true, Less) => {
                    self.idx2 += 1;
                    return Some((&self.inner[self.idx1], &self.inner[self.idx2 - 1]));
                }
                (true, _) => {
                    self.idx1 += 1;
                    self.idx2 = self.idx1 + 1;
                }
                _ => return None,
            }
        }
    }
}

/// Unix timestamp in seconds, `0` if the system clock is before 1970
pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
