use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::raw::{Bounds, Handle, RawBPlusTree};
use crate::{DEFAULT_BRANCHING_FACTOR, Error, MIN_BRANCHING_FACTOR};

mod render;

/// An ordered set based on a B+ tree.
///
/// Every element is stored once, in the leaf level. Internal nodes hold copies of leaf keys that act as
/// separators, so element types must be [`Clone`] as well as [`Ord`]. Each node holds at most
/// `branching_factor - 1` keys; non-root nodes never drop below half of that, which keeps all leaves at the same
/// depth and every operation logarithmic in the number of elements.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative to any other
/// item, as determined by the [`Ord`] trait, changes while it is in the set. The behavior resulting from such a
/// logic error is not specified, but will be encapsulated to the `BPlusTreeSet` that observed the logic error and
/// not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use bplus_tree_set::BPlusTreeSet;
///
/// let mut books = BPlusTreeSet::new();
///
/// books.insert("A Dance With Dragons");
/// books.insert("To Kill a Mockingbird");
/// books.insert("The Odyssey");
/// books.insert("The Great Gatsby");
///
/// if !books.contains("The Winds of Winter") {
///     println!("We have {} books, but The Winds of Winter ain't one.", books.len());
/// }
///
/// books.remove("The Odyssey");
///
/// for book in &books {
///     println!("{book}");
/// }
/// ```
///
/// A `BPlusTreeSet` with a known list of items can be initialized from an array:
///
/// ```
/// use bplus_tree_set::BPlusTreeSet;
///
/// let set = BPlusTreeSet::from([1, 2, 3]);
/// ```
pub struct BPlusTreeSet<T> {
    raw: RawBPlusTree<T>,
}

/// An iterator over the items of a `BPlusTreeSet`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTreeSet`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_tree_set::BPlusTreeSet;
///
/// let set = BPlusTreeSet::from([3, 1, 2]);
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BPlusTreeSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    raw: &'a RawBPlusTree<T>,
    /// Leaf and index of the next item yielded from the front.
    front: (Handle, usize),
    /// Leaf and exclusive end index of the next item yielded from the back.
    back: (Handle, usize),
    remaining: usize,
}

impl<T> BPlusTreeSet<T> {
    /// Makes a new, empty `BPlusTreeSet` with the default branching factor of 3.
    ///
    /// Does not allocate beyond the single empty root leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set: BPlusTreeSet<i32> = BPlusTreeSet::new();
    /// assert_eq!(set.branching_factor(), 3);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        BPlusTreeSet {
            raw: RawBPlusTree::new(Bounds::new(DEFAULT_BRANCHING_FACTOR)),
        }
    }

    /// Makes a new, empty `BPlusTreeSet` whose nodes hold at most `branching_factor - 1` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `branching_factor` is below [`MIN_BRANCHING_FACTOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::{BPlusTreeSet, Error};
    ///
    /// let set: BPlusTreeSet<u8> = BPlusTreeSet::with_branching_factor(16)?;
    /// assert_eq!(set.branching_factor(), 16);
    ///
    /// let err = BPlusTreeSet::<u8>::with_branching_factor(2).unwrap_err();
    /// assert_eq!(err, Error::InvalidConfig { branching_factor: 2 });
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_branching_factor(branching_factor: usize) -> Result<Self, Error> {
        if branching_factor < MIN_BRANCHING_FACTOR {
            return Err(Error::InvalidConfig {
                branching_factor,
            });
        }
        Ok(BPlusTreeSet {
            raw: RawBPlusTree::new(Bounds::new(branching_factor)),
        })
    }

    /// Returns the maximum number of children an internal node may have.
    #[must_use]
    pub const fn branching_factor(&self) -> usize {
        self.raw.bounds().branching_factor()
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut v = BPlusTreeSet::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the set contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut v = BPlusTreeSet::new();
    /// assert!(v.is_empty());
    /// v.insert(1);
    /// assert!(!v.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the set, removing all elements and resetting the tree to a single empty leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut v = BPlusTreeSet::from([1, 2, 3]);
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert_eq!(v.to_string(), "[]\n");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the first element in the set, if any. This element is always the minimum of all
    /// elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut set = BPlusTreeSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(5);
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first()
    }

    /// Returns a reference to the last element in the set, if any. This element is always the maximum of all
    /// elements in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set = BPlusTreeSet::from([5, 1, 3]);
    /// assert_eq!(set.last(), Some(&5));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last()
    }

    /// Gets an iterator that visits the elements in the `BPlusTreeSet` in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set = BPlusTreeSet::from([3, 1, 2]);
    /// let mut set_iter = set.iter();
    /// assert_eq!(set_iter.next(), Some(&1));
    /// assert_eq!(set_iter.next(), Some(&2));
    /// assert_eq!(set_iter.next(), Some(&3));
    /// assert_eq!(set_iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let last_leaf = self.raw.last_leaf();
        Iter {
            raw: &self.raw,
            front: (self.raw.first_leaf(), 0),
            back: (last_leaf, self.raw.node(last_leaf).key_count()),
            remaining: self.raw.len(),
        }
    }
}

impl<T: Clone + Ord> BPlusTreeSet<T> {
    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// The value may be any borrowed form of the set's element type, but the ordering on the borrowed form *must*
    /// match the ordering on the element type.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set = BPlusTreeSet::from([1, 2, 3]);
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&4), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(value)
    }

    /// Returns a reference to the element in the set, if any, that is equal to the value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set = BPlusTreeSet::from([1, 2, 3]);
    /// assert_eq!(set.get(&2), Some(&2));
    /// assert_eq!(set.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(value)
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. That is:
    ///
    /// - If the set did not previously contain an equal value, `true` is returned.
    /// - If the set already contained an equal value, `false` is returned, and the set is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut set = BPlusTreeSet::new();
    ///
    /// assert_eq!(set.insert(2), true);
    /// assert_eq!(set.insert(2), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.raw.insert(value)
    }

    /// If the set contains an element equal to the value, removes it from the set. Returns whether such an
    /// element was present.
    ///
    /// Nodes left below their minimum occupancy borrow from a sibling or merge with one, and the tree loses a level
    /// when the root runs out of separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let mut set = BPlusTreeSet::new();
    ///
    /// set.insert(2);
    /// assert_eq!(set.remove(&2), true);
    /// assert_eq!(set.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(value)
    }
}

impl<T: Clone> Clone for BPlusTreeSet<T> {
    fn clone(&self) -> Self {
        BPlusTreeSet {
            raw: self.raw.clone(),
        }
    }
}

impl<T> Default for BPlusTreeSet<T> {
    fn default() -> Self {
        BPlusTreeSet::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for BPlusTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Sets compare by their elements only; the branching factor does not take part.
impl<T: PartialEq> PartialEq for BPlusTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for BPlusTreeSet<T> {}

impl<T: PartialOrd> PartialOrd for BPlusTreeSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for BPlusTreeSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for BPlusTreeSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T: Clone + Ord> FromIterator<T> for BPlusTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = BPlusTreeSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Clone + Ord, const N: usize> From<[T; N]> for BPlusTreeSet<T> {
    /// Converts a `[T; N]` into a `BPlusTreeSet<T>`.
    ///
    /// ```
    /// use bplus_tree_set::BPlusTreeSet;
    ///
    /// let set1 = BPlusTreeSet::from([1, 2, 3, 4]);
    /// let set2: BPlusTreeSet<_> = [1, 2, 3, 4].into();
    /// assert_eq!(set1, set2);
    /// ```
    fn from(arr: [T; N]) -> Self {
        BPlusTreeSet::from_iter(arr)
    }
}

impl<T: Clone + Ord> Extend<T> for BPlusTreeSet<T> {
    fn extend<Iter: IntoIterator<Item = T>>(&mut self, iter: Iter) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for BPlusTreeSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a, T> IntoIterator for &'a BPlusTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let (handle, index) = self.front;
            let leaf = self.raw.node(handle).as_leaf();
            if index < leaf.key_count() {
                self.front.1 += 1;
                self.remaining -= 1;
                return Some(leaf.key(index));
            }
            self.front = (leaf.next()?, 0);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn count(self) -> usize {
        self.remaining
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }

    fn min(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next()
    }

    fn max(mut self) -> Option<&'a T>
    where
        &'a T: Ord,
    {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let (handle, end) = self.back;
            let leaf = self.raw.node(handle).as_leaf();
            if end > 0 {
                self.back.1 -= 1;
                self.remaining -= 1;
                return Some(leaf.key(end - 1));
            }
            let prev = leaf.prev()?;
            self.back = (prev, self.raw.node(prev).key_count());
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}
