use std::{collections::HashMap, hash::Hash};

/// The trait `GroupIterator` is defined by a single [`Self::group_by`] operation.
pub trait GroupIterator<V> {
    /// Consumes the iterator and allocates a [`Vec`] of groups.
    ///
    /// The iterator can extract key [`K`] by passing the function `f` from a reference to value
    /// [`V`]. Two different values with equal keys are placed in the same group.
    ///
    /// The result of this operation is a list of `(key, values)` pairs. Groups appear in the order
    /// in which their key was first seen, and within a group the values keep the order in which
    /// the iterator produced them. This makes the grouping deterministic regardless of how keys
    /// hash.
    ///
    /// The keys of type [`K`] are compared using their [`Eq`] implementation and hashed by their
    /// [`Hash`] implementation. The values [`V`] have no bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use deployer_shared::iter::GroupIterator;
    /// let groups = [3, 1, 3, 2, 1].into_iter().group_by(|v| *v);
    ///
    /// assert_eq!(groups, vec![(3, vec![3, 3]), (1, vec![1, 1]), (2, vec![2])]);
    /// ```
    fn group_by<K: Eq + Hash + Clone, F: Fn(&V) -> K>(self, f: F) -> Vec<(K, Vec<V>)>;
}

impl<V, I: Iterator<Item = V>> GroupIterator<V> for I {
    fn group_by<K: Eq + Hash + Clone, F: Fn(&V) -> K>(self, f: F) -> Vec<(K, Vec<V>)> {
        let capacity = match self.size_hint() {
            (_, Some(len)) => len,
            (len, None) => len,
        };
        let mut positions: HashMap<K, usize> = HashMap::with_capacity(capacity);
        let mut groups: Vec<(K, Vec<V>)> = Vec::with_capacity(capacity);

        for (key, value) in self.map(|v| (f(&v), v)) {
            match positions.get(&key) {
                Some(&index) => groups[index].1.push(value),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![value]));
                }
            }
        }

        groups
    }
}
