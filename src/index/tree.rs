//! Persistent ordered map
//!
//! AVL tree whose nodes are immutable and shared through `Arc`. Updates
//! copy the path from the root to the touched node and reuse every other
//! subtree, so cloning a map is O(1) and a clone never observes updates
//! made through another clone.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Link<K, V> = Option<Arc<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: u8,
    left: Link<K, V>,
    right: Link<K, V>,
}

fn height<K, V>(link: &Link<K, V>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

fn make<K, V>(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> Arc<Node<K, V>> {
    let height = 1 + height(&left).max(height(&right));
    Arc::new(Node {
        key,
        value,
        height,
        left,
        right,
    })
}

/// Build a node from parts whose heights differ by at most two,
/// rotating when they differ by exactly two.
fn balance<K: Clone, V: Clone>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> Arc<Node<K, V>> {
    let hl = height(&left);
    let hr = height(&right);

    if hl > hr + 1 {
        if let Some(l) = &left {
            if height(&l.left) >= height(&l.right) {
                return make(
                    l.key.clone(),
                    l.value.clone(),
                    l.left.clone(),
                    Some(make(key, value, l.right.clone(), right)),
                );
            }
            if let Some(lr) = &l.right {
                return make(
                    lr.key.clone(),
                    lr.value.clone(),
                    Some(make(
                        l.key.clone(),
                        l.value.clone(),
                        l.left.clone(),
                        lr.left.clone(),
                    )),
                    Some(make(key, value, lr.right.clone(), right)),
                );
            }
        }
    } else if hr > hl + 1 {
        if let Some(r) = &right {
            if height(&r.right) >= height(&r.left) {
                return make(
                    r.key.clone(),
                    r.value.clone(),
                    Some(make(key, value, left, r.left.clone())),
                    r.right.clone(),
                );
            }
            if let Some(rl) = &r.left {
                return make(
                    rl.key.clone(),
                    rl.value.clone(),
                    Some(make(key, value, left, rl.left.clone())),
                    Some(make(
                        r.key.clone(),
                        r.value.clone(),
                        rl.right.clone(),
                        r.right.clone(),
                    )),
                );
            }
        }
    }

    make(key, value, left, right)
}

/// Returns the new subtree and the value it replaced, if any
fn insert_node<K: Ord + Clone, V: Clone>(
    link: &Link<K, V>,
    key: K,
    value: V,
) -> (Arc<Node<K, V>>, Option<V>) {
    let node = match link {
        None => return (make(key, value, None, None), None),
        Some(node) => node,
    };

    match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, old) = insert_node(&node.left, key, value);
            (
                balance(node.key.clone(), node.value.clone(), Some(left), node.right.clone()),
                old,
            )
        }
        Ordering::Greater => {
            let (right, old) = insert_node(&node.right, key, value);
            (
                balance(node.key.clone(), node.value.clone(), node.left.clone(), Some(right)),
                old,
            )
        }
        Ordering::Equal => (
            make(key, value, node.left.clone(), node.right.clone()),
            Some(node.value.clone()),
        ),
    }
}

/// Detach the minimum entry of a non-empty subtree
fn remove_min<K: Clone, V: Clone>(node: &Arc<Node<K, V>>) -> (K, V, Link<K, V>) {
    match &node.left {
        None => (node.key.clone(), node.value.clone(), node.right.clone()),
        Some(left) => {
            let (key, value, rest) = remove_min(left);
            (
                key,
                value,
                Some(balance(node.key.clone(), node.value.clone(), rest, node.right.clone())),
            )
        }
    }
}

/// Returns the new subtree and the removed value, or `None` if absent
fn remove_node<K, V, Q>(link: &Link<K, V>, key: &Q) -> Option<(Link<K, V>, V)>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Ord + ?Sized,
{
    let node = link.as_ref()?;

    match key.cmp(node.key.borrow()) {
        Ordering::Less => {
            let (left, removed) = remove_node(&node.left, key)?;
            Some((
                Some(balance(node.key.clone(), node.value.clone(), left, node.right.clone())),
                removed,
            ))
        }
        Ordering::Greater => {
            let (right, removed) = remove_node(&node.right, key)?;
            Some((
                Some(balance(node.key.clone(), node.value.clone(), node.left.clone(), right)),
                removed,
            ))
        }
        Ordering::Equal => {
            let joined = match (&node.left, &node.right) {
                (None, right) => right.clone(),
                (left, None) => left.clone(),
                (left, Some(right)) => {
                    let (key, value, rest) = remove_min(right);
                    Some(balance(key, value, left.clone(), rest))
                }
            };
            Some((joined, node.value.clone()))
        }
    }
}

/// Immutable-node ordered map with structural sharing
pub struct PersistentMap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> PersistentMap<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 when empty)
    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    /// True when both maps share the same root node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(self.height()),
            remaining: self.len,
        };
        iter.push_left(&self.root);
        iter
    }

    /// Largest key in the map
    pub fn last_key(&self) -> Option<&K> {
        let mut node = self.root.as_ref()?;
        while let Some(right) = &node.right {
            node = right;
        }
        Some(&node.key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = &self.root;
        while let Some(node) = link {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Ord + Clone, V: Clone> PersistentMap<K, V> {
    /// Insert or overwrite, returning the previous value
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, old) = insert_node(&self.root, key, value);
        self.root = Some(root);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, removed) = remove_node(&self.root, key)?;
        self.root = root;
        self.len -= 1;
        Some(removed)
    }
}

impl<K, V> Clone for PersistentMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K, V> Default for PersistentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for PersistentMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a PersistentMap
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
