use crate::avl_tree::node::Node;
use crate::avl_tree::tree;
use std::borrow::Borrow;
use std::vec::Vec;

/// An ordered set implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of two child subtrees of any node differ by at most one. It rebalances bottom-up after
/// every insertion and removal and exposes the same contract as `RedBlackTree<T>`, which makes
/// the two interchangeable when comparing their behavior.
///
/// # Examples
///
/// ```
/// use ordered_collections::avl_tree::AvlTree;
///
/// let mut tree = AvlTree::new();
/// assert!(tree.insert(10));
/// assert!(tree.insert(20));
/// assert!(tree.insert(30));
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.height(), 1);
/// assert_eq!(tree.rotation_count(), 1);
///
/// assert!(tree.remove(&10));
/// assert!(!tree.remove(&10));
/// ```
pub struct AvlTree<T> {
    tree: tree::Tree<T>,
    len: usize,
    rotations: usize,
}

impl<T> AvlTree<T> {
    /// Constructs a new, empty `AvlTree<T>`.
    pub fn new() -> Self {
        AvlTree {
            tree: None,
            len: 0,
            rotations: 0,
        }
    }

    /// Inserts an element into the tree. Returns `false` if an equal element already exists.
    pub fn insert(&mut self, element: T) -> bool
    where
        T: Ord,
    {
        let inserted = tree::insert(&mut self.tree, element, &mut self.rotations);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes an element from the tree. Returns `true` if the element was present.
    pub fn remove<V>(&mut self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let removed = tree::remove(&mut self.tree, key, &mut self.rotations).is_some();
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Checks if an element exists in the tree.
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::contains(&self.tree, key)
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of edges on the longest path from the root to a leaf, or `-1` if the
    /// tree is empty.
    pub fn height(&self) -> isize {
        tree::height(&self.tree) as isize - 1
    }

    /// Returns the number of single rotations performed on the tree so far. A double rotation
    /// counts as two.
    pub fn rotation_count(&self) -> usize {
        self.rotations
    }

    /// Returns an iterator over the tree. The iterator will yield elements using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::avl_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(3);
    /// tree.insert(1);
    /// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&1, &3]);
    /// ```
    pub fn iter(&self) -> AvlTreeIter<'_, T> {
        let mut iter = AvlTreeIter { stack: Vec::new() };
        iter.push_left_spine(&self.tree);
        iter
    }
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a AvlTree<T>
where
    T: 'a,
{
    type IntoIter = AvlTreeIter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator for `AvlTree<T>`.
///
/// This iterator traverses the elements of the tree in-order and yields immutable references.
pub struct AvlTreeIter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> AvlTreeIter<'a, T> {
    fn push_left_spine(&mut self, mut curr: &'a tree::Tree<T>) {
        while let Some(ref node) = curr {
            self.stack.push(node);
            curr = &node.left;
        }
    }
}

impl<'a, T> Iterator for AvlTreeIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(&node.element)
    }
}

#[cfg(test)]
mod tests {
    use super::AvlTree;
    use crate::avl_tree::tree::Tree;

    // Returns the height of the subtree, panicking if it is unbalanced or its heights are stale.
    fn check_balance<T>(tree: &Tree<T>) -> usize {
        match tree {
            None => 0,
            Some(ref node) => {
                let left = check_balance(&node.left);
                let right = check_balance(&node.right);
                assert!((left as isize - right as isize).abs() <= 1);
                assert_eq!(node.height, left.max(right) + 1);
                node.height
            },
        }
    }

    #[test]
    fn test_len_empty() {
        let tree: AvlTree<u32> = AvlTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), -1);
    }

    #[test]
    fn test_insert() {
        let mut tree = AvlTree::new();
        assert!(tree.insert(1));
        assert!(!tree.insert(1));
        assert!(tree.contains(&1));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_remove() {
        let mut tree = AvlTree::new();
        tree.insert(1);
        assert!(tree.remove(&1));
        assert!(!tree.contains(&1));
        assert!(!tree.remove(&1));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_double_rotation_counts_twice() {
        let mut tree = AvlTree::new();
        tree.insert(30);
        tree.insert(10);
        tree.insert(20);
        assert_eq!(tree.rotation_count(), 2);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_stays_balanced() {
        let mut tree = AvlTree::new();
        for element in 0..500 {
            tree.insert(element);
            check_balance(&tree.tree);
        }
        for element in (0..500).filter(|element| element % 2 == 0) {
            assert!(tree.remove(&element));
            check_balance(&tree.tree);
        }
        assert_eq!(tree.len(), 250);
        assert_eq!(
            tree.iter().cloned().collect::<Vec<u32>>(),
            (0..500).filter(|element| element % 2 == 1).collect::<Vec<u32>>(),
        );
    }

    #[test]
    fn test_remove_two_children() {
        let mut tree = AvlTree::new();
        for element in &[20, 10, 30, 5, 15, 25, 35] {
            tree.insert(*element);
        }
        assert!(tree.remove(&20));
        assert_eq!(
            tree.iter().cloned().collect::<Vec<u32>>(),
            vec![5, 10, 15, 25, 30, 35],
        );
        check_balance(&tree.tree);
    }
}
