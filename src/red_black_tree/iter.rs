use crate::arena::Entry;
use crate::error::{Error, Result};
use crate::red_black_tree::node::NodeRef;
use crate::red_black_tree::tree::RedBlackTree;
use std::collections::BTreeSet;
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Order {
    PreOrder,
    InOrder,
}

// Explicit-stack traversal shared by the borrowing iterators and the detached cursors. It only
// holds node handles, so the tree has to be passed back in on every step.
struct Walk {
    order: Order,
    stack: Vec<Entry>,
}

impl Walk {
    fn new<T>(tree: &RedBlackTree<T>, order: Order) -> Self {
        let mut walk = Walk {
            order,
            stack: Vec::new(),
        };
        walk.restart(tree);
        walk
    }

    fn restart<T>(&mut self, tree: &RedBlackTree<T>) {
        self.stack.clear();
        match self.order {
            Order::PreOrder => self.stack.extend(tree.root),
            Order::InOrder => self.push_left_spine(tree, tree.root),
        }
    }

    fn push_left_spine<T>(&mut self, tree: &RedBlackTree<T>, mut link: Option<Entry>) {
        while let Some(entry) = link {
            self.stack.push(entry);
            link = tree.node(entry).left;
        }
    }

    // Rebuilds an in-order stack so that the walk resumes at the first element greater than
    // `element`.
    fn seek_after<T>(&mut self, tree: &RedBlackTree<T>, element: &T)
    where
        T: Ord,
    {
        self.stack.clear();
        let mut link = tree.root;
        while let Some(entry) = link {
            let node = tree.node(entry);
            if *element < node.element {
                self.stack.push(entry);
                link = node.left;
            } else {
                link = node.right;
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn advance<T>(&mut self, tree: &RedBlackTree<T>) -> Option<Entry> {
        let entry = self.stack.pop()?;
        let node = tree.node(entry);
        match self.order {
            Order::PreOrder => {
                self.stack.extend(node.right);
                self.stack.extend(node.left);
            },
            Order::InOrder => self.push_left_spine(tree, node.right),
        }
        Some(entry)
    }
}

/// An iterator for `RedBlackTree<T>`.
///
/// This iterator traverses the elements of the tree in-order and yields immutable references.
pub struct Iter<'a, T> {
    tree: &'a RedBlackTree<T>,
    walk: Walk,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(tree: &'a RedBlackTree<T>) -> Self {
        Iter {
            tree,
            walk: Walk::new(tree, Order::InOrder),
            remaining: tree.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.walk.advance(tree).map(|entry| {
            self.remaining -= 1;
            &tree.node(entry).element
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// An iterator over the nodes of a `RedBlackTree<T>` in pre-order.
pub struct PreOrderIter<'a, T> {
    tree: &'a RedBlackTree<T>,
    walk: Walk,
}

impl<'a, T> PreOrderIter<'a, T> {
    pub(crate) fn new(tree: &'a RedBlackTree<T>) -> Self {
        PreOrderIter {
            tree,
            walk: Walk::new(tree, Order::PreOrder),
        }
    }
}

impl<'a, T> Iterator for PreOrderIter<'a, T>
where
    T: 'a,
{
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.walk
            .advance(tree)
            .map(|entry| NodeRef::new(tree, entry))
    }
}

/// A traversal of a `RedBlackTree<T>` that does not borrow the tree.
///
/// A cursor is obtained through `RedBlackTree::cursor` (pre-order) or
/// `RedBlackTree::in_order_cursor` (in-order) and is handed the tree on every call. This lets the
/// element it last produced be removed through `remove` while the traversal continues. The cursor
/// remembers which tree it was created from and that tree's modification count: if it is handed
/// another tree, or the tree is changed by anything other than the cursor itself, `next` and
/// `remove` fail with `Error::ConcurrentModification`.
///
/// After a removal the cursor still produces exactly the elements it had not produced yet. An
/// in-order cursor resumes at the removed element's successor; a pre-order cursor follows the
/// pre-order of the restructured tree, skipping elements it already produced.
///
/// Every removal through a pre-order cursor restarts its walk from the root, so removing `k`
/// elements this way costs `O(k * n)` node visits on top of the traversal itself. In-order
/// removals only reseek, at `O(log n)` each.
///
/// # Examples
///
/// ```
/// use ordered_collections::error::Error;
/// use ordered_collections::red_black_tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// for element in 0..5 {
///     tree.insert(element);
/// }
///
/// let mut cursor = tree.in_order_cursor();
/// while cursor.has_next() {
///     let element = *cursor.next(&tree).unwrap().element();
///     if element % 2 == 1 {
///         cursor.remove(&mut tree).unwrap();
///     }
/// }
/// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&0, &2, &4]);
///
/// tree.insert(7);
/// assert_eq!(cursor.remove(&mut tree), Err(Error::ConcurrentModification));
/// ```
pub struct Cursor<T> {
    tree: usize,
    walk: Walk,
    last: Option<Entry>,
    modifications: usize,
    // Sorted elements not produced yet, tracked once a pre-order cursor has removed an element.
    pending: Option<BTreeSet<T>>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(tree: &RedBlackTree<T>, order: Order) -> Self {
        Cursor {
            tree: tree.id,
            walk: Walk::new(tree, order),
            last: None,
            modifications: tree.modifications,
            pending: None,
        }
    }

    fn check(&self, tree: &RedBlackTree<T>) -> Result<()> {
        if self.tree != tree.id || self.modifications != tree.modifications {
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }

    /// Returns `true` if the cursor has more elements to produce.
    pub fn has_next(&self) -> bool {
        match self.pending {
            Some(ref pending) => !pending.is_empty(),
            None => !self.walk.is_empty(),
        }
    }

    /// Produces the next node of the traversal.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConcurrentModification` if the tree changed behind the cursor and
    /// `Error::NoSuchElement` if the traversal is exhausted.
    pub fn next<'a>(&mut self, tree: &'a RedBlackTree<T>) -> Result<NodeRef<'a, T>>
    where
        T: Ord,
    {
        self.check(tree)?;
        if !self.has_next() {
            return Err(Error::NoSuchElement);
        }

        loop {
            let entry = self.walk.advance(tree).ok_or(Error::NoSuchElement)?;
            if let Some(ref mut pending) = self.pending {
                if !pending.remove(&tree.node(entry).element) {
                    continue;
                }
            }
            self.last = Some(entry);
            return Ok(NodeRef::new(tree, entry));
        }
    }

    /// Removes the element most recently produced by `next` from the tree.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConcurrentModification` if the tree changed behind the cursor, and
    /// `Error::IllegalState` if nothing has been produced yet or the last element produced was
    /// already removed.
    pub fn remove(&mut self, tree: &mut RedBlackTree<T>) -> Result<()>
    where
        T: Ord + Clone,
    {
        self.check(tree)?;
        let entry = self.last.take().ok_or(Error::IllegalState)?;
        let element = tree.node(entry).element.clone();

        if self.walk.order == Order::PreOrder && self.pending.is_none() {
            let mut pending = BTreeSet::new();
            for root in &self.walk.stack {
                collect_subtree(tree, *root, &mut pending);
            }
            self.pending = Some(pending);
        }

        tree.take(&element);
        self.modifications = tree.modifications;

        match self.walk.order {
            Order::PreOrder => self.walk.restart(tree),
            Order::InOrder => self.walk.seek_after(tree, &element),
        }
        Ok(())
    }
}

fn collect_subtree<T>(tree: &RedBlackTree<T>, root: Entry, elements: &mut BTreeSet<T>)
where
    T: Ord + Clone,
{
    let mut stack = vec![root];
    while let Some(entry) = stack.pop() {
        let node = tree.node(entry);
        elements.insert(node.element.clone());
        stack.extend(node.left);
        stack.extend(node.right);
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::red_black_tree::tree::tests::check_invariants;
    use crate::red_black_tree::RedBlackTree;

    fn build(elements: &[u32]) -> RedBlackTree<u32> {
        let mut tree = RedBlackTree::new();
        for element in elements {
            tree.insert(*element);
        }
        tree
    }

    #[test]
    fn test_iter_empty() {
        let tree: RedBlackTree<u32> = RedBlackTree::new();
        assert_eq!(tree.iter().next(), None);
        assert!(tree.pre_order().next().is_none());
    }

    #[test]
    fn test_iter() {
        let tree = build(&[5, 1, 3, 4, 2]);
        let iter = tree.iter();
        assert_eq!(iter.size_hint(), (5, Some(5)));
        assert_eq!(iter.collect::<Vec<&u32>>(), vec![&1, &2, &3, &4, &5]);
    }

    #[test]
    fn test_pre_order() {
        let tree = build(&[10, 20, 30, 40, 50, 60, 70]);
        let elements: Vec<u32> = tree.pre_order().map(|node| *node.element()).collect();
        assert_eq!(elements, vec![20, 10, 40, 30, 60, 50, 70]);
    }

    #[test]
    fn test_cursor_pre_order() {
        let tree = build(&[10, 20, 30]);
        let mut cursor = tree.cursor();
        let mut elements = Vec::new();
        while cursor.has_next() {
            elements.push(*cursor.next(&tree).unwrap().element());
        }
        assert_eq!(elements, vec![20, 10, 30]);
        assert_eq!(cursor.next(&tree).unwrap_err(), Error::NoSuchElement);
    }

    #[test]
    fn test_cursor_in_order() {
        let tree = build(&[30, 10, 20]);
        let mut cursor = tree.in_order_cursor();
        assert_eq!(cursor.next(&tree).map(|node| *node.element()), Ok(10));
        assert_eq!(cursor.next(&tree).map(|node| *node.element()), Ok(20));
        assert_eq!(cursor.next(&tree).map(|node| *node.element()), Ok(30));
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(&tree).unwrap_err(), Error::NoSuchElement);
    }

    #[test]
    fn test_cursor_empty_tree() {
        let tree: RedBlackTree<u32> = RedBlackTree::new();
        let mut cursor = tree.in_order_cursor();
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(&tree).unwrap_err(), Error::NoSuchElement);
    }

    #[test]
    fn test_cursor_remove_before_next() {
        let mut tree = build(&[1, 2]);
        let mut cursor = tree.in_order_cursor();
        assert_eq!(cursor.remove(&mut tree), Err(Error::IllegalState));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_cursor_remove_twice() {
        let mut tree = build(&[1, 2]);
        let mut cursor = tree.cursor();
        cursor.next(&tree).unwrap();
        assert_eq!(cursor.remove(&mut tree), Ok(()));
        assert_eq!(cursor.remove(&mut tree), Err(Error::IllegalState));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_cursor_concurrent_modification() {
        let mut tree = build(&[1, 2, 3]);
        let mut cursor = tree.in_order_cursor();
        tree.insert(10);
        assert_eq!(cursor.remove(&mut tree), Err(Error::ConcurrentModification));
        assert_eq!(cursor.next(&tree).unwrap_err(), Error::ConcurrentModification);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_cursor_rejects_other_tree() {
        let tree = build(&[0, 1, 2, 3, 4, 5, 6]);
        let mut other = build(&[0]);
        for _ in 0..3 {
            other.insert(1);
            other.remove(&1);
        }
        assert_eq!(other.modifications, tree.modifications);

        let mut cursor = tree.in_order_cursor();
        assert_eq!(cursor.next(&other).unwrap_err(), Error::ConcurrentModification);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.next(&other).unwrap_err(), Error::ConcurrentModification);
        assert_eq!(cursor.remove(&mut other), Err(Error::ConcurrentModification));
        assert_eq!(other.len(), 1);
        assert_eq!(cursor.next(&tree).map(|node| *node.element()), Ok(1));
    }

    #[test]
    fn test_pre_order_cursor_concurrent_modification() {
        let mut tree = build(&[1, 2, 3]);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.next(&tree).map(|node| *node.element()), Ok(2));
        tree.insert(10);
        assert_eq!(cursor.next(&tree).unwrap_err(), Error::ConcurrentModification);
        assert_eq!(cursor.remove(&mut tree), Err(Error::ConcurrentModification));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_cursor_concurrent_modification_after_own_removal() {
        let mut tree = build(&[1, 2, 3]);
        let mut cursor = tree.in_order_cursor();
        cursor.next(&tree).unwrap();
        cursor.remove(&mut tree).unwrap();
        cursor.next(&tree).unwrap();
        tree.remove(&3);
        assert_eq!(cursor.remove(&mut tree), Err(Error::ConcurrentModification));
    }

    #[test]
    fn test_cursor_failed_mutation_is_not_a_modification() {
        let mut tree = build(&[1, 2, 3]);
        let mut cursor = tree.in_order_cursor();
        cursor.next(&tree).unwrap();
        assert!(!tree.insert(2));
        assert!(!tree.remove(&7));
        assert_eq!(cursor.remove(&mut tree), Ok(()));
    }

    #[test]
    fn test_in_order_cursor_remove_all() {
        let elements: Vec<u32> = (0..64).collect();
        let mut tree = build(&elements);
        let mut cursor = tree.in_order_cursor();
        let mut produced = Vec::new();
        while cursor.has_next() {
            produced.push(*cursor.next(&tree).unwrap().element());
            cursor.remove(&mut tree).unwrap();
            check_invariants(&tree);
        }
        assert_eq!(produced, elements);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_in_order_cursor_remove_some() {
        let mut tree = build(&(0..50).collect::<Vec<u32>>());
        let mut cursor = tree.in_order_cursor();
        let mut produced = Vec::new();
        while cursor.has_next() {
            let element = *cursor.next(&tree).unwrap().element();
            produced.push(element);
            if element % 3 != 0 {
                cursor.remove(&mut tree).unwrap();
            }
        }
        assert_eq!(produced, (0..50).collect::<Vec<u32>>());
        assert_eq!(
            tree.iter().cloned().collect::<Vec<u32>>(),
            (0..50).filter(|element| element % 3 == 0).collect::<Vec<u32>>(),
        );
        check_invariants(&tree);
    }

    #[test]
    fn test_pre_order_cursor_remove_all() {
        let elements: Vec<u32> = (0..64).collect();
        let mut tree = build(&elements);
        let mut cursor = tree.cursor();
        let mut produced = Vec::new();
        while cursor.has_next() {
            produced.push(*cursor.next(&tree).unwrap().element());
            cursor.remove(&mut tree).unwrap();
            check_invariants(&tree);
        }
        produced.sort();
        assert_eq!(produced, elements);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_pre_order_cursor_produces_each_element_once() {
        let mut tree = build(&(0..40).collect::<Vec<u32>>());
        let mut cursor = tree.cursor();
        let mut produced = Vec::new();
        while cursor.has_next() {
            let element = *cursor.next(&tree).unwrap().element();
            produced.push(element);
            if element % 2 == 0 {
                cursor.remove(&mut tree).unwrap();
            }
        }
        produced.sort();
        assert_eq!(produced, (0..40).collect::<Vec<u32>>());
        assert_eq!(tree.len(), 20);
        check_invariants(&tree);
    }
}
