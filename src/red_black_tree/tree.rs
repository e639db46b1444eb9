use crate::arena::{Entry, TypedArena};
use crate::red_black_tree::iter::{Cursor, Iter, Order, PreOrderIter};
use crate::red_black_tree::node::{Color, Dir, Node, NodeRef, Step};
use log::{debug, trace};
use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::sync::atomic::{self, AtomicUsize};

const DEFAULT_CHUNK_SIZE: usize = 256;

// Source of the identities that tie cursors to the tree they were created from.
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

// The rotation performed to resolve a red node under a red parent.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Rotation {
    Single,
    Double,
}

/// An ordered set implemented using a red black tree that is rebalanced top-down.
///
/// A red black tree colors every node red or black and maintains that no red node has a red
/// child and that every path from the root to an absent child passes through the same number of
/// black nodes. Both insertion and removal restore these invariants on the way down to the
/// affected node, so neither operation needs a second pass back up the tree.
///
/// Nodes live in a `TypedArena` and refer to their children by handle. Every rotation is counted
/// and can be inspected through `rotation_count`, a double rotation counting as two.
///
/// # Examples
///
/// ```
/// use ordered_collections::red_black_tree::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// assert!(tree.insert(10));
/// assert!(tree.insert(20));
/// assert!(tree.insert(30));
/// assert!(!tree.insert(20));
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.root().map(|node| *node.element()), Some(20));
/// assert_eq!(tree.rotation_count(), 1);
///
/// assert!(tree.remove(&20));
/// assert!(!tree.remove(&20));
/// assert_eq!(tree.iter().collect::<Vec<&u32>>(), vec![&10, &30]);
/// ```
pub struct RedBlackTree<T> {
    pub(crate) id: usize,
    pub(crate) arena: TypedArena<Node<T>>,
    pub(crate) root: Option<Entry>,
    pub(crate) len: usize,
    pub(crate) rotations: usize,
    pub(crate) modifications: usize,
}

impl<T> RedBlackTree<T> {
    /// Constructs a new, empty `RedBlackTree<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32> = RedBlackTree::new();
    /// ```
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `RedBlackTree<T>` whose node store reserves room for `chunk_size`
    /// nodes at a time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<u32> = RedBlackTree::with_chunk_size(16);
    /// assert!(tree.is_empty());
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        RedBlackTree {
            id: NEXT_ID.fetch_add(1, atomic::Ordering::Relaxed),
            arena: TypedArena::new(chunk_size),
            root: None,
            len: 0,
            rotations: 0,
            modifications: 0,
        }
    }

    pub(crate) fn node(&self, entry: Entry) -> &Node<T> {
        &self.arena[entry]
    }

    pub(crate) fn node_mut(&mut self, entry: Entry) -> &mut Node<T> {
        &mut self.arena[entry]
    }

    pub(crate) fn is_red(&self, link: Option<Entry>) -> bool {
        match link {
            None => false,
            Some(entry) => self.node(entry).is_red(),
        }
    }

    pub(crate) fn set_color(&mut self, entry: Entry, color: Color) {
        self.node_mut(entry).color = color;
    }

    pub(crate) fn has_two_black_children(&self, entry: Entry) -> bool {
        let node = self.node(entry);
        !self.is_red(node.left) && !self.is_red(node.right)
    }

    pub(crate) fn blacken_root(&mut self) {
        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // Hangs `child` from `slot`, which is either a parent together with the side to attach to, or
    // `None` for the root.
    pub(crate) fn replace_child(&mut self, slot: Option<Step>, child: Option<Entry>) {
        match slot {
            Some((parent, dir)) => *self.node_mut(parent).child_mut(dir) = child,
            None => self.root = child,
        }
    }

    // Lifts the `dir` child of `top` above it and returns the child, which is the new root of the
    // subtree. The caller re-links it.
    pub(crate) fn rotate(&mut self, top: Entry, dir: Dir) -> Entry {
        let child = self
            .node(top)
            .child(dir)
            .expect("Expected a child to rotate over.");
        let inner = self.node(child).child(dir.opposite());
        *self.node_mut(top).child_mut(dir) = inner;
        *self.node_mut(child).child_mut(dir.opposite()) = Some(top);
        self.rotations += 1;
        trace!("rotated {:?} child over its parent ({} rotations)", dir, self.rotations);
        child
    }

    // Lifts the inner grandchild of `top` on the `dir` side two levels and returns it.
    pub(crate) fn double_rotate(&mut self, top: Entry, dir: Dir) -> Entry {
        let child = self
            .node(top)
            .child(dir)
            .expect("Expected a child to rotate over.");
        let lifted = self.rotate(child, dir.opposite());
        *self.node_mut(top).child_mut(dir) = Some(lifted);
        self.rotate(top, dir)
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of edges on the longest path from the root to a leaf, or `-1` if the
    /// tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.height(), -1);
    /// tree.insert(1);
    /// assert_eq!(tree.height(), 0);
    /// tree.insert(2);
    /// assert_eq!(tree.height(), 1);
    /// ```
    pub fn height(&self) -> isize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, link: Option<Entry>) -> isize {
        match link {
            None => -1,
            Some(entry) => {
                let node = self.node(entry);
                cmp::max(self.subtree_height(node.left), self.subtree_height(node.right)) + 1
            },
        }
    }

    /// Returns the number of single rotations performed on the tree so far. A double rotation
    /// counts as two.
    pub fn rotation_count(&self) -> usize {
        self.rotations
    }

    /// Returns a read-only view of the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|entry| NodeRef::new(self, entry))
    }

    /// Removes every element from the tree. The rotation count is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// tree.insert(2);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.modifications += 1;
    }

    /// Returns an iterator over the tree. The iterator will yield elements using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(3);
    /// tree.insert(1);
    ///
    /// let mut iterator = tree.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns an iterator over the nodes of the tree in pre-order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// for element in &[10, 20, 30] {
    ///     tree.insert(*element);
    /// }
    ///
    /// let elements: Vec<u32> = tree.pre_order().map(|node| *node.element()).collect();
    /// assert_eq!(elements, vec![20, 10, 30]);
    /// ```
    pub fn pre_order(&self) -> PreOrderIter<'_, T> {
        PreOrderIter::new(self)
    }

    /// Returns a detached pre-order cursor over the tree. See `Cursor` for how it interacts with
    /// mutations.
    pub fn cursor(&self) -> Cursor<T> {
        Cursor::new(self, Order::PreOrder)
    }

    /// Returns a detached in-order cursor over the tree. See `Cursor` for how it interacts with
    /// mutations.
    pub fn in_order_cursor(&self) -> Cursor<T> {
        Cursor::new(self, Order::InOrder)
    }

    fn find<V>(&self, key: &V) -> Option<Entry>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut link = self.root;
        while let Some(entry) = link {
            let node = self.node(entry);
            link = match key.cmp(node.element.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(entry),
            };
        }
        None
    }

    /// Checks if an element exists in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// assert!(!tree.contains(&0));
    /// assert!(tree.contains(&1));
    /// ```
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the minimum element of the tree. Returns `None` if the tree is empty.
    pub fn min(&self) -> Option<&T> {
        self.extreme(Dir::Left)
    }

    /// Returns the maximum element of the tree. Returns `None` if the tree is empty.
    pub fn max(&self) -> Option<&T> {
        self.extreme(Dir::Right)
    }

    fn extreme(&self, dir: Dir) -> Option<&T> {
        let mut curr = self.root?;
        while let Some(next) = self.node(curr).child(dir) {
            curr = next;
        }
        Some(&self.node(curr).element)
    }

    /// Returns the greatest element that is less than or equal to `key`. Returns `None` if such
    /// an element does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.floor(&0), None);
    /// assert_eq!(tree.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.bound(key, Dir::Left)
    }

    /// Returns the least element that is greater than or equal to `key`. Returns `None` if such
    /// an element does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.ceil(&0), Some(&1));
    /// assert_eq!(tree.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, key: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.bound(key, Dir::Right)
    }

    // Closest element to `key` on the `dir` side of it, `key` itself included.
    fn bound<V>(&self, key: &V, dir: Dir) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut best = None;
        let mut link = self.root;
        while let Some(entry) = link {
            let node = self.node(entry);
            let toward_key = match key.cmp(node.element.borrow()) {
                Ordering::Equal => return Some(&node.element),
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            if toward_key != dir {
                best = Some(&node.element);
            }
            link = node.child(toward_key);
        }
        best
    }

    // Colors `entry` with `color` and each of its children with `child_color`.
    fn paint(&mut self, entry: Entry, color: Color, child_color: Color) {
        let (left, right) = {
            let node = self.node(entry);
            (node.left, node.right)
        };
        self.set_color(entry, color);
        for child in left.into_iter().chain(right) {
            self.set_color(child, child_color);
        }
    }

    // Resolves a red `current` under a red parent by rotating at the grandparent. The rotated
    // subtree gets a black root with two red children and is re-linked into `great`.
    fn resolve_red_parent(
        &mut self,
        current: Entry,
        parent: Option<Step>,
        grand: Option<Step>,
        great: Option<Step>,
    ) -> Option<Rotation> {
        let (parent, toward_current) = parent?;
        if !self.node(parent).is_red() {
            return None;
        }

        let (grand, toward_parent) = grand.expect("Expected a red node to have a parent.");
        let (top, rotation) = if toward_current == toward_parent {
            (self.rotate(grand, toward_parent), Rotation::Single)
        } else {
            (self.double_rotate(grand, toward_parent), Rotation::Double)
        };
        debug_assert!(top == parent || top == current);

        self.paint(top, Color::Black, Color::Red);
        self.replace_child(great, Some(top));
        Some(rotation)
    }

    /// Inserts an element into the tree. Returns `false` and leaves the tree untouched if an
    /// equal element already exists; otherwise returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert!(tree.insert(1));
    /// assert!(tree.contains(&1));
    /// assert!(!tree.insert(1));
    /// ```
    pub fn insert(&mut self, element: T) -> bool
    where
        T: Ord,
    {
        // the descent recolors as it goes, so duplicates are turned away before it starts
        if self.contains(&element) {
            return false;
        }

        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.root = Some(self.arena.allocate(Node::new(element, Color::Black)));
                self.record_insert();
                return true;
            },
        };
        let mut parent: Option<Step> = None;
        let mut grand: Option<Step> = None;
        let mut great: Option<Step> = None;

        loop {
            let two_red_children = {
                let node = self.node(current);
                self.is_red(node.left) && self.is_red(node.right)
            };
            if two_red_children {
                self.paint(current, Color::Red, Color::Black);
                // ancestors lost to the rotation are shifted out below before they are needed
                match self.resolve_red_parent(current, parent, grand, great) {
                    Some(Rotation::Single) => grand = great,
                    Some(Rotation::Double) => {
                        parent = great;
                        grand = None;
                    },
                    None => {},
                }
                self.blacken_root();
            }

            let dir = match element.cmp(&self.node(current).element) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => {
                    self.blacken_root();
                    return false;
                },
            };

            great = grand;
            grand = parent;
            parent = Some((current, dir));

            match self.node(current).child(dir) {
                Some(next) => current = next,
                None => {
                    let leaf = self.arena.allocate(Node::new(element, Color::Red));
                    *self.node_mut(current).child_mut(dir) = Some(leaf);
                    self.resolve_red_parent(leaf, parent, grand, great);
                    self.blacken_root();
                    self.record_insert();
                    return true;
                },
            }
        }
    }

    fn record_insert(&mut self) {
        self.len += 1;
        self.modifications += 1;
        debug!("inserted element, tree now holds {} elements", self.len);
    }
}

impl<T> Default for RedBlackTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a RedBlackTree<T>
where
    T: 'a,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
