use crate::arena::Entry;
use crate::red_black_tree::tree::RedBlackTree;
use std::fmt;

/// The color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// The side of a node a child hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dir {
    Left,
    Right,
}

impl Dir {
    pub fn opposite(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// An ancestor on a descent path, paired with the direction the walk took out of it. The slot a
/// node hangs from is the step of its parent, or `None` for the root.
pub type Step = (Entry, Dir);

/// A struct representing an internal node of a red black tree.
pub struct Node<T> {
    pub element: T,
    pub color: Color,
    pub left: Option<Entry>,
    pub right: Option<Entry>,
}

impl<T> Node<T> {
    pub fn new(element: T, color: Color) -> Self {
        Node {
            element,
            color,
            left: None,
            right: None,
        }
    }

    pub fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    pub fn child(&self, dir: Dir) -> Option<Entry> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, dir: Dir) -> &mut Option<Entry> {
        match dir {
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }
}

/// A read-only view of a node inside a `RedBlackTree<T>`.
///
/// Views borrow the tree, so they can never outlive a mutation that restructures it.
pub struct NodeRef<'a, T> {
    tree: &'a RedBlackTree<T>,
    entry: Entry,
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(tree: &'a RedBlackTree<T>, entry: Entry) -> Self {
        NodeRef { tree, entry }
    }

    /// Returns the element stored in the node.
    pub fn element(&self) -> &'a T {
        &self.tree.node(self.entry).element
    }

    /// Returns the color of the node.
    pub fn color(&self) -> Color {
        self.tree.node(self.entry).color
    }

    /// Returns the left child of the node, if any.
    pub fn left(&self) -> Option<NodeRef<'a, T>> {
        self.tree
            .node(self.entry)
            .left
            .map(|entry| NodeRef::new(self.tree, entry))
    }

    /// Returns the right child of the node, if any.
    pub fn right(&self) -> Option<NodeRef<'a, T>> {
        self.tree
            .node(self.entry)
            .right
            .map(|entry| NodeRef::new(self.tree, entry))
    }
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        NodeRef::new(self.tree, self.entry)
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T> fmt::Debug for NodeRef<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("element", self.element())
            .field("color", &self.color())
            .finish()
    }
}
