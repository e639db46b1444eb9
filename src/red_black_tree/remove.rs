//! Top-down removal.
//!
//! The walk keeps the node it is visiting, X, red before examining it: a black X is recolored or
//! rotated red using its parent P (always red at that point) and its sibling T. Once X holds the
//! element to remove it can be excised without disturbing any black height, so no pass back up
//! the tree is needed.

use crate::arena::Entry;
use crate::red_black_tree::node::{Color, Dir, Node, Step};
use crate::red_black_tree::tree::RedBlackTree;
use log::debug;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

// What the walk is looking for.
enum Target<'a, V: ?Sized> {
    // The node holding an element equal to the key.
    Key(&'a V),
    // The largest node of the subtree the walk is in, once a two-child node has been found and
    // its predecessor has to be pulled out.
    Max,
}

impl<'a, V> Target<'a, V>
where
    V: Ord + ?Sized,
{
    // Returns the side to continue on, or `None` if `node` is the one being looked for.
    fn locate<T>(&self, node: &Node<T>) -> Option<Dir>
    where
        T: Borrow<V>,
    {
        match *self {
            Target::Key(key) => match key.cmp(node.element.borrow()) {
                Ordering::Less => Some(Dir::Left),
                Ordering::Greater => Some(Dir::Right),
                Ordering::Equal => None,
            },
            Target::Max => node.right.map(|_| Dir::Right),
        }
    }
}

impl<T> RedBlackTree<T> {
    /// Removes an element from the tree. Returns `true` if the element was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1);
    /// assert!(tree.remove(&1));
    /// assert!(!tree.remove(&1));
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes an element from the tree and returns it. Returns `None` if no equal element
    /// exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_collections::red_black_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(String::from("a"));
    /// assert_eq!(tree.take("a"), Some(String::from("a")));
    /// assert_eq!(tree.take("a"), None);
    /// ```
    pub fn take<V>(&mut self, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        // absent keys return before the walk starts recoloring
        if !self.contains(key) {
            return None;
        }
        let root = self.root?;

        if self.has_two_black_children(root) {
            self.set_color(root, Color::Red);
        }
        let ret = self.remove_top_down(root, key);
        self.blacken_root();

        if ret.is_some() {
            self.len -= 1;
            self.modifications += 1;
            debug!("removed element, tree now holds {} elements", self.len);
        }
        ret
    }

    fn remove_top_down<V>(&mut self, root: Entry, key: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut target = Target::Key(key);
        let mut current = root;
        let mut parent: Option<Step> = None;
        let mut grand: Option<Step> = None;
        // node whose element is replaced by its predecessor once the predecessor is excised
        let mut hole: Option<Entry> = None;

        loop {
            // case 2A
            if !self.node(current).is_red() && self.has_two_black_children(current) {
                let parent = parent.expect("Expected a black node on the walk to have a parent.");
                self.redden(current, parent, grand);
            }

            let dir = match target.locate(self.node(current)) {
                Some(dir) => dir,
                None => {
                    let node = self.node(current);
                    if node.left.is_none() || node.right.is_none() {
                        return Some(self.excise(current, parent, hole));
                    }
                    hole = Some(current);
                    target = Target::Max;
                    Dir::Left
                },
            };

            let next = self.node(current).child(dir)?;
            if !self.node(current).is_red() && !self.node(next).is_red() {
                // case 2B2: the other child of current is red, rotate it up so that current
                // becomes a red parent of next
                let top = self.rotate(current, dir.opposite());
                self.set_color(top, Color::Black);
                self.set_color(current, Color::Red);
                self.replace_child(parent, Some(top));
                grand = Some((top, dir));
            } else {
                // case 2B1, or a plain step down from a red node
                grand = parent;
            }
            parent = Some((current, dir));
            current = next;
        }
    }

    // Turns a black `current` with two black children red. Its parent is red and hangs from
    // `grand`.
    fn redden(&mut self, current: Entry, parent: Step, grand: Option<Step>) {
        let (parent, toward_current) = parent;
        let away = toward_current.opposite();
        let sibling = self
            .node(parent)
            .child(away)
            .expect("Expected a black node to have a sibling.");
        let outer = self.node(sibling).child(away);
        let inner = self.node(sibling).child(toward_current);
        let parent_color = self.node(parent).color;

        let top = if self.is_red(outer) {
            // case 2A3
            let top = self.rotate(parent, away);
            if let Some(outer) = outer {
                self.set_color(outer, Color::Black);
            }
            top
        } else if self.is_red(inner) {
            // case 2A2
            self.double_rotate(parent, away)
        } else {
            // case 2A1
            self.set_color(parent, Color::Black);
            self.set_color(sibling, Color::Red);
            self.set_color(current, Color::Red);
            return;
        };

        self.set_color(top, parent_color);
        self.set_color(parent, Color::Black);
        self.set_color(current, Color::Red);
        self.replace_child(grand, Some(top));
    }

    // Unlinks `current`, which has at most one child, and returns the removed element. When a
    // hole is pending, `current` is its predecessor and its element fills the hole instead.
    fn excise(&mut self, current: Entry, parent: Option<Step>, hole: Option<Entry>) -> T {
        let node = self.arena.free(current);
        let child = node.left.or(node.right);
        if let Some(child) = child {
            self.set_color(child, Color::Black);
        }
        self.replace_child(parent, child);

        match hole {
            Some(hole) => mem::replace(&mut self.node_mut(hole).element, node.element),
            None => node.element,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::red_black_tree::node::Color;
    use crate::red_black_tree::tree::tests::check_invariants;
    use crate::red_black_tree::RedBlackTree;

    fn build(elements: &[u32]) -> RedBlackTree<u32> {
        let mut tree = RedBlackTree::new();
        for element in elements {
            assert!(tree.insert(*element));
        }
        tree
    }

    fn pre_order(tree: &RedBlackTree<u32>) -> Vec<(u32, Color)> {
        tree.pre_order()
            .map(|node| (*node.element(), node.color()))
            .collect()
    }

    #[test]
    fn test_remove_empty() {
        let mut tree: RedBlackTree<u32> = RedBlackTree::new();
        assert!(!tree.remove(&1));
        assert_eq!(tree.take(&1), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_absent_leaves_tree_unchanged() {
        let mut tree = build(&[10, 20, 30, 40, 50, 60, 70]);
        let before = pre_order(&tree);
        let rotations = tree.rotation_count();
        assert!(!tree.remove(&35));
        assert_eq!(pre_order(&tree), before);
        assert_eq!(tree.rotation_count(), rotations);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_remove_root_only() {
        let mut tree = build(&[1]);
        assert_eq!(tree.take(&1), Some(1));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.height(), -1);
    }

    #[test]
    fn test_remove_red_leaf() {
        let mut tree = build(&[10, 20, 30]);
        assert!(tree.remove(&30));
        assert_eq!(pre_order(&tree), vec![(20, Color::Black), (10, Color::Red)]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_root_with_one_child() {
        let mut tree = build(&[10, 20]);
        assert!(tree.remove(&10));
        assert_eq!(pre_order(&tree), vec![(20, Color::Black)]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_two_children() {
        let mut tree = build(&[10, 20, 30, 40, 50, 60, 70]);
        check_invariants(&tree);
        assert!(tree.remove(&40));
        assert_eq!(tree.len(), 6);
        assert_eq!(
            tree.iter().cloned().collect::<Vec<u32>>(),
            vec![10, 20, 30, 50, 60, 70],
        );
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_root_with_two_children() {
        let mut tree = build(&[20, 10, 30]);
        assert_eq!(tree.take(&20), Some(20));
        assert_eq!(tree.root().map(|node| *node.element()), Some(10));
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_sibling_children_black_recolors() {
        let mut tree = build(&[20, 10, 30, 5]);
        assert!(tree.remove(&5));
        assert_eq!(
            pre_order(&tree),
            vec![(20, Color::Black), (10, Color::Black), (30, Color::Black)],
        );
        let rotations = tree.rotation_count();

        // 30 and its sibling 10 have black children, so both are recolored red
        assert!(tree.remove(&30));
        assert_eq!(tree.rotation_count(), rotations);
        assert_eq!(pre_order(&tree), vec![(20, Color::Black), (10, Color::Red)]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_black_node_with_red_sibling_child() {
        let mut tree = build(&[10, 20, 30, 40, 50, 60, 70]);
        let rotations = tree.rotation_count();

        // 20 is black with a black child 10 on the way down and a red child 40, which is rotated
        // above it before the walk steps down
        assert!(tree.remove(&10));
        assert_eq!(tree.rotation_count(), rotations + 1);
        assert_eq!(
            pre_order(&tree),
            vec![
                (40, Color::Black),
                (20, Color::Black),
                (30, Color::Red),
                (60, Color::Black),
                (50, Color::Red),
                (70, Color::Red),
            ],
        );
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_sibling_outer_child_red() {
        // 30 has black children, its sibling 70 has a red outer child 80
        let mut tree = build(&[50, 30, 70, 80]);
        let rotations = tree.rotation_count();
        assert!(tree.remove(&30));
        assert_eq!(tree.rotation_count(), rotations + 1);
        assert_eq!(tree.iter().cloned().collect::<Vec<u32>>(), vec![50, 70, 80]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_sibling_inner_child_red() {
        // 30 has black children, its sibling 70 has a red inner child 60
        let mut tree = build(&[50, 30, 70, 60]);
        let rotations = tree.rotation_count();
        assert!(tree.remove(&30));
        assert_eq!(tree.rotation_count(), rotations + 2);
        assert_eq!(tree.iter().cloned().collect::<Vec<u32>>(), vec![50, 60, 70]);
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_sibling_both_children_red_prefers_single_rotation() {
        let mut tree = build(&[50, 30, 70, 60, 80]);
        let rotations = tree.rotation_count();
        assert!(tree.remove(&30));
        assert_eq!(tree.rotation_count(), rotations + 1);
        assert_eq!(tree.root().map(|node| *node.element()), Some(70));
        check_invariants(&tree);
    }

    #[test]
    fn test_remove_every_element_ascending() {
        let elements: Vec<u32> = (0..200).collect();
        let mut tree = build(&elements);
        for (index, element) in elements.iter().enumerate() {
            assert!(tree.remove(element));
            assert_eq!(tree.len(), elements.len() - index - 1);
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_every_element_descending() {
        let elements: Vec<u32> = (0..200).collect();
        let mut tree = build(&elements);
        for element in elements.iter().rev() {
            assert!(tree.remove(element));
            check_invariants(&tree);
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_interleaved_with_insert() {
        let mut tree = RedBlackTree::new();
        for element in 0..100u32 {
            tree.insert(element * 7 % 101);
            if element % 3 == 0 {
                assert!(tree.remove(&(element * 7 % 101)));
            }
            check_invariants(&tree);
        }
        assert_eq!(tree.len(), 66);
    }
}
