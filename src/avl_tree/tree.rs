use crate::avl_tree::node::Node;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

pub type Tree<T> = Option<Box<Node<T>>>;

pub fn height<T>(tree: &Tree<T>) -> usize {
    match tree {
        None => 0,
        Some(ref node) => node.height,
    }
}

fn rotate_left<T>(mut node: Box<Node<T>>, rotations: &mut usize) -> Box<Node<T>> {
    let mut child = node
        .right
        .take()
        .expect("Expected right child node to be `Some`.");
    node.right = child.left.take();
    node.update();
    child.left = Some(node);
    child.update();
    *rotations += 1;
    child
}

fn rotate_right<T>(mut node: Box<Node<T>>, rotations: &mut usize) -> Box<Node<T>> {
    let mut child = node
        .left
        .take()
        .expect("Expected left child node to be `Some`.");
    node.left = child.right.take();
    node.update();
    child.right = Some(node);
    child.update();
    *rotations += 1;
    child
}

fn balance<T>(tree: &mut Tree<T>, rotations: &mut usize) {
    let mut node = match tree.take() {
        Some(node) => node,
        None => return,
    };

    node.update();

    if node.balance() > 1 {
        if let Some(child) = node.left.take() {
            node.left = Some(if child.balance() < 0 {
                rotate_left(child, rotations)
            } else {
                child
            });
        }
        node = rotate_right(node, rotations);
    } else if node.balance() < -1 {
        if let Some(child) = node.right.take() {
            node.right = Some(if child.balance() > 0 {
                rotate_right(child, rotations)
            } else {
                child
            });
        }
        node = rotate_left(node, rotations);
    }

    *tree = Some(node);
}

// precondition: the tree is not empty
fn remove_max<T>(tree: &mut Tree<T>, rotations: &mut usize) -> T {
    if let Some(ref mut node) = tree {
        if node.right.is_some() {
            let ret = remove_max(&mut node.right, rotations);
            balance(tree, rotations);
            return ret;
        }
    }

    let node = *tree.take().expect("Expected a non-empty tree.");
    let Node { element, left, .. } = node;
    *tree = left;
    element
}

pub fn insert<T>(tree: &mut Tree<T>, element: T, rotations: &mut usize) -> bool
where
    T: Ord,
{
    let inserted = match tree {
        Some(ref mut node) => match element.cmp(&node.element) {
            Ordering::Less => insert(&mut node.left, element, rotations),
            Ordering::Greater => insert(&mut node.right, element, rotations),
            Ordering::Equal => return false,
        },
        None => {
            *tree = Some(Box::new(Node::new(element)));
            return true;
        },
    };

    if inserted {
        balance(tree, rotations);
    }
    inserted
}

pub fn remove<T, V>(tree: &mut Tree<T>, key: &V, rotations: &mut usize) -> Option<T>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let ret = match tree {
        Some(ref mut node) => match key.cmp(node.element.borrow()) {
            Ordering::Less => remove(&mut node.left, key, rotations),
            Ordering::Greater => remove(&mut node.right, key, rotations),
            Ordering::Equal => {
                // two children: the in-order predecessor takes the node's place
                if node.left.is_some() && node.right.is_some() {
                    let predecessor = remove_max(&mut node.left, rotations);
                    Some(mem::replace(&mut node.element, predecessor))
                } else {
                    let node = *tree.take().expect("Expected a non-empty tree.");
                    let Node {
                        element,
                        left,
                        right,
                        ..
                    } = node;
                    *tree = left.or(right);
                    return Some(element);
                }
            },
        },
        None => return None,
    };

    if ret.is_some() {
        balance(tree, rotations);
    }
    ret
}

pub fn contains<T, V>(tree: &Tree<T>, key: &V) -> bool
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    while let Some(ref node) = curr {
        curr = match key.cmp(node.element.borrow()) {
            Ordering::Less => &node.left,
            Ordering::Greater => &node.right,
            Ordering::Equal => return true,
        };
    }
    false
}
