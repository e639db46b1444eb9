//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions. Both operations rebalance top-down in a
//! single pass from the root.

mod iter;
mod node;
mod remove;
mod tree;

pub use self::iter::{Cursor, Iter, PreOrderIter};
pub use self::node::{Color, NodeRef};
pub use self::tree::RedBlackTree;
