//! Ordered collections built on self-balancing binary search trees.
//!
//! The centerpiece is `red_black_tree::RedBlackTree`, an ordered set whose insertion and removal
//! both rebalance top-down in a single pass. `avl_tree::AvlTree` exposes the same contract with
//! bottom-up height rebalancing.

pub mod arena;
pub mod avl_tree;
pub mod error;
pub mod red_black_tree;
