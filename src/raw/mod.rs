mod arena;
mod handle;
mod node;
mod raw_bplus_tree;

pub(crate) use handle::Handle;
pub(crate) use node::{Bounds, Node};
pub(crate) use raw_bplus_tree::RawBPlusTree;
