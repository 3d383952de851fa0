//! Writing the composed vendor tree to disk.

pub mod writer;

pub use writer::write_tree_to;
