pub mod archive;
pub mod pruning;
