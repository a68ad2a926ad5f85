pub mod builder;
pub mod parse;
pub mod tree;
