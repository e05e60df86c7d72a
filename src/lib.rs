#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]

#[macro_use]
extern crate alloc;

mod key;
pub use key::Key;

mod node;

mod rb_tree;
pub use rb_tree::RbTree;

mod validate;
pub use validate::Violation;

mod render;

mod min_heap;
pub use min_heap::{HeapViolation, MinHeap};
