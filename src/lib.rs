pub mod codegen;
pub mod error;
pub mod graph;
pub mod parse;
pub mod persist;
pub mod reconcile;
pub mod session;
pub mod stage;
pub mod validate;
pub mod wasm;
