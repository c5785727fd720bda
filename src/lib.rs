//! A bytecode compiler and stack-based virtual machine for arithmetic expressions.
//!
//! Source text is scanned into tokens on demand, compiled in a single pass into a
//! [`Chunk`] of bytecode, and executed by a [`VM`]. Every instruction byte keeps the
//! source line it was compiled from so errors can point back at the source.

#![warn(missing_debug_implementations)]
#![deny(missing_docs)]

mod buffer;
mod chunk;
mod compile;
mod config;
mod debug;
mod error;
mod opcode;
mod scan;
mod token;
mod value;
mod vm;

pub use buffer::*;
pub use chunk::*;
pub use compile::*;
pub use config::*;
pub use debug::*;
pub use error::*;
pub use opcode::*;
pub use scan::*;
pub use token::*;
pub use value::*;
pub use vm::*;
