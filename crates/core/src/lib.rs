#![deny(warnings)]

pub mod buffer;
pub mod capability;
pub mod config;
pub mod error;
pub mod soak;

pub use buffer::RingBuffer;
pub use error::{BufferError, Result};
