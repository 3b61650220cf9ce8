//! File items.

mod send;

pub use send::SendFile;
