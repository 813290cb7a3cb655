//! Object storage adapters.

mod r2;

pub use r2::R2ObjectStore;
