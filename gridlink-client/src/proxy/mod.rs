//! Client-side proxies for distributed data structures.

mod map;

pub use map::GridMap;
