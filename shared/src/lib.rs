pub mod iter;
pub mod primitives;
