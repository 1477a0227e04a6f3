pub mod common;
pub mod products;
