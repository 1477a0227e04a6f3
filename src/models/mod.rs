pub mod product;

pub use product::{Category, Inventory, Product, Review};
