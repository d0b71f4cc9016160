//! Item data types and value coercion.

pub mod item;

pub use item::{InvalidValue, Item, ItemId, parse_value};
