//! Orders domain: static fixtures, order lookup, and bill arithmetic.

pub mod api;
pub mod bill;
pub mod data;
pub mod types;

pub use api::get_order;
pub use bill::get_bill;
pub use types::{Order, OrderData};
