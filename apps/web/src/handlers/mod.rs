//! Request handlers, one module per resource.

pub mod accounts;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod listings;
pub mod purchases;
