//! Checkout configuration resolution and pricing.

mod effective;
mod pricing;
mod resolver;

pub use effective::*;
pub use pricing::*;
pub use resolver::*;
