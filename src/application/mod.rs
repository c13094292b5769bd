pub mod checkout;
pub mod lifecycle;
pub mod pricing;

pub use checkout::*;
pub use lifecycle::*;
pub use pricing::*;
