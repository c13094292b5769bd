pub mod booking;
pub mod car;
pub mod payment;
pub mod subscription;
pub mod wallet;

pub use booking::*;
pub use car::*;
pub use payment::*;
pub use subscription::*;
pub use wallet::*;
