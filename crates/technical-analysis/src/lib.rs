pub mod bundle;
pub mod indicators;
pub mod performance;


pub use bundle::*;
pub use indicators::*;
pub use performance::*;
