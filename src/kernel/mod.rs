//! Kernel functions for the margin classifier

pub mod rbf;
pub mod traits;

pub use self::rbf::*;
pub use self::traits::*;
