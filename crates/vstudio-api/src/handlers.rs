//! Request handlers.

pub mod health;
pub mod jobs;
pub mod pages;

pub use health::*;
pub use jobs::*;
pub use pages::*;
