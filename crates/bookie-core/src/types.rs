//! Core domain types for the bookie-sync system.

pub mod description;
pub mod entity;
pub mod event;
pub mod id;
pub mod market;
pub mod market_group;
pub mod remote;
pub mod rule;
pub mod sport;

pub use description::*;
pub use entity::*;
pub use event::*;
pub use id::*;
pub use market::*;
pub use market_group::*;
pub use remote::*;
pub use rule::*;
pub use sport::*;
