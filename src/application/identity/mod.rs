//! Identity module: user management
//!
//! Contains the `UserService` which orchestrates the user use-cases:
//! creation, listing, lookups, partial updates and password confirmation.

pub mod service;

pub use service::UserService;
