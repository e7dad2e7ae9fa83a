pub mod auth;
pub mod pods;
pub mod public;
