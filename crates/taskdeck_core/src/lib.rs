pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod session;
pub mod view;
