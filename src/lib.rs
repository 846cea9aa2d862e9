// Navigation State Library Entry Point
// This file exposes all modules so they can be imported by main.rs
// and tested independently.

// Core modules
pub mod error;
pub mod selector;
pub mod dom;
pub mod storage;
pub mod settings;

// Shared state
pub mod state;
pub mod controller;

// Server layout stand-in for the CLI and tests
pub mod page;

// Pure logic modules (no controller state)
pub mod modules;

pub use controller::NavigationStateController;
pub use error::{NavError, Result};
