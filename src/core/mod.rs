//! # Core Application Logic
//!
//! This module owns File Chat's state and the rules for changing it.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                    ┌───────────┴─────────────┐
//!                    ▼                         ▼
//!             ┌────────────┐           ┌────────────┐
//!             │    TUI     │           │    API     │
//!             │  Adapter   │──────────►│  (HTTP)    │
//!             │ (ratatui)  │           │            │
//!             └────────────┘           └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`config`]: Config file loading and resolution

pub mod action;
pub mod config;
pub mod state;
