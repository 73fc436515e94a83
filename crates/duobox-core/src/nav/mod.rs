//! Navigation logic for duobox.
//!
//! This module contains the two-panel [`controller::NavigationController`],
//! the per-panel [`panel::PanelState`], back/forward
//! [`history::History`], and the sorting/filtering [`filter::ViewPolicy`].

pub mod controller;
pub mod filter;
pub mod history;
pub mod panel;

pub use controller::{NavigationController, NavigationOptions, Side, Waiter};
