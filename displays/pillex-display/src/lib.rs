//! Display renderer contract and view layouts for Pillex
//!
//! This crate provides:
//! - [`DisplayBackend`]: the drawing primitives a panel driver offers
//!   (clear, invert, text size, cursor, text, shapes, present)
//! - [`render`]: the layout of each status view on top of those
//!   primitives
//!
//! # Architecture
//!
//! The screen controller in `pillex-core` decides which view is active and
//! when it is redrawn, and hands a [`View`] snapshot to [`render`]. The
//! layouts only ever talk to the trait, so they are tested against a
//! recording backend and run unchanged on any panel driver.

#![cfg_attr(not(test), no_std)]

pub mod backend;
pub mod views;

pub use backend::{DisplayBackend, DisplayError, TextSize};
pub use pillex_core::screen::View;
pub use views::{render, wrap_lines};
