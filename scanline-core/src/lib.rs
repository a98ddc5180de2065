//! Board-agnostic core logic for the Scanline raster generator
//!
//! This crate contains everything that does not depend on a specific
//! microcontroller:
//!
//! - Raster timing (axis phases, video modes, pixel clock planning)
//! - Channel traits for sync sequencers and the pixel channel
//! - Frame sources (color bars)
//! - The pixel streamer and its underrun monitor
//! - Startup state machine and controller
//! - Configuration type definitions
//!
//! With the `sim` feature, a software backend implements the channel
//! traits so the whole pipeline runs on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod frame;
pub mod state;
pub mod stream;
pub mod timing;
pub mod traits;

#[cfg(any(test, feature = "sim"))]
pub mod sim;
