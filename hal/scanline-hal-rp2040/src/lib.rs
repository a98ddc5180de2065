//! RP2040 backend for the Scanline raster generator
//!
//! Implements the `scanline-core` channel traits on one PIO block:
//!
//! - SM0: horizontal sync sequencer
//! - SM1: vertical sync sequencer (same program, clocked once per line)
//! - SM2: pixel data shifter
//! - SM3: pixel clock output
//!
//! The sequencers signal the start of each line and frame through PIO IRQ
//! flags 4 and 5, which the pixel shifter waits on. Activating a channel
//! only arms it; [`start_in_lockstep`] then enables all four state machines
//! with one register write. After that no CPU involvement is needed
//! besides keeping the pixel FIFO full, which one DMA channel does per line.

#![no_std]

pub mod lockstep;
pub mod pio;
pub mod pixel;
pub mod sequencer;

pub use lockstep::start_in_lockstep;
pub use pixel::PioPixelChannel;
pub use sequencer::{load_sync_program, PioSyncSequencer};
