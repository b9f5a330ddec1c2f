#![deny(unsafe_code)]
//! Core types for fieldlab, a finite-difference field integrator.
//!
//! Provides the `Field` grid buffer, the 5-point `stencil` Laplacian with
//! selectable edge rules, the object-safe `Engine` trait implemented by the
//! reaction-diffusion and wave laws, the frame-oriented `TickDriver`, the
//! `Xorshift64` PRNG used for initial conditions, JSON parameter helpers and
//! the replayable `RunConfig`.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod field;
pub mod params;
pub mod prng;
pub mod stencil;

pub use config::RunConfig;
pub use driver::{FrameReport, TickDriver, TickPhase};
pub use engine::Engine;
pub use error::EngineError;
pub use field::Field;
pub use prng::Xorshift64;
pub use stencil::Boundary;
