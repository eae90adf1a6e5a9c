#![forbid(unsafe_code)]

//! Core: geometry, observer lists, and deterministic scheduling.
//!
//! # Role in panekit
//! `panekit-core` holds the host-agnostic building blocks the layout engine
//! is written against. Nothing here knows about regions or splits.
//!
//! # Primary responsibilities
//! - **Geometry**: `Point`, `Size`, `Rect` in native surface units (`f32`).
//! - **Observers**: [`observer::ObserverList`] with RAII
//!   [`observer::Subscription`] guards.
//! - **Scheduling**: [`clock::Timeline`], a host-advanced queue of
//!   continuations driven by a [`clock::DeterministicClock`].

pub mod clock;
pub mod geometry;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod observer;
