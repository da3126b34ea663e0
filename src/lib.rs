//! Terminal fireworks that spell out a message letter by letter, gather the
//! letters into a row and float them away on balloons.
//!
//! [`sim`] holds the simulation: particles, fireworks and the
//! [`Choreographer`](sim::Choreographer) that sequences them. Letters are
//! shown through a [`PresentationSink`](markers::PresentationSink), drawn in
//! the terminal by [`MarkerBoard`](markers::MarkerBoard).

pub mod canvas;
pub mod chime;
pub mod config;
pub mod effect;
pub mod error;
pub mod markers;
pub mod show;
pub mod sim;
