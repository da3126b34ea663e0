pub mod choreographer;
pub mod cue;
pub mod firework;
pub mod particle;

pub use choreographer::{Choreographer, Phase, ShowEvent};
