use std::collections::VecDeque;
use std::f32::consts::TAU;

use fastrand::Rng;

use super::cue::Cue;
use super::particle::Particle;
use crate::canvas::{Canvas, Rgb};

/// Canvas units climbed per tick while rising.
pub const RISE_SPEED: f32 = 15.0;
/// Positions remembered for the rising streak.
pub const TRAIL_LEN: usize = 10;
pub const SPARKS_PER_EXPLOSION: usize = 40;
pub const MIN_SPARK_SPEED: f32 = 1.0; // units per tick
pub const MAX_SPARK_SPEED: f32 = 4.0; // exclusive

const PALETTE: [Rgb; 7] = [
    (255, 0, 64), // red
    (255, 128, 0), // orange
    (255, 255, 0), // yellow
    (0, 255, 0), // green
    (0, 255, 255), // cyan
    (0, 64, 255), // blue
    (128, 0, 255), // violet
];

pub fn random_color(rng: &mut Rng) -> Rgb {
    PALETTE[rng.usize(0..PALETTE.len())]
}

/// What happened at the moment a firework burst open.
#[derive(Debug, Clone, PartialEq)]
pub struct Detonation {
    pub x: f32,
    pub y: f32,
    pub letter: Option<char>,
    /// Step to run shortly after the explosion, if any.
    pub follow_up: Option<Cue>,
}

#[derive(Debug, Clone)]
pub struct Firework {
    x: f32,
    y: f32,
    target_y: f32, // bursts once y reaches this
    color: Rgb,
    speed: f32,
    trail: VecDeque<(f32, f32)>, // oldest first
    exploded: bool,
    letter: Option<char>,
    particles: Vec<Particle>,
    follow_up: Option<Cue>, // taken at explosion
    done: bool,
}

impl Firework {
    /// A rocket leaving `ground_y` that bursts once it climbs to `target_y`.
    pub fn launch(
        x: f32,
        ground_y: f32,
        target_y: f32,
        letter: Option<char>,
        follow_up: Option<Cue>,
        rng: &mut Rng,
    ) -> Self {
        Self {
            x,
            y: ground_y,
            target_y,
            color: random_color(rng),
            speed: RISE_SPEED,
            trail: VecDeque::with_capacity(TRAIL_LEN + 1),
            exploded: false,
            letter,
            particles: Vec::with_capacity(SPARKS_PER_EXPLOSION),
            follow_up,
            done: false,
        }
    }

    /// A firework that is already open at (x, y). It never rises.
    pub fn burst(x: f32, y: f32, rng: &mut Rng) -> (Self, Detonation) {
        let mut firework = Self::launch(x, y, y, None, None, rng);
        firework.exploded = true;
        let detonation = firework.explode(rng);
        (firework, detonation)
    }

    /// Advances one tick. Returns the detonation on the tick the rocket
    /// reaches its target height, and only on that tick.
    pub fn update(&mut self, rng: &mut Rng) -> Option<Detonation> {
        if !self.exploded {
            self.trail.push_back((self.x, self.y));
            if self.trail.len() > TRAIL_LEN {
                self.trail.pop_front();
            }

            self.y -= self.speed;

            if self.y <= self.target_y {
                self.exploded = true;
                return Some(self.explode(rng));
            }
        } else {
            for particle in &mut self.particles {
                particle.advance();
            }
            self.particles.retain(|p| !p.is_spent());
            if self.particles.is_empty() {
                self.done = true;
            }
        }
        None
    }

    fn explode(&mut self, rng: &mut Rng) -> Detonation {
        for _ in 0..SPARKS_PER_EXPLOSION {
            let angle = rng.f32() * TAU;
            let speed = MIN_SPARK_SPEED + rng.f32() * (MAX_SPARK_SPEED - MIN_SPARK_SPEED);
            self.particles.push(Particle::new(self.x, self.y, angle, speed));
        }

        Detonation {
            x: self.x,
            y: self.y,
            letter: self.letter,
            follow_up: self.follow_up.take(),
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if !self.exploded {
            canvas.line((self.x, self.y + 10.0), (self.x, self.y), self.color, 1.0);

            // oldest point is invisible, newest gets 0.6
            let len = self.trail.len() as f32;
            for (idx, &(x, y)) in self.trail.iter().enumerate() {
                canvas.dot(x, y, self.color, (idx as f32 / len) * 0.6);
            }
        } else {
            for p in &self.particles {
                canvas.dot(p.x, p.y, self.color, p.alpha);
            }
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    pub fn trail(&self) -> &VecDeque<(f32, f32)> {
        &self.trail
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
