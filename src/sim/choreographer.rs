use fastrand::Rng;
use tracing::{debug, info};

use super::cue::{Cue, Schedule};
use super::firework::{Detonation, Firework};
use crate::canvas::Canvas;
use crate::markers::{Appearance, MarkerId, PresentationSink};

/// Horizontal margin either side of the spelled letters.
pub const LETTER_MARGIN: f32 = 50.0;
/// Highest point (smallest y) a letter rocket aims for.
pub const MIN_TARGET_Y: f32 = 100.0;
/// Pause between a letter bursting and the next one launching.
pub const FOLLOW_UP_DELAY: f32 = 0.6;
pub const ENTRANCE_DELAY: f32 = 0.05;
pub const ENTRANCE_DURATION: f32 = 0.6;
pub const GATHER_SPACING: f32 = 30.0;
pub const GATHER_DURATION: f32 = 1.0;
/// From the start of the gather to the first cluster of bursts.
pub const FINALE_DELAY: f32 = 1.2;
/// From the first cluster of bursts to the first balloon.
pub const FLY_AWAY_DELAY: f32 = 1.5;
pub const BALLOON_STAGGER: f32 = 0.3;
pub const MIN_BURST_SIZE: usize = 5;
pub const MAX_BURST_SIZE: usize = 10;
pub const MIN_BURST_DELAY: f32 = 0.3;
pub const MAX_BURST_DELAY: f32 = 1.5;

const BALLOON_STEP: f32 = 0.02; // seconds between float steps
const BALLOON_RISE: f32 = 2.0; // units up per step
const BALLOON_SWAY_RATE: f32 = 0.05; // phase advance per step
const BALLOON_SWAY_AMPLITUDE: f32 = 1.5; // peak sideways drift per step
const BALLOON_FADE: f32 = 0.007; // gone after ~143 steps

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Letter rockets going up one after another.
    Spelling,
    /// Letters sliding into a row.
    Gathering,
    /// Endless bursts while the letters float away.
    Finale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShowEvent {
    Explosion { x: f32, y: f32 },
    Burst { size: usize },
    SequenceComplete,
}

#[derive(Debug)]
struct Balloon {
    id: MarkerId,
    x: f32,
    y: f32,
    sway: f32,
    direction: f32,
    opacity: f32,
    clock: f32,
}

impl Balloon {
    fn step(&mut self) {
        self.sway += BALLOON_SWAY_RATE;
        self.x += self.sway.sin() * BALLOON_SWAY_AMPLITUDE * self.direction;
        self.y -= BALLOON_RISE;
        self.opacity -= BALLOON_FADE;
    }
}

/// Owns every firework in flight and decides when new ones go up.
pub struct Choreographer {
    width: f32,
    height: f32,
    letters: Vec<char>,
    letter_x: Vec<f32>,
    next_letter: usize,
    markers_placed: usize,
    resting: Vec<(f32, f32)>,
    fireworks: Vec<Firework>,
    balloons: Vec<Balloon>,
    schedule: Schedule,
    phase: Phase,
    sequence_complete: bool,
    bursts_started: bool,
    events: Vec<ShowEvent>,
    rng: Rng,
}

impl Choreographer {
    pub fn new(letters: Vec<char>, width: f32, height: f32, rng: Rng) -> Self {
        let letter_x = letter_columns(letters.len(), width);
        Self {
            width,
            height,
            resting: Vec::with_capacity(letters.len()),
            letters,
            letter_x,
            next_letter: 0,
            markers_placed: 0,
            fireworks: Vec::new(),
            balloons: Vec::new(),
            schedule: Schedule::new(),
            phase: Phase::Spelling,
            sequence_complete: false,
            bursts_started: false,
            events: Vec::new(),
            rng,
        }
    }

    /// Sends up the first letter.
    pub fn start(&mut self) {
        info!(letters = self.letters.len(), "spelling started");
        self.launch_next_letter();
    }

    /// One simulation tick: due cues, then update and draw every firework,
    /// dropping finished ones, then the balloons.
    pub fn tick<S: PresentationSink>(&mut self, dt: f32, canvas: &mut Canvas, sink: &mut S) {
        for cue in self.schedule.advance(dt) {
            self.run_cue(cue, sink);
        }

        let mut detonations = Vec::new();
        let rng = &mut self.rng;
        self.fireworks.retain_mut(|fw| {
            if let Some(d) = fw.update(rng) {
                detonations.push(d);
            }
            fw.draw(canvas);
            !fw.is_done()
        });
        for d in detonations {
            self.detonated(d, sink);
        }

        self.float_balloons(dt, sink);
    }

    /// Starts the endless bursts. Calling it again does nothing.
    pub fn start_bursts(&mut self) {
        if self.bursts_started {
            return;
        }
        self.bursts_started = true;
        info!("continuous bursts started");
        self.launch_burst();
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, ShowEvent> {
        self.events.drain(..)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn letters_launched(&self) -> usize {
        self.next_letter
    }

    pub fn is_sequence_complete(&self) -> bool {
        self.sequence_complete
    }

    pub fn balloons_aloft(&self) -> usize {
        self.balloons.len()
    }

    fn run_cue<S: PresentationSink>(&mut self, cue: Cue, sink: &mut S) {
        match cue {
            Cue::LaunchLetter => self.launch_next_letter(),
            Cue::StartFinale => {
                self.phase = Phase::Finale;
                self.start_bursts();
                self.schedule.after(FLY_AWAY_DELAY, Cue::FlyAway);
            }
            Cue::FlyAway => {
                info!("letters flying away");
                self.run_cue(Cue::ReleaseBalloon(0), sink);
            }
            Cue::ReleaseBalloon(id) => {
                let Some(&(x, y)) = self.resting.get(id) else {
                    return;
                };
                sink.attach_balloon(id);
                let direction = if self.rng.bool() { -1.0 } else { 1.0 };
                self.balloons.push(Balloon {
                    id,
                    x,
                    y,
                    sway: 0.0,
                    direction,
                    opacity: 1.0,
                    clock: 0.0,
                });
                debug!(id, "balloon released");
                self.schedule.after(BALLOON_STAGGER, Cue::ReleaseBalloon(id + 1));
            }
            Cue::Burst => self.launch_burst(),
        }
    }

    fn launch_next_letter(&mut self) {
        if self.next_letter >= self.letters.len() {
            return;
        }

        let idx = self.next_letter;
        let letter = self.letters[idx];
        let x = self.letter_x[idx];
        let target_y = self.random_target_y();
        self.fireworks.push(Firework::launch(
            x,
            self.height,
            target_y,
            Some(letter),
            Some(Cue::LaunchLetter),
            &mut self.rng,
        ));
        self.next_letter += 1;
        debug!(idx, %letter, x, target_y, "letter launched");
    }

    fn random_target_y(&mut self) -> f32 {
        let bottom = self.height / 2.0;
        let top = MIN_TARGET_Y.min(bottom);
        top + self.rng.f32() * (bottom - top)
    }

    fn launch_burst(&mut self) {
        let size = self.rng.usize(MIN_BURST_SIZE..=MAX_BURST_SIZE);
        for _ in 0..size {
            let x = self.rng.f32() * self.width;
            let y = self.rng.f32() * self.height;
            let (fw, d) = Firework::burst(x, y, &mut self.rng);
            self.fireworks.push(fw);
            self.events.push(ShowEvent::Explosion { x: d.x, y: d.y });
        }
        self.events.push(ShowEvent::Burst { size });

        let delay = MIN_BURST_DELAY + self.rng.f32() * (MAX_BURST_DELAY - MIN_BURST_DELAY);
        self.schedule.after(delay, Cue::Burst);
        debug!(size, next_in = delay, "burst launched");
    }

    fn detonated<S: PresentationSink>(&mut self, d: Detonation, sink: &mut S) {
        self.events.push(ShowEvent::Explosion { x: d.x, y: d.y });

        if let Some(letter) = d.letter {
            let id = self.markers_placed;
            self.markers_placed += 1;
            sink.create_marker(id, d.x, d.y, letter);
            sink.animate_marker(id, Appearance::HIDDEN, 0.0, 0.0);
            sink.animate_marker(id, Appearance::SHOWN, ENTRANCE_DURATION, ENTRANCE_DELAY);

            if self.markers_placed == self.letters.len() && !self.sequence_complete {
                self.sequence_complete = true;
                self.events.push(ShowEvent::SequenceComplete);
                info!("sequence complete");
                self.gather(sink);
            }
        }

        if let Some(cue) = d.follow_up {
            self.schedule.after(FOLLOW_UP_DELAY, cue);
        }
    }

    fn gather<S: PresentationSink>(&mut self, sink: &mut S) {
        self.phase = Phase::Gathering;
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        let total = self.markers_placed as f32 * GATHER_SPACING;

        self.resting.clear();
        for id in 0..self.markers_placed {
            let x = cx - total / 2.0 + id as f32 * GATHER_SPACING;
            sink.move_marker(id, x, cy, GATHER_DURATION);
            self.resting.push((x, cy));
        }
        self.schedule.after(FINALE_DELAY, Cue::StartFinale);
    }

    fn float_balloons<S: PresentationSink>(&mut self, dt: f32, sink: &mut S) {
        self.balloons.retain_mut(|balloon| {
            balloon.clock += dt;
            let mut moved = false;
            while balloon.clock >= BALLOON_STEP && balloon.opacity > 0.0 {
                balloon.clock -= BALLOON_STEP;
                balloon.step();
                moved = true;
            }

            if balloon.opacity <= 0.0 {
                sink.remove_marker(balloon.id);
                debug!(id = balloon.id, "balloon gone");
                return false;
            }
            if moved {
                sink.move_marker(balloon.id, balloon.x, balloon.y, 0.0);
                sink.animate_marker(
                    balloon.id,
                    Appearance {
                        opacity: balloon.opacity,
                        scale: 1.0,
                    },
                    0.0,
                    0.0,
                );
            }
            true
        });
    }
}

/// Evenly spaced x positions between the margins. A lone letter is centred.
fn letter_columns(count: usize, width: f32) -> Vec<f32> {
    if count == 1 {
        return vec![width / 2.0];
    }
    let margin = LETTER_MARGIN.min(width / 4.0);
    let spacing = (width - margin * 2.0) / (count.max(2) - 1) as f32;
    (0..count).map(|i| margin + i as f32 * spacing).collect()
}
