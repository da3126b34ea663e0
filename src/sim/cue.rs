/// A deferred choreography step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Send up the firework for the next unspelled letter.
    LaunchLetter,
    /// Gather has settled: start bursts and queue the fly-away.
    StartFinale,
    /// Begin releasing letters on balloons.
    FlyAway,
    /// Release one letter; the next follows on its own cue.
    ReleaseBalloon(usize),
    /// Fire a cluster of bursts and queue the next one.
    Burst,
}

/// Countdown queue of cues, advanced by the simulation tick.
///
/// Nothing is ever cancelled; a cue fires on the first tick where its
/// delay has fully elapsed, never earlier.
#[derive(Debug, Default)]
pub struct Schedule {
    pending: Vec<(f32, Cue)>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `cue` to fire once `delay` seconds have elapsed.
    pub fn after(&mut self, delay: f32, cue: Cue) {
        self.pending.push((delay.max(0.0), cue));
    }

    /// Counts every pending cue down by `dt` and returns the ones now due,
    /// earliest deadline first.
    pub fn advance(&mut self, dt: f32) -> Vec<Cue> {
        let mut due = Vec::new();
        self.pending.retain_mut(|(remaining, cue)| {
            *remaining -= dt;
            if *remaining <= 0.0 {
                due.push((*remaining, *cue));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, cue)| cue).collect()
    }

    pub fn is_pending(&self, cue: Cue) -> bool {
        self.pending.iter().any(|(_, c)| *c == cue)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
