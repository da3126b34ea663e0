use std::io::{self, Write};

use crossterm::event::{Event, MouseEventKind};
use fastrand::Rng;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::chime::Chime;
use crate::config::ShowConfig;
use crate::effect::Effect;
use crate::error::ShowResult;
use crate::markers::MarkerBoard;
use crate::sim::{Choreographer, ShowEvent};

/// Alpha of the background wash painted over the canvas every tick.
const FADE_ALPHA: f32 = 0.25;

pub struct FireworkShow {
    canvas: Canvas,
    choreographer: Choreographer,
    markers: MarkerBoard,
    chime: Chime,
}

impl FireworkShow {
    pub fn new(cols: usize, rows: usize, config: &ShowConfig) -> ShowResult<Self> {
        let canvas = Canvas::new(cols, rows, config.scale, config.bg_color)?;
        let rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        info!(
            cols,
            rows,
            width = canvas.width(),
            height = canvas.height(),
            "canvas ready"
        );

        let mut choreographer =
            Choreographer::new(config.letters.clone(), canvas.width(), canvas.height(), rng);
        choreographer.start();

        Ok(Self {
            canvas,
            choreographer,
            markers: MarkerBoard::new(),
            chime: Chime::new(config.bell),
        })
    }

    pub fn choreographer(&self) -> &Choreographer {
        &self.choreographer
    }

    pub fn markers(&self) -> &MarkerBoard {
        &self.markers
    }
}

impl Effect for FireworkShow {
    fn update(&mut self, dt: f32) {
        self.canvas.fade(FADE_ALPHA);
        self.choreographer.tick(dt, &mut self.canvas, &mut self.markers);
        self.markers.tick(dt);

        for event in self.choreographer.drain_events() {
            match event {
                ShowEvent::Explosion { .. } => self.chime.on_explosion(),
                ShowEvent::Burst { size } => debug!(size, "burst"),
                ShowEvent::SequenceComplete => info!("message spelled, gathering letters"),
            }
        }
    }

    fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let glyphs = self.markers.glyphs(&self.canvas);
        self.canvas.render(&glyphs, out)?;
        self.chime.ring(out);
        out.flush()
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(_) => self.chime.unlock(),
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                self.chime.unlock()
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Phase;

    const DT: f32 = 1.0 / 60.0;

    fn config(message: &str) -> ShowConfig {
        ShowConfig {
            letters: crate::config::spelled_letters(message),
            seed: Some(42),
            ..ShowConfig::default()
        }
    }

    #[test]
    fn show_starts_spelling_right_away() {
        let show = FireworkShow::new(100, 30, &config("HI")).unwrap();
        assert_eq!(show.choreographer().letters_launched(), 1);
        assert_eq!(show.choreographer().phase(), Phase::Spelling);
        assert!(show.markers().is_empty());
    }

    #[test]
    fn tiny_terminal_is_an_error() {
        assert!(FireworkShow::new(0, 0, &config("HI")).is_err());
    }

    #[test]
    fn whole_show_runs_to_the_finale() {
        let mut show = FireworkShow::new(100, 30, &config("HI")).unwrap();
        let mut out = Vec::new();
        for frame in 0..60 * 12 {
            show.update(DT);
            if frame % 30 == 0 {
                out.clear();
                show.render(&mut out).unwrap();
                assert!(!out.is_empty());
            }
        }
        assert!(show.choreographer().is_sequence_complete());
        assert_eq!(show.choreographer().phase(), Phase::Finale);
        // Both letters have floated off by now
        assert!(show.markers().is_empty());
    }

    #[test]
    fn letters_show_up_as_glyphs() {
        let mut show = FireworkShow::new(100, 30, &config("HI")).unwrap();
        while !show.choreographer().is_sequence_complete() {
            show.update(DT);
        }
        for _ in 0..60 {
            show.update(DT);
        }
        let mut out = Vec::new();
        show.render(&mut out).unwrap();
        let frame = String::from_utf8(out).unwrap();
        assert!(frame.contains("\x1b[1mH"));
        assert!(frame.contains("\x1b[1mI"));
    }
}
