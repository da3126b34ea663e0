use std::collections::BTreeMap;

use tracing::trace;

use crate::canvas::{Canvas, Glyph, Rgb};

pub type MarkerId = usize;

/// How visible a marker is and how large it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub opacity: f32,
    pub scale: f32, // 1.0 is full size
}

impl Appearance {
    /// Where a letter starts before its entrance.
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        scale: 0.5,
    };
    pub const SHOWN: Self = Self {
        opacity: 1.0,
        scale: 1.0,
    };
}

/// Display side of the show. The simulation only describes what should
/// happen to each letter; how it looks is up to the implementation.
///
/// Durations and delays are in seconds. A zero duration applies at once.
pub trait PresentationSink {
    fn create_marker(&mut self, id: MarkerId, x: f32, y: f32, text: char);
    fn animate_marker(&mut self, id: MarkerId, to: Appearance, duration: f32, delay: f32);
    fn move_marker(&mut self, id: MarkerId, x: f32, y: f32, duration: f32);
    fn attach_balloon(&mut self, id: MarkerId);
    fn remove_marker(&mut self, id: MarkerId);
}

trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for (f32, f32) {
    fn lerp(self, to: Self, t: f32) -> Self {
        (self.0 + (to.0 - self.0) * t, self.1 + (to.1 - self.1) * t)
    }
}

impl Lerp for Appearance {
    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            opacity: self.opacity + (to.opacity - self.opacity) * t,
            scale: self.scale + (to.scale - self.scale) * t,
        }
    }
}

/// Eased transition between two values, like a CSS `ease-out` transition.
#[derive(Debug, Clone, Copy)]
struct Tween<T> {
    from: T,
    to: T,
    delay: f32, // seconds before motion starts
    duration: f32,
    elapsed: f32, // includes the delay
}

impl<T: Lerp> Tween<T> {
    fn still(value: T) -> Self {
        Self {
            from: value,
            to: value,
            delay: 0.0,
            duration: 0.0,
            elapsed: 0.0,
        }
    }

    fn value(&self) -> T {
        let t = self.elapsed - self.delay;
        if t < 0.0 {
            return self.from;
        }
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (t / self.duration).min(1.0);
        self.from.lerp(self.to, 1.0 - (1.0 - t) * (1.0 - t))
    }

    /// Starts a new transition from wherever the current one has got to.
    fn retarget(&mut self, to: T, duration: f32, delay: f32) {
        self.from = self.value();
        self.to = to;
        self.duration = duration.max(0.0);
        self.delay = delay.max(0.0);
        self.elapsed = 0.0;
    }

    fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

const LETTER_COLOR: Rgb = (255, 245, 225);

const BALLOON_COLORS: [Rgb; 5] = [
    (235, 60, 80),
    (255, 170, 40),
    (70, 160, 255),
    (120, 220, 110),
    (200, 110, 255),
];

struct Marker {
    text: char,
    pos: Tween<(f32, f32)>,
    look: Tween<Appearance>,
    balloon: Option<Rgb>,
}

/// Terminal implementation of [`PresentationSink`]: keeps every letter
/// marker and runs its transitions, then hands back glyphs to draw.
pub struct MarkerBoard {
    markers: BTreeMap<MarkerId, Marker>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self {
            markers: BTreeMap::new(),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for marker in self.markers.values_mut() {
            marker.pos.advance(dt);
            marker.look.advance(dt);
        }
    }

    pub fn glyphs(&self, canvas: &Canvas) -> Vec<Glyph> {
        let mut glyphs = Vec::with_capacity(self.markers.len() * 2);
        for marker in self.markers.values() {
            let (x, y) = marker.pos.value();
            let Some((col, row)) = canvas.cell_at(x, y) else {
                continue;
            };
            let look = marker.look.value();

            // Too small to read yet
            let ch = if look.scale < 0.75 { '·' } else { marker.text };
            glyphs.push(Glyph { col, row, ch, color: LETTER_COLOR, opacity: look.opacity });

            if let (Some(color), Some(above)) = (marker.balloon, row.checked_sub(1)) {
                glyphs.push(Glyph { col, row: above, ch: '●', color, opacity: look.opacity });
            }
        }
        glyphs
    }

    pub fn position(&self, id: MarkerId) -> Option<(f32, f32)> {
        self.markers.get(&id).map(|m| m.pos.value())
    }

    pub fn appearance(&self, id: MarkerId) -> Option<Appearance> {
        self.markers.get(&id).map(|m| m.look.value())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Default for MarkerBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for MarkerBoard {
    fn create_marker(&mut self, id: MarkerId, x: f32, y: f32, text: char) {
        trace!(id, x, y, %text, "marker created");
        self.markers.insert(
            id,
            Marker {
                text,
                pos: Tween::still((x, y)),
                look: Tween::still(Appearance::HIDDEN),
                balloon: None,
            },
        );
    }

    fn animate_marker(&mut self, id: MarkerId, to: Appearance, duration: f32, delay: f32) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.look.retarget(to, duration, delay);
        }
    }

    fn move_marker(&mut self, id: MarkerId, x: f32, y: f32, duration: f32) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.pos.retarget((x, y), duration, 0.0);
        }
    }

    fn attach_balloon(&mut self, id: MarkerId) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.balloon = Some(BALLOON_COLORS[id % BALLOON_COLORS.len()]);
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_some() {
            trace!(id, "marker removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn new_markers_start_hidden_where_created() {
        let mut board = MarkerBoard::new();
        board.create_marker(0, 10.0, 20.0, 'H');
        assert_eq!(board.position(0), Some((10.0, 20.0)));
        assert_eq!(board.appearance(0), Some(Appearance::HIDDEN));
    }

    #[test]
    fn entrance_waits_for_delay_then_eases_in() {
        let mut board = MarkerBoard::new();
        board.create_marker(0, 0.0, 0.0, 'H');
        board.animate_marker(0, Appearance::SHOWN, 0.6, 0.05);

        board.tick(0.04);
        assert_eq!(board.appearance(0), Some(Appearance::HIDDEN));

        board.tick(0.31);
        let mid = board.appearance(0).unwrap();
        assert!(mid.opacity > 0.5 && mid.opacity < 1.0, "{mid:?}");
        assert!(mid.scale > 0.75 && mid.scale < 1.0, "{mid:?}");

        board.tick(0.5);
        assert_eq!(board.appearance(0), Some(Appearance::SHOWN));
    }

    #[test]
    fn move_with_zero_duration_is_immediate() {
        let mut board = MarkerBoard::new();
        board.create_marker(3, 0.0, 0.0, 'A');
        board.move_marker(3, 5.0, -7.0, 0.0);
        assert_eq!(board.position(3), Some((5.0, -7.0)));
    }

    #[test]
    fn retarget_mid_flight_starts_from_current_position() {
        let mut board = MarkerBoard::new();
        board.create_marker(0, 0.0, 0.0, 'A');
        board.move_marker(0, 100.0, 0.0, 1.0);
        board.tick(0.5);
        let halfway = board.position(0).unwrap();
        assert!(halfway.0 > 50.0 && halfway.0 < 100.0);

        board.move_marker(0, 0.0, 0.0, 1.0);
        assert!(close(board.position(0).unwrap(), halfway));
        board.tick(1.0);
        assert!(close(board.position(0).unwrap(), (0.0, 0.0)));
    }

    #[test]
    fn unknown_markers_are_ignored() {
        let mut board = MarkerBoard::new();
        board.move_marker(9, 1.0, 1.0, 0.0);
        board.animate_marker(9, Appearance::SHOWN, 0.0, 0.0);
        board.attach_balloon(9);
        board.remove_marker(9);
        assert!(board.is_empty());
    }

    #[test]
    fn glyphs_follow_markers_and_balloons() {
        let canvas = Canvas::new(10, 5, 1.0, (0, 0, 0)).unwrap();
        let mut board = MarkerBoard::new();
        board.create_marker(0, 4.0, 6.0, 'H');
        board.animate_marker(0, Appearance::SHOWN, 0.0, 0.0);

        let glyphs = board.glyphs(&canvas);
        assert_eq!(glyphs.len(), 1);
        assert_eq!((glyphs[0].col, glyphs[0].row, glyphs[0].ch), (4, 3, 'H'));
        assert_eq!(glyphs[0].opacity, 1.0);

        board.attach_balloon(0);
        let glyphs = board.glyphs(&canvas);
        assert_eq!(glyphs.len(), 2);
        assert_eq!((glyphs[1].col, glyphs[1].row, glyphs[1].ch), (4, 2, '●'));
    }

    #[test]
    fn small_markers_draw_as_a_dot() {
        let canvas = Canvas::new(10, 5, 1.0, (0, 0, 0)).unwrap();
        let mut board = MarkerBoard::new();
        board.create_marker(0, 1.0, 1.0, 'H');
        assert_eq!(board.glyphs(&canvas)[0].ch, '·');
    }

    #[test]
    fn off_screen_markers_are_not_drawn() {
        let canvas = Canvas::new(10, 5, 1.0, (0, 0, 0)).unwrap();
        let mut board = MarkerBoard::new();
        board.create_marker(0, 4.0, -3.0, 'H');
        assert!(board.glyphs(&canvas).is_empty());
        assert_eq!(board.len(), 1);
    }
}
