/// Opacity lost per tick.
pub const FADE_PER_TICK: f32 = 0.015;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32, // units per tick
    pub vy: f32,
    pub alpha: f32, // spent once <= 0
}

impl Particle {
    /// A fresh spark at (x, y) heading along `angle` at `speed` units per tick.
    pub fn new(x: f32, y: f32, angle: f32, speed: f32) -> Self {
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            alpha: 1.0,
        }
    }

    pub fn advance(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= FADE_PER_TICK;
    }

    pub fn is_spent(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_by_velocity_and_fades() {
        let mut p = Particle {
            x: 1.0,
            y: 2.0,
            vx: 0.5,
            vy: -1.5,
            alpha: 1.0,
        };
        p.advance();
        assert_eq!((p.x, p.y), (1.5, 0.5));
        assert!((p.alpha - 0.985).abs() < 1e-6);
    }

    #[test]
    fn alpha_never_increases() {
        let mut p = Particle::new(0.0, 0.0, 1.0, 2.0);
        let mut last = p.alpha;
        for _ in 0..100 {
            p.advance();
            assert!(p.alpha < last);
            last = p.alpha;
        }
    }

    #[test]
    fn spent_on_the_sixty_seventh_tick() {
        let mut p = Particle::new(0.0, 0.0, 0.0, 1.0);
        for _ in 0..66 {
            p.advance();
        }
        assert!(!p.is_spent());
        p.advance();
        assert!(p.is_spent());
    }

    #[test]
    fn new_keeps_requested_speed() {
        let p = Particle::new(0.0, 0.0, 2.3, 3.5);
        assert!((p.speed() - 3.5).abs() < 1e-4);
        assert_eq!(p.alpha, 1.0);
    }
}
