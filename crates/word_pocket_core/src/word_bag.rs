//! crates/word_pocket_core/src/word_bag.rs
//!
//! The floating word-bag simulation. Coordinates are percentages of a square
//! viewport, and particles are kept inside a circle around its centre.

use rand::Rng;
use uuid::Uuid;

use crate::domain::Word;

pub const CENTER: f64 = 50.0;
pub const MAX_RADIUS: f64 = 42.0;
/// Only the most recent words float; the rest are summarised as a count.
pub const DISPLAY_LIMIT: usize = 20;
pub const HOVER_SPEED_FACTOR: f64 = 0.2;
pub const BOUNCE_DAMPING: f64 = 0.8;
pub const BOUNCE_JITTER: f64 = 0.05;
pub const INITIAL_SPREAD: f64 = 40.0;
pub const INITIAL_SPEED: f64 = 0.15;
/// Distance from a particle centre that still counts as a click on its chip.
pub const PICK_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub word_id: Uuid,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub scale: f64,
}

impl Particle {
    pub fn distance_from_center(&self) -> f64 {
        (self.x - CENTER).hypot(self.y - CENTER)
    }
}

/// Uniform sample in `[-0.5, 0.5) * width`.
fn spread<R: Rng + ?Sized>(rng: &mut R, width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * width
}

#[derive(Debug, Clone, Default)]
pub struct WordBag {
    particles: Vec<Particle>,
    hovering: bool,
    overflow: usize,
}

impl WordBag {
    /// Seeds one particle per word near the centre. `words` is expected
    /// newest first, as returned by storage.
    pub fn new<R: Rng + ?Sized>(words: &[Word], rng: &mut R) -> Self {
        let particles = words
            .iter()
            .take(DISPLAY_LIMIT)
            .map(|word| Particle {
                word_id: word.id,
                label: word.word.clone(),
                x: CENTER + spread(rng, INITIAL_SPREAD),
                y: CENTER + spread(rng, INITIAL_SPREAD),
                vx: spread(rng, INITIAL_SPEED),
                vy: spread(rng, INITIAL_SPEED),
                scale: 0.8 + rng.gen::<f64>() * 0.4,
            })
            .collect();

        Self {
            particles,
            hovering: false,
            overflow: words.len().saturating_sub(DISPLAY_LIMIT),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of words not shown as particles.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Global slow-motion toggle; applies to every particle.
    pub fn set_hovering(&mut self, hovering: bool) {
        self.hovering = hovering;
    }

    /// Advances the simulation by one frame.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let speed = if self.hovering { HOVER_SPEED_FACTOR } else { 1.0 };

        for p in &mut self.particles {
            p.x += p.vx * speed;
            p.y += p.vy * speed;

            let dx = p.x - CENTER;
            let dy = p.y - CENTER;
            if dx.hypot(dy) > MAX_RADIUS {
                let angle = dy.atan2(dx);
                p.x = CENTER + angle.cos() * MAX_RADIUS;
                p.y = CENTER + angle.sin() * MAX_RADIUS;

                p.vx = -p.vx * BOUNCE_DAMPING + spread(rng, BOUNCE_JITTER);
                p.vy = -p.vy * BOUNCE_DAMPING + spread(rng, BOUNCE_JITTER);
            }
        }
    }

    /// The word under the pointer, if any. Nearest chip wins.
    pub fn pick(&self, x: f64, y: f64) -> Option<Uuid> {
        self.particles
            .iter()
            .map(|p| (p, (p.x - x).hypot(p.y - y)))
            .filter(|(_, d)| *d <= PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p.word_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(count: usize) -> Vec<Word> {
        let now = Utc::now();
        (0..count)
            .map(|i| Word {
                id: Uuid::new_v4(),
                user_id: "u".to_string(),
                word: format!("word{i}"),
                language: "English".to_string(),
                translation: None,
                example_sentence: None,
                created_at: now - Duration::seconds(i as i64),
            })
            .collect()
    }

    #[test]
    fn display_is_capped_at_twenty() {
        let mut rng = StdRng::seed_from_u64(7);
        let bag = WordBag::new(&words(25), &mut rng);
        assert_eq!(bag.particles().len(), DISPLAY_LIMIT);
        assert_eq!(bag.overflow(), 5);
        assert_eq!(bag.particles()[0].label, "word0");
    }

    #[test]
    fn particles_start_near_center() {
        let mut rng = StdRng::seed_from_u64(1);
        let bag = WordBag::new(&words(20), &mut rng);
        for p in bag.particles() {
            assert!((p.x - CENTER).abs() <= INITIAL_SPREAD / 2.0);
            assert!((p.y - CENTER).abs() <= INITIAL_SPREAD / 2.0);
            assert!((0.8..=1.2).contains(&p.scale));
        }
    }

    #[test]
    fn particles_never_leave_the_circle() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut bag = WordBag::new(&words(20), &mut rng);
        // Push everything hard so the boundary is hit often.
        for p in &mut bag.particles {
            p.vx *= 40.0;
            p.vy *= 40.0;
        }
        for frame in 0..5_000 {
            bag.set_hovering(frame % 700 < 100);
            bag.step(&mut rng);
            for p in bag.particles() {
                assert!(p.distance_from_center() <= MAX_RADIUS + 1e-9);
            }
        }
    }

    #[test]
    fn hovering_slows_movement() {
        let mut rng = StdRng::seed_from_u64(3);
        let bag = WordBag::new(&words(1), &mut rng);

        let mut normal = bag.clone();
        normal.step(&mut rng);
        let mut slow = bag.clone();
        slow.set_hovering(true);
        slow.step(&mut rng);

        let start = &bag.particles()[0];
        let moved = |p: &Particle| (p.x - start.x).hypot(p.y - start.y);
        let fast_dist = moved(&normal.particles()[0]);
        let slow_dist = moved(&slow.particles()[0]);
        assert!((slow_dist - fast_dist * HOVER_SPEED_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn bounce_reflects_velocity() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut bag = WordBag::new(&words(1), &mut rng);
        {
            let p = &mut bag.particles[0];
            p.x = CENTER + MAX_RADIUS - 0.1;
            p.y = CENTER;
            p.vx = 1.0;
            p.vy = 0.0;
        }
        bag.step(&mut rng);
        let p = &bag.particles()[0];
        assert!((p.distance_from_center() - MAX_RADIUS).abs() < 1e-9);
        assert!(p.vx < 0.0);
        assert!((p.vx + BOUNCE_DAMPING).abs() <= BOUNCE_JITTER / 2.0);
    }

    #[test]
    fn pick_returns_nearest_chip() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut bag = WordBag::new(&words(2), &mut rng);
        bag.particles[0].x = 30.0;
        bag.particles[0].y = 30.0;
        bag.particles[1].x = 34.0;
        bag.particles[1].y = 30.0;

        assert_eq!(bag.pick(33.0, 30.0), Some(bag.particles[1].word_id));
        assert_eq!(bag.pick(80.0, 80.0), None);
    }
}
