//! Background decoration
//!
//! Soft colored blobs drifting behind the panel content. Positions live in
//! panel-local coordinates and bounce off the panel edges. Purely cosmetic.

use crate::domain::core::Vec2;
use crate::ui::theme::{self, Rgba};

/// Inset used when a blob is pushed back inside the bounds
const EDGE_INSET: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgba,
    pub radius: f32,
}

impl Blob {
    pub fn new(pos: Vec2, vel: Vec2, color: Rgba, radius: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            radius,
        }
    }

    /// Advances the blob and reflects its velocity at the edges of `bounds`
    ///
    /// The velocity component flips whenever the blob is outside an edge,
    /// then the position is clamped back inside with a small inset.
    pub fn step(&mut self, dt: f32, bounds: Vec2) {
        self.pos = self.pos.add(self.vel.scale(dt));

        if self.pos.x < 0.0 || self.pos.x > bounds.x {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < 0.0 || self.pos.y > bounds.y {
            self.vel.y = -self.vel.y;
        }

        if self.pos.x < 0.0 {
            self.pos.x = EDGE_INSET;
        }
        if self.pos.x > bounds.x {
            self.pos.x = bounds.x - EDGE_INSET;
        }
        if self.pos.y < 0.0 {
            self.pos.y = EDGE_INSET;
        }
        if self.pos.y > bounds.y {
            self.pos.y = bounds.y - EDGE_INSET;
        }
    }
}

/// The set of blobs animated behind the panel
#[derive(Debug, Clone, PartialEq)]
pub struct BlobField {
    blobs: Vec<Blob>,
}

impl BlobField {
    pub fn new(blobs: Vec<Blob>) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn step(&mut self, dt: f32, bounds: Vec2) {
        for blob in &mut self.blobs {
            blob.step(dt, bounds);
        }
    }
}

impl Default for BlobField {
    fn default() -> Self {
        Self::new(vec![
            Blob::new(Vec2::new(50.0, 50.0), Vec2::new(15.0, 20.0), theme::BLOB_1, 160.0),
            Blob::new(Vec2::new(300.0, 400.0), Vec2::new(-20.0, -15.0), theme::BLOB_2, 190.0),
            Blob::new(Vec2::new(200.0, 200.0), Vec2::new(-10.0, 25.0), theme::BLOB_3, 140.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(340.0, 480.0);

    #[test]
    fn blob_moves_with_velocity() {
        let mut blob = Blob::new(Vec2::new(100.0, 100.0), Vec2::new(10.0, -20.0), theme::BLOB_1, 10.0);
        blob.step(0.5, BOUNDS);
        assert_eq!(blob.pos, Vec2::new(105.0, 90.0));
        assert_eq!(blob.vel, Vec2::new(10.0, -20.0));
    }

    #[test]
    fn blob_bounces_off_right_edge() {
        let mut blob = Blob::new(Vec2::new(338.0, 100.0), Vec2::new(20.0, 0.0), theme::BLOB_1, 10.0);
        blob.step(0.5, BOUNDS);
        assert_eq!(blob.vel.x, -20.0);
        assert_eq!(blob.pos.x, 335.0);
    }

    #[test]
    fn blob_bounces_off_top_edge() {
        let mut blob = Blob::new(Vec2::new(100.0, 2.0), Vec2::new(0.0, -10.0), theme::BLOB_1, 10.0);
        blob.step(1.0, BOUNDS);
        assert_eq!(blob.vel.y, 10.0);
        assert_eq!(blob.pos.y, 5.0);
    }

    #[test]
    fn field_stays_inside_bounds_over_time() {
        let mut field = BlobField::default();
        for _ in 0..10_000 {
            field.step(1.0 / 75.0, BOUNDS);
        }
        for blob in field.blobs() {
            assert!(blob.pos.x >= 0.0 && blob.pos.x <= BOUNDS.x);
            assert!(blob.pos.y >= 0.0 && blob.pos.y <= BOUNDS.y);
        }
    }
}
