//! Collision detection between the player and the world
//!
//! Screen bounds are checked first, then every pair in list order. Each
//! obstacle is split into a body and a cap (the wider strip at the end facing
//! the gap). Bodies are tested before caps so the result is stable even when
//! the player overlaps both.

use serde::{Deserialize, Serialize};

use super::obstacles::{Obstacle, ObstaclePair, Side};
use super::rect::Rect;
use crate::config::ObstacleConfig;

/// Classified collision, exactly one per query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionResult {
    #[default]
    None,
    Ground,
    Ceiling,
    ObstacleBody(Side),
    ObstacleCap(Side),
}

impl CollisionResult {
    pub fn is_hit(&self) -> bool {
        !matches!(self, CollisionResult::None)
    }
}

/// Cap strip dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapShape {
    pub thickness: f32,
    /// Extra width on each side of the body
    pub overhang: f32,
}

impl From<&ObstacleConfig> for CapShape {
    fn from(config: &ObstacleConfig) -> Self {
        Self {
            thickness: config.cap_thickness,
            overhang: config.cap_overhang,
        }
    }
}

/// Split an obstacle into `(body, cap)`.
///
/// The cap sits at the opening-facing end: the bottom edge of a top obstacle,
/// the top edge of a bottom obstacle. A cap never extends past the obstacle's
/// own height.
pub fn body_and_cap(obstacle: &Obstacle, side: Side, cap: &CapShape) -> (Rect, Rect) {
    let Obstacle { pos, width, height } = *obstacle;
    let t = cap.thickness.clamp(0.0, height);
    let cap_x = pos.x - cap.overhang;
    let cap_w = width + cap.overhang * 2.0;
    match side {
        Side::Top => (
            Rect::new(pos.x, pos.y, width, height - t),
            Rect::new(cap_x, pos.y + height - t, cap_w, t),
        ),
        Side::Bottom => (
            Rect::new(pos.x, pos.y + t, width, height - t),
            Rect::new(cap_x, pos.y, cap_w, t),
        ),
    }
}

fn hits(player: &Rect, part: &Rect) -> bool {
    !part.is_empty() && player.intersects(part)
}

/// Check the player's bounding rectangle against screen bounds and obstacles.
///
/// Pure: repeated calls with the same input give the same answer.
pub fn detect(
    player: &Rect,
    pairs: &[ObstaclePair],
    ground_y: f32,
    ceiling_y: f32,
    cap: &CapShape,
) -> CollisionResult {
    if player.bottom() >= ground_y {
        return CollisionResult::Ground;
    }
    if player.top() <= ceiling_y {
        return CollisionResult::Ceiling;
    }

    for pair in pairs {
        let parts = [Side::Bottom, Side::Top].map(|side| (side, body_and_cap(pair.member(side), side, cap)));

        for (side, (body, _)) in &parts {
            if hits(player, body) {
                return CollisionResult::ObstacleBody(*side);
            }
        }
        for (side, (_, cap_rect)) in &parts {
            if hits(player, cap_rect) {
                return CollisionResult::ObstacleCap(*side);
            }
        }
    }

    CollisionResult::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const CAP: CapShape = CapShape {
        thickness: 24.0,
        overhang: 12.0,
    };

    /// Gap from y=250 to y=450 at x in [200, 280]
    fn pair() -> ObstaclePair {
        ObstaclePair::new(1, 200.0, 80.0, 200.0, 350.0, 0.0, 700.0)
    }

    fn player_at(x: f32, y: f32) -> Rect {
        Rect::around(Vec2::new(x, y), 20.0)
    }

    #[test]
    fn test_no_collision_in_gap() {
        let result = detect(&player_at(240.0, 350.0), &[pair()], 700.0, 0.0, &CAP);
        assert_eq!(result, CollisionResult::None);
        assert!(!result.is_hit());
    }

    #[test]
    fn test_inside_bottom_body() {
        // Fully inside the bottom body, well above the ground line
        let player = Rect::new(220.0, 550.0, 40.0, 40.0);
        assert_eq!(
            detect(&player, &[pair()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleBody(Side::Bottom)
        );
    }

    #[test]
    fn test_top_body() {
        let player = player_at(240.0, 100.0);
        assert_eq!(
            detect(&player, &[pair()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleBody(Side::Top)
        );
    }

    #[test]
    fn test_cap_overhang() {
        // Just left of the body but inside the cap overhang of the bottom obstacle
        let player = Rect::new(150.0, 455.0, 45.0, 10.0);
        assert_eq!(
            detect(&player, &[pair()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleCap(Side::Bottom)
        );

        let player = Rect::new(150.0, 235.0, 45.0, 10.0);
        assert_eq!(
            detect(&player, &[pair()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleCap(Side::Top)
        );
    }

    #[test]
    fn test_body_beats_cap() {
        // Straddles the bottom cap and the body beneath it
        let player = Rect::new(230.0, 460.0, 20.0, 30.0);
        assert_eq!(
            detect(&player, &[pair()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleBody(Side::Bottom)
        );
    }

    #[test]
    fn test_ground_takes_priority() {
        // Overlaps the bottom obstacle and the ground at once
        let player = Rect::new(220.0, 670.0, 40.0, 40.0);
        assert_eq!(detect(&player, &[pair()], 700.0, 0.0, &CAP), CollisionResult::Ground);
    }

    #[test]
    fn test_ceiling() {
        let player = Rect::new(50.0, 0.0, 40.0, 40.0);
        assert_eq!(detect(&player, &[], 700.0, 0.0, &CAP), CollisionResult::Ceiling);
    }

    #[test]
    fn test_first_pair_in_order_wins() {
        let a = ObstaclePair::new(1, 200.0, 80.0, 200.0, 500.0, 0.0, 700.0);
        let b = ObstaclePair::new(2, 200.0, 80.0, 200.0, 150.0, 0.0, 700.0);
        let player = player_at(240.0, 300.0);
        // Inside a's top body and b's bottom body
        assert_eq!(
            detect(&player, &[a.clone(), b.clone()], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleBody(Side::Top)
        );
        assert_eq!(
            detect(&player, &[b, a], 700.0, 0.0, &CAP),
            CollisionResult::ObstacleBody(Side::Bottom)
        );
    }

    #[test]
    fn test_detect_is_repeatable() {
        let pairs = [pair()];
        let player = Rect::new(150.0, 455.0, 55.0, 10.0);
        let first = detect(&player, &pairs, 700.0, 0.0, &CAP);
        for _ in 0..10 {
            assert_eq!(detect(&player, &pairs, 700.0, 0.0, &CAP), first);
        }
    }

    #[test]
    fn test_body_and_cap_split() {
        let p = pair();
        let (body, cap) = body_and_cap(&p.top, Side::Top, &CAP);
        assert_eq!(body, Rect::new(200.0, 0.0, 80.0, 226.0));
        assert_eq!(cap, Rect::new(188.0, 226.0, 104.0, 24.0));

        let (body, cap) = body_and_cap(&p.bottom, Side::Bottom, &CAP);
        assert_eq!(cap, Rect::new(188.0, 450.0, 104.0, 24.0));
        assert_eq!(body, Rect::new(200.0, 474.0, 80.0, 226.0));
    }

    #[test]
    fn test_short_obstacle_is_all_cap() {
        let short = Obstacle {
            pos: Vec2::new(0.0, 0.0),
            width: 80.0,
            height: 10.0,
        };
        let (body, cap) = body_and_cap(&short, Side::Top, &CAP);
        assert!(body.is_empty());
        assert_eq!(cap.height, 10.0);
    }
}
