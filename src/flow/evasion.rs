//! Evasion geometry: pure functions of (pointer position, control position,
//! container bounds) -> new control placement. Keeping the pointer physics
//! here means every behavior is testable without a rendering surface; the
//! controller only wires these results into `FlowState`.

use rand::Rng;

use super::steps::EvasionTag;

/// Evading control footprint (px) and the safe inset inside the buttons
/// area. Random and fled positions always land fully inside the container.
pub const CONTROL_W: f64 = 100.0;
pub const CONTROL_H: f64 = 50.0;
pub const SAFE_MARGIN: f64 = 10.0;

/// Pointer proximity that trips a teleport relocation (px).
pub const TELEPORT_NEAR_RADIUS: f64 = 120.0;
/// Pointer proximity that fades out a fade-on-approach control (px).
pub const FADE_RADIUS: f64 = 300.0;
/// Pointer-on-control overlap threshold for the corner escape (px).
pub const OVERLAP_RADIUS: f64 = 50.0;

/// Probability that a geometrically valid teleport click is accepted as a
/// win instead of being converted into a relocation.
pub const TELEPORT_ACCEPT_P: f64 = 0.05;

/// Task cadences (ms).
pub const TELEPORT_HOP_MS: u32 = 1_000;
pub const WANDER_HOP_MS: u32 = 600;
pub const FLICKER_RELOCATE_MS: u32 = 250;
pub const FLICKER_VISIBLE_MS: u32 = 1_000;
pub const FLICKER_HIDDEN_MS: u32 = 2_000;

/// Render scale while shrink-and-wander is active.
pub const WANDER_SCALE: f64 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Buttons-area dimensions. Positions are top-left offsets within it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn min_x(&self) -> f64 {
        SAFE_MARGIN
    }

    pub fn min_y(&self) -> f64 {
        SAFE_MARGIN
    }

    /// Largest x that keeps the control fully inside. Degenerate containers
    /// collapse to the margin rather than inverting the range.
    pub fn max_x(&self) -> f64 {
        (self.width - CONTROL_W - SAFE_MARGIN).max(SAFE_MARGIN)
    }

    pub fn max_y(&self) -> f64 {
        (self.height - CONTROL_H - SAFE_MARGIN).max(SAFE_MARGIN)
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point {
            x: p.x.clamp(self.min_x(), self.max_x()),
            y: p.y.clamp(self.min_y(), self.max_y()),
        }
    }

    pub fn contains_pose(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Control center for a given top-left offset.
pub fn center_of(pos: Point) -> Point {
    Point {
        x: pos.x + CONTROL_W / 2.0,
        y: pos.y + CONTROL_H / 2.0,
    }
}

/// Uniform random top-left position within the safe bounds.
pub fn random_position(bounds: Bounds, rng: &mut impl Rng) -> Point {
    Point {
        x: rng.random_range(bounds.min_x()..=bounds.max_x()),
        y: rng.random_range(bounds.min_y()..=bounds.max_y()),
    }
}

/// Flee aggressiveness. Later steps get a wider detection radius and a
/// longer escape hop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FleeParams {
    pub detection_radius: f64,
    pub flee_distance: f64,
}

pub fn flee_params(step_idx: usize) -> FleeParams {
    if step_idx >= 3 {
        FleeParams { detection_radius: 250.0, flee_distance: 400.0 }
    } else {
        FleeParams { detection_radius: 150.0, flee_distance: 200.0 }
    }
}

/// Flee response to a pointer move. `None` when the pointer is outside the
/// detection radius. Inside the overlap radius the control escapes to the
/// bounds corner diagonally opposite the pointer; otherwise it moves away
/// along the pointer->center vector, clamped to the safe bounds.
pub fn flee_from(pointer: Point, pos: Point, bounds: Bounds, params: FleeParams) -> Option<Point> {
    let center = center_of(pos);
    let dist = distance(pointer, center);
    if dist >= params.detection_radius {
        return None;
    }
    if dist < OVERLAP_RADIUS {
        return Some(opposite_corner(pointer, bounds));
    }
    let angle = (center.y - pointer.y).atan2(center.x - pointer.x);
    let escaped = Point {
        x: center.x + angle.cos() * params.flee_distance - CONTROL_W / 2.0,
        y: center.y + angle.sin() * params.flee_distance - CONTROL_H / 2.0,
    };
    Some(bounds.clamp(escaped))
}

/// Safe-bounds corner diagonally opposite the pointer's half of the area.
pub fn opposite_corner(pointer: Point, bounds: Bounds) -> Point {
    Point {
        x: if pointer.x < bounds.width / 2.0 { bounds.max_x() } else { bounds.min_x() },
        y: if pointer.y < bounds.height / 2.0 { bounds.max_y() } else { bounds.min_y() },
    }
}

/// Opacity of a fade-on-approach control at the given pointer distance.
pub fn approach_opacity(dist: f64) -> f64 {
    if dist < FADE_RADIUS { 0.0 } else { 1.0 }
}

/// Whether the pointer is close enough to trip a teleport relocation.
pub fn teleport_should_relocate(dist: f64) -> bool {
    dist < TELEPORT_NEAR_RADIUS
}

/// Resolution of a pointer click that geometrically landed on the control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickVerdict {
    /// Accepted as the affirmative answer.
    Accept,
    /// Intercepted: the control relocates instead.
    Relocate,
    /// Dropped outright; the tag categorically blocks activation.
    Swallow,
}

/// Gate a landed click by the active step's evasion tag. Only `Neutral`
/// always accepts; `Teleport` accepts with probability `TELEPORT_ACCEPT_P`.
pub fn resolve_click(tag: EvasionTag, rng: &mut impl Rng) -> ClickVerdict {
    match tag {
        EvasionTag::Neutral => ClickVerdict::Accept,
        EvasionTag::Teleport => {
            if rng.random_bool(TELEPORT_ACCEPT_P) {
                ClickVerdict::Accept
            } else {
                ClickVerdict::Relocate
            }
        }
        _ => ClickVerdict::Swallow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const AREA: Bounds = Bounds { width: 460.0, height: 240.0 };

    #[test]
    fn random_positions_respect_the_safe_inset() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1_000 {
            let p = random_position(AREA, &mut rng);
            assert!(AREA.contains_pose(p), "{p:?} escaped the safe bounds");
        }
    }

    #[test]
    fn degenerate_container_collapses_to_the_margin() {
        let tiny = Bounds { width: 40.0, height: 20.0 };
        let mut rng = Pcg32::seed_from_u64(7);
        let p = random_position(tiny, &mut rng);
        assert_eq!(p, Point { x: SAFE_MARGIN, y: SAFE_MARGIN });
    }

    #[test]
    fn far_pointer_does_not_trigger_a_flee() {
        let pos = Point { x: 200.0, y: 100.0 };
        let pointer = Point { x: 10.0, y: 10.0 };
        assert_eq!(flee_from(pointer, pos, AREA, flee_params(0)), None);
    }

    #[test]
    fn overlapping_pointer_escapes_to_the_opposite_corner() {
        let pos = Point { x: 50.0, y: 40.0 };
        let pointer = center_of(pos); // dead center, distance 0
        let escaped = flee_from(pointer, pos, AREA, flee_params(4)).unwrap();
        assert_eq!(escaped, Point { x: AREA.max_x(), y: AREA.max_y() });
    }

    #[test]
    fn later_steps_flee_harder() {
        let early = flee_params(0);
        let late = flee_params(4);
        assert!(late.detection_radius > early.detection_radius);
        assert!(late.flee_distance > early.flee_distance);
    }
}
