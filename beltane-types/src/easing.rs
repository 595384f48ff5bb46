//! Easing curves for keyframe and automation segments.
//!
//! Every curve maps progress `t` in `[0, 1]` to an eased value. Named curves
//! are closed-form; [`Easing::Bezier`] inverts a cubic Bezier with a fixed
//! number of Newton-Raphson steps so evaluation cost stays constant per frame.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Newton-Raphson iterations used to invert `x(param) = t`.
const BEZIER_NEWTON_ITERATIONS: usize = 8;

/// Derivative magnitude below which the Newton step is abandoned.
const BEZIER_MIN_SLOPE: f64 = 1e-4;

/// Free control points of a cubic Bezier anchored at `(0,0)` and `(1,1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build from the `(x1, y1, x2, y2)` tuple layout used by curve editors.
    pub fn from_array(points: [f64; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    fn axis(p: f64, c1: f64, c2: f64) -> f64 {
        let inv = 1.0 - p;
        3.0 * inv * inv * p * c1 + 3.0 * inv * p * p * c2 + p * p * p
    }

    fn axis_slope(p: f64, c1: f64, c2: f64) -> f64 {
        let inv = 1.0 - p;
        3.0 * inv * inv * c1 + 6.0 * inv * p * (c2 - c1) + 3.0 * p * p * (1.0 - c2)
    }

    /// Evaluate `y` at horizontal position `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        let mut param = x;
        for _ in 0..BEZIER_NEWTON_ITERATIONS {
            let slope = Self::axis_slope(param, self.x1, self.x2);
            if slope.abs() < BEZIER_MIN_SLOPE {
                break;
            }
            let error = Self::axis(param, self.x1, self.x2) - x;
            param = (param - error / slope).clamp(0.0, 1.0);
        }
        Self::axis(param, self.y1, self.y2)
    }
}

impl Default for CubicBezier {
    /// CSS `ease`.
    fn default() -> Self {
        Self::new(0.25, 0.1, 0.25, 1.0)
    }
}

/// Easing applied to the segment that starts at a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic acceleration from zero velocity
    EaseIn,
    /// Quadratic deceleration to zero velocity
    EaseOut,
    /// Quadratic in, then quadratic out
    EaseInOut,
    /// Overshoots the target, then settles back
    EaseOutBack,
    Bounce,
    Elastic,
    /// Holds the start value until the segment ends
    Step,
    Bezier(CubicBezier),
}

impl Easing {
    /// All named curves, in display order.
    pub const NAMED: [Easing; 8] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseOutBack,
        Easing::Bounce,
        Easing::Elastic,
        Easing::Step,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
            Easing::EaseOutBack => "easeOutBack",
            Easing::Bounce => "bounce",
            Easing::Elastic => "elastic",
            Easing::Step => "step",
            Easing::Bezier(_) => "bezier",
        }
    }

    /// Look up a named curve. `bezier` needs control points, see
    /// [`Easing::from_name_with_points`].
    pub fn from_name(name: &str) -> Option<Easing> {
        Self::NAMED.iter().copied().find(|e| e.name() == name)
    }

    /// Resolve a curve name plus optional `(x1, y1, x2, y2)` control points.
    /// `bezier` without points falls back to [`CubicBezier::default`].
    pub fn from_name_with_points(name: &str, points: Option<[f64; 4]>) -> Option<Easing> {
        if name == "bezier" {
            let bezier = points.map(CubicBezier::from_array).unwrap_or_default();
            return Some(Easing::Bezier(bezier));
        }
        Self::from_name(name)
    }

    /// False for a bezier with a NaN or infinite control point.
    pub fn is_finite(&self) -> bool {
        match self {
            Easing::Bezier(b) => b.to_array().iter().all(|v| v.is_finite()),
            _ => true,
        }
    }

    /// Evaluate the eased value for progress `t`. Input is clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Easing::Bounce => bounce_out(t),
            Easing::Elastic => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Easing::Bezier(curve) => curve.evaluate(t),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}
