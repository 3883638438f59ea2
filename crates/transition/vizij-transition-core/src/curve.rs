//! Easing curves for tween transitions.
//! - named built-ins (linear, easeIn, easeOut, easeInOut, easeOutBounce, constant)
//! - CSS-style cubic bezier (x1, y1, x2, y2)
//! - caller supplied closures
//!
//! A curve name is also how a transition selects a registered engine; names the registry
//! does not know are evaluated here by the tween engine.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Caller supplied easing function over normalized time `[0, 1]`.
pub type CurveFn = Rc<dyn Fn(f64) -> f64>;

/// Curve identifier carried by a transition spec.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Curve {
    /// Built-in easing name or registered engine name.
    Named(String),
    /// Control points (x1, y1, x2, y2).
    CubicBezier([f64; 4]),
    #[serde(skip)]
    Custom(CurveFn),
}

impl Curve {
    pub fn named(name: impl Into<String>) -> Self {
        Curve::Named(name.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Curve::Custom(Rc::new(f))
    }

    /// Name used for registry lookup, if this curve is named.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match self {
            Curve::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Resolve to an evaluable easing, falling back to `default_name` (then linear) for
    /// names that are not built in.
    pub fn easing(&self, default_name: &str) -> Easing {
        match self {
            Curve::Named(name) => match builtin(name) {
                Some(f) => Easing::Builtin(f),
                None => {
                    log::trace!("curve '{name}' is not built in; using '{default_name}'");
                    Easing::Builtin(builtin(default_name).unwrap_or(linear))
                }
            },
            Curve::CubicBezier(ctrl) => Easing::Bezier(*ctrl),
            Curve::Custom(f) => Easing::Custom(f.clone()),
        }
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Curve::Named(name) => write!(f, "Named({name:?})"),
            Curve::CubicBezier(c) => write!(f, "CubicBezier({}, {}, {}, {})", c[0], c[1], c[2], c[3]),
            Curve::Custom(_) => write!(f, "Custom"),
        }
    }
}

impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Curve::Named(a), Curve::Named(b)) => a == b,
            (Curve::CubicBezier(a), Curve::CubicBezier(b)) => a == b,
            (Curve::Custom(a), Curve::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Curve {
    fn from(name: &str) -> Self {
        Curve::Named(name.to_string())
    }
}

/// A resolved easing function.
#[derive(Clone)]
pub enum Easing {
    Builtin(fn(f64) -> f64),
    Bezier([f64; 4]),
    Custom(CurveFn),
}

impl Easing {
    /// Eased progress for normalized time `t` (clamped to `[0, 1]`).
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Builtin(f) => f(t),
            Easing::Bezier(c) => bezier_ease_t(t, c[0], c[1], c[2], c[3]),
            Easing::Custom(f) => f(t),
        }
    }

    /// d(eased)/dt, estimated by a central difference kept inside `[0, 1]`.
    pub fn slope(&self, t: f64) -> f64 {
        const H: f64 = 1e-4;
        let lo = (t - H).max(0.0);
        let hi = (t + H).min(1.0);
        if hi <= lo {
            return 0.0;
        }
        (self.eval(hi) - self.eval(lo)) / (hi - lo)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Builtin(_) => write!(f, "Builtin"),
            Easing::Bezier(c) => write!(f, "Bezier({c:?})"),
            Easing::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Look up a built-in easing by name.
pub fn builtin(name: &str) -> Option<fn(f64) -> f64> {
    let f: fn(f64) -> f64 = match name {
        "linear" => linear,
        "easeIn" => ease_in,
        "easeOut" => ease_out,
        "easeInOut" => ease_in_out,
        "easeOutBounce" => ease_out_bounce,
        "snap" => snap,
        "constant" => constant,
        _ => return None,
    };
    Some(f)
}

pub const BUILTIN_NAMES: &[&str] = &[
    "linear",
    "easeIn",
    "easeOut",
    "easeInOut",
    "easeOutBounce",
    "snap",
    "constant",
];

fn linear(t: f64) -> f64 {
    t
}

/// Holds the start value, then lands on the target at the end.
fn snap(t: f64) -> f64 {
    if t < 1.0 {
        0.0
    } else {
        1.0
    }
}

fn ease_in(t: f64) -> f64 {
    t * t
}

fn ease_out(t: f64) -> f64 {
    t * (2.0 - t)
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

fn ease_out_bounce(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// No movement at all; used by delays.
fn constant(_t: f64) -> f64 {
    0.0
}

#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier by binary search, then evaluate y.
fn bezier_ease_t(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..40 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-9 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
