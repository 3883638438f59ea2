//! Duration-based tween: `start + (end - start) * ease(t)`.

use crate::config::Config;
use crate::curve::{Curve, Easing};
use crate::spec::TransitionSpec;

use super::Interpolator;

#[derive(Debug)]
pub struct TweenEngine {
    default_curve: String,
    start: Vec<f64>,
    end: Vec<f64>,
    value: Vec<f64>,
    velocity: Vec<f64>,
    start_time: f64,
    duration: f64,
    easing: Easing,
    active: bool,
}

impl TweenEngine {
    pub fn new(cfg: &Config) -> Self {
        let default_curve = cfg.default_curve.clone();
        let easing = Curve::named(default_curve.as_str()).easing(&default_curve);
        Self {
            default_curve,
            start: Vec::new(),
            end: Vec::new(),
            value: Vec::new(),
            velocity: Vec::new(),
            start_time: 0.0,
            duration: 0.0,
            easing,
            active: false,
        }
    }
}

impl Interpolator for TweenEngine {
    fn reset(&mut self, value: &[f64], velocity: Option<&[f64]>) {
        self.start = value.to_vec();
        self.end = value.to_vec();
        self.value = value.to_vec();
        self.velocity = match velocity {
            Some(v) => v.to_vec(),
            None => vec![0.0; value.len()],
        };
        self.active = false;
    }

    fn set(&mut self, target: &[f64], spec: &TransitionSpec, now: f64) {
        self.start = self.value.clone();
        self.start.resize(target.len(), 0.0);
        self.end = target.to_vec();
        self.start_time = now;
        self.duration = spec.duration.max(0.0);
        self.easing = match &spec.curve {
            Some(curve) => curve.easing(&self.default_curve),
            None => Curve::named(self.default_curve.as_str()).easing(&self.default_curve),
        };
        self.active = true;
    }

    fn get(&mut self, now: f64) -> Vec<f64> {
        if !self.active {
            return self.value.clone();
        }
        let t = if self.duration > 0.0 {
            ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if t >= 1.0 {
            self.value = self.end.clone();
            self.velocity = vec![0.0; self.end.len()];
            self.active = false;
            return self.value.clone();
        }
        let eased = self.easing.eval(t);
        let rate = self.easing.slope(t) / self.duration;
        self.value = self
            .start
            .iter()
            .zip(&self.end)
            .map(|(a, b)| a + (b - a) * eased)
            .collect();
        self.velocity = self
            .start
            .iter()
            .zip(&self.end)
            .map(|(a, b)| (b - a) * rate)
            .collect();
        self.value.clone()
    }

    fn velocity(&self) -> Vec<f64> {
        self.velocity.clone()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
