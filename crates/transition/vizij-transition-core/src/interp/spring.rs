//! Damped harmonic spring toward the target.
//!
//! Each component follows the closed-form solution of `x'' + 2ζω x' + ω² x = 0`
//! with `ω = 2π / period`, so sampling is exact regardless of tick spacing.
//! `TransitionSpec::duration` is ignored; the spring runs until it settles.

use std::f64::consts::TAU;

use crate::config::{Config, SpringDefaults};
use crate::spec::TransitionSpec;

use super::Interpolator;

#[derive(Debug)]
pub struct SpringEngine {
    defaults: SpringDefaults,
    /// Parameters of the current transition; re-resolved on every `set`.
    period: f64,
    damping_ratio: f64,
    epsilon: f64,
    origin: Vec<f64>,
    origin_velocity: Vec<f64>,
    target: Vec<f64>,
    value: Vec<f64>,
    velocity: Vec<f64>,
    start_time: f64,
    active: bool,
}

impl SpringEngine {
    pub const MAX_COMPONENTS: usize = 3;

    pub fn new(cfg: &Config) -> Self {
        Self {
            defaults: cfg.spring,
            period: cfg.spring.period_ms,
            damping_ratio: cfg.spring.damping_ratio,
            epsilon: cfg.spring.settle_epsilon,
            origin: Vec::new(),
            origin_velocity: Vec::new(),
            target: Vec::new(),
            value: Vec::new(),
            velocity: Vec::new(),
            start_time: 0.0,
            active: false,
        }
    }

    /// Displacement and velocity at `t` ms for initial displacement `x0` and velocity `v0`.
    fn solve(&self, x0: f64, v0: f64, t: f64) -> (f64, f64) {
        let w0 = TAU / self.period.max(f64::EPSILON);
        let zeta = self.damping_ratio.max(0.0);
        if zeta < 1.0 {
            let a = zeta * w0;
            let wd = w0 * (1.0 - zeta * zeta).sqrt();
            let b = (v0 + a * x0) / wd;
            let decay = (-a * t).exp();
            let (sin, cos) = (wd * t).sin_cos();
            let x = decay * (x0 * cos + b * sin);
            let v = decay * ((b * wd - a * x0) * cos - (a * b + x0 * wd) * sin);
            (x, v)
        } else if zeta == 1.0 {
            let c = v0 + w0 * x0;
            let decay = (-w0 * t).exp();
            (decay * (x0 + c * t), decay * (c - w0 * (x0 + c * t)))
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -w0 * (zeta - root);
            let r2 = -w0 * (zeta + root);
            let c2 = (v0 - r1 * x0) / (r2 - r1);
            let c1 = x0 - c2;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
        }
    }
}

impl Interpolator for SpringEngine {
    fn reset(&mut self, value: &[f64], velocity: Option<&[f64]>) {
        self.value = value.to_vec();
        self.target = value.to_vec();
        self.origin = value.to_vec();
        self.velocity = match velocity {
            Some(v) => v.to_vec(),
            None => vec![0.0; value.len()],
        };
        self.origin_velocity = self.velocity.clone();
        self.active = false;
    }

    fn set(&mut self, target: &[f64], spec: &TransitionSpec, now: f64) {
        self.period = spec
            .period
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.defaults.period_ms);
        self.damping_ratio = spec
            .damping_ratio
            .filter(|z| z.is_finite() && *z >= 0.0)
            .unwrap_or(self.defaults.damping_ratio);
        let n = target.len();
        self.value.resize(n, 0.0);
        self.velocity.resize(n, 0.0);
        self.origin = self.value.clone();
        self.origin_velocity = match &spec.velocity {
            Some(v) => v.components(),
            None => self.velocity.clone(),
        };
        self.origin_velocity.resize(n, 0.0);
        self.target = target.to_vec();
        self.start_time = now;
        self.active = true;
    }

    fn get(&mut self, now: f64) -> Vec<f64> {
        if !self.active {
            return self.value.clone();
        }
        let t = (now - self.start_time).max(0.0);
        let mut settled = true;
        for i in 0..self.target.len() {
            let x0 = self.origin[i] - self.target[i];
            let (x, v) = self.solve(x0, self.origin_velocity[i], t);
            if x.abs() >= self.epsilon || (v * self.period).abs() >= self.epsilon {
                settled = false;
            }
            self.value[i] = self.target[i] + x;
            self.velocity[i] = v;
        }
        if settled {
            self.value = self.target.clone();
            self.velocity = vec![0.0; self.target.len()];
            self.active = false;
        }
        self.value.clone()
    }

    fn velocity(&self) -> Vec<f64> {
        self.velocity.clone()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut SpringEngine, until: f64) -> (Vec<f64>, f64) {
        let mut max = f64::MIN;
        let mut out = Vec::new();
        let mut now = 0.0;
        while now <= until && engine.is_active() {
            out = engine.get(now);
            max = max.max(out[0]);
            now += 16.0;
        }
        (out, max)
    }

    #[test]
    fn underdamped_spring_overshoots_then_settles() {
        let mut e = SpringEngine::new(&Config::default());
        e.reset(&[0.0], None);
        e.set(&[1.0], &TransitionSpec::default().with_damping_ratio(0.3), 0.0);
        let (last, max) = run(&mut e, 20_000.0);
        assert!(max > 1.0, "expected overshoot, max was {max}");
        assert!(!e.is_active());
        assert_eq!(last, vec![1.0]);
    }

    #[test]
    fn critically_damped_spring_does_not_overshoot() {
        let mut e = SpringEngine::new(&Config::default());
        e.reset(&[0.0], None);
        e.set(&[1.0], &TransitionSpec::default().with_damping_ratio(1.0), 0.0);
        let (_, max) = run(&mut e, 20_000.0);
        assert!(max <= 1.0 + 1e-9, "max was {max}");
        assert!(!e.is_active());
    }

    #[test]
    fn overdamped_spring_settles() {
        let mut e = SpringEngine::new(&Config::default());
        e.reset(&[2.0, -2.0], None);
        e.set(&[0.0, 0.0], &TransitionSpec::default().with_damping_ratio(2.0), 0.0);
        let mut now = 0.0;
        while e.is_active() && now < 60_000.0 {
            e.get(now);
            now += 16.0;
        }
        assert!(!e.is_active());
        assert_eq!(e.get(now), vec![0.0, 0.0]);
    }

    #[test]
    fn initial_velocity_moves_away_first() {
        let mut e = SpringEngine::new(&Config::default());
        e.reset(&[0.0], Some(&[-0.05]));
        e.set(&[1.0], &TransitionSpec::default().with_damping_ratio(1.0), 0.0);
        let early = e.get(1.0)[0];
        assert!(early < 0.0, "value was {early}");
    }

    #[test]
    fn omitted_parameters_fall_back_to_config_on_reuse() {
        let spec = TransitionSpec::default().with_period(100.0);
        let mut fresh = SpringEngine::new(&Config::default());
        fresh.reset(&[0.0], None);
        fresh.set(&[1.0], &spec, 0.0);
        let expected = fresh.get(30.0)[0];

        let mut reused = SpringEngine::new(&Config::default());
        reused.reset(&[0.0], None);
        reused.set(&[1.0], &spec.clone().with_damping_ratio(5.0), 0.0);
        reused.reset(&[0.0], None);
        reused.set(&[1.0], &spec, 0.0);
        assert!((reused.get(30.0)[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn set_without_reset_sizes_its_buffers() {
        let mut e = SpringEngine::new(&Config::default());
        e.set(&[1.0, 2.0], &TransitionSpec::default(), 0.0);
        assert_eq!(e.get(0.0), vec![0.0, 0.0]);
        assert_eq!(e.velocity().len(), 2);
    }

    #[test]
    fn sample_at_start_matches_origin() {
        let mut e = SpringEngine::new(&Config::default());
        e.reset(&[3.0], None);
        e.set(&[5.0], &TransitionSpec::default(), 100.0);
        assert!((e.get(100.0)[0] - 3.0).abs() < 1e-12);
    }
}
