//! Registry mapping curve names to engine kinds.
//!
//! Owned by a [`Scheduler`](crate::Scheduler), so independent schedulers never share
//! registrations. Lookups happen on every transition load; registration is expected
//! at startup.

use hashbrown::HashMap;

use crate::curve::Curve;
use crate::interp::EngineKind;

pub const TWEEN: &str = "tween";
pub const SPRING: &str = "spring";

#[derive(Debug)]
pub struct EngineRegistry {
    kinds: HashMap<String, EngineKind>,
    default_name: String,
    fallback: EngineKind,
}

impl EngineRegistry {
    /// Registry with the built-in `tween` and `spring` kinds. `default_name` must name one
    /// of them (or be registered later); otherwise `tween` is used.
    pub fn new(default_name: &str) -> Self {
        let mut registry = Self {
            kinds: HashMap::new(),
            default_name: TWEEN.to_string(),
            fallback: EngineKind::tween(),
        };
        registry.register_builtin_engines();
        if registry.kinds.contains_key(default_name) {
            registry.default_name = default_name.to_string();
        } else {
            log::warn!("default engine '{default_name}' is not registered; using '{TWEEN}'");
        }
        registry
    }

    #[inline]
    fn register_builtin_engines(&mut self) {
        self.register(TWEEN, EngineKind::tween());
        self.register(SPRING, EngineKind::spring());
    }

    /// Add an engine kind under `name`. Existing registrations are never replaced;
    /// returns whether the kind was inserted.
    pub fn register(&mut self, name: impl Into<String>, kind: EngineKind) -> bool {
        let name = name.into();
        if self.kinds.contains_key(&name) {
            log::debug!("engine '{name}' already registered; keeping the original");
            return false;
        }
        self.kinds.insert(name, kind);
        true
    }

    /// Remove an engine kind; returns whether it existed. The default kind stays.
    pub fn unregister(&mut self, name: &str) -> bool {
        if name == self.default_name {
            log::warn!("refusing to unregister default engine '{name}'");
            return false;
        }
        self.kinds.remove(name).is_some()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&EngineKind> {
        self.kinds.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    #[inline]
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Engine name and kind for a transition's curve: the registered kind when the curve
    /// names one, the default kind otherwise.
    pub fn resolve(&self, curve: Option<&Curve>) -> (&str, &EngineKind) {
        if let Some((name, kind)) = curve
            .and_then(Curve::name)
            .and_then(|name| self.kinds.get_key_value(name))
        {
            return (name.as_str(), kind);
        }
        match self.kinds.get_key_value(self.default_name.as_str()) {
            Some((name, kind)) => (name.as_str(), kind),
            None => (TWEEN, &self.fallback),
        }
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new(TWEEN)
    }
}
