//! Numeric state values and their structural shapes.
//!
//! A [`State`] is what a transitionable holds and interpolates. Engines never see the
//! variant; they work on the flat component list produced against a fixed [`StateShape`],
//! which is resolved once when a transition is loaded.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// Current value of a transitionable.
///
/// Serialized untagged, so JSON `5`, `[1, 2]` and `{"x": 1}` map to the three variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum State {
    Scalar(f64),
    Sequence(Vec<f64>),
    Keyed(IndexMap<String, f64>),
}

/// Structural type of a [`State`]: variant plus component count (and keys for maps).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StateShape {
    Scalar,
    Sequence(usize),
    /// Keys in the component order used for interpolation.
    Keyed(Vec<String>),
}

impl Default for State {
    fn default() -> Self {
        State::Scalar(0.0)
    }
}

impl StateShape {
    #[inline]
    pub fn component_count(&self) -> usize {
        match self {
            StateShape::Scalar => 1,
            StateShape::Sequence(n) => *n,
            StateShape::Keyed(keys) => keys.len(),
        }
    }

    /// Same variant and size; keyed shapes must hold the same key set in any order.
    pub fn is_compatible(&self, other: &StateShape) -> bool {
        match (self, other) {
            (StateShape::Scalar, StateShape::Scalar) => true,
            (StateShape::Sequence(a), StateShape::Sequence(b)) => a == b,
            (StateShape::Keyed(a), StateShape::Keyed(b)) => {
                a.len() == b.len() && a.iter().all(|k| b.contains(k))
            }
            _ => false,
        }
    }
}

impl fmt::Display for StateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateShape::Scalar => write!(f, "scalar"),
            StateShape::Sequence(n) => write!(f, "sequence[{n}]"),
            StateShape::Keyed(keys) => write!(f, "keyed{{{}}}", keys.join(",")),
        }
    }
}

impl State {
    pub fn shape(&self) -> StateShape {
        match self {
            State::Scalar(_) => StateShape::Scalar,
            State::Sequence(v) => StateShape::Sequence(v.len()),
            State::Keyed(m) => StateShape::Keyed(m.keys().cloned().collect()),
        }
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        match self {
            State::Scalar(_) => 1,
            State::Sequence(v) => v.len(),
            State::Keyed(m) => m.len(),
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            State::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Flat components in this value's own order.
    pub fn components(&self) -> Vec<f64> {
        match self {
            State::Scalar(v) => vec![*v],
            State::Sequence(v) => v.clone(),
            State::Keyed(m) => m.values().copied().collect(),
        }
    }

    /// Components ordered by `shape`, rejecting values that do not fit it.
    pub fn aligned_components(&self, shape: &StateShape) -> Result<Vec<f64>, TransitionError> {
        let actual = self.shape();
        if !shape.is_compatible(&actual) {
            return Err(TransitionError::InvalidStateShape {
                expected: shape.clone(),
                actual,
            });
        }
        match (self, shape) {
            (State::Keyed(m), StateShape::Keyed(keys)) => Ok(keys
                .iter()
                .map(|k| m.get(k).copied().unwrap_or_default())
                .collect()),
            _ => Ok(self.components()),
        }
    }

    /// Rebuild a value of `shape` from flat components.
    ///
    /// Missing trailing components read as zero.
    pub fn from_components(shape: &StateShape, components: &[f64]) -> State {
        let at = |i: usize| components.get(i).copied().unwrap_or(0.0);
        match shape {
            StateShape::Scalar => State::Scalar(at(0)),
            StateShape::Sequence(n) => State::Sequence((0..*n).map(at).collect()),
            StateShape::Keyed(keys) => State::Keyed(
                keys.iter()
                    .enumerate()
                    .map(|(i, k)| (k.clone(), at(i)))
                    .collect(),
            ),
        }
    }

    pub fn check_finite(&self) -> Result<(), TransitionError> {
        match self.components().iter().position(|c| !c.is_finite()) {
            Some(index) => Err(TransitionError::NonFiniteValue { index }),
            None => Ok(()),
        }
    }
}

impl From<f64> for State {
    fn from(v: f64) -> Self {
        State::Scalar(v)
    }
}

impl From<Vec<f64>> for State {
    fn from(v: Vec<f64>) -> Self {
        State::Sequence(v)
    }
}

impl<const N: usize> From<[f64; N]> for State {
    fn from(v: [f64; N]) -> Self {
        State::Sequence(v.to_vec())
    }
}

impl From<IndexMap<String, f64>> for State {
    fn from(m: IndexMap<String, f64>) -> Self {
        State::Keyed(m)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for State {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        State::Keyed(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_json_maps_to_variants() {
        let s: State = serde_json::from_str("5").unwrap();
        assert_eq!(s, State::Scalar(5.0));
        let s: State = serde_json::from_str("[1, 2.5]").unwrap();
        assert_eq!(s, State::Sequence(vec![1.0, 2.5]));
        let s: State = serde_json::from_str(r#"{"x": 1, "y": 2}"#).unwrap();
        assert_eq!(s.shape(), StateShape::Keyed(vec!["x".into(), "y".into()]));
    }

    #[test]
    fn keyed_alignment_follows_shape_order() {
        let current: State = [("x", 0.0), ("y", 0.0)].into_iter().collect();
        let target: State = [("y", 2.0), ("x", 1.0)].into_iter().collect();
        let comps = target.aligned_components(&current.shape()).unwrap();
        assert_eq!(comps, vec![1.0, 2.0]);
        let rebuilt = State::from_components(&current.shape(), &comps);
        assert_eq!(rebuilt, [("x", 1.0), ("y", 2.0)].into_iter().collect::<State>());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let err = State::from([1.0, 2.0])
            .aligned_components(&StateShape::Scalar)
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::InvalidStateShape {
                expected: StateShape::Scalar,
                actual: StateShape::Sequence(2),
            }
        );

        let xy: State = [("x", 0.0), ("y", 0.0)].into_iter().collect();
        let xz: State = [("x", 0.0), ("z", 0.0)].into_iter().collect();
        assert!(xz.aligned_components(&xy.shape()).is_err());
    }

    #[test]
    fn non_finite_components_are_reported() {
        let s = State::from(vec![0.0, f64::NAN]);
        assert_eq!(
            s.check_finite(),
            Err(TransitionError::NonFiniteValue { index: 1 })
        );
        assert!(State::Scalar(1.0).check_finite().is_ok());
    }
}
