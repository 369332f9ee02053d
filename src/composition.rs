//! Picture fuzzy composition: support, opposition, abstention and refusal
//!
//! A voter's opinion in a picture fuzzy set is split four ways. The first
//! three degrees are chosen; refusal is whatever is left:
//!
//! ```text
//! refusal = 1 - support - opposition - abstention
//! ```
//!
//! Fixing abstention at zero gives the intuitionistic variant, where the
//! leftover is called hesitation. Fixing opposition as well leaves a plain
//! fuzzy membership.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Floating-point slack allowed when comparing sums against 1
pub const ROUNDING_TOLERANCE: f64 = 1e-9;

/// One of the three chosen degrees, in slider order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Component {
    Support,
    Opposition,
    Abstention,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Support => write!(f, "support"),
            Component::Opposition => write!(f, "opposition"),
            Component::Abstention => write!(f, "abstention"),
        }
    }
}

/// An impossible composition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("{component} must be within [0, 1], got {value}")]
    ComponentOutOfRange { component: Component, value: f64 },

    #[error("support + opposition + abstention = {sum:.3} exceeds 1")]
    SumExceedsOne { sum: f64 },

    #[error("{component} of {value:.3} exceeds the remaining {remaining:.3}")]
    ExceedsRemaining {
        component: Component,
        value: f64,
        remaining: f64,
    },
}

fn check_range(component: Component, value: f64) -> Result<f64, CompositionError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CompositionError::ComponentOutOfRange { component, value })
    }
}

/// Refusal degree completing a picture fuzzy value.
///
/// Fails instead of returning a negative refusal when the three degrees add
/// up to more than one. Residues within [`ROUNDING_TOLERANCE`] of zero are
/// reported as exactly zero.
pub fn derive(support: f64, opposition: f64, abstention: f64) -> Result<f64, CompositionError> {
    let support = check_range(Component::Support, support)?;
    let opposition = check_range(Component::Opposition, opposition)?;
    let abstention = check_range(Component::Abstention, abstention)?;

    let refusal = 1.0 - support - opposition - abstention;
    if refusal < -ROUNDING_TOLERANCE {
        return Err(CompositionError::SumExceedsOne {
            sum: support + opposition + abstention,
        });
    }

    Ok(if refusal.abs() <= ROUNDING_TOLERANCE {
        0.0
    } else {
        refusal
    })
}

/// Hesitation degree of an intuitionistic fuzzy value
pub fn hesitation(support: f64, opposition: f64) -> Result<f64, CompositionError> {
    derive(support, opposition, 0.0)
}

/// A complete picture fuzzy value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PictureFuzzyValue {
    pub support: f64,
    pub opposition: f64,
    pub abstention: f64,
    pub refusal: f64,
}

impl PictureFuzzyValue {
    pub fn new(support: f64, opposition: f64, abstention: f64) -> Result<Self, CompositionError> {
        let refusal = derive(support, opposition, abstention)?;
        Ok(Self {
            support,
            opposition,
            abstention,
            refusal,
        })
    }
}

/// Slider-style accumulator for the three chosen degrees.
///
/// Each degree is capped by what the earlier ones leave over: opposition by
/// `1 - support`, abstention by `1 - support - opposition`. Raising an earlier
/// degree pulls later ones down to their new cap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompositionBuilder {
    support: f64,
    opposition: f64,
    abstention: f64,
}

impl CompositionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn support(self, value: f64) -> Result<Self, CompositionError> {
        self.with(Component::Support, value)
    }

    pub fn opposition(self, value: f64) -> Result<Self, CompositionError> {
        self.with(Component::Opposition, value)
    }

    pub fn abstention(self, value: f64) -> Result<Self, CompositionError> {
        self.with(Component::Abstention, value)
    }

    /// Upper bound currently allowed for `component`
    pub fn cap(&self, component: Component) -> f64 {
        let used = match component {
            Component::Support => 0.0,
            Component::Opposition => self.support,
            Component::Abstention => self.support + self.opposition,
        };
        (1.0 - used).max(0.0)
    }

    /// What is left for refusal with the degrees chosen so far
    pub fn remaining(&self) -> f64 {
        (1.0 - self.support - self.opposition - self.abstention).max(0.0)
    }

    /// Set `component`, checking it against its cap
    pub fn with(mut self, component: Component, value: f64) -> Result<Self, CompositionError> {
        let value = check_range(component, value)?;
        let cap = self.cap(component);
        if value > cap + ROUNDING_TOLERANCE {
            return Err(CompositionError::ExceedsRemaining {
                component,
                value,
                remaining: cap,
            });
        }

        match component {
            Component::Support => self.support = value,
            Component::Opposition => self.opposition = value,
            Component::Abstention => self.abstention = value,
        }

        self.opposition = self.opposition.min(self.cap(Component::Opposition));
        self.abstention = self.abstention.min(self.cap(Component::Abstention));
        Ok(self)
    }

    pub fn build(self) -> Result<PictureFuzzyValue, CompositionError> {
        PictureFuzzyValue::new(self.support, self.opposition, self.abstention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_derive_examples() {
        assert!(close(derive(0.5, 0.2, 0.1).unwrap(), 0.2));
        assert_eq!(derive(0.7, 0.3, 0.0).unwrap(), 0.0);
        assert_eq!(derive(0.0, 0.0, 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_derive_rejects_sum_above_one() {
        let err = derive(0.6, 0.5, 0.0).unwrap_err();
        match err {
            CompositionError::SumExceedsOne { sum } => assert!(close(sum, 1.1)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_derive_rejects_out_of_range() {
        assert_eq!(
            derive(-0.1, 0.0, 0.0),
            Err(CompositionError::ComponentOutOfRange {
                component: Component::Support,
                value: -0.1
            })
        );
        assert!(matches!(
            derive(0.2, 1.5, 0.0),
            Err(CompositionError::ComponentOutOfRange {
                component: Component::Opposition,
                ..
            })
        ));
        assert!(matches!(
            derive(0.2, 0.1, f64::NAN),
            Err(CompositionError::ComponentOutOfRange {
                component: Component::Abstention,
                ..
            })
        ));
    }

    #[test]
    fn test_lower_dimensional_variants() {
        assert!(close(hesitation(0.6, 0.2).unwrap(), 0.2));
        assert!(close(derive(0.7, 0.0, 0.0).unwrap(), 0.3));
        assert!(hesitation(0.6, 0.5).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = derive(0.6, 0.5, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "support + opposition + abstention = 1.100 exceeds 1"
        );
    }

    #[test]
    fn test_builder_caps_follow_earlier_degrees() {
        let builder = CompositionBuilder::new().support(0.5).unwrap();
        assert_eq!(builder.cap(Component::Support), 1.0);
        assert_eq!(builder.cap(Component::Opposition), 0.5);

        let builder = builder.opposition(0.2).unwrap();
        assert!(close(builder.cap(Component::Abstention), 0.3));

        let value = builder.abstention(0.1).unwrap().build().unwrap();
        assert!(close(value.refusal, 0.2));
    }

    #[test]
    fn test_builder_rejects_value_above_cap() {
        let err = CompositionBuilder::new()
            .support(0.6)
            .unwrap()
            .opposition(0.5)
            .unwrap_err();
        assert!(matches!(
            err,
            CompositionError::ExceedsRemaining {
                component: Component::Opposition,
                ..
            }
        ));
    }

    #[test]
    fn test_builder_raising_support_clamps_later_degrees() {
        let builder = CompositionBuilder::new()
            .support(0.2)
            .and_then(|b| b.opposition(0.5))
            .and_then(|b| b.abstention(0.3))
            .unwrap();
        assert!(builder.remaining() < 1e-12);

        let builder = builder.support(0.7).unwrap();
        let value = builder.build().unwrap();
        assert_eq!(value.support, 0.7);
        assert!(close(value.opposition, 0.3));
        assert_eq!(value.abstention, 0.0);
        assert_eq!(value.refusal, 0.0);
    }

    #[test]
    fn test_builder_full_support() {
        let value = CompositionBuilder::new().support(1.0).unwrap().build().unwrap();
        assert_eq!(
            value,
            PictureFuzzyValue {
                support: 1.0,
                opposition: 0.0,
                abstention: 0.0,
                refusal: 0.0
            }
        );
    }

    proptest! {
        #[test]
        fn prop_valid_compositions_sum_to_one(s in 0.0f64..=1.0, fo in 0.0f64..=1.0, fa in 0.0f64..=1.0) {
            let o = (1.0 - s) * fo;
            let a = (1.0 - s - o).max(0.0) * fa;
            let refusal = derive(s, o, a).unwrap();
            prop_assert!(refusal >= 0.0);
            prop_assert!((s + o + a + refusal - 1.0).abs() < 1e-9);
            prop_assert_eq!(derive(s, o, a).unwrap().to_bits(), refusal.to_bits());
        }

        #[test]
        fn prop_builder_never_overfills(s in 0.0f64..=1.0, o in 0.0f64..=1.0, a in 0.0f64..=1.0) {
            let builder = CompositionBuilder::new().support(s).unwrap();
            let builder = builder.opposition(o.min(builder.cap(Component::Opposition))).unwrap();
            let builder = builder.abstention(a.min(builder.cap(Component::Abstention))).unwrap();
            prop_assert!(builder.build().is_ok());
        }
    }
}
