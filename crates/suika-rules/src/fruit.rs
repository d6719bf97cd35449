//! Fruit types and the registry mapping each type to its size and sprite.
//!
//! A [`FruitType`] is a rank in `[0, N)`. Only a [`FruitRegistry`] hands out
//! values, so any `FruitType` in circulation is already known to be in range
//! for the registry that issued it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::RulesError;

// ---------------------------------------------------------------------------
// FruitType
// ---------------------------------------------------------------------------

/// The tier of a fruit. Larger values are larger fruits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FruitType(u8);

impl FruitType {
    /// The numeric rank of this fruit.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FruitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FruitType({})", self.0)
    }
}

impl fmt::Display for FruitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fruit#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FruitSpec
// ---------------------------------------------------------------------------

/// Physical and visual parameters of one fruit type.
#[derive(Debug, Clone, PartialEq)]
pub struct FruitSpec {
    /// Collider radius in canvas pixels.
    pub radius: f32,
    /// Sprite path, also used as the preview image.
    pub texture: String,
}

// ---------------------------------------------------------------------------
// FruitRegistry
// ---------------------------------------------------------------------------

/// Static lookup table from [`FruitType`] to [`FruitSpec`].
///
/// Radius grows linearly with the rank: `base_radius + rank * radius_step`.
/// Sprites are named by rank inside the configured asset directory.
#[derive(Debug, Clone)]
pub struct FruitRegistry {
    specs: Vec<FruitSpec>,
}

impl FruitRegistry {
    /// Build the registry described by `config`.
    ///
    /// The config is expected to have passed [`GameConfig::validate`]; the
    /// fruit count is capped at 256 by the `u8` rank.
    pub fn from_config(config: &GameConfig) -> Self {
        let count = config.fruit_types.min(u8::MAX as usize + 1);
        let specs = (0..count)
            .map(|rank| FruitSpec {
                radius: config.base_radius + rank as f32 * config.radius_step,
                texture: format!("{}/{rank}.png", config.asset_dir),
            })
            .collect();
        Self { specs }
    }

    /// Number of fruit types (`N`).
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry holds no fruit types at all.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validate a raw rank and turn it into a [`FruitType`].
    pub fn fruit(&self, index: usize) -> Result<FruitType, RulesError> {
        if index < self.specs.len() {
            Ok(FruitType(index as u8))
        } else {
            Err(RulesError::UnknownFruitType {
                index,
                count: self.specs.len(),
            })
        }
    }

    /// The largest fruit type (`N - 1`).
    ///
    /// # Panics
    ///
    /// Panics if the registry is empty. A validated config always yields at
    /// least two fruit types.
    pub fn max(&self) -> FruitType {
        assert!(!self.specs.is_empty(), "fruit registry is empty");
        FruitType((self.specs.len() - 1) as u8)
    }

    /// Whether `fruit` is the largest type.
    pub fn is_max(&self, fruit: FruitType) -> bool {
        fruit.index() + 1 == self.specs.len()
    }

    /// The type one tier up, or `None` when `fruit` is already the largest.
    pub fn next(&self, fruit: FruitType) -> Option<FruitType> {
        let up = fruit.index() + 1;
        (up < self.specs.len()).then(|| FruitType(up as u8))
    }

    /// Full parameters for `fruit`.
    ///
    /// # Panics
    ///
    /// Panics if `fruit` was issued by a larger registry. Fruit types never
    /// cross registries during play, so this is a programming error.
    pub fn spec(&self, fruit: FruitType) -> &FruitSpec {
        self.specs.get(fruit.index()).unwrap_or_else(|| {
            panic!(
                "{fruit} is outside the registry of {} fruit types",
                self.specs.len()
            )
        })
    }

    /// Collider radius of `fruit`.
    pub fn radius(&self, fruit: FruitType) -> f32 {
        self.spec(fruit).radius
    }

    /// Sprite path of `fruit`.
    pub fn texture(&self, fruit: FruitType) -> &str {
        &self.spec(fruit).texture
    }

    /// Iterate over every fruit type in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FruitType> + '_ {
        (0..self.specs.len()).map(|rank| FruitType(rank as u8))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FruitRegistry {
        FruitRegistry::from_config(&GameConfig::default())
    }

    #[test]
    fn default_registry_has_six_types() {
        let reg = registry();
        assert_eq!(reg.len(), 6);
        assert_eq!(reg.max().index(), 5);
    }

    #[test]
    fn radius_grows_linearly() {
        let reg = registry();
        let radii: Vec<f32> = reg.iter().map(|f| reg.radius(f)).collect();
        assert_eq!(radii, vec![20.0, 25.0, 30.0, 35.0, 40.0, 45.0]);
    }

    #[test]
    fn textures_are_named_by_rank() {
        let reg = registry();
        let zero = reg.fruit(0).unwrap();
        let five = reg.fruit(5).unwrap();
        assert_eq!(reg.texture(zero), "fruits/0.png");
        assert_eq!(reg.texture(five), "fruits/5.png");
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let reg = registry();
        let err = reg.fruit(6).unwrap_err();
        assert!(matches!(
            err,
            RulesError::UnknownFruitType { index: 6, count: 6 }
        ));
    }

    #[test]
    fn next_stops_at_max() {
        let reg = registry();
        let four = reg.fruit(4).unwrap();
        let five = reg.next(four).unwrap();
        assert!(reg.is_max(five));
        assert_eq!(reg.next(five), None);
        assert!(!reg.is_max(four));
    }

    #[test]
    #[should_panic(expected = "outside the registry")]
    fn foreign_fruit_type_panics_on_lookup() {
        let big = FruitRegistry::from_config(&GameConfig {
            fruit_types: 10,
            ..Default::default()
        });
        let small = registry();
        let nine = big.fruit(9).unwrap();
        small.radius(nine);
    }

    #[test]
    fn display_and_debug_formats() {
        let reg = registry();
        let two = reg.fruit(2).unwrap();
        assert_eq!(two.to_string(), "fruit#2");
        assert_eq!(format!("{two:?}"), "FruitType(2)");
    }
}
