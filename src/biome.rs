//! Biome classification
//!
//! A fixed decision table over (ocean, water, coast, elevation, moisture).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Terrain classification of a center
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Biome {
    Ocean,
    Marsh,
    Ice,
    Lake,
    Beach,
    Snow,
    Tundra,
    Bare,
    Scorched,
    Taiga,
    Shrubland,
    TemperateDesert,
    TemperateRainForest,
    TemperateDeciduousForest,
    Grassland,
    TropicalRainForest,
    TropicalSeasonalForest,
    SubtropicalDesert,
}

impl Biome {
    /// Every biome, in declaration order
    pub const ALL: [Biome; 18] = [
        Biome::Ocean,
        Biome::Marsh,
        Biome::Ice,
        Biome::Lake,
        Biome::Beach,
        Biome::Snow,
        Biome::Tundra,
        Biome::Bare,
        Biome::Scorched,
        Biome::Taiga,
        Biome::Shrubland,
        Biome::TemperateDesert,
        Biome::TemperateRainForest,
        Biome::TemperateDeciduousForest,
        Biome::Grassland,
        Biome::TropicalRainForest,
        Biome::TropicalSeasonalForest,
        Biome::SubtropicalDesert,
    ];

    /// Upper-case tag, e.g. `TEMPERATE_RAIN_FOREST`
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Ocean => "OCEAN",
            Biome::Marsh => "MARSH",
            Biome::Ice => "ICE",
            Biome::Lake => "LAKE",
            Biome::Beach => "BEACH",
            Biome::Snow => "SNOW",
            Biome::Tundra => "TUNDRA",
            Biome::Bare => "BARE",
            Biome::Scorched => "SCORCHED",
            Biome::Taiga => "TAIGA",
            Biome::Shrubland => "SHRUBLAND",
            Biome::TemperateDesert => "TEMPERATE_DESERT",
            Biome::TemperateRainForest => "TEMPERATE_RAIN_FOREST",
            Biome::TemperateDeciduousForest => "TEMPERATE_DECIDUOUS_FOREST",
            Biome::Grassland => "GRASSLAND",
            Biome::TropicalRainForest => "TROPICAL_RAIN_FOREST",
            Biome::TropicalSeasonalForest => "TROPICAL_SEASONAL_FOREST",
            Biome::SubtropicalDesert => "SUBTROPICAL_DESERT",
        }
    }

    /// Check if this biome is a body of water
    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::Marsh | Biome::Ice | Biome::Lake)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a center
///
/// Pure: the same inputs always give the same biome.
pub fn classify(ocean: bool, water: bool, coast: bool, elevation: f64, moisture: f64) -> Biome {
    if ocean {
        Biome::Ocean
    } else if water {
        if elevation < 0.1 {
            Biome::Marsh
        } else if elevation > 0.8 {
            Biome::Ice
        } else {
            Biome::Lake
        }
    } else if coast {
        Biome::Beach
    } else if elevation > 0.8 {
        if moisture > 0.50 {
            Biome::Snow
        } else if moisture > 0.33 {
            Biome::Tundra
        } else if moisture > 0.16 {
            Biome::Bare
        } else {
            Biome::Scorched
        }
    } else if elevation > 0.6 {
        if moisture > 0.66 {
            Biome::Taiga
        } else if moisture > 0.33 {
            Biome::Shrubland
        } else {
            Biome::TemperateDesert
        }
    } else if elevation > 0.3 {
        if moisture > 0.83 {
            Biome::TemperateRainForest
        } else if moisture > 0.50 {
            Biome::TemperateDeciduousForest
        } else if moisture > 0.16 {
            Biome::Grassland
        } else {
            Biome::TemperateDesert
        }
    } else if moisture > 0.66 {
        Biome::TropicalRainForest
    } else if moisture > 0.33 {
        Biome::TropicalSeasonalForest
    } else if moisture > 0.16 {
        Biome::Grassland
    } else {
        Biome::SubtropicalDesert
    }
}

/// Tag every center of the graph with its biome
pub fn assign_biomes(graph: &mut Graph) {
    for center in &mut graph.centers {
        center.biome = Some(classify(
            center.ocean,
            center.water,
            center.coast,
            center.elevation,
            center.moisture,
        ));
    }
}
