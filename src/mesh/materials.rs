//! Material mapping for emitted polygons
//!
//! Presentation is injected: the emitter asks a [`MaterialMapper`] for every
//! center and groups triangles by the returned material name.

use std::collections::BTreeMap;

use crate::biome::{classify, Biome};
use crate::graph::Center;

/// RGBA color type
pub type Color = [f32; 4];

/// A named render material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Grouping key; polygons with the same name share mesh buffers
    pub name: String,
    pub color: Color,
}

impl Material {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Trait for mapping centers to materials
pub trait MaterialMapper {
    fn material(&self, center: &Center) -> Material;
}

impl<M: MaterialMapper + ?Sized> MaterialMapper for &M {
    fn material(&self, center: &Center) -> Material {
        (**self).material(center)
    }
}

impl<M: MaterialMapper + ?Sized> MaterialMapper for Box<M> {
    fn material(&self, center: &Center) -> Material {
        (**self).material(center)
    }
}

/// Opaque color from a `0xRRGGBB` value
pub const fn hex_color(rgb: u32) -> Color {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// `#rrggbb` name of a color (alpha ignored)
pub fn color_name(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}

/// Default palette color of a biome
pub fn biome_color(biome: Biome) -> Color {
    match biome {
        Biome::Ocean => hex_color(0x44447a),
        Biome::Lake => hex_color(0x336699),
        Biome::Marsh => hex_color(0x2f6666),
        Biome::Ice => hex_color(0x99ffff),
        Biome::Beach => hex_color(0xa09077),
        Biome::Snow => hex_color(0xffffff),
        Biome::Tundra => hex_color(0xbbbbaa),
        Biome::Bare => hex_color(0x888888),
        Biome::Scorched => hex_color(0x555555),
        Biome::Taiga => hex_color(0x99aa77),
        Biome::Shrubland => hex_color(0x889977),
        Biome::TemperateDesert => hex_color(0xc9d29b),
        Biome::TemperateRainForest => hex_color(0x448855),
        Biome::TemperateDeciduousForest => hex_color(0x679459),
        Biome::Grassland => hex_color(0x88aa55),
        Biome::SubtropicalDesert => hex_color(0xd2b98b),
        Biome::TropicalRainForest => hex_color(0x337755),
        Biome::TropicalSeasonalForest => hex_color(0x559944),
    }
}

/// The center's biome, classifying on the fly if it was never assigned
#[inline]
fn biome_of(center: &Center) -> Biome {
    center.biome.unwrap_or_else(|| {
        classify(
            center.ocean,
            center.water,
            center.coast,
            center.elevation,
            center.moisture,
        )
    })
}

/// One material per biome, named after the biome, in the default palette
#[derive(Debug, Clone, Copy, Default)]
pub struct BiomeMaterials;

impl MaterialMapper for BiomeMaterials {
    fn material(&self, center: &Center) -> Material {
        let biome = biome_of(center);
        Material::new(biome.name(), biome_color(biome))
    }
}

/// Biome materials with per-biome color overrides
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::mesh::BiomePalette;
/// use voronoi_terrain::Biome;
///
/// let palette = BiomePalette::new()
///     .with_color(Biome::Ocean, [0.0, 0.1, 0.4, 1.0])
///     .with_color(Biome::Beach, [0.9, 0.8, 0.5, 1.0]);
/// assert_eq!(palette.color(Biome::Ocean), [0.0, 0.1, 0.4, 1.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BiomePalette {
    overrides: BTreeMap<Biome, Color>,
}

impl BiomePalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the color of one biome
    pub fn with_color(mut self, biome: Biome, color: Color) -> Self {
        self.overrides.insert(biome, color);
        self
    }

    /// Color used for a biome (override or default palette)
    pub fn color(&self, biome: Biome) -> Color {
        self.overrides
            .get(&biome)
            .copied()
            .unwrap_or_else(|| biome_color(biome))
    }
}

impl MaterialMapper for BiomePalette {
    fn material(&self, center: &Center) -> Material {
        let biome = biome_of(center);
        Material::new(biome.name(), self.color(biome))
    }
}

/// Caller-supplied per-center colors
///
/// Polygons are grouped by the `#rrggbb` name of their color.
#[derive(Clone, Copy)]
pub struct CenterColors<F>(pub F);

impl<F> MaterialMapper for CenterColors<F>
where
    F: Fn(&Center) -> Color,
{
    fn material(&self, center: &Center) -> Material {
        let color = (self.0)(center);
        Material::new(color_name(color), color)
    }
}
