//! User-drawn land regions

use glam::DVec2;

use super::WaterMask;
use crate::config::MaskRegion;
use crate::geometry::Bounds;

/// Mask-constrained land: a point is land iff it lies inside a region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMask {
    regions: Vec<MaskRegion>,
}

impl RegionMask {
    pub fn new(regions: Vec<MaskRegion>) -> Self {
        Self { regions }
    }

    #[inline]
    pub fn regions(&self) -> &[MaskRegion] {
        &self.regions
    }

    pub fn is_land(&self, point: DVec2) -> bool {
        self.regions.iter().any(|r| r.contains(point))
    }
}

impl WaterMask for RegionMask {
    fn is_water(&self, point: DVec2, _bounds: Bounds) -> bool {
        !self.is_land(point)
    }
}
