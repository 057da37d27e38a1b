use strata_mesh_cpu::{BUILDERS, DetailLevel, Layer, LayerSet};

/// Detail level of a chunk `distance` rings (Chebyshev) from the camera chunk.
pub fn detail_level(distance: u32, view_distance: u32, in_free_space: bool, overhead: bool) -> DetailLevel {
    if overhead {
        DetailLevel::Overhead
    } else if distance > view_distance || in_free_space {
        DetailLevel::Low
    } else {
        DetailLevel::High
    }
}

/// Camera far above the world top or below its floor.
pub fn in_free_space(camera_y: f32, world_height: usize, margin: f32) -> bool {
    camera_y > world_height as f32 + margin || camera_y < -margin
}

/// Layers whose builder set differs between two levels. Blocks is always
/// included so a level change never keeps geometry built for the old level.
pub fn level_sensitive_layers(from: DetailLevel, to: DetailLevel) -> LayerSet {
    let mut set = LayerSet::only(Layer::Blocks);
    if from == to {
        return set;
    }
    for b in BUILDERS.iter() {
        if b.applies_at(from) != b.applies_at(to) {
            set.insert(b.layer);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead_wins_then_distance_then_free_space() {
        assert_eq!(detail_level(0, 4, false, true), DetailLevel::Overhead);
        assert_eq!(detail_level(4, 4, false, false), DetailLevel::High);
        assert_eq!(detail_level(5, 4, false, false), DetailLevel::Low);
        assert_eq!(detail_level(0, 4, true, false), DetailLevel::Low);
    }

    #[test]
    fn free_space_bounds() {
        assert!(!in_free_space(70.0, 128, 64.0));
        assert!(in_free_space(193.0, 128, 64.0));
        assert!(in_free_space(-65.0, 128, 64.0));
    }

    #[test]
    fn high_to_low_drops_tick_markers() {
        let s = level_sensitive_layers(DetailLevel::High, DetailLevel::Low);
        assert!(s.contains(Layer::Blocks));
        assert!(s.contains(Layer::TileTicks));
        assert!(!s.contains(Layer::Monsters));
        let o = level_sensitive_layers(DetailLevel::Low, DetailLevel::Overhead);
        assert!(o.contains(Layer::TerrainPopulated));
        assert!(!o.contains(Layer::TileTicks));
    }
}
