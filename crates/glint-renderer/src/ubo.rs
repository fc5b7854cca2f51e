//! Per-frame global uniform data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Global shader data, rewritten into the current frame slot's uniform
/// buffer every frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUbo {
    pub projection_view: Mat4,
    /// Direction the light travels, w unused.
    pub light_direction: Vec4,
}

impl Default for GlobalUbo {
    fn default() -> Self {
        Self {
            projection_view: Mat4::IDENTITY,
            light_direction: Vec4::new(1.0, -3.0, -1.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubo_matches_std140_layout() {
        assert_eq!(std::mem::size_of::<GlobalUbo>(), 80);
        assert_eq!(std::mem::offset_of!(GlobalUbo, projection_view), 0);
        assert_eq!(std::mem::offset_of!(GlobalUbo, light_direction), 64);
    }

    #[test]
    fn ubo_is_pod() {
        let ubo = GlobalUbo::default();
        let bytes = bytemuck::bytes_of(&ubo);
        assert_eq!(bytes.len(), 80);
    }
}
