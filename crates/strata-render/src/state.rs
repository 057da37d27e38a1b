//! Bind descriptors for each render state.

use strata_mesh_cpu::RenderState;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Off,
    Alpha,
}

/// What a backend sets up when a state is bound, and undoes on release.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateDesc {
    pub depth_write: bool,
    pub cull_back: bool,
    /// Fragments with alpha below this are discarded.
    pub alpha_cutoff: Option<f32>,
    pub blend: BlendMode,
    /// Constant applied to every fragment's alpha (liquids, ice).
    pub alpha_scale: f32,
    /// Name of the texture the state samples.
    pub texture: &'static str,
}

impl StateDesc {
    const OPAQUE: StateDesc = StateDesc {
        depth_write: true,
        cull_back: true,
        alpha_cutoff: None,
        blend: BlendMode::Off,
        alpha_scale: 1.0,
        texture: "terrain",
    };

    const CUTOUT: StateDesc = StateDesc {
        alpha_cutoff: Some(0.5),
        cull_back: false,
        ..StateDesc::OPAQUE
    };
}

#[derive(Clone, Debug)]
pub struct RenderStateTable {
    descs: [StateDesc; RenderState::COUNT],
}

impl Default for RenderStateTable {
    fn default() -> Self {
        let mut descs = [StateDesc::OPAQUE; RenderState::COUNT];
        descs[RenderState::Vine.index()] = StateDesc::CUTOUT;
        descs[RenderState::AlphaTest.index()] = StateDesc::CUTOUT;
        descs[RenderState::LowDetail.index()] = StateDesc {
            texture: "low_detail",
            ..StateDesc::OPAQUE
        };
        descs[RenderState::Ice.index()] = StateDesc {
            blend: BlendMode::Alpha,
            alpha_scale: 0.75,
            ..StateDesc::OPAQUE
        };
        descs[RenderState::Water.index()] = StateDesc {
            depth_write: false,
            cull_back: false,
            blend: BlendMode::Alpha,
            alpha_scale: 0.6,
            ..StateDesc::OPAQUE
        };
        descs[RenderState::AlphaBlend.index()] = StateDesc {
            depth_write: false,
            blend: BlendMode::Alpha,
            texture: "white",
            ..StateDesc::OPAQUE
        };
        descs[RenderState::EntityOverlay.index()] = StateDesc {
            depth_write: false,
            cull_back: false,
            blend: BlendMode::Alpha,
            texture: "white",
            ..StateDesc::OPAQUE
        };
        Self { descs }
    }
}

impl RenderStateTable {
    #[inline]
    pub fn desc(&self, state: RenderState) -> &StateDesc {
        &self.descs[state.index()]
    }

    pub fn set(&mut self, state: RenderState, desc: StateDesc) {
        self.descs[state.index()] = desc;
    }
}
