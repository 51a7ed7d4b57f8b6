//! Material texture slots and their importance

use serde::{Deserialize, Serialize};

/// The material slot a texture fills
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureRole {
    /// Primary color (albedo/diffuse) map
    Map,
    Normal,
    Roughness,
    Metalness,
    AmbientOcclusion,
    Emissive,
    Bump,
    Displacement,
    Alpha,
    Light,
    Environment,
}

impl TextureRole {
    pub const ALL: [TextureRole; 11] = [
        TextureRole::Map,
        TextureRole::Normal,
        TextureRole::Roughness,
        TextureRole::Metalness,
        TextureRole::AmbientOcclusion,
        TextureRole::Emissive,
        TextureRole::Bump,
        TextureRole::Displacement,
        TextureRole::Alpha,
        TextureRole::Light,
        TextureRole::Environment,
    ];

    /// Eviction priority under the importance strategy (higher stays longer)
    pub fn importance(self) -> f32 {
        match self {
            TextureRole::Map => 1.0,
            TextureRole::Normal => 0.8,
            TextureRole::Alpha => 0.8,
            TextureRole::Emissive => 0.7,
            TextureRole::Roughness => 0.6,
            TextureRole::Metalness => 0.6,
            TextureRole::Environment => 0.6,
            TextureRole::Bump => 0.5,
            TextureRole::Light => 0.5,
            TextureRole::AmbientOcclusion => 0.4,
            TextureRole::Displacement => 0.3,
        }
    }

    /// Roles whose data is a single scalar channel
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TextureRole::Roughness | TextureRole::Metalness | TextureRole::AmbientOcclusion
        )
    }

    /// Slot name as used by the material system
    pub fn slot_name(self) -> &'static str {
        match self {
            TextureRole::Map => "map",
            TextureRole::Normal => "normalMap",
            TextureRole::Roughness => "roughnessMap",
            TextureRole::Metalness => "metalnessMap",
            TextureRole::AmbientOcclusion => "aoMap",
            TextureRole::Emissive => "emissiveMap",
            TextureRole::Bump => "bumpMap",
            TextureRole::Displacement => "displacementMap",
            TextureRole::Alpha => "alphaMap",
            TextureRole::Light => "lightMap",
            TextureRole::Environment => "envMap",
        }
    }
}

impl std::fmt::Display for TextureRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slot_name())
    }
}
