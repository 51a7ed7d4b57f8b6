//! Materials and their role-keyed texture slots
//!
//! A slot keeps the source texture it was authored with separately from the
//! optimized variant currently bound, so re-optimizing for another LOD level
//! always starts from the source.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::texture::{CacheKey, Texture, TextureRole, TextureVariant};

/// Shading model of a material
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Physically based (metalness/roughness)
    Standard,
    /// Unlit
    Basic,
    Phong,
    /// Anything the optimizer does not know how to handle
    Unsupported,
}

impl MaterialKind {
    /// Whether texture optimization applies to this kind
    pub fn is_optimizable(self) -> bool {
        !matches!(self, MaterialKind::Unsupported)
    }
}

/// An optimized variant bound into a slot, with the cache key it came from
#[derive(Clone, Debug)]
pub struct BoundVariant {
    pub key: CacheKey,
    pub texture: Arc<TextureVariant>,
}

/// One texture slot of a material
#[derive(Clone, Debug)]
pub struct TextureSlot {
    source: Arc<Texture>,
    bound: Option<BoundVariant>,
}

impl TextureSlot {
    pub fn new(source: Arc<Texture>) -> Self {
        Self { source, bound: None }
    }

    /// The authored texture; never replaced by optimization
    pub fn source(&self) -> &Arc<Texture> {
        &self.source
    }

    pub fn bound(&self) -> Option<&BoundVariant> {
        self.bound.as_ref()
    }

    pub fn bind(&mut self, key: CacheKey, texture: Arc<TextureVariant>) {
        self.bound = Some(BoundVariant { key, texture });
    }

    /// Drop the bound variant so the slot samples its source again
    pub fn unbind(&mut self) -> Option<BoundVariant> {
        self.bound.take()
    }
}

/// A surface material attached to a mesh
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    kind: MaterialKind,
    slots: BTreeMap<TextureRole, TextureSlot>,
}

impl Material {
    pub fn new(name: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            name: name.into(),
            kind,
            slots: BTreeMap::new(),
        }
    }

    /// Physically based material with no textures
    pub fn standard(name: impl Into<String>) -> Self {
        Self::new(name, MaterialKind::Standard)
    }

    /// Builder-style [`set_texture`](Material::set_texture)
    pub fn with_texture(mut self, role: TextureRole, texture: Arc<Texture>) -> Self {
        self.set_texture(role, texture);
        self
    }

    /// Assign a source texture to a slot, clearing any bound variant
    pub fn set_texture(&mut self, role: TextureRole, texture: Arc<Texture>) {
        self.slots.insert(role, TextureSlot::new(texture));
    }

    pub fn remove_texture(&mut self, role: TextureRole) -> Option<TextureSlot> {
        self.slots.remove(&role)
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn slot(&self, role: TextureRole) -> Option<&TextureSlot> {
        self.slots.get(&role)
    }

    pub fn slot_mut(&mut self, role: TextureRole) -> Option<&mut TextureSlot> {
        self.slots.get_mut(&role)
    }

    pub fn slots(&self) -> impl Iterator<Item = (TextureRole, &TextureSlot)> {
        self.slots.iter().map(|(role, slot)| (*role, slot))
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = (TextureRole, &mut TextureSlot)> {
        self.slots.iter_mut().map(|(role, slot)| (*role, slot))
    }

    /// Cache keys of every bound variant
    pub fn bound_keys(&self) -> impl Iterator<Item = CacheKey> + '_ {
        self.slots.values().filter_map(|slot| slot.bound().map(|b| b.key))
    }

    /// Unbind every slot; returns how many were bound
    pub fn unbind_all(&mut self) -> usize {
        self.slots
            .values_mut()
            .filter_map(|slot| slot.unbind())
            .count()
    }
}
