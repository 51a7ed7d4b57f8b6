//! Source textures and optimized texture variants

use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

use super::capabilities::CompressionTag;
use super::role::TextureRole;

/// Stable identity of a source texture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Channel layout of texel data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bytes per texel, used for memory estimates
    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rg => 2,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Sampler filter modes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    /// Trilinear
    LinearMipmapLinear,
}

/// A texture owned by the material system
///
/// Pixel data is optional: descriptor-only textures (pixels already resident
/// on the GPU) still carry dimensions and format for estimates.
#[derive(Clone, Debug)]
pub struct Texture {
    id: TextureId,
    name: String,
    width: u32,
    height: u32,
    format: PixelFormat,
    image: Option<DynamicImage>,
}

impl Texture {
    /// Wrap decoded pixel data
    pub fn from_image(id: TextureId, name: impl Into<String>, image: DynamicImage) -> Self {
        let format = format_of(&image);
        Self {
            id,
            name: name.into(),
            width: image.width(),
            height: image.height(),
            format,
            image: Some(image),
        }
    }

    /// Build from raw RGBA8 bytes
    pub fn from_rgba8(id: TextureId, name: impl Into<String>, width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let buffer = image::RgbaImage::from_raw(width, height, bytes).ok_or_else(|| {
            Error::InvalidImage(format!("buffer too small for {}x{} RGBA", width, height))
        })?;
        Ok(Self::from_image(id, name, DynamicImage::ImageRgba8(buffer)))
    }

    /// Decode an image file from disk
    pub fn open(id: TextureId, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::from_image(id, name, image))
    }

    /// Texture known only by its dimensions and format
    pub fn descriptor(id: TextureId, name: impl Into<String>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            id,
            name: name.into(),
            width,
            height,
            format,
            image: None,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    /// Uncompressed footprint of the source at full resolution
    pub fn memory_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.format.bytes_per_pixel()
    }
}

/// Channel format of decoded image data
pub(crate) fn format_of(image: &DynamicImage) -> PixelFormat {
    match image.color().channel_count() {
        1 => PixelFormat::Red,
        2 => PixelFormat::Rg,
        3 => PixelFormat::Rgb,
        _ => PixelFormat::Rgba,
    }
}

/// Optimized copy of a source texture for one role and LOD level
///
/// Variants are created and owned by the texture cache; materials hold shared
/// handles to them while bound.
#[derive(Clone, Debug)]
pub struct TextureVariant {
    pub source: TextureId,
    pub role: TextureRole,
    pub lod_level: u32,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub generate_mipmaps: bool,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub compression: CompressionTag,
    pub flip_y: bool,
    pub premultiply_alpha: bool,
    pub image: Option<DynamicImage>,
}

impl TextureVariant {
    /// Variant identical to its source
    pub fn passthrough(texture: &Texture, role: TextureRole, lod_level: u32) -> Self {
        Self {
            source: texture.id(),
            role,
            lod_level,
            width: texture.width(),
            height: texture.height(),
            format: texture.format(),
            generate_mipmaps: false,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            compression: CompressionTag::Uncompressed,
            flip_y: true,
            premultiply_alpha: false,
            image: texture.image().cloned(),
        }
    }

    /// Texel count at the base level
    pub fn resolution(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
