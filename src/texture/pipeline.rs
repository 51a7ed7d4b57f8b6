//! Per-texture transform pipeline
//!
//! Runs in a fixed order: resolution scaling, format selection, mipmap
//! flagging, compression tagging. Each step is skipped when disabled.

use image::imageops::FilterType;
use image::DynamicImage;

use super::capabilities::CompressionTag;
use super::config::TextureOptimizationConfig;
use super::role::TextureRole;
use super::texture::{format_of, PixelFormat, Texture, TextureFilter, TextureVariant};

/// Memory of a mipmapped variant relative to its base level, in percent
pub const MIPMAP_MEMORY_PERCENT: u64 = 133;

/// Target dimensions for a scaled variant
///
/// # Examples
/// ```
/// use sceneopt::texture::pipeline::scaled_dimensions;
///
/// assert_eq!(scaled_dimensions(1024, 512, 0.5, 4096), (512, 256));
/// assert_eq!(scaled_dimensions(4096, 4096, 0.8, 1024), (1024, 1024));
/// assert_eq!(scaled_dimensions(3, 3, 0.1, 1024), (1, 1));
/// ```
pub fn scaled_dimensions(width: u32, height: u32, scale: f32, max_size: u32) -> (u32, u32) {
    let scale_axis = |dim: u32| -> u32 {
        let scaled = (dim as f64 * scale as f64).floor() as u32;
        scaled.max(1).min(max_size.max(1))
    };
    (scale_axis(width), scale_axis(height))
}

/// Channel format for a role
pub fn select_format(config: &TextureOptimizationConfig, role: TextureRole) -> PixelFormat {
    let preferred = &config.preferred_formats;
    match role {
        TextureRole::Roughness | TextureRole::AmbientOcclusion => preferred.roughness,
        TextureRole::Metalness => preferred.metalness,
        TextureRole::Normal => preferred.normal,
        _ => preferred.diffuse,
    }
}

/// Re-encode pixel data into `format`
pub fn convert_format(image: &DynamicImage, format: PixelFormat) -> DynamicImage {
    if format_of(image) == format {
        return image.clone();
    }
    match format {
        PixelFormat::Red => DynamicImage::ImageLuma8(image.to_luma8()),
        PixelFormat::Rg => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        PixelFormat::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
        PixelFormat::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

/// Estimated footprint of a variant in bytes
pub fn estimate_memory(width: u32, height: u32, format: PixelFormat, mipmapped: bool) -> u64 {
    let base = width as u64 * height as u64 * format.bytes_per_pixel();
    if mipmapped {
        base.saturating_mul(MIPMAP_MEMORY_PERCENT) / 100
    } else {
        base
    }
}

/// Run the full pipeline for one (texture, role, level)
///
/// `compression` is the tag resolved once from backend capabilities.
pub fn build_variant(
    texture: &Texture,
    role: TextureRole,
    lod_level: u32,
    config: &TextureOptimizationConfig,
    compression: CompressionTag,
) -> TextureVariant {
    let mut variant = TextureVariant::passthrough(texture, role, lod_level);

    // 1. Resolution scaling
    let scale = config.scale_for_level(lod_level);
    if config.enable_resolution_scaling && scale < 1.0 {
        let (width, height) = scaled_dimensions(texture.width(), texture.height(), scale, config.max_texture_size);
        variant.image = variant
            .image
            .take()
            .map(|image| image.resize_exact(width, height, FilterType::CatmullRom));
        variant.width = width;
        variant.height = height;
    }

    // 2. Format selection
    if config.enable_format_optimization {
        let format = select_format(config, role);
        variant.image = variant.image.take().map(|image| convert_format(&image, format));
        variant.format = format;
    }

    // 3. Mipmap flagging
    if config.enable_mipmaps {
        variant.generate_mipmaps = true;
        variant.min_filter = config.mipmap_filter;
        variant.mag_filter = TextureFilter::Linear;
    }

    // 4. Compression tagging
    if config.enable_compression {
        variant.compression = compression;
        variant.flip_y = false;
        variant.premultiply_alpha = false;
    }

    log::trace!(
        "Optimized texture '{}' ({}, LOD{}): {}x{} -> {}x{} {:?} {:?}",
        texture.name(),
        role,
        lod_level,
        texture.width(),
        texture.height(),
        variant.width,
        variant.height,
        variant.format,
        variant.compression,
    );

    variant
}

/// Estimated footprint of a built variant
pub fn variant_memory(variant: &TextureVariant) -> u64 {
    estimate_memory(variant.width, variant.height, variant.format, variant.generate_mipmaps)
}
