//! Backend texture-compression capabilities
//!
//! Capabilities are queried once when the optimizer is built. Each variant is
//! then tagged with the resolved family; encoding itself is left to the
//! rendering backend.

use serde::{Deserialize, Serialize};

/// Block-compression families a backend may support
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionFamily {
    Astc,
    /// S3TC / BCn
    Dxt,
    Etc,
    Pvrtc,
}

impl CompressionFamily {
    /// Preference order used when the choice is automatic
    pub const BY_PREFERENCE: [CompressionFamily; 4] = [
        CompressionFamily::Astc,
        CompressionFamily::Dxt,
        CompressionFamily::Etc,
        CompressionFamily::Pvrtc,
    ];
}

/// Compression annotation carried by a texture variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionTag {
    Uncompressed,
    Compressed(CompressionFamily),
}

/// Requested compression family in configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionPreference {
    #[default]
    Auto,
    Dxt,
    Etc,
    Astc,
    Pvrtc,
}

impl CompressionPreference {
    fn family(self) -> Option<CompressionFamily> {
        match self {
            CompressionPreference::Auto => None,
            CompressionPreference::Dxt => Some(CompressionFamily::Dxt),
            CompressionPreference::Etc => Some(CompressionFamily::Etc),
            CompressionPreference::Astc => Some(CompressionFamily::Astc),
            CompressionPreference::Pvrtc => Some(CompressionFamily::Pvrtc),
        }
    }
}

/// Compression extensions reported by the rendering backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionSupport {
    pub s3tc: bool,
    pub etc: bool,
    pub astc: bool,
    pub pvrtc: bool,
}

impl CompressionSupport {
    /// Backend without any compressed formats
    pub fn none() -> Self {
        Self::default()
    }

    /// Backend supporting every family
    pub fn all() -> Self {
        Self { s3tc: true, etc: true, astc: true, pvrtc: true }
    }

    pub fn supports(&self, family: CompressionFamily) -> bool {
        match family {
            CompressionFamily::Astc => self.astc,
            CompressionFamily::Dxt => self.s3tc,
            CompressionFamily::Etc => self.etc,
            CompressionFamily::Pvrtc => self.pvrtc,
        }
    }

    pub fn any(&self) -> bool {
        self.s3tc || self.etc || self.astc || self.pvrtc
    }

    /// Best supported family in preference order
    pub fn best(&self) -> Option<CompressionFamily> {
        CompressionFamily::BY_PREFERENCE
            .into_iter()
            .find(|family| self.supports(*family))
    }

    /// Tag to apply for a requested preference
    ///
    /// An explicit family the backend lacks falls back to uncompressed.
    pub fn resolve(&self, preference: CompressionPreference) -> CompressionTag {
        let family = match preference.family() {
            None => self.best(),
            Some(family) if self.supports(family) => Some(family),
            Some(_) => None,
        };
        family.map_or(CompressionTag::Uncompressed, CompressionTag::Compressed)
    }
}
