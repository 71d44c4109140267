use serde::{Deserialize, Serialize};

/// Assign uncovered positive parent flux ("stray flux") to the templates.
pub const ASSIGN_STRAYFLUX: u32 = 0x1;
/// Give stray flux to point sources only when no extended source takes any.
pub const STRAYFLUX_TO_POINT_SOURCES_WHEN_NECESSARY: u32 = 0x2;
/// Always include point sources in the stray flux split.
pub const STRAYFLUX_TO_POINT_SOURCES_ALWAYS: u32 = 0x4;
/// Split stray flux by 1/(1+r^2) of the distance to each template
/// footprint, instead of the distance to each peak.
pub const STRAYFLUX_R_TO_FOOTPRINT: u32 = 0x8;
/// Give each stray pixel entirely to the footprint with the smallest
/// Manhattan distance.
pub const STRAYFLUX_NEAREST_FOOTPRINT: u32 = 0x10;
/// Reserved for trimming stray flux far from any template; currently a
/// no-op, kept for call compatibility.
pub const STRAYFLUX_TRIM: u32 = 0x20;

/// How stray flux is split among templates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrayFluxPolicy {
    /// 1/(1+r^2) of the distance to each peak.
    #[default]
    RToPeak,
    /// 1/(1+r^2) of the minimum distance to each template footprint.
    RToFootprint,
    /// All flux to the footprint with the smallest Manhattan distance.
    NearestFootprint,
}

/// Host-facing stray flux configuration; lowers to the raw options bitset
/// consumed by `apportion_flux`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrayFluxConfig {
    /// Run the stray flux pass at all.
    #[serde(default = "default_assign")]
    pub assign_stray_flux: bool,
    /// Splitting policy for stray pixels.
    #[serde(default)]
    pub policy: StrayFluxPolicy,
    /// Include point sources only when no extended source contributes.
    #[serde(default = "default_when_necessary")]
    pub to_point_sources_when_necessary: bool,
    /// Always include point sources.
    #[serde(default)]
    pub to_point_sources_always: bool,
    /// Contributions below this fraction of the total are dropped.
    #[serde(default = "default_clip_fraction")]
    pub clip_stray_flux_fraction: f64,
}

fn default_assign() -> bool {
    true
}
fn default_when_necessary() -> bool {
    true
}
fn default_clip_fraction() -> f64 {
    1e-3
}

impl Default for StrayFluxConfig {
    fn default() -> Self {
        Self {
            assign_stray_flux: true,
            policy: StrayFluxPolicy::default(),
            to_point_sources_when_necessary: true,
            to_point_sources_always: false,
            clip_stray_flux_fraction: 1e-3,
        }
    }
}

impl StrayFluxConfig {
    /// The options bitset equivalent of this configuration.
    pub fn to_bits(&self) -> u32 {
        let mut bits = 0;
        if self.assign_stray_flux {
            bits |= ASSIGN_STRAYFLUX;
        }
        if self.to_point_sources_when_necessary {
            bits |= STRAYFLUX_TO_POINT_SOURCES_WHEN_NECESSARY;
        }
        if self.to_point_sources_always {
            bits |= STRAYFLUX_TO_POINT_SOURCES_ALWAYS;
        }
        match self.policy {
            StrayFluxPolicy::RToPeak => {}
            StrayFluxPolicy::RToFootprint => bits |= STRAYFLUX_R_TO_FOOTPRINT,
            StrayFluxPolicy::NearestFootprint => bits |= STRAYFLUX_NEAREST_FOOTPRINT,
        }
        bits
    }
}
