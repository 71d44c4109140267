pub mod apportion;
pub mod chamfer;
pub mod edge;
pub mod median;
pub mod monotonic;
pub mod options;
pub mod stray;
pub mod symmetrize;
pub mod template;

pub use apportion::{apportion_flux, sum_templates, ApportionResult};
pub use chamfer::nearest_footprint;
pub use edge::{get_significant_edge_pixels, has_significant_flux_at_edge};
pub use median::median_filter;
pub use monotonic::make_monotonic;
pub use options::{
    StrayFluxConfig, StrayFluxPolicy, ASSIGN_STRAYFLUX, STRAYFLUX_NEAREST_FOOTPRINT,
    STRAYFLUX_R_TO_FOOTPRINT, STRAYFLUX_TO_POINT_SOURCES_ALWAYS,
    STRAYFLUX_TO_POINT_SOURCES_WHEN_NECESSARY, STRAYFLUX_TRIM,
};
pub use stray::find_stray_flux;
pub use symmetrize::symmetrize_footprint;
pub use template::{build_symmetric_template, TemplateResult};
