#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod measure;
pub mod render;
pub mod theme;

pub use config::{load_config, ChartConfig, Config, LabelConfig, LineStyle};
pub use error::ChartError;
pub use ir::{ChartData, SegmentData};
pub use layout::{
    compute_layout, compute_outer_label_layout, leader_line_paths, segment_angle, AngleOptions,
    ChartLayout, Hemisphere, LabelRecord, LayoutContext, LeaderLine, PathKind, Quadrant, Segment,
};
pub use measure::{MetricsTable, SystemFonts, TextMeasurer};
pub use render::render_svg;
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
