pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod renderer;
pub mod text_metrics;
pub mod theme;

pub use chart::{ChartKind, ChartOptions, build_chart};
#[cfg(feature = "cli")]
pub use cli::run;
pub use data::{DataProvider, RecordStore};
pub use error::ChartError;
pub use hierarchy::{EntryId, HierarchyFilters, build_hierarchy};
pub use layout::ChartLayout;

/// Builds the chart described by `config` and renders it to an SVG string.
pub fn render_chart(
    data: &dyn DataProvider,
    start: Option<EntryId>,
    config: &config::Config,
) -> Result<String, ChartError> {
    let options = ChartOptions {
        kind: config.chart.kind,
        start,
        layout: config.layout.options(),
    };
    let mut renderer = renderer::make_renderer(config.chart.renderer, config.renderer_options());
    let layout = build_chart(data, renderer.as_mut(), &options)?;
    Ok(render::render_svg(&layout, data, renderer.as_mut(), &config.theme))
}
