use crate::chart::{ChartKind, ChartOptions, build_chart};
use crate::config::{Config, load_config};
use crate::data::RecordStore;
use crate::hierarchy::EntryId;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::renderer::{ChartColors, RendererKind, make_renderer};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kinchart", version, about = "Genealogy charts from JSON records")]
pub struct Args {
    /// Input JSON file with `indis` and `fams`, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Chart type
    #[arg(long = "chart", value_enum)]
    pub chart: Option<ChartArg>,

    /// Start individual. Defaults to the first individual in the input.
    #[arg(long = "indi", conflicts_with = "fam")]
    pub indi: Option<String>,

    /// Start family
    #[arg(long = "fam")]
    pub fam: Option<String>,

    /// Node style
    #[arg(long = "renderer", value_enum)]
    pub renderer: Option<RendererArg>,

    /// Lay out generations left to right
    #[arg(long = "horizontal")]
    pub horizontal: bool,

    /// Box coloring
    #[arg(long = "colors", value_enum)]
    pub colors: Option<ColorsArg>,

    /// Generation number of the start node
    #[arg(long = "base-generation", allow_negative_numbers = true)]
    pub base_generation: Option<i32>,

    #[arg(long = "hide-ids")]
    pub hide_ids: bool,

    #[arg(long = "hide-sex")]
    pub hide_sex: bool,

    /// Sort children and marriages by date
    #[arg(long = "normalize")]
    pub normalize: bool,

    /// Log progress to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ChartArg {
    Hourglass,
    Ancestors,
    Descendants,
    Relatives,
}

impl From<ChartArg> for ChartKind {
    fn from(value: ChartArg) -> Self {
        match value {
            ChartArg::Hourglass => ChartKind::Hourglass,
            ChartArg::Ancestors => ChartKind::Ancestors,
            ChartArg::Descendants => ChartKind::Descendants,
            ChartArg::Relatives => ChartKind::Relatives,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RendererArg {
    Detailed,
    Simple,
    Circle,
}

impl From<RendererArg> for RendererKind {
    fn from(value: RendererArg) -> Self {
        match value {
            RendererArg::Detailed => RendererKind::Detailed,
            RendererArg::Simple => RendererKind::Simple,
            RendererArg::Circle => RendererKind::Circle,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ColorsArg {
    None,
    Generation,
    Sex,
    Ethnicity,
    Languages,
    Language,
}

impl From<ColorsArg> for ChartColors {
    fn from(value: ColorsArg) -> Self {
        match value {
            ColorsArg::None => ChartColors::NoColor,
            ColorsArg::Generation => ChartColors::ByGeneration,
            ColorsArg::Sex => ChartColors::BySex,
            ColorsArg::Ethnicity => ChartColors::ByEthnicity,
            ColorsArg::Languages => ChartColors::ByNrLanguages,
            ColorsArg::Language => ChartColors::ByLanguage,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_args(&mut config, &args);

    let input = read_input(args.input.as_deref())?;
    let mut data = RecordStore::from_json(&input)?;
    if config.chart.normalize {
        data.normalize();
    }
    data.apply_display_flags(config.chart.display);

    let start = match (&args.indi, &args.fam) {
        (Some(indi), _) => Some(EntryId::indi(indi.as_str())),
        (None, Some(fam)) => Some(EntryId::fam(fam.as_str())),
        (None, None) => None,
    };
    let options = ChartOptions {
        kind: config.chart.kind,
        start,
        layout: config.layout.options(),
    };
    let mut renderer = make_renderer(config.chart.renderer, config.renderer_options());
    let layout = build_chart(&data, renderer.as_mut(), &options)?;

    match args.output_format {
        OutputFormat::Json => {
            write_layout_dump(args.output.as_deref(), &layout)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &data, renderer.as_mut(), &config.theme);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &data, renderer.as_mut(), &config.theme);
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

/// Command-line flags win over the config file.
fn apply_args(config: &mut Config, args: &Args) {
    if let Some(chart) = args.chart {
        config.chart.kind = chart.into();
    }
    if let Some(renderer) = args.renderer {
        config.chart.renderer = renderer.into();
    }
    if let Some(colors) = args.colors {
        config.chart.colors = colors.into();
    }
    if let Some(base) = args.base_generation {
        config.layout.base_generation = base;
    }
    if args.horizontal {
        config.layout.horizontal = true;
    }
    if args.hide_ids {
        config.chart.display.hide_ids = true;
    }
    if args.hide_sex {
        config.chart.display.hide_sex = true;
    }
    if args.normalize {
        config.chart.normalize = true;
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
