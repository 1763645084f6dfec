use crate::config::{load_config, Config};
use crate::ir::ChartData;
use crate::layout::compute_layout;
use crate::measure::{MetricsTable, SystemFonts, TextMeasurer};
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ringchart", version, about = "Donut chart renderer with smart outer labels")]
pub struct Args {
    /// Input data file (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (chart geometry, label options, theme)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Use the built-in width table instead of system fonts; deterministic
    /// across machines, useful on hosts without fonts installed.
    #[arg(long = "fast-metrics")]
    pub fast_metrics: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config: Config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.chart.width = width;
    }
    if let Some(height) = args.height {
        config.chart.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let data: ChartData = json5::from_str(&input)
        .map_err(|err| anyhow::anyhow!("failed to parse chart data: {err}"))?;

    let table = MetricsTable;
    let measurer: &dyn TextMeasurer = if args.fast_metrics {
        &table
    } else {
        SystemFonts::shared()
    };

    let layout = compute_layout(&data, &config.chart, &config.theme, measurer)?;
    let svg = render_svg(&layout, &config.theme, &config.chart);

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            #[cfg(feature = "png")]
            {
                let output = args
                    .output
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("PNG output requires --output"))?;
                crate::render::write_output_png(&svg, &output, &config.theme)?;
            }
            #[cfg(not(feature = "png"))]
            anyhow::bail!("this build has no PNG support (enable the `png` feature)");
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
