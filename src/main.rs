use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use env_logger::{Builder, Env};
use log::{debug, info, LevelFilter};

use medical_data_visualizer::config::DATA_FILE_NAME;
use medical_data_visualizer::{draw_cat_plot, draw_heat_map, Config, Result};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct VisualizerArgs {
    #[arg(short, long, default_value = DATA_FILE_NAME, help = "Input CSV path")]
    input: PathBuf,
    #[arg(short, long, default_value = ".", help = "Directory the images are written to")]
    output_dir: PathBuf,
    #[arg(short, long, value_enum, default_value_t = PlotKind::All, help = "Which plot to draw")]
    plot: PlotKind,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Verbose level")]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlotKind {
    Cat,
    Heat,
    All,
}

fn main() -> Result<()> {
    let cli = VisualizerArgs::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter("MEDVIZ_LOG");
    Builder::new()
        .filter(Some("medical_data_visualizer"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);

    let start_time = Instant::now();
    let config = Config::new(cli.input, cli.output_dir);

    if matches!(cli.plot, PlotKind::Cat | PlotKind::All) {
        let figure = draw_cat_plot(&config)?;
        info!("catplot has {} bars", figure.counts().len());
    }
    if matches!(cli.plot, PlotKind::Heat | PlotKind::All) {
        let figure = draw_heat_map(&config)?;
        info!("heatmap covers {} columns", figure.correlation().len());
    }

    info!("done in {:?}", start_time.elapsed());
    Ok(())
}
