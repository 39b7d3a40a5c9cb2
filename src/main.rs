use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pinfoplot::data::duration::format_duration;
use pinfoplot::{build_panels, Renderer, Sampler, Settings, SystemProvider};

#[derive(Parser, Debug)]
#[command(name = "pinfoplot", version)]
#[command(about = "Sample a process's memory, I/O and CPU usage and plot it to an image")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Pid to get info from
    #[arg(short, long, allow_negative_numbers = true)]
    pid: Option<i64>,

    /// Sampling duration, e.g. "10s" (0 means sample until the pid exits) [default: 10s]
    #[arg(short, long)]
    duration: Option<String>,

    /// Sampling interval, e.g. "50ms" [default: 50ms]
    #[arg(short, long)]
    interval: Option<String>,

    /// Output image width, e.g. "10cm" or "4in" [default: 10cm]
    #[arg(short, long)]
    width: Option<String>,

    /// Output image height, e.g. "8cm" or "3in" [default: 8cm]
    #[arg(short = 'h', long)]
    height: Option<String>,

    /// Output image resolution in dots per inch [default: 96]
    #[arg(long)]
    dpi: Option<f64>,

    /// Output image file path [default: pinfo.png]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (TOML, YAML or JSON) with the same keys as the flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "pinfoplot=trace")
    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    /// Command-line flags take precedence over file and environment settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(pid) = self.pid {
            settings.pid = pid;
        }
        if let Some(ref duration) = self.duration {
            settings.duration = duration.clone();
        }
        if let Some(ref interval) = self.interval {
            settings.interval = interval.clone();
        }
        if let Some(ref width) = self.width {
            settings.width = width.clone();
        }
        if let Some(ref height) = self.height {
            settings.height = height.clone();
        }
        if let Some(dpi) = self.dpi {
            settings.dpi = dpi;
        }
        if let Some(ref output) = self.output {
            settings.output = output.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let mut settings =
        Settings::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut settings);

    // Image size is validated before sampling so a bad size fails fast
    let render_config = settings.render_config()?;
    let sampler_config = settings.sampler_config()?;

    println!("Collecting info from pid: {}", sampler_config.pid);
    if sampler_config.until_exit() {
        println!("Sampling duration is 0, sampling until pid {} exits", sampler_config.pid);
    }

    let run = Sampler::new(SystemProvider::new())
        .run(&sampler_config)
        .with_context(|| format!("Failed to sample pid {}", sampler_config.pid))?;

    if let Some(summary) = run.summary() {
        info!(
            samples = summary.samples,
            span = %format_duration(summary.span),
            peak_rss_kb = summary.peak_resident_kb,
            peak_vms_kb = summary.peak_virtual_kb,
            mean_cpu = %format!("{:.1}%", summary.mean_cpu_percent),
            peak_cpu = %format!("{:.1}%", summary.peak_cpu_percent),
            read_ops = summary.read_ops,
            write_ops = summary.write_ops,
            "sampling finished"
        );
    }

    let panels = build_panels(&run)?;
    let renderer = Renderer::new(render_config);
    renderer
        .render(&panels)
        .with_context(|| format!("Failed to render {}", renderer.config().output.display()))?;

    println!("Wrote {}", renderer.config().output.display());
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
