use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::info;

use laplace_filter::background::{run_in_background, ProgressThrottle};
use laplace_filter::image_io::{load_image, save_image, DEFAULT_MIN_SIDE};
use laplace_filter::log_setup::setup_logging;
use laplace_filter::{
    AlphaPolicy, FilterError, FilterOptions, Kernel, LaplaceFilter, ProgressScale, ScanStrategy,
    DIAGONAL_LAPLACE_KERNEL, IDENTITY_KERNEL, LAPLACE_KERNEL, STRAIGHT_LAPLACE_KERNEL,
};

/// Highlight the edges of an image with a 3x3 Laplacian filter.
#[derive(Parser, Debug)]
#[command(name = "laplace_filter", version)]
struct Cli {
    /// Image to filter.
    input: PathBuf,

    /// Where to write the result; the format follows the extension.
    output: PathBuf,

    /// Built-in mask.
    #[arg(long, value_enum, default_value_t = KernelChoice::Laplace)]
    kernel: KernelChoice,

    /// Nine comma separated weights, row-major. Overrides --kernel.
    #[arg(long, allow_hyphen_values = true)]
    weights: Option<Kernel>,

    /// How progress values are scaled.
    #[arg(long, value_enum, default_value_t = ScaleChoice::Legacy)]
    progress_scale: ScaleChoice,

    /// Whether alpha goes through the kernel.
    #[arg(long, value_enum, default_value_t = AlphaChoice::Convolve)]
    alpha: AlphaChoice,

    /// Scan rows on this many threads (0 = all cores). Sequential when absent.
    #[arg(long)]
    threads: Option<usize>,

    /// Smallest accepted input side in pixels.
    #[arg(long, default_value_t = DEFAULT_MIN_SIDE)]
    min_side: u32,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KernelChoice {
    /// 4-neighbour Laplacian.
    Straight,
    /// 8-neighbour Laplacian.
    Laplace,
    Diagonal,
    Identity,
}

impl KernelChoice {
    fn kernel(self) -> Kernel {
        match self {
            Self::Straight => STRAIGHT_LAPLACE_KERNEL,
            Self::Laplace => LAPLACE_KERNEL,
            Self::Diagonal => DIAGONAL_LAPLACE_KERNEL,
            Self::Identity => IDENTITY_KERNEL,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScaleChoice {
    Legacy,
    Fraction,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlphaChoice {
    Convolve,
    Preserve,
}

impl Cli {
    fn options(&self) -> FilterOptions {
        let progress_scale = match self.progress_scale {
            ScaleChoice::Legacy => ProgressScale::Legacy,
            ScaleChoice::Fraction => ProgressScale::Fraction,
        };
        let alpha = match self.alpha {
            AlphaChoice::Convolve => AlphaPolicy::Convolve,
            AlphaChoice::Preserve => AlphaPolicy::Preserve,
        };
        let strategy = self.threads.map_or(ScanStrategy::Sequential, ScanStrategy::row_parallel);
        return FilterOptions::default()
            .with_progress_scale(progress_scale)
            .with_alpha(alpha)
            .with_strategy(strategy);
    }
}

/// Exit status for input the filter refuses, as opposed to I/O or runtime failures.
const EXIT_REJECTED_INPUT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let rejected =
                err.downcast_ref::<FilterError>().is_some_and(FilterError::is_precondition);
            ExitCode::from(if rejected { EXIT_REJECTED_INPUT } else { 1 })
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    setup_logging(&cli.log_level)?;

    let input = load_image(&cli.input, cli.min_side)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    let (width, height) = input.dimensions();

    let kernel = cli.weights.unwrap_or_else(|| cli.kernel.kernel());
    let options = cli.options();
    info!(%kernel, ?options, width, height, "filtering {}", cli.input.display());

    let start_time = Instant::now();
    let job = run_in_background(
        LaplaceFilter::new(kernel).with_options(options),
        input.into_raw(),
        width,
        height,
    )
    .context("failed to start the filter thread")?;
    let mut throttle = ProgressThrottle::new(0.05);
    for progress in job.progress() {
        if throttle.should_report(progress) {
            info!("progress {:.1}%", progress * 100.0);
        }
    }
    let filtered = job.join().context("filtering failed")?;
    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "filter finished");

    save_image(&cli.output, filtered, width, height)
        .with_context(|| format!("failed to save {}", cli.output.display()))?;
    info!("saved {}", cli.output.display());
    Ok(())
}
