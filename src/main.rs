use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mediascatter::config::{LayoutFile, MediaOptions, TextOptions, WidgetSpec};
use mediascatter::{BundleReport, DashboardBuilder};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "mediascatter")]
#[command(author, version, about = "Build an offline HTML scatter plot linked to per-sample images, videos and annotations")]
struct Args {
    /// CSV file with one row per sample
    data: PathBuf,

    /// JSON layout file (config and widgets); flags below override it
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Output HTML file; media is copied next to it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Image panel for a path column (repeatable)
    #[arg(long = "image", value_name = "COL")]
    images: Vec<String>,

    /// Video panel for a path column (repeatable)
    #[arg(long = "video", value_name = "COL")]
    videos: Vec<String>,

    /// Add a text panel showing every non-path column
    #[arg(long)]
    text: bool,

    /// Add the index slider
    #[arg(long)]
    slider: bool,

    /// Add the show/hide legends button
    #[arg(long)]
    legend: bool,

    /// Add the play/pause videos button
    #[arg(long)]
    video_toggle: bool,

    /// Column used to color points
    #[arg(long, value_name = "COL")]
    category: Option<String>,

    /// Initial X axis column
    #[arg(short = 'x', long = "x-axis", value_name = "COL")]
    x_axis: Option<String>,

    /// Initial Y axis column
    #[arg(short = 'y', long = "y-axis", value_name = "COL")]
    y_axis: Option<String>,

    /// Column offered by the axis dropdowns (repeatable; default: all numeric)
    #[arg(long = "axis", value_name = "COL")]
    axes: Vec<String>,

    /// Parent directories of each media file kept inside the bundle
    #[arg(long, value_name = "N")]
    copy_levels: Option<usize>,

    /// Reference media where it is instead of copying it
    #[arg(long)]
    no_copy: bool,

    /// Don't insert the 0-based `id` column
    #[arg(long)]
    no_id: bool,

    /// Empty the output directory first
    #[arg(long)]
    clean: bool,

    /// Open the page in the browser when done
    #[arg(long)]
    open: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Errors only, no summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(report) => {
            if !args.quiet {
                print_summary(&report);
            }
            if args.open {
                if let Err(e) = open::that(&report.html) {
                    eprintln!("Failed to open {}: {}", report.html.display(), e);
                }
            }
        }
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> mediascatter::Result<BundleReport> {
    let mut layout = match &args.layout {
        Some(path) => LayoutFile::from_path(path)?,
        None => LayoutFile::default(),
    };
    apply_flags(args, &mut layout);

    let table = mediascatter::table::csv::read_path(&args.data)?;
    let mut builder = DashboardBuilder::from_layout(table, &layout)?;

    let pb = if args.quiet || builder.media_count() == 0 {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(builder.media_count() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    };
    let bar = pb.clone();
    builder.on_copy(move |event| {
        bar.inc(1);
        if let Some(name) = event.source.file_name() {
            bar.set_message(name.to_string_lossy().into_owned());
        }
    });

    let dashboard = builder.wire()?;
    pb.finish_and_clear();
    dashboard.write(None)
}

/// Command-line flags win over the layout file
fn apply_flags(args: &Args, layout: &mut LayoutFile) {
    let config = &mut layout.config;
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(category) = &args.category {
        config.category_column = Some(category.clone());
    }
    if let Some(x) = &args.x_axis {
        config.x_axis = Some(x.clone());
    }
    if let Some(y) = &args.y_axis {
        config.y_axis = Some(y.clone());
    }
    if !args.axes.is_empty() {
        config.dropdown_options = Some(args.axes.clone());
    }
    if let Some(levels) = args.copy_levels {
        config.copy_dir_levels = levels;
    }
    if args.no_copy {
        config.copy_media = false;
    }
    if args.no_id {
        config.add_id_column = false;
    }
    if args.clean {
        config.clear_output_dir = true;
    }

    for column in &args.images {
        layout.widgets.push(WidgetSpec::Image {
            column: column.clone(),
            options: MediaOptions::default(),
        });
    }
    for column in &args.videos {
        layout.widgets.push(WidgetSpec::Video {
            column: column.clone(),
            options: MediaOptions::default(),
        });
    }
    if args.text {
        layout.widgets.push(WidgetSpec::Text {
            options: TextOptions::default(),
        });
    }
    layout.slider |= args.slider;
    layout.legend |= args.legend;
    layout.video_toggle |= args.video_toggle;
}

fn print_summary(report: &BundleReport) {
    let summary = report.summary();

    eprintln!("\x1b[1mmediascatter\x1b[0m");
    eprintln!("{}", "─".repeat(60));
    eprintln!("  Page:     {}", report.html.display());
    eprintln!("  Copied:   {} media file(s)", report.copied);
    eprintln!("  Bundle:   {} file(s), {}", summary.files, format_bytes(summary.bytes));
    if report.warnings.is_empty() {
        eprintln!("  \x1b[32m✓ No warnings\x1b[0m");
    } else {
        eprintln!("  \x1b[33m? Warnings: {}\x1b[0m", report.warnings.len());
    }
    eprintln!("{}", "─".repeat(60));
    eprintln!("\x1b[90mZip {} to share it.\x1b[0m", report.output_dir.display());
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
