use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use gapfill::logger;
use gapfill::{
    CancellationToken, CsvReadOptions, CsvSink, DataFrame, GapKind, InterpolateOptions, LimitArea,
    LimitDirection, Method, ParquetSink, export, read_csv,
};

#[derive(Parser)]
#[command(
    name = "gapfill",
    version,
    about = "Fill missing values in CSV columns and write CSV/TSV/Parquet"
)]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also write log events to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill gaps in one or more inputs and write the result.
    Fill(Box<FillArgs>),
    /// Print per-column missing counts and gaps.
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Parquet,
    Csv,
    Tsv,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

#[derive(Parser, Clone)]
struct ColumnTypeArgs {
    /// Columns read as text (comma-separated).
    #[arg(long = "text-columns", value_delimiter = ',')]
    text_columns: Vec<String>,

    /// Columns read as 64-bit integers (comma-separated).
    #[arg(long = "int-columns", value_delimiter = ',')]
    int_columns: Vec<String>,

    /// Columns read as RFC 3339 timestamps (comma-separated).
    #[arg(long = "timestamp-columns", value_delimiter = ',')]
    timestamp_columns: Vec<String>,
}

#[derive(Parser, Clone)]
struct FillArgs {
    /// Input files or directories (recurses directories for .csv/.tsv).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (computed file names).
    #[arg(long, conflicts_with = "out")]
    out_dir: Option<PathBuf>,

    /// Output file (only valid with a single input).
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// JSON file holding interpolation options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// forward_fill, backward_fill or linear.
    #[arg(long)]
    method: Option<Method>,

    /// Maximum number of cells filled per gap.
    #[arg(long)]
    limit: Option<usize>,

    /// forward, backward or both.
    #[arg(long)]
    limit_direction: Option<LimitDirection>,

    /// inner or outer.
    #[arg(long)]
    limit_area: Option<LimitArea>,

    /// First row to consider; negative counts from the end.
    #[arg(long, allow_hyphen_values = true)]
    start: Option<isize>,

    /// Last row to consider (inclusive); negative counts from the end.
    #[arg(long, allow_hyphen_values = true)]
    end: Option<isize>,

    /// Only fill these float columns (comma-separated).
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    #[command(flatten)]
    types: ColumnTypeArgs,

    /// Write header row (CSV/TSV only).
    #[arg(long = "headers", action = ArgAction::SetTrue, default_value_t = true)]
    headers: bool,
    /// Disable header row (CSV/TSV only).
    #[arg(long = "no-headers", action = ArgAction::SetFalse, overrides_with = "headers")]
    _no_headers: bool,

    /// Parquet row group size (rows).
    #[arg(long)]
    parquet_row_group_size: Option<usize>,

    /// Give up on a file after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Number of concurrent worker threads.
    #[arg(long)]
    jobs: Option<usize>,

    /// Stop on first error.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Parser, Clone)]
struct InspectArgs {
    input: PathBuf,

    #[command(flatten)]
    types: ColumnTypeArgs,

    /// Emit JSON instead of human readable output.
    #[arg(long)]
    json: bool,
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    logger::init(&cli.log_level, cli.log_file.as_deref())?;

    match cli.command {
        Command::Fill(args) => run_fill(&args),
        Command::Inspect(args) => run_inspect(&args),
    }
}

fn run_fill(args: &FillArgs) -> Result<(), AnyError> {
    if let Some(jobs) = args.jobs {
        // Best-effort: configure global rayon pool once. Ignore error if already set.
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global();
    }

    let options = resolve_options(args)?;
    let files = discover_inputs(&args.inputs);
    if files.is_empty() {
        return Err("no .csv or .tsv inputs found".into());
    }
    if args.out.is_some() && files.len() != 1 {
        return Err("--out requires a single input".into());
    }

    let tasks: Vec<(PathBuf, PathBuf)> = match &args.out {
        Some(out) => vec![(files[0].clone(), out.clone())],
        None => files
            .into_iter()
            .map(|input| {
                let output = compute_output_path(&input, args);
                (input, output)
            })
            .collect(),
    };

    let process = |(input, output): (PathBuf, PathBuf)| -> Result<(), AnyError> {
        let _prefix = logger::set_log_prefix(input.display().to_string());
        fill_one(&input, &output, args, &options)
    };

    if args.fail_fast {
        tasks
            .into_par_iter()
            .map(process)
            .collect::<Result<Vec<_>, _>>()?;
    } else {
        let failures = tasks
            .into_par_iter()
            .map(|task| {
                let input = task.0.clone();
                let result = process(task);
                if let Err(ref err) = result {
                    error!(input = %input.display(), "{err}");
                }
                result
            })
            .filter(Result::is_err)
            .count();
        if failures > 0 {
            warn!("completed with {failures} failures");
        }
    }

    Ok(())
}

fn resolve_options(args: &FillArgs) -> Result<InterpolateOptions, AnyError> {
    let mut options = match &args.config {
        Some(path) => {
            let file = BufReader::new(File::open(path)?);
            serde_json::from_reader::<_, InterpolateOptions>(file)?
        }
        None => InterpolateOptions::new(),
    };
    if let Some(method) = args.method {
        options = options.with_method(method);
    }
    if let Some(limit) = args.limit {
        options = options.with_limit(limit);
    }
    if let Some(direction) = args.limit_direction {
        options = options.with_limit_direction(direction);
    }
    if let Some(area) = args.limit_area {
        options = options.with_limit_area(area);
    }
    if args.start.is_some() || args.end.is_some() {
        let mut range = options.range.unwrap_or_default();
        if let Some(start) = args.start {
            range = range.with_start(start);
        }
        if let Some(end) = args.end {
            range = range.with_end(end);
        }
        options = options.with_range(range);
    }
    // The frame is a private copy, so there is nothing to preserve.
    let options = options.in_place(true);
    options.validate()?;
    Ok(options)
}

fn fill_one(
    input: &Path,
    output: &Path,
    args: &FillArgs,
    options: &InterpolateOptions,
) -> Result<(), AnyError> {
    let mut token = CancellationToken::new();
    if let Some(secs) = args.timeout_secs {
        token = token.with_timeout(Duration::from_secs(secs));
    }

    let mut frame = load_frame(input, &args.types)?;
    let fills = match &args.columns {
        Some(names) => frame.interpolate_columns(&token, names.as_slice(), options)?,
        None => frame.interpolate_numeric(&token, options)?,
    };
    info!(
        rows = frame.nrows(),
        columns = fills.len(),
        output = %output.display(),
        "filled"
    );

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(output)?);
    match args.format {
        OutputFormat::Parquet => {
            let mut sink = ParquetSink::new(file);
            if let Some(rows) = args.parquet_row_group_size {
                sink = sink.with_row_group_size(rows);
            }
            export(&token, &frame, &mut sink, None)?;
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let delimiter = if args.format == OutputFormat::Tsv {
                b'\t'
            } else {
                b','
            };
            let mut sink = CsvSink::new(file)
                .with_delimiter(delimiter)
                .with_headers(args.headers);
            export(&token, &frame, &mut sink, None)?;
        }
    }
    Ok(())
}

fn load_frame(input: &Path, types: &ColumnTypeArgs) -> Result<DataFrame, AnyError> {
    let delimiter = if has_extension(input, "tsv") {
        b'\t'
    } else {
        b','
    };
    let options = CsvReadOptions::new()
        .with_delimiter(delimiter)
        .with_text_columns(types.text_columns.iter().cloned())
        .with_int_columns(types.int_columns.iter().cloned())
        .with_timestamp_columns(types.timestamp_columns.iter().cloned());
    let file = BufReader::new(File::open(input)?);
    Ok(read_csv(file, &options)?)
}

fn run_inspect(args: &InspectArgs) -> Result<(), AnyError> {
    #[derive(serde::Serialize)]
    struct GapJson {
        first: usize,
        last: usize,
        kind: GapKind,
    }
    #[derive(serde::Serialize)]
    struct ColumnJson {
        name: String,
        kind: &'static str,
        missing: usize,
        gaps: Vec<GapJson>,
    }
    #[derive(serde::Serialize)]
    struct InspectJson {
        row_count: usize,
        column_count: usize,
        columns: Vec<ColumnJson>,
    }

    let frame = load_frame(&args.input, &args.types)?;
    let mut columns = Vec::with_capacity(frame.ncols());
    for column in frame.columns() {
        let gaps = match column.as_series() {
            Some(series) => series
                .gaps(None)?
                .map(|gap| GapJson {
                    first: gap.first,
                    last: gap.last,
                    kind: gap.kind(),
                })
                .collect(),
            None => Vec::new(),
        };
        columns.push(ColumnJson {
            name: column.name().to_owned(),
            kind: column.type_name(),
            missing: column.missing_count(),
            gaps,
        });
    }

    if args.json {
        let payload = InspectJson {
            row_count: frame.nrows(),
            column_count: frame.ncols(),
            columns,
        };
        serde_json::to_writer_pretty(std::io::stdout(), &payload)?;
        println!();
    } else {
        println!("Rows: {}  Columns: {}", frame.nrows(), frame.ncols());
        for (idx, column) in columns.iter().enumerate() {
            println!(
                "[{idx:>3}] {name:<24}  {kind:<9}  missing={missing:<6}  gaps={gaps}",
                name = column.name,
                kind = column.kind,
                missing = column.missing,
                gaps = column.gaps.len(),
            );
            for gap in &column.gaps {
                println!(
                    "        rows {}..={}  {}",
                    gap.first,
                    gap.last,
                    gap.kind.as_str()
                );
            }
        }
    }
    Ok(())
}

fn discover_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
            {
                let path = entry.path();
                if path.is_file() && is_delimited(path) && !is_fill_output(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if input.is_file() && is_delimited(input) {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn is_delimited(path: &Path) -> bool {
    has_extension(path, "csv") || has_extension(path, "tsv")
}

/// Outputs of an earlier run in the same tree (`a.filled.csv`).
fn is_fill_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| Path::new(stem).extension())
        .is_some_and(|ext| ext == "filled")
}

/// `data/a.csv` becomes `a.filled.<ext>`, beside the input or in `--out-dir`.
fn compute_output_path(input: &Path, args: &FillArgs) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".to_owned(), |s| s.to_string_lossy().into_owned());
    let name = format!("{stem}.filled.{}", args.format.extension());
    args.out_dir.as_ref().map_or_else(
        || input.with_file_name(&name),
        |dir| dir.join(&name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_walk_skips_earlier_outputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.csv", "a.filled.csv", "b.tsv", "b.filled.tsv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }
        let found: Vec<_> = discover_inputs(&[dir.path().to_path_buf()])
            .into_iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, ["a.csv", "b.tsv"]);

        // Named explicitly, an earlier output is still accepted.
        let explicit = dir.path().join("a.filled.csv");
        assert_eq!(discover_inputs(std::slice::from_ref(&explicit)), vec![explicit]);
    }

    #[test]
    fn output_name_adds_filled_suffix() {
        let args = Cli::parse_from(["gapfill", "fill", "data/a.csv", "--format", "parquet"]);
        let Command::Fill(args) = args.command else {
            panic!("expected fill");
        };
        assert_eq!(
            compute_output_path(Path::new("data/a.csv"), &args),
            PathBuf::from("data/a.filled.parquet")
        );
    }
}
