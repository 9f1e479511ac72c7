use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xvs", version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the clamp expression for a limit/bias pair.
    Expr(ExprArgs),
    /// Print the back-shift expression.
    Backshift(BackshiftArgs),
    /// Parse a postfix expression and evaluate it for one sample.
    Eval(EvalArgs),
    /// Build a preset's filter graph over a synthetic YUV 4:2:0 source and print it as JSON.
    Plan(PlanArgs),
    /// Write v1 timecodes for clips spliced back to back.
    SpliceTc(SpliceTcArgs),
}

#[derive(Parser, Debug)]
struct ExprArgs {
    /// Largest change in 8-bit units; negative selects the soft-ratio form.
    #[arg(long, allow_hyphen_values = true)]
    limit: f64,

    /// Percentage of the filter that applies (1..=100).
    #[arg(long)]
    bias: u8,

    /// Bits per sample, 32 for float.
    #[arg(long, default_value_t = 8)]
    depth: u8,

    /// Keep only exactly equal samples untouched.
    #[arg(long)]
    exact: bool,
}

#[derive(Parser, Debug)]
struct BackshiftArgs {
    /// Shift amount in 8-bit units.
    #[arg(long)]
    back: f64,

    #[arg(long, default_value_t = 8)]
    depth: u8,
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Postfix expression over x, y and z.
    #[arg(long)]
    expr: String,

    /// Values bound to x, y, z in order.
    #[arg(allow_hyphen_values = true)]
    values: Vec<f64>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Preset JSON, e.g. {"filter": "stpresso"}.
    #[arg(long)]
    preset: PathBuf,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    #[arg(long, default_value_t = 8)]
    depth: u8,

    #[arg(long, default_value_t = 1000)]
    frames: u64,

    /// Source rate as NUM or NUM/DEN.
    #[arg(long, default_value = "24000/1001")]
    fps: String,

    /// Write the plan here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SpliceTcArgs {
    /// Output timecode file.
    #[arg(long)]
    out: PathBuf,

    /// One clip as FRAMES:NUM[/DEN], in splice order.
    #[arg(long = "clip", required = true)]
    clips: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Expr(args) => cmd_expr(args),
        Command::Backshift(args) => cmd_backshift(args),
        Command::Eval(args) => cmd_eval(args),
        Command::Plan(args) => cmd_plan(args),
        Command::SpliceTc(args) => cmd_splice_tc(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_expr(args: ExprArgs) -> anyhow::Result<()> {
    let depth = xvs::SampleDepth::from_bits(args.depth)?;
    let mut params = xvs::ClampParams::new(args.limit, args.bias, depth)?;
    if args.exact {
        params = params.with_near_equal(xvs::NearEqual::Exact);
    }
    println!("{}", params.expr());
    Ok(())
}

fn cmd_backshift(args: BackshiftArgs) -> anyhow::Result<()> {
    let depth = xvs::SampleDepth::from_bits(args.depth)?;
    println!("{}", xvs::Backshift::new(args.back, depth)?.expr());
    Ok(())
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let expr = xvs::parse_postfix(&args.expr).map_err(xvs::XvsError::from)?;
    let v = xvs::eval(&expr, &args.values)?;
    println!("{v}");
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let preset = xvs::FilterPreset::load(&args.preset)
        .with_context(|| format!("load preset '{}'", args.preset.display()))?;
    let format = xvs::VideoFormat::new(
        args.width,
        args.height,
        xvs::SampleDepth::from_bits(args.depth)?,
        xvs::ColorFamily::Yuv,
        xvs::Subsampling::CSS_420,
    )?
    .with_frames(args.frames, parse_fps(&args.fps)?);

    let mut core = xvs::Core::new();
    let src = core.source("src", format);
    let out = preset
        .build(&mut core, src)
        .with_context(|| format!("build {}", preset.name()))?;
    let json = core.plan(out)?.to_json_pretty()?;

    match args.out {
        Some(path) => {
            std::fs::write(&path, json + "\n")
                .with_context(|| format!("write plan '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_splice_tc(args: SpliceTcArgs) -> anyhow::Result<()> {
    let segments = args
        .clips
        .iter()
        .map(|c| parse_clip(c))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let tc = xvs::TimecodeV1::from_segments(&segments)?;

    let f = File::create(&args.out)
        .with_context(|| format!("create timecode file '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    tc.write_to(&mut w)?;
    w.flush()
        .with_context(|| format!("write timecode file '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn parse_fps(s: &str) -> anyhow::Result<xvs::Fps> {
    let fps = match s.split_once('/') {
        Some((num, den)) => xvs::Fps::new(
            num.trim().parse().with_context(|| format!("fps numerator in '{s}'"))?,
            den.trim().parse().with_context(|| format!("fps denominator in '{s}'"))?,
        )?,
        None => xvs::Fps::from_num(s.trim().parse().with_context(|| format!("fps '{s}'"))?)?,
    };
    Ok(fps)
}

fn parse_clip(s: &str) -> anyhow::Result<(u64, f64)> {
    let (frames, fps) = s
        .split_once(':')
        .with_context(|| format!("clip '{s}' is not FRAMES:NUM[/DEN]"))?;
    let frames = frames
        .trim()
        .parse()
        .with_context(|| format!("frame count in '{s}'"))?;
    Ok((frames, parse_fps(fps)?.as_f64()))
}
