use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;
use textbehind::Segmenter as _;

#[derive(Parser, Debug)]
#[command(name = "textbehind", version)]
struct Cli {
    /// Log filter (`tracing_subscriber::EnvFilter` syntax); defaults to `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project JSON to a PNG.
    Render(RenderArgs),
    /// Feather a mask image into an alpha matte PNG.
    Feather(FeatherArgs),
    /// List available font families, or show which face a family resolves to.
    Fonts(FontArgs),
}

#[derive(Args, Debug, Clone)]
struct FontSourceArgs {
    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Do not load the machine's installed fonts.
    #[arg(long)]
    no_system_fonts: bool,
}

impl FontSourceArgs {
    fn to_opts(&self) -> textbehind::FontOpts {
        let mut opts = textbehind::FontOpts::default().with_system_fonts(!self.no_system_fonts);
        for dir in &self.font_dirs {
            opts = opts.with_font_dir(dir);
        }
        opts
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the project's background blur, within [0, 20].
    #[arg(long)]
    blur: Option<f32>,

    /// Mask feather radius.
    #[arg(long, default_value_t = textbehind::DEFAULT_FEATHER_RADIUS)]
    feather_radius: u32,

    /// Print the family and SHA-256 of the font each layer resolves to.
    #[arg(long)]
    dump_fonts: bool,

    #[command(flatten)]
    fonts: FontSourceArgs,
}

#[derive(Parser, Debug)]
struct FeatherArgs {
    /// Mask image (alpha channel if translucent, otherwise luminance).
    #[arg(long)]
    mask: PathBuf,

    /// Output grayscale PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Neighborhood half-width.
    #[arg(long, default_value_t = textbehind::DEFAULT_FEATHER_RADIUS)]
    radius: u32,

    /// Binarize the mask at this fraction of full alpha before feathering.
    #[arg(long)]
    threshold: Option<f32>,
}

#[derive(Parser, Debug)]
struct FontArgs {
    /// Resolve this family and print the chosen face.
    #[arg(long)]
    family: Option<String>,

    #[command(flatten)]
    fonts: FontSourceArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut logging = textbehind::LoggingConfig::default();
    if let Some(filter) = &cli.log {
        logging = logging.with_env_filter(filter.clone());
    }
    textbehind::init_logging(logging);

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Feather(args) => cmd_feather(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut project = textbehind::Project::load(&args.in_path)
        .with_context(|| format!("load project '{}'", args.in_path.display()))?;
    if let Some(blur) = args.blur {
        project.blur_px = blur;
        project.validate().with_context(|| "--blur")?;
    }

    let renderer_opts = textbehind::RendererOpts::default().with_fonts(args.fonts.to_opts());
    let mut renderer = textbehind::LayerStackRenderer::new(&renderer_opts);

    if args.dump_fonts {
        dump_layer_fonts(&project, renderer.fonts_mut());
    }

    let mask_opts = textbehind::MaskOpts::default().with_feather_radius(args.feather_radius);
    let raster = project
        .render(&mut renderer, &mask_opts)
        .with_context(|| "render project")?;

    write_file(&args.out, &raster.to_png()?)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_feather(args: FeatherArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.mask)
        .with_context(|| format!("read mask '{}'", args.mask.display()))?;
    let mask = textbehind::decode_image(&bytes)?;
    let signal = textbehind::MaskImageSegmenter::new(mask.clone()).segment(&mask)?;
    let signal = match (args.threshold, signal) {
        (Some(_), textbehind::SegmentationSignal::Alpha(alpha)) => {
            textbehind::SegmentationSignal::Probability(
                alpha.iter().map(|&a| f32::from(a) / 255.0).collect(),
            )
        }
        (_, signal) => signal,
    };
    let opts = textbehind::MaskOpts::default()
        .with_feather_radius(args.radius)
        .with_probability_threshold(args.threshold);
    let matte = textbehind::build_matte(&signal, mask.width(), mask.height(), &opts)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        matte.alpha(),
        matte.width(),
        matte.height(),
        image::ColorType::L8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_fonts(args: FontArgs) -> anyhow::Result<()> {
    let mut book = textbehind::FontBook::new(&args.fonts.to_opts());
    match args.family {
        Some(family) => {
            let font = book
                .resolve(&family)
                .with_context(|| format!("no font available for '{family}'"))?;
            println!("requested: {family}");
            println!("family:    {}", font.family);
            println!("index:     {}", font.index);
            println!("sha256:    {}", sha256_hex(&font.data));
        }
        None => {
            for family in book.families() {
                println!("{family}");
            }
            eprintln!("{} faces", book.face_count());
        }
    }
    Ok(())
}

fn dump_layer_fonts(project: &textbehind::Project, book: &mut textbehind::FontBook) {
    eprintln!("text font diagnostics:");
    for layer in project.text_layers() {
        eprintln!("  {}:", layer.id);
        eprintln!("    requested: {}", layer.font_family);
        match book.resolve(&layer.font_family) {
            Some(font) => {
                eprintln!("    family:    {}", font.family);
                eprintln!("    sha256:    {}", sha256_hex(&font.data));
            }
            None => eprintln!("    family:    <none>"),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
