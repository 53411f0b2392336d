use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use pathtree::render::{DiagramStyle, render_svg};
use pathtree::theme::Theme;
use pathtree::{
    Camera, CosmicTextMeasure, LayoutConfig, LayoutEngine, PathTree, Scene, export, input,
    logging,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Render lists of file paths as column/row tree diagrams
#[derive(Parser, Debug)]
#[command(name = "pathtree")]
#[command(version)]
#[command(about = "Render file path lists as tree diagrams (SVG, PNG, PDF or JSON)", long_about = None)]
struct Args {
    /// File with one path per line (use "-" for stdin, the default)
    #[arg(value_name = "INPUT", conflicts_with = "scan")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png, .pdf or .json)
    #[arg(
        short,
        long,
        value_name = "OUTPUT",
        required_unless_present_any = ["completions", "list_themes"]
    )]
    output: Option<PathBuf>,

    /// Read paths by walking this directory instead of INPUT
    #[arg(long, value_name = "DIR")]
    scan: Option<PathBuf>,

    /// Maximum depth to descend when scanning
    #[arg(long, requires = "scan")]
    max_depth: Option<usize>,

    /// Include hidden files when scanning
    #[arg(long, requires = "scan")]
    hidden: bool,

    /// Built-in theme name or path to an Alacritty theme file (YAML or TOML)
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Layout config file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Zoom factor applied to the whole diagram
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// Horizontal pan in output pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_x: f32,

    /// Vertical pan in output pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_y: f32,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<Shell>,

    /// List built-in themes and exit
    #[arg(long)]
    list_themes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Json,
}

impl OutputFormat {
    fn label(self) -> &'static str {
        match self {
            Self::Svg => "SVG",
            Self::Png => "PNG",
            Self::Pdf => "PDF",
            Self::Json => "JSON",
        }
    }

    fn from_path(path: &Path) -> Result<Self, String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or("Output file has no extension")?
            .to_ascii_lowercase();

        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "Unsupported output format: .{} (use .svg, .png, .pdf or .json)",
                ext
            )),
        }
    }
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "pathtree", &mut std::io::stdout());
        return Ok(());
    }

    if args.list_themes {
        for name in Theme::list_builtins() {
            println!("{}", name);
        }
        return Ok(());
    }

    let output = args.output.clone().ok_or("No output file given")?;
    let format = OutputFormat::from_path(&output)?;

    let config = match args.config {
        Some(ref path) => LayoutConfig::from_file(path)?,
        None => LayoutConfig::default(),
    };
    let theme = match args.theme {
        Some(ref name) => Theme::resolve(name)?,
        None => Theme::default(),
    };
    let camera = Camera::new(args.pan_x, args.pan_y, args.zoom)?;

    let paths = read_paths(&args)?;
    if paths.is_empty() {
        warn!("No paths in input; the diagram will be empty");
    }

    let mut tree = PathTree::build(&paths).map_err(|e| format!("Invalid input: {}", e))?;

    let mut measure = CosmicTextMeasure::new()?;
    let layout = LayoutEngine::new(&mut measure, config.clone())
        .layout(&mut tree)
        .map_err(|e| format!("Layout failed: {}", e))?;
    let scene = Scene::from_layout(&tree, &layout, &config);
    info!(
        nodes = scene.nodes.len(),
        width = scene.viewport.width,
        height = scene.viewport.height,
        "laid out diagram"
    );

    if format == OutputFormat::Png {
        let (width, height) = camera.screen_size(scene.viewport);
        export::raster_size(width, height, args.png_scale)?;
    }

    let bytes = match format {
        OutputFormat::Json => scene.to_json()?.into_bytes(),
        OutputFormat::Svg | OutputFormat::Png | OutputFormat::Pdf => {
            let style = DiagramStyle::from_theme(&theme, config.font_size, config.monospace_labels);
            let svg = render_svg(&scene, &style, &camera);
            match format {
                OutputFormat::Png => export::svg_to_png(&svg, args.png_scale)?,
                OutputFormat::Pdf => export::svg_to_pdf(&svg)?,
                _ => svg.into_bytes(),
            }
        }
    };

    std::fs::write(&output, bytes)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    eprintln!("{} saved to: {}", format.label(), output.display());

    Ok(())
}

fn read_paths(args: &Args) -> Result<Vec<String>, String> {
    if let Some(ref root) = args.scan {
        return input::scan_directory(root, args.max_depth, args.hidden);
    }

    let text = match args.input {
        Some(ref path) if path.to_str() != Some("-") => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read input file: {}", e))?,
        _ => {
            let mut buffer = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
                .map_err(|e| format!("Failed to read from stdin: {}", e))?;
            buffer
        }
    };

    Ok(input::parse_path_list(&text))
}
