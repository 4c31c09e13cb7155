use anyhow::{Context, Result, bail};
use certforge_config::Config;
use certforge_engine::editing::common_style_value_in_range;
use certforge_engine::layout::{Move, PercentPoint, PhotoSource, QrCodeLayerUpdate};
use certforge_engine::{
    CanvasSide, CanvasSize, Cmd, ErrorCorrectionLevel, FontStyle, FontWeight, FsAssetStore,
    Layer, LayerId, LayerRegistry, LayerUpdate, StyleProperty, Template, TextDecoration,
    TextStyle, is_valid_font_size, read_template, release_layer_asset, write_template,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Edit certificate templates from the command line
#[derive(Parser, Debug)]
#[command(name = "certforge")]
#[command(about = "Edit certificate template layouts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty template
    New {
        template: PathBuf,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Print the layers of one side in paint order
    Show(SideArgs),
    /// Add a text layer
    AddText {
        #[command(flatten)]
        side: SideArgs,
        text: String,
    },
    /// Add a QR code layer
    AddQr {
        #[command(flatten)]
        side: SideArgs,
        data: String,
        /// Error correction level: L, M, Q or H
        #[arg(long)]
        level: Option<String>,
    },
    /// Add a photo layer for an already stored image
    AddPhoto {
        #[command(flatten)]
        side: SideArgs,
        #[arg(long)]
        src: String,
        #[arg(long)]
        storage_path: String,
        /// Intrinsic image width in pixels
        #[arg(long)]
        width: u32,
        /// Intrinsic image height in pixels
        #[arg(long)]
        height: u32,
    },
    /// Move a layer, in fractions of the canvas
    Move {
        #[command(flatten)]
        side: SideArgs,
        #[arg(long)]
        layer: String,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },
    /// Style a char range of a text layer; without a range the whole layer
    Style(StyleArgs),
    /// Set the reference canvas of a side, e.g. once its background is known
    Canvas {
        #[command(flatten)]
        side: SideArgs,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Delete a layer, releasing a photo's stored image
    Delete {
        #[command(flatten)]
        side: SideArgs,
        #[arg(long)]
        layer: String,
    },
}

#[derive(Args, Debug)]
struct SideArgs {
    template: PathBuf,
    #[arg(long, value_enum, default_value_t = SideArg::Certificate)]
    side: SideArg,
}

#[derive(Args, Debug)]
struct StyleArgs {
    #[command(flatten)]
    side: SideArgs,
    #[arg(long)]
    layer: String,
    #[arg(long, default_value_t = 0)]
    start: usize,
    #[arg(long, default_value_t = 0)]
    end: usize,
    /// Numeric weight or "normal"/"bold"
    #[arg(long)]
    weight: Option<String>,
    #[arg(long)]
    family: Option<String>,
    #[arg(long)]
    size: Option<f32>,
    #[arg(long)]
    color: Option<String>,
    /// "normal" or "italic"
    #[arg(long)]
    font_style: Option<String>,
    /// "none", "underline" or "line-through"
    #[arg(long)]
    decoration: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SideArg {
    Certificate,
    Score,
}

impl From<SideArg> for CanvasSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Certificate => CanvasSide::Certificate,
            SideArg::Score => CanvasSide::Score,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load_or_default()?;
    log::debug!("Config path: {}", Config::config_path().display());

    run(cli.command, &config, &mut std::io::stdout())
}

fn run(command: Command, config: &Config, out: &mut impl Write) -> Result<()> {
    match command {
        Command::New { template, name } => {
            let path = config.template_file(&template);
            if path.exists() {
                bail!("Template {} already exists", path.display());
            }
            let mut template = Template {
                name,
                ..Default::default()
            };
            if !config.reference_size.is_empty() {
                template.certificate.reference_size = config.reference_size;
                template.score.reference_size = config.reference_size;
            }
            write_template(&path, &template)?;
            writeln!(out, "Created {}", path.display())?;
        }
        Command::Show(side) => {
            let session = Session::open(&side, config)?;
            print_layers(&session.registry, out)?;
        }
        Command::AddText { side, text } => {
            let mut session = Session::open(&side, config)?;
            let id = session.registry.add_text_layer(&text).id().clone();
            session.save()?;
            writeln!(out, "{id}")?;
        }
        Command::AddQr { side, data, level } => {
            let mut session = Session::open(&side, config)?;
            let id = session.registry.add_qr_code_layer(&data).id().clone();
            if let Some(level) = level {
                let level = ErrorCorrectionLevel::parse(&level)
                    .with_context(|| format!("Bad error correction level {level}"))?;
                let update = LayerUpdate::QrCode(QrCodeLayerUpdate {
                    error_correction_level: Some(level),
                    ..Default::default()
                });
                session.registry.update_layer(&id, &update);
            }
            session.save()?;
            writeln!(out, "{id}")?;
        }
        Command::AddPhoto {
            side,
            src,
            storage_path,
            width,
            height,
        } => {
            let mut session = Session::open(&side, config)?;
            let source = PhotoSource {
                src,
                storage_path,
                original_width: width,
                original_height: height,
            };
            let id = session.registry.add_photo_layer(source).id().clone();
            session.save()?;
            writeln!(out, "{id}")?;
        }
        Command::Move { side, layer, x, y } => {
            let mut session = Session::open(&side, config)?;
            let id = session.layer_id(&layer)?;
            let current = session.layer(&id)?;
            let update = LayerUpdate::move_to(current, Move::Percent(PercentPoint::new(x, y)));
            session.registry.update_layer(&id, &update);
            session.save()?;
        }
        Command::Style(args) => {
            let mut session = Session::open(&args.side, config)?;
            let id = session.layer_id(&args.layer)?;
            let patch = style_patch(&args)?;
            if patch.is_empty() {
                bail!("No style given");
            }
            let cmd = Cmd::ApplyStyle {
                range: args.start..args.end,
                patch,
            };
            if session.registry.apply_text_command(&id, &cmd).is_none() {
                bail!("Layer {id} is not a text layer");
            }
            session.save()?;
        }
        Command::Canvas {
            side,
            width,
            height,
        } => {
            let mut session = Session::open(&side, config)?;
            let size = CanvasSize::new(width, height);
            if size.is_empty() {
                bail!("Canvas size must be non-zero");
            }
            session.registry.set_reference_size(size);
            session.save()?;
        }
        Command::Delete { side, layer } => {
            let mut session = Session::open(&side, config)?;
            let id = session.layer_id(&layer)?;
            if let Some(removed) = session.registry.delete_layer(&id) {
                session.save()?;
                release_asset(config, &removed)?;
                writeln!(out, "Deleted {id}")?;
            }
        }
    }
    Ok(())
}

/// One side of a template file loaded for editing
struct Session {
    path: PathBuf,
    template: Template,
    registry: LayerRegistry,
}

impl Session {
    fn open(args: &SideArgs, config: &Config) -> Result<Self> {
        let path = config.template_file(&args.template);
        let template = read_template(&path)
            .with_context(|| format!("Failed to open template {}", path.display()))?;
        let registry = template.registry(args.side.into(), config.layers.clone());
        Ok(Self {
            path,
            template,
            registry,
        })
    }

    fn layer_id(&self, id: &str) -> Result<LayerId> {
        let id = LayerId::new(id);
        if self.registry.get(&id).is_none() {
            bail!("No layer {id} on the {} side", self.registry.side());
        }
        Ok(id)
    }

    fn layer(&self, id: &LayerId) -> Result<&Layer> {
        self.registry
            .get(id)
            .with_context(|| format!("No layer {id}"))
    }

    fn save(&mut self) -> Result<()> {
        self.template.store(&self.registry);
        write_template(&self.path, &self.template)?;
        Ok(())
    }
}

fn style_patch(args: &StyleArgs) -> Result<TextStyle> {
    let mut patch = TextStyle::new();
    if let Some(weight) = &args.weight {
        let weight = FontWeight::parse(weight).with_context(|| format!("Bad weight {weight}"))?;
        patch = patch.with_font_weight(weight);
    }
    if let Some(family) = &args.family {
        patch = patch.with_font_family(family.clone());
    }
    if let Some(size) = args.size {
        if !is_valid_font_size(size) {
            bail!("Bad font size {size}");
        }
        patch = patch.with_font_size(size);
    }
    if let Some(color) = &args.color {
        patch = patch.with_color(color.clone());
    }
    if let Some(style) = &args.font_style {
        let style = FontStyle::parse(style).with_context(|| format!("Bad font style {style}"))?;
        patch = patch.with_font_style(style);
    }
    if let Some(decoration) = &args.decoration {
        let decoration = TextDecoration::parse(decoration)
            .with_context(|| format!("Bad decoration {decoration}"))?;
        patch = patch.with_text_decoration(decoration);
    }
    Ok(patch)
}

fn release_asset(config: &Config, layer: &Layer) -> Result<()> {
    let Some(root) = &config.assets_path else {
        if layer.as_photo().is_some() {
            log::warn!("No assets_path configured, leaving image of {} in place", layer.id());
        }
        return Ok(());
    };
    let store = FsAssetStore::new(root);
    release_layer_asset(&store, layer)?;
    Ok(())
}

fn print_layers(registry: &LayerRegistry, out: &mut impl Write) -> Result<()> {
    let size = registry.reference_size();
    writeln!(
        out,
        "{} side, {}x{}, {} layers",
        registry.side(),
        size.width,
        size.height,
        registry.len()
    )?;
    for painted in registry.materialize() {
        let layer = painted.layer;
        let percent = layer.position().percent();
        write!(
            out,
            "{} {} at {:.3},{:.3} ({},{})",
            layer.kind(),
            layer.id(),
            percent.x,
            percent.y,
            painted.position.x,
            painted.position.y
        )?;
        if let Some(size) = painted.size {
            write!(out, " size {}x{}", size.width, size.height)?;
        }
        if let Some(z_index) = layer.z_index() {
            write!(out, " z {z_index}")?;
        }
        writeln!(out)?;
        if let Some(text) = layer.as_text() {
            for property in StyleProperty::ALL {
                let common = common_style_value_in_range(&text.rich_text, 0..0, property);
                writeln!(out, "  {property}: {common}")?;
            }
            for span in &painted.spans {
                writeln!(
                    out,
                    "  {:?} {} {} {}",
                    span.text, span.style.font_weight, span.style.font_family, span.style.color
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn run_args(args: &[&str], config: &Config) -> String {
        let cli = Cli::try_parse_from(std::iter::once("certforge").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run(cli.command, config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            templates_path: Some(dir.path().to_path_buf()),
            assets_path: Some(dir.path().join("assets")),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_add_and_style() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        run_args(&["new", "award.json", "--name", "Award"], &config);
        assert!(dir.path().join("award.json").is_file());

        let id = run_args(&["add-text", "award.json", "Hello World"], &config);
        let id = id.trim();
        run_args(
            &["style", "award.json", "--layer", id, "--start", "2", "--end", "5", "--weight", "bold"],
            &config,
        );

        let template = read_template(&dir.path().join("award.json")).unwrap();
        assert_eq!(template.name, "Award");
        let text = template.certificate.layers[0].as_text().unwrap();
        assert_eq!(text.rich_text.spans().len(), 3);
        assert_eq!(text.rich_text.plain_text(), "Hello World");
    }

    #[test]
    fn test_show_lists_paint_order() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run_args(&["new", "award.json"], &config);
        run_args(&["add-text", "award.json", "Jane"], &config);
        run_args(&["add-qr", "award.json", "https://example.org/v/1", "--level", "h"], &config);

        let shown = run_args(&["show", "award.json"], &config);
        let lines: Vec<&str> = shown.lines().collect();

        assert_eq!(lines[0], "certificate side, 1123x794, 2 layers");
        assert!(lines[1].starts_with("qrcode qr-"));
        assert!(lines[1].ends_with("size 168x168 z 1"));
        assert!(lines[2].starts_with("text text-"));
        assert!(shown.contains("fontWeight: default"));
        let template = read_template(&dir.path().join("award.json")).unwrap();
        let qr = template.certificate.layers[1].as_qr_code().unwrap();
        assert_eq!(qr.error_correction_level, ErrorCorrectionLevel::H);
    }

    #[test]
    fn test_delete_photo_releases_asset() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        let image = dir.path().join("assets/seal.png");
        std::fs::write(&image, "png").unwrap();
        run_args(&["new", "award.json"], &config);
        let id = run_args(
            &[
                "add-photo",
                "award.json",
                "--src",
                "https://cdn.example.org/seal.png",
                "--storage-path",
                "seal.png",
                "--width",
                "200",
                "--height",
                "100",
            ],
            &config,
        );

        let output = run_args(&["delete", "award.json", "--layer", id.trim()], &config);

        assert_eq!(output.trim(), format!("Deleted {}", id.trim()));
        assert!(!image.exists());
        let template = read_template(&dir.path().join("award.json")).unwrap();
        assert!(template.certificate.layers.is_empty());
    }

    #[test]
    fn test_canvas_rederives_pixels() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run_args(&["new", "award.json"], &config);
        run_args(&["add-text", "award.json", "--side", "score", "97"], &config);

        run_args(
            &["canvas", "award.json", "--side", "score", "--width", "2000", "--height", "1000"],
            &config,
        );

        let shown = run_args(&["show", "award.json", "--side", "score"], &config);
        assert!(shown.contains("at 0.500,0.500 (1000,500)"));
    }

    #[test]
    fn test_style_rejects_unknown_layer() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run_args(&["new", "award.json"], &config);
        let cli = Cli::try_parse_from([
            "certforge", "style", "award.json", "--layer", "text-1", "--weight", "bold",
        ])
        .unwrap();

        let result = run(cli.command, &config, &mut Vec::new());

        assert!(result.is_err());
    }

    #[test]
    fn test_style_rejects_unusable_size() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        run_args(&["new", "award.json"], &config);
        let id = run_args(&["add-text", "award.json", "Hello"], &config);
        let cli = Cli::try_parse_from([
            "certforge", "style", "award.json", "--layer", id.trim(), "--size", "NaN",
        ])
        .unwrap();

        let error = run(cli.command, &config, &mut Vec::new()).unwrap_err();

        assert!(error.to_string().contains("Bad font size"));
        let template = read_template(&dir.path().join("award.json")).unwrap();
        let text = template.certificate.layers[0].as_text().unwrap();
        assert!(text.rich_text.spans()[0].style.is_empty());
    }
}
