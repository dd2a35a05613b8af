use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lottix::lottie_data::model::LottieJson;
use lottix::lottie_editor::resolver;
use lottix::lottie_editor::{Edit, HexColor, Session};
use lottix::settings::DownloadSizeMode;
use lottix::{prepare_download, FoundAnimation, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (defaults to $LOTTIX_SETTINGS)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print summary, layers and editable colors
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Apply edits in order and export the result
    Edit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// hide:LAYER, delete:LAYER or color:LAYER:GROUP:#rrggbb
        #[arg(long = "op", value_name = "OP", required = true, value_parser = parse_edit)]
        ops: Vec<Edit>,

        /// Output path (defaults to <stem>_modified.json next to FILE)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Prepare a download at a custom width
    Resize {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        width: u32,

        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn parse_index(part: Option<&str>, what: &str) -> Result<usize> {
    let part = part.with_context(|| format!("missing {} index", what))?;
    part.parse()
        .with_context(|| format!("invalid {} index: {}", what, part))
}

fn parse_edit(s: &str) -> Result<Edit> {
    let mut parts = s.splitn(4, ':');
    let edit = match parts.next() {
        Some("hide") => Edit::ToggleVisibility {
            layer: parse_index(parts.next(), "layer")?,
        },
        Some("delete") => Edit::DeleteLayer {
            layer: parse_index(parts.next(), "layer")?,
        },
        Some("color") => {
            let layer = parse_index(parts.next(), "layer")?;
            let group = parse_index(parts.next(), "group")?;
            let hex: HexColor = parts.next().context("missing color")?.parse()?;
            Edit::SetShapeColor {
                layer,
                group,
                hex: hex.to_string(),
            }
        }
        _ => bail!("unknown op {:?}, expected hide, delete or color", s),
    };
    if parts.next().is_some() {
        bail!("trailing input in op {:?}", s);
    }
    Ok(edit)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn describe(doc: &LottieJson) -> String {
    let summary = doc.summary();
    let mut out = format!(
        "{} ({}x{}, {} fps, {} frames, {} layers)\n",
        summary.name.as_deref().unwrap_or("untitled"),
        summary.width,
        summary.height,
        summary.frame_rate,
        summary.num_frames,
        summary.num_layers,
    );
    for (index, layer) in doc.layers.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} ({}, {}){}\n",
            index,
            layer.display_name(index),
            layer.kind().name(),
            layer.key(index),
            if layer.is_hidden() { " hidden" } else { "" },
        ));
        for (group, node) in layer.shape_groups().iter().enumerate() {
            if let Some(found) = resolver::find_color_node(std::slice::from_ref(node)) {
                out.push_str(&format!("    group {}: {}\n", group, found.hex()));
            }
        }
    }
    out
}

fn info_cmd(file: &Path) -> Result<String> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let doc = LottieJson::from_json_slice(&bytes)?;
    Ok(describe(&doc))
}

fn edit_cmd(
    settings: &Settings,
    file: &Path,
    ops: &[Edit],
    output: Option<&Path>,
) -> Result<PathBuf> {
    if !settings.enable_basic_editor {
        bail!("the basic editor is disabled in settings");
    }
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let mut session = Session::new();
    session.load_bytes(&source_name(file), &bytes)?;
    for op in ops {
        let revision = session.apply(op)?;
        info!(?op, %revision, "Applied");
    }

    let artifact = session.export()?;
    match output {
        Some(path) => {
            fs::write(path, &artifact.contents)?;
            Ok(path.to_path_buf())
        }
        None => {
            let dir = file.parent().unwrap_or_else(|| Path::new("."));
            Ok(artifact.write_to(dir)?)
        }
    }
}

fn resize_cmd(
    settings: &Settings,
    file: &Path,
    width: u32,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let file_name = source_name(file);
    let item = FoundAnimation {
        lottie_url: String::new(),
        was_dot_lottie: file_name.ends_with(".lottie"),
        file_name,
        summary: None,
    };
    let settings = Settings {
        download_size_mode: DownloadSizeMode::Custom,
        custom_download_width: Some(width),
        ..settings.clone()
    };

    let artifact = prepare_download(&item, bytes, &settings)?;
    match output {
        Some(path) => {
            fs::write(path, &artifact.contents)?;
            Ok(path.to_path_buf())
        }
        None => {
            let dir = file.parent().unwrap_or_else(|| Path::new("."));
            Ok(artifact.write_to(dir)?)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::from_env()?,
    };

    match cli.command {
        Command::Info { file } => print!("{}", info_cmd(&file)?),
        Command::Edit { file, ops, output } => {
            let written = edit_cmd(&settings, &file, &ops, output.as_deref())?;
            info!("Wrote {:?}", written);
        }
        Command::Resize { file, width, output } => {
            let written = resize_cmd(&settings, &file, width, output.as_deref())?;
            info!("Wrote {:?}", written);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.log_level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r##"{"v":"5.5.2","fr":30,"ip":0,"op":30,"w":100,"h":80,"layers":[
        {"ty":4,"nm":"Box","ind":1,"shapes":[{"ty":"gr","it":[{"ty":"fl","c":{"a":0,"k":[1,0,0,1]}}]}]},
        {"ty":1,"sc":"#ffffff"}
    ]}"##;

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("square.json");
        fs::write(&file, SQUARE).unwrap();
        (dir, file)
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(parse_edit("hide:2").unwrap(), Edit::ToggleVisibility { layer: 2 });
        assert_eq!(parse_edit("delete:0").unwrap(), Edit::DeleteLayer { layer: 0 });
        assert_eq!(
            parse_edit("color:1:3:#00FF00").unwrap(),
            Edit::SetShapeColor {
                layer: 1,
                group: 3,
                hex: "#00ff00".to_string()
            }
        );
        assert!(parse_edit("color:1:3:green").is_err());
        assert!(parse_edit("hide").is_err());
        assert!(parse_edit("hide:1:2").is_err());
        assert!(parse_edit("spin:1").is_err());
    }

    #[test]
    fn test_info_lists_layers_and_colors() {
        let (_dir, file) = fixture();
        let text = info_cmd(&file).unwrap();
        assert!(text.starts_with("untitled (100x80"));
        assert!(text.contains("[0] Box (Shape, ind:1)"));
        assert!(text.contains("group 0: #ff0000"));
        assert!(text.contains("[1] Layer 2 (Solid, #1)"));
    }

    #[test]
    fn test_edit_applies_ops_in_order() {
        let (dir, file) = fixture();
        let ops = vec![
            parse_edit("color:0:0:#0000ff").unwrap(),
            parse_edit("delete:1").unwrap(),
            parse_edit("hide:0").unwrap(),
        ];
        let written = edit_cmd(&Settings::default(), &file, &ops, None).unwrap();
        assert_eq!(written, dir.path().join("square_modified.json"));

        let doc = LottieJson::from_json_slice(&fs::read(written).unwrap()).unwrap();
        assert_eq!(doc.layers.len(), 1);
        assert!(doc.layers[0].is_hidden());
        let found = resolver::find_color_node(doc.layers[0].shape_groups()).unwrap();
        assert_eq!(found.hex(), "#0000ff");
    }

    #[test]
    fn test_edit_refused_when_editor_disabled() {
        let (_dir, file) = fixture();
        let settings = Settings {
            enable_basic_editor: false,
            ..Settings::default()
        };
        let ops = vec![Edit::DeleteLayer { layer: 0 }];
        assert!(edit_cmd(&settings, &file, &ops, None).is_err());
    }

    #[test]
    fn test_resize_writes_named_copy() {
        let (dir, file) = fixture();
        let written = resize_cmd(&Settings::default(), &file, 50, None).unwrap();
        assert_eq!(written, dir.path().join("resized_square_50w.json"));
        let doc = LottieJson::from_json_slice(&fs::read(written).unwrap()).unwrap();
        assert_eq!((doc.w, doc.h), (50, 40));
    }
}
