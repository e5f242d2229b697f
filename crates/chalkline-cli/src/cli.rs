//! Command-line interface for the chalkline utility
//!
//! Classifies text, generates Excalidraw scenes from it and delivers written
//! scenes. Results go to stdout as JSON; logs go to stderr.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use chalkline::core::logging::init_logging;
use chalkline::core::{Classification, DiagramKind};
use chalkline::export::{Delivery, DeliveryRequest};
use chalkline::plugins::{generate, Analysis, Router};

/// Exit code when the scene was written but rasterization failed
pub const EXIT_RENDER_FAILED: i32 = 2;

/// Chalkline - Turn descriptions into hand-drawn Excalidraw diagrams
#[derive(Parser)]
#[command(name = "chalkline")]
#[command(about = "Classify text and generate Excalidraw diagrams with automatic layout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Diagram types accepted by `--type`
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum KindChoice {
    Flowchart,
    Architecture,
    Sequence,
    Mindmap,
    Timeline,
    Er,
    #[value(alias = "freeform")]
    Simple,
}

impl From<KindChoice> for DiagramKind {
    fn from(value: KindChoice) -> Self {
        match value {
            KindChoice::Flowchart => DiagramKind::Flowchart,
            KindChoice::Architecture => DiagramKind::Architecture,
            KindChoice::Sequence => DiagramKind::Sequence,
            KindChoice::Mindmap => DiagramKind::MindMap,
            KindChoice::Timeline => DiagramKind::Timeline,
            KindChoice::Er => DiagramKind::Er,
            KindChoice::Simple => DiagramKind::Freeform,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify text into a diagram type
    Classify {
        /// Text to classify (reads stdin when omitted)
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Generate an Excalidraw scene from text
    Generate {
        /// Description of the diagram (reads stdin when omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// Output path without extension; `.excalidraw` and `.png` are appended
        #[arg(short, long)]
        output: PathBuf,

        /// Force a diagram type instead of classifying
        #[arg(long = "type", value_enum)]
        diagram_type: Option<KindChoice>,

        /// Rasterize the scene to PNG
        #[arg(long)]
        render: bool,

        /// Copy the results into the vault directory
        #[arg(long)]
        vault: bool,

        /// Include the element analysis in the output
        #[arg(long)]
        debug: bool,
    },

    /// Validate, rasterize and deliver a written scene
    Deliver {
        /// Scene file to deliver
        #[arg(short, long)]
        input: PathBuf,

        /// Output file stem (defaults to the input's)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory (defaults to the input's)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Copy the results into the vault directory
        #[arg(long)]
        vault: bool,

        /// Files to remove once the image is rendered
        #[arg(long, num_args = 1..)]
        cleanup: Vec<PathBuf>,
    },

    /// Show supported diagram types
    Types {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// JSON printed by `generate`
#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    pub diagram_type: DiagramKind,
    pub confidence: f64,
    pub reasoning: String,
    pub excalidraw: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub png: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_excalidraw: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_png: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

/// `<base>.excalidraw`, keeping an extension the caller already gave
pub fn scene_path(base: &Path) -> PathBuf {
    if base.extension().is_some_and(|ext| ext == "excalidraw") {
        base.to_path_buf()
    } else {
        let mut path = base.as_os_str().to_owned();
        path.push(".excalidraw");
        PathBuf::from(path)
    }
}

/// Main CLI application
pub struct ChalklineApp {
    router: Router,
}

impl ChalklineApp {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Run the command and return the process exit code
    pub fn run(&self, cli: Cli) -> Result<i32> {
        // --verbose means debug unless a level is given
        let level = cli
            .log_level
            .map(|l| l.as_str())
            .or_else(|| cli.verbose.then_some("debug"));
        let format = cli.log_format.map(|f| f.as_str());
        if let Err(e) = init_logging(level, format) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Chalkline v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Classify { text } => self.classify_command(text).map(|_| 0),
            Commands::Generate {
                text,
                output,
                diagram_type,
                render,
                vault,
                debug,
            } => self.generate_command(text, &output, diagram_type, render, vault, debug),
            Commands::Deliver {
                input,
                name,
                output_dir,
                vault,
                cleanup,
            } => {
                let mut request = DeliveryRequest::new(input)
                    .with_vault(vault)
                    .with_cleanup(cleanup);
                if let Some(name) = name {
                    request = request.with_name(name);
                }
                if let Some(dir) = output_dir {
                    request = request.with_output_dir(dir);
                }
                self.deliver_command(&request).map(|_| 0)
            }
            Commands::Types { json } => self.types_command(json).map(|_| 0),
        }
    }

    pub fn classify(&self, text: &str) -> Classification {
        self.router.classify(text)
    }

    fn classify_command(&self, text: Option<String>) -> Result<()> {
        let text = self.read_text(text)?;
        let classification = self.classify(&text);
        print_json(&classification)
    }

    /// Build and save the scene; rasterize and deliver on request
    pub fn generate_scene(
        &self,
        text: &str,
        output: &Path,
        diagram_type: Option<KindChoice>,
        render: bool,
        vault: bool,
        debug: bool,
    ) -> Result<GenerateOutput> {
        let analysis = Analysis::from_text(text, diagram_type.map(DiagramKind::from));
        debug!(elements = analysis.elements.len(), "Analysed text");
        let generated = generate(&analysis);

        let scene = scene_path(output);
        if let Some(parent) = scene.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create '{}'", parent.display()))?;
        }
        let written = generated
            .diagram
            .save(&scene)
            .with_context(|| format!("Failed to write '{}'", scene.display()))?;

        let mut result = GenerateOutput {
            success: true,
            diagram_type: generated.kind,
            confidence: analysis.confidence,
            reasoning: analysis.reasoning.clone(),
            excalidraw: written.clone(),
            png: None,
            render_error: None,
            vault_excalidraw: None,
            vault_png: None,
            vault_error: None,
            analysis: debug.then(|| analysis.clone()),
        };

        if render || vault {
            let delivery = Delivery::from_env()?;
            if render {
                match delivery.rasterizer().rasterize(&written, &written.with_extension("png")) {
                    Ok(png) => result.png = Some(png),
                    Err(err) => {
                        warn!(error = %err, "Rasterization failed");
                        result.success = false;
                        result.render_error = Some(err.to_string());
                    }
                }
            }
            if vault {
                let copy = delivery.copy_to_vault(&written, result.png.as_deref());
                result.vault_excalidraw = copy.excalidraw;
                result.vault_png = copy.png;
                result.vault_error = copy.error;
            }
        }
        Ok(result)
    }

    fn generate_command(
        &self,
        text: Option<String>,
        output: &Path,
        diagram_type: Option<KindChoice>,
        render: bool,
        vault: bool,
        debug: bool,
    ) -> Result<i32> {
        let text = self.read_text(text)?;
        let result = self.generate_scene(&text, output, diagram_type, render, vault, debug)?;
        print_json(&result)?;
        Ok(if result.render_error.is_some() {
            EXIT_RENDER_FAILED
        } else {
            0
        })
    }

    fn deliver_command(&self, request: &DeliveryRequest) -> Result<()> {
        let report = Delivery::from_env()?
            .deliver(request)
            .with_context(|| format!("Failed to deliver '{}'", request.input.display()))?;
        print_json(&report)
    }

    /// Handle the types command
    pub fn types_command(&self, json: bool) -> Result<()> {
        let kinds = DiagramKind::all();
        if json {
            let types: Vec<_> = kinds
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "name": kind.as_str(),
                        "description": kind.description(),
                    })
                })
                .collect();
            let body = serde_json::json!({ "supported_types": types, "total": kinds.len() });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("Supported diagram types:");
            for kind in kinds {
                println!("  {:<13} - {}", kind.as_str(), kind.description());
            }
            println!();
            println!("Total: {} diagram types supported", kinds.len());
        }
        Ok(())
    }

    /// Text from the flag, or stdin
    pub fn read_text(&self, text: Option<String>) -> Result<String> {
        match text {
            Some(text) if text != "-" => Ok(text),
            _ => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read stdin: {}", e))?;
                Ok(content)
            }
        }
    }
}

impl Default for ChalklineApp {
    fn default() -> Self {
        Self::new()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing_generate_command() {
        let args = vec![
            "chalkline",
            "generate",
            "--text",
            "Login, then verify",
            "--output",
            "/tmp/login",
            "--type",
            "flowchart",
            "--render",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate {
                text,
                output,
                diagram_type,
                render,
                vault,
                debug,
            } => {
                assert_eq!(text.as_deref(), Some("Login, then verify"));
                assert_eq!(output, PathBuf::from("/tmp/login"));
                assert_eq!(diagram_type, Some(KindChoice::Flowchart));
                assert!(render);
                assert!(!vault);
                assert!(!debug);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parsing_type_alias() {
        let args = vec!["chalkline", "generate", "-o", "x", "--type", "freeform"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Generate { diagram_type, .. } => {
                assert_eq!(diagram_type.map(DiagramKind::from), Some(DiagramKind::Freeform));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_requires_output() {
        assert!(Cli::try_parse_from(vec!["chalkline", "generate", "--text", "a"]).is_err());
    }

    #[test]
    fn test_cli_parsing_deliver_command() {
        let args = vec![
            "chalkline",
            "deliver",
            "--input",
            "/tmp/a.excalidraw",
            "--vault",
            "--cleanup",
            "/tmp/a.draft.json",
            "/tmp/b.draft.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Deliver {
                input,
                name,
                vault,
                cleanup,
                ..
            } => {
                assert_eq!(input, PathBuf::from("/tmp/a.excalidraw"));
                assert!(name.is_none());
                assert!(vault);
                assert_eq!(cleanup.len(), 2);
            }
            _ => panic!("Expected Deliver command"),
        }
    }

    #[test]
    fn test_cli_parsing_types_command() {
        let cli = Cli::try_parse_from(vec!["chalkline", "types", "--json"]).unwrap();
        match cli.command {
            Commands::Types { json } => assert!(json),
            _ => panic!("Expected Types command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = vec!["chalkline", "classify", "--text", "x", "--verbose", "--log-level", "debug"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn test_scene_path() {
        assert_eq!(scene_path(Path::new("/tmp/d")), PathBuf::from("/tmp/d.excalidraw"));
        assert_eq!(scene_path(Path::new("out/d.v2")), PathBuf::from("out/d.v2.excalidraw"));
        assert_eq!(
            scene_path(Path::new("d.excalidraw")),
            PathBuf::from("d.excalidraw")
        );
    }

    #[test]
    fn test_classify() {
        let app = ChalklineApp::new();
        let result = app.classify("2008: founded, 2012: IPO, 2020: acquired");
        assert_eq!(result.diagram_type, DiagramKind::Timeline);
    }

    #[test]
    fn test_generate_writes_scene() {
        let dir = tempdir().unwrap();
        let app = ChalklineApp::new();
        let result = app
            .generate_scene(
                "Research, then design, then build",
                &dir.path().join("plan"),
                Some(KindChoice::Flowchart),
                false,
                false,
                true,
            )
            .unwrap();

        assert!(result.success);
        assert_eq!(result.diagram_type, DiagramKind::Flowchart);
        assert_eq!(result.confidence, 1.0);
        assert!(result.excalidraw.ends_with("plan.excalidraw"));
        assert_eq!(result.analysis.unwrap().elements.len(), 3);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&result.excalidraw).unwrap()).unwrap();
        assert_eq!(written["type"], "excalidraw");
    }

    #[test]
    fn test_types_command() {
        let app = ChalklineApp::new();
        assert!(app.types_command(true).is_ok());
        assert!(app.types_command(false).is_ok());
    }

    #[test]
    fn test_read_text_from_flag() {
        let app = ChalklineApp::default();
        assert_eq!(app.read_text(Some("abc".into())).unwrap(), "abc");
    }
}
