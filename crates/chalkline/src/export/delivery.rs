//! Scene delivery
//!
//! Moves a written scene into its output directory, validates it,
//! rasterizes it, optionally copies both files into a vault directory and
//! removes temporary inputs once the image exists.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, warn, Level};

use super::rasterizer::Rasterizer;
use crate::core::{DiagramError, Result, SceneDocument};

/// Environment variable naming the vault directory
pub const VAULT_ENV: &str = "CHALKLINE_VAULT_DIR";

/// Inputs under this directory are removed after a successful delivery
const TEMP_PREFIX: &str = "/tmp/";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryRequest {
    pub input: PathBuf,
    /// Output stem; defaults to the input file stem
    pub name: Option<String>,
    /// Defaults to the input's directory
    pub output_dir: Option<PathBuf>,
    pub vault: bool,
    /// Removed once the image has been rendered
    pub cleanup: Vec<PathBuf>,
}

impl DeliveryRequest {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_vault(mut self, vault: bool) -> Self {
        self.vault = vault;
        self
    }

    pub fn with_cleanup(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.cleanup.extend(files);
        self
    }
}

/// What a delivery produced, serialized as the command's JSON output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub excalidraw: PathBuf,
    pub png: Option<PathBuf>,
    pub validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_excalidraw: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_png: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cleaned: Vec<PathBuf>,
}

/// Result of copying into the vault
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaultCopy {
    pub excalidraw: Option<PathBuf>,
    pub png: Option<PathBuf>,
    pub error: Option<String>,
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

/// Delivery settings resolved from the environment
#[derive(Debug, Clone)]
pub struct Delivery {
    rasterizer: Rasterizer,
    vault_dir: Option<PathBuf>,
}

impl Delivery {
    pub fn new(rasterizer: Rasterizer, vault_dir: Option<PathBuf>) -> Self {
        Self {
            rasterizer,
            vault_dir,
        }
    }

    /// Rasterizer from `CHALKLINE_RASTERIZER`, vault from `CHALKLINE_VAULT_DIR`
    pub fn from_env() -> Result<Self> {
        let vault_dir = std::env::var(VAULT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| expand_home(v.trim()));
        Ok(Self::new(Rasterizer::from_env()?, vault_dir))
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    /// Copy the scene, and the image when present, into the vault
    pub fn copy_to_vault(&self, scene: &Path, png: Option<&Path>) -> VaultCopy {
        let Some(vault) = &self.vault_dir else {
            return VaultCopy {
                error: Some(format!("{} not set", VAULT_ENV)),
                ..VaultCopy::default()
            };
        };
        match copy_into(vault, scene, png) {
            Ok((excalidraw, png)) => {
                info!(vault = %vault.display(), "Copied to vault");
                VaultCopy {
                    excalidraw: Some(excalidraw),
                    png,
                    error: None,
                }
            }
            Err(err) => {
                warn!(vault = %vault.display(), error = %err, "Vault copy failed");
                VaultCopy {
                    error: Some(err.to_string()),
                    ..VaultCopy::default()
                }
            }
        }
    }

    pub fn deliver(&self, request: &DeliveryRequest) -> Result<DeliveryReport> {
        let deliver_span = span!(Level::INFO, "deliver", input = %request.input.display());
        let _enter = deliver_span.enter();

        if !request.input.exists() {
            return Err(DiagramError::delivery(format!(
                "Input file not found: {}",
                request.input.display()
            )));
        }
        let input = fs::canonicalize(&request.input)?;
        let name = match &request.name {
            Some(name) => name.clone(),
            None => input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| DiagramError::delivery("input has no file name"))?,
        };
        let output_dir = match &request.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        fs::create_dir_all(&output_dir)?;
        let output_dir = fs::canonicalize(&output_dir)?;

        let scene = output_dir.join(format!("{}.excalidraw", name));
        let png = output_dir.join(format!("{}.png", name));
        let copied = input != scene;
        if copied {
            debug!(from = %input.display(), to = %scene.display(), "Copying scene");
            fs::copy(&input, &scene)?;
        }

        let mut report = DeliveryReport {
            excalidraw: scene.clone(),
            ..DeliveryReport::default()
        };

        match SceneDocument::load(&scene).and_then(|document| document.validate()) {
            Ok(()) => report.validation = true,
            Err(err) => {
                warn!(error = %err, "Scene failed validation");
                report.validation_error = Some(err.to_string());
            }
        }

        match self.rasterizer.rasterize(&scene, &png) {
            Ok(path) => report.png = Some(path),
            Err(err) => report.render_error = Some(err.to_string()),
        }

        if request.vault {
            let vault = self.copy_to_vault(&scene, report.png.as_deref());
            report.vault_excalidraw = vault.excalidraw;
            report.vault_png = vault.png;
            report.vault_error = vault.error;
        }

        if report.png.is_some() && !request.cleanup.is_empty() {
            let mut targets = request.cleanup.clone();
            if copied && input.starts_with(TEMP_PREFIX) {
                targets.push(input.clone());
            }
            for target in targets {
                match fs::remove_file(&target) {
                    Ok(()) => report.cleaned.push(target),
                    Err(err) => debug!(path = %target.display(), error = %err, "Cleanup skipped"),
                }
            }
        }

        info!(
            png = report.png.is_some(),
            validation = report.validation,
            "Delivery finished"
        );
        Ok(report)
    }
}

fn copy_into(vault: &Path, scene: &Path, png: Option<&Path>) -> Result<(PathBuf, Option<PathBuf>)> {
    fs::create_dir_all(vault)?;
    let target = |path: &Path| -> Result<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| DiagramError::delivery(format!("{} has no file name", path.display())))?;
        let destination = vault.join(file_name);
        fs::copy(path, &destination)?;
        Ok(destination)
    };
    let excalidraw = target(scene)?;
    let png = match png {
        Some(path) => Some(target(path)?),
        None => None,
    };
    Ok((excalidraw, png))
}

/// Deliver using the environment's rasterizer and vault
pub fn deliver(request: &DeliveryRequest) -> Result<DeliveryReport> {
    Delivery::from_env()?.deliver(request)
}
