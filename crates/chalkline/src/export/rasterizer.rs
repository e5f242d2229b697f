//! External rasterizer invocation
//!
//! The rasterizer is any program that accepts `<scene> <image>` as its
//! last two arguments and writes the image.

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info, span, warn, Level};
use wait_timeout::ChildExt;

use crate::core::{DiagramError, Result};

/// Environment variable holding the rasterizer command line
pub const RASTERIZER_ENV: &str = "CHALKLINE_RASTERIZER";

/// Environment variable holding the rasterizer timeout in seconds
pub const TIMEOUT_ENV: &str = "CHALKLINE_RASTER_TIMEOUT";

pub const DEFAULT_COMMAND: &str = "node export_playwright.js";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rasterizer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Rasterizer {
    /// Program followed by its leading arguments
    pub fn new(command: Vec<String>) -> Result<Self> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| DiagramError::render("rasterizer command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// The child is killed once it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Split a whitespace-separated command line
    pub fn from_command_line(line: &str) -> Result<Self> {
        Self::new(line.split_whitespace().map(str::to_string).collect())
    }

    /// Command from `CHALKLINE_RASTERIZER` and timeout from
    /// `CHALKLINE_RASTER_TIMEOUT`, or the defaults
    pub fn from_env() -> Result<Self> {
        let rasterizer = match std::env::var(RASTERIZER_ENV) {
            Ok(line) if !line.trim().is_empty() => Self::from_command_line(&line)?,
            _ => Self::from_command_line(DEFAULT_COMMAND)?,
        };
        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => DEFAULT_TIMEOUT,
        };
        Ok(rasterizer.with_timeout(timeout))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render `scene` to `image`; the image must exist afterwards
    pub fn rasterize(&self, scene: &Path, image: &Path) -> Result<PathBuf> {
        let raster_span = span!(
            Level::INFO,
            "rasterize",
            program = %self.program,
            scene = %scene.display(),
            image = %image.display()
        );
        let _enter = raster_span.enter();

        let failed = |e: std::io::Error| {
            DiagramError::render(format!("failed to run '{}': {}", self.program, e))
        };
        let mut stderr = tempfile::tempfile().map_err(failed)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(scene)
            .arg(image)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr.try_clone().map_err(failed)?)
            .spawn()
            .map_err(failed)?;

        let Some(status) = child.wait_timeout(self.timeout).map_err(failed)? else {
            warn!(timeout_secs = self.timeout.as_secs_f64(), "Rasterizer timed out");
            if let Err(e) = child.kill() {
                debug!(error = %e, "Rasterizer exited before it could be killed");
            }
            child.wait().map_err(failed)?;
            return Err(DiagramError::render(format!(
                "'{}' timed out after {}s",
                self.program,
                self.timeout.as_secs_f64()
            )));
        };

        if !status.success() {
            let mut captured = Vec::new();
            stderr
                .seek(SeekFrom::Start(0))
                .and_then(|_| stderr.read_to_end(&mut captured))
                .map_err(failed)?;
            warn!(status = ?status.code(), "Rasterizer failed");
            return Err(DiagramError::render(format!(
                "'{}' exited with {}: {}",
                self.program,
                status,
                String::from_utf8_lossy(&captured).trim()
            )));
        }
        debug!("Rasterizer finished");

        if !image.exists() {
            return Err(DiagramError::render(format!(
                "'{}' succeeded but {} was not written",
                self.program,
                image.display()
            )));
        }
        info!(image = %image.display(), "Image written");
        Ok(image.to_path_buf())
    }
}

fn parse_timeout(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            DiagramError::render(format!(
                "{} must be a positive number of seconds, got '{}'",
                TIMEOUT_ENV, value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_split() {
        let rasterizer = Rasterizer::from_command_line("  node  export.js --scale 2 ").unwrap();
        assert_eq!(rasterizer.program(), "node");
        assert_eq!(rasterizer.args(), ["export.js", "--scale", "2"]);
    }

    #[test]
    fn test_empty_command_is_error() {
        assert!(matches!(
            Rasterizer::from_command_line("   ").unwrap_err(),
            DiagramError::Render { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("a.excalidraw");
        let image = dir.path().join("a.png");
        std::fs::write(&scene, "{}").unwrap();
        let rasterizer = Rasterizer::new(vec![
            "sh".into(),
            "-c".into(),
            "cp \"$0\" \"$1\"".into(),
        ])
        .unwrap();
        assert_eq!(rasterizer.rasterize(&scene, &image).unwrap(), image);
    }

    #[cfg(unix)]
    #[test]
    fn test_failures() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("a.excalidraw");
        let image = dir.path().join("a.png");

        let failing = Rasterizer::from_command_line("false").unwrap();
        assert!(failing.rasterize(&scene, &image).is_err());

        let silent = Rasterizer::from_command_line("true").unwrap();
        let err = silent.rasterize(&scene, &image).unwrap_err();
        assert!(err.to_string().contains("was not written"));

        let missing = Rasterizer::from_command_line("chalkline-no-such-program").unwrap();
        assert!(missing.rasterize(&scene, &image).is_err());

        let noisy = Rasterizer::new(vec!["sh".into(), "-c".into(), "echo broken >&2; exit 3".into()])
            .unwrap();
        let err = noisy.rasterize(&scene, &image).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_hung_rasterizer_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let scene = dir.path().join("a.excalidraw");
        let image = dir.path().join("a.png");
        let hung = Rasterizer::new(vec!["sh".into(), "-c".into(), "exec sleep 10".into()])
            .unwrap()
            .with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = hung.rasterize(&scene, &image).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, DiagramError::Render { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(Rasterizer::from_command_line("node").unwrap().timeout(), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout(" 2.5 ").unwrap(), Duration::from_millis(2500));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }
}
