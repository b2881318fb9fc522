//! Configuration loading and parsing.
//!
//! Reads `termview.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [render]
//! mode = "auto"              # auto | ansi | non_ansi | file
//! reset_after_render = true
//! overwrite_on_render = true
//!
//! [grid]
//! column_gutter = 0
//!
//! [table]
//! column_gutter = 1
//!
//! [screen]
//! hide_cursor = true
//! ```
//!
//! Every field is optional. Unknown fields are ignored so the file can grow
//! ahead of the code. A file that fails to parse yields the defaults; an
//! unrecognised `mode` resolves to `auto` with a warning.

use anyhow::Result;
use core_render::RendererOptions;
use core_terminal::OutputMode;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

pub const FILE_NAME: &str = "termview.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_mode")]
    pub mode: String,
    #[serde(default = "RenderConfig::default_true")]
    pub reset_after_render: bool,
    #[serde(default = "RenderConfig::default_true")]
    pub overwrite_on_render: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            reset_after_render: true,
            overwrite_on_render: true,
        }
    }
}

impl RenderConfig {
    fn default_mode() -> String {
        "auto".to_string()
    }
    const fn default_true() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct GridConfig {
    #[serde(default)]
    pub column_gutter: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TableConfig {
    #[serde(default = "TableConfig::default_gutter")]
    pub column_gutter: u16,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            column_gutter: Self::default_gutter(),
        }
    }
}

impl TableConfig {
    const fn default_gutter() -> u16 {
        1
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    #[serde(default = "ScreenConfig::default_hide_cursor")]
    pub hide_cursor: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            hide_cursor: Self::default_hide_cursor(),
        }
    }
}

impl ScreenConfig {
    const fn default_hide_cursor() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub path: Option<PathBuf>,
    pub file: ConfigFile,
}

/// Best-effort config path: `termview.toml` in the working directory, then
/// the platform config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("termview").join(FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_not_found");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            debug!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                path: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// The configured output mode; unknown names fall back to `Auto`.
    pub fn output_mode(&self) -> OutputMode {
        match self.file.render.mode.parse::<OutputMode>() {
            Ok(mode) => mode,
            Err(e) => {
                warn!(target: "config", error = %e, "render_mode_unknown");
                OutputMode::Auto
            }
        }
    }

    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            mode: self.output_mode(),
            reset_after_render: self.file.render.reset_after_render,
        }
    }

    pub fn overwrite_on_render(&self) -> bool {
        self.file.render.overwrite_on_render
    }

    pub fn grid_gutter(&self) -> u16 {
        self.file.grid.column_gutter
    }

    pub fn table_gutter(&self) -> u16 {
        self.file.table.column_gutter
    }

    pub fn hide_cursor(&self) -> bool {
        self.file.screen.hide_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.output_mode(), OutputMode::Auto);
        assert!(cfg.renderer_options().reset_after_render);
        assert!(cfg.overwrite_on_render());
        assert_eq!(cfg.grid_gutter(), 0);
        assert_eq!(cfg.table_gutter(), 1);
        assert!(cfg.hide_cursor());
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_every_section() {
        let tmp = write_config(
            "[render]\nmode = \"non_ansi\"\nreset_after_render = false\noverwrite_on_render = false\n\
             [grid]\ncolumn_gutter = 2\n[table]\ncolumn_gutter = 3\n[screen]\nhide_cursor = false\n",
        );
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(
            cfg.renderer_options(),
            RendererOptions {
                mode: OutputMode::NonAnsi,
                reset_after_render: false,
            }
        );
        assert!(!cfg.overwrite_on_render());
        assert_eq!(cfg.grid_gutter(), 2);
        assert_eq!(cfg.table_gutter(), 3);
        assert!(!cfg.hide_cursor());
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let tmp = write_config("[render]\nmode = \"file\"\n[future]\nknob = 1\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.output_mode(), OutputMode::File);
        assert!(cfg.file.render.reset_after_render);
        assert_eq!(cfg.table_gutter(), 1);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = write_config("[grid]\ncolumn_gutter = \"wide\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn unknown_mode_logs_under_config_target() {
        let tmp = write_config("[render]\nmode = \"sixel\"\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let mode = with_default(subscriber, || cfg.output_mode());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("render_mode_unknown"));
        assert_eq!(mode, OutputMode::Auto);
    }
}
