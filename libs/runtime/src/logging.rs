use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{level_filters::LevelFilter, Level, Metadata};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression, suffix::AppendCount, ContentLimit, FileRotate,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const DEFAULT_SECTION: &str = "default";

/// `None` means the sink is switched off. Unknown names fall back to INFO.
fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// `target` belongs to `prefix` when equal to it or nested under `prefix::`.
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with("::"))
        .unwrap_or(false)
}

// ---- rotating file sinks ----

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .flush()
    }
}

/// Writer handed to the fmt layer; drops output when no file is routed.
struct SinkHandle(Option<RotatingFile>);

impl Write for SinkHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Chooses the log file for a record by its target prefix.
#[derive(Clone, Default)]
struct FileRouter {
    fallback: Option<RotatingFile>,
    by_prefix: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn route(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_prefix(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.fallback.clone())
    }

    fn is_empty(&self) -> bool {
        self.fallback.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = SinkHandle;

    fn make_writer(&'a self) -> Self::Writer {
        SinkHandle(self.fallback.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SinkHandle(self.route(meta.target()))
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_file(
    path: &Path,
    section: &Section,
) -> Result<RotatingFile, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let rotate = FileRotate::new(
        path,
        AppendCount::new(section.max_backups.unwrap_or(3)),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(RotatingFile(Arc::new(Mutex::new(rotate))))
}

fn file_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotatingFile> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    match open_rotating_file(&path, section) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "failed to open log file for '{name}' at {}: {e}",
                path.display()
            );
            None
        }
    }
}

// ---- layer assembly ----

/// Splits the config into the catch-all section and named subsystem sections.
struct Plan<'a> {
    fallback: Option<&'a Section>,
    subsystems: Vec<(&'a str, &'a Section)>,
}

impl<'a> Plan<'a> {
    fn from_config(cfg: &'a LoggingConfig) -> Self {
        let mut subsystems: Vec<(&str, &Section)> = cfg
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
            .map(|(name, section)| (name.as_str(), section))
            .collect();
        // Longest prefix first so nested subsystems win over their parents.
        subsystems.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self {
            fallback: cfg.get(DEFAULT_SECTION),
            subsystems,
        }
    }

    fn subsystem_names(&self) -> Vec<String> {
        self.subsystems.iter().map(|(n, _)| n.to_string()).collect()
    }

    fn targets(&self, level_of: impl Fn(&Section) -> Option<Level>, files_only: bool) -> Targets {
        let mut targets = Targets::new().with_default(LevelFilter::OFF);
        for (name, section) in &self.subsystems {
            if files_only && section.file.trim().is_empty() {
                continue;
            }
            if let Some(level) = level_of(section) {
                targets = targets.with_target(*name, LevelFilter::from_level(level));
            }
        }
        targets
    }

    fn router(&self, base_dir: &Path) -> FileRouter {
        FileRouter {
            fallback: self
                .fallback
                .and_then(|s| file_for_section(DEFAULT_SECTION, s, base_dir)),
            by_prefix: self
                .subsystems
                .iter()
                .filter_map(|(name, s)| {
                    file_for_section(name, s, base_dir).map(|f| (name.to_string(), f))
                })
                .collect(),
        }
    }
}

type CatchAll = FilterFn<Box<dyn Fn(&Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Accepts records up to `max` that no named subsystem claims.
fn catch_all_filter(claimed: Vec<String>, max: Level) -> CatchAll {
    FilterFn::new(Box::new(move |meta: &Metadata<'_>| {
        !claimed.iter().any(|c| matches_prefix(meta.target(), c)) && meta.level() <= &max
    }))
}

fn console_layer(ansi: bool) -> fmt::Layer<Registry> {
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
}

/// Initialize the global subscriber from the `logging` config section.
/// Relative log file paths resolve against `base_dir` (the server home dir).
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` records before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let plan = Plan::from_config(cfg);
    let router = plan.router(base_dir);
    let ansi = std::io::stdout().is_terminal();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(
        console_layer(ansi)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(plan.targets(|s| parse_level(&s.console_level), false))
            .boxed(),
    );

    if let Some(fallback) = plan.fallback {
        if let Some(level) = parse_level(&fallback.console_level) {
            layers.push(
                console_layer(ansi)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_filter(catch_all_filter(plan.subsystem_names(), level))
                    .boxed(),
            );
        }
    }

    if !router.is_empty() {
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router.clone())
                .with_filter(plan.targets(|s| parse_level(&s.file_level), true))
                .boxed(),
        );

        let fallback_file_level = plan
            .fallback
            .filter(|_| router.fallback.is_some())
            .and_then(|s| parse_level(&s.file_level));
        if let Some(level) = fallback_file_level {
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_writer(router)
                    .with_filter(catch_all_filter(plan.subsystem_names(), level))
                    .boxed(),
            );
        }
    }

    let _ = Registry::default().with(layers).try_init();
}
