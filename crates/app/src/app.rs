mod paths;

pub use paths::AppPaths;

use std::marker::PhantomData;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub paths: AppPaths,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.paths.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const QUALIFIER: &'static str = "com";
    const ORGANIZATION: &'static str = "chantier";
}

/// Builder for creating applications with proper initialization.
pub struct AppBuilder<A: Application> {
    version: &'static str,
    console: bool,
    filter: Option<String>,
    paths: Option<AppPaths>,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    pub fn new(version: &'static str) -> Self {
        Self {
            version,
            console: false,
            filter: None,
            paths: None,
            _marker: PhantomData,
        }
    }

    /// Mirror log output on stderr. Leave off while a TUI owns the terminal.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// `EnvFilter` directive overriding the build-profile default
    /// (`info` in debug, `warn` in release). `RUST_LOG` still wins.
    pub fn filter(mut self, directive: impl Into<String>) -> Self {
        self.filter = Some(directive.into());
        self
    }

    pub fn paths(mut self, paths: AppPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Resolve directories, make sure they exist and install the global
    /// tracing subscriber (non-blocking file layer, optional console layer).
    pub fn build(self) -> Result<AppContext, BoxError> {
        let paths = self
            .paths
            .unwrap_or_else(|| AppPaths::resolve(A::QUALIFIER, A::ORGANIZATION, A::APP_ID));
        paths.ensure_directories()?;

        let log_file_path = paths.log_file_now();
        let log_dir = log_file_path
            .parent()
            .ok_or("log file path has no parent directory")?;
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path has no file name")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::Layer::default()
            .with_target(false)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(env_filter(self.filter.as_deref()));

        let console_layer = self.console.then(|| {
            fmt::Layer::default()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(env_filter(self.filter.as_deref()))
        });

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .with(ErrorLayer::default())
            .try_init()?;

        tracing::info!(app = A::APP_ID, version = self.version, log = ?log_file_path, "logging initialized");

        Ok(AppContext {
            paths,
            version: self.version,
            _log_guard: guard,
        })
    }
}

fn default_level() -> LevelFilter {
    #[cfg(debug_assertions)]
    let level = LevelFilter::INFO;

    #[cfg(not(debug_assertions))]
    let level = LevelFilter::WARN;

    level
}

fn env_filter(directive: Option<&str>) -> EnvFilter {
    let fallback = directive
        .map(str::to_string)
        .unwrap_or_else(|| default_level().to_string());
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Demo;

    impl Application for Demo {
        const APP_ID: &'static str = "demo";
    }

    #[test]
    fn explicit_filter_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(
            env_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(env_filter(None).max_level_hint(), Some(default_level()));
    }

    #[test]
    fn build_creates_directories_and_log_file() {
        let root = tempfile::tempdir().unwrap();
        let paths = AppPaths::with_dirs("demo", root.path().join("d"), root.path().join("c"));
        let ctx = AppBuilder::<Demo>::new("0.0.1")
            .paths(paths)
            .build()
            .unwrap();
        assert_eq!(ctx.app_id(), "demo");
        assert_eq!(ctx.version(), "0.0.1");
        assert!(ctx.paths().logs_dir().is_dir());
    }
}
