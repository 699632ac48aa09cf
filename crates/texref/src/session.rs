//! Shared setup for the command-line tools: flags, logging, project loading.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use texref_core::{Document, FileId, Scope};
use texref_loader::{LoadResult, Loader};
use texref_resolve::{CommandTable, Resolver, Settings};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Settings file picked up next to the root document when `--config` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "texref.json";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for IDE/tooling integration
    Json,
}

/// Which files a lookup searches, relative to the file being looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Only the file itself
    File,
    /// The file and everything it includes
    Closure,
    /// Every loaded file (default)
    #[default]
    Project,
}

impl ScopeArg {
    /// The scope rooted at `file`.
    pub const fn for_file(self, file: FileId) -> Scope {
        match self {
            Self::File => Scope::File(file),
            Self::Closure => Scope::IncludeClosure(file),
            Self::Project => Scope::Project,
        }
    }
}

/// Flags shared by every tool.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Settings file (default: texref.json next to FILE, if present)
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Which files lookups search
    #[arg(long, short = 's', value_enum, default_value = "project")]
    pub scope: ScopeArg,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Install the tracing subscriber. Logs go to stderr.
///
/// `--verbose` forces `DEBUG`; otherwise `RUST_LOG` decides, defaulting to warnings.
pub fn init_logging(verbose: bool) {
    let builder = tracing_subscriber::fmt().with_writer(std::io::stderr);
    // A subscriber may already be installed when running under the test harness.
    let _ = if verbose {
        builder.with_max_level(Level::DEBUG).try_init()
    } else {
        builder
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .try_init()
    };
}

/// A loaded project plus the command table in effect.
#[derive(Debug)]
pub struct Session {
    /// The loaded project and its load errors.
    pub load: LoadResult,
    /// Command table from the settings file, or the defaults.
    pub table: Arc<CommandTable>,
}

impl Session {
    /// Load `file` and its includes, and read the settings in effect.
    pub fn open(file: &Path, config: Option<&Path>) -> Result<Self> {
        if !file.exists() {
            bail!("file not found: {}", file.display());
        }

        let config = config.map(Path::to_path_buf).or_else(|| {
            let candidate = file.parent()?.join(DEFAULT_CONFIG_NAME);
            candidate.is_file().then_some(candidate)
        });
        let table = match &config {
            Some(config) => {
                debug!("using settings {}", config.display());
                Settings::load(config)
                    .and_then(|settings| settings.to_table())
                    .with_context(|| format!("failed to load settings {}", config.display()))?
            }
            None => CommandTable::default(),
        };

        let load = Loader::new()
            .load(file)
            .with_context(|| format!("failed to load {}", file.display()))?;
        Ok(Self {
            load,
            table: Arc::new(table),
        })
    }

    /// A resolver over the loaded project.
    pub fn resolver(&self, scope: Scope) -> Resolver<'_> {
        Resolver::new(&self.load.project)
            .with_table(Arc::clone(&self.table))
            .with_scope(scope)
    }

    /// The root document's id.
    pub const fn root(&self) -> FileId {
        self.load.root
    }

    /// A loaded document by id.
    pub fn document(&self, id: FileId) -> Option<&Document> {
        self.load.project.get(id)
    }

    /// The loaded file at `path`, or the root file if `path` is `None`.
    pub fn focus(&self, path: Option<&Path>) -> Result<FileId> {
        let Some(path) = path else {
            return Ok(self.root());
        };
        let canonical = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()))?;
        self.load
            .project
            .get_by_path(&canonical)
            .with_context(|| format!("{} is not part of the loaded project", path.display()))
    }
}

/// Parse `LINE:COL` (both 1-based).
pub fn parse_position(text: &str) -> Result<(usize, usize), String> {
    let (line, col) = text
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("'{part}' is not a positive number"))
    };
    Ok((parse(line)?, parse(col)?))
}
