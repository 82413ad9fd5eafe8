// src/options.rs
//! The explicit configuration surface for a scan.
//!
//! Nothing in the pipeline reads global state: every tunable is carried in
//! [`ScanOptions`] (or [`SimParams`] for the layout engine) and validated
//! up front, so a bad value fails before any I/O happens.

use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{ConfigError, Result};
use crate::lang::Lang;

/// Directory/file glob patterns excluded from every walk by default.
/// Callers may replace the list wholesale via [`ScanOptions::ignore_patterns`].
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/.git/**",
    "**/.hg/**",
    "**/.svn/**",
    "**/node_modules/**",
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/.next/**",
    "**/.nuxt/**",
    "**/coverage/**",
    "**/.cache/**",
    "**/.idea/**",
    "**/.vscode/**",
    "**/.mypy_cache/**",
    "**/.pytest_cache/**",
];

/// Extensions never worth modeling as graph nodes.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "ico", "svg", "pdf", "zip", "tar",
    "gz", "tgz", "7z", "rar", "woff", "woff2", "ttf", "otf", "mp3", "mp4",
    "mov", "avi", "exe", "dll", "so", "dylib", "bin", "sqlite", "db",
];

/// Filenames (stems) that get the entry-point bonus regardless of their
/// position in the graph.
pub const DEFAULT_ENTRY_POINTS: &[&str] = &[
    "main", "app", "server", "cli", "index", "manage", "wsgi", "asgi", "lib", "mod",
];

/// Relative contribution of each signal to a node's raw importance.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub in_degree: f64,
    pub out_degree: f64,
    pub size: f64,
    pub entry_point_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            in_degree: 2.0,
            out_degree: 0.5,
            size: 1.0,
            entry_point_bonus: 4.0,
        }
    }
}

/// How bare module specifiers collapse to concrete files.
///
/// The exact fallback ordering is deliberately configuration, not inference:
/// the resolver tries the relative join, each script suffix, each index
/// basename, then each source root, in the order given here.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    /// Roots tried for bare (non-relative) specifiers, e.g. `src`.
    pub source_roots: Vec<String>,
    /// Suffixes appended to an extensionless candidate, in order.
    pub script_suffixes: Vec<String>,
    /// Basenames tried inside a directory candidate (`index` covers
    /// `index.ts`, `index.js`, ... via `script_suffixes`).
    pub index_basenames: Vec<String>,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            source_roots: vec!["src".into()],
            script_suffixes: vec![
                ".ts".into(),
                ".tsx".into(),
                ".js".into(),
                ".jsx".into(),
                ".json".into(),
            ],
            index_basenames: vec!["index".into()],
        }
    }
}

/// Cooperative cancellation budget for the walk/extract stage. On
/// exhaustion the pipeline returns a partial graph flagged as truncated
/// instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ScanBudget {
    pub max_files: Option<usize>,
    pub max_elapsed: Option<Duration>,
}

/// Everything a [`scan`](crate::scan) invocation needs to know.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Glob-style ignore patterns (`*`, `**`, directory anchors).
    pub ignore_patterns: Vec<String>,
    /// Maximum directory depth below the root (`None` = unbounded).
    pub max_depth: Option<usize>,
    /// Extension overrides checked before the built-in table.
    pub language_map: Vec<(String, Lang)>,
    /// Stems receiving the entry-point scoring bonus.
    pub entry_points: Vec<String>,
    pub weights: ScoreWeights,
    pub resolution: ResolutionPolicy,
    pub budget: ScanBudget,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_depth: None,
            language_map: Vec::new(),
            entry_points: DEFAULT_ENTRY_POINTS.iter().map(ToString::to_string).collect(),
            weights: ScoreWeights::default(),
            resolution: ResolutionPolicy::default(),
            budget: ScanBudget::default(),
        }
    }
}

impl ScanOptions {
    /// Validates the options and compiles the ignore set.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a malformed glob, a negative or
    /// non-finite weight, or an empty extension in the language map.
    /// Nothing downstream can recover from these, so they are fatal.
    pub fn validate(&self) -> Result<CompiledOptions> {
        let ignore = compile_globs(&self.ignore_patterns)?;

        // A pattern anchored with a trailing `/**` ignores everything under
        // a directory; the stripped form lets the walker prune that
        // directory without descending into it.
        let mut dir_patterns: Vec<String> = self.ignore_patterns.clone();
        for pattern in &self.ignore_patterns {
            if let Some(stripped) = pattern.strip_suffix("/**") {
                if !stripped.is_empty() {
                    dir_patterns.push(stripped.to_string());
                }
            }
        }
        let prune = compile_globs(&dir_patterns)?;

        for (name, value) in [
            ("in_degree", self.weights.in_degree),
            ("out_degree", self.weights.out_degree),
            ("size", self.weights.size),
            ("entry_point_bonus", self.weights.entry_point_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        if self.language_map.iter().any(|(ext, _)| ext.is_empty()) {
            return Err(ConfigError::EmptyExtension);
        }

        Ok(CompiledOptions { ignore, prune })
    }

    /// Language detection honoring the configured overrides.
    #[must_use]
    pub fn lang_for_ext(&self, ext: &str) -> Option<Lang> {
        self.language_map
            .iter()
            .find(|(e, _)| e == ext)
            .map(|(_, l)| *l)
            .or_else(|| Lang::from_ext(ext))
    }
}

fn compile_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| ConfigError::InvalidIgnorePattern {
            pattern: String::from("<combined>"),
            source,
        })
}

/// Artifacts of successful validation, threaded through the walk.
pub struct CompiledOptions {
    /// Matched against forward-slashed relative file paths.
    pub ignore: GlobSet,
    /// Matched against directory paths to skip whole subtrees.
    pub prune: GlobSet,
}

/// Tunables for the force-directed layout simulation.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Fixed iteration count; the simulation never runs to convergence.
    pub iterations: u32,
    pub repulsion: f32,
    pub spring: f32,
    /// Rest length for a weight-1 edge; heavier edges pull closer.
    pub spring_rest_length: f32,
    pub centering: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub radius_per_degree: f32,
    /// Final positions are rescaled into `[-w/2, w/2] x [-h/2, h/2]`.
    pub viewport: (f32, f32),
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            iterations: 200,
            repulsion: 6000.0,
            spring: 0.06,
            spring_rest_length: 120.0,
            centering: 0.01,
            min_radius: 8.0,
            max_radius: 40.0,
            radius_per_degree: 2.0,
            viewport: (1200.0, 800.0),
        }
    }
}

impl SimParams {
    /// # Errors
    /// Returns [`ConfigError`] for a zero iteration count, non-positive
    /// viewport, or inverted radius bounds.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        let (width, height) = self.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        if self.min_radius > self.max_radius {
            return Err(ConfigError::InvertedRadiusBounds {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        Ok(())
    }
}
