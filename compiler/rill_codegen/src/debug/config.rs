//! Debug info configuration types and error definitions.

use rill_types::Idx;

use super::files::PrefixMap;

/// Debug information detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugLevel {
    /// No debug information.
    #[default]
    None,
    /// Line tables only: subprograms and locations, no variables.
    LineTablesOnly,
    /// Full debug information (types, variables, scopes).
    Full,
}

impl DebugLevel {
    /// Name of the compile unit's emission kind.
    pub(crate) fn emission_kind(self) -> &'static str {
        match self {
            Self::None => "NoDebug",
            Self::LineTablesOnly => "LineTablesOnly",
            Self::Full => "FullDebug",
        }
    }

    /// Check if debug info should be generated.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::LineTablesOnly => write!(f, "line-tables"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Debug format for different platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFormat {
    /// DWARF format (Linux, macOS, WASM).
    #[default]
    Dwarf,
    /// `CodeView` format (Windows, MSVC toolchain).
    CodeView,
}

impl DebugFormat {
    /// Determine the appropriate debug format for a target triple.
    #[must_use]
    pub fn for_target(target: &str) -> Self {
        if target.contains("windows") && target.contains("msvc") {
            Self::CodeView
        } else {
            Self::Dwarf
        }
    }

    #[must_use]
    pub fn is_dwarf(&self) -> bool {
        matches!(self, Self::Dwarf)
    }

    #[must_use]
    pub fn is_codeview(&self) -> bool {
        matches!(self, Self::CodeView)
    }
}

impl std::fmt::Display for DebugFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dwarf => write!(f, "DWARF"),
            Self::CodeView => write!(f, "CodeView"),
        }
    }
}

/// Configuration for debug information generation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugInfoConfig {
    /// Debug information detail level.
    pub level: DebugLevel,
    /// Whether this is an optimized build.
    pub optimized: bool,
    /// DWARF version recorded at finalize (4 or 5).
    /// Only applicable when format is DWARF.
    pub dwarf_version: u32,
    /// Debug format (DWARF or `CodeView`).
    pub format: DebugFormat,
    /// Producer string of the compile unit.
    pub producer: String,
    /// Compilation directory of the compile unit.
    pub compile_dir: String,
    /// Ordered path rewrites applied to every file name; first match wins.
    pub prefix_maps: Vec<PrefixMap>,
}

impl Default for DebugInfoConfig {
    fn default() -> Self {
        Self {
            level: DebugLevel::None,
            optimized: false,
            dwarf_version: 4,
            format: DebugFormat::Dwarf,
            producer: concat!("rill ", env!("CARGO_PKG_VERSION")).to_string(),
            compile_dir: String::new(),
            prefix_maps: Vec::new(),
        }
    }
}

impl DebugInfoConfig {
    /// Create a new debug info configuration with the given level.
    #[must_use]
    pub fn new(level: DebugLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Full debug info, unoptimized.
    #[must_use]
    pub fn development() -> Self {
        Self::new(DebugLevel::Full)
    }

    /// Line tables on an optimized build.
    #[must_use]
    pub fn release_with_debug() -> Self {
        Self {
            level: DebugLevel::LineTablesOnly,
            optimized: true,
            ..Default::default()
        }
    }

    /// Create a configuration appropriate for a target triple.
    #[must_use]
    pub fn for_target(level: DebugLevel, target: &str) -> Self {
        Self {
            level,
            format: DebugFormat::for_target(target),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_optimized(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }

    /// Set the DWARF version (4 or 5).
    #[must_use]
    pub fn with_dwarf_version(mut self, version: u32) -> Self {
        self.dwarf_version = version;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: DebugFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    #[must_use]
    pub fn with_compile_dir(mut self, dir: impl Into<String>) -> Self {
        self.compile_dir = dir.into();
        self
    }

    /// Append a prefix rewrite. Earlier maps take precedence.
    #[must_use]
    pub fn with_prefix_map(mut self, source: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.prefix_maps.push(PrefixMap::new(source, replacement));
        self
    }
}

/// Error type for debug info operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebugInfoError {
    /// A type category with no descriptor mapping (tuples).
    #[error("no debug descriptor for type `{name}` ({category})")]
    UnhandledType { name: String, category: &'static str },
    /// A basic kind with no DWARF encoding (untyped nil).
    #[error("basic type `{name}` has no debug encoding")]
    UnhandledBasicKind { name: String },
    /// A signature whose parameters contradict its variadic flag.
    #[error("malformed signature `{name}`: {reason}")]
    MalformedSignature { name: String, reason: &'static str },
    /// A named type whose definition was never resolved.
    #[error("named type `{name}` has no underlying type")]
    UnresolvedNamedType { name: String },
    /// A handle that does not belong to the pool.
    #[error("type handle {0:?} is not in the pool")]
    UnknownType(Idx),
    /// `push_function` while another function is active.
    #[error("cannot enter `{entering}`: function `{active}` is still active")]
    FunctionAlreadyActive { active: String, entering: String },
}

#[cold]
#[inline(never)]
pub(super) fn unhandled_type(name: String, category: &'static str) -> DebugInfoError {
    DebugInfoError::UnhandledType { name, category }
}

#[cold]
#[inline(never)]
pub(super) fn malformed_signature(name: &str, reason: &'static str) -> DebugInfoError {
    DebugInfoError::MalformedSignature {
        name: name.to_string(),
        reason,
    }
}
