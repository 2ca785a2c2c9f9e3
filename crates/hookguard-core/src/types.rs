use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Semantic tag for what a tool call would do. A single invocation may carry
/// several intents: a path-aware one (`write_test`) plus its generic base
/// (`write`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Write,
    WriteImpl,
    WriteTest,
    WriteDocs,
    WriteConfig,
    Edit,
    EditImpl,
    EditTest,
    EditDocs,
    EditConfig,
    Commit,
    Push,
    Deploy,
    Delete,
}

impl Intent {
    pub fn all() -> &'static [Intent] {
        &[
            Intent::Write,
            Intent::WriteImpl,
            Intent::WriteTest,
            Intent::WriteDocs,
            Intent::WriteConfig,
            Intent::Edit,
            Intent::EditImpl,
            Intent::EditTest,
            Intent::EditDocs,
            Intent::EditConfig,
            Intent::Commit,
            Intent::Push,
            Intent::Deploy,
            Intent::Delete,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Write => "write",
            Intent::WriteImpl => "write_impl",
            Intent::WriteTest => "write_test",
            Intent::WriteDocs => "write_docs",
            Intent::WriteConfig => "write_config",
            Intent::Edit => "edit",
            Intent::EditImpl => "edit_impl",
            Intent::EditTest => "edit_test",
            Intent::EditDocs => "edit_docs",
            Intent::EditConfig => "edit_config",
            Intent::Commit => "commit",
            Intent::Push => "push",
            Intent::Deploy => "deploy",
            Intent::Delete => "delete",
        }
    }

    /// The path-aware variant of a base intent for a given file category.
    /// Only `write` and `edit` have path-aware variants; anything else
    /// returns itself.
    pub fn with_category(self, category: FileCategory) -> Intent {
        match (self, category) {
            (Intent::Write, FileCategory::Test) => Intent::WriteTest,
            (Intent::Write, FileCategory::Config) => Intent::WriteConfig,
            (Intent::Write, FileCategory::Docs) => Intent::WriteDocs,
            (Intent::Write, FileCategory::Impl) => Intent::WriteImpl,
            (Intent::Edit, FileCategory::Test) => Intent::EditTest,
            (Intent::Edit, FileCategory::Config) => Intent::EditConfig,
            (Intent::Edit, FileCategory::Docs) => Intent::EditDocs,
            (Intent::Edit, FileCategory::Impl) => Intent::EditImpl,
            (other, _) => other,
        }
    }

    /// Test-scoped write/edit variants are low impact; everything else is
    /// high. Unknown tags default high via [`impact_of`].
    pub fn impact(self) -> IntentImpact {
        match self {
            Intent::WriteTest | Intent::EditTest => IntentImpact::Low,
            _ => IntentImpact::High,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = crate::error::GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::all()
            .iter()
            .find(|i| i.as_str() == s)
            .copied()
            .ok_or_else(|| crate::error::GuardError::InvalidIntent(s.to_string()))
    }
}

/// Impact of an intent tag that may not correspond to a known [`Intent`].
/// Unclassified tags are conservatively high impact.
pub fn impact_of(tag: &str) -> IntentImpact {
    tag.parse::<Intent>()
        .map(Intent::impact)
        .unwrap_or(IntentImpact::High)
}

// ---------------------------------------------------------------------------
// FileCategory
// ---------------------------------------------------------------------------

/// Classification of a file path. Priority when several patterns apply:
/// test > config > docs > impl (the default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Test,
    Config,
    Docs,
    Impl,
}

impl FileCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Test => "test",
            FileCategory::Config => "config",
            FileCategory::Docs => "docs",
            FileCategory::Impl => "impl",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TddPhase
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TddPhase {
    #[default]
    Blocked,
    Red,
    Green,
    Complete,
}

impl TddPhase {
    pub fn all() -> &'static [TddPhase] {
        &[
            TddPhase::Blocked,
            TddPhase::Red,
            TddPhase::Green,
            TddPhase::Complete,
        ]
    }

    /// The single canonical successor on the TDD cycle. The cycle wraps:
    /// complete → blocked.
    pub fn next(self) -> TddPhase {
        match self {
            TddPhase::Blocked => TddPhase::Red,
            TddPhase::Red => TddPhase::Green,
            TddPhase::Green => TddPhase::Complete,
            TddPhase::Complete => TddPhase::Blocked,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TddPhase::Blocked => "blocked",
            TddPhase::Red => "red",
            TddPhase::Green => "green",
            TddPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for TddPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TddPhase {
    type Err = crate::error::GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocked" => Ok(TddPhase::Blocked),
            "red" => Ok(TddPhase::Red),
            "green" => Ok(TddPhase::Green),
            "complete" => Ok(TddPhase::Complete),
            _ => Err(crate::error::GuardError::InvalidPhase(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// EnforcementTier
// ---------------------------------------------------------------------------

/// Per-skill enforcement strength. `Hard` is the default when a skill
/// declares no tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementTier {
    #[default]
    Hard,
    Soft,
    None,
}

impl EnforcementTier {
    pub fn as_str(self) -> &'static str {
        match self {
            EnforcementTier::Hard => "hard",
            EnforcementTier::Soft => "soft",
            EnforcementTier::None => "none",
        }
    }

    /// Whether this tier blocks an intent of the given impact.
    pub fn blocks(self, impact: IntentImpact) -> bool {
        match self {
            EnforcementTier::Hard => true,
            EnforcementTier::Soft => impact == IntentImpact::High,
            EnforcementTier::None => false,
        }
    }
}

impl fmt::Display for EnforcementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnforcementTier {
    type Err = crate::error::GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hard" => Ok(EnforcementTier::Hard),
            "soft" => Ok(EnforcementTier::Soft),
            "none" => Ok(EnforcementTier::None),
            _ => Err(crate::error::GuardError::InvalidTier(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// IntentImpact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentImpact {
    High,
    Low,
}

// ---------------------------------------------------------------------------
// Strictness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    #[default]
    Strict,
    Permissive,
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strictness::Strict => "strict",
            Strictness::Permissive => "permissive",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
