//! Intent classification — maps a tool invocation to semantic intent tags
//! using file-path category heuristics and command-text heuristics.

use crate::types::{FileCategory, Intent};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ToolInvocation
// ---------------------------------------------------------------------------

/// One hook call: the tool name plus its structured input. Doubles as the
/// wire format read from the hook's stdin.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolInvocation {
    #[serde(alias = "toolName", alias = "tool_name")]
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(
        default,
        alias = "autoSelect",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_select: Option<bool>,
}

/// Input keys scanned for a file path, in priority order.
const PATH_KEYS: &[&str] = &["path", "file_path", "filePath", "file", "filename"];

impl ToolInvocation {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input = Some(input);
        self
    }

    /// The file path carried in the input, checked across the known path
    /// keys in priority order.
    pub fn file_path(&self) -> Option<&str> {
        let input = self.input.as_ref()?;
        PATH_KEYS
            .iter()
            .find_map(|key| input.get(key).and_then(|v| v.as_str()))
    }

    /// The shell command carried in the input, if any.
    pub fn command(&self) -> Option<&str> {
        self.input
            .as_ref()?
            .get("command")
            .and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// File path classification
// ---------------------------------------------------------------------------

const CONFIG_BASENAMES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "tsconfig.json",
    "cargo.toml",
    "cargo.lock",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "go.mod",
    "go.sum",
    "gemfile",
    "gemfile.lock",
    "makefile",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
];

const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "env", "lock", "properties",
];

const DOCS_BASENAME_STEMS: &[&str] = &[
    "readme",
    "changelog",
    "license",
    "licence",
    "contributing",
    "authors",
    "notice",
    "copying",
    "code_of_conduct",
];

const DOCS_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc"];

/// Classify a file path into a category. Separators are normalized first;
/// test patterns have the highest priority, then config, then docs, with
/// impl as the default.
pub fn classify_file_path(path: &str) -> FileCategory {
    let normalized = path.replace('\\', "/").to_lowercase();
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let basename = segments.last().copied().unwrap_or("");

    if is_test_path(&segments, basename) {
        return FileCategory::Test;
    }
    if is_config_path(basename) {
        return FileCategory::Config;
    }
    if is_docs_path(&segments, basename) {
        return FileCategory::Docs;
    }
    FileCategory::Impl
}

fn is_test_path(segments: &[&str], basename: &str) -> bool {
    // Directory conventions: test/, tests/, __tests__/ anywhere in the path.
    // This also covers Rust's tests/*.rs integration layout.
    let dirs = &segments[..segments.len().saturating_sub(1)];
    if dirs
        .iter()
        .any(|s| matches!(*s, "test" | "tests" | "__tests__"))
    {
        return true;
    }
    // Infix markers: foo.test.ts, foo.spec.js, foo_test.py, Go's foo_test.go.
    if basename.contains(".test.") || basename.contains(".spec.") || basename.contains("_test.") {
        return true;
    }
    // Prefix marker: test_foo.py.
    if basename.starts_with("test_") {
        return true;
    }
    false
}

fn is_config_path(basename: &str) -> bool {
    if CONFIG_BASENAMES.contains(&basename) {
        return true;
    }
    // Dotfiles (.gitignore, .env, .eslintrc, …) are configuration.
    if basename.starts_with('.') && basename.len() > 1 {
        return true;
    }
    extension(basename)
        .map(|ext| CONFIG_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn is_docs_path(segments: &[&str], basename: &str) -> bool {
    let dirs = &segments[..segments.len().saturating_sub(1)];
    if dirs.iter().any(|s| matches!(*s, "doc" | "docs")) {
        return true;
    }
    let stem = basename.split('.').next().unwrap_or(basename);
    if DOCS_BASENAME_STEMS.contains(&stem) {
        return true;
    }
    extension(basename)
        .map(|ext| DOCS_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

fn extension(basename: &str) -> Option<&str> {
    basename.rsplit_once('.').map(|(_, ext)| ext)
}

// ---------------------------------------------------------------------------
// Command text classification
// ---------------------------------------------------------------------------

static COMMAND_PATTERNS: OnceLock<Vec<(Intent, Regex)>> = OnceLock::new();

/// Ordered pattern table for Bash command text. A command may match several
/// entries; results are deduplicated and order-independent.
fn command_patterns() -> &'static [(Intent, Regex)] {
    COMMAND_PATTERNS.get_or_init(|| {
        vec![
            (
                Intent::Commit,
                Regex::new(r"\bgit\b[^|;&]*\bcommit\b").unwrap(),
            ),
            (Intent::Push, Regex::new(r"\bgit\b[^|;&]*\bpush\b").unwrap()),
            (
                Intent::Deploy,
                Regex::new(r"\bdeploy\b|\bkubectl\s+apply\b|\bterraform\s+apply\b|\bhelm\s+(install|upgrade)\b")
                    .unwrap(),
            ),
            (
                Intent::Delete,
                Regex::new(r"\brm\b|\bunlink\b|\brmdir\b|\bgit\s+clean\b").unwrap(),
            ),
            (
                Intent::Write,
                Regex::new(r">>?|\btee\b|\bcp\b|\bmv\b|\btouch\b|\bsed\s+-i\b").unwrap(),
            ),
        ]
    })
}

// ---------------------------------------------------------------------------
// Tool → intents
// ---------------------------------------------------------------------------

/// Map a tool invocation to its classified intents.
///
/// - Bash commands are scanned against the ordered pattern table.
/// - Write/Edit/NotebookEdit yield a path-aware intent plus the generic
///   base when a path is present; the base alone when it is not — a
///   conservative fallback, since a path-less write could touch anything.
/// - Every other tool goes through a static lookup and usually yields
///   nothing.
pub fn map_tool_to_intents(invocation: &ToolInvocation) -> Vec<Intent> {
    match invocation.tool.as_str() {
        "Bash" => {
            let Some(command) = invocation.command() else {
                return Vec::new();
            };
            let mut intents = Vec::new();
            for (intent, pattern) in command_patterns() {
                if pattern.is_match(command) && !intents.contains(intent) {
                    intents.push(*intent);
                }
            }
            intents
        }
        "Write" => path_aware_intents(invocation, Intent::Write),
        "Edit" | "NotebookEdit" => path_aware_intents(invocation, Intent::Edit),
        other => static_tool_intents(other).to_vec(),
    }
}

fn path_aware_intents(invocation: &ToolInvocation, base: Intent) -> Vec<Intent> {
    match invocation.file_path() {
        Some(path) => {
            let specific = base.with_category(classify_file_path(path));
            // Specific first; dedup in case the category variant collapses
            // back to the base.
            if specific == base {
                vec![base]
            } else {
                vec![specific, base]
            }
        }
        None => vec![base],
    }
}

/// Static lookup for tools outside the Bash/Write/Edit families. Read-only
/// tools deliberately map to nothing so they are never gated.
fn static_tool_intents(tool: &str) -> &'static [Intent] {
    match tool {
        "Read" | "Glob" | "Grep" | "WebFetch" | "WebSearch" | "TodoWrite" => &[],
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// Blocked intent lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedIntent {
    pub intent: String,
    pub reason: String,
}

/// Pure lookup: for every classified intent present in `blocked`, return
/// the intent with the reason it is blocked. An unknown tool classifies to
/// nothing and so returns an empty result (fail-open).
pub fn find_blocked_intents(
    invocation: &ToolInvocation,
    blocked: &BTreeMap<String, String>,
) -> Vec<BlockedIntent> {
    map_tool_to_intents(invocation)
        .into_iter()
        .filter_map(|intent| {
            blocked.get(intent.as_str()).map(|reason| BlockedIntent {
                intent: intent.as_str().to_string(),
                reason: reason.clone(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
