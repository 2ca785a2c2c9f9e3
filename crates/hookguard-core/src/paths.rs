use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HOOKGUARD_DIR: &str = ".hookguard";
pub const SKILLS_DIR: &str = ".hookguard/skills";
pub const PROFILES_DIR: &str = ".hookguard/profiles";

pub const SESSION_FILE: &str = ".hookguard/session.json";
pub const PHASE_FILE: &str = ".hookguard/phase.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn hookguard_dir(root: &Path) -> PathBuf {
    root.join(HOOKGUARD_DIR)
}

pub fn skills_dir(root: &Path) -> PathBuf {
    root.join(SKILLS_DIR)
}

pub fn profiles_dir(root: &Path) -> PathBuf {
    root.join(PROFILES_DIR)
}

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_FILE)
}

pub fn phase_path(root: &Path) -> PathBuf {
    root.join(PHASE_FILE)
}
