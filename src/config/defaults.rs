//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn title() -> String {
        "Dashboard".into()
    }

    pub fn theme() -> String {
        "cosmo".into()
    }

    pub fn output_dir() -> String {
        "_site".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn output() -> PathBuf {
        "build".into()
    }
}

// ============================================================================
// [render] Section Defaults
// ============================================================================

pub mod render {
    pub fn command() -> Vec<String> {
        vec!["quarto".into()]
    }
}
