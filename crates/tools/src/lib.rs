//! Developer tooling: read-only inspection of the running sketch and of model files.
//!
//! # Invariants
//! - Inspectors never mutate what they look at.

mod inspector;

pub use inspector::{ModelReport, NodeInfo, ObjectReport, SketchInspector, SketchSummary};

pub fn crate_info() -> &'static str {
    "smoke-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
