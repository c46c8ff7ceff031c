pub mod builtin;
pub mod finding;
pub mod line;
pub mod policy;
pub mod structural;

use std::path::Path;

use crate::ir::Language;

pub use finding::{finding_id, Finding, RuleMetadata, Severity};

/// A detector inspects one file's bytes and produces findings.
pub trait Detector: Send + Sync {
    /// Type tag of the findings this detector reports.
    fn kind(&self) -> &str;

    fn severity(&self) -> Severity;

    fn cwe(&self) -> &str;

    /// Run the detector against one file. Never fails; a file it cannot
    /// analyze yields no findings.
    fn detect(&self, path: &Path, language: Language, content: &[u8]) -> Vec<Finding>;

    /// Metadata for every rule this detector carries.
    fn rules(&self) -> Vec<RuleMetadata>;
}

/// The rule engine runs all registered detectors against a file.
pub struct RuleEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl RuleEngine {
    /// Create a new engine with the line rules and the structural engine.
    pub fn new() -> Self {
        let mut detectors = line::all_detectors();
        detectors.push(Box::new(structural::StructuralEngine::new()));
        Self { detectors }
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Run all detectors against one file, concatenating their findings in
    /// registration order.
    pub fn run(&self, path: &Path, language: Language, content: &[u8]) -> Vec<Finding> {
        self.detectors
            .iter()
            .flat_map(|d| d.detect(path, language, content))
            .collect()
    }

    /// List metadata for all registered rules.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.detectors.iter().flat_map(|d| d.rules()).collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
