//! Pipeline configuration from `pipeline.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                   |
//! |--------------|-------------------------------------------|
//! | `[pipeline]` | Run options (normalize)                   |
//! | `[[rule]]`   | Ordered transforms, see [`crate::rules`]  |
//!
//! ```toml
//! [pipeline]
//! normalize = true
//!
//! [[rule]]
//! match = "script"
//! action = "delete"
//! ```

mod error;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::log;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::rules::{Rule, RuleTransform};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pipeline.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run options
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Transforms, applied in file order
    #[serde(default, rename = "rule")]
    pub rules: Vec<Rule>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Merge adjacent text nodes after the run.
    #[serde(default = "default_true")]
    pub normalize: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self { normalize: true }
    }
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Load and validate a config file.
    ///
    /// Unknown fields are reported as warnings, not errors.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let (config, _) = Self::parse_with_ignored(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {} (ignored):", path.display());
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Compile every rule, reporting all failures at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compile_rules().map(|_| ())
    }

    fn compile_rules(&self) -> Result<Vec<RuleTransform>, ConfigError> {
        let mut diagnostics = ConfigDiagnostics::new();
        let mut transforms = Vec::with_capacity(self.rules.len());

        for (index, rule) in self.rules.iter().enumerate() {
            match rule.compile() {
                Ok(transform) => transforms.push(transform),
                Err(err) => diagnostics.error(format!("rule[{index}].{}", err.field()), err),
            }
        }

        diagnostics.into_result()?;
        Ok(transforms)
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            normalize: self.pipeline.normalize,
        }
    }

    /// Build a pipeline running the rules in file order.
    pub fn build_pipeline(&self) -> Result<Pipeline<'static>, ConfigError> {
        let mut pipeline = Pipeline::with_options(self.options());
        for transform in self.compile_rules()? {
            pipeline.push(transform);
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{parse, render};
    use crate::rules::Action;
    use std::io::Write;

    const SAMPLE: &str = r##"
[pipeline]
normalize = false

[[rule]]
match = "script"
action = "delete"

[[rule]]
match = "span"
attr = "class=wrap"
action = "unwrap"

[[rule]]
match = "#text"
text = "hello"
action = "replace"
with = "42"
"##;

    #[test]
    fn test_parse_sample() {
        let config = PipelineConfig::parse(SAMPLE).unwrap();

        assert!(!config.pipeline.normalize);
        assert_eq!(config.rules.len(), 3);
        assert_eq!(config.rules[0], Rule::new("script", Action::Delete));
        assert_eq!(config.rules[1].attr.as_deref(), Some("class=wrap"));
        assert_eq!(config.rules[2].with.as_deref(), Some("42"));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::parse("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert!(config.options().normalize);
        assert!(config.build_pipeline().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let content = "[pipeline]\nnormalise = true\n\n[[rule]]\nmatch = \"p\"\naction = \"keep\"\ncolour = 1\n";
        let (config, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f.contains("normalise")));
        assert!(ignored.iter().any(|f| f.contains("colour")));
    }

    #[test]
    fn test_invalid_action_is_toml_error() {
        let err = PipelineConfig::parse("[[rule]]\nmatch = \"p\"\naction = \"explode\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_rule_errors_are_collected() {
        let content = r#"
[[rule]]
match = ""
action = "delete"

[[rule]]
match = "p"
action = "keep"

[[rule]]
match = "b"
action = "replace"
"#;
        let err = PipelineConfig::parse(content).unwrap_err();
        let ConfigError::Diagnostics(diagnostics) = err else {
            panic!("expected diagnostics, got {err}");
        };

        let fields: Vec<_> = diagnostics.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["rule[0].match", "rule[2].with"]);
    }

    #[test]
    fn test_from_path_and_build() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        let mut pipeline = config.build_pipeline().unwrap();
        assert_eq!(pipeline.len(), 3);
        assert!(!pipeline.options().normalize);

        let mut doc = parse(r#"<p>a<span class="wrap">hello</span><script>x()</script></p>"#).unwrap();
        let root = doc.root();
        pipeline.run(&mut doc, root).unwrap();

        assert_eq!(render(&doc, root), "<p>a42</p>");
        // Without normalization the text nodes stay separate.
        let p = doc.first_child(root).unwrap();
        assert_eq!(doc.children(p).count(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let err = PipelineConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(p, _) if p == path));
    }
}
