//! Gemfile inspection

use crate::error::{AssetsError, AssetsResult};
use regex::bytes::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

/// Matches a `gem "rails"` or `gem 'rails'` declaration
fn rails_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"gem ["']rails["']"#).unwrap())
}

/// Decides whether a Gemfile declares the rails gem
pub trait GemfileParser: Send + Sync {
    /// `Ok(false)` when the Gemfile does not exist
    fn has_rails(&self, path: &Path) -> AssetsResult<bool>;
}

/// Line-based Gemfile scan
#[derive(Debug, Clone, Copy, Default)]
pub struct LineGemfileParser;

impl LineGemfileParser {
    pub fn new() -> Self {
        Self
    }
}

impl GemfileParser for LineGemfileParser {
    fn has_rails(&self, path: &Path) -> AssetsResult<bool> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(AssetsError::GemfileParse { source: e }),
        };

        // Gemfiles may carry comments in any encoding; match on raw bytes
        for line in BufReader::new(file).split(b'\n') {
            let line = line.map_err(|e| AssetsError::GemfileParse { source: e })?;
            if rails_pattern().is_match(&line) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
