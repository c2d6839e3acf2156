//! Prompt library for LLM enrichment
//!
//! One template per intent. Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finai/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Templates are markdown with YAML frontmatter and `# System` / `# User`
//! sections. `{{name}}` placeholders are replaced at render time.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Intent;

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const ADD_EXPENSE: &str = include_str!("../../../prompts/add_expense.md");
    pub const SHOW_ANALYTICS: &str = include_str!("../../../prompts/show_analytics.md");
    pub const GIVE_ADVICE: &str = include_str!("../../../prompts/give_advice.md");
}

/// Known prompt IDs, one per actionable intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    AddExpense,
    ShowAnalytics,
    GiveAdvice,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddExpense => "add_expense",
            Self::ShowAnalytics => "show_analytics",
            Self::GiveAdvice => "give_advice",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::AddExpense, Self::ShowAnalytics, Self::GiveAdvice]
    }

    /// Template used to enrich an utterance of the given intent.
    ///
    /// `Unknown` gets the expense template, the most common request.
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::ShowAnalytics => Self::ShowAnalytics,
            Intent::GiveAdvice => Self::GiveAdvice,
            Intent::AddExpense | Intent::Unknown => Self::AddExpense,
        }
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::AddExpense => defaults::ADD_EXPENSE,
            Self::ShowAnalytics => defaults::SHOW_ANALYTICS,
            Self::GiveAdvice => defaults::GIVE_ADVICE,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|id| id.as_str()).collect();
                Error::InvalidData(format!(
                    "Unknown prompt '{}'. Known prompts: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the wording changes
    pub version: u32,
    /// Intent label the template answers for
    pub intent: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// Body after the frontmatter (system + user sections)
    pub content: String,
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the user section (or the whole body if it has none)
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        substitute(self.user_section().unwrap_or(&self.content), vars)
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a prompt library with the default override directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Embedded defaults only, ignoring any user overrides
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::InvalidData(format!("Prompt '{}' missing from cache", id)))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(override_path) = self.override_path(id) {
            if override_path.exists() {
                let content = fs::read_to_string(&override_path).map_err(|e| {
                    Error::InvalidData(format!("Failed to read prompt override: {}", e))
                })?;
                let (metadata, body) = parse_prompt(&content)?;
                return Ok(Prompt {
                    metadata,
                    content: body,
                    is_override: true,
                    override_path: Some(override_path),
                });
            }
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
            override_path: None,
        })
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let has_override = self.has_override(id);
                let override_path = if has_override {
                    self.override_path(id)
                } else {
                    None
                };
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    intent: prompt
                        .map(|p| p.metadata.intent.clone())
                        .unwrap_or_default(),
                    has_override,
                    override_path,
                }
            })
            .collect()
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some_and(|p| p.exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Drop cached prompts so edited override files are picked up
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub intent: String,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finai").join("prompts").join("overrides"))
}

/// Split a prompt file into frontmatter metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content.strip_prefix("---").ok_or_else(|| {
        Error::InvalidData("Prompt must start with YAML frontmatter (---)".into())
    })?;

    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Mustache-style `{{key}}` replacement; unknown placeholders are left as is
fn substitute(template: &str, vars: &HashMap<&str, &str>) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}
