//! Pre-update validation rules.
//!
//! Every orchestrator owns a [`ValidatorRegistry`]. Rules run in
//! registration order and the first failure aborts the update with
//! `ValidationFailed` naming the rule.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use designvault_core::semver::SemVer;
use designvault_core::value::serialized_len;
use designvault_core::{Collection, VersionBump};

use crate::options::UpdateOptions;
use crate::sections::{infer_version_type, matches_prefix, BREAKING_PREFIXES};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A validation rule over a proposed update.
///
/// `Err` carries the human-readable reason. Synchronous closures with the
/// same shape implement this trait directly.
#[async_trait]
pub trait UpdateValidator: Send + Sync {
    async fn validate(
        &self,
        collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
    ) -> Result<(), String>;
}

#[async_trait]
impl<F> UpdateValidator for F
where
    F: Fn(&Collection, &Value, &UpdateOptions) -> Result<(), String> + Send + Sync,
{
    async fn validate(
        &self,
        collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
    ) -> Result<(), String> {
        self(collection, updates, options)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub const SEMANTIC_VERSION: &str = "semantic-version";
pub const BREAKING_CHANGES: &str = "breaking-changes";
pub const ACCESSIBILITY: &str = "accessibility";
pub const PERFORMANCE: &str = "performance";

#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: IndexMap<String, Arc<dyn UpdateValidator>>,
}

impl ValidatorRegistry {
    /// A registry holding the four built-in rules.
    pub fn with_builtins(max_update_bytes: usize) -> Self {
        let mut registry = Self::default();
        registry.register(SEMANTIC_VERSION, Arc::new(SemanticVersionRule));
        registry.register(BREAKING_CHANGES, Arc::new(BreakingChangesRule));
        registry.register(ACCESSIBILITY, Arc::new(AccessibilityRule));
        registry.register(PERFORMANCE, Arc::new(PerformanceRule { max_update_bytes }));
        registry
    }

    /// Add a rule. Re-registering a name replaces the rule in place.
    pub fn register(&mut self, name: impl Into<String>, validator: Arc<dyn UpdateValidator>) {
        self.validators.insert(name.into(), validator);
    }

    pub fn names(&self) -> Vec<String> {
        self.validators.keys().cloned().collect()
    }

    /// The rules in run order.
    pub fn entries(&self) -> Vec<(String, Arc<dyn UpdateValidator>)> {
        self.validators
            .iter()
            .map(|(name, v)| (name.clone(), Arc::clone(v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Built-in rules
// ---------------------------------------------------------------------------

/// An explicit version must be `x.y.z` and newer than the current one.
pub struct SemanticVersionRule;

#[async_trait]
impl UpdateValidator for SemanticVersionRule {
    async fn validate(
        &self,
        collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
    ) -> Result<(), String> {
        let Some(raw) = options.version.as_deref() else {
            let bump = options
                .version_type
                .unwrap_or_else(|| infer_version_type(updates));
            return collection
                .version
                .bump(bump)
                .map(|_| ())
                .map_err(|_| format!("Version {} has no room for a {bump} bump", collection.version));
        };
        let version =
            SemVer::parse(raw).ok_or_else(|| format!("Version '{raw}' is not in semantic version format"))?;
        if version <= collection.version {
            return Err(format!(
                "Version {version} must be greater than current version {}",
                collection.version
            ));
        }
        Ok(())
    }
}

/// Keys under breaking-change prefixes need an explicit major bump.
pub struct BreakingChangesRule;

#[async_trait]
impl UpdateValidator for BreakingChangesRule {
    async fn validate(
        &self,
        _collection: &Collection,
        updates: &Value,
        options: &UpdateOptions,
    ) -> Result<(), String> {
        let breaking: Vec<&str> = updates
            .as_object()
            .map(|map| {
                map.keys()
                    .map(String::as_str)
                    .filter(|key| matches_prefix(key, BREAKING_PREFIXES))
                    .collect()
            })
            .unwrap_or_default();

        if !breaking.is_empty() && options.version_type != Some(VersionBump::Major) {
            return Err(format!(
                "Breaking changes detected in {} but versionType is not \"major\"",
                breaking.join(", ")
            ));
        }
        Ok(())
    }
}

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("valid regex")
});

/// Color values must be well-formed hex; `reducedMotion` must be a flag.
pub struct AccessibilityRule;

#[async_trait]
impl UpdateValidator for AccessibilityRule {
    async fn validate(
        &self,
        _collection: &Collection,
        updates: &Value,
        _options: &UpdateOptions,
    ) -> Result<(), String> {
        if let Some(colors) = updates.get("colors") {
            let mut invalid = Vec::new();
            collect_invalid_hex(colors, "colors", &mut invalid);
            if !invalid.is_empty() {
                return Err(format!("Invalid hex colors: {}", invalid.join(", ")));
            }
        }

        let reduced_motion = updates
            .get("accessibility")
            .and_then(|a| a.get("reducedMotion"));
        if let Some(value) = reduced_motion {
            if !value.is_boolean() {
                return Err("accessibility.reducedMotion must be a boolean".to_string());
            }
        }
        Ok(())
    }
}

fn collect_invalid_hex(value: &Value, path: &str, invalid: &mut Vec<String>) {
    match value {
        Value::String(s) if s.starts_with('#') && !HEX_COLOR_RE.is_match(s) => {
            invalid.push(format!("{path}={s}"));
        }
        Value::Object(map) => {
            for (key, child) in map {
                collect_invalid_hex(child, &format!("{path}.{key}"), invalid);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_invalid_hex(child, &format!("{path}[{i}]"), invalid);
            }
        }
        _ => {}
    }
}

/// Rejects payloads larger than the configured limit.
pub struct PerformanceRule {
    pub max_update_bytes: usize,
}

#[async_trait]
impl UpdateValidator for PerformanceRule {
    async fn validate(
        &self,
        _collection: &Collection,
        updates: &Value,
        _options: &UpdateOptions,
    ) -> Result<(), String> {
        let size = serialized_len(updates);
        if size > self.max_update_bytes {
            return Err(format!(
                "Update too large ({size} bytes, limit {}), might impact performance",
                self.max_update_bytes
            ));
        }
        Ok(())
    }
}
