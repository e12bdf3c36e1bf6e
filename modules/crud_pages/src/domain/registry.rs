//! Module configuration registry
//!
//! An immutable map from stable keys to module configurations, plus the page
//! bindings routes use to select (and optionally derive) a configuration.
//! Built once at startup; lookups hand out shared `Arc`s, derivations hand out
//! fresh values.

use crate::contract::{ModuleConfig, PageBinding, MANAGED_COLUMNS};
use crate::contract::FieldType;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors raised while assembling the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate module key: {0}")]
    DuplicateKey(String),

    #[error("Invalid module '{key}': {reason}")]
    InvalidModule { key: String, reason: String },

    #[error("Duplicate page binding: {0}")]
    DuplicatePage(String),

    #[error("Page '{page}' is bound to unknown module '{module}'")]
    UnknownModule { page: String, module: String },

    #[error("Failed to load module catalog {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

/// On-disk catalog of extra modules and page bindings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleCatalog {
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
    #[serde(default)]
    pub pages: Vec<PageBinding>,
}

impl ModuleCatalog {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

/// Immutable registry of module configurations and page bindings
#[derive(Debug)]
pub struct ModuleRegistry {
    modules: Vec<Arc<ModuleConfig>>,
    index: HashMap<String, usize>,
    pages: Vec<PageBinding>,
    page_index: HashMap<String, usize>,
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Configuration for `key`.
    ///
    /// # Panics
    /// Looking up an undeclared key is a programmer error and panics. Use
    /// [`ModuleRegistry::try_get`] for keys coming from user input.
    pub fn get(&self, key: &str) -> Arc<ModuleConfig> {
        match self.try_get(key) {
            Some(config) => config,
            None => panic!("module '{key}' is not declared in the registry"),
        }
    }

    pub fn try_get(&self, key: &str) -> Option<Arc<ModuleConfig>> {
        self.index.get(key).map(|&i| Arc::clone(&self.modules[i]))
    }

    /// Declared modules in declaration order
    pub fn modules(&self) -> impl Iterator<Item = &Arc<ModuleConfig>> {
        self.modules.iter()
    }

    /// Explicit page bindings in declaration order
    pub fn pages(&self) -> impl Iterator<Item = &PageBinding> {
        self.pages.iter()
    }

    pub fn binding(&self, page: &str) -> Option<&PageBinding> {
        self.page_index.get(page).map(|&i| &self.pages[i])
    }

    /// Configuration a page renders with.
    ///
    /// Explicit bindings win; otherwise every module key is implicitly a page
    /// of the same name without overrides.
    pub fn resolve_page(&self, page: &str) -> Option<Arc<ModuleConfig>> {
        match self.binding(page) {
            Some(binding) => {
                let base = self.try_get(&binding.module)?;
                if binding.overrides.is_empty() {
                    Some(base)
                } else {
                    Some(Arc::new(base.derive(&binding.overrides)))
                }
            }
            None => self.try_get(page),
        }
    }

    /// Every configuration the store must be able to serve: declared modules
    /// and the derived configurations of explicit bindings
    pub fn storage_configs(&self) -> Vec<Arc<ModuleConfig>> {
        let mut configs: Vec<Arc<ModuleConfig>> = self.modules.clone();
        configs.extend(self.pages.iter().filter_map(|b| self.resolve_page(&b.name)));
        configs
    }
}

/// Collects modules and bindings, then validates them in [`RegistryBuilder::build`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleConfig>,
    pages: Vec<PageBinding>,
}

impl RegistryBuilder {
    pub fn module(mut self, config: ModuleConfig) -> Self {
        self.modules.push(config);
        self
    }

    pub fn page(mut self, binding: PageBinding) -> Self {
        self.pages.push(binding);
        self
    }

    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.modules.extend(catalog.modules);
        self.pages.extend(catalog.pages);
        self
    }

    /// Merge a YAML catalog file
    pub fn load_file(self, path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path).map_err(|e| RegistryError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let catalog = ModuleCatalog::from_yaml(&text).map_err(|e| RegistryError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            path = %path.display(),
            modules = catalog.modules.len(),
            pages = catalog.pages.len(),
            "Loaded module catalog"
        );
        Ok(self.catalog(catalog))
    }

    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut index = HashMap::new();
        for (i, config) in self.modules.iter().enumerate() {
            validate_module(config)?;
            if index.insert(config.key.clone(), i).is_some() {
                return Err(RegistryError::DuplicateKey(config.key.clone()));
            }
        }

        let mut page_index = HashMap::new();
        for (i, binding) in self.pages.iter().enumerate() {
            let Some(&base) = index.get(&binding.module) else {
                return Err(RegistryError::UnknownModule {
                    page: binding.name.clone(),
                    module: binding.module.clone(),
                });
            };
            if page_index.insert(binding.name.clone(), i).is_some() {
                return Err(RegistryError::DuplicatePage(binding.name.clone()));
            }
            validate_module(&self.modules[base].derive(&binding.overrides))?;
        }

        Ok(ModuleRegistry {
            modules: self.modules.into_iter().map(Arc::new).collect(),
            index,
            pages: self.pages,
            page_index,
        })
    }
}

fn validate_module(config: &ModuleConfig) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidModule {
        key: config.key.clone(),
        reason,
    };

    if config.key.trim().is_empty() {
        return Err(invalid("key must not be empty".into()));
    }
    if !is_identifier(&config.table) {
        return Err(invalid(format!("table '{}' is not a valid identifier", config.table)));
    }

    let mut seen = HashSet::new();
    for field in &config.fields {
        if !is_identifier(&field.name) {
            return Err(invalid(format!("field '{}' is not a valid identifier", field.name)));
        }
        if MANAGED_COLUMNS.contains(&field.name.as_str()) {
            return Err(invalid(format!("field '{}' collides with a managed column", field.name)));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(invalid(format!("duplicate field '{}'", field.name)));
        }
        match (field.field_type, field.options.is_empty()) {
            (FieldType::Select, true) => {
                return Err(invalid(format!("select field '{}' has no options", field.name)));
            }
            (FieldType::Select, false) | (_, true) => {}
            (_, false) => {
                return Err(invalid(format!(
                    "options on non-select field '{}'",
                    field.name
                )));
            }
        }
    }

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
