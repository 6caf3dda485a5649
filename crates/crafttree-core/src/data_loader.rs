//! Data-driven recipe registration from RON, TOML, or JSON.
//!
//! Feature-gated behind `data-loader`. A recipe set lists base materials and
//! craftables; craftables give their recipe either as a spec string
//! (`"wood:2, iron:1"`) or as structured ingredient entries. Entries are
//! registered in file order with the same validation as interactive input,
//! so a craftable may only reference items listed before it.
//!
//! Loading is all-or-nothing: the set is applied to a copy of the registry
//! and committed only if every entry registers cleanly.

use crate::error::CraftError;
use crate::registry::Registry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error: {detail}")]
    Parse { detail: String },

    /// A craftable entry sets both `recipe` and `ingredients`.
    #[error("craftable '{name}' sets both 'recipe' and 'ingredients'")]
    AmbiguousRecipe { name: String },

    /// An entry was rejected by the registry.
    #[error("registry error: {0}")]
    Registry(#[from] CraftError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Top-level recipe set.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeSetData {
    #[serde(default)]
    pub base_materials: Vec<String>,
    #[serde(default)]
    pub craftables: Vec<CraftableData>,
}

/// A craftable entry.
#[derive(Debug, Deserialize)]
pub struct CraftableData {
    pub name: String,
    /// Recipe spec string, e.g. `"wood:2, iron:1"`.
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientData>,
}

/// A structured recipe ingredient.
#[derive(Debug, Deserialize)]
pub struct IngredientData {
    pub item: String,
    pub quantity: u64,
}

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Parse a recipe set from text in the given format.
pub fn parse_recipe_set(content: &str, format: Format) -> Result<RecipeSetData, DataLoadError> {
    let parsed = match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| DataLoadError::Parse { detail })
}

/// Register every entry of `data` into `registry`, atomically.
pub fn apply_recipe_set(registry: &mut Registry, data: &RecipeSetData) -> Result<(), DataLoadError> {
    let mut staged = registry.clone();

    for name in &data.base_materials {
        staged.add_base_material(name)?;
    }

    for craftable in &data.craftables {
        match (&craftable.recipe, craftable.ingredients.is_empty()) {
            (Some(_), false) => {
                return Err(DataLoadError::AmbiguousRecipe {
                    name: craftable.name.clone(),
                });
            }
            (Some(spec), true) => {
                staged.add_craftable(&craftable.name, spec)?;
            }
            (None, _) => {
                staged.add_craftable_with(
                    &craftable.name,
                    craftable
                        .ingredients
                        .iter()
                        .map(|entry| (entry.item.as_str(), entry.quantity)),
                )?;
            }
        }
    }

    debug!(
        base_materials = data.base_materials.len(),
        craftables = data.craftables.len(),
        "applied recipe set"
    );
    *registry = staged;
    Ok(())
}

/// Parse `content` and register it into `registry`.
pub fn load_recipe_str(
    registry: &mut Registry,
    content: &str,
    format: Format,
) -> Result<(), DataLoadError> {
    let data = parse_recipe_set(content, format)?;
    apply_recipe_set(registry, &data)
}

/// Read a recipe file (format detected from its extension) and register it
/// into `registry`.
pub fn load_recipe_file(registry: &mut Registry, path: &Path) -> Result<(), DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    load_recipe_str(registry, &content, format)
}

// ===========================================================================
// Tests
// ===========================================================================
