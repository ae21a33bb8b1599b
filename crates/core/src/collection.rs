//! The Collection document: a named, versioned design-system tree.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::semver::SemVer;
use crate::status::StatusSet;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Top-level attribute sections every collection is created with.
pub const SECTIONS: &[&str] = &[
    "theme",
    "colors",
    "typography",
    "components",
    "icons",
    "animations",
    "layout",
    "tokens",
    "accessibility",
    "performance",
    "technical",
];

/// The empty attribute tree a new collection starts from.
pub fn default_attributes() -> Map<String, Value> {
    let tree = json!({
        "theme": {
            "primaryTheme": null,
            "supportedThemes": [],
            "darkModeSupport": false,
            "colorScheme": "light"
        },
        "colors": {
            "primary": {},
            "secondary": {},
            "modules": { "ai": {}, "nose": {}, "hunter": {} },
            "neutrals": {},
            "status": {},
            "gradients": {},
            "semantic": {}
        },
        "typography": {
            "fontFamilies": {
                "primary": null,
                "secondary": null,
                "monospace": null,
                "display": null
            },
            "fontSizes": {},
            "fontWeights": {},
            "lineHeights": {},
            "letterSpacing": {}
        },
        "components": {
            "buttons": { "variants": [], "sizes": [], "states": [] },
            "cards": { "variants": [], "themes": [], "effects": [] },
            "inputs": { "variants": [], "states": [], "validation": [] },
            "modals": { "sizes": [], "animations": [], "variants": [] },
            "navigation": { "types": [], "states": [], "responsive": [] }
        },
        "icons": {
            "libraries": [],
            "categories": {},
            "sizes": [],
            "themes": [],
            "animations": []
        },
        "animations": {
            "keyframes": [],
            "utilities": [],
            "durations": [],
            "easings": [],
            "interactions": []
        },
        "layout": {
            "breakpoints": {},
            "spacing": {},
            "grids": {},
            "containers": {}
        },
        "tokens": {
            "spacing": {},
            "borderRadius": {},
            "shadows": {},
            "opacity": {},
            "zIndex": {}
        },
        "accessibility": {
            "colorContrast": {},
            "focusManagement": {},
            "keyboardNavigation": {},
            "screenReaderSupport": {},
            "reducedMotion": false
        },
        "performance": {
            "bundleSize": {},
            "loadingStates": [],
            "optimizations": []
        },
        "technical": {
            "framework": null,
            "libraries": [],
            "buildTools": [],
            "cssFramework": null,
            "preprocessors": []
        }
    });
    match tree {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// A design-system collection.
///
/// The fixed header fields are typed; the nested attribute tree (theme,
/// colors, typography, ...) is kept as JSON and flattened next to them when
/// serialized, so the document form is a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: SemVer,
    #[serde(default)]
    pub status: StatusSet,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Collection {
    /// The collection as a single JSON document.
    pub fn to_document(&self) -> CoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild a collection from its document form.
    pub fn from_document(document: Value) -> CoreResult<Self> {
        serde_json::from_value(document)
            .map_err(|e| CoreError::validation("document", format!("Malformed collection: {e}")))
    }

    /// A top-level attribute section, if present and not null.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Derived read-only counts over the attribute tree.
    pub fn stats(&self) -> CollectionStats {
        let colors = self.attributes.get("colors");
        let color_tokens = ["/primary", "/modules/ai", "/modules/nose", "/modules/hunter"]
            .iter()
            .map(|p| object_len(colors.and_then(|c| c.pointer(p))))
            .sum();

        CollectionStats {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version,
            status: self.status.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            stats: StatCounts {
                color_tokens,
                components: object_len(self.attributes.get("components")),
                animations: array_len(self.pointer("/animations/keyframes")),
                icon_libraries: array_len(self.pointer("/icons/libraries")),
                breakpoints: object_len(self.pointer("/layout/breakpoints")),
                tech_libraries: array_len(self.pointer("/technical/libraries")),
            },
        }
    }

    fn pointer(&self, path: &str) -> Option<&Value> {
        let mut segments = path.trim_start_matches('/').splitn(2, '/');
        let head = segments.next()?;
        let root = self.attributes.get(head)?;
        match segments.next() {
            Some(rest) => root.pointer(&format!("/{rest}")),
            None => Some(root),
        }
    }
}

fn object_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_object).map_or(0, Map::len)
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub id: String,
    pub name: String,
    pub version: SemVer,
    pub status: StatusSet,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub stats: StatCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCounts {
    pub color_tokens: usize,
    pub components: usize,
    pub animations: usize,
    pub icon_libraries: usize,
    pub breakpoints: usize,
    pub tech_libraries: usize,
}
