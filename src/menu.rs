//! Menu tree definition: sections, items, and the service list.
//!
//! The tree is plain data: an item carries an opaque `handler` key or a list
//! of child items, never behavior. Keys are resolved against the registry
//! once at startup, which keeps the whole tree serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::CoreError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    /// Opaque key resolved by the handler registry. Mutually exclusive
    /// with `items`.
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Static content shown by the built-in `text:` handler.
    #[serde(default)]
    pub body: Vec<String>,
    /// Child items; a non-empty list makes this item navigable.
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl MenuItem {
    pub fn is_navigable(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// Health-check spec consumed by the status ticker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSpec {
    pub name: String,
    /// Command whose exit status decides reachability.
    pub command: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuTree {
    pub sections: Vec<MenuSection>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

impl MenuTree {
    /// Load from YAML (default) or JSON, then validate.
    pub fn load(path: &Path) -> Result<MenuTree, CoreError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            CoreError::MenuDefinition(format!("cannot read {}: {err}", path.display()))
        })?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let tree: MenuTree = if is_json {
            serde_json::from_str(&raw).map_err(|err| {
                CoreError::MenuDefinition(format!("{}: {err}", path.display()))
            })?
        } else {
            serde_yaml::from_str(&raw).map_err(|err| {
                CoreError::MenuDefinition(format!("{}: {err}", path.display()))
            })?
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Built-in tree used when no menu file is given.
    pub fn builtin() -> MenuTree {
        let tree = MenuTree {
            sections: vec![
                MenuSection {
                    title: "Overview".into(),
                    items: vec![
                        MenuItem {
                            id: "welcome".into(),
                            label: "Welcome".into(),
                            icon: "⌂".into(),
                            handler: Some("text:welcome".into()),
                            enabled: true,
                            body: vec![
                                "termdeck is running with its built-in menu.".into(),
                                String::new(),
                                "Point --menu at a YAML or JSON file to".into(),
                                "define your own sections and actions.".into(),
                            ],
                            items: Vec::new(),
                        },
                        MenuItem {
                            id: "services".into(),
                            label: "Services".into(),
                            icon: "⚙".into(),
                            handler: Some("services".into()),
                            enabled: true,
                            body: Vec::new(),
                            items: Vec::new(),
                        },
                    ],
                },
                MenuSection {
                    title: "System".into(),
                    items: vec![
                        MenuItem {
                            id: "disk".into(),
                            label: "Disk usage".into(),
                            icon: "▤".into(),
                            handler: Some("cmd:df -h".into()),
                            enabled: true,
                            body: Vec::new(),
                            items: Vec::new(),
                        },
                        MenuItem {
                            id: "uptime".into(),
                            label: "Uptime".into(),
                            icon: "↻".into(),
                            handler: Some("cmd:uptime".into()),
                            enabled: true,
                            body: Vec::new(),
                            items: Vec::new(),
                        },
                    ],
                },
            ],
            services: Vec::new(),
        };
        debug_assert!(tree.validate().is_ok());
        tree
    }

    /// Structural rules enforced before the terminal is touched:
    /// at least one section, exactly one of handler/children per item,
    /// unique ids and unique handler keys across the whole tree.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sections.is_empty() {
            return Err(CoreError::MenuDefinition(
                "menu tree has no sections".into(),
            ));
        }
        let mut ids = HashSet::new();
        let mut handlers = HashSet::new();
        for section in &self.sections {
            if section.title.trim().is_empty() {
                return Err(CoreError::MenuDefinition(
                    "section with an empty title".into(),
                ));
            }
            for item in &section.items {
                validate_item(item, &mut ids, &mut handlers)?;
            }
        }
        Ok(())
    }

    /// Total number of items, submenu items included.
    pub fn item_count(&self) -> usize {
        fn count(items: &[MenuItem]) -> usize {
            items.iter().map(|i| 1 + count(&i.items)).sum()
        }
        self.sections.iter().map(|s| count(&s.items)).sum()
    }
}

fn validate_item(
    item: &MenuItem,
    ids: &mut HashSet<String>,
    handlers: &mut HashSet<String>,
) -> Result<(), CoreError> {
    if !ids.insert(item.id.clone()) {
        return Err(CoreError::MenuDefinition(format!(
            "duplicate item id `{}`",
            item.id
        )));
    }
    match (&item.handler, item.items.is_empty()) {
        (Some(key), true) => {
            if !handlers.insert(key.clone()) {
                return Err(CoreError::MenuDefinition(format!(
                    "duplicate handler key `{key}`"
                )));
            }
        }
        (None, false) => {}
        (Some(_), false) => {
            return Err(CoreError::MenuDefinition(format!(
                "item `{}` has both a handler and child items",
                item.id
            )));
        }
        (None, true) => {
            return Err(CoreError::MenuDefinition(format!(
                "item `{}` has neither a handler nor child items",
                item.id
            )));
        }
    }
    for child in &item.items {
        validate_item(child, ids, handlers)?;
    }
    Ok(())
}
