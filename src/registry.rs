//! Handler registry: opaque menu keys resolved to typed callables.
//!
//! Menu items stay pure data; the only behavior lives here. Keys are
//! resolved once at startup so a typo in the menu file fails fast instead
//! of at the first keypress. Built-in key shapes:
//!
//! - `cmd:<command line>` runs the command as a background job, streaming
//!   output into the content pane;
//! - `text:<name>` shows the item's static `body` lines;
//! - `services` is the live service panel fed by the status ticker.

use std::collections::HashMap;

use crate::content::{ContentBuffer, Line};
use crate::error::CoreError;
use crate::job::{spawn_command, CommandJob};
use crate::menu::{MenuItem, MenuTree};
use crate::render::{DirtyQueue, RegionId};
use crate::ticker::ServiceStatus;

/// Mutable slice of the app the handlers may touch. Navigation state is
/// deliberately absent: handlers write content, nothing else.
pub struct AppContext<'a> {
    pub content: &'a mut ContentBuffer,
    pub dirty: &'a mut DirtyQueue,
    pub jobs: &'a mut Vec<CommandJob>,
    pub services: &'a [ServiceStatus],
}

impl AppContext<'_> {
    /// Replace the pane; the one way content reaches the screen.
    pub fn update(&mut self, title: &str, lines: Vec<Line>) {
        self.content.update(title, lines);
        self.dirty.push(RegionId::Content);
    }
}

pub type Handler = Box<dyn Fn(&mut AppContext) -> Result<(), CoreError> + Send>;

pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            handlers: HashMap::new(),
        }
    }

    /// Register a callable under a key; duplicate keys are definition bugs.
    pub fn register(&mut self, key: &str, handler: Handler) -> Result<(), CoreError> {
        if self.handlers.contains_key(key) {
            return Err(CoreError::MenuDefinition(format!(
                "handler key `{key}` registered twice"
            )));
        }
        self.handlers.insert(key.to_string(), handler);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Invoke the handler for `key`. Unknown keys and handler errors both
    /// surface as recoverable `HandlerFailure`s.
    pub fn run(&self, key: &str, ctx: &mut AppContext) -> Result<(), CoreError> {
        match self.handlers.get(key) {
            Some(handler) => handler(ctx),
            None => Err(CoreError::handler(key, "no handler registered")),
        }
    }

    /// Build a registry covering every handler key in the tree, wiring the
    /// built-in key shapes. Unknown shapes fail startup.
    pub fn with_builtins(tree: &MenuTree) -> Result<Registry, CoreError> {
        let mut registry = Registry::new();
        for section in &tree.sections {
            for item in &section.items {
                register_item(&mut registry, item)?;
            }
        }
        Ok(registry)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn register_item(registry: &mut Registry, item: &MenuItem) -> Result<(), CoreError> {
    if let Some(key) = &item.handler {
        let handler = builtin_handler(key, item)?;
        registry.register(key, handler)?;
    }
    for child in &item.items {
        register_item(registry, child)?;
    }
    Ok(())
}

fn builtin_handler(key: &str, item: &MenuItem) -> Result<Handler, CoreError> {
    if let Some(cmdline) = key.strip_prefix("cmd:") {
        let cmdline = cmdline.trim().to_string();
        let key = key.to_string();
        let label = item.label.clone();
        return Ok(Box::new(move |ctx: &mut AppContext| {
            let job = spawn_command(&key, &cmdline)?;
            ctx.update(
                &label,
                vec![Line::dim(format!("$ {cmdline}")), Line::dim("running...")],
            );
            ctx.jobs.push(job);
            Ok(())
        }));
    }
    if key.starts_with("text:") {
        let title = item.label.clone();
        let body = item.body.clone();
        return Ok(Box::new(move |ctx: &mut AppContext| {
            let lines = if body.is_empty() {
                vec![Line::dim("(no content)")]
            } else {
                body.iter().map(|row| Line::normal(row.as_str())).collect()
            };
            ctx.update(&title, lines);
            Ok(())
        }));
    }
    if key == "services" {
        let title = item.label.clone();
        return Ok(Box::new(move |ctx: &mut AppContext| {
            let lines = if ctx.services.is_empty() {
                vec![Line::dim("no services configured")]
            } else {
                ctx.services
                    .iter()
                    .map(|svc| Line::volatile(format!("svc:{}", svc.name), svc.summary()))
                    .collect()
            };
            ctx.update(&title, lines);
            Ok(())
        }));
    }
    Err(CoreError::MenuDefinition(format!(
        "item `{}` uses unknown handler shape `{key}`",
        item.id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, handler: &str) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: id.into(),
            icon: String::new(),
            handler: Some(handler.into()),
            enabled: true,
            body: vec!["line one".into()],
            items: Vec::new(),
        }
    }

    fn context_parts() -> (ContentBuffer, DirtyQueue, Vec<CommandJob>, Vec<ServiceStatus>) {
        let mut content = ContentBuffer::new();
        content.set_viewport(10);
        (content, DirtyQueue::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::new();
        registry
            .register("k", Box::new(|_| Ok(())))
            .expect("first registration");
        assert!(registry.register("k", Box::new(|_| Ok(()))).is_err());
    }

    #[test]
    fn unknown_key_is_a_recoverable_failure() {
        let registry = Registry::new();
        let (mut content, mut dirty, mut jobs, services) = context_parts();
        let mut ctx = AppContext {
            content: &mut content,
            dirty: &mut dirty,
            jobs: &mut jobs,
            services: &services,
        };
        let err = registry.run("missing", &mut ctx).unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn text_handler_renders_the_item_body() {
        let tree = MenuTree {
            sections: vec![crate::menu::MenuSection {
                title: "S".into(),
                items: vec![item("notes", "text:notes")],
            }],
            services: Vec::new(),
        };
        let registry = Registry::with_builtins(&tree).expect("registry");
        let (mut content, mut dirty, mut jobs, services) = context_parts();
        let mut ctx = AppContext {
            content: &mut content,
            dirty: &mut dirty,
            jobs: &mut jobs,
            services: &services,
        };
        registry.run("text:notes", &mut ctx).expect("run");
        assert_eq!(content.title(), "notes");
        assert_eq!(content.visible()[0].text, "line one");
        assert_eq!(dirty.take(), vec![RegionId::Content]);
    }

    #[test]
    fn cmd_handler_starts_a_job() {
        let tree = MenuTree {
            sections: vec![crate::menu::MenuSection {
                title: "S".into(),
                items: vec![item("echo", "cmd:echo hi")],
            }],
            services: Vec::new(),
        };
        let registry = Registry::with_builtins(&tree).expect("registry");
        let (mut content, mut dirty, mut jobs, services) = context_parts();
        let mut ctx = AppContext {
            content: &mut content,
            dirty: &mut dirty,
            jobs: &mut jobs,
            services: &services,
        };
        registry.run("cmd:echo hi", &mut ctx).expect("run");
        assert_eq!(jobs.len(), 1);
        assert!(content.visible()[0].text.starts_with("$ echo hi"));
    }

    #[test]
    fn services_handler_tags_volatile_rows() {
        let tree = MenuTree {
            sections: vec![crate::menu::MenuSection {
                title: "S".into(),
                items: vec![item("svc", "services")],
            }],
            services: Vec::new(),
        };
        let registry = Registry::with_builtins(&tree).expect("registry");
        let (mut content, mut dirty, mut jobs, _) = context_parts();
        let services = vec![ServiceStatus::pending("api")];
        let mut ctx = AppContext {
            content: &mut content,
            dirty: &mut dirty,
            jobs: &mut jobs,
            services: &services,
        };
        registry.run("services", &mut ctx).expect("run");
        assert!(content.update_volatile("svc:api", "api up"));
    }

    #[test]
    fn unknown_handler_shape_fails_startup() {
        let tree = MenuTree {
            sections: vec![crate::menu::MenuSection {
                title: "S".into(),
                items: vec![item("weird", "magic:beans")],
            }],
            services: Vec::new(),
        };
        let err = Registry::with_builtins(&tree).unwrap_err();
        assert!(err.to_string().contains("unknown handler shape"));
    }
}
