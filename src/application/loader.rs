//! Extension loader - keeps track of extensions and what they registered

use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::ExtensionError;
use crate::domain::entities::{Command, CommandRegistry, ScheduledTask};
use crate::domain::traits::{EventKind, EventListener, Extension, Listener, TaskCallback};
use crate::infrastructure::i18n::LocalizationProvider;

struct ExtensionEntry {
    extension: Arc<dyn Extension>,
    disabled: bool,
    loaded: bool,
}

/// Registered extensions plus the commands, listeners and tasks of the loaded ones
#[derive(Default)]
pub struct ExtensionLoader {
    extensions: Vec<ExtensionEntry>,
    commands: CommandRegistry,
    listeners: Vec<(String, Listener)>,
    tasks: HashMap<String, (String, ScheduledTask)>,
}

impl ExtensionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Arc<dyn Extension>, disabled: bool) {
        self.extensions.push(ExtensionEntry {
            extension,
            disabled,
            loaded: false,
        });
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut ExtensionEntry, ExtensionError> {
        self.extensions
            .iter_mut()
            .find(|e| e.extension.id() == id)
            .ok_or_else(|| ExtensionError::NotFound(id.to_string()))
    }

    /// Registers the commands, listeners and tasks of extension `id`
    pub fn load(&mut self, id: &str, localizer: &LocalizationProvider) -> Result<(), ExtensionError> {
        let entry = self.entry_mut(id)?;
        if entry.loaded {
            return Err(ExtensionError::AlreadyLoaded(id.to_string()));
        }
        entry.loaded = true;
        let extension = entry.extension.clone();

        let commands = extension.commands();
        let count = commands.len();
        for mut command in commands {
            command.extension = Some(id.to_string());
            for alias in localizer.command_aliases(&command.name) {
                if !command.aliases.contains(&alias) {
                    command.aliases.push(alias);
                }
            }
            self.commands.register(command);
        }

        for listener in extension.listeners() {
            self.listeners.push((id.to_string(), listener));
        }

        for task in extension.tasks() {
            self.tasks.insert(task.id.clone(), (id.to_string(), task));
        }

        tracing::debug!(target: "loader", "Loaded `{}` extension with {} commands", id, count);
        Ok(())
    }

    /// Loads every registered extension that isn't disabled. Failures are logged.
    pub fn load_all(&mut self, localizer: &LocalizationProvider) -> usize {
        let ids: Vec<String> = self
            .extensions
            .iter()
            .filter(|e| !e.disabled && !e.loaded)
            .map(|e| e.extension.id().to_string())
            .collect();

        let mut loaded = 0;
        for id in ids {
            match self.load(&id, localizer) {
                Ok(()) => loaded += 1,
                Err(e) => tracing::error!(target: "loader", "Failed to load `{}` extension: {}", id, e),
            }
        }
        loaded
    }

    /// Removes everything extension `id` registered
    pub fn unload(&mut self, id: &str) -> Result<(), ExtensionError> {
        let entry = self.entry_mut(id)?;
        if !entry.loaded {
            return Ok(());
        }
        entry.loaded = false;

        let names: Vec<String> = self
            .commands
            .all()
            .filter(|c| c.extension.as_deref() == Some(id))
            .map(|c| c.name.clone())
            .collect();
        for name in names {
            self.commands.remove(&name);
        }

        self.listeners.retain(|(owner, _)| owner != id);
        self.tasks.retain(|_, (owner, _)| owner != id);

        tracing::debug!(target: "loader", "Unloaded `{}` extension", id);
        Ok(())
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.loaded && e.extension.id() == id)
    }

    /// Loaded extensions in registration order
    pub fn extensions(&self) -> Vec<Arc<dyn Extension>> {
        self.extensions
            .iter()
            .filter(|e| e.loaded)
            .map(|e| e.extension.clone())
            .collect()
    }

    pub fn extension(&self, id: &str) -> Option<Arc<dyn Extension>> {
        self.extensions
            .iter()
            .find(|e| e.loaded && e.extension.id() == id)
            .map(|e| e.extension.clone())
    }

    pub fn command(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.find(name)
    }

    /// Commands of extension `id`, sorted by name
    pub fn commands_of(&self, id: &str) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self
            .commands
            .all()
            .filter(|c| c.extension.as_deref() == Some(id))
            .cloned()
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// Every loaded command, sorted by name
    pub fn commands(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self.commands.all().cloned().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    pub fn listeners_for(&self, kind: EventKind) -> Vec<Arc<dyn EventListener>> {
        self.listeners
            .iter()
            .filter(|(_, l)| l.kind == kind)
            .map(|(_, l)| l.handler.clone())
            .collect()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.values().map(|(_, task)| task)
    }

    pub fn add_task(&mut self, owner: impl Into<String>, task: ScheduledTask) {
        self.tasks.insert(task.id.clone(), (owner.into(), task));
    }

    pub fn remove_task(&mut self, id: &str) -> Option<ScheduledTask> {
        self.tasks.remove(id).map(|(_, task)| task)
    }

    /// Tasks due at `now`. Tasks that have used up their runs are dropped.
    pub fn due_tasks(&mut self, now: DateTime<Local>) -> Vec<(String, Arc<dyn TaskCallback>)> {
        let mut due = Vec::new();
        for (id, (_, task)) in self.tasks.iter_mut() {
            if task.can_run(now) {
                due.push((id.clone(), task.callback.clone()));
            }
        }

        self.tasks.retain(|_, (_, task)| !task.is_exhausted());
        due
    }
}
