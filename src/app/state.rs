use std::collections::BTreeSet;

use crate::docker::{Container, ContainerId};

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Main,
    Containers,
    Details,
    Logs,
    Stats,
}

impl ViewState {
    /// Where "back" lands once the immediate previous view has been used.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Main => None,
            Self::Containers => Some(Self::Main),
            Self::Details => Some(Self::Containers),
            Self::Logs | Self::Stats => Some(Self::Details),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Main => "Main menu",
            Self::Containers => "Containers",
            Self::Details => "Details",
            Self::Logs => "Logs",
            Self::Stats => "Stats",
        }
    }
}

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Containers,
    Search,
    CreatePostgres,
    GenerateEnv,
    GenerateViteEnv,
    GenerateCompose,
    Cleanup,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 8] = [
        MenuItem::Containers,
        MenuItem::Search,
        MenuItem::CreatePostgres,
        MenuItem::GenerateEnv,
        MenuItem::GenerateViteEnv,
        MenuItem::GenerateCompose,
        MenuItem::Cleanup,
        MenuItem::Quit,
    ];

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Containers => "View containers",
            Self::Search => "Search containers",
            Self::CreatePostgres => "Create PostgreSQL container",
            Self::GenerateEnv => "Generate .env from running containers",
            Self::GenerateViteEnv => "Generate .env (VITE_ prefix)",
            Self::GenerateCompose => "Generate docker-compose.yml",
            Self::Cleanup => "Clean up unused resources",
            Self::Quit => "Quit",
        }
    }
}

/// Cursor plus multi-select marks over the container list.
///
/// The cursor is `None` exactly when the list is empty. Marks are indices
/// and are pruned whenever the list changes length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    cursor: Option<usize>,
    marked: BTreeSet<usize>,
}

impl Selection {
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = None;
            return;
        }
        let current = self.cursor.unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.cursor = Some(next);
    }

    pub fn first(&mut self, len: usize) {
        self.cursor = if len == 0 { None } else { Some(0) };
    }

    pub fn last(&mut self, len: usize) {
        self.cursor = len.checked_sub(1);
    }

    /// Flip the mark on the cursor row.
    pub fn toggle(&mut self) {
        if let Some(i) = self.cursor
            && !self.marked.remove(&i)
        {
            self.marked.insert(i);
        }
    }

    /// Mark every row, or clear all marks if every row is already marked.
    pub fn toggle_all(&mut self, len: usize) {
        if len > 0 && self.marked.len() == len {
            self.marked.clear();
        } else {
            self.marked = (0..len).collect();
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    /// Force the invariants for a list of `len` rows.
    pub fn reclamp(&mut self, len: usize) {
        self.cursor = match (self.cursor, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(c), n) => Some(c.min(n - 1)),
        };
        self.marked.retain(|&i| i < len);
    }

    /// Carry the cursor and marks across a refresh by container identity,
    /// then reclamp. Rows that disappeared lose their marks; a cursor whose
    /// row vanished keeps its index.
    pub fn remap(&mut self, old: &[Container], new: &[Container]) {
        let position = |id: &ContainerId| new.iter().position(|c| &c.id == id);

        let cursor_id = self.cursor.and_then(|i| old.get(i)).map(|c| &c.id);
        if let Some(pos) = cursor_id.and_then(position) {
            self.cursor = Some(pos);
        }

        self.marked = self
            .marked
            .iter()
            .filter_map(|&i| old.get(i))
            .filter_map(|c| position(&c.id))
            .collect();

        self.reclamp(new.len());
    }

    /// Rows a lifecycle key acts on: the marks, or else the cursor row.
    pub fn targets(&self) -> Vec<usize> {
        if self.marked.is_empty() {
            self.cursor.into_iter().collect()
        } else {
            self.marked.iter().copied().collect()
        }
    }
}

/// What the text prompt is collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    Search,
    Exec(Container),
    CreatePostgres,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    pub fn label(&self) -> String {
        match &self.kind {
            PromptKind::Search => "Search (name or image)".to_string(),
            PromptKind::Exec(c) => format!("Command to run in {}", c.name),
            PromptKind::CreatePostgres => {
                "New PostgreSQL container (name or name:port)".to_string()
            }
        }
    }
}

/// Actions that need an explicit yes before they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Cleanup,
}

impl Confirmation {
    pub fn question(self) -> &'static str {
        match self {
            Self::Cleanup => {
                "Remove all stopped containers, unused networks, dangling images and build cache?"
            }
        }
    }
}

/// Modal content drawn over the active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Text {
        title: String,
        lines: Vec<String>,
        scroll: u16,
    },
}

impl Overlay {
    pub fn text(title: impl Into<String>, body: &str) -> Self {
        Self::Text {
            title: title.into(),
            lines: body.lines().map(String::from).collect(),
            scroll: 0,
        }
    }
}

/// Result of the last daemon probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonStatus {
    Unknown,
    Available(String),
    Unavailable(String),
}

impl DaemonStatus {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
