use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::docker::{BulkOperation, Container, ContainerId};
use crate::services::{NotificationLevel, copy_to_clipboard};

use super::{
    App, Artifact, Command, Confirmation, MenuItem, Overlay, Prompt, PromptKind, ViewState,
};

const PAGE: isize = 10;

impl App {
    /// Dispatch one key on `(view, key)`. Pure state changes happen here;
    /// anything that needs the runtime comes back as a [`Command`].
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if self.prompt.is_some() {
            return self.prompt_key(key);
        }
        if let Some(confirm) = self.confirm.take() {
            return self.confirm_key(confirm, key);
        }
        if self.overlay.is_some() {
            self.overlay_key(key);
            return None;
        }

        // Global keys.
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                self.quit();
                return None;
            }
            (KeyCode::Char('?'), _) => {
                self.overlay = Some(Overlay::Help);
                return None;
            }
            (KeyCode::Char('R'), _) => return self.refresh_command(),
            (KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b'), _) => {
                return self.back();
            }
            _ => {}
        }

        match self.view {
            ViewState::Main => self.main_key(key),
            ViewState::Containers => self.containers_key(key),
            ViewState::Details => self.details_key(key),
            ViewState::Logs => {
                self.logs_key(key);
                None
            }
            ViewState::Stats => None,
        }
    }

    /// What `R` means in the current view.
    fn refresh_command(&mut self) -> Option<Command> {
        if self.daemon.is_unavailable() {
            return Some(Command::ProbeDaemon);
        }
        let focused = self.focused.clone();
        let cmd = match (self.view, focused) {
            (ViewState::Details, Some(c)) => Command::LoadDetails(c),
            (ViewState::Logs, Some(c)) => Command::LoadLogs(c),
            (ViewState::Stats, Some(c)) => Command::LoadStats(c),
            _ => Command::Refresh,
        };
        self.submit(cmd)
    }

    fn main_key(&mut self, key: KeyEvent) -> Option<Command> {
        let last = MenuItem::ALL.len() - 1;
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1).min(last);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = self.menu_index.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.menu_index = 0,
            KeyCode::Char('G') | KeyCode::End => self.menu_index = last,
            KeyCode::Enter => {
                let item = MenuItem::from_index(self.menu_index)?;
                return self.activate(item);
            }
            _ => {}
        }
        None
    }

    fn activate(&mut self, item: MenuItem) -> Option<Command> {
        match item {
            MenuItem::Containers => {
                self.navigate(ViewState::Containers);
                self.submit(Command::Refresh)
            }
            MenuItem::Search => {
                self.open_search();
                None
            }
            MenuItem::CreatePostgres => {
                self.prompt = Some(Prompt::new(PromptKind::CreatePostgres));
                None
            }
            MenuItem::GenerateEnv => self.generate(Artifact::Env, None),
            MenuItem::GenerateViteEnv => self.generate(Artifact::ViteEnv, None),
            MenuItem::GenerateCompose => self.generate(Artifact::Compose, None),
            MenuItem::Cleanup => {
                self.confirm = Some(Confirmation::Cleanup);
                None
            }
            MenuItem::Quit => {
                self.quit();
                None
            }
        }
    }

    fn containers_key(&mut self, key: KeyEvent) -> Option<Command> {
        let len = self.containers.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.selection.move_by(1, len),
            KeyCode::Up | KeyCode::Char('k') => self.selection.move_by(-1, len),
            KeyCode::PageDown => self.selection.move_by(PAGE, len),
            KeyCode::PageUp => self.selection.move_by(-PAGE, len),
            KeyCode::Char('g') | KeyCode::Home => self.selection.first(len),
            KeyCode::Char('G') | KeyCode::End => self.selection.last(len),
            KeyCode::Char(' ') => self.selection.toggle(),
            KeyCode::Char('a') => self.selection.toggle_all(len),
            KeyCode::Char('/') => self.open_search(),

            KeyCode::Char('s') => return self.lifecycle_on_targets(BulkOperation::Start),
            KeyCode::Char('x') => return self.lifecycle_on_targets(BulkOperation::Stop),
            KeyCode::Char('d') => return self.lifecycle_on_targets(BulkOperation::Remove),
            KeyCode::Char('r') => return self.lifecycle_on_targets(BulkOperation::Restart),

            KeyCode::Char('E') => return self.generate_from_marks(Artifact::Env),
            KeyCode::Char('V') => return self.generate_from_marks(Artifact::ViteEnv),
            KeyCode::Char('C') => return self.generate_from_marks(Artifact::Compose),

            KeyCode::Enter => return self.on_cursor(Command::LoadDetails),
            KeyCode::Char('l') => return self.on_cursor(Command::LoadLogs),
            KeyCode::Char('t') => return self.on_cursor(Command::LoadStats),
            KeyCode::Char('v') => return self.on_cursor(Command::ShowEnv),
            KeyCode::Char('e') => {
                if let Some(c) = self.cursor_container().cloned() {
                    self.prompt = Some(Prompt::new(PromptKind::Exec(c)));
                } else {
                    self.nothing_selected();
                }
            }
            KeyCode::Char('c') => {
                if let Some(c) = self.cursor_container().cloned() {
                    self.copy_id(&c);
                } else {
                    self.nothing_selected();
                }
            }
            _ => {}
        }
        None
    }

    fn details_key(&mut self, key: KeyEvent) -> Option<Command> {
        let focused = self.focused.clone()?;
        let cmd = match key.code {
            KeyCode::Char('l') => Command::LoadLogs(focused),
            KeyCode::Char('t') => Command::LoadStats(focused),
            KeyCode::Char('v') => Command::ShowEnv(focused),
            KeyCode::Char('e') => {
                self.prompt = Some(Prompt::new(PromptKind::Exec(focused)));
                return None;
            }
            KeyCode::Char('c') => {
                self.copy_id(&focused);
                return None;
            }
            KeyCode::Char('s') => return self.lifecycle(BulkOperation::Start, vec![focused.id]),
            KeyCode::Char('x') => return self.lifecycle(BulkOperation::Stop, vec![focused.id]),
            KeyCode::Char('d') => return self.lifecycle(BulkOperation::Remove, vec![focused.id]),
            KeyCode::Char('r') => {
                return self.lifecycle(BulkOperation::Restart, vec![focused.id]);
            }
            _ => return None,
        };
        self.submit(cmd)
    }

    fn logs_key(&mut self, key: KeyEvent) {
        let end = u16::try_from(self.logs.len()).unwrap_or(u16::MAX);
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.log_scroll = self.log_scroll.saturating_add(1).min(end)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.log_scroll = self.log_scroll.saturating_sub(1)
            }
            KeyCode::PageDown => self.log_scroll = self.log_scroll.saturating_add(10).min(end),
            KeyCode::PageUp => self.log_scroll = self.log_scroll.saturating_sub(10),
            KeyCode::Char('g') | KeyCode::Home => self.log_scroll = 0,
            KeyCode::Char('G') | KeyCode::End => self.log_scroll = end,
            _ => {}
        }
    }

    fn overlay_key(&mut self, key: KeyEvent) {
        if let Some(Overlay::Text { lines, scroll, .. }) = &mut self.overlay {
            let end = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    *scroll = scroll.saturating_add(1).min(end);
                    return;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    *scroll = scroll.saturating_sub(1);
                    return;
                }
                _ => {}
            }
        }
        self.overlay = None;
    }

    fn confirm_key(&mut self, confirm: Confirmation, key: KeyEvent) -> Option<Command> {
        match (confirm, key.code) {
            (Confirmation::Cleanup, KeyCode::Char('y' | 'Y')) => self.submit(Command::Cleanup),
            (Confirmation::Cleanup, _) => {
                self.notify(NotificationLevel::Info, "Cleanup cancelled");
                None
            }
        }
    }

    fn prompt_key(&mut self, key: KeyEvent) -> Option<Command> {
        let prompt = self.prompt.as_mut()?;
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.prompt = None;
                None
            }
            (KeyCode::Backspace, _) => {
                prompt.input.pop();
                None
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                prompt.input.push(c);
                None
            }
            (KeyCode::Enter, _) => {
                let prompt = self.prompt.take()?;
                self.submit_prompt(prompt)
            }
            _ => None,
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) -> Option<Command> {
        let input = prompt.input.trim();
        match prompt.kind {
            PromptKind::Search => {
                if input.is_empty() {
                    if self.filter.take().is_some() {
                        self.notify(NotificationLevel::Info, "Search cleared");
                    }
                } else {
                    self.filter = Some(input.to_string());
                }
                self.selection.clear_marks();
                self.navigate(ViewState::Containers);
                self.submit(Command::Refresh)
            }
            PromptKind::Exec(container) => {
                if input.is_empty() {
                    return None;
                }
                self.submit(Command::Exec {
                    container,
                    command: input.to_string(),
                })
            }
            PromptKind::CreatePostgres => match self.config.postgres.options_for(input) {
                Some(opts) => self.submit(Command::CreatePostgres(opts)),
                None => {
                    self.notify(
                        NotificationLevel::Warning,
                        "Expected a container name or name:port",
                    );
                    None
                }
            },
        }
    }

    fn open_search(&mut self) {
        let mut prompt = Prompt::new(PromptKind::Search);
        prompt.input = self.filter.clone().unwrap_or_default();
        self.prompt = Some(prompt);
    }

    fn on_cursor(&mut self, make: fn(Container) -> Command) -> Option<Command> {
        match self.cursor_container().cloned() {
            Some(c) => self.submit(make(c)),
            None => {
                self.nothing_selected();
                None
            }
        }
    }

    fn lifecycle_on_targets(&mut self, op: BulkOperation) -> Option<Command> {
        let ids = self.targets().into_iter().map(|c| c.id.clone()).collect();
        self.lifecycle(op, ids)
    }

    fn lifecycle(&mut self, op: BulkOperation, ids: Vec<ContainerId>) -> Option<Command> {
        if ids.is_empty() {
            self.nothing_selected();
            return None;
        }
        self.submit(Command::Lifecycle { op, ids })
    }

    /// Generate from the marked rows, or from the whole runtime if nothing
    /// is marked.
    fn generate_from_marks(&mut self, artifact: Artifact) -> Option<Command> {
        let marked = self.marked_containers();
        let scope = (!marked.is_empty()).then_some(marked);
        self.generate(artifact, scope)
    }

    fn generate(&mut self, artifact: Artifact, scope: Option<Vec<Container>>) -> Option<Command> {
        self.submit(Command::Generate { artifact, scope })
    }

    fn copy_id(&mut self, container: &Container) {
        match copy_to_clipboard(container.id.as_str()) {
            Ok(()) => self.notify(
                NotificationLevel::Success,
                format!("Copied id of {} ({})", container.name, container.id.short()),
            ),
            Err(e) => self.notify(NotificationLevel::Warning, e.to_string()),
        }
    }

    fn nothing_selected(&mut self) {
        self.notify(NotificationLevel::Warning, "No container selected");
    }
}
