use std::path::PathBuf;

use duobox_core::action::{Action, ActionRegistry};
use duobox_core::config::keymap::Keymap;
use duobox_core::config::settings::Config;
use duobox_core::config::theme::Theme;
use duobox_core::event::{FetchEvent, Intent};
use duobox_core::nav::NavigationController;
use duobox_core::render_model::{self, Snapshot};

/// Application mode: determines how input is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
}

/// Returns the directory holding `default.toml`, `keymap.toml` and `theme.toml`.
///
/// `./config` wins when it exists, otherwise `~/.config/duobox`.
pub fn config_dir() -> PathBuf {
    if std::path::Path::new("config").exists() {
        PathBuf::from("config")
    } else {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(".config")
            .join("duobox")
    }
}

/// Frontend state wrapped around the navigation core.
pub struct App {
    controller: NavigationController,
    mode: AppMode,
    should_quit: bool,
    keymap: Keymap,
    action_registry: ActionRegistry,
    theme: Theme,
    title: String,
    loading_message: String,
    remote_label: String,
}

impl App {
    pub fn new(
        controller: NavigationController,
        config: &Config,
        keymap: Keymap,
        theme: Theme,
    ) -> Self {
        let remote_label = controller.remote_label();
        Self {
            controller,
            mode: AppMode::Normal,
            should_quit: false,
            keymap,
            action_registry: ActionRegistry::new(),
            theme,
            title: config.general.title.clone(),
            loading_message: config.general.loading_message.clone(),
            remote_label,
        }
    }

    pub fn mode(&self) -> &AppMode {
        &self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn action_registry(&self) -> &ActionRegistry {
        &self.action_registry
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    pub fn remote_label(&self) -> &str {
        &self.remote_label
    }

    /// Projects both panels for drawing.
    pub fn snapshot(&self) -> Snapshot {
        render_model::snapshot(&self.controller)
    }

    pub fn with_mode(self, mode: AppMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_quit(self) -> Self {
        Self {
            should_quit: true,
            ..self
        }
    }

    /// Runs a bound action against the focused panel.
    pub fn dispatch(mut self, action: Action) -> Self {
        match action {
            Action::Help => return self.with_mode(AppMode::Help),
            Action::Quit => return self.with_quit(),
            _ => {}
        }
        let page = self.controller.panel(self.controller.focused()).viewport();
        if let Some(intent) = action.intent(page) {
            tracing::trace!(?intent, "dispatching");
            self.controller.handle_intent(intent);
        }
        self
    }

    /// Hands a finished remote call to the controller.
    pub fn with_fetch_event(mut self, event: FetchEvent) -> Self {
        self.controller.handle_event(event);
        self
    }

    /// Tells the controller how many entry rows each panel shows.
    pub fn with_viewport(mut self, rows: usize) -> Self {
        let current = self.controller.panel(self.controller.focused()).viewport();
        if current != rows {
            self.controller.handle_intent(Intent::SetViewport(rows));
        }
        self
    }
}
