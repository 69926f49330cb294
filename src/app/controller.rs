// MangaShelf - app/controller.rs
//
// Owns the application state together with its collaborators: the collection
// source and the confirmation prompt. Front-ends talk to the controller, never
// to `AppState::apply` directly, so confirmations are always honoured.

use crate::app::library_mgr::LibrarySource;
use crate::app::prompt::ConfirmPrompt;
use crate::app::state::{Action, AppState, Notice, Preferences};
use crate::util::error::LibraryError;

pub struct Controller {
    state: AppState,
    source: Box<dyn LibrarySource>,
    prompt: Box<dyn ConfirmPrompt>,
}

impl Controller {
    /// Load the collection from `source` and build the initial state.
    ///
    /// Returns the controller plus non-fatal load problems.
    pub fn start(
        source: Box<dyn LibrarySource>,
        prompt: Box<dyn ConfirmPrompt>,
        prefs: Preferences,
    ) -> Result<(Self, Vec<LibraryError>), LibraryError> {
        let (library, problems) = source.load()?;
        tracing::info!(
            source = %source.describe(),
            entries = library.len(),
            "Controller started"
        );
        let controller = Self {
            state: AppState::new(library, prefs),
            source,
            prompt,
        };
        Ok((controller, problems))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply `action`. A confirmation request is put to the prompt and, if
    /// accepted, the confirmed action is applied in turn.
    pub fn dispatch(&mut self, action: Action) -> Notice {
        match self.state.apply(action) {
            Notice::NeedsConfirmation(pending) => {
                let message = pending.message(&self.state.library);
                if self.prompt.confirm(&message) {
                    self.state.apply(Action::Confirmed(pending))
                } else {
                    tracing::debug!(%message, "Confirmation declined");
                    Notice::Info("Cancelled.".to_string())
                }
            }
            notice => notice,
        }
    }

    /// Reload the collection from the source. On failure the current
    /// collection is kept and the error is logged.
    pub fn refresh(&mut self) -> Notice {
        self.state.apply(Action::RefreshStarted);
        let reloaded = match self.source.load() {
            Ok((library, problems)) => {
                for problem in &problems {
                    tracing::warn!(error = %problem, "Library reload problem");
                }
                Some(library)
            }
            Err(e) => {
                tracing::error!(source = %self.source.describe(), error = %e, "Library reload failed");
                None
            }
        };
        self.state.apply(Action::RefreshFinished(reloaded))
    }

    /// Hand back the state, e.g. for saving the collection.
    pub fn into_state(self) -> AppState {
        self.state
    }
}
