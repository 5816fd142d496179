use crate::editor::{SaveError, SettingsForm, TimeoutBounds};
use crate::settings::{ConnectionType, Settings, Source};
use crate::store::{SessionStash, SettingsRepository};
use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Hands one source to the source editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEditRequest {
    pub connection_type: ConnectionType,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEditOutcome {
    Saved(Source),
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SaveFailure {
    #[error(transparent)]
    Invalid(#[from] SaveError),
    #[error("Failed saving settings: {0:#}")]
    Storage(anyhow::Error),
}

/// Owns the working copy of the settings while the editor is open.
pub struct SettingsController<R, S> {
    repository: R,
    stash: S,
    bounds: TimeoutBounds,
    working: Settings,
    form: SettingsForm,
    pending_edit: Option<ConnectionType>,
    restored: bool,
}

impl<R: SettingsRepository, S: SessionStash> SettingsController<R, S> {
    /// Starts from a stashed session when one exists, otherwise from the
    /// repository's current settings.
    pub fn open(repository: R, mut stash: S, bounds: TimeoutBounds) -> Self {
        let stashed = match stash.take() {
            Ok(stashed) => stashed,
            Err(err) => {
                warn!("ignoring unreadable settings session: {err:#}");
                None
            }
        };
        let restored = stashed.is_some();
        let working = stashed.unwrap_or_else(|| repository.current());
        if restored {
            info!("settings: resumed stashed session {working}");
        } else {
            debug!("settings: loaded {working}");
        }

        Self {
            form: SettingsForm::load(&working),
            repository,
            stash,
            bounds,
            working,
            pending_edit: None,
            restored,
        }
    }

    #[must_use]
    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SettingsForm {
        &mut self.form
    }

    #[must_use]
    pub fn working(&self) -> &Settings {
        &self.working
    }

    #[must_use]
    pub fn bounds(&self) -> TimeoutBounds {
        self.bounds
    }

    #[must_use]
    pub fn restored(&self) -> bool {
        self.restored
    }

    #[cfg(test)]
    pub(crate) fn pending_edit(&self) -> Option<ConnectionType> {
        self.pending_edit
    }

    #[cfg(test)]
    pub(crate) fn repository(&self) -> &R {
        &self.repository
    }

    #[cfg(test)]
    pub(crate) fn stash(&self) -> &S {
        &self.stash
    }

    /// Captures the form without validation and stashes the working copy so
    /// the next [`SettingsController::open`] resumes from it.
    pub fn suspend(&mut self) -> Result<()> {
        self.form.snapshot_into(&mut self.working, self.bounds);
        self.stash.stash(&self.working)?;
        info!("settings: stashed session {}", self.working);
        Ok(())
    }

    pub fn begin_source_edit(&mut self, connection_type: ConnectionType) -> SourceEditRequest {
        let source = self.working.source(connection_type).clone();
        info!("start source editor: {source}");
        self.pending_edit = Some(connection_type);
        SourceEditRequest {
            connection_type,
            source,
        }
    }

    pub fn finish_source_edit(&mut self, outcome: SourceEditOutcome) {
        let Some(requested) = self.pending_edit.take() else {
            debug!("dropping source edit result with no edit outstanding");
            return;
        };
        match outcome {
            SourceEditOutcome::Saved(source) => {
                if source.connection_type != requested {
                    debug!(
                        "source editor for {requested} returned a {} source",
                        source.connection_type
                    );
                }
                self.working.replace_source(source);
            }
            SourceEditOutcome::Cancelled => {
                debug!("source edit for {requested} cancelled");
            }
        }
    }

    /// Validates the form and, when it passes, commits the working copy and
    /// flushes the repository. The repository is untouched on a validation
    /// failure.
    pub fn save(&mut self) -> Result<(), SaveFailure> {
        self.form.save_into(&mut self.working, self.bounds)?;
        info!("menu: save {}", self.working);
        self.repository.replace(self.working.clone());
        self.repository.flush().map_err(SaveFailure::Storage)
    }
}
