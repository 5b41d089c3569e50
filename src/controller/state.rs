use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::models::ExtractionResult;
use crate::view::{DocumentForm, FormControls};

/// Identifies one accepted file and the request made for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Uploading {
        session: SessionId,
        file_name: String,
        started_at: DateTime<Utc>,
    },
    /// The result only exists while displaying it.
    Displaying {
        session: SessionId,
        result: ExtractionResult,
        form: DocumentForm,
    },
    Error {
        message: String,
        code: &'static str,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Uploading { .. } => "uploading",
            Phase::Displaying { .. } => "displaying",
            Phase::Error { .. } => "error",
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        match self {
            Phase::Uploading { session, .. } | Phase::Displaying { session, .. } => Some(*session),
            Phase::Idle | Phase::Error { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    ReadOnly,
    Editing,
}

impl EditState {
    pub fn toggled(self) -> Self {
        match self {
            EditState::ReadOnly => EditState::Editing,
            EditState::Editing => EditState::ReadOnly,
        }
    }

    pub fn is_editing(self) -> bool {
        self == EditState::Editing
    }

    pub fn controls(self) -> FormControls {
        match self {
            EditState::ReadOnly => FormControls::READ_ONLY,
            EditState::Editing => FormControls::EDITING,
        }
    }
}
