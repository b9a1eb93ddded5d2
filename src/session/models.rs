/*!
 * Session state published to observers.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::transcript::Segment;

/// Remote operation currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyMode {
    Transcribing,
    Resyncing,
    Renaming,
    Refining,
}

impl BusyMode {
    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Transcribing => "transcribing",
            Self::Resyncing => "resyncing",
            Self::Renaming => "renaming speakers",
            Self::Refining => "refining speakers",
        }
    }
}

impl fmt::Display for BusyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Immutable view of a session after a change.
///
/// Cloning is cheap for the segment list, which is shared.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session the snapshot belongs to
    pub session_id: Uuid,
    /// Incremented on every model change
    pub revision: u64,
    /// Segments at this revision
    pub segments: Arc<[Segment]>,
    /// Pending speaker renames
    pub speaker_map: BTreeMap<String, String>,
    /// Remote operation in flight, if any
    pub busy: Option<BusyMode>,
    /// Message of the last failed remote operation
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// Snapshot of a freshly created session
    pub fn initial(session_id: Uuid, segments: &[Segment]) -> Self {
        Self {
            session_id,
            revision: 0,
            segments: Arc::from(segments),
            speaker_map: BTreeMap::new(),
            busy: None,
            last_error: None,
        }
    }

    /// Whether a remote operation is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }
}
