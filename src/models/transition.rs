use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request::Stage;

/// One entry in a request's append-only stage history.
///
/// The history is the canonical record of the state machine's past and the
/// source the external audit trail is fed from; entries are never mutated
/// or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    /// `None` only on the opening entry written when the request is created.
    pub from_stage: Option<Stage>,
    pub to_stage: Stage,

    /// Identity of the actor who performed the transition.
    pub actor: String,

    pub occurred_at: DateTime<Utc>,

    pub note: Option<String>,
}
