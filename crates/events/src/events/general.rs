use serde::{Deserialize, Serialize};

/// Messages that belong to no particular pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Something went wrong but the run continues
    Warning {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },

    /// Diagnostic chatter, shown only with `--debug`
    Debug { message: String },
}
