//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the reading view in the browser
//! and the API server.

use digital_library_core::{ActivityLogId, ActivityStatus, ProgressSample, ResourceId};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enters the reading view for a resource. This must be the first message sent
    /// on the connection.
    Init { resource_id: ResourceId },

    /// Current state of the audio or video element.
    Media {
        position_secs: f64,
        #[serde(default)]
        duration_secs: Option<f64>,
    },

    /// Current scroll state of the text container.
    Scroll {
        offset: f64,
        scrollable_height: f64,
        viewport_height: f64,
    },

    /// The user pressed "back to the library".
    Back,
}

impl ClientMessage {
    /// The engagement reading carried by this message, if any.
    pub fn sample(&self) -> Option<ProgressSample> {
        match *self {
            ClientMessage::Media {
                position_secs,
                duration_secs,
            } => Some(ProgressSample::Media {
                position_secs,
                duration_secs,
            }),
            ClientMessage::Scroll {
                offset,
                scrollable_height,
                viewport_height,
            } => Some(ProgressSample::Scroll {
                offset,
                scrollable_height,
                viewport_height,
            }),
            ClientMessage::Init { .. } | ClientMessage::Back => None,
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A tracking session is open and sampling.
    SessionStarted { log_id: ActivityLogId },

    /// The values written by the latest sampling tick.
    Progress { progress: f64, duration_seconds: u64 },

    /// The session was finalized.
    SessionEnded { status: String, progress: f64 },

    /// Reports a fatal error to the client, which should display an error message.
    Error { message: String },
}

impl ServerMessage {
    pub fn session_ended(status: ActivityStatus, progress: f64) -> Self {
        ServerMessage::SessionEnded {
            status: status.as_str().to_string(),
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_a_type_tag() {
        let init: ClientMessage = serde_json::from_str(r#"{"type":"init","resource_id":4}"#).unwrap();
        assert_eq!(init, ClientMessage::Init { resource_id: 4 });

        let media: ClientMessage =
            serde_json::from_str(r#"{"type":"media","position_secs":12.5}"#).unwrap();
        assert_eq!(
            media.sample(),
            Some(ProgressSample::Media {
                position_secs: 12.5,
                duration_secs: None
            })
        );

        let back: ClientMessage = serde_json::from_str(r#"{"type":"back"}"#).unwrap();
        assert_eq!(back.sample(), None);
    }

    #[test]
    fn server_messages_serialize_in_snake_case() {
        let json = serde_json::to_value(ServerMessage::session_ended(ActivityStatus::Completed, 97.0)).unwrap();
        assert_eq!(json["type"], "session_ended");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["progress"], 97.0);
    }
}
