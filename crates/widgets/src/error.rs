/// A bridge message that could not be accepted.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("message has no action")]
    MissingAction,

    #[error("unknown message action {0:?}")]
    UnknownAction(String),

    #[error("malformed payload for {action:?}: {source}")]
    Payload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}
