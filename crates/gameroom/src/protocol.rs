use felt_core::Position;
use felt_gameplay::Action;
use serde::Deserialize;

/// Errors that can occur while decoding client frames.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    Malformed(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Messages sent from client to server.
///
/// The ticket in `AuthenticateWithTicket` is opaque to the engine; the
/// [`Directory`](crate::Directory) collaborator turns it into an identity.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    AuthenticateWithTicket { ticket: String },
    Sit { seat_index: Position },
    Action { seat_index: Position, action: Action },
    Leave,
}

/// Decodes wire text into [`ClientMessage`] frames.
pub struct Protocol;

impl Protocol {
    pub fn decode(s: &str) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_str(s).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_auth() {
        let frame = Protocol::decode(r#"{"type":"authenticate_with_ticket","ticket":"pk1"}"#);
        assert!(matches!(
            frame,
            Ok(ClientMessage::AuthenticateWithTicket { ticket }) if ticket == "pk1"
        ));
    }

    #[test]
    fn decode_action() {
        let frame = Protocol::decode(
            r#"{"type":"action","seat_index":2,"action":{"type":"raise","amount":4}}"#,
        )
        .unwrap();
        match frame {
            ClientMessage::Action { seat_index, action } => {
                assert_eq!(seat_index, 2);
                assert_eq!(action, Action::Raise { amount: 4 });
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn decode_leave() {
        assert!(matches!(
            Protocol::decode(r#"{"type":"leave"}"#),
            Ok(ClientMessage::Leave)
        ));
    }

    #[test]
    fn decode_garbage() {
        assert!(Protocol::decode("not json").is_err());
        assert!(Protocol::decode(r#"{"type":"warp"}"#).is_err());
    }
}
