use async_trait::async_trait;

/// The external auth collaborator.
///
/// The engine never verifies signatures or issues tickets itself; it hands
/// the opaque ticket to this trait and receives a participant identity (a
/// public key string) or nothing. Ban checks gate seating only.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolves a ticket to the identity it was issued for.
    async fn authenticate(&self, ticket: &str) -> Option<String>;
    /// True if the identity may not take a seat.
    async fn is_banned(&self, identity: &str) -> bool;
}

/// Trusts every ticket as its own identity and bans nobody. For tests and
/// local play behind an already-authenticated transport.
#[derive(Debug, Default)]
pub struct OpenDoor;

#[async_trait]
impl Directory for OpenDoor {
    async fn authenticate(&self, ticket: &str) -> Option<String> {
        match ticket.is_empty() {
            true => None,
            false => Some(ticket.to_string()),
        }
    }
    async fn is_banned(&self, _identity: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_door_reflects_ticket() {
        assert_eq!(OpenDoor.authenticate("pk1").await.as_deref(), Some("pk1"));
        assert_eq!(OpenDoor.authenticate("").await, None);
        assert!(!OpenDoor.is_banned("pk1").await);
    }
}
