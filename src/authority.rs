//! Network role queries used to gate pool initialization

/// Answers whether this process owns canonical state for the session
pub trait Authority {
    fn has_authority(&self) -> bool;
}

/// Role of the running process in a replicated session
///
/// Every role other than [`NetRole::Client`] is some kind of server and
/// therefore authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NetRole {
    /// Single process, no networking
    #[default]
    Standalone,

    /// Server without a local player
    DedicatedServer,

    /// Server that also hosts a local player
    ListenServer,

    /// Remote observer of a server
    Client,
}

impl NetRole {
    pub fn is_authoritative(self) -> bool {
        !matches!(self, NetRole::Client)
    }
}

impl Authority for NetRole {
    fn has_authority(&self) -> bool {
        self.is_authoritative()
    }
}

impl<F> Authority for F
where
    F: Fn() -> bool,
{
    fn has_authority(&self) -> bool {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_clients_lack_authority() {
        assert!(NetRole::Standalone.has_authority());
        assert!(NetRole::DedicatedServer.has_authority());
        assert!(NetRole::ListenServer.has_authority());
        assert!(!NetRole::Client.has_authority());
    }

    #[test]
    fn test_closure_predicate() {
        let check = || false;
        assert!(!check.has_authority());
    }
}
