/// Things an actor may attempt against a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastCapability {
    /// Edit cast info, page sections and events
    EditCast,

    /// Add or remove managers
    ManageManagers,

    /// Approve/deny requests, add/remove members, block/unblock
    ManageRoster,

    /// Delete the cast entirely
    DeleteCast,

    /// Request to join, leave, or withdraw a request
    SelfService,
}

impl CastCapability {
    /// Whether the capability is reserved for the cast's managers
    pub fn requires_manager(&self) -> bool {
        !matches!(self, CastCapability::SelfService)
    }
}
