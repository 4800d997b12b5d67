// ============================================================================
// Member Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("Member name already registered: {0}")]
    DuplicateName(String),

    #[error("Member name cannot be empty")]
    EmptyName,
}
