use super::value_objects::Address;

// ============================================================================
// Member Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum MemberCommand {
    Register {
        name: String,
        address: Address,
    },
    Rename {
        member_id: i64,
        name: String,
    },
}
