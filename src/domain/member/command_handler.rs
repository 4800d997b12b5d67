use crate::error::AppError;
use crate::persistence::{Database, MemberRepository, UnitOfWork};

use super::commands::MemberCommand;
use super::errors::MemberError;
use super::value_objects::Member;

// ============================================================================
// Member Command Handler
// ============================================================================
//
// Orchestrates: Command → name checks → Repository → Commit
//
// ============================================================================

#[derive(Clone)]
pub struct MemberCommandHandler {
    db: Database,
    members: MemberRepository,
}

impl MemberCommandHandler {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            members: MemberRepository,
        }
    }

    /// Handle a command and return the id of the affected member
    pub async fn handle(&self, command: MemberCommand) -> Result<i64, AppError> {
        let mut uow = self.db.begin_write().await?;

        let member_id = match command {
            MemberCommand::Register { name, address } => {
                self.ensure_name_free(&mut uow, &name, None).await?;
                let id = self
                    .members
                    .save(&mut uow, &name, &address)
                    .await
                    .map_err(|e| duplicate_or(e, &name))?;

                tracing::info!(member_id = id, name = %name, "✅ Member registered");
                id
            }
            MemberCommand::Rename { member_id, name } => {
                self.ensure_name_free(&mut uow, &name, Some(member_id)).await?;
                let renamed = self
                    .members
                    .rename(&mut uow, member_id, &name)
                    .await
                    .map_err(|e| duplicate_or(e, &name))?;
                if !renamed {
                    return Err(AppError::not_found("member", member_id));
                }

                tracing::info!(member_id = member_id, name = %name, "Member renamed");
                member_id
            }
        };

        uow.commit().await?;
        Ok(member_id)
    }

    pub async fn find_members(&self) -> Result<Vec<Member>, AppError> {
        let mut uow = self.db.begin().await?;
        let members = self.members.find_all(&mut uow).await?;
        uow.commit().await?;
        Ok(members)
    }

    pub async fn find_one(&self, member_id: i64) -> Result<Member, AppError> {
        let mut uow = self.db.begin().await?;
        let member = self
            .members
            .find_one(&mut uow, member_id)
            .await?
            .ok_or_else(|| AppError::not_found("member", member_id))?;
        uow.commit().await?;
        Ok(member)
    }

    /// `owner` is the member allowed to hold the name already
    async fn ensure_name_free(&self, uow: &mut UnitOfWork, name: &str, owner: Option<i64>) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(MemberError::EmptyName.into());
        }
        let holders = self.members.find_by_name(uow, name).await?;
        if holders.iter().any(|member| Some(member.id) != owner) {
            return Err(MemberError::DuplicateName(name.to_string()).into());
        }
        Ok(())
    }
}

/// A concurrent registration can slip past the lookup; the unique
/// constraint catches it.
fn duplicate_or(err: sqlx::Error, name: &str) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => MemberError::DuplicateName(name.to_string()).into(),
        _ => err.into(),
    }
}
