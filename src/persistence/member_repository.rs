use crate::domain::member::{Address, Member};
use super::query_log::QueryKind;
use super::rows::MemberRow;
use super::UnitOfWork;

const MEMBER_COLUMNS: &str = "member_id, name, city, street, zipcode";

#[derive(Debug, Clone, Copy, Default)]
pub struct MemberRepository;

impl MemberRepository {
    pub async fn save(&self, uow: &mut UnitOfWork, name: &str, address: &Address) -> Result<i64, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("INSERT INTO member (name, city, street, zipcode) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(&address.city)
            .bind(&address.street)
            .bind(&address.zipcode)
            .execute(uow.conn())
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn rename(&self, uow: &mut UnitOfWork, member_id: i64, name: &str) -> Result<bool, sqlx::Error> {
        uow.record(QueryKind::Write);
        let result = sqlx::query("UPDATE member SET name = ? WHERE member_id = ?")
            .bind(name)
            .bind(member_id)
            .execute(uow.conn())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_one(&self, uow: &mut UnitOfWork, member_id: i64) -> Result<Option<Member>, sqlx::Error> {
        self.fetch(uow, member_id, QueryKind::Lookup).await
    }

    /// Single-member load tagged with the kind of access that caused it
    pub(crate) async fn fetch(
        &self,
        uow: &mut UnitOfWork,
        member_id: i64,
        kind: QueryKind,
    ) -> Result<Option<Member>, sqlx::Error> {
        uow.record(kind);
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE member_id = ?"
        ))
        .bind(member_id)
        .fetch_optional(uow.conn())
        .await?;

        Ok(row.map(Member::from))
    }

    pub async fn find_all(&self, uow: &mut UnitOfWork) -> Result<Vec<Member>, sqlx::Error> {
        uow.record(QueryKind::Lookup);
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member ORDER BY member_id"
        ))
        .fetch_all(uow.conn())
        .await?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    pub async fn find_by_name(&self, uow: &mut UnitOfWork, name: &str) -> Result<Vec<Member>, sqlx::Error> {
        uow.record(QueryKind::Lookup);
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE name = ? ORDER BY member_id"
        ))
        .bind(name)
        .fetch_all(uow.conn())
        .await?;

        Ok(rows.into_iter().map(Member::from).collect())
    }
}
