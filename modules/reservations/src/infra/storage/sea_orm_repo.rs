//! SeaORM-backed repository implementations for the domain ports.
//!
//! The guarded reservation writes (`insert_if_free` / `update_if_free`)
//! re-run the overlap check inside the transaction that performs the write,
//! so two racing submits for the same slot can never both commit.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{Reservation, Room, UserAccount};
use crate::domain::repo::{
    CommitOutcome, ReservationsRepository, RoomsRepository, UsersRepository,
};
use crate::infra::storage::entity::{reservation, room, session, user};

/// SeaORM reservations repository.
/// Holds a cheap cloneable connection handle.
pub struct SeaOrmReservationsRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Overlap condition for `[start, end)` against stored rows: a row clashes
/// when `row.start < end AND row.end > start`.
fn overlapping_query(
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> sea_orm::Select<reservation::Entity> {
    let mut query = reservation::Entity::find()
        .filter(reservation::Column::RoomId.eq(room_id))
        .filter(reservation::Column::StartTime.lt(end))
        .filter(reservation::Column::EndTime.gt(start));
    if let Some(id) = exclude {
        query = query.filter(reservation::Column::Id.ne(id));
    }
    query
}

#[async_trait::async_trait]
impl ReservationsRepository for SeaOrmReservationsRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Reservation>> {
        let found = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_overlapping(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<Vec<Reservation>> {
        let rows = overlapping_query(room_id, start, end, exclude)
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .context("find_overlapping failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_if_free(&self, r: Reservation) -> anyhow::Result<CommitOutcome> {
        let outcome = self
            .db
            .transaction::<_, CommitOutcome, DbErr>(move |txn| {
                Box::pin(async move {
                    let clashes = overlapping_query(r.room_id, r.start, r.end, None)
                        .count(txn)
                        .await?;
                    if clashes > 0 {
                        return Ok(CommitOutcome::Overlap);
                    }

                    let m = reservation::ActiveModel {
                        id: Set(r.id),
                        user_id: Set(r.user_id),
                        room_id: Set(r.room_id),
                        start_time: Set(r.start),
                        end_time: Set(r.end),
                    };
                    m.insert(txn).await?;
                    Ok(CommitOutcome::Committed(r))
                })
            })
            .await
            .context("insert_if_free failed")?;
        Ok(outcome)
    }

    async fn update_if_free(&self, r: Reservation) -> anyhow::Result<CommitOutcome> {
        let outcome = self
            .db
            .transaction::<_, CommitOutcome, DbErr>(move |txn| {
                Box::pin(async move {
                    let clashes = overlapping_query(r.room_id, r.start, r.end, Some(r.id))
                        .count(txn)
                        .await?;
                    if clashes > 0 {
                        return Ok(CommitOutcome::Overlap);
                    }

                    let m = reservation::ActiveModel {
                        id: Set(r.id),
                        user_id: Set(r.user_id),
                        room_id: Set(r.room_id),
                        start_time: Set(r.start),
                        end_time: Set(r.end),
                    };
                    m.update(txn).await?;
                    Ok(CommitOutcome::Committed(r))
                })
            })
            .await
            .context("update_if_free failed")?;
        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = reservation::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .context("list_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .context("list_for_user failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_upcoming_for_user(
        &self,
        user_id: Uuid,
        after: DateTime<Utc>,
        limit: u64,
    ) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::StartTime.gte(after))
            .order_by_asc(reservation::Column::StartTime)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list_upcoming_for_user failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_upcoming_for_room(
        &self,
        room_id: Uuid,
        after: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Reservation>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::RoomId.eq(room_id))
            .filter(reservation::Column::StartTime.gt(after))
            .order_by_asc(reservation::Column::StartTime)
            .all(&self.db)
            .await
            .context("list_upcoming_for_room failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// SeaORM rooms repository.
pub struct SeaOrmRoomsRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoomsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl RoomsRepository for SeaOrmRoomsRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Room>> {
        let found = room::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn list(&self) -> anyhow::Result<Vec<Room>> {
        let rows = room::Entity::find()
            .order_by_asc(room::Column::Name)
            .all(&self.db)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, r: Room) -> anyhow::Result<()> {
        let m = room::ActiveModel {
            id: Set(r.id),
            name: Set(r.name),
            capacity: Set(r.capacity),
            location: Set(r.location),
        };
        let _ = m.insert(&self.db).await.context("insert failed")?;
        Ok(())
    }

    async fn update(&self, r: Room) -> anyhow::Result<()> {
        let m = room::ActiveModel {
            id: Set(r.id),
            name: Set(r.name),
            capacity: Set(r.capacity),
            location: Set(r.location),
        };
        let _ = m.update(&self.db).await.context("update failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = room::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// SeaORM users + sessions repository.
pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserAccount>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<(UserAccount, String)>> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find_by_username failed")?;
        Ok(found.map(|m| {
            let digest = m.password_digest.clone();
            (m.into(), digest)
        }))
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.db)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn list(&self) -> anyhow::Result<Vec<UserAccount>> {
        let rows = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, u: UserAccount, password_digest: String) -> anyhow::Result<()> {
        let m = user::ActiveModel {
            id: Set(u.id),
            username: Set(u.username),
            email: Set(u.email),
            password_digest: Set(password_digest),
            is_admin: Set(u.is_admin),
            created_at: Set(u.created_at),
        };
        let _ = m.insert(&self.db).await.context("insert failed")?;
        Ok(())
    }

    async fn update(
        &self,
        u: UserAccount,
        password_digest: Option<String>,
    ) -> anyhow::Result<()> {
        // NotSet leaves the stored digest untouched.
        let m = user::ActiveModel {
            id: Set(u.id),
            username: Set(u.username),
            email: Set(u.email),
            password_digest: password_digest.map_or(NotSet, Set),
            is_admin: Set(u.is_admin),
            created_at: Set(u.created_at),
        };
        let _ = m.update(&self.db).await.context("update failed")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn insert_session(
        &self,
        token: Uuid,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let m = session::ActiveModel {
            token: Set(token),
            user_id: Set(user_id),
            issued_at: Set(issued_at),
        };
        let _ = m.insert(&self.db).await.context("insert_session failed")?;
        Ok(())
    }

    async fn find_session_user(&self, token: Uuid) -> anyhow::Result<Option<UserAccount>> {
        let found = session::Entity::find_by_id(token)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await
            .context("find_session_user failed")?;
        Ok(found.and_then(|(_, u)| u.map(Into::into)))
    }
}
