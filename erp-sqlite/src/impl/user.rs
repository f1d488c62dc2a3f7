use super::is_unique_violation;
use crate::{
    Db,
    types::{CredentialsRow, ResetTokenRow, UserRow, convert},
};
use erp_core::{
    models::{NewUser, Role, SignUp, User, UserAccess, UserId},
    ports::{UserFailure, UserRepository},
};
use sqlx::types::Json;
use time::OffsetDateTime;

impl UserRepository for Db {
    async fn register_user(
        &self,
        user_id: UserId,
        sign_up: SignUp,
        as_of: OffsetDateTime,
    ) -> Result<Result<User, UserFailure>, Self::Error> {
        // One statement, so concurrent registrations cannot both see an
        // empty table.
        let result = sqlx::query_as::<_, UserRow>(
            r#"
            insert into
                app_user (id, name, email, password_hash, role, menu, active, created_at, updated_at)
            select
                $1, $2, $3, $4,
                case when exists (select 1 from app_user) then $5 else $6 end,
                case when exists (select 1 from app_user) then $7 else $8 end,
                1, $9, $9
            returning
                id, name, email, role, menu, active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&sign_up.name)
        .bind(&sign_up.email)
        .bind(&sign_up.password_hash)
        .bind(Role::Staff.as_str())
        .bind(Role::Admin.as_str())
        .bind(Json(Role::Staff.default_menu()))
        .bind(Json(Role::Admin.default_menu()))
        .bind(as_of)
        .fetch_one(&self.writer)
        .await;

        match result {
            Ok(row) => Ok(Ok(User::try_from(row)?)),
            Err(err) if is_unique_violation(&err) => Ok(Err(UserFailure::EmailTaken)),
            Err(err) => Err(err),
        }
    }

    async fn create_user(
        &self,
        user_id: UserId,
        user: NewUser,
        as_of: OffsetDateTime,
    ) -> Result<Result<User, UserFailure>, Self::Error> {
        let result = sqlx::query(
            r#"
            insert into
                app_user (id, name, email, password_hash, role, menu, active, created_at, updated_at)
            values
                ($1, $2, $3, $4, $5, $6, 1, $7, $7)
            "#,
        )
        .bind(user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Json(&user.menu))
        .bind(as_of)
        .execute(&self.writer)
        .await;

        match result {
            Ok(_) => Ok(Ok(User {
                id: user_id,
                name: user.name,
                email: user.email,
                role: user.role,
                menu: user.menu,
                active: true,
                created_at: as_of,
                updated_at: as_of,
            })),
            Err(err) if is_unique_violation(&err) => Ok(Err(UserFailure::EmailTaken)),
            Err(err) => Err(err),
        }
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, Self::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            select
                id, name, email, role, menu, active, created_at, updated_at
            from
                app_user
            where
                id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.reader)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<(User, String)>, Self::Error> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            select
                id, name, email, role, menu, active, created_at, updated_at, password_hash
            from
                app_user
            where
                email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.reader)
        .await?;

        match row {
            Some(row) => Ok(Some((row.user.try_into()?, row.password_hash))),
            None => Ok(None),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, Self::Error> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            select
                id, name, email, role, menu, active, created_at, updated_at
            from
                app_user
            order by
                created_at, email
            "#,
        )
        .fetch_all(&self.reader)
        .await?;
        convert(rows)
    }

    async fn update_user_access(
        &self,
        user_id: UserId,
        access: UserAccess,
        as_of: OffsetDateTime,
    ) -> Result<Result<User, UserFailure>, Self::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            update
                app_user
            set
                role = $2,
                menu = $3,
                active = $4,
                updated_at = $5
            where
                id = $1
            returning
                id, name, email, role, menu, active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(access.role.as_str())
        .bind(Json(&access.menu))
        .bind(access.active)
        .bind(as_of)
        .fetch_optional(&self.writer)
        .await?;

        match row {
            Some(row) => Ok(Ok(row.try_into()?)),
            None => Ok(Err(UserFailure::DoesNotExist)),
        }
    }

    async fn delete_user(&self, user_id: UserId) -> Result<Result<(), UserFailure>, Self::Error> {
        let result = sqlx::query("delete from app_user where id = $1")
            .bind(user_id)
            .execute(&self.writer)
            .await?;

        if result.rows_affected() == 0 {
            Ok(Err(UserFailure::DoesNotExist))
        } else {
            Ok(Ok(()))
        }
    }

    async fn create_reset_token(
        &self,
        user_id: UserId,
        digest: String,
        expires_at: OffsetDateTime,
        as_of: OffsetDateTime,
    ) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                password_reset (digest, user_id, expires_at, created_at)
            values
                ($1, $2, $3, $4)
            "#,
        )
        .bind(digest)
        .bind(user_id)
        .bind(expires_at)
        .bind(as_of)
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        digest: String,
        password_hash: String,
        as_of: OffsetDateTime,
    ) -> Result<Option<UserId>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let token = sqlx::query_as::<_, ResetTokenRow>(
            "select user_id, expires_at, used_at from password_reset where digest = $1",
        )
        .bind(&digest)
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = match token {
            Some(token) if token.used_at.is_none() && as_of < token.expires_at => token.user_id,
            _ => return Ok(None),
        };

        sqlx::query("update app_user set password_hash = $2, updated_at = $3 where id = $1")
            .bind(user_id)
            .bind(password_hash)
            .bind(as_of)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "update password_reset set used_at = $2 where user_id = $1 and used_at is null",
        )
        .bind(user_id)
        .bind(as_of)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(user_id))
    }
}
