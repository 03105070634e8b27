use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::{User, UserFilter};
use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;
use crate::infra::storage::db_err;
use crate::infra::storage::entity::user::{Column, Entity};
use crate::infra::storage::mapper::{user_from_model, user_to_active};

/// ORM-based implementation of the `UsersRepository` trait.
#[derive(Clone, Default)]
pub struct OrmUsersRepository;

impl OrmUsersRepository {
    pub fn new() -> Self {
        Self
    }

    async fn taken<C: ConnectionTrait + Send + Sync>(
        conn: &C,
        cond: Condition,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let mut cond = cond;
        if let Some(id) = exclude {
            cond = cond.add(Column::Id.ne(id));
        }
        let n = Entity::find().filter(cond).count(conn).await.map_err(db_err)?;
        Ok(n > 0)
    }
}

#[async_trait]
impl UsersRepository for OrmUsersRepository {
    async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<User>, DomainError> {
        let found = Entity::find_by_id(id).one(conn).await.map_err(db_err)?;
        found.map(user_from_model).transpose()
    }

    async fn find_by_username<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        username: &str,
    ) -> Result<Option<User>, DomainError> {
        let found = Entity::find()
            .filter(Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(user_from_model).transpose()
    }

    async fn find_by_student_number<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_number: &str,
    ) -> Result<Option<User>, DomainError> {
        let found = Entity::find()
            .filter(Column::StudentNumber.eq(student_number))
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(user_from_model).transpose()
    }

    async fn list<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError> {
        let mut cond = Condition::all();
        if let Some(role) = filter.role {
            cond = cond.add(Column::Role.eq(role.as_str()));
        }
        if let Some(class_name) = &filter.class_name {
            cond = cond.add(Column::ClassName.eq(class_name.as_str()));
        }
        if let Some(major) = &filter.major {
            cond = cond.add(Column::Major.eq(major.as_str()));
        }
        if let Some(kw) = filter.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            cond = cond.add(
                Condition::any()
                    .add(Column::Username.contains(kw))
                    .add(Column::RealName.contains(kw))
                    .add(Column::Email.contains(kw))
                    .add(Column::StudentNumber.contains(kw)),
            );
        }

        Entity::find()
            .filter(cond)
            .order_by_asc(Column::Username)
            .all(conn)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(user_from_model)
            .collect()
    }

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut m = user_to_active(user);
        m.password_hash = Set(password_hash);
        let saved = m.insert(conn).await.map_err(db_err)?;
        user_from_model(saved)
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: User,
    ) -> Result<User, DomainError> {
        let id = user.id;
        if Entity::find_by_id(id).one(conn).await.map_err(db_err)?.is_none() {
            return Err(DomainError::not_found("User", id));
        }
        let saved = user_to_active(user).update(conn).await.map_err(db_err)?;
        user_from_model(saved)
    }

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = Entity::delete_by_id(id).exec(conn).await.map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }

    async fn password_hash<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<String>, DomainError> {
        let found = Entity::find_by_id(id).one(conn).await.map_err(db_err)?;
        Ok(found.map(|m| m.password_hash))
    }

    async fn set_password_hash<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        password_hash: String,
    ) -> Result<(), DomainError> {
        let res = Entity::update_many()
            .col_expr(Column::PasswordHash, sea_orm::sea_query::Expr::value(password_hash))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now()),
            )
            .filter(Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(DomainError::not_found("User", id));
        }
        Ok(())
    }

    async fn username_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        Self::taken(conn, Condition::all().add(Column::Username.eq(username)), exclude).await
    }

    async fn email_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        Self::taken(conn, Condition::all().add(Column::Email.eq(email)), exclude).await
    }

    async fn student_number_taken<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        student_number: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        Self::taken(
            conn,
            Condition::all().add(Column::StudentNumber.eq(student_number)),
            exclude,
        )
        .await
    }

    async fn count<C: ConnectionTrait + Send + Sync>(&self, conn: &C) -> Result<u64, DomainError> {
        Entity::find().count(conn).await.map_err(db_err)
    }
}
