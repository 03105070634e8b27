use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::ServiceConfig;
use crate::contract::model::{NewUser, Role, User, UserFilter, UserPatch, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::ports::PasswordHasher;
use crate::domain::repos::{AssignmentsRepository, RepairsRepository, UsersRepository};
use crate::domain::rules::user::{
    normalize_email, normalize_optional, prepare_new_user, validate_email, validate_password,
    validate_real_name, validate_username,
};

/// Account management: registration, profile edits, credentials.
pub struct UsersService<UR, AR, TR> {
    users: Arc<UR>,
    assignments: Arc<AR>,
    repairs: Arc<TR>,
    hasher: Arc<dyn PasswordHasher>,
    db: DatabaseConnection,
    config: ServiceConfig,
}

impl<UR, AR, TR> UsersService<UR, AR, TR>
where
    UR: UsersRepository,
    AR: AssignmentsRepository,
    TR: RepairsRepository,
{
    pub fn new(
        users: Arc<UR>,
        assignments: Arc<AR>,
        repairs: Arc<TR>,
        hasher: Arc<dyn PasswordHasher>,
        db: DatabaseConnection,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            assignments,
            repairs,
            hasher,
            db,
            config,
        }
    }

    #[instrument(name = "dormitory.service.users.get", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.users
            .get(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    #[instrument(name = "dormitory.service.users.find_by_username", skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let username = username.trim();
        self.users
            .find_by_username(&self.db, username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }

    #[instrument(name = "dormitory.service.users.find_by_student_number", skip(self))]
    pub async fn find_by_student_number(&self, student_number: &str) -> Result<User, DomainError> {
        let student_number = student_number.trim();
        self.users
            .find_by_student_number(&self.db, student_number)
            .await?
            .ok_or_else(|| DomainError::not_found("User", student_number))
    }

    #[instrument(name = "dormitory.service.users.list", skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, DomainError> {
        let users = self.users.list(&self.db, &filter).await?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    /// Students holding no ACTIVE assignment.
    #[instrument(name = "dormitory.service.users.without_room", skip(self))]
    pub async fn list_students_without_room(&self) -> Result<Vec<User>, DomainError> {
        let filter = UserFilter {
            role: Some(Role::Student),
            ..UserFilter::default()
        };
        let students = self.users.list(&self.db, &filter).await?;
        let housed = self.assignments.active_student_ids(&self.db).await?;
        let unhoused: Vec<User> = students
            .into_iter()
            .filter(|s| !housed.contains(&s.id))
            .collect();
        debug!("{} students without a room", unhoused.len());
        Ok(unhoused)
    }

    pub async fn count_users(&self) -> Result<u64, DomainError> {
        self.users.count(&self.db).await
    }

    #[instrument(
        name = "dormitory.service.users.create",
        skip(self, new_user),
        fields(username = %new_user.username, role = %new_user.profile.role())
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let new_user = prepare_new_user(
            new_user,
            self.config.max_username_length,
            self.config.min_password_length,
        )?;
        let password_hash = self.hasher.hash(&new_user.password)?;

        let txn = self.db.begin().await?;

        if self
            .users
            .username_taken(&txn, &new_user.username, None)
            .await?
        {
            return Err(DomainError::already_exists("User", "username", new_user.username));
        }
        if let Some(email) = &new_user.email {
            if self.users.email_taken(&txn, email, None).await? {
                return Err(DomainError::already_exists("User", "email", email.clone()));
            }
        }
        if let Some(number) = new_user.profile.student_number() {
            if self.users.student_number_taken(&txn, number, None).await? {
                return Err(DomainError::already_exists("User", "student_number", number));
            }
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            real_name: new_user.real_name,
            email: new_user.email,
            phone: new_user.phone,
            profile: new_user.profile,
            created_at: now,
            updated_at: now,
        };
        let user = self.users.create(&txn, user, password_hash).await?;
        txn.commit().await?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "dormitory.service.users.update", skip(self, patch), fields(user_id = %id))]
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        let txn = self.db.begin().await?;
        let mut current = self
            .users
            .get(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;

        if let Some(username) = patch.username {
            let username = username.trim().to_string();
            validate_username(&username, self.config.max_username_length)?;
            if username != current.username
                && self.users.username_taken(&txn, &username, Some(id)).await?
            {
                return Err(DomainError::already_exists("User", "username", username));
            }
            current.username = username;
        }
        if let Some(real_name) = patch.real_name {
            validate_real_name(&real_name)?;
            current.real_name = real_name.trim().to_string();
        }
        if patch.email.is_some() {
            let email = normalize_email(patch.email);
            if let Some(email) = &email {
                validate_email(email)?;
                if current.email.as_ref() != Some(email)
                    && self.users.email_taken(&txn, email, Some(id)).await?
                {
                    return Err(DomainError::already_exists("User", "email", email.clone()));
                }
            }
            current.email = email;
        }
        if patch.phone.is_some() {
            current.phone = normalize_optional(patch.phone);
        }

        // Role-specific fields only land on the matching variant.
        match &mut current.profile {
            UserProfile::Student {
                student_number,
                class_name,
                major,
            } => {
                if let Some(number) = patch.student_number {
                    let number = number.trim().to_string();
                    if number.is_empty() {
                        return Err(DomainError::validation(
                            "student_number",
                            "required for students",
                        ));
                    }
                    if number != *student_number
                        && self.users.student_number_taken(&txn, &number, Some(id)).await?
                    {
                        return Err(DomainError::already_exists(
                            "User",
                            "student_number",
                            number,
                        ));
                    }
                    *student_number = number;
                }
                if patch.class_name.is_some() {
                    *class_name = normalize_optional(patch.class_name);
                }
                if patch.major.is_some() {
                    *major = normalize_optional(patch.major);
                }
            }
            UserProfile::Admin {
                department,
                position,
            } => {
                if patch.department.is_some() {
                    *department = normalize_optional(patch.department);
                }
                if patch.position.is_some() {
                    *position = normalize_optional(patch.position);
                }
            }
        }
        current.updated_at = Utc::now();

        let updated = self.users.update(&txn, current).await?;
        txn.commit().await?;

        info!("Successfully updated user");
        Ok(updated)
    }

    #[instrument(name = "dormitory.service.users.change_password", skip_all, fields(user_id = %id))]
    pub async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        info!("Changing password");

        validate_password(new_password, self.config.min_password_length)?;

        let txn = self.db.begin().await?;
        let stored = self
            .users
            .password_hash(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;
        if !self.hasher.verify(old_password, &stored)? {
            return Err(DomainError::rejected("current password is incorrect"));
        }

        let hash = self.hasher.hash(new_password)?;
        self.users.set_password_hash(&txn, id, hash).await?;
        txn.commit().await?;

        info!("Password changed");
        Ok(())
    }

    /// Unknown usernames and wrong passwords fail the same way.
    #[instrument(name = "dormitory.service.users.authenticate", skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let bad_credentials = || DomainError::rejected("invalid username or password");

        let user = self
            .users
            .find_by_username(&self.db, username.trim())
            .await?
            .ok_or_else(bad_credentials)?;
        let stored = self
            .users
            .password_hash(&self.db, user.id)
            .await?
            .ok_or_else(bad_credentials)?;

        if self.hasher.verify(password, &stored)? {
            debug!(user_id = %user.id, "Credentials verified");
            Ok(user)
        } else {
            Err(bad_credentials())
        }
    }

    #[instrument(name = "dormitory.service.users.delete", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        let txn = self.db.begin().await?;
        if self.users.get(&txn, id).await?.is_none() {
            return Err(DomainError::not_found("User", id));
        }
        if self.assignments.active_for_student(&txn, id).await?.is_some() {
            return Err(DomainError::rejected(
                "user still holds an active room assignment",
            ));
        }
        let history = self.assignments.count_for_student(&txn, id).await?;
        if history > 0 {
            return Err(DomainError::rejected(format!(
                "user is referenced by {history} assignment record(s)"
            )));
        }
        let tickets = self.repairs.count_for_user(&txn, id).await?;
        if tickets > 0 {
            return Err(DomainError::rejected(format!(
                "user is referenced by {tickets} repair ticket(s)"
            )));
        }

        self.users.delete(&txn, id).await?;
        txn.commit().await?;

        info!("Successfully deleted user");
        Ok(())
    }
}
