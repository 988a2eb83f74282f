//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::user::{PaymentMethod, Role, RoleSet, User, UserRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

pub(crate) fn model_to_domain(m: user::Model) -> User {
    User {
        id: m.id,
        email: m.email,
        password_hash: m.password_hash,
        first_name: m.first_name,
        last_name: m.last_name,
        university_id: m.university_id,
        phone: m.phone,
        photo_url: m.photo_url,
        roles: RoleSet::from_csv(&m.roles),
        active_role: Role::parse(&m.active_role).unwrap_or(Role::Passenger),
        active_vehicle_id: m.active_vehicle_id,
        emergency_contact: m.emergency_contact,
        preferred_payment_method: PaymentMethod::parse(&m.preferred_payment_method)
            .unwrap_or(PaymentMethod::Cash),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id.clone()),
        email: Set(u.email.clone()),
        password_hash: Set(u.password_hash.clone()),
        first_name: Set(u.first_name.clone()),
        last_name: Set(u.last_name.clone()),
        university_id: Set(u.university_id.clone()),
        phone: Set(u.phone.clone()),
        photo_url: Set(u.photo_url.clone()),
        roles: Set(u.roles.as_csv()),
        active_role: Set(u.active_role.as_str().to_string()),
        active_vehicle_id: Set(u.active_vehicle_id.clone()),
        emergency_contact: Set(u.emergency_contact.clone()),
        preferred_payment_method: Set(u.preferred_payment_method.as_str().to_string()),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

// ── UserRepository impl ─────────────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn save(&self, u: User) -> DomainResult<()> {
        debug!("Saving user: {}", u.id);
        domain_to_active(&u).insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_university_id(&self, university_id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::UniversityId.eq(university_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    async fn update(&self, u: User) -> DomainResult<()> {
        let existing = user::Entity::find_by_id(&u.id).one(&self.db).await?;
        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: u.id.clone(),
            });
        }
        domain_to_active(&u).update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
