use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use models::{user::{normalize_email, now_millis}, User, UserInput};

use crate::{
    errors::ServiceError,
    pagination::{paginate, Page, PageSettings},
    query::UserQuery,
    storage::CollectionStore,
};

pub const MSG_DUPLICATE_EMAIL: &str = "User with this email already exists";

/// CRUD over the user collection.
///
/// Every call re-reads the collection from the store. Mutations hold
/// `write_lock` across load-mutate-save so concurrent writers cannot lose
/// each other's updates; reads take no lock since saves are atomic.
pub struct UserService {
    store: Arc<dyn CollectionStore<User>>,
    write_lock: Mutex<()>,
    page_settings: PageSettings,
}

impl UserService {
    pub fn new(store: Arc<dyn CollectionStore<User>>) -> Self {
        Self::with_page_settings(store, PageSettings::default())
    }

    pub fn with_page_settings(store: Arc<dyn CollectionStore<User>>, page_settings: PageSettings) -> Self {
        Self { store, write_lock: Mutex::new(()), page_settings }
    }

    /// Filter, sort and slice the collection.
    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, ServiceError> {
        let users = self.store.load().await?;
        let pagination = query.page.normalize(self.page_settings);
        Ok(paginate(query.select(users), pagination))
    }

    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        let id = parse_id(id)?;
        self.store
            .load()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn create(&self, input: UserInput) -> Result<User, ServiceError> {
        let valid = input.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;
        ensure_email_free(&users, &valid.email, None)?;

        let user = User::create(valid, now_millis());
        users.push(user.clone());
        self.store.save(&users).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Existence is checked before the body is validated.
    pub async fn update(&self, id: &str, input: UserInput) -> Result<User, ServiceError> {
        let id = parse_id(id)?;
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let valid = input.validate()?;
        ensure_email_free(&users, &valid.email, Some(id))?;

        users[idx].apply(valid, now_millis());
        let updated = users[idx].clone();
        self.store.save(&users).await?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<User, ServiceError> {
        let id = parse_id(id)?;
        let _guard = self.write_lock.lock().await;
        let mut users = self.store.load().await?;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let removed = users.remove(idx);
        self.store.save(&users).await?;
        info!(user_id = %id, "user deleted");
        Ok(removed)
    }
}

/// Ids that are not UUIDs cannot exist in the collection.
fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::not_found("User"))
}

fn ensure_email_free(users: &[User], email: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    let email = normalize_email(email);
    let taken = users.iter().any(|u| Some(u.id) != except && u.has_email(&email));
    if taken {
        debug!(%email, "duplicate email rejected");
        return Err(ServiceError::Conflict(MSG_DUPLICATE_EMAIL.into()));
    }
    Ok(())
}
