use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub contact_number: Option<String>,
    pub avatar_img: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("username already exists")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<Account>,
    next_id: i64,
}

/// In-memory account table. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct AccountStore {
    inner: RwLock<Inner>,
}

impl AccountStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates `name` unless it exists already; returns the stored account either way.
    pub fn seed_admin(&self, name: &str, password_hash: &str) -> Account {
        if let Some(existing) = self.by_name(name) {
            return existing;
        }
        match self.create(name, password_hash, None, None) {
            Ok(account) => account,
            // lost a race with another seeder
            Err(_) => self.by_name(name).unwrap_or_default(),
        }
    }

    pub fn create(
        &self,
        name: &str,
        password_hash: &str,
        contact_number: Option<String>,
        avatar_img: Option<String>,
    ) -> Result<Account, AccountError> {
        let mut inner = self.inner.write();
        if inner.accounts.iter().any(|a| a.name == name) {
            return Err(AccountError::AlreadyExists);
        }
        inner.next_id += 1;
        let account = Account {
            id: inner.next_id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            contact_number,
            avatar_img,
        };
        inner.accounts.push(account.clone());
        log::debug!("Created account {} ({})", account.id, account.name);
        Ok(account)
    }

    pub fn by_name(&self, name: &str) -> Option<Account> {
        self.inner.read().accounts.iter().find(|a| a.name == name).cloned()
    }

    pub fn by_id(&self, id: i64) -> Option<Account> {
        self.inner.read().accounts.iter().find(|a| a.id == id).cloned()
    }

    /// Replaces the emergency contact of `id`; `None` clears it.
    pub fn set_contact(&self, id: i64, contact_number: Option<String>) -> Result<(), AccountError> {
        let mut inner = self.inner.write();
        let account = inner.accounts.iter_mut().find(|a| a.id == id).ok_or(AccountError::NotFound)?;
        account.contact_number = contact_number;
        Ok(())
    }

    pub fn contact(&self, id: i64) -> Result<Option<String>, AccountError> {
        self.by_id(id).map(|a| a.contact_number).ok_or(AccountError::NotFound)
    }

    pub fn len(&self) -> usize {
        self.inner.read().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_and_names_are_unique() {
        let store = AccountStore::new();
        let a = store.create("ana", "h", None, None).unwrap();
        let b = store.create("ben", "h", Some("555".into()), None).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.create("ana", "x", None, None), Err(AccountError::AlreadyExists));
        assert_eq!(store.by_name("ben").unwrap().contact_number.as_deref(), Some("555"));
        assert!(store.by_name("cy").is_none());
    }

    #[test]
    fn seed_admin_is_idempotent() {
        let store = AccountStore::new();
        let first = store.seed_admin("admin", "");
        let second = store.seed_admin("admin", "other");
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn contacts_round_trip() {
        let store = AccountStore::new();
        let a = store.create("ana", "h", None, None).unwrap();
        store.set_contact(a.id, Some("911".into())).unwrap();
        assert_eq!(store.contact(a.id).unwrap().as_deref(), Some("911"));
        store.set_contact(a.id, None).unwrap();
        assert_eq!(store.contact(a.id).unwrap(), None);
        assert_eq!(store.set_contact(42, None), Err(AccountError::NotFound));
    }
}
