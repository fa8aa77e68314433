use caravan_roster::BusId;
use chrono::Utc;
use thiserror::Error;

use crate::{Role, User};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Never reveals whether the email or the password was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email not found in the directory")]
    UnknownEmail,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("email is already in use")]
    EmailInUse,
    #[error("no such controller")]
    NotFound,
}

/// Input for creating a controller account. Every field is required.
pub struct NewController {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bus: BusId,
}

struct Account {
    user: User,
    password: String,
}

/// Mock identity provider: a fixed admin plus administrable controller
/// accounts, all in memory. Real credential storage is out of scope;
/// this backs the demo login and the admin controller page.
pub struct Directory {
    accounts: Vec<Account>,
    next_id: u32,
}

impl Directory {
    /// The demo directory: one admin and one controller on bus 3.
    pub fn with_demo_accounts() -> Self {
        let mut directory = Self {
            accounts: Vec::new(),
            next_id: 1,
        };
        directory.seed("Admin User", "admin@example.com", "admin123", Role::Admin);
        directory.seed(
            "Ahmed",
            "controller@example.com",
            "controller123",
            Role::Controller { bus: BusId(3) },
        );
        directory
    }

    pub fn empty() -> Self {
        Self {
            accounts: Vec::new(),
            next_id: 1,
        }
    }

    fn seed(&mut self, name: &str, email: &str, password: &str, role: Role) {
        let id = self.take_id();
        self.accounts.push(Account {
            user: User {
                id,
                name: name.to_owned(),
                email: email.to_owned(),
                role,
                created_at: Utc::now(),
                last_login: None,
            },
            password: password.to_owned(),
        });
    }

    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.user.email == email && account.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        account.user.last_login = Some(Utc::now());
        Ok(account.user.clone())
    }

    /// Demo magic-link flow: a known email logs straight in.
    pub fn magic_link(&mut self, email: &str) -> Result<User, AuthError> {
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.user.email == email)
            .ok_or(AuthError::UnknownEmail)?;
        account.user.last_login = Some(Utc::now());
        Ok(account.user.clone())
    }

    pub fn create_controller(&mut self, input: NewController) -> Result<User, DirectoryError> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::MissingField("name"));
        }
        if input.email.trim().is_empty() {
            return Err(DirectoryError::MissingField("email"));
        }
        if input.password.is_empty() {
            return Err(DirectoryError::MissingField("password"));
        }
        if self.email_taken(&input.email, None) {
            return Err(DirectoryError::EmailInUse);
        }

        let id = self.take_id();
        let user = User {
            id,
            name: input.name,
            email: input.email,
            role: Role::Controller { bus: input.bus },
            created_at: Utc::now(),
            last_login: None,
        };
        self.accounts.push(Account {
            user: user.clone(),
            password: input.password,
        });
        Ok(user)
    }

    pub fn update_controller(
        &mut self,
        id: &str,
        name: String,
        email: String,
        bus: BusId,
    ) -> Result<User, DirectoryError> {
        if name.trim().is_empty() {
            return Err(DirectoryError::MissingField("name"));
        }
        if email.trim().is_empty() {
            return Err(DirectoryError::MissingField("email"));
        }
        if self.email_taken(&email, Some(id)) {
            return Err(DirectoryError::EmailInUse);
        }

        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.user.id == id && !account.user.is_admin())
            .ok_or(DirectoryError::NotFound)?;
        account.user.name = name;
        account.user.email = email;
        account.user.role = Role::Controller { bus };
        Ok(account.user.clone())
    }

    /// Deletes a controller account. Admin accounts are not addressable
    /// here.
    pub fn delete_controller(&mut self, id: &str) -> Result<(), DirectoryError> {
        let before = self.accounts.len();
        self.accounts
            .retain(|account| account.user.id != id || account.user.is_admin());
        if self.accounts.len() == before {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    pub fn controllers(&self) -> Vec<User> {
        self.accounts
            .iter()
            .filter(|account| !account.user.is_admin())
            .map(|account| account.user.clone())
            .collect()
    }

    fn email_taken(&self, email: &str, except_id: Option<&str>) -> bool {
        self.accounts.iter().any(|account| {
            account.user.email == email && except_id != Some(account.user.id.as_str())
        })
    }

    fn take_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }
}
