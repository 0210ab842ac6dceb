use storage::{CredentialStore, Identity, SessionStore};

use crate::error::AccountError;

const MIN_PASSWORD_LEN: usize = 8;

/// Where a successful login routes: straight into the exam, or to the result
/// page when this session already holds a finalized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDestination {
    Exam,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub student_name: String,
    pub destination: LoginDestination,
}

/// Registration and login against the single-identity credential store.
///
/// Faithful to the original fake auth: one plaintext identity, field-level
/// validation, nothing resembling real account security.
#[derive(Clone)]
pub struct AccountService {
    session: SessionStore,
    credentials: CredentialStore,
}

impl AccountService {
    #[must_use]
    pub fn new(session: SessionStore, credentials: CredentialStore) -> Self {
        Self {
            session,
            credentials,
        }
    }

    /// Register a new identity, replacing none: a second registration under
    /// the same email is refused.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation (`NameRequired`, `InvalidEmail`,
    /// `PasswordTooShort`, `PasswordMismatch`), `AlreadyRegistered` for a
    /// duplicate email, or `Storage` for store failures.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AccountError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(AccountError::NameRequired);
        }
        if !is_plausible_email(email) {
            return Err(AccountError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort);
        }
        if password != confirm {
            return Err(AccountError::PasswordMismatch);
        }
        if let Some(existing) = self.credentials.identity().await? {
            if existing.email.eq_ignore_ascii_case(email) {
                return Err(AccountError::AlreadyRegistered);
            }
        }

        self.credentials
            .save_identity(&Identity {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Check credentials and open a session for the student.
    ///
    /// On success the student name is echoed into the session store (the
    /// exam and result pages greet by name) and the destination reports
    /// whether a finalized result already exists for this session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when no identity matches, or `Storage`
    /// for store failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountError> {
        let email = email.trim();
        let identity = self
            .credentials
            .identity()
            .await?
            .filter(|id| id.email.eq_ignore_ascii_case(email) && id.password == password)
            .ok_or(AccountError::InvalidCredentials)?;

        self.session.save_user_name(&identity.name).await?;
        let destination = if self.session.report().await?.is_some() {
            LoginDestination::Result
        } else {
            LoginDestination::Exam
        };
        Ok(LoginOutcome {
            student_name: identity.name,
            destination,
        })
    }
}

/// Minimal shape check: one `@` with a dotted domain, no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2
}
