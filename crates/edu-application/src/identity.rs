//! Identity context: bearer token, cached profile and their persistence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use edu_core::identity::{AuthUser, StoredIdentity};
use edu_core::keys::{AUTH_KEY, GUEST_IDENTITY};
use edu_core::store::DurableStore;
use edu_interaction::dto::{AuthResponse, LoginRequest, RegisterRequest};
use edu_interaction::{AuthApi, RequestError};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Default)]
struct IdentityState {
    token: Option<String>,
    user: Option<AuthUser>,
}

/// Who is signed in.
///
/// Hydrated from the durable store on construction. [`IdentityContext::bootstrap`]
/// revalidates a stored token once per process; concurrent callers share the
/// same revalidation. A token the service rejects signs the user out; when
/// the service cannot be reached the stored identity is kept and the next
/// bootstrap tries again.
pub struct IdentityContext {
    api: Arc<dyn AuthApi>,
    store: DurableStore,
    state: Mutex<IdentityState>,
    verifying: AtomicBool,
    bootstrap: OnceCell<()>,
}

/// Keeps `verifying` raised until the revalidation finishes or is dropped.
struct VerifyingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> VerifyingGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for VerifyingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl IdentityContext {
    pub fn new(api: Arc<dyn AuthApi>, store: DurableStore) -> Self {
        let state = match store.read_as::<StoredIdentity>(AUTH_KEY) {
            Some(stored) if !stored.token.trim().is_empty() => IdentityState {
                token: Some(stored.token),
                user: stored.user,
            },
            _ => IdentityState::default(),
        };

        api.set_token(state.token.clone());

        Self {
            api,
            store,
            state: Mutex::new(state),
            verifying: AtomicBool::new(false),
            bootstrap: OnceCell::new(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.lock_state().token.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.lock_state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_state().token.is_some()
    }

    /// Whether the stored token is being revalidated right now.
    pub fn is_verifying(&self) -> bool {
        self.verifying.load(Ordering::Acquire)
    }

    /// Identity partitioning the conversation history.
    pub fn storage_identity(&self) -> String {
        self.lock_state()
            .user
            .as_ref()
            .map(AuthUser::storage_identity)
            .unwrap_or_else(|| GUEST_IDENTITY.to_string())
    }

    /// Revalidates the stored token against the service, once per process.
    pub async fn bootstrap(&self) {
        // An unreachable service leaves the cell empty so a later call retries.
        let _ = self.bootstrap.get_or_try_init(|| self.revalidate()).await;
    }

    async fn revalidate(&self) -> Result<(), RequestError> {
        if self.token().is_none() {
            return Ok(());
        }

        let result = {
            let _verifying = VerifyingGuard::raise(&self.verifying);
            self.api.me().await
        };

        match result {
            Ok(user) => {
                tracing::debug!(user = %user.storage_identity(), "Stored session is valid");
                let mut state = self.lock_state();
                state.user = Some(user);
                self.persist(&state);
                Ok(())
            }
            Err(e) if e.status().is_some() => {
                tracing::info!(error = %e, "Stored session rejected, signing out");
                self.clear();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not revalidate stored session, keeping it");
                Err(e)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, RequestError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        Ok(self.apply(response))
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthUser, RequestError> {
        let response = self.api.register(request).await?;
        Ok(self.apply(response))
    }

    /// Forgets the token, the profile and the stored record.
    pub fn logout(&self) {
        self.clear();
    }

    fn apply(&self, response: AuthResponse) -> AuthUser {
        let user = response.user;
        tracing::info!(user = %user.storage_identity(), "Signed in");

        self.api.set_token(Some(response.access_token.clone()));
        let mut state = self.lock_state();
        state.token = Some(response.access_token);
        state.user = Some(user.clone());
        self.persist(&state);
        user
    }

    fn clear(&self) {
        self.api.set_token(None);
        *self.lock_state() = IdentityState::default();
        self.store.remove(AUTH_KEY);
    }

    fn persist(&self, state: &IdentityState) {
        if let Some(token) = &state.token {
            let record = StoredIdentity {
                token: token.clone(),
                user: state.user.clone(),
            };
            self.store.write(AUTH_KEY, &record);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, IdentityState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
