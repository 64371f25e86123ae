//! Sign-in flows and the session context threaded through the client.

use todoman_api::v1::{AuthResponse, FederatedLoginRequest, LoginRequest, RegisterRequest};
use tracing::{info, warn};

use crate::{
    session::{Persistence, Session, SessionStore},
    ApiClient, ApiError, AuthError,
};

/// Email and password as typed into the login form.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> Result<LoginRequest, AuthError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        Ok(LoginRequest {
            email: email.to_owned(),
            password: self.password.clone(),
        })
    }
}

/// Owns the session for the lifetime of the client: restored from the store
/// at startup, replaced by a successful sign-in and torn down by `logout`.
#[derive(Debug)]
pub struct SessionContext {
    store: SessionStore,
    client: ApiClient,
    session: Option<Session>,
}

impl SessionContext {
    /// Picks up a stored session, if any, and authorizes the client with it.
    pub fn restore(store: SessionStore, mut client: ApiClient) -> Result<Self, AuthError> {
        let session = match store.load()? {
            Some((session, persistence)) => {
                client.authorize(&session.token)?;
                info!(user = %session.user.email, ?persistence, "restored session");
                Some(session)
            }
            None => None,
        };

        Ok(Self {
            store,
            client,
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The client, provided someone is signed in.
    pub fn require(&self) -> Result<&ApiClient, AuthError> {
        match self.session {
            Some(_) => Ok(&self.client),
            None => Err(AuthError::NotSignedIn),
        }
    }

    pub async fn login(
        &mut self,
        credentials: &Credentials,
        persistence: Persistence,
    ) -> Result<&Session, AuthError> {
        let request = credentials.validate()?;

        let response = self
            .client
            .login(&request)
            .await
            .map_err(|err| rejected(err, "Login failed"))?;

        self.establish(response, persistence)
    }

    pub async fn register(
        &mut self,
        name: &str,
        credentials: &Credentials,
        persistence: Persistence,
    ) -> Result<&Session, AuthError> {
        let LoginRequest { email, password } = credentials.validate()?;
        let request = RegisterRequest {
            email,
            password,
            name: name.trim().to_owned(),
        };

        let response = self
            .client
            .register(&request)
            .await
            .map_err(|err| rejected(err, "Registration failed"))?;

        self.establish(response, persistence)
    }

    /// Exchanges a credential from the identity provider for a session.
    ///
    /// `credential` is `None` when the provider could not produce one.
    pub async fn login_federated(
        &mut self,
        client_id: Option<&str>,
        credential: Option<String>,
        persistence: Persistence,
    ) -> Result<&Session, AuthError> {
        if client_id.map_or(true, |id| id.trim().is_empty()) {
            return Err(AuthError::ClientIdMissing);
        }

        let Some(credential) = credential.filter(|c| !c.trim().is_empty()) else {
            return Err(AuthError::ProviderNotReady);
        };

        let request = FederatedLoginRequest { credential };
        let response = match self.client.login_federated(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "federated sign-in rejected");
                let message = err.detail().unwrap_or("Google login failed");
                return Err(AuthError::CredentialRejected(message.to_owned()));
            }
        };

        self.establish(response, persistence)
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(session) = self.session.take() {
            info!(user = %session.user.email, "signed out");
        }

        self.client.deauthorize();
        self.store.clear()?;

        Ok(())
    }

    fn establish(
        &mut self,
        response: AuthResponse,
        persistence: Persistence,
    ) -> Result<&Session, AuthError> {
        let session = Session {
            token: response.access_token,
            user: response.user,
        };

        self.client.authorize(&session.token)?;
        self.store.save(&session, persistence)?;
        info!(user = %session.user.email, ?persistence, "signed in");

        Ok(self.session.insert(session))
    }
}

fn rejected(err: ApiError, fallback: &str) -> AuthError {
    warn!(error = %err, "sign-in rejected");
    AuthError::Rejected(err.detail().unwrap_or(fallback).to_owned())
}
