//! Current user lookup.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::User;

impl ConfluenceClient {
    /// Check the credentials by asking who the server thinks we are.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Unauthenticated`] if the server answers as
    /// anonymous, or the HTTP error for rejected credentials.
    pub fn current_user(&self) -> Result<User, ConfluenceError> {
        let url = format!("{}/user/current", self.api_url());
        let user: User = self.get_json(&url)?;
        if user.is_anonymous() {
            return Err(ConfluenceError::Unauthenticated(
                "server treated the request as anonymous".to_owned(),
            ));
        }
        info!("Logged in as {}", user.name());
        Ok(user)
    }
}
