use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tip::UserSummary;

/// A platform user as known to the tip store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub image_url: String,
    /// Destination address for on-chain payments, if the user has a wallet.
    pub wallet_address: Option<String>,
}

impl UserProfile {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            image_url: self.image_url.clone(),
        }
    }
}
