//! User model -> entity mapper

use scuttle_core::entities::User;
use scuttle_core::value_objects::UserId;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: UserId::new(model.uid),
            username: model.username,
            email: model.email,
            name: model.name,
            homepage: model.homepage,
            content: model.content,
            private_key: model.private_key.filter(|k| !k.is_empty()),
            enable_private_key: model.enable_private_key,
            created_at: model.created_at,
            modified_at: model.modified_at,
        }
    }
}
