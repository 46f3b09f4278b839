use crate::{database::error::ApiError, jwt::SessionData};

#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    CreateRecipes,
    ManageOwnFavorites,
    ManageOwnShoppingCart,
    ManageOwnSubscriptions,

    /// Update or delete a recipe written by `author_id`.
    ManageOwnRecipe { author_id: i32 },
}

impl ActionType {
    pub fn authenticate(&self, session: &SessionData) -> bool {
        match self {
            ActionType::CreateRecipes
            | ActionType::ManageOwnFavorites
            | ActionType::ManageOwnShoppingCart
            | ActionType::ManageOwnSubscriptions => true,
            ActionType::ManageOwnRecipe { author_id } => *author_id == session.user_id,
        }
    }
}

impl SessionData {
    pub fn authenticate(&self, action: ActionType) -> Result<(), ApiError> {
        if !action.authenticate(self) {
            return Err(ApiError::Forbidden(String::from(
                "You don't have permission to perform this action",
            )));
        }
        Ok(())
    }
}
