//! Response shapes, one per endpoint family, with explicit mappings from rows.

use serde::Serialize;
use warp::{
    http::StatusCode,
    reply::{self, Json, WithStatus},
};

use super::schema::{
    AuthorRecipe, AuthorRow, RecipeDetail, RecipePart, RecipeShort, SubscriptionRow, Tag, Id,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AuthorView {
    pub email: String,
    pub id: Id,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<AuthorRow> for AuthorView {
    fn from(value: AuthorRow) -> Self {
        Self {
            email: value.email,
            id: value.id,
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            is_subscribed: value.is_subscribed,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeIngredientView {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipePart> for RecipeIngredientView {
    fn from(value: RecipePart) -> Self {
        Self {
            id: value.ingredient_id,
            name: value.name,
            measurement_unit: value.measurement_unit,
            amount: value.amount,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeView {
    pub id: Id,
    pub author: AuthorView,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl From<RecipeDetail> for RecipeView {
    fn from(value: RecipeDetail) -> Self {
        Self {
            id: value.recipe.id,
            author: value.author.into(),
            tags: value.tags,
            ingredients: value.ingredients.into_iter().map(Into::into).collect(),
            is_favorited: value.recipe.is_favorited,
            is_in_shopping_cart: value.recipe.is_in_shopping_cart,
            name: value.recipe.name,
            image: value.recipe.image,
            text: value.recipe.text,
            cooking_time: value.recipe.cooking_time,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecipeShortView {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<RecipeShort> for RecipeShortView {
    fn from(value: RecipeShort) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image: value.image,
            cooking_time: value.cooking_time,
        }
    }
}

impl From<AuthorRecipe> for RecipeShortView {
    fn from(value: AuthorRecipe) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image: value.image,
            cooking_time: value.cooking_time,
        }
    }
}

impl From<RecipeDetail> for RecipeShortView {
    fn from(value: RecipeDetail) -> Self {
        Self {
            id: value.recipe.id,
            name: value.recipe.name,
            image: value.recipe.image,
            cooking_time: value.recipe.cooking_time,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubscriptionView {
    pub email: String,
    pub id: Id,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortView>,
    pub recipes_count: i64,
}

impl SubscriptionView {
    pub fn new(row: SubscriptionRow, recipes: Vec<AuthorRecipe>) -> Self {
        Self {
            email: row.email,
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            // the list only ever contains followed authors
            is_subscribed: true,
            recipes: recipes.into_iter().map(Into::into).collect(),
            recipes_count: row.recipes_count,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecipeResponse {
    Full(RecipeView),
    Short(RecipeShortView),
}

/// Which endpoint a recipe is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Create,
    Update,
    Read,
    FavoriteView,
    CartView,
}

impl ViewKind {
    pub fn status(self) -> StatusCode {
        match self {
            ViewKind::Create | ViewKind::FavoriteView | ViewKind::CartView => StatusCode::CREATED,
            ViewKind::Update | ViewKind::Read => StatusCode::OK,
        }
    }

    pub fn render(self, recipe: RecipeDetail) -> RecipeResponse {
        match self {
            ViewKind::Create | ViewKind::Update | ViewKind::Read => {
                RecipeResponse::Full(recipe.into())
            }
            ViewKind::FavoriteView | ViewKind::CartView => RecipeResponse::Short(recipe.into()),
        }
    }

    pub fn reply<T: Serialize>(self, body: &T) -> WithStatus<Json> {
        reply::with_status(reply::json(body), self.status())
    }
}
