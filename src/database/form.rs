use std::collections::HashSet;

use serde::Deserialize;

use super::error::ApiError;

/// Name and unit limits mirror the column widths.
const MAX_NAME_LENGTH: usize = 200;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RecipeForm {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_ingredients(&self.ingredients)?;
        validate_tags(&self.tags)?;
        validate_name(&self.name)?;
        validate_text(&self.text)?;
        validate_cooking_time(self.cooking_time)?;
        validate_image(&self.image)
    }
}

/// Partial update. A supplied ingredient or tag list replaces the stored one.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RecipePatch {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl RecipePatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(ingredients) = &self.ingredients {
            validate_ingredients(ingredients)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(text) = &self.text {
            validate_text(text)?;
        }
        if let Some(cooking_time) = self.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        if let Some(image) = &self.image {
            validate_image(image)?;
        }
        Ok(())
    }
}

pub fn validate_ingredients(ingredients: &[IngredientAmount]) -> Result<(), ApiError> {
    if ingredients.is_empty() {
        return Err(ApiError::validation("ingredients: No ingredients given"));
    }

    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if !seen.insert(ingredient.id) {
            return Err(ApiError::Validation(format!(
                "ingredients: Ingredient {} is listed more than once",
                ingredient.id
            )));
        }
        if ingredient.amount < 1 {
            return Err(ApiError::validation(
                "ingredients: Amount must be at least 1",
            ));
        }
    }
    Ok(())
}

pub fn validate_tags(tags: &[i32]) -> Result<(), ApiError> {
    if tags.is_empty() {
        return Err(ApiError::validation("tags: No tags given"));
    }

    let mut seen = HashSet::new();
    match tags.iter().find(|tag| !seen.insert(**tag)) {
        Some(tag) => Err(ApiError::Validation(format!(
            "tags: Tag {tag} is listed more than once"
        ))),
        None => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name: Name can't be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::validation("name: Name is too long"));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::validation("text: Description can't be empty"));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i32) -> Result<(), ApiError> {
    if cooking_time < 1 {
        return Err(ApiError::validation(
            "cooking_time: Cooking time must be at least 1 minute",
        ));
    }
    Ok(())
}

fn validate_image(image: &str) -> Result<(), ApiError> {
    super::image::decode_data_uri(image).map(|_| ())
}
