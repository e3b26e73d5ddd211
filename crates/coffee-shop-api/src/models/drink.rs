//! Drink resource and its short/long projections

use serde::{Deserialize, Serialize};

/// One entry of a drink's recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub color: String,
    pub name: String,
    pub parts: u32,
}

/// A drink in long form: every recipe field is visible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Ingredient as shown on the public menu, without its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

/// A drink in short form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

impl Drink {
    /// Public projection that hides ingredient names
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| IngredientShort {
                    color: i.color.clone(),
                    parts: i.parts,
                })
                .collect(),
        }
    }
}

/// Recipe as accepted in request bodies: a list or a single ingredient
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(list) => list,
            RecipeInput::One(single) => vec![single],
        }
    }
}

/// Body of `POST /drinks`
///
/// Either `recipe` or the flat single-ingredient fields may be supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDrink {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub parts: Option<u32>,
}

/// A validated drink ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkDraft {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl NewDrink {
    /// Resolve the body into a title and a non-empty recipe
    pub fn into_draft(self) -> Result<DrinkDraft, String> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "title is required".to_string())?;

        let recipe: Vec<Ingredient> = match self.recipe {
            Some(recipe) => recipe.into(),
            None => match (self.color, self.name, self.parts) {
                (Some(color), Some(name), Some(parts)) => vec![Ingredient { color, name, parts }],
                (None, None, None) => Vec::new(),
                _ => return Err("color, name and parts must be supplied together".to_string()),
            },
        };

        validate_recipe(&recipe)?;
        Ok(DrinkDraft { title, recipe })
    }
}

/// Body of `PATCH /drinks/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrinkPatch {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub parts: Option<u32>,
}

impl DrinkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.recipe.is_none()
            && self.color.is_none()
            && self.name.is_none()
            && self.parts.is_none()
    }

    /// Apply the patch to a copy of `drink`
    ///
    /// `recipe` replaces the whole recipe. The flat fields edit the first
    /// ingredient, which is what single-ingredient clients send.
    pub fn apply(&self, drink: &Drink) -> Result<Drink, String> {
        let mut updated = drink.clone();

        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err("title must not be empty".to_string());
            }
            updated.title = title.to_string();
        }

        if let Some(recipe) = &self.recipe {
            updated.recipe = recipe.clone().into();
        }

        if self.color.is_some() || self.name.is_some() || self.parts.is_some() {
            let first = updated
                .recipe
                .first_mut()
                .ok_or_else(|| "drink has no ingredient to update".to_string())?;
            if let Some(color) = &self.color {
                first.color = color.clone();
            }
            if let Some(name) = &self.name {
                first.name = name.clone();
            }
            if let Some(parts) = self.parts {
                first.parts = parts;
            }
        }

        validate_recipe(&updated.recipe)?;
        Ok(updated)
    }
}

fn validate_recipe(recipe: &[Ingredient]) -> Result<(), String> {
    if recipe.is_empty() {
        return Err("recipe must contain at least one ingredient".to_string());
    }
    if recipe.iter().any(|i| i.name.trim().is_empty()) {
        return Err("ingredient name must not be empty".to_string());
    }
    Ok(())
}
