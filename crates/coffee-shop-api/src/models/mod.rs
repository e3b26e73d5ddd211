//! Domain models for the coffee shop API

pub mod drink;

pub use drink::{
    Drink, DrinkDraft, DrinkPatch, DrinkShort, Ingredient, IngredientShort, NewDrink, RecipeInput,
};
