use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct FoodItem {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Calories cannot be negative"))]
    pub calories: f64,
}

/// A meal as submitted by the caller, before it is timestamped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMeal {
    #[validate(length(min = 1, message = "Meal name is required"))]
    pub name: String,

    #[serde(rename = "type")]
    pub meal_type: MealType,

    #[serde(default)]
    pub items: Vec<FoodItem>,

    #[validate(range(min = 0.0, message = "Total calories cannot be negative"))]
    pub total_calories: f64,
}

impl NewMeal {
    /// Builds a meal whose total is the sum of its item calories.
    pub fn from_items(name: impl Into<String>, meal_type: MealType, items: Vec<FoodItem>) -> Self {
        let total_calories = items.iter().map(|item| item.calories).sum();
        Self {
            name: name.into(),
            meal_type,
            items,
            total_calories,
        }
    }

    /// Validates the meal and every item in it.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    #[serde(flatten)]
    pub details: NewMeal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MealLog {
    #[serde(default)]
    pub meals: Vec<Meal>,
}

impl MealLog {
    pub fn append(&mut self, meal: NewMeal, timestamp: DateTime<Utc>) {
        self.meals.push(Meal {
            details: meal,
            timestamp,
        });
    }

    pub fn total_calories(&self) -> f64 {
        self.meals.iter().map(|m| m.details.total_calories).sum()
    }
}

/// POST /meals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMealRequest {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub meal: Option<NewMeal>,
}
