//! Built-in recipes.

pub mod srproxy;
pub mod tensorflow;

use crate::core::errors::RecipeError;
use crate::core::recipe::Recipe;

pub use srproxy::SrProxy;
pub use tensorflow::Tensorflow;

/// Recipes known to this build of galley, looked up by package name.
pub struct RecipeRegistry {
    recipes: Vec<Box<dyn Recipe>>,
}

impl RecipeRegistry {
    /// Registry holding every built-in recipe.
    pub fn builtin() -> Self {
        RecipeRegistry {
            recipes: vec![Box::new(SrProxy), Box::new(Tensorflow)],
        }
    }

    /// Find a recipe by package name.
    pub fn get(&self, name: &str) -> Result<&dyn Recipe, RecipeError> {
        self.recipes
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
            .ok_or_else(|| RecipeError::UnknownRecipe {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Names of all recipes, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.recipes.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Recipe> {
        self.recipes.iter().map(|r| r.as_ref())
    }
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = RecipeRegistry::builtin();

        assert_eq!(registry.get("tensorflow2").unwrap().name(), "tensorflow2");
        assert_eq!(registry.get("py-srproxy").unwrap().name(), "py-srproxy");
        assert_eq!(registry.names(), vec!["py-srproxy", "tensorflow2"]);
    }

    #[test]
    fn test_unknown_recipe_lists_available() {
        let registry = RecipeRegistry::builtin();

        let err = registry.get("pytorch").err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("unknown recipe `pytorch`"));
        assert!(msg.contains("py-srproxy, tensorflow2"));
    }
}
