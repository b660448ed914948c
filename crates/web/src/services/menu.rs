//! Back-office menu form handling.

use serde::Deserialize;

use cafe_core::{PriceError, parse_price};

use crate::models::{MenuItem, MenuItemInput};
use crate::services::validation::{self, FieldErrors};

/// Menu item add/edit form. Checkboxes are absent when unticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_vegetarian: Option<String>,
    pub is_vegan: Option<String>,
    pub is_spicy: Option<String>,
    pub is_available: Option<String>,
}

impl MenuItemForm {
    /// Prefill the edit form from a stored item.
    #[must_use]
    pub fn from_item(item: &MenuItem) -> Self {
        let tick = |on: bool| on.then(|| "on".to_string());
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_string(),
            image_url: item.image_url.clone(),
            category: item.category.clone(),
            is_vegetarian: tick(item.is_vegetarian),
            is_vegan: tick(item.is_vegan),
            is_spicy: tick(item.is_spicy),
            is_available: tick(item.is_available),
        }
    }

    /// Blank add form; new items default to available.
    #[must_use]
    pub fn new_item() -> Self {
        Self {
            is_available: Some("on".to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn checked(&self, field: &str) -> bool {
        let value = match field {
            "is_vegetarian" => &self.is_vegetarian,
            "is_vegan" => &self.is_vegan,
            "is_spicy" => &self.is_spicy,
            "is_available" => &self.is_available,
            _ => return false,
        };
        validation::checkbox(value.as_deref())
    }

    /// Validate into repository input.
    ///
    /// # Errors
    ///
    /// Returns every failing field with a display message.
    pub fn validate(&self) -> Result<MenuItemInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required.");
        }
        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required.");
        }
        let price = parse_price(&self.price)
            .map_err(|e| match e {
                PriceError::TooLarge => errors.add("price", "Price is too large."),
                _ => errors.add("price", "Price must be a non-negative number."),
            })
            .unwrap_or_default();

        let image_url = validation::optional_text(self.image_url.as_deref());
        if let Some(url) = &image_url
            && !(url.starts_with('/') || url.starts_with("https://") || url.starts_with("http://"))
        {
            errors.add("image_url", "Image URL must be a web address or a site path.");
        }

        errors.into_result(MenuItemInput {
            name: name.to_owned(),
            description: description.to_owned(),
            price,
            image_url,
            category: validation::optional_text(self.category.as_deref()),
            is_vegetarian: self.checked("is_vegetarian"),
            is_vegan: self.checked("is_vegan"),
            is_spicy: self.checked("is_spicy"),
            is_available: self.checked("is_available"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn form() -> MenuItemForm {
        MenuItemForm {
            name: " Filter Coffee ".to_string(),
            description: "South Indian style".to_string(),
            price: "45.50".to_string(),
            category: Some("Beverages".to_string()),
            is_available: Some("on".to_string()),
            ..MenuItemForm::default()
        }
    }

    #[test]
    fn test_valid_form() {
        let input = form().validate().unwrap();
        assert_eq!(input.name, "Filter Coffee");
        assert_eq!(input.price, Decimal::new(4550, 2));
        assert!(input.is_available);
        assert!(!input.is_vegan);
        assert_eq!(input.image_url, None);
    }

    #[test]
    fn test_unticked_available_means_hidden() {
        let mut f = form();
        f.is_available = None;
        assert!(!f.validate().unwrap().is_available);
    }

    #[test]
    fn test_required_fields_and_price() {
        let f = MenuItemForm {
            price: "-3".to_string(),
            image_url: Some("javascript:alert(1)".to_string()),
            ..MenuItemForm::default()
        };
        let errors = f.validate().unwrap_err();
        for field in ["name", "description", "price", "image_url"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_oversized_price_is_a_field_error() {
        for price in ["1000000000", "79228162514264337593543950335"] {
            let f = MenuItemForm {
                price: price.to_string(),
                ..form()
            };
            let errors = f.validate().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.get("price"), Some("Price is too large."));
        }
    }

    #[test]
    fn test_new_item_defaults_available() {
        assert!(MenuItemForm::new_item().checked("is_available"));
        assert!(!MenuItemForm::new_item().checked("is_spicy"));
    }
}
