//! Seed the menu with a starter set of dishes.
//!
//! Does nothing when the menu already has items, so it is safe to re-run.

use rust_decimal::Decimal;

use cafe_web::db::MenuItemRepository;
use cafe_web::models::MenuItemInput;

use super::{CommandError, connect};

/// (name, description, price in rupees, category, vegetarian, vegan, spicy)
type Dish = (&'static str, &'static str, i64, &'static str, bool, bool, bool);

const STARTER_MENU: &[Dish] = &[
    ("Masala Chai", "Assam tea brewed with ginger, cardamom and milk.", 40, "Beverages", true, false, false),
    ("Filter Coffee", "South Indian decoction coffee with frothed milk.", 50, "Beverages", true, false, false),
    ("Fresh Lime Soda", "Sweet or salted, with a pinch of roasted cumin.", 60, "Beverages", true, true, false),
    ("Vada Pav", "Spiced potato fritter in a soft bun with garlic chutney.", 45, "Snacks", true, true, true),
    ("Paneer Roll", "Tandoori paneer, onions and mint chutney in a paratha.", 80, "Snacks", true, false, true),
    ("Samosa", "Two pastries filled with potato and peas, tamarind dip.", 40, "Snacks", true, true, false),
    ("Masala Dosa", "Crisp rice crepe with potato masala, sambar and chutney.", 90, "Mains", true, true, false),
    ("Chicken Biryani", "Dum-cooked basmati with chicken, raita on the side.", 220, "Mains", false, false, true),
    ("Rajma Chawal", "Kidney bean curry with steamed rice.", 150, "Mains", true, true, false),
    ("Gulab Jamun", "Two milk dumplings in rose syrup.", 60, "Desserts", true, false, false),
];

/// Insert the starter menu if the menu is empty.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn menu() -> Result<usize, CommandError> {
    let pool = connect().await?;
    let repo = MenuItemRepository::new(&pool);

    let existing = repo.count().await?;
    if existing > 0 {
        tracing::info!(existing, "Menu already has items, skipping seed");
        return Ok(0);
    }

    for &(name, description, rupees, category, is_vegetarian, is_vegan, is_spicy) in STARTER_MENU {
        let item = repo
            .create(&MenuItemInput {
                name: name.to_owned(),
                description: description.to_owned(),
                price: Decimal::new(rupees, 0),
                image_url: None,
                category: Some(category.to_owned()),
                is_vegetarian,
                is_vegan,
                is_spicy,
                is_available: true,
            })
            .await?;
        tracing::debug!(menu_item_id = %item.id, name, "Seeded menu item");
    }

    tracing::info!(count = STARTER_MENU.len(), "Menu seeded");
    Ok(STARTER_MENU.len())
}
