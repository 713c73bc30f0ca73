use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, items};

use super::{Engine, normalize_required_text, with_tx};

/// Catalog installed by [`Engine::seed_catalog`]: categories with their
/// `(item, unit)` pairs.
const DEFAULT_CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Chicken",
        &[
            ("Whole Chicken", "kg"),
            ("Chicken Breast", "kg"),
            ("Chicken Thigh", "kg"),
            ("Chicken Wings", "kg"),
        ],
    ),
    (
        "Beef",
        &[("Beef Mince", "kg"), ("Beef Cubes", "kg"), ("Beef Ribs", "kg")],
    ),
    (
        "Fish & Seafood",
        &[
            ("Hamour", "kg"),
            ("Shrimp", "kg"),
            ("Salmon", "kg"),
            ("Tuna", "kg"),
        ],
    ),
    (
        "Rice & Grains",
        &[
            ("Basmati Rice", "kg"),
            ("Short Grain Rice", "kg"),
            ("Flour", "kg"),
        ],
    ),
    (
        "Spices",
        &[
            ("Cumin", "kg"),
            ("Turmeric", "kg"),
            ("Black Pepper", "kg"),
            ("Cardamom", "kg"),
            ("Cinnamon", "kg"),
            ("Mixed Majboos Spices", "kg"),
        ],
    ),
    (
        "Vegetables",
        &[
            ("Onion", "kg"),
            ("Tomato", "kg"),
            ("Potato", "kg"),
            ("Garlic", "kg"),
            ("Lemon", "kg"),
        ],
    ),
    (
        "Oils & Sauces",
        &[
            ("Cooking Oil", "liter"),
            ("Ghee", "kg"),
            ("Tomato Paste", "pack"),
            ("Soy Sauce", "liter"),
        ],
    ),
    (
        "Dairy",
        &[("Milk", "liter"), ("Yogurt", "pack"), ("Cream", "pack")],
    ),
    (
        "Packaging",
        &[
            ("Food Containers", "pack"),
            ("Bags", "pack"),
            ("Tissues", "pack"),
            ("Gloves", "pack"),
        ],
    ),
    (
        "Cleaning",
        &[
            ("Dish Soap", "liter"),
            ("Sanitizer", "liter"),
            ("Trash Bags", "pack"),
        ],
    ),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub unit: String,
}

impl From<items::Model> for Item {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            unit: model.unit,
        }
    }
}

/// Rows inserted by [`Engine::seed_catalog`]; existing rows are not counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub items_created: usize,
}

impl Engine {
    /// All categories ordered by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let categories = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();
        Ok(categories)
    }

    /// Items of one category ordered by name.
    ///
    /// An unknown category yields an empty list; a missing id is rejected.
    pub async fn list_items(&self, category_id: Option<&str>) -> ResultEngine<Vec<Item>> {
        let category_id =
            normalize_required_text(category_id.unwrap_or_default(), "categoryId")?;

        let items = items::Entity::find()
            .filter(items::Column::CategoryId.eq(category_id))
            .order_by_asc(items::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Item::from)
            .collect();
        Ok(items)
    }

    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_text(name, "category name")?;
        let model = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            name: ActiveValue::Set(name),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    /// Add an item to an existing category. The `(category, name)` pair must
    /// be unused.
    pub async fn create_item(
        &self,
        category_id: &str,
        name: &str,
        unit: &str,
    ) -> ResultEngine<Item> {
        let category_id = normalize_required_text(category_id, "categoryId")?;
        let name = normalize_required_text(name, "item name")?;
        let unit = normalize_required_text(unit, "unit")?;
        let model = items::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            category_id: ActiveValue::Set(category_id),
            name: ActiveValue::Set(name),
            unit: ActiveValue::Set(unit),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    /// Install the default restaurant catalog, skipping what already exists.
    ///
    /// Runs in one transaction: either the whole missing part is added or
    /// nothing is.
    pub async fn seed_catalog(&self) -> ResultEngine<SeedReport> {
        with_tx!(self, |db_tx| {
            let mut report = SeedReport::default();
            for (category_name, entries) in DEFAULT_CATALOG {
                let (category_id, created) = ensure_category(&db_tx, category_name).await?;
                if created {
                    report.categories_created += 1;
                }
                for (item_name, unit) in *entries {
                    if ensure_item(&db_tx, &category_id, item_name, unit).await? {
                        report.items_created += 1;
                    }
                }
            }
            tracing::info!(
                "catalog seeded: {} categories, {} items added",
                report.categories_created,
                report.items_created
            );
            Ok::<_, EngineError>(report)
        })
    }
}

async fn ensure_category(
    db_tx: &DatabaseTransaction,
    name: &str,
) -> ResultEngine<(String, bool)> {
    if let Some(existing) = categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .one(db_tx)
        .await?
    {
        return Ok((existing.id, false));
    }

    let id = Uuid::new_v4().to_string();
    categories::ActiveModel {
        id: ActiveValue::Set(id.clone()),
        name: ActiveValue::Set(name.to_string()),
    }
    .insert(db_tx)
    .await?;
    Ok((id, true))
}

async fn ensure_item(
    db_tx: &DatabaseTransaction,
    category_id: &str,
    name: &str,
    unit: &str,
) -> ResultEngine<bool> {
    let exists = items::Entity::find()
        .filter(items::Column::CategoryId.eq(category_id))
        .filter(items::Column::Name.eq(name))
        .one(db_tx)
        .await?
        .is_some();
    if exists {
        return Ok(false);
    }

    items::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        category_id: ActiveValue::Set(category_id.to_string()),
        name: ActiveValue::Set(name.to_string()),
        unit: ActiveValue::Set(unit.to_string()),
    }
    .insert(db_tx)
    .await?;
    Ok(true)
}
