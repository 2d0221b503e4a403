use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::category::{Category, NewCategory};
use crate::domain::errors::DomainError;
use crate::domain::ports::CategoryRepository;
use crate::schema::categories;

use super::models::{CategoryRow, NewCategoryRow};
use super::DieselStore;

/// `ILIKE` pattern matching `keyword` literally anywhere in the column.
fn contains_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl CategoryRepository for DieselStore {
    fn insert_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id: Uuid::new_v4(),
                name: category.name,
                description: category.description,
                parent_id: category.parent_id,
                active: category.active,
            })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_category(&self, id: Uuid) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn find_category_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .filter(categories::name.eq(name))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn list_active_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .filter(categories::active.eq(true))
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn find_root_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .filter(categories::parent_id.is_null())
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn find_subcategories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .filter(categories::parent_id.eq(parent_id))
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn search_categories(&self, keyword: &str) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let pattern = contains_pattern(keyword);
        let rows = categories::table
            .filter(
                categories::name
                    .ilike(&pattern)
                    .or(categories::description.ilike(&pattern)),
            )
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn save_category(&self, category: &Category) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(categories::table.find(category.id))
            .set((
                categories::name.eq(&category.name),
                categories::description.eq(category.description.as_deref()),
                categories::parent_id.eq(category.parent_id),
                categories::active.eq(category.active),
                categories::updated_at.eq(Utc::now()),
            ))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("Category", category.id))?;
        Ok(row.into())
    }

    fn delete_category(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        // children and products are detached via ON DELETE SET NULL
        let deleted = diesel::delete(categories::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_db::setup_db;

    fn new_category(name: &str, parent_id: Option<Uuid>) -> NewCategory {
        NewCategory {
            name: name.into(),
            description: None,
            parent_id,
            active: true,
        }
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn delete_detaches_children() {
        let (_container, store) = setup_db().await;
        let parent = store
            .insert_category(new_category("Kitchen", None))
            .expect("insert parent");
        let child = store
            .insert_category(new_category("Kettles", Some(parent.id)))
            .expect("insert child");

        assert_eq!(store.find_subcategories(parent.id).unwrap().len(), 1);
        assert!(store.delete_category(parent.id).expect("delete"));

        let child = store.find_category(child.id).unwrap().expect("child kept");
        assert!(child.is_root());
        assert_eq!(store.find_root_categories().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let (_container, store) = setup_db().await;
        store
            .insert_category(NewCategory {
                description: Some("Pots and pans".into()),
                ..new_category("Kitchen", None)
            })
            .expect("insert");
        store
            .insert_category(new_category("Garden", None))
            .expect("insert");

        let found = store.search_categories("PANS").expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Kitchen");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let (_container, store) = setup_db().await;
        store
            .insert_category(new_category("Kitchen", None))
            .expect("insert");
        assert!(matches!(
            store.insert_category(new_category("Kitchen", None)),
            Err(DomainError::Conflict(_))
        ));
    }
}
