use uuid::Uuid;

use crate::domain::category::{Category, NewCategory};
use crate::domain::errors::DomainError;
use crate::domain::ports::CategoryRepository;

/// Category tree maintenance and lookups.
pub struct CategoryService<R> {
    categories: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(categories: R) -> Self {
        Self { categories }
    }

    pub fn create_category(&self, category: NewCategory) -> Result<Category, DomainError> {
        let category = normalize(category);
        category.validate()?;
        self.check_name_free(&category.name, None)?;
        if let Some(parent_id) = category.parent_id {
            self.get_category(parent_id)?;
        }

        let category = self.categories.insert_category(category)?;
        log::info!("Category {} created ({})", category.id, category.name);
        Ok(category)
    }

    /// Replaces every editable field. Moving a category under itself or one
    /// of its descendants is rejected.
    pub fn update_category(&self, id: Uuid, data: NewCategory) -> Result<Category, DomainError> {
        let data = normalize(data);
        data.validate()?;
        let mut category = self.get_category(id)?;
        self.check_name_free(&data.name, Some(id))?;
        if let Some(parent_id) = data.parent_id {
            self.check_no_cycle(id, parent_id)?;
        }

        category.name = data.name;
        category.description = data.description;
        category.parent_id = data.parent_id;
        category.active = data.active;
        let category = self.categories.save_category(&category)?;
        log::info!("Category {} updated", category.id);
        Ok(category)
    }

    /// Deleting a missing category is a no-op.
    pub fn delete_category(&self, id: Uuid) -> Result<(), DomainError> {
        if self.categories.delete_category(id)? {
            log::info!("Category {} deleted", id);
        }
        Ok(())
    }

    pub fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_category(id)?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub fn get_category_by_name(&self, name: &str) -> Result<Category, DomainError> {
        self.categories
            .find_category_by_name(name)?
            .ok_or_else(|| DomainError::not_found("Category", name))
    }

    pub fn name_exists(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.categories.find_category_by_name(name)?.is_some())
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_categories()
    }

    pub fn active_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_active_categories()
    }

    pub fn root_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.find_root_categories()
    }

    pub fn subcategories(&self, parent_id: Uuid) -> Result<Vec<Category>, DomainError> {
        self.categories.find_subcategories(parent_id)
    }

    pub fn search_categories(&self, keyword: &str) -> Result<Vec<Category>, DomainError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(DomainError::InvalidInput("search keyword is required".into()));
        }
        self.categories.search_categories(keyword)
    }

    fn check_name_free(&self, name: &str, owner: Option<Uuid>) -> Result<(), DomainError> {
        match self.categories.find_category_by_name(name)? {
            Some(existing) if Some(existing.id) != owner => Err(DomainError::Conflict(format!(
                "category '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    /// Walks up from `parent_id`; reaching `id` means the move would close a loop.
    fn check_no_cycle(&self, id: Uuid, parent_id: Uuid) -> Result<(), DomainError> {
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == id {
                return Err(DomainError::InvalidInput(format!(
                    "category {} cannot be placed under its own subtree",
                    id
                )));
            }
            cursor = self.get_category(current)?.parent_id;
        }
        Ok(())
    }
}

fn normalize(category: NewCategory) -> NewCategory {
    NewCategory {
        name: category.name.trim().to_string(),
        ..category
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStore;

    fn new_category(name: &str, parent_id: Option<Uuid>) -> NewCategory {
        NewCategory {
            name: name.into(),
            description: None,
            parent_id,
            active: true,
        }
    }

    fn service() -> CategoryService<InMemoryStore> {
        CategoryService::new(InMemoryStore::new())
    }

    #[test]
    fn tree_queries() {
        let service = service();
        let home = service.create_category(new_category("Home", None)).unwrap();
        let garden = service.create_category(new_category("Garden", None)).unwrap();
        service
            .create_category(new_category("Kitchen", Some(home.id)))
            .unwrap();
        service
            .create_category(new_category("Bath", Some(home.id)))
            .unwrap();

        let roots: Vec<String> = service
            .root_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(roots, vec!["Garden", "Home"]);
        let children: Vec<String> = service
            .subcategories(home.id)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(children, vec!["Bath", "Kitchen"]);
        assert!(service.subcategories(garden.id).unwrap().is_empty());
        assert_eq!(service.list_categories().unwrap().len(), 4);
    }

    #[test]
    fn duplicate_name_conflicts() {
        let service = service();
        service.create_category(new_category("Toys", None)).unwrap();
        let err = service
            .create_category(new_category(" Toys ", None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(service.name_exists("Toys").unwrap());
        assert!(!service.name_exists("Games").unwrap());
    }

    #[test]
    fn unknown_parent_is_not_found() {
        let err = service()
            .create_category(new_category("Orphan", Some(Uuid::new_v4())))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn update_replaces_fields_and_keeps_own_name() {
        let service = service();
        let books = service.create_category(new_category("Books", None)).unwrap();

        let updated = service
            .update_category(
                books.id,
                NewCategory {
                    description: Some("Paper and e-books".into()),
                    active: false,
                    ..new_category("Books", None)
                },
            )
            .unwrap();

        assert_eq!(updated.description.as_deref(), Some("Paper and e-books"));
        assert!(!updated.active);
        assert!(service.active_categories().unwrap().is_empty());
        assert_eq!(service.get_category_by_name("Books").unwrap().id, books.id);
    }

    #[test]
    fn update_into_own_subtree_is_rejected() {
        let service = service();
        let a = service.create_category(new_category("A", None)).unwrap();
        let b = service.create_category(new_category("B", Some(a.id))).unwrap();
        let c = service.create_category(new_category("C", Some(b.id))).unwrap();

        for parent in [a.id, c.id] {
            let err = service
                .update_category(a.id, new_category("A", Some(parent)))
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidInput(_)));
        }
        assert!(service.get_category(a.id).unwrap().is_root());
    }

    #[test]
    fn update_of_missing_category_is_not_found() {
        let err = service()
            .update_category(Uuid::new_v4(), new_category("Nope", None))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent_and_promotes_children() {
        let service = service();
        let parent = service.create_category(new_category("Sports", None)).unwrap();
        let child = service
            .create_category(new_category("Cycling", Some(parent.id)))
            .unwrap();

        service.delete_category(parent.id).unwrap();
        service.delete_category(parent.id).unwrap();

        assert!(matches!(
            service.get_category(parent.id),
            Err(DomainError::NotFound(_))
        ));
        assert!(service.get_category(child.id).unwrap().is_root());
    }

    #[test]
    fn search_needs_a_keyword() {
        let service = service();
        service
            .create_category(NewCategory {
                description: Some("Outdoor furniture".into()),
                ..new_category("Patio", None)
            })
            .unwrap();
        assert_eq!(service.search_categories("FURNITURE").unwrap().len(), 1);
        assert!(matches!(
            service.search_categories("  "),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
