use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{AccessToken, CategoryDraft, RepoError, TaxonomyRepo};
use crate::domain::entities::{CategoryRecord, TagRecord};

pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

#[derive(Debug, Error)]
pub enum AdminTaxonomyError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminTaxonomyService {
    repo: Arc<dyn TaxonomyRepo>,
}

impl AdminTaxonomyService {
    pub fn new(repo: Arc<dyn TaxonomyRepo>) -> Self {
        Self { repo }
    }

    pub async fn categories(&self) -> Result<Vec<CategoryRecord>, AdminTaxonomyError> {
        let mut categories = self.repo.list_categories().await?;
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }

    pub async fn tags(&self) -> Result<Vec<TagRecord>, AdminTaxonomyError> {
        let mut tags = self.repo.list_tags().await?;
        tags.sort_by_key(|tag| tag.name.to_lowercase());
        Ok(tags)
    }

    pub async fn create_category(
        &self,
        token: &AccessToken,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, AdminTaxonomyError> {
        let draft = normalize_category(draft)?;
        let created = self.repo.create_category(token, &draft).await?;
        info!(
            target = "quire::application::admin::taxonomy",
            category = %created.name,
            "category created"
        );
        Ok(created)
    }

    pub async fn update_category(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, AdminTaxonomyError> {
        let draft = normalize_category(draft)?;
        Ok(self.repo.update_category(token, id, &draft).await?)
    }

    pub async fn delete_category(
        &self,
        token: &AccessToken,
        id: Uuid,
    ) -> Result<(), AdminTaxonomyError> {
        self.repo.delete_category(token, id).await?;
        info!(
            target = "quire::application::admin::taxonomy",
            category_id = %id,
            "category deleted"
        );
        Ok(())
    }

    pub async fn create_tag(
        &self,
        token: &AccessToken,
        name: &str,
    ) -> Result<TagRecord, AdminTaxonomyError> {
        let name = require_tag_name(name)?;
        let created = self.repo.create_tag(token, name).await?;
        info!(
            target = "quire::application::admin::taxonomy",
            tag = %created.name,
            "tag created"
        );
        Ok(created)
    }

    pub async fn update_tag(
        &self,
        token: &AccessToken,
        id: Uuid,
        name: &str,
    ) -> Result<TagRecord, AdminTaxonomyError> {
        let name = require_tag_name(name)?;
        Ok(self.repo.update_tag(token, id, name).await?)
    }

    pub async fn delete_tag(&self, token: &AccessToken, id: Uuid) -> Result<(), AdminTaxonomyError> {
        self.repo.delete_tag(token, id).await?;
        info!(
            target = "quire::application::admin::taxonomy",
            tag_id = %id,
            "tag deleted"
        );
        Ok(())
    }
}

fn normalize_category(draft: CategoryDraft) -> Result<CategoryDraft, AdminTaxonomyError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(AdminTaxonomyError::ConstraintViolation(
            "Category name is required",
        ));
    }
    let color = draft.color.trim();
    let color = if color.is_empty() {
        DEFAULT_CATEGORY_COLOR.to_string()
    } else if is_hex_color(color) {
        color.to_ascii_lowercase()
    } else {
        return Err(AdminTaxonomyError::ConstraintViolation(
            "Color must look like #3b82f6",
        ));
    };
    Ok(CategoryDraft {
        name,
        description: draft.description.trim().to_string(),
        color,
    })
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()))
}

fn require_tag_name(name: &str) -> Result<&str, AdminTaxonomyError> {
    let name = name.trim();
    if name.is_empty() {
        Err(AdminTaxonomyError::ConstraintViolation("Tag name is required"))
    } else {
        Ok(name)
    }
}
