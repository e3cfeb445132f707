//! Catalog operations: product CRUD plus image handling.

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use common::types::Message;
use models::product;
use service_client::FormBody;

use crate::errors::ServiceError;
use crate::storage::ImageStorage;
pub use crate::storage::ImageUpload;
use crate::views::ProductView;

const REQUIRED_FIELDS: &str = "name and price are required";

/// Input of `create_product`, normally parsed from a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: Option<ImageUpload>,
}

impl NewProduct {
    /// Reads `name`, `description`, `price` and an optional `image` file.
    /// A file part with an empty filename counts as no image.
    pub fn from_form(form: &FormBody) -> Result<Self, ServiceError> {
        let name = form.get("name").map(str::trim).filter(|n| !n.is_empty());
        let price = form.get("price").and_then(|p| p.trim().parse::<f64>().ok());
        let (Some(name), Some(price)) = (name, price) else {
            return Err(ServiceError::Validation(REQUIRED_FIELDS.into()));
        };
        let image = form
            .get_file("image")
            .filter(|f| !f.filename.is_empty())
            .map(|f| ImageUpload {
                filename: f.filename.clone(),
                content_type: f.content_type.clone(),
                bytes: f.bytes.clone(),
            });
        Ok(Self {
            name: name.to_string(),
            description: form.get("description").unwrap_or_default().to_string(),
            price,
            image,
        })
    }
}

/// Partial update body; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

/// Removes an upload whose product row was never written. Failures are only
/// logged so the caller still sees the original error.
async fn discard_upload(storage: &dyn ImageStorage, image_path: &str) {
    if let Err(e) = storage.delete(image_path).await {
        warn!(error = %e, %image_path, "failed to remove orphan upload");
    }
}

#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
    storage: Arc<dyn ImageStorage>,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn ImageStorage>) -> Self {
        Self { db, storage }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn view(&self, m: product::Model) -> ProductView {
        ProductView::from_model(m, self.storage.as_ref())
    }

    async fn find(&self, id: i32) -> Result<product::Model, ServiceError> {
        Ok(product::get(&self.db, id).await?)
    }

    pub async fn list_products(&self) -> Result<Vec<ProductView>, ServiceError> {
        let rows = product::list_newest_first(&self.db).await?;
        Ok(rows.into_iter().map(|m| self.view(m)).collect())
    }

    pub async fn get_product(&self, id: i32) -> Result<ProductView, ServiceError> {
        let m = self.find(id).await?;
        Ok(self.view(m))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<ProductView, ServiceError> {
        product::validate_name(&input.name)?;
        product::validate_price(input.price)?;
        let image_path = match &input.image {
            Some(img) => self.storage.save(img).await?,
            None => String::new(),
        };
        let created = product::create(&self.db, &input.name, &input.description, input.price, &image_path).await;
        let created = match created {
            Ok(m) => m,
            Err(e) => {
                discard_upload(self.storage.as_ref(), &image_path).await;
                return Err(e.into());
            }
        };
        info!(id = created.id, "product created");
        Ok(self.view(created))
    }

    pub async fn update_product(&self, id: i32, patch: ProductPatch) -> Result<ProductView, ServiceError> {
        let found = self.find(id).await?;
        let mut am: product::ActiveModel = found.into();
        if let Some(name) = patch.name {
            product::validate_name(&name)?;
            am.name = Set(name);
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
        }
        if let Some(price) = patch.price {
            product::validate_price(price)?;
            am.price = Set(price);
        }
        let updated = am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(self.view(updated))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> Result<Message, ServiceError> {
        let found = self.find(id).await?;
        if !found.image_path.is_empty() {
            self.storage.delete(&found.image_path).await?;
        }
        product::Entity::delete_by_id(found.id)
            .exec(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        info!(id, "product deleted");
        Ok(Message::new("Product deleted"))
    }
}
