//! Products and their images.

use chrono::{DateTime, Utc};
use shopkeep_entity::{define_form, Page, Slot, StoreError};
use shopkeep_files::{file_token, FileError, FileReader, FileToken};
use tracing::{debug, info, instrument};

use crate::catalog::{ProductItem, ProductItemForm};
use crate::error::Result;
use crate::ids::ProductId;
use crate::money::Money;
use crate::stores::Stores;

define_form! {
    /// Stored attributes of a product.
    pub struct ProductForm: "product" {
        id: ProductId,
        parent: (),
        field: ProductField,
        name: String => Name,
        /// Nullable.
        description: String => Description,
        /// File token of the image. Nullable.
        image: String => Image,
        created_at: DateTime<Utc> => CreatedAt,
    }
    links {}
}

/// Token under which every product image lives.
fn images_root() -> std::result::Result<FileToken, FileError> {
    file_token!("products")
}

fn image_token(id: ProductId) -> std::result::Result<FileToken, FileError> {
    file_token!("products", id, "image")
}

define_wrapper!(
    /// A catalog product. Purchasable variants are its items.
    Product(ProductForm, ProductId) via products
);

impl Product {
    pub async fn name(&self) -> Result<String> {
        Ok(self.entity.require(ProductField::Name, |f| &f.name).await?)
    }

    pub async fn set_name(&self, name: impl Into<String>) -> Result<()> {
        let patch = ProductForm {
            name: Slot::Value(name.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn description(&self) -> Result<Option<String>> {
        Ok(self
            .entity
            .get(ProductField::Description, |f| &f.description)
            .await?)
    }

    pub async fn set_description(&self, description: impl Into<String>) -> Result<()> {
        let patch = ProductForm {
            description: Slot::Value(description.into()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn clear_description(&self) -> Result<()> {
        let patch = ProductForm {
            description: Slot::Null,
            ..Default::default()
        };
        self.entity.set(patch).await?;
        Ok(())
    }

    pub async fn created_at(&self) -> Result<DateTime<Utc>> {
        Ok(self
            .entity
            .require(ProductField::CreatedAt, |f| &f.created_at)
            .await?)
    }

    /// Token of the stored image, if there is one.
    pub async fn image(&self) -> Result<Option<FileToken>> {
        match self.entity.get(ProductField::Image, |f| &f.image).await? {
            Some(raw) => Ok(Some(FileToken::parse(raw)?)),
            None => Ok(None),
        }
    }

    /// Store `bytes` as the product image, replacing any previous one.
    #[instrument(skip(self, bytes), fields(product = %self.id(), len = bytes.len()))]
    pub async fn store_image(&self, bytes: &[u8]) -> Result<FileToken> {
        let token = image_token(self.id())?;
        self.stores.files.write(&token, bytes).await?;
        let patch = ProductForm {
            image: Slot::Value(token.to_string()),
            ..Default::default()
        };
        self.entity.set(patch).await?;
        debug!(%token, "stored product image");
        Ok(token)
    }

    /// Stream the image. A product without one is a file `NotFound`.
    pub async fn open_image(&self) -> Result<FileReader> {
        let token = self.image().await?.ok_or_else(|| {
            FileError::NotFound(format!("product {} has no image", self.id()))
        })?;
        Ok(self.stores.files.open(&token).await?)
    }

    /// Null the column, then delete the image file.
    #[instrument(skip(self), fields(product = %self.id()))]
    pub async fn remove_image(&self) -> Result<()> {
        let token = self.image().await?;
        let patch = ProductForm {
            image: Slot::Null,
            ..Default::default()
        };
        self.entity.set(patch).await?;
        if let Some(token) = token {
            match self.stores.files.delete(&token).await {
                Ok(()) | Err(FileError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    // Items

    pub async fn items(&self, page: Page) -> Result<Vec<ProductItem>> {
        let entities = self.stores.product_items().list(self.id(), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| ProductItem::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn item_count(&self) -> Result<u64> {
        Ok(self.stores.product_items().count(self.id()).await?)
    }

    /// Add a purchasable item. A taken SKU is `Duplicate`.
    #[instrument(skip(self, sku), fields(product = %self.id()))]
    pub async fn new_item(&self, sku: impl Into<String>, price: Money, stock: i64) -> Result<ProductItem> {
        if stock < 0 {
            return Err(StoreError::Validation(format!("stock must not be negative (got {})", stock)).into());
        }
        let form = ProductItemForm {
            product: Slot::link(self.id()),
            sku: Slot::Value(sku.into()),
            price: Slot::Value(price),
            stock: Slot::Value(stock),
            ..Default::default()
        };
        let entity = self.stores.product_items().insert(form).await?;
        Ok(ProductItem::from_entity(entity, self.stores.clone()))
    }
}

/// Creates, finds and lists products.
#[derive(Debug, Clone)]
pub struct ProductManager {
    stores: Stores,
}

impl ProductManager {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub(crate) async fn init(&self) -> Result<()> {
        self.stores.products().init().await?;
        self.stores.product_items().init().await?;
        Ok(())
    }

    #[instrument(skip(self, name, description))]
    pub async fn create(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Product> {
        let form = ProductForm {
            name: Slot::Value(name.into()),
            description: Slot::from_option(description),
            image: Slot::Null,
            created_at: Slot::Value(Utc::now()),
            ..Default::default()
        };
        let entity = self.stores.products().insert(form).await?;
        info!(product = %entity.id(), "product created");
        Ok(Product::from_entity(entity, self.stores.clone()))
    }

    /// A wrapper for `id`. Performs no I/O.
    pub fn find(&self, id: ProductId) -> Product {
        Product::lazy(id, &self.stores)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Product>> {
        let entities = self.stores.products().list((), page).await?;
        Ok(entities
            .into_iter()
            .map(|entity| Product::from_entity(entity, self.stores.clone()))
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.stores.products().count(()).await?)
    }

    /// Remove every product, its items, and every product image.
    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<()> {
        self.stores.product_items().remove_all().await?;
        self.stores.products().remove_all().await?;
        let removed = self.stores.files.delete_all(&images_root()?).await?;
        info!(images = removed, "removed product images");
        Ok(())
    }
}
