use anyhow::Result;
use bpaf::Bpaf;
use catalog_client::Client;
use catalog_view::form::{submit, ProductForm};
use tracing::instrument;

use crate::utils::message;

// Add a product to the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct Add {
    /// Name of the product
    #[bpaf(long, argument("name"))]
    pub name: String,

    /// Price in US dollars
    #[bpaf(long, argument("price"))]
    pub price: String,

    /// Category of the product
    #[bpaf(long, argument("category"))]
    pub category: String,

    /// Free text description
    #[bpaf(long, argument("text"))]
    pub description: Option<String>,

    /// URL of a product image
    #[bpaf(long("image-url"), argument("url"))]
    pub image_url: Option<String>,

    /// Number of items in stock, defaults to 0
    #[bpaf(long, argument("quantity"))]
    pub stock: Option<String>,
}

impl Add {
    fn form(self) -> ProductForm {
        ProductForm {
            name: self.name,
            description: self.description.unwrap_or_default(),
            price: self.price,
            category: self.category,
            image_url: self.image_url.unwrap_or_default(),
            stock_quantity: self.stock.unwrap_or_default(),
        }
    }

    #[instrument(name = "add", fields(name = %self.name), skip_all)]
    pub async fn handle(self, client: Client) -> Result<()> {
        let product = submit(&client, &self.form()).await?;
        message::created(format!(
            "Added '{}' to the catalog as product #{}",
            product.name, product.id
        ));
        Ok(())
    }
}
