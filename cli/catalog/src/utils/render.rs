use std::fmt::{self, Display};

use catalog_client::Product;
use catalog_view::{CategoryFilter, ViewState, ViewStatus};
use itertools::Itertools;

const NO_DESCRIPTION: &str = "No description";

/// Format `price` as US dollars, e.g. `$1,234.50`.
pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let grouped = dollars
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .join(",");

    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn stock_status(stock_quantity: u32) -> String {
    if stock_quantity > 0 {
        format!("{stock_quantity} in stock")
    } else {
        "Out of stock".to_string()
    }
}

/// A single product with all of its details.
pub struct DisplayProduct<'a>(pub &'a Product);

impl Display for DisplayProduct<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let product = self.0;
        writeln!(f, "{} (#{})", product.name, product.id)?;
        writeln!(
            f,
            "  {}",
            product.description.as_deref().unwrap_or(NO_DESCRIPTION)
        )?;
        writeln!(f, "  price:    {}", format_price(product.price))?;
        writeln!(f, "  category: {}", product.category_label().unwrap_or("-"))?;
        writeln!(f, "  stock:    {}", stock_status(product.stock_quantity))?;
        write!(f, "  image:    {}", product.image_url.as_deref().unwrap_or("-"))
    }
}

/// Products as a table, one product per line.
pub struct DisplayProducts<'a>(pub &'a [Product]);

impl Display for DisplayProducts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .0
            .iter()
            .map(|product| {
                [
                    format!("#{}", product.id),
                    product.name.clone(),
                    format_price(product.price),
                    product.category_label().unwrap_or("-").to_string(),
                    stock_status(product.stock_quantity),
                ]
            })
            .collect::<Vec<_>>();

        let mut widths = [0; 5];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let lines = rows.iter().map(|row| {
            row.iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .join("  ")
                .trim_end()
                .to_string()
        });

        write!(f, "{}", lines.format("\n"))
    }
}

/// The products section of a catalog page for `state`.
pub struct DisplayView<'a>(pub &'a ViewState);

impl Display for DisplayView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        match state.status() {
            ViewStatus::Loading => write!(f, "Loading products..."),
            ViewStatus::Failed => {
                writeln!(f, "Error")?;
                write!(f, "{}", state.error.as_deref().unwrap_or_default())
            },
            ViewStatus::Loaded if state.products.is_empty() => {
                writeln!(f, "No products found")?;
                match &state.filter {
                    CategoryFilter::All => {
                        write!(f, "There are no products available at the moment.")
                    },
                    CategoryFilter::Category(label) => {
                        write!(f, "There are no products in category \"{label}\".")
                    },
                }
            },
            ViewStatus::Loaded => {
                let heading = match &state.filter {
                    CategoryFilter::All => "All Products".to_string(),
                    CategoryFilter::Category(label) => label.clone(),
                };
                writeln!(f, "{heading} ({})", state.products.len())?;
                writeln!(f)?;
                write!(f, "{}", DisplayProducts(&state.products))
            },
        }
    }
}
