//! Building a stock upload from command-line input.

use std::path::{Path, PathBuf};

use grayshop_core::Price;
use grayshop_storefront::api::{NewStock, Picture};
use rust_decimal::Decimal;

use super::CliError;

/// Assemble a [`NewStock`], reading the picture file if one was given.
///
/// # Errors
///
/// Returns `CliError::InvalidPrice` for prices with sub-fen precision and
/// `CliError::Io` if the picture cannot be read.
pub async fn new_stock(
    name: String,
    price: Decimal,
    inventory: u32,
    category: String,
    info: String,
    picture: Option<PathBuf>,
) -> Result<NewStock, CliError> {
    let price = Price::from_major(price).ok_or(CliError::InvalidPrice(price))?;

    let picture = match picture {
        Some(path) => Some(load_picture(&path).await?),
        None => None,
    };

    Ok(NewStock {
        name,
        price,
        category,
        info,
        inventory,
        picture,
    })
}

async fn load_picture(path: &Path) -> Result<Picture, CliError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map_or_else(|| "picture".to_string(), |n| n.to_string_lossy().into_owned());

    Ok(Picture {
        mime: mime_for(path).map(str::to_owned),
        file_name,
        bytes,
    })
}

/// MIME type for common image extensions.
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
