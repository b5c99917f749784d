use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AlertKind, BrandStockSnapshot};

/// Human-readable alert ready for a notification sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

/// Render the subject and plain-text body for a transition.
///
/// `at` is passed in (not read from the clock) so rendering stays pure.
pub fn render_alert(kind: AlertKind, snapshot: &BrandStockSnapshot, at: DateTime<Utc>) -> Alert {
    let brand = &snapshot.brand;
    let checked = at.format("%Y-%m-%d %H:%M:%S UTC");

    match kind {
        AlertKind::Depleted => Alert {
            subject: format!("[stockwatch] {brand}: all products out of stock"),
            body: format!(
                "Every product of brand \"{brand}\" is now out of stock.\n\
                 \n\
                 Products checked: {total}\n\
                 Out of stock:     {out}\n\
                 Checked at:       {checked}\n\
                 \n\
                 Consider hiding the brand from the storefront until it is restocked.\n",
                total = snapshot.total_products,
                out = snapshot.out_of_stock_products,
            ),
        },
        AlertKind::Restocked => Alert {
            subject: format!("[stockwatch] {brand}: back in stock"),
            body: format!(
                "Brand \"{brand}\" has stock again.\n\
                 \n\
                 Products checked: {total}\n\
                 In stock:         {inn}\n\
                 Out of stock:     {out}\n\
                 Checked at:       {checked}\n\
                 \n\
                 The brand can be shown on the storefront again.\n",
                total = snapshot.total_products,
                inn = snapshot.in_stock_products,
                out = snapshot.out_of_stock_products,
            ),
        },
    }
}
