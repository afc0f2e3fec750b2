use serde::{Deserialize, Serialize};

/// One catalog row. Column names follow the retail export the catalog is
/// built from (`StockCode`, `Description`, `Country`, `UnitPrice`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "StockCode")]
    pub stock_code: String,

    #[serde(rename = "Description", default)]
    pub description: String,

    #[serde(rename = "Country", default = "default_country")]
    pub country: String,

    #[serde(rename = "UnitPrice", default)]
    pub unit_price: f64,
}

fn default_country() -> String {
    "Unknown".to_string()
}

impl Product {
    /// Classifier label spaces use lowercase underscores while catalog
    /// descriptions use spaces ("Lunch Bag Pink Polkadot" →
    /// "lunch_bag_pink_polkadot"). This is the join key between the two.
    pub fn class_label(&self) -> String {
        normalize_class_label(&self.description)
    }
}

/// Normalize free text into the classifier's label format.
pub fn normalize_class_label(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_label_matches_classifier_format() {
        let p = Product {
            stock_code: "22384".into(),
            description: "Lunch Bag Pink Polkadot".into(),
            country: "United Kingdom".into(),
            unit_price: 1.65,
        };
        assert_eq!(p.class_label(), "lunch_bag_pink_polkadot");
    }

    #[test]
    fn normalize_trims_before_joining() {
        assert_eq!(normalize_class_label("  Red Alarm Clock "), "red_alarm_clock");
    }

    #[test]
    fn normalize_is_idempotent_on_labels() {
        let label = normalize_class_label("Jumbo Bag Red Retrospot");
        assert_eq!(normalize_class_label(&label), label);
    }
}
