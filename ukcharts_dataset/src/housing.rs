// Average house prices by region and property type.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PropertyPrice {
    #[serde(rename = "Region_Name")]
    pub region_name: String,
    #[serde(rename = "propertyType")]
    pub property_type: PropertyType,
    #[serde(rename = "averagePrice")]
    pub average_price: f64,
}

/// Property category as written in the `propertyType` column. Unknown
/// categories are kept rather than rejected.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Detached,
    SemiDetached,
    Terraced,
    Flat,
    Other(String),
}

impl PropertyType {
    /// The four known categories, in chart order.
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Detached,
        PropertyType::SemiDetached,
        PropertyType::Terraced,
        PropertyType::Flat,
    ];

    /// Human readable label for axis ticks.
    pub fn label(&self) -> &str {
        match self {
            PropertyType::Detached => "Detached",
            PropertyType::SemiDetached => "Semi-Detached",
            PropertyType::Terraced => "Terraced",
            PropertyType::Flat => "Flat",
            PropertyType::Other(name) => name,
        }
    }

    fn as_column_value(&self) -> &str {
        match self {
            PropertyType::SemiDetached => "Semi_Detached",
            other => other.label(),
        }
    }
}

impl From<String> for PropertyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Detached" => PropertyType::Detached,
            "Semi_Detached" => PropertyType::SemiDetached,
            "Terraced" => PropertyType::Terraced,
            "Flat" => PropertyType::Flat,
            _ => PropertyType::Other(value),
        }
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        value.as_column_value().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_reader;

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let data = "\
Date,Region_Name,Area_Code,propertyType,averagePrice
2021-05-01,London,E12000007,Semi_Detached,  612345.5
2021-05-01,Newcastle upon Tyne,E08000021,Flat,110000
";
        let rows: Vec<PropertyPrice> = from_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region_name, "London");
        assert_eq!(rows[0].property_type, PropertyType::SemiDetached);
        assert_eq!(rows[0].average_price, 612345.5);
        assert_eq!(rows[1].property_type, PropertyType::Flat);
    }

    #[test]
    fn unknown_category_is_kept() {
        let kind = PropertyType::from("Bungalow".to_string());
        assert_eq!(kind, PropertyType::Other("Bungalow".to_string()));
        assert_eq!(kind.label(), "Bungalow");
    }

    #[test]
    fn semi_detached_label_differs_from_column_value() {
        assert_eq!(PropertyType::SemiDetached.label(), "Semi-Detached");
        assert_eq!(String::from(PropertyType::SemiDetached), "Semi_Detached");
    }
}
