//! Pricing model files (JSON or TOML)

use std::fs;
use std::path::Path;

use detailer_types::{Error, PricingModel, Result};

/// On-disk format of a pricing model file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFileFormat {
    Json,
    Toml,
}

impl ModelFileFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::InvalidInput(format!(
                "unsupported pricing model file (expected .json or .toml): {}",
                path.display()
            ))),
        }
    }
}

/// Load a pricing model from a JSON or TOML file
pub fn load_pricing_model(path: &Path) -> Result<PricingModel> {
    let format = ModelFileFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    parse_pricing_model(&content, format)
}

/// Parse a pricing model. Field names are camelCase in both formats.
pub fn parse_pricing_model(content: &str, format: ModelFileFormat) -> Result<PricingModel> {
    match format {
        ModelFileFormat::Json => Ok(serde_json::from_str(content)?),
        ModelFileFormat::Toml => {
            // Vehicle classes are map keys; route through JSON so they
            // deserialize the same way in both formats.
            let value: toml::Value = toml::from_str(content)?;
            let json = serde_json::to_value(value)?;
            Ok(serde_json::from_value(json)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detailer_types::VehicleClass;

    const TOML_MODEL: &str = r#"
laborCost = 25
materialCost = 10

[basePrice]
sedan = 50
suv = 70
truck = 80
van = 75
sports = 90
luxury = 100

[surcharges]
luxurySurcharge = 20
filthinessFactor = 10

[services.waxing]
name = "Waxing"
price = 50

[services.ceramic]
name = "Ceramic coating"
price = 300
enabled = false
"#;

    #[test]
    fn test_parse_toml_model() {
        let model = parse_pricing_model(TOML_MODEL, ModelFileFormat::Toml).unwrap();
        assert_eq!(model.base_price_for(VehicleClass::Luxury), 100.0);
        assert_eq!(model.surcharges.luxury_surcharge, 20.0);
        assert_eq!(model.services["waxing"].price, 50.0);
        assert!(model.services["waxing"].enabled);
        assert!(!model.services["ceramic"].enabled);
        assert_eq!(model.labor_cost, 25.0);
    }

    #[test]
    fn test_parse_json_model() {
        let json = serde_json::to_string(&PricingModel::default()).unwrap();
        let model = parse_pricing_model(&json, ModelFileFormat::Json).unwrap();
        assert_eq!(model, PricingModel::default());
    }

    #[test]
    fn test_partial_toml_model_rejected() {
        let partial = "[basePrice]\nsedan = 50\nsuv = 70\ntruck = 80\nvan = 75\nsports = 90\nluxury = 100\n";
        let err = parse_pricing_model(partial, ModelFileFormat::Toml).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_model_without_surcharges_rejected() {
        let no_surcharges =
            TOML_MODEL.replace("[surcharges]\nluxurySurcharge = 20\nfilthinessFactor = 10\n", "");
        assert_ne!(no_surcharges, TOML_MODEL);
        let err = parse_pricing_model(&no_surcharges, ModelFileFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("surcharges"));
    }

    #[test]
    fn test_partial_json_model_rejected() {
        let mut value = serde_json::to_value(PricingModel::default()).unwrap();
        value.as_object_mut().unwrap().remove("laborCost");
        let err = parse_pricing_model(&value.to_string(), ModelFileFormat::Json).unwrap_err();
        assert!(err.to_string().contains("laborCost"));
    }

    #[test]
    fn test_unknown_class_rejected() {
        let bad = TOML_MODEL.replace("sedan = 50", "hatchback = 50");
        assert!(parse_pricing_model(&bad, ModelFileFormat::Toml).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ModelFileFormat::from_path(Path::new("model.TOML")).unwrap(),
            ModelFileFormat::Toml
        );
        assert!(ModelFileFormat::from_path(Path::new("model.yaml")).is_err());
    }
}
