use serde::Deserialize;

/// Model used when the config does not name one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Generative Language API root
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// One entry of the `models` listing endpoint.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Name without the `models/` resource prefix.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    /// Whether the model can serve `generateContent` requests.
    pub fn can_generate(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ModelList {
    #[serde(default)]
    pub(crate) models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_list_deserialize() {
        let json = r#"{"models":[
            {"name":"models/gemini-2.5-flash","displayName":"Gemini 2.5 Flash",
             "supportedGenerationMethods":["generateContent","countTokens"]},
            {"name":"models/embedding-001","supportedGenerationMethods":["embedContent"]}
        ]}"#;
        let list: ModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.models.len(), 2);
        assert_eq!(list.models[0].short_name(), "gemini-2.5-flash");
        assert!(list.models[0].can_generate());
        assert!(!list.models[1].can_generate());
        assert_eq!(list.models[1].display_name, None);
    }

    #[test]
    fn test_model_list_missing_models_field() {
        let list: ModelList = serde_json::from_str("{}").unwrap();
        assert!(list.models.is_empty());
    }
}
