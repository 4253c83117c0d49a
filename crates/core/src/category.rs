use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const OTHER: &str = "other";

/// Key of an expense category. Keys outside the registry are allowed and are
/// reported as ad hoc categories by the tax summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CategoryKey(String);

impl From<String> for CategoryKey {
    fn from(raw: String) -> Self {
        CategoryKey::new(raw)
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        key.0
    }
}

impl CategoryKey {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into().trim().to_lowercase();
        if key.is_empty() {
            return Self::other();
        }
        CategoryKey(key)
    }

    pub fn other() -> Self {
        CategoryKey(OTHER.to_string())
    }

    pub fn is_other(&self) -> bool {
        self.0 == OTHER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub key: CategoryKey,
    pub label_en: String,
    pub label_fr: String,
    /// Lowercase receipt keywords used when suggesting this category. Each is
    /// matched as whole words.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryDef {
    pub fn new(key: &str, label_en: &str, label_fr: &str, keywords: &[&str]) -> Self {
        CategoryDef {
            key: CategoryKey::new(key),
            label_en: label_en.to_string(),
            label_fr: label_fr.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn label(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.label_en,
            Language::Fr => &self.label_fr,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to parse category registry: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Duplicate category key: {0}")]
    DuplicateKey(String),
}

/// Ordered category registry. Iteration order is the order used to break ties
/// when suggesting a category and to seed tax summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryDef>", into = "Vec<CategoryDef>")]
pub struct CategoryRegistry {
    categories: Vec<CategoryDef>,
}

/// Standalone registry file: a list of `[[category]]` tables.
#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "category")]
    categories: Vec<CategoryDef>,
}

impl TryFrom<Vec<CategoryDef>> for CategoryRegistry {
    type Error = RegistryError;

    fn try_from(categories: Vec<CategoryDef>) -> Result<Self, Self::Error> {
        CategoryRegistry::new(categories)
    }
}

impl From<CategoryRegistry> for Vec<CategoryDef> {
    fn from(registry: CategoryRegistry) -> Self {
        registry.categories
    }
}

impl CategoryRegistry {
    /// Appends the `other` fallback when the list does not define it.
    pub fn new(categories: Vec<CategoryDef>) -> Result<Self, RegistryError> {
        let mut seen = std::collections::HashSet::new();
        for def in &categories {
            if !seen.insert(def.key.clone()) {
                return Err(RegistryError::DuplicateKey(def.key.to_string()));
            }
        }
        let mut categories = categories;
        if !categories.iter().any(|c| c.key.is_other()) {
            categories.push(other_def());
        }
        Ok(CategoryRegistry { categories })
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(toml_content)?;
        Self::new(file.categories)
    }

    pub fn get(&self, key: &CategoryKey) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| &c.key == key)
    }

    pub fn contains(&self, key: &CategoryKey) -> bool {
        self.get(key).is_some()
    }

    /// Maps a free-form key onto the registry, falling back to `other`.
    pub fn resolve(&self, raw: &str) -> CategoryKey {
        let key = CategoryKey::new(raw);
        if self.contains(&key) {
            key
        } else {
            CategoryKey::other()
        }
    }

    /// Label for display; unknown keys are shown verbatim.
    pub fn label(&self, key: &CategoryKey, lang: Language) -> String {
        self.get(key)
            .map(|c| c.label(lang).to_string())
            .unwrap_or_else(|| key.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryDef> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn other_def() -> CategoryDef {
    CategoryDef::new(OTHER, "Other", "Autre", &[])
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        CategoryRegistry {
            categories: vec![
                CategoryDef::new(
                    "fuel",
                    "Fuel",
                    "Carburant",
                    &["gas", "gasoline", "fuel", "essence", "carburant", "diesel", "litre", "litres", "pump", "pompe"],
                ),
                CategoryDef::new(
                    "maintenance",
                    "Maintenance and repairs",
                    "Entretien et réparations",
                    &["oil change", "vidange", "tire", "tires", "pneu", "pneus", "repair", "réparation", "mechanic", "garage", "brake", "brakes"],
                ),
                CategoryDef::new(
                    "insurance",
                    "Insurance",
                    "Assurance",
                    &["insurance", "assurance", "premium", "prime", "policy"],
                ),
                CategoryDef::new(
                    "vehicle_registration",
                    "Licence and registration",
                    "Permis et immatriculation",
                    &["registration", "immatriculation", "saaq", "licence", "permis"],
                ),
                CategoryDef::new(
                    "parking",
                    "Parking",
                    "Stationnement",
                    &["parking", "stationnement", "meter", "parcomètre"],
                ),
                CategoryDef::new(
                    "tolls",
                    "Tolls",
                    "Péages",
                    &["toll", "péage", "peage", "407 etr", "bridge"],
                ),
                CategoryDef::new(
                    "car_wash",
                    "Car wash",
                    "Lave-auto",
                    &["car wash", "lave-auto", "wash"],
                ),
                CategoryDef::new(
                    "phone",
                    "Phone and data",
                    "Téléphone et données",
                    &["mobile", "cellular", "cellulaire", "wireless", "data plan", "forfait"],
                ),
                CategoryDef::new(
                    "meals",
                    "Meals",
                    "Repas",
                    &["restaurant", "café", "coffee", "meal", "repas", "lunch", "dinner"],
                ),
                CategoryDef::new(
                    "supplies",
                    "Supplies",
                    "Fournitures",
                    &["supplies", "fournitures", "water", "eau", "mints", "charger", "chargeur"],
                ),
                CategoryDef::new(
                    "platform_fees",
                    "Platform fees",
                    "Frais de plateforme",
                    &["service fee", "frais de service", "booking fee", "commission"],
                ),
                other_def(),
            ],
        }
    }
}
