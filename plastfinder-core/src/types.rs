//! Search, supplier and grounding types.
//!
//! Field names follow the camelCase JSON shape produced by the upstream model
//! and consumed by the browser, so every type here round-trips through the
//! wire protocol unchanged.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

// ============================================================================
// Search criteria
// ============================================================================

/// Bag types offered by the search form.
pub const BAG_TYPES: &[&str] = &["Alça Vazada", "Alça Camiseta"];

/// Bag sizes (width x height, cm) offered by the search form.
pub const BAG_SIZES: &[&str] = &["20x30", "30x40", "40x50", "50x60", "60x80", "80x100"];

/// Materials offered by the search form.
pub const MATERIALS: &[&str] = &[
    "Virgem AD",
    "Virgem BD",
    "Reciclado Branco/transparente ou cores definidas",
];

/// Thickness slider bounds in microns: (min, max, step).
pub const THICKNESS_RANGE: (u32, u32, u32) = (10, 150, 5);

/// Print color slider bounds: (min, max).
pub const PRINT_COLOR_RANGE: (u32, u32) = (0, 6);

/// Packaging requirements submitted for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// Bag type, e.g. "Alça Vazada".
    pub bag_type: String,
    /// Approximate size in centimetres, e.g. "30x40".
    pub size: String,
    /// Film thickness in microns.
    #[serde(deserialize_with = "criteria_number")]
    pub thickness: f64,
    /// Number of print colors.
    #[serde(deserialize_with = "criteria_count")]
    pub print_colors: u32,
    /// Material, e.g. "Virgem AD".
    pub material: String,
}

impl SearchCriteria {
    /// Create criteria from explicit values.
    pub fn new(
        bag_type: impl Into<String>,
        size: impl Into<String>,
        thickness: f64,
        print_colors: u32,
        material: impl Into<String>,
    ) -> Self {
        Self {
            bag_type: bag_type.into(),
            size: size.into(),
            thickness,
            print_colors,
            material: material.into(),
        }
    }

    /// One-line summary used in logs and history listings.
    pub fn summary(&self) -> String {
        format!(
            "{} {}cm {}µ {} colors {}",
            self.bag_type, self.size, self.thickness, self.print_colors, self.material
        )
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::new(BAG_TYPES[0], BAG_SIZES[1], 40.0, 2, MATERIALS[0])
    }
}

// ============================================================================
// Supplier records
// ============================================================================

/// Contact channels for a supplier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Phone number.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// WhatsApp number or link.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    /// Website URL.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ContactInfo {
    /// Contact with only a website.
    pub fn website(url: impl Into<String>) -> Self {
        Self {
            website: Some(url.into()),
            ..Default::default()
        }
    }

    /// Whether no channel is set.
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.email.is_none()
            && self.whatsapp.is_none()
            && self.website.is_none()
    }
}

/// A value the model reports either as a number or as free text
/// (e.g. `40` or `"40 micras"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    /// Numeric value.
    Number(Number),
    /// Free text.
    Text(String),
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One supplier found by the search.
///
/// Only `factory_name` is required for a record to be accepted, see
/// [`SupplierRecord::has_factory_name`]. Fields the model adds beyond the
/// known set are kept in `extra` and re-serialized untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRecord {
    /// Company name.
    #[serde(default, deserialize_with = "string_or_default")]
    pub factory_name: String,
    /// City and state.
    #[serde(
        default,
        deserialize_with = "string_or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub location: String,
    /// Price range for 1000 units, or "Sob consulta".
    #[serde(
        default,
        deserialize_with = "string_or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub estimated_price_range: String,
    /// Delivery time, or "Sob consulta".
    #[serde(
        default,
        deserialize_with = "string_or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub estimated_lead_time: String,
    /// Reputation or specialty summary.
    #[serde(
        default,
        deserialize_with = "string_or_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub reviews_summary: String,
    /// Lower bound of the price range.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    /// Upper bound of the price range.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Average lead time in days.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub avg_lead_time_days: Option<f64>,
    /// Rating from 1 to 5.
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Main competitive advantage.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub key_advantage: Option<String>,
    /// Contact channels.
    #[serde(
        default,
        deserialize_with = "contact_or_default",
        skip_serializing_if = "ContactInfo::is_empty"
    )]
    pub contact: ContactInfo,
    /// Material the quoted price refers to.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub found_material: Option<String>,
    /// Size the quoted price refers to.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub found_size: Option<String>,
    /// Thickness the quoted price refers to.
    #[serde(default, deserialize_with = "lenient_measure", skip_serializing_if = "Option::is_none")]
    pub found_thickness: Option<Measure>,
    /// Print colors the quoted price refers to.
    #[serde(default, deserialize_with = "lenient_measure", skip_serializing_if = "Option::is_none")]
    pub found_print_colors: Option<Measure>,
    /// House listing pinned above the search results.
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    /// Fields outside the known set.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl SupplierRecord {
    /// Create a record with just a factory name.
    pub fn new(factory_name: impl Into<String>) -> Self {
        Self {
            factory_name: factory_name.into(),
            ..Default::default()
        }
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the price bounds.
    #[must_use]
    pub fn with_prices(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Set the average lead time.
    #[must_use]
    pub fn with_lead_time_days(mut self, days: f64) -> Self {
        self.avg_lead_time_days = Some(days);
        self
    }

    /// Whether the record carries a usable factory name.
    pub fn has_factory_name(&self) -> bool {
        !self.factory_name.trim().is_empty()
    }

    /// Whether this is the pinned house listing.
    pub fn is_featured(&self) -> bool {
        self.is_featured.unwrap_or(false)
    }

    /// The house listing shown above every result set.
    pub fn featured_house_listing() -> Self {
        Self {
            factory_name: "Plastcustom".to_string(),
            location: "Todo o Brasil".to_string(),
            estimated_price_range: "Consulte para preços competitivos".to_string(),
            estimated_lead_time: "Prazos flexíveis".to_string(),
            reviews_summary: "Soluções personalizadas com entrega em todo o Brasil.".to_string(),
            contact: ContactInfo::website("https://plastcustom.com.br/"),
            is_featured: Some(true),
            ..Default::default()
        }
    }
}

// ============================================================================
// Grounding metadata
// ============================================================================

/// Web sources the model used to ground its answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Source references.
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Queries the model issued.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub web_search_queries: Vec<String>,
}

impl GroundingMetadata {
    /// Metadata from a list of chunks.
    pub fn new(chunks: Vec<GroundingChunk>) -> Self {
        Self {
            grounding_chunks: chunks,
            web_search_queries: Vec::new(),
        }
    }

    /// Iterate over the web sources, skipping non-web chunks.
    pub fn web_sources(&self) -> impl Iterator<Item = &WebSource> {
        self.grounding_chunks.iter().filter_map(|c| c.web.as_ref())
    }
}

/// One grounding reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Web source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

impl GroundingChunk {
    /// Chunk pointing at a web page.
    pub fn web(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            web: Some(WebSource {
                uri: uri.into(),
                title: title.into(),
            }),
        }
    }
}

/// A web page reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WebSource {
    /// Page URI.
    #[serde(default, deserialize_with = "string_or_default")]
    pub uri: String,
    /// Page title.
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
}

// ============================================================================
// Upstream fragments
// ============================================================================

/// One chunk of model output as delivered by the upstream service.
///
/// `text` may hold any number of complete lines and may end mid-line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpstreamFragment {
    /// Generated text.
    pub text: String,
    /// Grounding metadata attached to this chunk, if any.
    pub grounding_metadata: Option<GroundingMetadata>,
}

impl UpstreamFragment {
    /// Text-only fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding_metadata: None,
        }
    }

    /// Attach grounding metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: GroundingMetadata) -> Self {
        self.grounding_metadata = Some(metadata);
        self
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

// The model is loosely instructed, so scalar fields arrive as null, numbers
// or strings interchangeably. A wrong scalar type must not cost the record.

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite()))
}

// Form fields may arrive as numbers or as the text of a number. Both fields
// are still required.

fn criteria_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    match &value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
    .ok_or_else(|| D::Error::custom(format!("expected a number, found {value}")))
}

fn criteria_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    match &value {
        JsonValue::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| D::Error::custom(format!("expected a color count, found {value}")))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Bool(b)) => Some(b),
        Some(JsonValue::String(s)) => s.trim().to_ascii_lowercase().parse().ok(),
        _ => None,
    })
}

fn lenient_measure<'de, D>(deserializer: D) -> Result<Option<Measure>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => Some(Measure::Number(n)),
        Some(JsonValue::String(s)) => Some(Measure::Text(s)),
        _ => None,
    })
}

// Only an object can carry channels; a bare string or list is dropped.
fn contact_or_default<'de, D>(deserializer: D) -> Result<ContactInfo, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(value @ JsonValue::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => ContactInfo::default(),
    })
}
