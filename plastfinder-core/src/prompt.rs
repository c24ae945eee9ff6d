//! Sourcing prompt sent to the upstream model.

use crate::types::SearchCriteria;

/// Supplier that must never appear in search results (the house brand is
/// shown separately as a featured listing).
pub const EXCLUDED_SUPPLIER: &str = "Plastcustom Embalagens";

/// Placeholder the model must use when a price or lead time is not public.
pub const ON_REQUEST: &str = "Sob consulta";

/// Render the search prompt for the given criteria.
///
/// The prompt asks for one JSON object per line so that the output can be
/// relayed as JSON Lines while it is still being generated.
pub fn build_prompt(criteria: &SearchCriteria) -> String {
    let SearchCriteria {
        bag_type,
        size,
        thickness,
        print_colors,
        material,
    } = criteria;

    format!(
        r#"You are an advanced sourcing assistant for the packaging industry in Brazil. Your mission is to conduct a deep web search to identify the best suppliers of custom plastic bags. Find relevant suppliers, strongly prioritizing those who publish prices, but also include good contacts that require a consultation. '{EXCLUDED_SUPPLIER}' must be EXCLUDED from all results.

**Search Criteria:**
- Bag Type: "{bag_type}"
- Approximate Size: "{size} cm"
- Thickness: "{thickness} microns"
- Printing: "{print_colors} colors"
- Material: "{material}"

**Search and Analysis Process:**
1. **Formulate Multiple Search Queries:** Run several variations of web searches to maximize discovery, e.g. "price of {bag_type} bag", "supplier of {bag_type} {material} bag", "buy custom plastic bags".
2. **Analyze Search Results:** Visit the websites found.
   - Top priority: suppliers that display prices online.
   - Secondary: relevant suppliers without public prices.
3. **Extract Information:** For each supplier, extract:
   - **factoryName**: Company name.
   - **location**: City and State.
   - **estimatedPriceRange**: Price range for 1000 units (e.g. "R$ 250 - R$ 350 per thousand"). If there is no price, you MUST use "{ON_REQUEST}".
   - **minPrice**: Minimum numeric value of the price range, or null.
   - **maxPrice**: Maximum numeric value of the price range, or null.
   - **estimatedLeadTime**: Estimated delivery time (e.g. "15-20 business days"), or "{ON_REQUEST}".
   - **avgLeadTimeDays**: Average lead time in days (number), or null.
   - **reviewsSummary**: Brief summary of the company's reputation or specialty.
   - **rating**: Numeric rating from 1 to 5 based on online reputation, or null.
   - **keyAdvantage**: A clear competitive advantage.
   - **contact**: An object with "phone", "email", "whatsapp" and "website".
   - **foundMaterial**: Material the price refers to, or the main material offered, or null.
   - **foundSize**: Size the price refers to, or null.
   - **foundThickness**: Thickness in microns the price refers to, or null.
   - **foundPrintColors**: Number of print colors the price refers to, or null.
4. **Validation and Quality:** Prioritize professional websites with clear contact information. Ignore generic directories.

**MANDATORY Output Format:**
Your final response must be ONLY a sequence of JSON objects, one per line (JSONL format). Do not wrap the output in code fences and do not add any other text.

Start the search now."#
    )
}
