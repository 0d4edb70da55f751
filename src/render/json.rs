//! JSON rendering for extraction results.

use crate::error::{Error, Result};
use crate::model::ExtractionResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an extraction result to JSON.
pub fn to_json(result: &ExtractionResult, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result),
        JsonFormat::Compact => serde_json::to_string(result),
    };

    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, FigureElement, FigureKind, LayoutElement, PageContent};

    fn sample() -> ExtractionResult {
        let mut result = ExtractionResult::new("sample.pdf");
        result.metadata.title = Some("Test".to_string());
        result.text = "Hello".to_string();
        result.success = true;

        let mut page = PageContent::new(1, 612.0, 792.0);
        page.elements.push(LayoutElement::Figure(FigureElement {
            name: "Im1".to_string(),
            kind: FigureKind::Image,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
        }));
        result.pages.push(page);
        result
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("Test"));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.contains("\"type\":\"figure\""));
    }

    #[test]
    fn test_json_round_trips() {
        let original = sample();
        let json = to_json(&original, JsonFormat::Compact).unwrap();
        let parsed: ExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
