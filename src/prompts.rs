//! Prompts for the extraction and form-filling models.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing model behaviour (e.g. tightening
//!    a rule or adding a field type) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the built prompts directly
//!    without calling any model, so a prompt regression is caught as a plain
//!    string assertion.

/// Directive sent alongside each page image on the cloud OCR path.
pub const EXTRACT_PROMPT: &str = "Extract all text from this image. \
Translate to English and format the text in whatever format makes the most sense. \
Assume the image is a personal document like a passport.";

/// Build the form-filling instruction.
///
/// Embeds the form markup and the extracted document text verbatim, followed
/// by the rule set the model must obey. The reply contract is a bare JSON
/// object; [`crate::fill::normalize_reply`] still tolerates a fenced reply
/// because models routinely disobey the "no code blocks" rule.
pub fn fill_prompt(form_html: &str, document_text: &str) -> String {
    format!(
        r#"You are a form-filling assistant. Analyze this HTML form and extracted document text, then return a JSON mapping of form fields to values.

FORM HTML:
{form_html}

DOCUMENT TEXT:
{document_text}

Your task:
1. Identify all fillable form fields (inputs, selects, radio buttons) by their ID attribute
2. Match document data to appropriate fields
3. Return ONLY valid JSON in this exact format (no markdown, no code blocks):

{{
  "fields": [
    {{
      "fieldId": "lastName_input",
      "value": "Smith"
    }},
    {{
      "fieldId": "year_sltDateYear",
      "value": "1990"
    }}
  ]
}}

Rules:
- Use exact field IDs from the HTML id attributes
- For dates, parse and split into separate year/month/day fields
- For gender radio buttons, use the exact value attribute (01=Female, 02=Male, 03=Unknown, 04=Other)
- Only include fields where you found matching data
- Return ONLY valid JSON, no additional text or formatting"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_prompt_names_the_expectations() {
        assert!(EXTRACT_PROMPT.contains("Extract all text"));
        assert!(EXTRACT_PROMPT.contains("Translate to English"));
        assert!(EXTRACT_PROMPT.contains("personal document"));
    }

    #[test]
    fn fill_prompt_embeds_inputs_verbatim() {
        let form = r#"<input id="lastName_input" type="text"/>"#;
        let text = "Surname: Eriksson\nBorn: 1990-03-07";
        let prompt = fill_prompt(form, text);
        assert!(prompt.contains(form));
        assert!(prompt.contains(text));
    }

    #[test]
    fn fill_prompt_fixes_the_gender_codes() {
        let prompt = fill_prompt("<form/>", "x");
        assert!(prompt.contains("01=Female"));
        assert!(prompt.contains("02=Male"));
        assert!(prompt.contains("03=Unknown"));
        assert!(prompt.contains("04=Other"));
    }

    #[test]
    fn fill_prompt_demands_the_exact_reply_shape() {
        let prompt = fill_prompt("<form/>", "x");
        assert!(prompt.contains(r#""fieldId""#));
        assert!(prompt.contains("ONLY valid JSON"));
        assert!(prompt.contains("split into separate year/month/day"));
    }
}
