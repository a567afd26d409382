//! Deterministic names for columns, archive entries and referenced files
//!
//! Every name is a pure function of the questionnaire structure, so repeated exports of an
//! unchanged structure produce identical headers.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of characters that are not allowed inside a column name segment
static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid identifier pattern"));

/// Characters dropped from file and entry names
static FORBIDDEN_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid file name pattern"));

/// Number of alphanumeric characters taken from the questionnaire name
const PREFIX_LEN: usize = 3;

/// Replace diacritics with plain ASCII, expanding German umlauts first
///
/// `Ä` becomes `Ae` and `ß` becomes `ss`, everything else goes through transliteration.
pub fn normalize_diacritics(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'ä' => expanded.push_str("ae"),
            'ö' => expanded.push_str("oe"),
            'ü' => expanded.push_str("ue"),
            'Ä' => expanded.push_str("Ae"),
            'Ö' => expanded.push_str("Oe"),
            'Ü' => expanded.push_str("Ue"),
            'ß' => expanded.push_str("ss"),
            other => expanded.push(other),
        }
    }
    deunicode(&expanded)
}

/// Short questionnaire marker used by positional column names
pub fn questionnaire_prefix(questionnaire_name: &str) -> String {
    normalize_diacritics(questionnaire_name)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(PREFIX_LEN)
        .collect::<String>()
        .to_lowercase()
}

/// Lowercase identifier segment built from free text
fn identifier(text: &str) -> String {
    let lowered = normalize_diacritics(text).to_lowercase();
    NON_IDENTIFIER
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Inputs shared by every column name of one questionnaire version
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub questionnaire_id: i64,
    pub questionnaire_name: &'a str,
    pub questionnaire_version: i64,
}

impl NameContext<'_> {
    fn positional(&self, question_position: i64) -> String {
        format!(
            "q{}_{}_v{}_{}",
            self.questionnaire_id,
            questionnaire_prefix(self.questionnaire_name),
            self.questionnaire_version,
            question_position
        )
    }

    /// Name of the synthetic question column
    pub fn question(&self, question_variable_name: Option<&str>, question_position: i64) -> String {
        match non_blank(question_variable_name) {
            Some(variable_name) => variable_name.to_string(),
            None => self.positional(question_position),
        }
    }

    /// Name of an answer option column
    ///
    /// The answer option's variable name wins, then the question's variable name with the
    /// answer option position, then the positional fallback.
    pub fn answer_option(
        &self,
        question_variable_name: Option<&str>,
        question_position: i64,
        answer_option_variable_name: Option<&str>,
        answer_option_position: i64,
    ) -> String {
        if let Some(variable_name) = non_blank(answer_option_variable_name) {
            return variable_name.to_string();
        }
        match non_blank(question_variable_name) {
            Some(variable_name) => format!("{variable_name}_{answer_option_position}"),
            None => format!(
                "{}_{}",
                self.positional(question_position),
                answer_option_position
            ),
        }
    }
}

/// Name of the column for one multi-select value
pub fn multi_select_value(answer_option_column: &str, value: &str) -> String {
    format!("{answer_option_column}_{}", identifier(value))
}

/// Name of the column for one sample slot (1 or 2)
pub fn sample_slot(answer_option_column: &str, slot: usize) -> String {
    format!("{answer_option_column}_{slot}")
}

/// Dotted position of a codebook row
pub fn answer_position(
    question_position: i64,
    answer_option_position: Option<i64>,
    value_position: Option<usize>,
) -> String {
    let mut position = question_position.to_string();
    if let Some(answer_option_position) = answer_option_position {
        position.push_str(&format!(".{answer_option_position}"));
        if let Some(value_position) = value_position {
            position.push_str(&format!(".{value_position}"));
        }
    }
    position
}

/// Make a name safe to use as archive entry or file name
///
/// Diacritics are replaced, every whitespace character and underscore becomes `-`, and
/// path separators or other forbidden characters are removed.
pub fn sanitize_file_name(name: &str) -> String {
    let normalized = normalize_diacritics(name.trim());
    let cleaned = FORBIDDEN_FILE_CHARS.replace_all(&normalized, "");
    cleaned
        .chars()
        .map(|ch| if ch.is_whitespace() || ch == '_' { '-' } else { ch })
        .collect()
}

/// Stable name of a referenced file inside the archive and in answer cells
pub fn compose_file_name(file_id: i64, file_name: Option<&str>) -> String {
    match non_blank(file_name).map(sanitize_file_name) {
        Some(name) if !name.is_empty() => format!("{file_id}-{name}"),
        _ => file_id.to_string(),
    }
}

/// Entry name of a per-questionnaire CSV
pub fn entry_name(kind: &str, study: &str, questionnaire_name: &str, version: i64) -> String {
    format!(
        "{kind}_{}_{}_v{version}.csv",
        sanitize_file_name(study),
        sanitize_file_name(questionnaire_name)
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: NameContext<'static> = NameContext {
        questionnaire_id: 295,
        questionnaire_name: "Übersicht Gesundheit",
        questionnaire_version: 1,
    };

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(normalize_diacritics("ÄÖÜßa"), "AeOeUessa");
        assert_eq!(normalize_diacritics("Café"), "Cafe");
    }

    #[test]
    fn test_questionnaire_prefix() {
        assert_eq!(questionnaire_prefix("Übersicht"), "ueb");
        assert_eq!(questionnaire_prefix("FB 1 Antworten"), "fb1");
        assert_eq!(questionnaire_prefix("ab"), "ab");
    }

    #[test]
    fn test_positional_fallbacks() {
        assert_eq!(CONTEXT.question(None, 3), "q295_ueb_v1_3");
        assert_eq!(CONTEXT.answer_option(None, 3, None, 2), "q295_ueb_v1_3_2");
        assert_eq!(CONTEXT.answer_option(Some("mood"), 3, None, 2), "mood_2");
        assert_eq!(CONTEXT.answer_option(Some("mood"), 3, Some("why"), 2), "why");
        assert_eq!(CONTEXT.answer_option(Some("  "), 3, None, 2), "q295_ueb_v1_3_2");
    }

    #[test]
    fn test_value_columns() {
        assert_eq!(multi_select_value("q1_2", "Kopfschmerzen & Übelkeit"), "q1_2_kopfschmerzen_uebelkeit");
        assert_eq!(sample_slot("q1_3", 2), "q1_3_2");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(sanitize_file_name("Teststudie - Export"), "Teststudie---Export");
        assert_eq!(sanitize_file_name("a/b_c.png"), "ab-c.png");
        assert_eq!(compose_file_name(7, Some("Röntgen Bild.jpg")), "7-Roentgen-Bild.jpg");
        assert_eq!(compose_file_name(7, None), "7");
        assert_eq!(
            entry_name("answers", "Teststudie - Export", "FB1 alle", 2),
            "answers_Teststudie---Export_FB1-alle_v2.csv"
        );
    }

    #[test]
    fn test_answer_position() {
        assert_eq!(answer_position(2, None, None), "2");
        assert_eq!(answer_position(2, Some(3), None), "2.3");
        assert_eq!(answer_position(2, Some(3), Some(1)), "2.3.1");
    }
}
