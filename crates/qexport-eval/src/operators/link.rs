//! Link combination over the answer × condition cross product

use qexport_model::ConditionLink;

/// Combine pairwise matches of `answers` against `conditions` under `link`
///
/// - `OR`: at least one pair matches
/// - `AND`: every condition value is matched by some answer value
/// - `XOR`: exactly one pair of the whole cross product matches
///
/// Empty sides never satisfy a link.
pub fn combine<F>(link: ConditionLink, answers: &[&str], conditions: &[&str], matches: F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    if answers.is_empty() || conditions.is_empty() {
        return false;
    }

    match link {
        ConditionLink::Or => conditions
            .iter()
            .any(|condition| answers.iter().any(|answer| matches(answer, condition))),
        ConditionLink::And => conditions
            .iter()
            .all(|condition| answers.iter().any(|answer| matches(answer, condition))),
        ConditionLink::Xor => {
            let mut count = 0usize;
            for condition in conditions {
                for answer in answers {
                    if matches(answer, condition) {
                        count += 1;
                        if count > 1 {
                            return false;
                        }
                    }
                }
            }
            count == 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(answer: &str, condition: &str) -> bool {
        answer == condition
    }

    #[test]
    fn test_or_needs_one_pair() {
        assert!(combine(ConditionLink::Or, &["a", "b"], &["b", "c"], eq));
        assert!(!combine(ConditionLink::Or, &["a"], &["b", "c"], eq));
    }

    #[test]
    fn test_and_needs_every_condition_value() {
        assert!(combine(ConditionLink::And, &["c", "b", "a"], &["a", "b"], eq));
        assert!(!combine(ConditionLink::And, &["a"], &["a", "b"], eq));
    }

    #[test]
    fn test_xor_counts_the_whole_cross_product() {
        assert!(combine(ConditionLink::Xor, &["x", "b"], &["a", "b"], eq));
        assert!(!combine(ConditionLink::Xor, &["a", "b"], &["a", "b"], eq));
        // one answer value matching two condition values is two pairs
        assert!(!combine(ConditionLink::Xor, &["5"], &["1", "2"], |_, _| true));
    }

    #[test]
    fn test_empty_sides_never_match() {
        assert!(!combine(ConditionLink::Or, &[], &["a"], eq));
        assert!(!combine(ConditionLink::And, &["a"], &[], eq));
    }
}
