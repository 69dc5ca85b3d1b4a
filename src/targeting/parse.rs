//! Reading target requirements out of rules text, and target list codecs.

use super::requirement::{TargetRequirement, TargetType};

fn number_word(word: &str) -> Option<usize> {
    let n = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        other => return other.parse().ok(),
    };
    Some(n)
}

fn target_type_word(word: &str) -> Option<TargetType> {
    let singular = word.strip_suffix('s').unwrap_or(word);
    match singular {
        "creature" => Some(TargetType::Creature),
        "player" | "opponent" => Some(TargetType::Player),
        "spell" => Some(TargetType::Spell),
        "permanent" => Some(TargetType::Permanent),
        "artifact" => Some(TargetType::Artifact),
        "enchantment" => Some(TargetType::Enchantment),
        "land" => Some(TargetType::Land),
        "planeswalker" => Some(TargetType::Planeswalker),
        _ => None,
    }
}

/// Target slots mentioned in a piece of rules text.
///
/// Recognizes "target <type>", "any target", "<n> target <types>" and
/// "up to <n> target <types>". Anything else is ignored, so the result
/// is a best guess for content that does not declare its targets.
///
/// ```
/// use ccg_rules::targeting::{parse_target_requirements, TargetType};
///
/// let reqs = parse_target_requirements("Lightning Bolt deals 3 damage to any target.");
/// assert_eq!(reqs.len(), 1);
/// assert_eq!(reqs[0].target_type, TargetType::Any);
/// ```
#[must_use]
pub fn parse_target_requirements(text: &str) -> Vec<TargetRequirement> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut requirements = Vec::new();
    for (i, word) in words.iter().enumerate() {
        if *word != "target" && *word != "targets" {
            continue;
        }
        let prev = i.checked_sub(1).map(|j| words[j]);

        if prev == Some("any") {
            requirements.push(TargetRequirement::single(TargetType::Any).with_description("any target"));
            continue;
        }
        let Some(target_type) = words.get(i + 1).and_then(|w| target_type_word(w)) else {
            continue;
        };

        let count = prev.and_then(number_word);
        let up_to = i >= 3 && words[i - 3] == "up" && words[i - 2] == "to";
        let requirement = match (up_to, count) {
            (true, Some(n)) => TargetRequirement::up_to(target_type, n),
            (false, Some(n)) => TargetRequirement::new(target_type, n, n)
                .with_description(format!("{n} target {target_type}")),
            _ => TargetRequirement::single(target_type),
        };
        requirements.push(requirement);
    }
    requirements
}

/// Join target ids into the comma list stored in item metadata.
#[must_use]
pub fn format_targets<S: AsRef<str>>(targets: &[S]) -> String {
    let mut joined = String::new();
    for (i, target) in targets.iter().enumerate() {
        if i > 0 {
            joined.push(',');
        }
        joined.push_str(target.as_ref());
    }
    joined
}

/// Split a comma list of target ids, dropping blanks.
#[must_use]
pub fn parse_targets(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target() {
        let reqs = parse_target_requirements("Destroy target creature.");
        assert_eq!(reqs, vec![TargetRequirement::single(TargetType::Creature)]);
    }

    #[test]
    fn test_counted_and_up_to() {
        let reqs = parse_target_requirements("Tap two target creatures. Up to three target players each draw a card.");
        assert_eq!(reqs.len(), 2);
        assert_eq!((reqs[0].min_targets, reqs[0].max_targets), (2, 2));
        assert_eq!(reqs[1].target_type, TargetType::Player);
        assert_eq!((reqs[1].min_targets, reqs[1].max_targets), (0, 3));
        assert!(reqs[1].optional);
    }

    #[test]
    fn test_opponent_and_no_targets() {
        let reqs = parse_target_requirements("Target opponent discards a card.");
        assert_eq!(reqs[0].target_type, TargetType::Player);
        assert!(parse_target_requirements("Draw two cards.").is_empty());
    }

    #[test]
    fn test_target_lists() {
        let joined = format_targets(&["bears", "bob"]);
        assert_eq!(joined, "bears,bob");
        assert_eq!(parse_targets(&joined), vec!["bears", "bob"]);
        assert_eq!(parse_targets(" a , ,b "), vec!["a", "b"]);
        assert!(parse_targets("").is_empty());
    }
}
