use crate::naming::{CasePattern, NameFeatures, TokenFeatures};
use crate::operators::Operator;

/// Minimum share of alphabetic characters for letter-level operators.
const MIN_ALPHA_RATIO: f64 = 0.5;

/// Which operators may structurally apply to one analyzed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feasibility {
    pub abbrev: bool,
    pub vowel_drop: bool,
    pub case_flatten: bool,
    pub noise_wrap: bool,
}

impl Feasibility {
    pub fn allows(&self, operator: Operator) -> bool {
        match operator {
            Operator::Identity => true,
            Operator::Abbrev => self.abbrev,
            Operator::VowelDrop => self.vowel_drop,
            Operator::CaseFlatten => self.case_flatten,
            Operator::NoiseWrap => self.noise_wrap,
        }
    }
}

/// Decide operator feasibility from name features.
pub fn feasible_operators(nf: &NameFeatures) -> Feasibility {
    let letter_ops = nf.alpha_ratio >= MIN_ALPHA_RATIO;

    Feasibility {
        abbrev: letter_ops && nf.tokens.iter().any(abbreviable),
        vowel_drop: letter_ops && nf.tokens.iter().any(vowel_droppable),
        case_flatten: nf.num_tokens > 1
            || matches!(
                nf.case_pattern,
                CasePattern::Camel | CasePattern::Snake | CasePattern::Mixed
            ),
        noise_wrap: true,
    }
}

/// An ordinary word token: alphabetic, longer than one letter, not an acronym or id.
fn plain_word(token: &TokenFeatures) -> bool {
    !token.is_numeric
        && !token.has_mixed_digits
        && !token.is_single_letter
        && !token.is_all_caps
        && !token.looks_like_id
}

fn abbreviable(token: &TokenFeatures) -> bool {
    plain_word(token) && !token.is_abbreviation && token.length >= 4
}

fn vowel_droppable(token: &TokenFeatures) -> bool {
    plain_word(token) && token.length >= 3 && token.num_vowels >= 2
}
