/// SEO scoring: read a 0-100 score out of free-form model text, falling back
/// to a keyword-presence check when the text does not yield a usable number.
use crate::digits::{classify, Digit};

pub const MAX_SCORE: u8 = 100;

/// Why the model's answer could not be used as a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No digits at all, or a digit with no decimal value such as "²".
    Unparseable,
    /// Digits were found but the number is above [`MAX_SCORE`].
    OutOfRange,
}

impl FallbackReason {
    pub fn warning(self) -> &'static str {
        match self {
            Self::Unparseable => "Advanced SEO scoring failed to parse, used basic scoring.",
            Self::OutOfRange => {
                "Advanced SEO scoring returned out-of-range score, used basic scoring."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeoScore {
    pub value: u8,
    pub fallback: Option<FallbackReason>,
}

impl SeoScore {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Score `llm_text`, or fall back to [`basic_seo_score`] on `fallback_text`.
///
/// Every digit in `llm_text`, in any script, is concatenated in order before
/// parsing, so "8 out of 10" reads as 810 and falls back.
pub fn extract_score(llm_text: &str, fallback_text: &str, keyword: &str) -> SeoScore {
    match parse_model_score(llm_text) {
        Ok(value) => SeoScore {
            value,
            fallback: None,
        },
        Err(reason) => SeoScore {
            value: basic_seo_score(fallback_text, keyword) * MAX_SCORE,
            fallback: Some(reason),
        },
    }
}

/// 1 if `keyword` occurs in `text` ignoring case, else 0.
pub fn basic_seo_score(text: &str, keyword: &str) -> u8 {
    u8::from(text.to_lowercase().contains(&keyword.to_lowercase()))
}

fn parse_model_score(text: &str) -> Result<u8, FallbackReason> {
    let mut digits = String::new();
    for c in text.chars() {
        match classify(c) {
            Some(Digit::Decimal(d)) => digits.push(char::from(b'0' + d)),
            Some(Digit::NonDecimal) => return Err(FallbackReason::Unparseable),
            None => {}
        }
    }
    if digits.is_empty() {
        return Err(FallbackReason::Unparseable);
    }
    // Only overflow can fail here; a huge number is still just out of range.
    let value = digits
        .parse::<u64>()
        .map_err(|_| FallbackReason::OutOfRange)?;
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_SCORE)
        .ok_or(FallbackReason::OutOfRange)
}
