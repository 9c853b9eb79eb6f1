use crate::prelude::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const CODE_FLOOR: u32 = 100_000;
const CODE_SPAN: u32 = 900_000;

/// Code shared between participants of one analysis session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    /// Six-digit code derived from an arbitrary random draw.
    pub fn from_random(draw: u32) -> Self {
        Self((CODE_FLOOR + draw % CODE_SPAN).to_string())
    }

    /// Accepts whatever the user typed; blank input is refused.
    pub fn parse(input: &str) -> SyncResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SyncError::EmptySessionCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_have_six_digits() {
        for draw in [0, 1, 899_999, 900_000, u32::MAX] {
            let code = SessionCode::from_random(draw);
            assert_eq!(code.as_str().len(), 6);
            let value: u32 = code.as_str().parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn blank_input_is_refused() {
        assert!(matches!(
            SessionCode::parse("   "),
            Err(SyncError::EmptySessionCode)
        ));
        assert_eq!(SessionCode::parse(" 482913 ").unwrap().as_str(), "482913");
    }
}
