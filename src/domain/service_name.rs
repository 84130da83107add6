use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGTH: usize = 256;

/// Label of the subscribed service, e.g. "Yandex Plus".
///
/// Matching against stored records is exact and case-sensitive, so the value
/// is kept as given (no trimming or case folding). Control characters are
/// rejected since Postgres text columns cannot hold NUL.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(name: String) -> Result<ServiceName, String> {
        let is_empty_or_whitespace = name.trim().is_empty();
        let is_too_long = name.graphemes(true).count() > MAX_CHAR_LENGTH;
        let contains_control_chars = name.chars().any(|char| char.is_control());

        if is_empty_or_whitespace || is_too_long || contains_control_chars {
            return Err(format!("{:?} is not a valid service name", name));
        }

        Ok(Self(name))
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
