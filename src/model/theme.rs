use serde::{Deserialize, Serialize};

/// The display theme preference.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// The terminal's own preference, read from `COLORFGBG` (`"<fg>;<bg>"`). Background colors
    /// 0 through 6 and 8 are dark. Anything else, including an unset variable, is light.
    pub fn system_default() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }

    pub(crate) fn from_colorfgbg(value: Option<&str>) -> Self {
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());
        match background {
            Some(0..=6) | Some(8) => Theme::Dark,
            _ => Theme::Light,
        }
    }
}
