use thiserror::Error;
use url::Url;

/// Event-wide toggles controlled from the admin console.
///
/// Everything defaults to hidden; the admin opens features up as the event
/// progresses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventSettings {
    main_quiz_visible: bool,
    leaderboard_visible: bool,
    external_form_url: Option<String>,
    external_form_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventSettingsDraft {
    pub main_quiz_visible: bool,
    pub leaderboard_visible: bool,
    pub external_form_url: Option<String>,
    pub external_form_visible: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventSettingsError {
    #[error("invalid external form URL")]
    InvalidExternalFormUrl,
}

impl EventSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `EventSettingsError` if an external form URL is present but
    /// not parsable.
    pub fn validate(self) -> Result<EventSettings, EventSettingsError> {
        let external_form_url = self
            .external_form_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        if let Some(url) = external_form_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(EventSettingsError::InvalidExternalFormUrl);
            }
        }

        Ok(EventSettings {
            main_quiz_visible: self.main_quiz_visible,
            leaderboard_visible: self.leaderboard_visible,
            external_form_url,
            external_form_visible: self.external_form_visible,
        })
    }
}

impl EventSettings {
    /// Rehydrate settings from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `EventSettingsError` if the stored external form URL is
    /// invalid.
    pub fn from_persisted(
        main_quiz_visible: bool,
        leaderboard_visible: bool,
        external_form_url: Option<String>,
        external_form_visible: bool,
    ) -> Result<Self, EventSettingsError> {
        EventSettingsDraft {
            main_quiz_visible,
            leaderboard_visible,
            external_form_url,
            external_form_visible,
        }
        .validate()
    }

    #[must_use]
    pub fn main_quiz_visible(&self) -> bool {
        self.main_quiz_visible
    }

    #[must_use]
    pub fn leaderboard_visible(&self) -> bool {
        self.leaderboard_visible
    }

    #[must_use]
    pub fn external_form_url(&self) -> Option<&str> {
        self.external_form_url.as_deref()
    }

    #[must_use]
    pub fn external_form_visible(&self) -> bool {
        self.external_form_visible
    }

    /// The external form is offered only when enabled and a URL is set.
    #[must_use]
    pub fn external_form_link(&self) -> Option<&str> {
        if self.external_form_visible {
            self.external_form_url.as_deref()
        } else {
            None
        }
    }

    /// Draft carrying the current values, for load-modify-save edits.
    #[must_use]
    pub fn to_draft(&self) -> EventSettingsDraft {
        EventSettingsDraft {
            main_quiz_visible: self.main_quiz_visible,
            leaderboard_visible: self.leaderboard_visible,
            external_form_url: self.external_form_url.clone(),
            external_form_visible: self.external_form_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hide_everything() {
        let settings = EventSettings::default();
        assert!(!settings.main_quiz_visible());
        assert!(!settings.leaderboard_visible());
        assert!(!settings.external_form_visible());
        assert_eq!(settings.external_form_link(), None);
    }

    #[test]
    fn validate_rejects_bad_form_url() {
        let draft = EventSettingsDraft {
            external_form_url: Some("not a url".into()),
            ..EventSettingsDraft::new()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            EventSettingsError::InvalidExternalFormUrl
        );
    }

    #[test]
    fn blank_form_url_normalizes_to_none() {
        let draft = EventSettingsDraft {
            external_form_url: Some("   ".into()),
            external_form_visible: true,
            ..EventSettingsDraft::new()
        };
        let settings = draft.validate().unwrap();
        assert_eq!(settings.external_form_url(), None);
        assert_eq!(settings.external_form_link(), None);
    }

    #[test]
    fn form_link_requires_both_url_and_visibility() {
        let url = "https://forms.example.com/quiz".to_owned();

        let hidden = EventSettings::from_persisted(false, false, Some(url.clone()), false).unwrap();
        assert_eq!(hidden.external_form_link(), None);

        let visible = EventSettings::from_persisted(false, false, Some(url.clone()), true).unwrap();
        assert_eq!(visible.external_form_link(), Some(url.as_str()));
    }

    #[test]
    fn draft_round_trips_current_values() {
        let settings = EventSettings::from_persisted(
            true,
            true,
            Some("https://forms.example.com/quiz".into()),
            true,
        )
        .unwrap();
        let rebuilt = settings.to_draft().validate().unwrap();
        assert_eq!(settings, rebuilt);
    }
}
