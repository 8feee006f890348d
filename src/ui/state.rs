use std::time::Duration;

use super::projects::{ProjectCategory, ProjectId};
use super::store::{KeyValueStore, CONSENT_KEY, THEME_KEY};

pub const PRIVACY_NOTICE_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Sun while dark (click for light), moon while light.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☾",
            Self::Dark => "☀",
        }
    }

    pub fn body_class(self) -> Option<&'static str> {
        match self {
            Self::Light => None,
            Self::Dark => Some("dark-mode"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CookieNotice {
    #[default]
    Unseen,
    Shown,
    Accepted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Persist { key: &'static str, value: String },
    ApplyTheme(Theme),
    ScheduleNotice(Duration),
    LogVisit,
    ScrollToTop,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub theme: Theme,
    pub menu_open: bool,
    pub active_filter: ProjectCategory,
    pub open_modal: Option<ProjectId>,
    pub cookie_notice: CookieNotice,
    pub privacy_details_open: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: UiState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn quiet(state: UiState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

impl UiState {
    /// Builds the startup state from persisted keys.
    ///
    /// A stored theme wins over the system preference. Without stored
    /// consent the privacy notice is scheduled rather than shown at once.
    pub fn restore(store: &impl KeyValueStore, system_prefers_dark: bool) -> Transition {
        let theme = store
            .get(THEME_KEY)
            .and_then(|value| Theme::from_str(&value))
            .unwrap_or(if system_prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            });
        let accepted = store.get(CONSENT_KEY).is_some_and(|value| !value.is_empty());

        let state = UiState {
            theme,
            cookie_notice: if accepted {
                CookieNotice::Accepted
            } else {
                CookieNotice::Unseen
            },
            ..UiState::default()
        };

        let mut effects = vec![Effect::ApplyTheme(theme)];
        if !accepted {
            effects.push(Effect::ScheduleNotice(PRIVACY_NOTICE_DELAY));
        }

        Transition { state, effects }
    }

    pub fn toggle_theme(&self) -> Transition {
        let theme = self.theme.toggled();
        Transition {
            state: UiState {
                theme,
                ..self.clone()
            },
            effects: vec![
                Effect::Persist {
                    key: THEME_KEY,
                    value: theme.as_str().to_string(),
                },
                Effect::ApplyTheme(theme),
            ],
        }
    }

    pub fn toggle_menu(&self) -> Transition {
        Transition::quiet(UiState {
            menu_open: !self.menu_open,
            ..self.clone()
        })
    }

    /// Nav link clicks and clicks outside the navigation both land here.
    pub fn close_menu(&self) -> Transition {
        Transition::quiet(UiState {
            menu_open: false,
            ..self.clone()
        })
    }

    pub fn set_filter(&self, category: &str) -> Transition {
        let Some(active_filter) = ProjectCategory::from_str(category) else {
            return Transition::quiet(self.clone());
        };

        Transition::quiet(UiState {
            active_filter,
            ..self.clone()
        })
    }

    pub fn open_modal(&self, id: &str) -> Transition {
        let Some(project) = ProjectId::from_str(id) else {
            return Transition::quiet(self.clone());
        };

        Transition::quiet(UiState {
            open_modal: Some(project),
            ..self.clone()
        })
    }

    pub fn close_modal(&self, id: &str) -> Transition {
        let target = ProjectId::from_str(id);
        if target.is_none() || target != self.open_modal {
            return Transition::quiet(self.clone());
        }

        Transition::quiet(UiState {
            open_modal: None,
            ..self.clone()
        })
    }

    pub fn close_modal_backdrop(&self) -> Transition {
        Transition::quiet(UiState {
            open_modal: None,
            ..self.clone()
        })
    }

    /// Fired by the scheduled notice timer; a no-op once consent exists.
    pub fn show_privacy_notice(&self) -> Transition {
        if self.cookie_notice != CookieNotice::Unseen {
            return Transition::quiet(self.clone());
        }

        Transition::quiet(UiState {
            cookie_notice: CookieNotice::Shown,
            ..self.clone()
        })
    }

    pub fn show_privacy_details(&self) -> Transition {
        let cookie_notice = match self.cookie_notice {
            CookieNotice::Accepted => CookieNotice::Accepted,
            _ => CookieNotice::Unseen,
        };

        Transition::quiet(UiState {
            cookie_notice,
            privacy_details_open: true,
            ..self.clone()
        })
    }

    pub fn close_privacy_details(&self) -> Transition {
        Transition::quiet(UiState {
            privacy_details_open: false,
            ..self.clone()
        })
    }

    pub fn accept_privacy(&self) -> Transition {
        Transition {
            state: UiState {
                cookie_notice: CookieNotice::Accepted,
                privacy_details_open: false,
                ..self.clone()
            },
            effects: vec![
                Effect::Persist {
                    key: CONSENT_KEY,
                    value: "true".to_string(),
                },
                Effect::LogVisit,
            ],
        }
    }

    pub fn back_to_top(&self) -> Transition {
        Transition {
            state: self.clone(),
            effects: vec![Effect::ScrollToTop],
        }
    }

    pub fn notice_visible(&self) -> bool {
        self.cookie_notice == CookieNotice::Shown
    }

    pub fn consent_given(&self) -> bool {
        self.cookie_notice == CookieNotice::Accepted
    }
}

/// Writes `Persist` effects into the store; the rest are left for the caller.
pub fn persist_effects<'a>(
    store: &mut impl KeyValueStore,
    effects: &'a [Effect],
) -> impl Iterator<Item = &'a Effect> {
    for effect in effects {
        if let Effect::Persist { key, value } = effect {
            store.set(key, value);
        }
    }

    effects
        .iter()
        .filter(|effect| !matches!(effect, Effect::Persist { .. }))
}
