//! Light/dark theme preference
//!
//! The stored preference is tri-state: no entry means "follow the OS",
//! `true`/`false` is an explicit choice that OS changes no longer override.

/// The stored part of the theme: `None` until the user toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemePreference(pub Option<bool>);

impl ThemePreference {
    pub fn is_explicit(&self) -> bool {
        self.0.is_some()
    }

    /// Dark or not, given what the OS currently prefers.
    pub fn effective(&self, os_dark: bool) -> bool {
        self.0.unwrap_or(os_dark)
    }
}

/// Live theme state: the stored preference plus the last OS value seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    preference: ThemePreference,
    os_dark: bool,
}

impl Theme {
    pub fn new(preference: ThemePreference, os_dark: bool) -> Self {
        Self {
            preference,
            os_dark,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn is_dark(&self) -> bool {
        self.preference.effective(self.os_dark)
    }

    /// Flip the effective theme and pin it as an explicit choice.
    pub fn toggle(&mut self) -> bool {
        let dark = !self.is_dark();
        self.preference = ThemePreference(Some(dark));
        dark
    }

    /// Record an OS preference change; returns the resulting effective theme.
    pub fn on_os_change(&mut self, os_dark: bool) -> bool {
        self.os_dark = os_dark;
        self.is_dark()
    }
}
