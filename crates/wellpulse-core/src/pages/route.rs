use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level screens reachable from the navigation shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    #[default]
    Home,
    Stress,
    Pomodoro,
    Concentration,
}

impl Route {
    pub const ALL: [Route; 4] = [Self::Home, Self::Stress, Self::Pomodoro, Self::Concentration];

    /// Parse a location fragment such as `#/stress`. Unknown input is home.
    ///
    /// ```
    /// use wellpulse_core::pages::Route;
    /// assert_eq!(Route::from_fragment("#/Pomodoro"), Route::Pomodoro);
    /// assert_eq!(Route::from_fragment("#/settings"), Route::Home);
    /// ```
    pub fn from_fragment(fragment: &str) -> Self {
        let name = fragment
            .trim()
            .trim_start_matches('#')
            .trim_matches('/')
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Stress => "stress",
            Self::Pomodoro => "pomodoro",
            Self::Concentration => "concentration",
        }
    }

    pub fn fragment(self) -> String {
        format!("#/{}", self.as_str())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
