use wellpulse_core::Route;

use super::concentration::{self, ConcentrationArgs};
use super::pomodoro::{self, PomodoroArgs};
use super::stress::{self, StressArgs};
use super::{home, CmdResult};

pub fn show(fragment: &str) -> CmdResult {
    let route = Route::from_fragment(fragment);
    println!("{route}");
    Ok(())
}

/// Run the page behind `fragment` with default options.
pub fn open(fragment: &str) -> CmdResult {
    let route = Route::from_fragment(fragment);
    tracing::debug!(%route, fragment, "opening page");
    match route {
        Route::Home => home::run(false),
        Route::Stress => stress::run(StressArgs::default()),
        Route::Pomodoro => pomodoro::run(PomodoroArgs::default()),
        Route::Concentration => concentration::run(ConcentrationArgs::default()),
    }
}
