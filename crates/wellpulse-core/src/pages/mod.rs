//! Page controllers behind the navigation shell.
//!
//! Each page owns its timer session (and optionally a metrics poller);
//! dropping the page tears down every task it started.

mod concentration;
mod home;
mod pomodoro;
mod route;
mod stress;

pub use concentration::ConcentrationPage;
pub use home::{CardStatus, HomePage, ModuleCard};
pub use pomodoro::PomodoroPage;
pub use route::Route;
pub use stress::{Exercise, StressPage};

use crate::metrics::MetricsPoller;
use crate::timer::TimerSnapshot;

/// What the shell needs from any page.
pub trait Page {
    fn route(&self) -> Route;

    fn start(&self) {}

    fn stop(&self) {}

    /// Current timer view, for pages that have one.
    fn snapshot(&self) -> Option<TimerSnapshot> {
        None
    }

    fn metrics(&self) -> Option<&MetricsPoller> {
        None
    }
}

/// `MM:SS`, rounding partial seconds up so a fresh phase shows its full length.
pub fn format_clock(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
