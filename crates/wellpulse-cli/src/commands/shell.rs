//! Terminal loop shared by the page commands.
//!
//! Renders the page's timer on a single status line and feeds stdin lines to
//! the page. Exits on `q`, Ctrl-C, the optional time limit or when the
//! session completes.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use wellpulse_core::chart::sparkline;
use wellpulse_core::pages::{format_clock, Page};
use wellpulse_core::{TimerSnapshot, TimerState};

const RENDER_EVERY: Duration = Duration::from_millis(200);
const BAR_WIDTH: usize = 24;

pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    pub limit: Option<Duration>,
    /// Leave the loop once a terminal phase is reached.
    pub exit_on_complete: bool,
}

impl Shell {
    /// Run `page` against stdin until `q`, Ctrl-C, the limit or completion.
    pub async fn drive<P: Page>(
        &self,
        page: &P,
        on_input: impl FnMut(&P, &str) -> Flow,
        status: impl Fn(&P) -> String,
    ) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.drive_with(page, stdin, tokio::signal::ctrl_c(), on_input, status)
            .await
    }

    async fn drive_with<P: Page>(
        &self,
        page: &P,
        input: impl AsyncBufRead + Unpin,
        shutdown: impl Future,
        mut on_input: impl FnMut(&P, &str) -> Flow,
        status: impl Fn(&P) -> String,
    ) -> std::io::Result<()> {
        let mut lines = input.lines();
        let mut stdin_open = true;
        tokio::pin!(shutdown);
        let mut render = tokio::time::interval(RENDER_EVERY);
        let deadline = self.limit.map(|d| Instant::now() + d);
        let limit = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(limit);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = &mut limit => break,
                line = lines.next_line(), if stdin_open => match line? {
                    Some(line) => {
                        if let Flow::Quit = on_input(page, line.trim()) {
                            break;
                        }
                    }
                    None => stdin_open = false,
                },
                _ = render.tick() => {
                    let Some(snap) = page.snapshot() else { break };
                    draw(&snap, &status(page), page)?;
                    if self.exit_on_complete && snap.state == TimerState::Completed {
                        break;
                    }
                }
            }
        }
        page.stop();
        println!();
        Ok(())
    }
}

fn draw<P: Page>(snap: &TimerSnapshot, extra: &str, page: &P) -> std::io::Result<()> {
    let filled = ((snap.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let state = match snap.state {
        TimerState::Running => "",
        TimerState::Idle => " [idle]",
        TimerState::Stopped => " [paused]",
        TimerState::Completed => " [done]",
    };
    let metrics = page
        .metrics()
        .map(|p| {
            let history = p.history();
            let focus: Vec<f64> = history.iter().map(|s| s.focus_level).collect();
            match history.latest() {
                Some(s) => format!(
                    "  stress {:>3.0} focus {:>3.0} {}",
                    s.stress_level,
                    s.focus_level,
                    sparkline(&focus, 12)
                ),
                None => "  metrics: waiting".to_string(),
            }
        })
        .unwrap_or_default();

    let mut out = std::io::stdout().lock();
    write!(
        out,
        "\r\x1b[2K{:<22} {bar} {}{state}{extra}{metrics}",
        snap.title,
        format_clock(snap.remaining_ms)
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use wellpulse_core::{BreathingPattern, StressPage};

    fn page() -> StressPage {
        StressPage::new(BreathingPattern::box_breathing(), Duration::from_millis(50)).unwrap()
    }

    fn shell() -> Shell {
        Shell {
            limit: Some(Duration::from_secs(60)),
            exit_on_complete: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_sent_before_the_loop_is_honored() {
        let page = page();
        page.start();
        let (tx, rx) = oneshot::channel::<()>();
        tx.send(()).unwrap();

        let started = Instant::now();
        shell()
            .drive_with(&page, &b""[..], rx, |_, _| Flow::Continue, |_| String::new())
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!page.session().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn quit_line_ends_the_loop() {
        let page = page();
        page.start();
        let (_tx, rx) = oneshot::channel::<()>();
        let mut seen = Vec::new();

        let started = Instant::now();
        shell()
            .drive_with(
                &page,
                &b"\nq\n"[..],
                rx,
                |_, line| {
                    seen.push(line.to_string());
                    if line == "q" {
                        Flow::Quit
                    } else {
                        Flow::Continue
                    }
                },
                |_| String::new(),
            )
            .await
            .unwrap();
        assert_eq!(seen, ["", "q"]);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!page.session().is_active());
    }
}
