use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use wellpulse_core::pages::{format_clock, Page, PomodoroPage};
use wellpulse_core::storage::ConfigOrigin;
use wellpulse_core::timer::pomodoro::{plan, MAX_PLAN_SESSIONS};
use wellpulse_core::{AdaptiveConfig, AdaptivePlanner, AudioSession, MetricSample};

use super::shell::{Flow, Shell};
use super::{runtime, CmdResult, Context, TerminalAudio};

#[derive(Args, Default)]
pub struct PomodoroArgs {
    /// Print the schedule for this many work sessions as JSON and exit
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PLAN_SESSIONS)))]
    pub plan: Option<u32>,
    /// Derive durations from a metrics baseline instead of the backend config
    #[arg(long)]
    pub adaptive: bool,
    /// Ask the backend for durations suited to a mental state
    #[arg(long, value_name = "STATE")]
    pub recommend: Option<String>,
    /// Stop after this many seconds
    #[arg(long)]
    pub for_secs: Option<u64>,
    /// Don't poll the metrics backend
    #[arg(long)]
    pub no_metrics: bool,
}

pub fn run(args: PomodoroArgs) -> CmdResult {
    let ctx = Context::load()?;
    let audio = Arc::new(Mutex::new(
        AudioSession::new(&ctx.config.audio).with_sink(Box::new(TerminalAudio)),
    ));

    let rt = runtime()?;
    rt.block_on(async {
        let mut page = PomodoroPage::load(
            ctx.api.as_ref(),
            ctx.store.as_ref(),
            ctx.config.pomodoro.clone(),
            Arc::clone(&audio),
            ctx.config.timer.progress_interval(),
        )
        .await?;

        let mut planner = AdaptivePlanner::new(AdaptiveConfig::default());
        if args.adaptive {
            let limit = planner.config().baseline_samples;
            let now = Utc::now();
            for reading in ctx.api.metrics_history(limit).await? {
                if let Ok(sample) = reading.into_sample(now) {
                    planner.observe(&sample);
                }
            }
            match planner.recommend() {
                Some(config) => page.apply_config(config, ConfigOrigin::Adaptive)?,
                None => eprintln!(
                    "not enough metrics for a baseline ({} more needed), keeping {:?} durations",
                    planner.remaining_samples(),
                    page.config_origin()
                ),
            }
        } else if let Some(state) = args.recommend.as_deref() {
            let stress = ctx
                .api
                .current_metrics()
                .await
                .map(|m| m.stress_level)
                .unwrap_or(50.0);
            let config = ctx.api.calculate_pomodoro(state, stress).await?;
            page.apply_config(config, ConfigOrigin::Backend)?;
        }

        let config = page.timer_config();
        if let Some(sessions) = args.plan {
            let every = ctx.config.pomodoro.sessions_before_long_break;
            let steps = plan(&config, sessions, every, Utc::now());
            println!("{}", serde_json::to_string_pretty(&steps)?);
            return Ok(());
        }

        println!(
            "work {}  short {}  long {}  ({:?})",
            format_clock(config.work * 1000),
            format_clock(config.short_break * 1000),
            format_clock(config.long_break * 1000),
            page.config_origin()
        );
        println!("Enter: start/pause   r: reset   m: next music   x: mute   q: quit");

        if !args.no_metrics {
            let poller = ctx.poller();
            poller.start(ctx.config.metrics.poll_interval());
            page = page.with_metrics(poller);
        }

        let shell = Shell {
            limit: args.for_secs.map(Duration::from_secs),
            exit_on_complete: false,
        };
        shell
            .drive(
                &page,
                |page, line| {
                    let audio = move || page.audio().lock().unwrap_or_else(PoisonError::into_inner);
                    match line {
                        "q" | "quit" => return Flow::Quit,
                        "r" => page.reset(),
                        "m" => {
                            audio().cycle_next();
                        }
                        "x" => {
                            audio().toggle_mute();
                        }
                        _ => {
                            page.toggle();
                        }
                    }
                    Flow::Continue
                },
                |page| {
                    let hint = page
                        .metrics()
                        .and_then(|p| p.latest())
                        .filter(|s: &MetricSample| !planner.should_continue(s))
                        .map_or("", |_| "  (focus dropping, consider a break)");
                    format!("  #{}{hint}", page.completed())
                },
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
