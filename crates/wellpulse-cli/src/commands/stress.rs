use std::time::Duration;

use clap::Args;
use wellpulse_core::pages::{Exercise, Page, StressPage};
use wellpulse_core::{BreathingPattern, Transition};

use super::shell::{Flow, Shell};
use super::{runtime, CmdResult, Context};

#[derive(Args, Default)]
pub struct StressArgs {
    /// Exercise to run: "breathing" or "sleep"
    #[arg(long, default_value = "breathing")]
    pub exercise: String,
    /// Breathing pattern: "box", "4-7-8" or "coherence" (config default if omitted)
    #[arg(long)]
    pub pattern: Option<String>,
    /// Seconds of 3-2-1 countdown before the first inhale
    #[arg(long)]
    pub countdown: Option<u32>,
    /// Stop after this many seconds
    #[arg(long)]
    pub for_secs: Option<u64>,
    /// Print the phase list as JSON and exit
    #[arg(long)]
    pub phases: bool,
    /// Don't poll the metrics backend
    #[arg(long)]
    pub no_metrics: bool,
}

pub fn run(args: StressArgs) -> CmdResult {
    let ctx = Context::load()?;
    let exercise = if args.exercise.is_empty() {
        Exercise::Breathing
    } else {
        Exercise::from_name(&args.exercise)
            .ok_or_else(|| format!("unknown exercise: {}", args.exercise))?
    };
    let pattern_name = args
        .pattern
        .clone()
        .unwrap_or_else(|| ctx.config.timer.breathing_pattern.clone());
    let pattern = BreathingPattern::preset(&pattern_name)
        .ok_or_else(|| format!("unknown breathing pattern: {pattern_name}"))?
        .with_countdown(args.countdown.unwrap_or(ctx.config.timer.countdown_secs));

    let rt = runtime()?;
    rt.block_on(async {
        let mut page = StressPage::new(pattern, ctx.config.timer.progress_interval())?;
        page.select(exercise)?;

        if args.phases {
            let phases = page.session().with_transition(|seq| seq.phases().to_vec());
            println!("{}", serde_json::to_string_pretty(&phases)?);
            return Ok(());
        }

        if !args.no_metrics {
            let poller = ctx.poller();
            poller.start(ctx.config.metrics.poll_interval());
            page = page.with_metrics(poller);
        }

        println!("Enter: start/pause   q: quit");
        page.start();
        let shell = Shell {
            limit: args.for_secs.map(Duration::from_secs),
            exit_on_complete: exercise == Exercise::Sleep,
        };
        shell
            .drive(
                &page,
                |page, line| match line {
                    "q" | "quit" => Flow::Quit,
                    _ => {
                        if page.session().is_active() {
                            page.stop();
                        } else {
                            page.start();
                        }
                        Flow::Continue
                    }
                },
                |page| format!("  {}", page.prompt().1),
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
