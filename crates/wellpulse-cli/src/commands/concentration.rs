use std::time::Duration;

use clap::Args;
use wellpulse_core::pages::{ConcentrationPage, Page};
use wellpulse_core::timer::MatchOutcome;

use super::shell::{Flow, Shell};
use super::{runtime, CmdResult, Context};

#[derive(Args, Default)]
pub struct ConcentrationArgs {
    /// Seed the color picks for a reproducible game
    #[arg(long)]
    pub seed: Option<u64>,
    /// Stop after this many seconds
    #[arg(long)]
    pub for_secs: Option<u64>,
    /// Don't poll the metrics backend
    #[arg(long)]
    pub no_metrics: bool,
}

pub fn run(args: ConcentrationArgs) -> CmdResult {
    let ctx = Context::load()?;
    let rt = runtime()?;
    rt.block_on(async {
        let interval = ctx.config.timer.progress_interval();
        let mut page = match args.seed {
            Some(seed) => {
                let game = wellpulse_core::ReflexGame::seeded(ctx.config.reflex.clone(), seed)?;
                ConcentrationPage::with_game(game, interval)?
            }
            None => ConcentrationPage::new(ctx.config.reflex.clone(), interval)?,
        };
        if !args.no_metrics {
            let poller = ctx.poller();
            poller.start(ctx.config.metrics.poll_interval());
            page = page.with_metrics(poller);
        }

        println!("Press Enter when the shown color matches the target.   s: start/stop   q: quit");
        page.start();
        let shell = Shell {
            limit: args.for_secs.map(Duration::from_secs),
            exit_on_complete: false,
        };
        shell
            .drive(
                &page,
                |page, line| {
                    match line {
                        "q" | "quit" => return Flow::Quit,
                        "s" => {
                            if page.session().is_active() {
                                page.stop();
                            } else {
                                page.start();
                            }
                        }
                        _ => match page.signal() {
                            Some(MatchOutcome::Hit { reaction_ms, score }) => {
                                println!("\nHit! {reaction_ms} ms (score {score})");
                            }
                            Some(MatchOutcome::Miss) => println!("\nNot yet, wait for the target."),
                            None => println!("\nPress s to start."),
                        },
                    }
                    Flow::Continue
                },
                |page| {
                    format!(
                        "  shown {:<7} target {:<7} score {}",
                        page.current_color(),
                        page.target_color(),
                        page.score()
                    )
                },
            )
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
