use std::time::Duration;

use clap::Args;
use wellpulse_core::chart::{chart_points, render_sparklines};
use wellpulse_core::{MetricsPoller, PollerStatus};

use super::{runtime, CmdResult, Context};

#[derive(Args)]
pub struct MetricsArgs {
    /// Keep polling and redraw until Ctrl-C
    #[arg(long)]
    pub watch: bool,
    /// Seed an empty history with this many recent readings first
    #[arg(long)]
    pub backfill: Option<usize>,
    /// Sparkline width
    #[arg(long, default_value_t = 40)]
    pub width: usize,
    /// Print chart points as JSON
    #[arg(long)]
    pub json: bool,
    /// Stop watching after this many seconds
    #[arg(long)]
    pub for_secs: Option<u64>,
}

pub fn run(args: MetricsArgs) -> CmdResult {
    let ctx = Context::load()?;
    let rt = runtime()?;
    rt.block_on(async {
        let poller = ctx.poller();
        if let Some(limit) = args.backfill {
            match poller.backfill(limit).await {
                Ok(n) => tracing::info!(added = n, "history backfilled"),
                Err(e) => tracing::warn!(error = %e, "backfill failed"),
            }
        }

        if !args.watch {
            poller.poll_once().await;
            print(&poller, &args)?;
            return match poller.status() {
                PollerStatus::Unavailable(message) => Err(message.into()),
                PollerStatus::Loading | PollerStatus::Ready => Ok(()),
            };
        }

        let mut updates = poller.watch();
        poller.start(ctx.config.metrics.poll_interval());
        let limit = async {
            match args.for_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(limit, ctrl_c);
        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = &mut limit => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    print(&poller, &args)?;
                }
            }
        }
        poller.stop();
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

fn print(poller: &MetricsPoller, args: &MetricsArgs) -> CmdResult {
    let history = poller.history();
    if args.json {
        println!("{}", serde_json::to_string(&chart_points(&history))?);
        return Ok(());
    }
    match poller.status() {
        PollerStatus::Loading => println!("loading..."),
        PollerStatus::Unavailable(message) => println!("metrics unavailable: {message}"),
        PollerStatus::Ready => {
            for row in render_sparklines(&history, args.width) {
                println!("{row}");
            }
            println!();
        }
    }
    Ok(())
}
