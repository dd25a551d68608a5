use lbsky::{
    Res,
    config::{self, Config},
    cycle::LiveCheckCycle,
    error, info,
    scheduler::Scheduler,
    success,
};

async fn run() -> Res<()> {
    let config = Config::from_env()?;

    info!("========== lbsky starting ==========");
    info!("ListenBrainz user: {}", config.listenbrainz_user);
    info!("Bluesky handle: {}", config.bluesky_handle);
    info!("Interval: {} seconds", config.check_interval.as_secs());
    info!("Ledger: {}", config.ledger_path.display());

    let cycle = LiveCheckCycle::from_config(&config)?;
    let stats = Scheduler::new(cycle, config.check_interval).run().await;

    success!(
        "Stopped after {} checks: {} posted, {} skipped, {} failed.",
        stats.cycles,
        stats.posted,
        stats.skipped,
        stats.failed
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    config::load_env().await;

    if let Err(e) = run().await {
        error!("Cannot start: {}", e);
    }
}
