use anyhow::Context;
use atlas::kernel::decision::ActionId;
use atlas::kernel::event::Event;
use atlas::kernel::reactor::Reactor;
use atlas::kernel::scheduler::SideEffect;
use atlas::kernel::time::SystemClock;
use atlas::CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Internal driver commands (never reach the kernel)
enum DriverCommand {
    Status,
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let mut config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(&path)?,
        None => CoreConfig::default(),
    };
    config.apply_env()?;

    tracing::info!("Atlas core booting...");

    let clock = Arc::new(SystemClock::new());
    let (tx, mut reactor) = Reactor::channel(&config, clock);
    let (driver_tx, mut driver_rx) = mpsc::channel(16);

    spawn_console(tx.clone(), driver_tx);

    // Executor state
    let mut running: HashMap<ActionId, JoinHandle<()>> = HashMap::new();

    let mut cadence = tokio::time::interval(Duration::from_millis(config.tick_ms));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!("Atlas core active. Type 'help' for commands, Ctrl+C to stop.");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = cadence.tick() => {}
            _ = &mut shutdown => break,
        }

        while let Ok(cmd) = driver_rx.try_recv() {
            match cmd {
                DriverCommand::Status => println!("{}", serde_json::to_string_pretty(&reactor.status())?),
                DriverCommand::Quit => {
                    for (_, task) in running.drain() {
                        task.abort();
                    }
                    tracing::info!("Atlas core stopped.");
                    return Ok(());
                }
            }
        }

        for effect in reactor.run_tick() {
            match effect {
                SideEffect::Execute(action) => {
                    println!("[{}] {}", action.action_type, action.text().unwrap_or_default());
                    running.insert(action.id, simulate(tx.clone(), action.id, action.expected_runtime()));
                }
                SideEffect::Preempt { displaced, action } => {
                    if let Some(task) = displaced.and_then(|id| running.remove(&id)) {
                        task.abort();
                    }
                    println!("[{}!] {}", action.action_type, action.text().unwrap_or_default());
                    running.insert(action.id, simulate(tx.clone(), action.id, action.expected_runtime()));
                }
                SideEffect::StateChanged { from, to } => println!("[state] {} -> {}", from, to),
            }
        }

        running.retain(|_, task| !task.is_finished());
    }

    tracing::info!("Atlas core stopped.");
    Ok(())
}

/// Pretend to execute an action, then report completion.
fn simulate(tx: mpsc::Sender<Event>, id: ActionId, runtime: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(runtime).await;
        if let Err(e) = tx.send(Event::ActionCompleted(id)).await {
            tracing::error!("Failed to report completion: {}", e);
        }
    })
}

fn spawn_console(tx: mpsc::Sender<Event>, driver_tx: mpsc::Sender<DriverCommand>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            let command = match line {
                "" => continue,
                "help" => {
                    println!("events:  speech_detected | speech_end | thinking | response_ready | speaking_done | alert | error ... [priority 0-3]");
                    println!("input:   intent <name> [key=value ...] | sentiment <positive|negative|neutral>");
                    println!("emotion: trigger <positive|negative|surprise|confusion> [intensity]");
                    println!("other:   reset | status | quit");
                    continue;
                }
                "status" => Some(DriverCommand::Status),
                "quit" => Some(DriverCommand::Quit),
                _ => None,
            };

            if let Some(command) = command {
                if driver_tx.send(command).await.is_err() {
                    break;
                }
                continue;
            }

            match Event::parse_command(line) {
                Ok(event) => {
                    tracing::debug!("Console input dispatched: '{}'", line);
                    if let Err(e) = tx.send(event).await {
                        tracing::error!("Failed to send input: {}", e);
                        break;
                    }
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }
    });
}
