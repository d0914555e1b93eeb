//! Demo: drive the process engine end to end.
//!
//! Runs a short shell script while two subscribers watch the live stream,
//! then talks to an interactive `cat` over the input channel, then shuts
//! the engine down.

use tether_core::{LaunchMode, ProcessSupervisor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stream_demo=info,tether_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Tether Demo: live output streaming");
    println!("==================================\n");

    let engine = ProcessSupervisor::default();

    // Two independent subscribers; both see the same sequence.
    let mut first = engine.subscribe();
    let mut second = engine.subscribe();
    let printer_a = tokio::spawn(async move {
        while let Some(line) = first.recv().await {
            let channel = if line.is_stdout { "out" } else { "err" };
            println!("[a:{channel}] {line}");
        }
    });
    let printer_b = tokio::spawn(async move {
        while let Some(line) = second.recv().await {
            let channel = if line.is_stdout { "out" } else { "err" };
            println!("[b:{channel}] {line}");
        }
    });

    if !engine.is_command_available("sh").await? {
        anyhow::bail!("no `sh` on this system; nothing to demo");
    }

    let record = engine
        .execute_and_wait(
            "sh",
            vec![
                "-c".to_string(),
                "echo hello from the child; echo and this is stderr >&2".to_string(),
            ],
            None,
        )
        .await?;
    println!(
        "\nscript finished: state={} exit_code={:?}\n",
        record.state, record.exit_code
    );

    // Interactive round trip through cat.
    engine
        .start("cat", vec![], None, LaunchMode::Interactive)
        .await?;
    // The spawn itself is asynchronous; wait for the pid to show up.
    while engine
        .current_record()
        .is_none_or(|r| r.pid == 0 && !r.is_terminal())
    {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    engine.send_input("ping\n").await?;
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    engine.stop(true).await?;

    if let Some(record) = engine.current_record() {
        println!(
            "\ncat stopped: state={} exit_code={:?}",
            record.state, record.exit_code
        );
    }

    engine.shutdown().await;
    printer_a.await?;
    printer_b.await?;

    println!("\ndone");
    Ok(())
}
