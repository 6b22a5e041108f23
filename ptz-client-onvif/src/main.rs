use anyhow::Result;
use clap::Parser;
use ptz_client_onvif::{
    cli::{self, Mode},
    config::{BurstPolicy, Target},
    onvif_camera::OnvifCamera,
    ptz_input, ptz_menu,
    ptz_session::{self, Session},
};
use ptz_core::PtzController;
use std::io::Write;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = cli::Args::parse();
    let target = Target::from_args(&args)?;
    let policy = BurstPolicy::from_args(&args)?;
    log::info!(
        "connecting to {} (mode={}, speed={:.2}, burst={}ms)",
        target.display_name(),
        args.mode,
        policy.speed,
        policy.duration.as_millis()
    );

    let camera = OnvifCamera::initialize(target).await?;
    let controller = PtzController::connect(camera).await;
    let cancel = CancellationToken::new();
    let session = Session::new(&controller, policy, cancel.clone());
    ptz_session::cancel_on_interrupt(tokio::signal::ctrl_c(), cancel.clone());

    match args.mode {
        Mode::Keyboard => {
            let (tx, rx) = mpsc::channel(16);
            let input = ptz_input::spawn_input_loop(tx, cancel);
            session.run(rx).await;
            if input.join().is_err() {
                log::warn!("keyboard thread panicked");
            }
        }
        Mode::Menu => ptz_menu::run(&session).await?,
    }
    Ok(())
}

fn init_logger() {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .init();
}
