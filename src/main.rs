#[macro_use]
extern crate log;

mod config;
mod decoration;
mod drag;
mod focus;
mod geometry;
mod rdwm;
mod registry;
mod session;

use chrono::Local;
use config::Config;
use rdwm::Rdwm;
use std::io::Write;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    info!("Starting logger OK");

    let config = Config::load();

    let mut rdwm = match Rdwm::new(&config) {
        Some(rdwm) => rdwm,
        None => {
            error!("Could not connect to display server");
            std::process::exit(1);
        }
    };
    info!("Connected to display server OK");

    if !rdwm.claim_redirection() {
        error!("Another window manager is already running");
        std::process::exit(1);
    }
    info!("Claimed substructure redirection OK");

    rdwm.paint_desktop();
    rdwm.reconcile_existing_windows();

    info!("Entering event loop");
    rdwm.run();
}

/// `MM/dd/yyyy HH:mm:ss tt LEVEL message` on stdout.
fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                Local::now().format("%m/%d/%Y %I:%M:%S %p"),
                record.level(),
                record.args()
            )
        })
        .init();
}
