//! # BarFlow Track Host Entry Point
//!
//! Starts the local data layer and runs until interrupted.
//! The setup lives in `lib.rs` so it can be tested.

#[tokio::main]
async fn main() {
    if let Err(e) = barflow_host::run().await {
        eprintln!("barflow-host: {e}");
        std::process::exit(1);
    }
}
