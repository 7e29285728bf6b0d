use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider before any TLS connections
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    match chain_monitor::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if !error.is_logged() {
                eprintln!("chain-monitor: {error}");
            }
            ExitCode::FAILURE
        }
    }
}
