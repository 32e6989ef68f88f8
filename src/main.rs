use std::sync::Arc;

use anyhow::{Context, bail};
use kyc_wizard::WizardConfig;
use kyc_wizard::backend::{HttpBackend, KycBackend};
use kyc_wizard::verification::{CameraDevice, UnavailableCamera};
use kyc_wizard::wizard::{WizardController, WizardStep};

const USAGE: &str = "usage: kyc-wizard <application-id> [--summary]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut application_id = None;
    let mut want_summary = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--summary" => want_summary = true,
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                return Ok(());
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag}\n{USAGE}"),
            _ if application_id.is_some() => bail!("unexpected argument {arg}\n{USAGE}"),
            _ => application_id = Some(arg),
        }
    }
    let Some(application_id) = application_id else {
        bail!(USAGE);
    };

    let config = WizardConfig::from_env().context("invalid configuration")?;
    eprintln!("KYC Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);

    let backend: Arc<dyn KycBackend> = Arc::new(HttpBackend::from_config(&config));
    // No capture device on the command line; liveness needs an embedding UI.
    let camera: Arc<dyn CameraDevice> = Arc::new(UnavailableCamera);
    let mut wizard = WizardController::load(&application_id, backend, camera, &config).await;

    for notice in wizard.notices().history() {
        eprintln!("   {}", notice.message);
    }
    if wizard.step() == WizardStep::Invalid {
        bail!("application {application_id} could not be loaded");
    }

    println!("{}", serde_json::to_string_pretty(&wizard.view())?);

    if want_summary {
        let bytes = wizard.download_summary().await?;
        let path = format!("KYC_{application_id}.pdf");
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {path}"))?;
        eprintln!("   Summary written to {path}");
    }
    Ok(())
}
