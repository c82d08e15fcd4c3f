use anyhow::bail;
use tracing::info;

use crate::controllers::paste;
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    if !paste::health(&app.storage).await {
        bail!("storage backend is unavailable");
    }
    info!("storage backend is healthy");
    Ok(())
}
