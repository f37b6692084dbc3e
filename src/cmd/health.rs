//! Backend reachability check (`adminhub health`).

use anyhow::Result;
use serde_json::Value;

use adminhub::http::RequestOptions;
use adminhub::ui::icons::CHECK;

use super::{App, completed};

pub async fn cmd_health(app: &App) -> Result<()> {
    let endpoint = app.routes.health();
    let options = RequestOptions::new().on_error("Backend unreachable", &endpoint.url);

    let outcome = {
        let _spinner = app.spinner("Contacting backend...");
        app.executor.simple_request::<Value>(&endpoint, &options).await
    };
    completed(outcome)?;

    println!("{}Backend at {} is up", CHECK, app.routes.base_url());
    Ok(())
}
