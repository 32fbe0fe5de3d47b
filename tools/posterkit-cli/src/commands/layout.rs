//! Print the generated layer list as JSON.

use posterkit_common::config::AppConfig;

use super::SessionArgs;

pub fn run(config: &AppConfig, args: SessionArgs) -> anyhow::Result<()> {
    let session = super::build_session(config, &args)?;
    let hidden: Vec<&str> = session.mask().hidden_keys().map(|k| k.as_str()).collect();

    let report = serde_json::json!({
        "canvas": session.canvas(),
        "template": session.template(),
        "frame": session.active_frame().map(|f| f.id.as_str()),
        "hidden": hidden,
        "layers": session.layers(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
