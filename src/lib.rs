#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LayoutConfig, load_config};
pub use error::{Error, Result};
pub use ir::{Edge, Node, NodeKind, Workflow};
pub use layout::{Layout, NodeLayout, compute_layout};
pub use layout_dump::{LayoutDump, write_layout_dump};

/// Parses a workflow and config override from JSON and returns the laid-out workflow as JSON.
pub fn layout_json(workflow_json: &str, config_json: Option<&str>, pretty: bool) -> Result<String> {
    let workflow = Workflow::from_json(workflow_json)?;
    let mut config = LayoutConfig::default();
    if let Some(overrides) = config_json {
        config.apply_json(overrides)?;
    }
    let layout = compute_layout(&workflow, &config);
    LayoutDump::from_layout(&layout, &workflow).to_json(pretty)
}
