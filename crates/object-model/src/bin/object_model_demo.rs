//! # Object Model Demo
//!
//! Headless walkthrough of the object model: builds a small scene, drives
//! selection and edits through the same events a toolkit adapter would send,
//! and logs the resulting tree and panel state.
//!
//! ## Usage
//!
//! ```bash
//! object-model-demo
//! object-model-demo --verbose
//! object-model-demo --config object-model.toml
//! RUST_LOG=eustress_object_model=trace object-model-demo
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eustress_object_model::headless::{HeadlessActor, HeadlessModel, HeadlessPanel, HeadlessTree, HeadlessView};
use eustress_object_model::items::ALPHA_PROPERTY;
use eustress_object_model::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "object-model-demo")]
#[command(about = "Headless object model walkthrough")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => ObjectModelConfig::from_file(path).unwrap_or_else(|e| {
            warn!("{}, using defaults", e);
            ObjectModelConfig::from_env()
        }),
        None => ObjectModelConfig::from_env(),
    };

    if let Err(e) = run(config) {
        warn!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: ObjectModelConfig) -> Result<()> {
    let tree = HeadlessTree::new();
    let panel = HeadlessPanel::new();
    let mut model = ObjectModel::with_config(Box::new(tree.clone()), Box::new(panel.clone()), config);
    let view = HeadlessView::new(1);

    let robots = model.get_or_create_container("Robots", None)?;
    let backend = HeadlessModel::new("/models/atlas/atlas_v5.urdf");
    let mut atlas = ModelItem::new(Box::new(backend.clone()))?;
    atlas.add_to_view(view.shared());
    let atlas = model.add_to_object_model(Box::new(atlas), Some(robots))?;

    let sensors = model.get_or_create_container("Sensors", None)?;
    let scan = PolyData::new(4).with_array(DataArray::new("intensity", vec![0.1, 0.4, 0.9, 0.6]));
    let mut lidar = PolyDataItem::new("lidar scan", scan, Box::new(HeadlessActor::new()), Some(view.shared()))?;
    lidar.color_by(Some("intensity"), None, None);
    let lidar = model.add_to_object_model(Box::new(lidar), Some(sensors))?;

    info!(objects = model.len(), nodes = tree.node_count(), "Scene built");

    model.set_active_object(atlas)?;
    info!(fields = ?panel.names(), "Panel shows atlas");

    model.handle_panel_event(PanelEvent::ValueChanged(PanelEdit::new(ALPHA_PROPERTY, 0.5)));
    info!(
        alpha = ?model.get_property(atlas, ALPHA_PROPERTY),
        panel = ?panel.value(ALPHA_PROPERTY),
        backend_alpha = backend.alpha(),
        "Alpha edited from the panel"
    );

    if let Some(node) = model.node_for(lidar) {
        model.handle_tree_event(TreeEvent::ItemClicked {
            node,
            column: model.config().visibility_column,
        });
        info!(
            visible = ?model.get_property(lidar, VISIBLE_PROPERTY),
            icon = ?tree.icon(node, model.config().visibility_column),
            "Lidar visibility toggled"
        );
    }

    if let Some(node) = model.node_for(sensors) {
        tree.select(&[node]);
    }
    model.handle_tree_event(TreeEvent::KeyPressed(Key::Delete));
    info!(
        objects = model.len(),
        renders = view.render_count(),
        "Sensors removed with the Delete key"
    );

    Ok(())
}
