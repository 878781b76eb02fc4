use std::env;
use std::path::PathBuf;

use clap::Parser;
use projection::FeatureCollection;
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use widgets::{
    InspectorBlock, LocalHost, PropertyPanel, VisualizerExtension, VisualizerPanel, WidgetProperty,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch CMS items and project them into a GeoJSON layer")]
struct Args {
    /// Widget property JSON (default: $CMS_WIDGET_PROPERTY)
    #[arg(long)]
    property: Option<PathBuf>,

    /// Write the FeatureCollection here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Select feature N of the layer and print its inspector panel
    #[arg(long)]
    select: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let property_path = args
        .property
        .or_else(|| env::var("CMS_WIDGET_PROPERTY").ok().map(PathBuf::from))
        .ok_or("pass --property <path> or set CMS_WIDGET_PROPERTY")?;

    let raw = tokio::fs::read_to_string(&property_path)
        .await
        .map_err(|e| format!("cannot read {}: {e}", property_path.display()))?;
    let property: WidgetProperty = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid widget property in {}: {e}", property_path.display()))?;

    let mut host = LocalHost::new(property);
    let mut visualizer = VisualizerExtension::new();
    let panel = VisualizerPanel::new(Client::new());
    host.run(&mut visualizer, &panel).await;

    let layer = host.layers().first().cloned();
    let collection = match &layer {
        Some(layer) => layer.spec.data.value.clone(),
        None => {
            warn!("No layer was added; writing an empty collection");
            FeatureCollection::default()
        }
    };

    let geojson = serde_json::to_string_pretty(&collection)?;
    match &args.out {
        Some(out) => {
            tokio::fs::write(out, geojson.as_bytes()).await?;
            info!("wrote {} features to {}", collection.len(), out.display());
        }
        None => println!("{geojson}"),
    }

    if let (Some(index), Some(layer)) = (args.select, layer) {
        let mut inspector = InspectorBlock::new();
        host.select_feature(&mut inspector, &layer.id, index);
        for message in host.take_outbox() {
            match PropertyPanel::from_message(&message) {
                Some(panel) => print!("{}", panel.render_text()),
                None => warn!("Feature {index} has no fields to inspect"),
            }
        }
    }

    Ok(())
}
