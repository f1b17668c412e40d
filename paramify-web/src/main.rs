use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use paramify::{ParameterStore, Schema, SchemaFormat};

/// Built-in demo schema, one parameter per supported type.
const DEMO_SCHEMA: &str = r#"
parameters:
  - name: enabled
    type: bool
    default: true
    description: Master on/off switch
  - name: volume
    type: int
    default: 5
    min: 0
    max: 10
    description: Output volume
  - name: gain
    type: float
    default: 0.5
    min: 0.0
    max: 2.0
  - name: mode
    type: select
    default: auto
    choices: [auto, manual]
  - name: tags
    type: list
    default: [demo]
  - name: label
    type: str
    default: untitled
  - name: notes
    type: text
    default: ""
"#;

#[derive(Debug, Parser)]
#[command(
    name = "paramify-web",
    version,
    about = "Serve a parameter schema for remote viewing and editing"
)]
struct Args {
    /// Address to bind the HTTP service to
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
    /// Path to a JSON or YAML schema file; the built-in demo schema is used
    /// when omitted
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let schema = match &args.schema {
        Some(path) => Schema::from_path(path)?,
        None => Schema::from_document(DEMO_SCHEMA, SchemaFormat::Yaml)?,
    };
    let mut store = ParameterStore::new(schema)?;

    // Log every remote change, one hook per declared parameter.
    let names: Vec<String> = store
        .declarations()
        .iter()
        .map(|d| d.name.clone())
        .collect();
    for name in names {
        let label = name.clone();
        store.on_set(&name, move |value| {
            info!(parameter = %label, ?value, "parameter updated");
        })?;
    }

    paramify_web::serve(args.bind, paramify_web::shared(store)).await?;
    Ok(())
}
