use paramify::{ParameterStore, Schema, SchemaFormat};

const SCHEMA: &str = r#"
parameters:
  - name: volume
    type: int
    default: 5
    min: 0
    max: 10
  - name: mode
    type: select
    default: auto
    choices: [auto, manual]
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::from_document(SCHEMA, SchemaFormat::Yaml)?;
    let mut store = ParameterStore::new(schema)?;

    store.on_set("volume", |value| println!("volume changed to {value:?}"))?;

    store.set("volume", 7)?;
    match store.set("volume", 11) {
        Ok(()) => unreachable!(),
        Err(e) => println!("rejected: {e}"),
    }

    println!("snapshot: {}", store.snapshot_json());
    Ok(())
}
