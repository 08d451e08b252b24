//! Viewer Shop Example
//!
//! Runs bazaar against a small set of RON definitions for a few in-game
//! days: viewers buy items and trigger commands, a mod is removed between
//! sessions, and a corrupted catalog file is recovered.
//!
//! Set `RUST_LOG=debug` to see what the catalogs and the ledger do.

use bazaar_cooldown::CommandSettings;
use bazaar_core::{KarmaType, LogNotifier, SourceEnumerator, StaticSource, TICKS_PER_DAY};
use bazaar_hub::{Hub, HubConfig};
use bazaar_script::Loader;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const THINGS: &str = r#"
(
    things: [
        (
            def_name: "MealSimple",
            label: "simple meal",
            market_value: 10.0,
            graphic_path: Some("Things/Item/Meal/Simple"),
            thing_categories: ["FoodMeals"],
            ingestible: true,
            stack_limit: 10,
        ),
        (
            def_name: "Beer",
            label: "beer",
            market_value: 12.0,
            graphic_path: Some("Things/Item/Drug/Beer"),
            thing_categories: ["Drugs"],
            ingestible: true,
            stack_limit: 25,
            mod_content_pack: Some("BreweryMod"),
        ),
        (
            def_name: "Steel",
            label: "steel",
            market_value: 1.9,
            graphic_path: Some("Things/Item/Resource/Steel"),
            thing_categories: ["ResourcesRaw"],
            stack_limit: 75,
        ),
        (
            def_name: "Muffalo",
            label: "muffalo",
            market_value: 250.0,
            graphic_path: Some("Things/Pawn/Animal/Muffalo"),
            thing_categories: ["Items"],
            race: Some((class: Animal, playable: true)),
        ),
        (
            def_name: "Human",
            label: "human",
            market_value: 1750.0,
            graphic_path: Some("Things/Pawn/Humanlike"),
            race: Some((class: Humanlike, playable: true)),
        ),
        (
            def_name: "VVE_Truck",
            label: "truck",
            market_value: 900.0,
            graphic_path: Some("Things/Vehicle/Truck"),
            thing_categories: ["Items"],
        ),
        (
            def_name: "Rock",
            label: "rock",
            market_value: 0.0,
            graphic_path: Some("Things/Item/Chunk"),
            thing_categories: ["Chunks"],
        ),
    ]
)
"#;

const TRAITS: &str = r#"
(
    traits: [
        (def_name: "Kind", degrees: [(label: "kind")]),
        (
            def_name: "Nerves",
            degrees: [
                (degree: -1, label: "nervous"),
                (degree: 1, label: "steadfast"),
                (degree: 2, label: "iron-willed"),
            ],
        ),
    ]
)
"#;

const WEATHERS: &str = r#"
(
    weathers: [
        (def_name: "Clear", label: "clear", favorability: Good),
        (def_name: "Rain", label: "rain"),
        (def_name: "Flashstorm", label: "flashstorm", favorability: VeryBad),
    ]
)
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Bazaar Viewer Shop Example ===\n");

    // Host definitions
    let mut loader = Loader::new();
    loader.load_things_str(THINGS)?;
    loader.load_traits_str(TRAITS)?;
    loader.load_weathers_str(WEATHERS)?;
    let defs = loader.finish();

    // A source we can change between sessions
    let source = Arc::new(StaticSource::new());
    source.set_things(defs.things()?);
    source.set_traits(defs.traits()?);
    source.set_weathers(defs.weathers()?);

    let data = tempfile::tempdir()?;
    let config = HubConfig::default().with_data_dir(data.path());
    println!("Data directory: {}\n", data.path().display());

    // Session one
    let hub = Hub::open_dir(config.clone(), source.clone(), Arc::new(LogNotifier))?;
    hub.initialize();
    print_catalog(&hub);

    hub.update_settings(|settings| {
        settings.purchase_caps.insert("Beer".to_string(), 2);
        settings.max_bad_events = 1;
        settings.commands.insert(
            "!raid".to_string(),
            CommandSettings {
                karma_type: Some(KarmaType::Bad),
                ..CommandSettings::default()
            },
        );
    });

    println!("Simulating 4 days...\n");
    for day in 0..4 {
        hub.on_tick(day as u64 * TICKS_PER_DAY);

        for (key, quantity) in [("Beer", 3), ("MealSimple", 12), ("Steel", 1)] {
            let decision = hub.can_purchase(key, quantity, day);
            println!("  day {day}: buy {quantity} x {key:<10} -> {decision}");
            if decision.is_allowed() {
                hub.record_purchase(key, day);
            }
        }

        let allowed = hub.can_execute_command("!raid", day);
        println!("  day {day}: !raid -> {}", if allowed { "allowed" } else { "on cooldown" });
        if allowed {
            hub.record_command("!raid", day);
        }
        println!();
    }

    let snapshot = hub.ledger_snapshot()?;
    hub.shutdown()?;
    tracing::info!(bytes = snapshot.len(), "session one saved");

    // Between sessions the brewery mod is removed and a catalog file breaks
    source.remove_thing("Beer");
    std::fs::write(data.path().join("Traits.json"), "{ \"Kind\": ")?;

    println!("--- Session two (Beer's mod removed, Traits.json corrupted) ---\n");
    let hub = Hub::open_dir(config, source, Arc::new(LogNotifier))?;
    let init = hub.initialize();
    println!("Items:  {:?}", init.items);
    println!("Traits: {:?}\n", init.traits);
    hub.restore_ledger(&snapshot);
    print_catalog(&hub);

    hub.shutdown()?;
    println!("=== Example Complete ===");
    Ok(())
}

fn print_catalog(hub: &Hub) {
    println!("Store items:");
    for item in hub.items().snapshot().values() {
        println!(
            "  {:<12} {:<10} {:>5} (up to {} per purchase)",
            item.def_name,
            item.category.as_str(),
            item.base_price,
            item.resolved_quantity_limit()
        );
    }
    println!("Traits: {}", hub.traits().keys().join(", "));
    println!("Weather: {}\n", hub.weathers().keys().join(", "));
}
