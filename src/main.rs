use lunaplan::site::config::PlannerConfig;
use lunaplan::site::feedback::Severity;
use lunaplan::Session;

/// Usage: `lunaplan [zone-id] [module-type...]`
///
/// Opens a blueprint at the given landing zone, places the listed modules
/// and prints the viability panel.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let zone_id: u32 = match args.first() {
        Some(arg) => arg.parse().map_err(|_| format!("zone id must be a positive integer, got {arg}"))?,
        None => 1,
    };
    let kinds: Vec<&str> = if args.len() > 1 {
        args[1..].iter().map(String::as_str).collect()
    } else {
        vec!["habitat", "power", "isru"]
    };

    let mut session = Session::new(PlannerConfig::load())?;
    let zone = session.select_zone(zone_id)?.zone.clone();
    println!("{} (solar {}%, water {}, terrain {})", zone.name, zone.solar, zone.water, zone.terrain);
    println!("  {}", zone.details);

    for kind in kinds {
        match session.place_new_module(kind) {
            Ok(placed) => {
                let center = session
                    .layout()
                    .center_of(placed.module)
                    .unwrap_or_default();
                println!("placed {kind} at ({:.0}, {:.0})", center.x, center.y);
                if let Some(ring) = placed.closed_ring.and_then(|r| session.layout().ring(r)) {
                    println!("  closed {}", ring.label());
                }
            }
            Err(e) => eprintln!("could not place {kind}: {e}"),
        }
    }

    println!();
    println!("Viability analysis");
    let feedback = session.feedback();
    if feedback.is_empty() {
        println!("  Add modules to start the analysis...");
    }
    for message in feedback {
        let tag = match message.severity {
            Severity::Good => "ok",
            Severity::Warn => "warn",
            Severity::Danger => "DANGER",
        };
        println!("  [{tag}] {}", message.text);
    }
    Ok(())
}
