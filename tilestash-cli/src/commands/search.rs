//! Search command - look up a place by name.

use console::style;
use tilestash::MapSession;

use crate::error::CliError;

/// Geocode `query` and print what was found.
pub fn run(session: &mut MapSession, query: &str) -> Result<(), CliError> {
    let place = session.search(query)?;

    println!("{}", style(&place.address).bold());
    println!("  Position: {:.5}, {:.5}", place.lat, place.lon);
    println!("  Kind:     {}", place.kind);
    println!("  Bounds:   {}", place.bbox);
    if place.is_city() {
        println!();
        println!("Download it with: tilestash download city \"{}\"", query);
    }
    Ok(())
}
