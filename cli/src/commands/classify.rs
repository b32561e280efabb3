use color_eyre::eyre::{eyre, Result};
use droplet_rates::{extract_domain, match_entry, normalize_host, water_for_energy, DEFAULT_RATE};

pub fn run(target: &str) -> Result<()> {
    let domain = resolve_domain(target)
        .ok_or_else(|| eyre!("'{}' has no domain to classify", target))?;

    let (matched, rate) = match match_entry(&domain) {
        Some((key, rate)) => (key, rate),
        None => ("(default)", &DEFAULT_RATE),
    };

    println!("Domain:   {}", domain);
    println!("Matched:  {}", matched);
    println!("Name:     {}", rate.display_name);
    println!("Energy:   {} kWh per {}", rate.energy_per_unit, rate.unit);
    println!(
        "Water:    {} gal per {}",
        water_for_energy(rate.energy_per_unit),
        rate.unit
    );
    Ok(())
}

/// Accepts either a full URL or a bare hostname.
fn resolve_domain(target: &str) -> Option<String> {
    if target.contains("://") {
        return extract_domain(target);
    }
    let domain = normalize_host(target);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}
