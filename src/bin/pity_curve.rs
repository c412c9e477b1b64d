//! Debug script to print the 5-star pity curves of both banners as JSON or a table

use std::env;
use warp_sim::config::GachaKind;
use warp_sim::odds::{expected_pulls_per_five_star, pity_curve};

fn main() {
    let as_json = env::args().any(|a| a == "--json");

    if as_json {
        let banners: Vec<_> = GachaKind::ALL
            .iter()
            .map(|&kind| {
                let curve: Vec<_> = pity_curve(kind)
                    .iter()
                    .map(|s| serde_json::json!({
                        "pull": s.pull,
                        "rate": s.rate,
                        "probability": s.probability,
                        "cumulative": s.cumulative,
                    }))
                    .collect();
                serde_json::json!({
                    "banner": kind.label(),
                    "expected_pulls": expected_pulls_per_five_star(kind),
                    "curve": curve,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(banners));
        return;
    }

    for kind in GachaKind::ALL {
        let profile = kind.profile();
        println!("\n=== {} BANNER ===", kind.label().to_uppercase());
        println!("  Base 5-star rate: {:.2}%", profile.rates.five_star * 100.0);
        println!("  Soft pity from pull {}", profile.pity.soft_pity_start + 1);
        println!("  Hard pity at pull {}", profile.pity.hard_pity_5);
        println!("  Expected pulls per 5-star: {:.2}", expected_pulls_per_five_star(kind));

        for step in pity_curve(kind).iter().filter(|s| s.pull > profile.pity.soft_pity_start) {
            println!(
                "  pull {:>3}: rate {:>6.2}%  cumulative {:>6.2}%",
                step.pull,
                step.rate * 100.0,
                step.cumulative * 100.0
            );
        }
    }
}
