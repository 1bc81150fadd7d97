use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_targets.csv".to_string());
    let mut rng = SimpleRng::new(42);

    // (issuer, bias of the target over the price)
    let issuers = [
        ("JPMorgan", 0.25),
        ("Goldman Sachs", 0.15),
        ("Citi", 0.30),
        ("Morgan Stanley", -0.05),
        ("Barclays", 0.10),
        ("Mizuho", 0.40),
        ("Bernstein", -0.15),
    ];
    let ratings = ["Buy", "Overweight", "Neutral", "Hold", "Underweight"];
    let notes = [
        "initiated coverage",
        "raised after earnings",
        "cut on rate outlook",
        "reiterate",
        "USDC circulation growth",
        "valuation stretched",
        "",
    ];

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    // Padded header on purpose: the loader trims column names.
    writer.write_record([" Date", "Issuer ", "Rating", " Target ", "Actual_Price", "Note"])?;

    let start = NaiveDate::from_ymd_opt(2025, 6, 5).context("invalid start date")?;
    let mut price = 31.0_f64;
    let mut rows = 0usize;

    for week in 0..30 {
        price = (price * (1.0 + rng.gauss(0.01, 0.08))).max(1.0);
        let date = start + Duration::weeks(week);

        for &(issuer, bias) in &issuers {
            // Each issuer publishes roughly every third week.
            if rng.next_f64() > 0.35 {
                continue;
            }
            let target = price * (1.0 + rng.gauss(bias, 0.1));
            // A few blank / malformed cells, as typed by hand into the sheet.
            let target_cell = match rng.next_u64() % 20 {
                0 => String::new(),
                1 => "TBD".to_string(),
                _ => format!("{target:.2}"),
            };
            let price_cell = if rng.next_u64() % 25 == 0 {
                String::new()
            } else {
                format!("{price:.2}")
            };

            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                issuer.to_string(),
                rng.pick(&ratings).to_string(),
                target_cell,
                price_cell,
                rng.pick(&notes).to_string(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {rows} analyst targets ({} issuers) to {output_path}", issuers.len());
    Ok(())
}
