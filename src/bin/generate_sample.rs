use anyhow::{Context, Result};

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

/// Write `sample_sales.csv`: a small retail table with a few holes in it, for
/// trying out imputation and groupby charts.
fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let categories = ["Furniture", "Office Supplies", "Technology"];
    let segments = ["Consumer", "Corporate", "Home Office"];
    let base_price = [("Furniture", 350.0), ("Office Supplies", 40.0), ("Technology", 600.0)];

    let output_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["order_id", "region", "category", "segment", "year", "quantity", "sales"])?;

    let rows = 200;
    let mut holes = 0;
    for order_id in 1..=rows {
        let region = rng.pick(&regions);
        let category = rng.pick(&categories);
        let segment = rng.pick(&segments);
        let year = 2020 + (rng.next_u64() % 4);
        let quantity = 1 + (rng.next_u64() % 9);
        let price = base_price
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(100.0, |(_, p)| *p);
        let sales = (price * quantity as f64 * rng.gauss(1.0, 0.15).max(0.2) * 100.0).round() / 100.0;

        // ~5% of cells in the value columns are left empty
        let mut maybe = |v: String| {
            if rng.next_f64() < 0.05 {
                holes += 1;
                String::new()
            } else {
                v
            }
        };
        let quantity = maybe(quantity.to_string());
        let sales = maybe(sales.to_string());
        let segment = maybe(segment.to_string());

        writer.write_record([
            order_id.to_string(),
            region.to_string(),
            category.to_string(),
            segment,
            year.to_string(),
            quantity,
            sales,
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} orders ({holes} missing cells) to {output_path}");
    Ok(())
}
