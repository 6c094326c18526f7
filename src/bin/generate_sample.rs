use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Clone)]
struct Person {
    id: i64,
    age: i64,
    city: Option<&'static str>,
    score: Option<f64>,
}

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let cities = ["Lisbon", "São Paulo", "Madrid", "Boston", "Osaka"];

    let mut people: Vec<Person> = (0..40)
        .map(|id| {
            let city = match rng.below(12) {
                0 => None,
                i => Some(cities[i as usize % cities.len()]),
            };
            let score = match rng.below(10) {
                0 => None,
                _ => Some((rng.gauss(70.0, 12.0) * 10.0).round() / 10.0),
            };
            Person {
                id,
                age: 18 + rng.below(50) as i64,
                city,
                score,
            }
        })
        .collect();

    // One exact duplicate so the duplicate counter has something to find.
    people.push(people[3].clone());

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("age", DataType::Int64, false),
        Field::new("city", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from_iter_values(people.iter().map(|p| p.id))),
            Arc::new(Int64Array::from_iter_values(people.iter().map(|p| p.age))),
            Arc::new(StringArray::from_iter(people.iter().map(|p| p.city))),
            Arc::new(Float64Array::from_iter(people.iter().map(|p| p.score))),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(&output_path).expect("Failed to create output file");
    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer.write(&batch).expect("Failed to write batch");

    println!("Wrote {} rows to {output_path}", batch.num_rows());
}
