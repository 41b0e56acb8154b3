#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]

use plotters::prelude::*;
use probing_pqueue::{KeyNotFound, ProbingMap};
use rand::Rng;

// Live keys at the final checkpoint
const MAX_KEYS: usize = 200_000;
const NUM_CHECKPOINTS: usize = 10;
// Fraction of live keys removed and replaced before each churn sample
const CHURN_FRACTION: f64 = 0.25;

const WORKLOADS: [&str; 2] = ["Insert only", "Tombstone churn"];

const FONT_FAMILY: &str = "sans-serif";
const COLORS: [RGBColor; 2] = [
    RGBColor(220, 50, 50), // Bright red
    RGBColor(50, 90, 220), // Bright blue
];

struct ProbeSample {
    live: usize,
    capacity: usize,
    average: f64,
    worst: usize,
}

// Measure the probe length of every live key
fn sample(map: &ProbingMap<u64, u64>) -> ProbeSample {
    let lengths: Vec<usize> = map.keys().filter_map(|key| map.probe_length(key)).collect();
    let average = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    };

    ProbeSample {
        live: map.len(),
        capacity: map.capacity(),
        average,
        worst: lengths.iter().copied().max().unwrap_or(0),
    }
}

// Insert fresh random keys until `map` holds `target` entries
fn fill(map: &mut ProbingMap<u64, u64>, live: &mut Vec<u64>, target: usize, rng: &mut impl Rng) {
    while map.len() < target {
        let key = rng.random::<u64>();
        if map.put(key, key).is_none() {
            live.push(key);
        }
    }
}

// Remove random live keys and replace them with new ones, leaving tombstones behind
fn churn(
    map: &mut ProbingMap<u64, u64>,
    live: &mut Vec<u64>,
    rng: &mut impl Rng,
) -> Result<(), KeyNotFound> {
    let rounds = (live.len() as f64 * CHURN_FRACTION) as usize;
    for _ in 0..rounds {
        let victim = live.swap_remove(rng.random_range(0..live.len()));
        map.remove(&victim)?;
    }
    let target = map.len() + rounds;
    fill(map, live, target, rng);
    Ok(())
}

fn draw_chart(
    path: &str,
    caption: &str,
    y_desc: &str,
    series: &[Vec<(usize, f64)>],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = series
        .iter()
        .flat_map(|points| points.iter().map(|&(_, y)| y))
        .fold(1.0, f64::max) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..MAX_KEYS, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Live Keys")
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    for (workload_idx, points) in series.iter().enumerate() {
        let color = COLORS[workload_idx % COLORS.len()];
        let line_style = ShapeStyle::from(&color).stroke_width(2);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), line_style))?
            .label(WORKLOADS[workload_idx])
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(points.iter().map(|&point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let checkpoints: Vec<usize> =
        (1..=NUM_CHECKPOINTS).map(|i| MAX_KEYS * i / NUM_CHECKPOINTS).collect();
    println!("Checkpoints (live keys): {:?}", checkpoints);

    let mut average_probes: Vec<Vec<(usize, f64)>> = vec![Vec::new(); WORKLOADS.len()];
    let mut worst_probes: Vec<Vec<(usize, f64)>> = vec![Vec::new(); WORKLOADS.len()];

    let mut rng = rand::rng();

    for (workload_idx, &workload) in WORKLOADS.iter().enumerate() {
        println!("Running workload: {}", workload);

        let mut map = ProbingMap::new();
        let mut live = Vec::with_capacity(MAX_KEYS);

        for &target in &checkpoints {
            fill(&mut map, &mut live, target, &mut rng);
            if workload_idx == 1 {
                churn(&mut map, &mut live, &mut rng)?;
            }

            let stats = sample(&map);
            average_probes[workload_idx].push((stats.live, stats.average));
            worst_probes[workload_idx].push((stats.live, stats.worst as f64));

            println!(
                "  {} keys: capacity = {}, load = {:.3}, avg probes = {:.2}, worst = {}",
                stats.live,
                stats.capacity,
                map.load_factor(),
                stats.average,
                stats.worst
            );
        }
    }

    draw_chart(
        "average_probe_length.png",
        "Average Linear Probe Length",
        "Average Probes per Lookup",
        &average_probes,
    )?;
    draw_chart(
        "worst_probe_length.png",
        "Worst-Case Linear Probe Length",
        "Worst-Case Probes per Lookup",
        &worst_probes,
    )?;

    println!("Generated plot images: average_probe_length.png, worst_probe_length.png");

    Ok(())
}
